use serde::Serialize;

use crate::timeline::GrowthCurve;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodValue {
    pub month: usize,
    pub value: f64,
}

pub fn distribute(current: f64, future: f64, curve: &GrowthCurve) -> Vec<PeriodValue> {
    curve
        .percentages()
        .iter()
        .enumerate()
        .map(|(idx, pct)| PeriodValue {
            month: idx + 1,
            value: interpolate(current, future, *pct),
        })
        .collect()
}

pub fn interpolate(current: f64, future: f64, percentage: f64) -> f64 {
    if percentage >= 100.0 {
        future
    } else if percentage <= 0.0 {
        current
    } else {
        current + (future - current) * (percentage / 100.0)
    }
}
