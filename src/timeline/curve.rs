use serde::Serialize;

use crate::error::{ProjectionError, Result};

const SIX_MONTHS: [f64; 6] = [15.0, 35.0, 65.0, 74.0, 87.0, 100.0];
const TWELVE_MONTHS: [f64; 12] = [
    1.0, 3.0, 5.0, 8.0, 12.0, 25.0, 40.0, 55.0, 70.0, 78.0, 85.0, 100.0,
];
const EIGHTEEN_MONTHS: [f64; 18] = [
    2.0, 5.0, 8.0, 12.0, 18.0, 35.0, 42.0, 54.0, 67.0, 72.0, 77.0, 81.0, 87.0, 90.0, 93.0, 95.0,
    97.0, 100.0,
];
const TWENTY_FOUR_MONTHS: [f64; 24] = [
    2.0, 5.0, 8.0, 12.0, 18.0, 35.0, 55.0, 62.0, 66.0, 72.0, 77.0, 83.0, 85.0, 88.0, 90.0, 91.0,
    92.0, 93.0, 94.0, 95.0, 96.0, 98.0, 99.0, 100.0,
];

/// Non-decreasing, within `0..=100`, last element exactly 100.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthCurve {
    percentages: Vec<f64>,
}

impl GrowthCurve {
    pub fn new(percentages: Vec<f64>) -> Result<Self> {
        let last = match percentages.last() {
            Some(last) => *last,
            None => return Err(ProjectionError::InvalidCurve("curve is empty".to_string())),
        };
        if let Some(bad) = percentages
            .iter()
            .find(|value| !value.is_finite() || **value < 0.0 || **value > 100.0)
        {
            return Err(ProjectionError::InvalidCurve(format!(
                "percentage {} is outside 0..=100",
                bad
            )));
        }
        if let Some(step) = percentages.windows(2).position(|pair| pair[1] < pair[0]) {
            return Err(ProjectionError::InvalidCurve(format!(
                "curve decreases at month {}",
                step + 2
            )));
        }
        if last != 100.0 {
            return Err(ProjectionError::InvalidCurve(format!(
                "curve must end at 100, ends at {}",
                last
            )));
        }
        Ok(Self { percentages })
    }

    fn trusted(percentages: &[f64]) -> Self {
        Self {
            percentages: percentages.to_vec(),
        }
    }

    pub fn percentages(&self) -> &[f64] {
        &self.percentages
    }

    pub fn months(&self) -> usize {
        self.percentages.len()
    }

    pub fn steps(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.percentages
            .iter()
            .enumerate()
            .map(|(idx, pct)| (idx + 1, pct / 100.0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationProfile {
    SixMonths,
    TwelveMonths,
    EighteenMonths,
    TwentyFourMonths,
}

impl DurationProfile {
    pub const ALL: [DurationProfile; 4] = [
        DurationProfile::SixMonths,
        DurationProfile::TwelveMonths,
        DurationProfile::EighteenMonths,
        DurationProfile::TwentyFourMonths,
    ];

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "6" | "6m" | "6-months" | "six-months" => Some(DurationProfile::SixMonths),
            "12" | "12m" | "12-months" | "twelve-months" => Some(DurationProfile::TwelveMonths),
            "18" | "18m" | "18-months" | "eighteen-months" => Some(DurationProfile::EighteenMonths),
            "24" | "24m" | "24-months" | "twenty-four-months" => {
                Some(DurationProfile::TwentyFourMonths)
            }
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DurationProfile::SixMonths => "6-months",
            DurationProfile::TwelveMonths => "12-months",
            DurationProfile::EighteenMonths => "18-months",
            DurationProfile::TwentyFourMonths => "24-months",
        }
    }

    fn percentages(self) -> &'static [f64] {
        match self {
            DurationProfile::SixMonths => &SIX_MONTHS,
            DurationProfile::TwelveMonths => &TWELVE_MONTHS,
            DurationProfile::EighteenMonths => &EIGHTEEN_MONTHS,
            DurationProfile::TwentyFourMonths => &TWENTY_FOUR_MONTHS,
        }
    }

    pub fn curve(self) -> GrowthCurve {
        GrowthCurve::trusted(self.percentages())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineMode {
    #[default]
    Traffic,
    /// Recompute the position each month with the shift scaled by that
    /// month's percentage. Relative scenarios only.
    Position,
}

impl TimelineMode {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "traffic" | "clicks" => Some(TimelineMode::Traffic),
            "position" | "positions" => Some(TimelineMode::Position),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimelineMode::Traffic => "traffic",
            TimelineMode::Position => "position",
        }
    }
}
