use serde::Serialize;
use std::collections::BTreeMap;

use crate::projection::ProjectedRow;

pub const UNCLUSTERED: &str = "Unclustered";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthPoint {
    pub month: usize,
    pub clicks: f64,
    pub conversions: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSummary {
    pub cluster: String,
    pub keywords: usize,
    pub current_clicks: f64,
    pub potential_traffic: f64,
    pub current_conversions: f64,
    pub potential_conversions: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Totals {
    pub keywords: usize,
    pub failed: usize,
    pub current_clicks: f64,
    pub potential_traffic: f64,
    pub current_conversions: f64,
    pub potential_conversions: f64,
}

impl Totals {
    pub fn traffic_gain(&self) -> f64 {
        self.potential_traffic - self.current_clicks
    }
}

pub fn monthly_series(rows: &[ProjectedRow], months: usize) -> Vec<MonthPoint> {
    let mut series: Vec<MonthPoint> = (1..=months)
        .map(|month| MonthPoint {
            month,
            clicks: 0.0,
            conversions: 0.0,
        })
        .collect();

    for row in rows.iter().filter(|row| row.is_valid()) {
        let fraction = row.conversion_rate / 100.0;
        for (point, value) in series.iter_mut().zip(row.monthly_clicks.iter()) {
            point.clicks += value.value;
            point.conversions += value.value * fraction;
        }
    }
    series
}

pub fn cluster_summaries(rows: &[ProjectedRow]) -> Vec<ClusterSummary> {
    let mut clusters: BTreeMap<String, ClusterSummary> = BTreeMap::new();
    for row in rows.iter().filter(|row| row.is_valid()) {
        let name = row
            .source
            .cluster
            .clone()
            .unwrap_or_else(|| UNCLUSTERED.to_string());
        let summary = clusters.entry(name.clone()).or_insert_with(|| ClusterSummary {
            cluster: name,
            keywords: 0,
            current_clicks: 0.0,
            potential_traffic: 0.0,
            current_conversions: 0.0,
            potential_conversions: 0.0,
        });
        summary.keywords += 1;
        summary.current_clicks += row.source.current_clicks.unwrap_or(0.0);
        summary.potential_traffic += row.potential_traffic;
        summary.current_conversions += row.current_conversions;
        summary.potential_conversions += row.potential_conversions;
    }
    clusters.into_values().collect()
}

pub fn totals(rows: &[ProjectedRow]) -> Totals {
    let mut totals = Totals::default();
    for row in rows {
        if !row.is_valid() {
            totals.failed += 1;
            continue;
        }
        totals.keywords += 1;
        totals.current_clicks += row.source.current_clicks.unwrap_or(0.0);
        totals.potential_traffic += row.potential_traffic;
        totals.current_conversions += row.current_conversions;
        totals.potential_conversions += row.potential_conversions;
    }
    totals
}
