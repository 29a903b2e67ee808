pub mod config;
pub mod ctr;
pub mod dataset;
pub mod error;
pub mod projection;
pub mod report;
pub mod scenario;
pub mod timeline;

use serde::Serialize;
use tracing::info;

use crate::ctr::{CtrSource, OverflowPolicy};
use crate::dataset::{KeywordRow, RawTable};
use crate::error::Result;
use crate::projection::{ConversionRates, ProjectedRow, ProjectionCalculator};
use crate::report::{ClusterSummary, MonthPoint, Totals};
use crate::scenario::{run_rng, PercentMode, RandomSource, Scenario, ScenarioId};
use crate::timeline::{DurationProfile, GrowthCurve, TimelineMode};

pub use crate::error::{ProjectionError, RowError};

#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub scenario_id: ScenarioId,
    pub percent_mode: PercentMode,
    pub ctr_source: CtrSource,
    pub overflow: OverflowPolicy,
    pub conversion: ConversionRates,
    pub duration: DurationProfile,
    pub custom_curve: Option<GrowthCurve>,
    pub timeline_mode: TimelineMode,
    pub random_seed: Option<u64>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            scenario_id: ScenarioId::ImproveOne,
            percent_mode: PercentMode::Scale,
            ctr_source: CtrSource::Standard,
            overflow: OverflowPolicy::LastBucket,
            conversion: ConversionRates::default(),
            duration: DurationProfile::TwelveMonths,
            custom_curve: None,
            timeline_mode: TimelineMode::Traffic,
            random_seed: None,
        }
    }
}

impl AnalysisOptions {
    pub fn scenario(&self) -> Scenario {
        self.scenario_id.scenario(self.percent_mode)
    }

    pub fn curve(&self) -> GrowthCurve {
        self.custom_curve
            .clone()
            .unwrap_or_else(|| self.duration.curve())
    }

    pub fn duration_label(&self) -> &'static str {
        if self.custom_curve.is_some() {
            "custom"
        } else {
            self.duration.label()
        }
    }

    pub fn calculator(&self) -> Result<ProjectionCalculator> {
        ProjectionCalculator::new(
            self.scenario(),
            self.ctr_source.table(self.overflow),
            self.conversion.clone(),
            self.curve(),
            self.timeline_mode,
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub scenario: String,
    pub scenario_description: String,
    pub ctr_source: String,
    pub duration: String,
    pub timeline_mode: TimelineMode,
    pub conversion_rate: f64,
    pub random_seed: Option<u64>,
    pub rows: Vec<ProjectedRow>,
    pub monthly: Vec<MonthPoint>,
    pub clusters: Vec<ClusterSummary>,
    pub totals: Totals,
}

impl AnalysisReport {
    pub fn failed_rows(&self) -> impl Iterator<Item = &ProjectedRow> {
        self.rows.iter().filter(|row| !row.is_valid())
    }
}

pub fn analyze(table: &RawTable, options: &AnalysisOptions) -> Result<AnalysisReport> {
    let mut rng = run_rng(options.random_seed);
    analyze_with_rng(table, options, &mut rng)
}

pub fn analyze_with_rng(
    table: &RawTable,
    options: &AnalysisOptions,
    rng: &mut dyn RandomSource,
) -> Result<AnalysisReport> {
    let rows = table.keyword_rows()?;
    analyze_rows(&rows, options, rng)
}

pub fn analyze_rows(
    rows: &[KeywordRow],
    options: &AnalysisOptions,
    rng: &mut dyn RandomSource,
) -> Result<AnalysisReport> {
    let calculator = options.calculator()?;
    let projected = calculator.project_all(rows, rng);

    let monthly = report::monthly_series(&projected, calculator.curve().months());
    let clusters = report::cluster_summaries(&projected);
    let totals = report::totals(&projected);

    info!(
        scenario = options.scenario_id.label(),
        rows = rows.len(),
        failed = totals.failed,
        current_clicks = totals.current_clicks,
        potential_traffic = totals.potential_traffic,
        "analysis complete"
    );

    Ok(AnalysisReport {
        scenario: options.scenario_id.label().to_string(),
        scenario_description: options.scenario_id.description().to_string(),
        ctr_source: options.ctr_source.label().to_string(),
        duration: options.duration_label().to_string(),
        timeline_mode: options.timeline_mode,
        conversion_rate: options.conversion.default_percent(),
        random_seed: options.random_seed,
        rows: projected,
        monthly,
        clusters,
        totals,
    })
}

pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return "n/a".to_string();
    }
    let rounded = value.round() as i64;
    let negative = rounded < 0;
    let mut chars: Vec<char> = rounded.unsigned_abs().to_string().chars().collect();
    let mut result = String::new();
    let mut count = 0usize;

    while let Some(ch) = chars.pop() {
        if count == 3 {
            result.push(',');
            count = 0;
        }
        result.push(ch);
        count += 1;
    }
    if negative {
        result.push('-');
    }

    result.chars().rev().collect()
}

pub fn format_percent(value: f64) -> String {
    if !value.is_finite() {
        return "n/a".to_string();
    }
    format!("{:.1}%", value * 100.0)
}

pub fn format_float(value: f64, digits: usize) -> String {
    if !value.is_finite() {
        return "n/a".to_string();
    }
    format!("{:.1$}", value, digits)
}
