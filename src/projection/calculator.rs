use serde::Serialize;
use tracing::{debug, warn};

use crate::ctr::CtrTable;
use crate::dataset::KeywordRow;
use crate::error::{ProjectionError, Result, RowError};
use crate::projection::ConversionRates;
use crate::scenario::{RandomSource, Scenario};
use crate::timeline::{distribute, GrowthCurve, PeriodValue, TimelineMode};

#[derive(Debug, Clone, Serialize)]
pub struct ProjectedRow {
    pub source: KeywordRow,
    pub adjusted_position: f64,
    pub potential_ctr: f64,
    pub potential_traffic: f64,
    pub current_conversions: f64,
    pub potential_conversions: f64,
    pub conversion_rate: f64,
    pub ctr_fallback: bool,
    pub monthly_clicks: Vec<PeriodValue>,
    pub error: Option<RowError>,
}

impl ProjectedRow {
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    fn failed(source: &KeywordRow, error: RowError, months: usize, conversion_rate: f64) -> Self {
        Self {
            source: source.clone(),
            adjusted_position: f64::NAN,
            potential_ctr: f64::NAN,
            potential_traffic: f64::NAN,
            current_conversions: f64::NAN,
            potential_conversions: f64::NAN,
            conversion_rate,
            ctr_fallback: false,
            monthly_clicks: (1..=months)
                .map(|month| PeriodValue {
                    month,
                    value: f64::NAN,
                })
                .collect(),
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProjectionCalculator {
    scenario: Scenario,
    table: CtrTable,
    conversion: ConversionRates,
    curve: GrowthCurve,
    mode: TimelineMode,
}

impl ProjectionCalculator {
    pub fn new(
        scenario: Scenario,
        table: CtrTable,
        conversion: ConversionRates,
        curve: GrowthCurve,
        mode: TimelineMode,
    ) -> Result<Self> {
        scenario.validate()?;
        if mode == TimelineMode::Position && !scenario.is_relative() {
            return Err(ProjectionError::InvalidScenario(format!(
                "{:?} replaces positions and cannot be spread per month; use the traffic timeline",
                scenario
            )));
        }
        Ok(Self {
            scenario,
            table,
            conversion,
            curve,
            mode,
        })
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn table(&self) -> &CtrTable {
        &self.table
    }

    pub fn curve(&self) -> &GrowthCurve {
        &self.curve
    }

    pub fn mode(&self) -> TimelineMode {
        self.mode
    }

    pub fn project(&self, row: &KeywordRow, rng: &mut dyn RandomSource) -> ProjectedRow {
        let conversion_rate = self.conversion.percent_for(row.search_intent.as_deref());
        if let Err(error) = row.validate() {
            warn!(row = row.row, keyword = %row.keyword, "{}", error);
            return ProjectedRow::failed(row, error, self.curve.months(), conversion_rate);
        }

        let adjusted_position = self.scenario.apply(row.current_position, rng);
        let lookup = self.table.lookup(adjusted_position);
        if lookup.used_fallback {
            warn!(
                row = row.row,
                position = adjusted_position,
                policy = self.table.overflow().label(),
                "position outside CTR table, using overflow fallback"
            );
        }

        let potential_ctr = lookup.ctr;
        let potential_traffic = row.search_volume * potential_ctr;
        let fraction = self.conversion.fraction_for(row.search_intent.as_deref());
        let current_clicks = row.current_clicks.unwrap_or(0.0);

        let monthly_clicks = match self.mode {
            TimelineMode::Traffic => distribute(current_clicks, potential_traffic, &self.curve),
            TimelineMode::Position => self.position_timeline(row, rng),
        };

        debug!(
            row = row.row,
            keyword = %row.keyword,
            from = row.current_position,
            to = adjusted_position,
            ctr = potential_ctr,
            traffic = potential_traffic,
            "projected row"
        );

        ProjectedRow {
            source: row.clone(),
            adjusted_position,
            potential_ctr,
            potential_traffic,
            current_conversions: current_clicks * fraction,
            potential_conversions: potential_traffic * fraction,
            conversion_rate,
            ctr_fallback: lookup.used_fallback,
            monthly_clicks,
            error: None,
        }
    }

    pub fn project_all(
        &self,
        rows: &[KeywordRow],
        rng: &mut dyn RandomSource,
    ) -> Vec<ProjectedRow> {
        let mut projected = Vec::with_capacity(rows.len());
        for row in rows {
            projected.push(self.project(row, &mut *rng));
        }
        projected
    }

    fn position_timeline(&self, row: &KeywordRow, rng: &mut dyn RandomSource) -> Vec<PeriodValue> {
        let mut series = Vec::with_capacity(self.curve.months());
        for (month, fraction) in self.curve.steps() {
            let position = match self.scenario.scaled(fraction) {
                Some(step) => step.apply(row.current_position, &mut *rng),
                None => row.current_position,
            };
            series.push(PeriodValue {
                month,
                value: row.search_volume * self.table.ctr_for(position),
            });
        }
        series
    }
}
