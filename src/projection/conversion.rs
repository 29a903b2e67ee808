use std::collections::BTreeMap;

use crate::error::{ProjectionError, Result};

pub const DEFAULT_CONVERSION_RATE: f64 = 2.5;

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRates {
    default_percent: f64,
    by_intent: BTreeMap<String, f64>,
}

impl Default for ConversionRates {
    fn default() -> Self {
        Self {
            default_percent: DEFAULT_CONVERSION_RATE,
            by_intent: BTreeMap::new(),
        }
    }
}

impl ConversionRates {
    pub fn new(default_percent: f64) -> Result<Self> {
        check_percent("default", default_percent)?;
        Ok(Self {
            default_percent,
            by_intent: BTreeMap::new(),
        })
    }

    pub fn with_intent(mut self, intent: &str, percent: f64) -> Result<Self> {
        check_percent(intent, percent)?;
        self.by_intent.insert(normalize_intent(intent), percent);
        Ok(self)
    }

    pub fn default_percent(&self) -> f64 {
        self.default_percent
    }

    pub fn percent_for(&self, intent: Option<&str>) -> f64 {
        intent
            .and_then(|intent| self.by_intent.get(&normalize_intent(intent)))
            .copied()
            .unwrap_or(self.default_percent)
    }

    pub fn fraction_for(&self, intent: Option<&str>) -> f64 {
        self.percent_for(intent) / 100.0
    }
}

fn check_percent(label: &str, percent: f64) -> Result<()> {
    if (0.0..=100.0).contains(&percent) {
        Ok(())
    } else {
        Err(ProjectionError::Config(format!(
            "conversion rate for {} must be within 0..=100, got {}",
            label, percent
        )))
    }
}

fn normalize_intent(value: &str) -> String {
    value.trim().to_lowercase()
}
