use serde::{Deserialize, Serialize};

use seo_forecast::config::{ForecastConfig, OptionOverrides};
use seo_forecast::dataset::RawTable;
use seo_forecast::error::Result;
use seo_forecast::AnalysisOptions;

#[derive(Debug, Deserialize)]
pub struct ApiAnalysisRequest {
    pub csv: String,
    #[serde(flatten)]
    pub overrides: OptionOverrides,
}

impl ApiAnalysisRequest {
    pub fn into_parts(self, base: &ForecastConfig) -> Result<(RawTable, AnalysisOptions)> {
        let mut config = base.clone();
        config.apply(&self.overrides);
        let options = config.to_options()?;
        let table = RawTable::from_csv_str(&self.csv)?;
        Ok((table, options))
    }
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_columns: Vec<String>,
}

impl ApiError {
    pub fn new(error: String) -> Self {
        Self {
            error,
            missing_columns: Vec::new(),
        }
    }
}
