use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use crate::ctr::{CtrSource, OverflowPolicy};
use crate::error::{ProjectionError, Result};
use crate::projection::{ConversionRates, DEFAULT_CONVERSION_RATE};
use crate::scenario::{PercentMode, ScenarioId};
use crate::timeline::{DurationProfile, GrowthCurve, TimelineMode};
use crate::AnalysisOptions;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSection {
    pub scenario: String,
    pub ctr_source: String,
    pub conversion_rate: f64,
    pub duration: String,
    pub timeline_mode: String,
    pub random_seed: Option<u64>,
}

impl Default for AnalysisSection {
    fn default() -> Self {
        Self {
            scenario: ScenarioId::ImproveOne.label().to_string(),
            ctr_source: CtrSource::Standard.label().to_string(),
            conversion_rate: DEFAULT_CONVERSION_RATE,
            duration: DurationProfile::TwelveMonths.label().to_string(),
            timeline_mode: TimelineMode::Traffic.label().to_string(),
            random_seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CtrSection {
    pub overflow: String,
}

impl Default for CtrSection {
    fn default() -> Self {
        Self {
            overflow: OverflowPolicy::LastBucket.label().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioSection {
    pub percent_mode: String,
}

impl Default for ScenarioSection {
    fn default() -> Self {
        Self {
            percent_mode: PercentMode::Scale.label().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionSection {
    pub by_intent: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineSection {
    pub custom_curve: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OptionOverrides {
    pub scenario: Option<String>,
    pub ctr_source: Option<String>,
    pub conversion_rate: Option<f64>,
    pub duration: Option<String>,
    pub timeline_mode: Option<String>,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub analysis: AnalysisSection,
    pub ctr: CtrSection,
    pub scenario: ScenarioSection,
    pub conversion: ConversionSection,
    pub timeline: TimelineSection,
}

impl ForecastConfig {
    pub fn load(path: Option<PathBuf>) -> Result<(Self, Option<PathBuf>)> {
        let config_path = path.or_else(default_config_path);
        let mut config = match config_path.as_ref() {
            Some(path) if path.exists() => Self::from_file(path)?,
            _ => ForecastConfig::default(),
        };

        config.apply_env_overrides()?;
        Ok((config, config_path))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|err| ProjectionError::Config(format!("failed to read config: {}", err)))?;
        toml::from_str(&contents)
            .map_err(|err| ProjectionError::Config(format!("failed to parse config: {}", err)))
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let payload = toml::to_string_pretty(self).map_err(|err| {
            ProjectionError::Config(format!("failed to serialize config: {}", err))
        })?;
        std::fs::write(path, payload)?;
        Ok(())
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(scenario) = non_empty("SEO_SCENARIO") {
            self.analysis.scenario = scenario;
        }
        if let Some(source) = non_empty("SEO_CTR_SOURCE") {
            self.analysis.ctr_source = source;
        }
        if let Some(rate) = non_empty("SEO_CONVERSION_RATE") {
            self.analysis.conversion_rate = rate
                .trim()
                .parse::<f64>()
                .map_err(|_| invalid_env("SEO_CONVERSION_RATE", &rate))?;
        }
        if let Some(duration) = non_empty("SEO_DURATION") {
            self.analysis.duration = duration;
        }
        if let Some(mode) = non_empty("SEO_TIMELINE_MODE") {
            self.analysis.timeline_mode = mode;
        }
        if let Some(seed) = non_empty("SEO_RANDOM_SEED") {
            let value = seed
                .trim()
                .parse::<u64>()
                .map_err(|_| invalid_env("SEO_RANDOM_SEED", &seed))?;
            self.analysis.random_seed = Some(value);
        }
        Ok(())
    }

    pub fn apply(&mut self, overrides: &OptionOverrides) {
        if let Some(scenario) = &overrides.scenario {
            self.analysis.scenario = scenario.clone();
        }
        if let Some(source) = &overrides.ctr_source {
            self.analysis.ctr_source = source.clone();
        }
        if let Some(rate) = overrides.conversion_rate {
            self.analysis.conversion_rate = rate;
        }
        if let Some(duration) = &overrides.duration {
            self.analysis.duration = duration.clone();
        }
        if let Some(mode) = &overrides.timeline_mode {
            self.analysis.timeline_mode = mode.clone();
        }
        if let Some(seed) = overrides.seed {
            self.analysis.random_seed = Some(seed);
        }
    }

    pub fn to_options(&self) -> Result<AnalysisOptions> {
        let scenario_id = ScenarioId::from_str(&self.analysis.scenario)
            .ok_or_else(|| unknown("scenario", &self.analysis.scenario))?;
        let ctr_source = CtrSource::from_str(&self.analysis.ctr_source)
            .ok_or_else(|| unknown("CTR source", &self.analysis.ctr_source))?;
        let duration = DurationProfile::from_str(&self.analysis.duration)
            .ok_or_else(|| unknown("duration", &self.analysis.duration))?;
        let timeline_mode = TimelineMode::from_str(&self.analysis.timeline_mode)
            .ok_or_else(|| unknown("timeline mode", &self.analysis.timeline_mode))?;
        let overflow = OverflowPolicy::from_str(&self.ctr.overflow)
            .ok_or_else(|| unknown("CTR overflow policy", &self.ctr.overflow))?;
        let percent_mode = PercentMode::from_str(&self.scenario.percent_mode)
            .ok_or_else(|| unknown("percent mode", &self.scenario.percent_mode))?;

        let mut conversion = ConversionRates::new(self.analysis.conversion_rate)?;
        for (intent, percent) in &self.conversion.by_intent {
            conversion = conversion.with_intent(intent, *percent)?;
        }

        let custom_curve = match &self.timeline.custom_curve {
            Some(values) => Some(GrowthCurve::new(values.clone())?),
            None => None,
        };

        Ok(AnalysisOptions {
            scenario_id,
            percent_mode,
            ctr_source,
            overflow,
            conversion,
            duration,
            custom_curve,
            timeline_mode,
            random_seed: self.analysis.random_seed,
        })
    }
}

fn unknown(kind: &str, value: &str) -> ProjectionError {
    ProjectionError::Config(format!("unknown {}: {}", kind, value))
}

fn invalid_env(key: &str, value: &str) -> ProjectionError {
    ProjectionError::Config(format!("invalid {}: {}", key, value))
}

fn default_config_path() -> Option<PathBuf> {
    env::var("SEO_FORECAST_CONFIG")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from("config/forecast.toml")))
}
