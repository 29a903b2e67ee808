use crate::ctr::MIN_POSITION;
use crate::error::{ProjectionError, Result};
use crate::scenario::RandomSource;

const FLOOR: f64 = MIN_POSITION as f64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PercentMode {
    #[default]
    Scale,
    OfHundred,
}

impl PercentMode {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "scale" | "scaled" => Some(PercentMode::Scale),
            "of-hundred" | "of_hundred" | "absolute" => Some(PercentMode::OfHundred),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PercentMode::Scale => "scale",
            PercentMode::OfHundred => "of-hundred",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scenario {
    ImproveByN {
        n: f64,
    },
    ImproveByPercent {
        fraction: f64,
        mode: PercentMode,
    },
    LiftToRange {
        threshold: f64,
        low: u32,
        high: u32,
    },
    LiftToFixed {
        target: f64,
        unconditional: bool,
    },
}

impl Scenario {
    pub fn validate(&self) -> Result<()> {
        match *self {
            Scenario::ImproveByN { n } => {
                if !n.is_finite() || n < 0.0 {
                    return Err(invalid(format!("improve-by-n step must be >= 0, got {}", n)));
                }
            }
            Scenario::ImproveByPercent { fraction, .. } => {
                if !(0.0..=1.0).contains(&fraction) {
                    return Err(invalid(format!(
                        "improve-by-percent fraction must be within 0..=1, got {}",
                        fraction
                    )));
                }
            }
            Scenario::LiftToRange {
                threshold,
                low,
                high,
            } => {
                if low < MIN_POSITION || low > high {
                    return Err(invalid(format!(
                        "lift range [{}, {}] is empty or below 1",
                        low, high
                    )));
                }
                if !threshold.is_finite() {
                    return Err(invalid("lift threshold must be finite".to_string()));
                }
                if high as f64 > threshold {
                    return Err(invalid(format!(
                        "lift range top {} is worse than threshold {}",
                        high, threshold
                    )));
                }
            }
            Scenario::LiftToFixed { target, .. } => {
                if !target.is_finite() || target < FLOOR {
                    return Err(invalid(format!("lift target must be >= 1, got {}", target)));
                }
            }
        }
        Ok(())
    }

    pub fn is_relative(&self) -> bool {
        matches!(
            self,
            Scenario::ImproveByN { .. } | Scenario::ImproveByPercent { .. }
        )
    }

    pub fn is_randomized(&self) -> bool {
        matches!(self, Scenario::LiftToRange { .. })
    }

    pub fn apply(&self, position: f64, rng: &mut dyn RandomSource) -> f64 {
        if position.is_nan() {
            return position;
        }
        match *self {
            Scenario::ImproveByN { n } => improve_by_n(position, n),
            Scenario::ImproveByPercent { fraction, mode } => {
                improve_by_percent(position, fraction, mode)
            }
            Scenario::LiftToRange {
                threshold,
                low,
                high,
            } => lift_to_range(position, threshold, low, high, rng),
            Scenario::LiftToFixed {
                target,
                unconditional,
            } => lift_to_fixed(position, target, unconditional),
        }
    }

    pub fn scaled(&self, fraction: f64) -> Option<Scenario> {
        match *self {
            Scenario::ImproveByN { n } => Some(Scenario::ImproveByN { n: n * fraction }),
            Scenario::ImproveByPercent {
                fraction: pct,
                mode,
            } => Some(Scenario::ImproveByPercent {
                fraction: pct * fraction,
                mode,
            }),
            Scenario::LiftToRange { .. } | Scenario::LiftToFixed { .. } => None,
        }
    }
}

pub fn improve_by_n(position: f64, n: f64) -> f64 {
    (position - n).max(FLOOR)
}

pub fn improve_by_percent(position: f64, fraction: f64, mode: PercentMode) -> f64 {
    let shifted = match mode {
        PercentMode::Scale => position * (1.0 - fraction),
        PercentMode::OfHundred => position - fraction * 100.0,
    };
    shifted.max(FLOOR)
}

pub fn lift_to_range(
    position: f64,
    threshold: f64,
    low: u32,
    high: u32,
    rng: &mut dyn RandomSource,
) -> f64 {
    if position > threshold {
        rng.next_in_range(low, high) as f64
    } else {
        position
    }
}

pub fn lift_to_fixed(position: f64, target: f64, unconditional: bool) -> f64 {
    if unconditional || position > target {
        target
    } else {
        position
    }
}

fn invalid(message: String) -> ProjectionError {
    ProjectionError::InvalidScenario(message)
}
