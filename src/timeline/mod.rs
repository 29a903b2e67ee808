pub mod curve;
pub mod distributor;

pub use curve::{DurationProfile, GrowthCurve, TimelineMode};
pub use distributor::{distribute, interpolate, PeriodValue};
