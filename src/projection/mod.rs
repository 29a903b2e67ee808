pub mod calculator;
pub mod conversion;

pub use calculator::{ProjectedRow, ProjectionCalculator};
pub use conversion::{ConversionRates, DEFAULT_CONVERSION_RATE};
