pub mod catalog;
pub mod engine;
pub mod random;

pub use catalog::ScenarioId;
pub use engine::{
    improve_by_n, improve_by_percent, lift_to_fixed, lift_to_range, PercentMode, Scenario,
};
pub use random::{run_rng, RandomSource};
