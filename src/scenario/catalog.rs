use crate::scenario::{PercentMode, Scenario};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    ImproveOne,
    ImproveTen,
    ImproveTenPercent,
    PageTwo,
    TopFive,
    TopThree,
    PageOne,
    PositionOne,
}

impl ScenarioId {
    pub const ALL: [ScenarioId; 8] = [
        ScenarioId::ImproveOne,
        ScenarioId::ImproveTen,
        ScenarioId::ImproveTenPercent,
        ScenarioId::PageTwo,
        ScenarioId::TopFive,
        ScenarioId::TopThree,
        ScenarioId::PageOne,
        ScenarioId::PositionOne,
    ];

    pub fn from_str(value: &str) -> Option<Self> {
        let normalized = value.trim().to_lowercase().replace('_', "-");
        ScenarioId::ALL
            .into_iter()
            .find(|id| id.label() == normalized)
    }

    pub fn label(self) -> &'static str {
        match self {
            ScenarioId::ImproveOne => "improve-one",
            ScenarioId::ImproveTen => "improve-ten",
            ScenarioId::ImproveTenPercent => "improve-ten-percent",
            ScenarioId::PageTwo => "page-two",
            ScenarioId::TopFive => "top-five",
            ScenarioId::TopThree => "top-three",
            ScenarioId::PageOne => "page-one",
            ScenarioId::PositionOne => "position-one",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ScenarioId::ImproveOne => "Improve each ranking by 1 position",
            ScenarioId::ImproveTen => "Improve each ranking by 10 positions",
            ScenarioId::ImproveTenPercent => "Improve each ranking by 10%",
            ScenarioId::PageTwo => "Lift all positions > 20 to random page 2 positions",
            ScenarioId::TopFive => "Lift all rankings to random positions 2-5",
            ScenarioId::TopThree => "Lift all rankings to random positions 1-3",
            ScenarioId::PageOne => "Lift all to random page 1 positions",
            ScenarioId::PositionOne => "Lift all to position 1",
        }
    }

    pub fn scenario(self, percent_mode: PercentMode) -> Scenario {
        match self {
            ScenarioId::ImproveOne => Scenario::ImproveByN { n: 1.0 },
            ScenarioId::ImproveTen => Scenario::ImproveByN { n: 10.0 },
            ScenarioId::ImproveTenPercent => Scenario::ImproveByPercent {
                fraction: 0.10,
                mode: percent_mode,
            },
            ScenarioId::PageTwo => lift(20.0, 11, 20),
            ScenarioId::TopFive => lift(5.0, 2, 5),
            ScenarioId::TopThree => lift(3.0, 1, 3),
            ScenarioId::PageOne => lift(10.0, 1, 10),
            ScenarioId::PositionOne => Scenario::LiftToFixed {
                target: 1.0,
                unconditional: false,
            },
        }
    }
}

fn lift(threshold: f64, low: u32, high: u32) -> Scenario {
    Scenario::LiftToRange {
        threshold,
        low,
        high,
    }
}
