use crate::ctr::table::{CtrRange, CtrTable, CtrValue, OverflowPolicy};

const fn point(lo: u32, hi: u32, value: f64) -> CtrRange {
    CtrRange::new(lo, hi, CtrValue::Point(value))
}

const fn band(lo: u32, hi: u32, low: f64, high: f64) -> CtrRange {
    CtrRange::new(lo, hi, CtrValue::Band { low, high })
}

const STANDARD: [CtrRange; 16] = [
    point(1, 2, 0.35),
    point(2, 3, 0.24),
    point(3, 4, 0.18),
    point(4, 5, 0.15),
    point(5, 6, 0.10),
    point(6, 7, 0.08),
    point(7, 8, 0.065),
    point(8, 9, 0.05),
    point(9, 10, 0.04),
    point(10, 11, 0.035),
    point(11, 21, 0.02),
    point(21, 31, 0.01),
    point(31, 41, 0.008),
    point(41, 51, 0.006),
    point(51, 71, 0.004),
    point(71, 101, 0.002),
];

const BANDED: [CtrRange; 18] = [
    band(1, 2, 0.3, 0.35),
    band(2, 3, 0.15, 0.18),
    band(3, 4, 0.1, 0.12),
    band(4, 5, 0.07, 0.09),
    band(5, 6, 0.05, 0.07),
    band(6, 7, 0.04, 0.06),
    band(7, 8, 0.03, 0.05),
    band(8, 9, 0.03, 0.04),
    band(9, 11, 0.02, 0.03),
    band(11, 21, 0.01, 0.02),
    band(21, 31, 0.005, 0.01),
    band(31, 41, 0.004, 0.008),
    band(41, 51, 0.003, 0.007),
    band(51, 61, 0.002, 0.006),
    band(61, 71, 0.002, 0.005),
    band(71, 81, 0.001, 0.004),
    band(81, 91, 0.001, 0.003),
    band(91, 101, 0.001, 0.002),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtrSource {
    Standard,
    Banded,
}

impl CtrSource {
    pub const ALL: [CtrSource; 2] = [CtrSource::Standard, CtrSource::Banded];

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "standard" | "source-1" | "point" => Some(CtrSource::Standard),
            "banded" | "bands" | "source-2" => Some(CtrSource::Banded),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CtrSource::Standard => "standard",
            CtrSource::Banded => "banded",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            CtrSource::Standard => "Point CTR estimates per position",
            CtrSource::Banded => "CTR bands per position range (midpoint)",
        }
    }

    pub fn ranges(self) -> &'static [CtrRange] {
        match self {
            CtrSource::Standard => &STANDARD,
            CtrSource::Banded => &BANDED,
        }
    }

    pub fn table(self, overflow: OverflowPolicy) -> CtrTable {
        CtrTable::trusted(self.ranges(), overflow)
    }
}
