use tracing::warn;

use crate::error::{ProjectionError, Result};

pub const MIN_POSITION: u32 = 1;
pub const MAX_POSITION: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CtrValue {
    Point(f64),
    Band { low: f64, high: f64 },
}

impl CtrValue {
    pub fn rate(self) -> f64 {
        match self {
            CtrValue::Point(value) => value,
            CtrValue::Band { low, high } => (low + high) / 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CtrRange {
    pub lo: u32,
    pub hi: u32,
    pub value: CtrValue,
}

impl CtrRange {
    pub const fn new(lo: u32, hi: u32, value: CtrValue) -> Self {
        Self { lo, hi, value }
    }

    pub fn contains(&self, bucket: u32) -> bool {
        bucket >= self.lo && bucket < self.hi
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    #[default]
    LastBucket,
    Zero,
}

impl OverflowPolicy {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "last-bucket" | "last_bucket" | "last" => Some(OverflowPolicy::LastBucket),
            "zero" | "0" => Some(OverflowPolicy::Zero),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OverflowPolicy::LastBucket => "last-bucket",
            OverflowPolicy::Zero => "zero",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CtrLookup {
    pub bucket: Option<u32>,
    pub ctr: f64,
    pub used_fallback: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CtrTable {
    ranges: Vec<CtrRange>,
    overflow: OverflowPolicy,
}

impl CtrTable {
    pub fn new(ranges: Vec<CtrRange>, overflow: OverflowPolicy) -> Result<Self> {
        validate_ranges(&ranges)?;
        let table = Self { ranges, overflow };
        if !table.is_monotonic() {
            warn!("CTR table values increase with position somewhere");
        }
        Ok(table)
    }

    pub(crate) fn trusted(ranges: &[CtrRange], overflow: OverflowPolicy) -> Self {
        Self {
            ranges: ranges.to_vec(),
            overflow,
        }
    }

    pub fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }

    pub fn ranges(&self) -> &[CtrRange] {
        &self.ranges
    }

    pub fn overflow(&self) -> OverflowPolicy {
        self.overflow
    }

    pub fn ctr_for(&self, position: f64) -> f64 {
        self.lookup(position).ctr
    }

    /// Positions are rounded to the nearest integer bucket; anything below
    /// `MIN_POSITION` is clamped up, anything above `MAX_POSITION` goes to the
    /// overflow policy.
    pub fn lookup(&self, position: f64) -> CtrLookup {
        if position.is_nan() {
            return CtrLookup {
                bucket: None,
                ctr: f64::NAN,
                used_fallback: false,
            };
        }

        let rounded = position.round().max(MIN_POSITION as f64);
        if rounded > MAX_POSITION as f64 {
            return self.fallback(None);
        }

        let bucket = rounded as u32;
        match self.ranges.iter().find(|range| range.contains(bucket)) {
            Some(range) => CtrLookup {
                bucket: Some(bucket),
                ctr: range.value.rate(),
                used_fallback: false,
            },
            None => self.fallback(Some(bucket)),
        }
    }

    pub fn is_monotonic(&self) -> bool {
        self.ranges
            .windows(2)
            .all(|pair| pair[1].value.rate() <= pair[0].value.rate())
    }

    fn fallback(&self, bucket: Option<u32>) -> CtrLookup {
        let ctr = match self.overflow {
            OverflowPolicy::LastBucket => self
                .ranges
                .last()
                .map(|range| range.value.rate())
                .unwrap_or(0.0),
            OverflowPolicy::Zero => 0.0,
        };
        CtrLookup {
            bucket,
            ctr,
            used_fallback: true,
        }
    }
}

fn validate_ranges(ranges: &[CtrRange]) -> Result<()> {
    let first = ranges
        .first()
        .ok_or_else(|| ProjectionError::InvalidTable("table has no ranges".to_string()))?;
    if first.lo != MIN_POSITION {
        return Err(ProjectionError::InvalidTable(format!(
            "first range starts at {}, expected {}",
            first.lo, MIN_POSITION
        )));
    }

    let mut expected_lo = MIN_POSITION;
    for range in ranges {
        if range.lo != expected_lo {
            return Err(ProjectionError::InvalidTable(format!(
                "range {}..{} leaves a gap or overlap at {}",
                range.lo, range.hi, expected_lo
            )));
        }
        if range.hi <= range.lo {
            return Err(ProjectionError::InvalidTable(format!(
                "range {}..{} is empty",
                range.lo, range.hi
            )));
        }
        validate_value(range)?;
        expected_lo = range.hi;
    }

    if expected_lo != MAX_POSITION + 1 {
        return Err(ProjectionError::InvalidTable(format!(
            "ranges end at {}, expected {}",
            expected_lo,
            MAX_POSITION + 1
        )));
    }
    Ok(())
}

fn validate_value(range: &CtrRange) -> Result<()> {
    let ok = match range.value {
        CtrValue::Point(value) => value.is_finite() && value >= 0.0,
        CtrValue::Band { low, high } => {
            low.is_finite() && high.is_finite() && low >= 0.0 && low <= high
        }
    };
    if ok {
        Ok(())
    } else {
        Err(ProjectionError::InvalidTable(format!(
            "range {}..{} has an invalid CTR value {:?}",
            range.lo, range.hi, range.value
        )))
    }
}
