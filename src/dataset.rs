use serde::Serialize;
use std::io::Read;
use std::path::Path;

use crate::error::{ProjectionError, Result, RowError};

pub const KEYWORD: &str = "Keyword";
pub const SEARCH_VOLUME: &str = "Search Volume";
pub const CLICKS: &str = "Clicks";
pub const POSITION: &str = "Position";
pub const CLUSTER: &str = "Cluster";
pub const SEARCH_INTENT: &str = "Search Intent";

struct ColumnSpec {
    canonical: &'static str,
    aliases: &'static [&'static str],
}

const REQUIRED: [ColumnSpec; 4] = [
    ColumnSpec {
        canonical: KEYWORD,
        aliases: &["keyword", "keywords", "query"],
    },
    ColumnSpec {
        canonical: SEARCH_VOLUME,
        aliases: &[
            "search volume",
            "monthly search volume per keyword",
            "volume",
        ],
    },
    ColumnSpec {
        canonical: CLICKS,
        aliases: &["clicks", "current clicks per month"],
    },
    ColumnSpec {
        canonical: POSITION,
        aliases: &["position", "current ranking position"],
    },
];

const CLUSTER_SPEC: ColumnSpec = ColumnSpec {
    canonical: CLUSTER,
    aliases: &["cluster", "keyword cluster"],
};

const INTENT_SPEC: ColumnSpec = ColumnSpec {
    canonical: SEARCH_INTENT,
    aliases: &["search intent", "intent"],
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub records: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, records: Vec<Vec<String>>) -> Self {
        Self { headers, records }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader
            .byte_headers()?
            .iter()
            .map(|header| decode_cell(header).trim_start_matches('\u{feff}').to_string())
            .collect();

        let mut records = Vec::new();
        for record in reader.byte_records() {
            let record = record?;
            records.push(record.iter().map(decode_cell).collect());
        }

        Ok(Self { headers, records })
    }

    pub fn from_csv_str(data: &str) -> Result<Self> {
        Self::from_reader(data.as_bytes())
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn keyword_rows(&self) -> Result<Vec<KeywordRow>> {
        let columns = ColumnMap::resolve(&self.headers)?;
        Ok(self
            .records
            .iter()
            .enumerate()
            .map(|(idx, record)| columns.parse_row(idx + 1, record))
            .collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub keyword: usize,
    pub search_volume: usize,
    pub clicks: usize,
    pub position: usize,
    pub cluster: Option<usize>,
    pub search_intent: Option<usize>,
}

impl ColumnMap {
    pub fn resolve(headers: &[String]) -> Result<Self> {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
        let find = |spec: &ColumnSpec| {
            normalized
                .iter()
                .position(|header| spec.aliases.contains(&header.as_str()))
        };

        let found: Vec<Option<usize>> = REQUIRED.iter().map(find).collect();
        let missing: Vec<String> = REQUIRED
            .iter()
            .zip(found.iter())
            .filter(|(_, idx)| idx.is_none())
            .map(|(spec, _)| spec.canonical.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ProjectionError::Schema { missing });
        }

        let required: Vec<usize> = found.into_iter().flatten().collect();
        Ok(Self {
            keyword: required[0],
            search_volume: required[1],
            clicks: required[2],
            position: required[3],
            cluster: find(&CLUSTER_SPEC),
            search_intent: find(&INTENT_SPEC),
        })
    }

    fn parse_row(&self, row: usize, record: &[String]) -> KeywordRow {
        let cell = |idx: usize| record.get(idx).map(|value| value.trim()).unwrap_or("");
        let optional = |idx: Option<usize>| {
            idx.map(cell)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        let clicks = cell(self.clicks);
        KeywordRow {
            row,
            keyword: cell(self.keyword).to_string(),
            search_volume: parse_number(cell(self.search_volume)),
            current_position: parse_number(cell(self.position)),
            current_clicks: if clicks.is_empty() {
                None
            } else {
                Some(parse_number(clicks))
            },
            cluster: optional(self.cluster),
            search_intent: optional(self.search_intent),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordRow {
    pub row: usize,
    pub keyword: String,
    pub search_volume: f64,
    pub current_position: f64,
    pub current_clicks: Option<f64>,
    pub cluster: Option<String>,
    pub search_intent: Option<String>,
}

impl KeywordRow {
    pub fn new(keyword: &str, search_volume: f64, current_position: f64) -> Self {
        Self {
            row: 0,
            keyword: keyword.to_string(),
            search_volume,
            current_position,
            current_clicks: None,
            cluster: None,
            search_intent: None,
        }
    }

    pub fn with_clicks(mut self, clicks: f64) -> Self {
        self.current_clicks = Some(clicks);
        self
    }

    pub fn with_cluster(mut self, cluster: &str) -> Self {
        self.cluster = Some(cluster.to_string());
        self
    }

    pub fn with_intent(mut self, intent: &str) -> Self {
        self.search_intent = Some(intent.to_string());
        self
    }

    pub fn validate(&self) -> std::result::Result<(), RowError> {
        if self.keyword.trim().is_empty() {
            return Err(RowError::new(self.row, KEYWORD, "keyword is empty"));
        }
        check_number(self.row, SEARCH_VOLUME, self.search_volume, 0.0)?;
        check_number(self.row, POSITION, self.current_position, 1.0)?;
        if let Some(clicks) = self.current_clicks {
            check_number(self.row, CLICKS, clicks, 0.0)?;
        }
        Ok(())
    }
}

fn check_number(
    row: usize,
    column: &str,
    value: f64,
    min: f64,
) -> std::result::Result<(), RowError> {
    if !value.is_finite() {
        return Err(RowError::new(row, column, "not a number"));
    }
    if value < min {
        return Err(RowError::new(
            row,
            column,
            format!("{} is below the minimum of {}", value, min),
        ));
    }
    Ok(())
}

fn normalize_header(value: &str) -> String {
    value
        .trim_start_matches('\u{feff}')
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn decode_cell(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn parse_number(value: &str) -> f64 {
    let value = value.trim();
    if value.is_empty() {
        return f64::NAN;
    }
    if !value.contains(',') {
        return value.parse::<f64>().unwrap_or(f64::NAN);
    }

    let (sign, unsigned) = match value.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", value),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };
    if !is_grouped_by_thousands(integer) {
        return f64::NAN;
    }

    let mut cleaned = format!("{}{}", sign, integer.replace(',', ""));
    if let Some(fraction) = fraction {
        cleaned.push('.');
        cleaned.push_str(fraction);
    }
    cleaned.parse::<f64>().unwrap_or(f64::NAN)
}

// "1,200" and "12,345,678" only.
fn is_grouped_by_thousands(integer: &str) -> bool {
    let all_digits = |group: &str| group.bytes().all(|byte| byte.is_ascii_digit());
    let mut groups = integer.split(',');
    let lead = groups.next().unwrap_or("");
    (1..=3).contains(&lead.len())
        && all_digits(lead)
        && groups.all(|group| group.len() == 3 && all_digits(group))
}
