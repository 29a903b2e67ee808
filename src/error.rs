use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("missing required columns: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("invalid CTR table: {0}")]
    InvalidTable(String),

    #[error("invalid growth curve: {0}")]
    InvalidCurve(String),

    #[error("invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ProjectionError>;

#[derive(Debug, Clone, PartialEq, Error, serde::Serialize)]
#[error("row {row}: invalid {column}: {reason}")]
pub struct RowError {
    /// 1-based data row index (header excluded).
    pub row: usize,
    pub column: String,
    pub reason: String,
}

impl RowError {
    pub fn new(row: usize, column: &str, reason: impl Into<String>) -> Self {
        Self {
            row,
            column: column.to_string(),
            reason: reason.into(),
        }
    }
}
