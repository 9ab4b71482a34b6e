// ⚠️ Engine Errors
// Structural failures surface here; lookup failures never do (they fall back)

use crate::record::Season;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    /// Sheet name cannot be split into a season and a year
    #[error("Malformed sheet key '{key}': expected '<Year>_<Season>' or '<Season>_<Year>'")]
    MalformedSheetKey { key: String },

    #[error("Unknown season '{0}': expected Summer or Winter")]
    UnknownSeason(String),

    #[error("Unknown rank key '{0}': expected official, points or total")]
    UnknownRankKey(String),

    #[error("Unsupported source file '{0}': expected .csv or .xlsx")]
    UnsupportedSource(String),

    #[error("Missing required column '{column}' in {source_name}")]
    MissingColumn { column: String, source_name: String },

    #[error("Invalid value '{value}' for column '{column}' in {source_name} row {row}")]
    InvalidCell {
        column: String,
        value: String,
        source_name: String,
        row: usize,
    },

    #[error("Duplicate record for {nation} at {year} {season}")]
    DuplicateRecord {
        nation: String,
        year: i32,
        season: Season,
    },

    /// A canonical name is itself an alias key, so normalization would not be idempotent
    #[error("Alias chain: '{from}' maps to '{to}', which is itself an alias")]
    AliasChain { from: String, to: String },

    #[error("Alias conflict: '{from}' maps to both '{first}' and '{second}'")]
    AliasConflict {
        from: String,
        first: String,
        second: String,
    },

    #[error("Invalid year '{year}' for {season} in host metadata")]
    InvalidHostYear { season: String, year: String },

    #[error("Invalid year range: {from} > {to}")]
    InvalidRange { from: i32, to: i32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XLSX read error: {0}")]
    Xlsx(#[from] calamine::XlsxError),
}
