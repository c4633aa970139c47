//! Error types shared across the dashboard pipeline.

use thiserror::Error;

/// Result type for pipeline operations.
pub type BoardResult<T> = Result<T, BoardError>;

/// Errors that can occur while building a dashboard response.
///
/// `FetchFailure` aborts the whole request; every other variant is local to
/// the single chart or metric that triggered it and must not take down
/// sibling computations.
#[derive(Error, Debug)]
pub enum BoardError {
    /// The snapshot could not be loaded or parsed.
    #[error("failed to load data: {0}")]
    FetchFailure(String),

    /// A metric identifier outside the fixed enumeration was requested.
    #[error("unsupported metric: {0}")]
    UnsupportedMetric(String),

    /// A grouping column outside the filterable columns was requested.
    #[error("unsupported grouping column: {0}")]
    UnsupportedColumn(String),

    /// A pie subset requested a dimension value absent from its lookup table.
    #[error("unknown key: {0}")]
    UnknownKey(String),

    /// A negative or malformed value reached the chart descriptor builder.
    #[error("invalid series value: {0}")]
    InvalidSeriesValue(f64),

    /// A required request selector was absent.
    #[error("missing parameter: {0}")]
    MissingParameter(&'static str),

    /// A named column was absent from a fetched table.
    #[error("missing column: {0}")]
    MissingColumn(String),
}

impl From<reqwest::Error> for BoardError {
    fn from(err: reqwest::Error) -> Self {
        BoardError::FetchFailure(err.to_string())
    }
}
