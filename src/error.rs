use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Insufficient data for {indicator}: need {required} bars, have {available}")]
    InsufficientData {
        indicator: &'static str,
        required: usize,
        available: usize,
    },

    #[error("Invalid bar series: {0}")]
    InvalidSeries(String),

    #[error("Upstream fetch failed: {0}")]
    UpstreamFetch(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Whether this error means an indicator simply lacks enough history.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, AppError::InsufficientData { .. })
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
