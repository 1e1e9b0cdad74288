//! Fatal failures of a scrape invocation.
//!
//! Section-scoped and control-scoped problems (a missing section, a malformed
//! row, an expansion button that never appeared) are absorbed where they
//! happen and only show up as absent data. Everything here aborts the run.

use thiserror::Error;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, ScrapeError>;

#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Empty or unusable ticker symbol
    #[error("invalid stock symbol: {0:?}")]
    InvalidSymbol(String),

    /// The company page could not be loaded at all
    #[error("failed to load {url}: {reason}")]
    PageLoad { url: String, reason: String },

    /// Browser could not be launched or driven
    #[error("browser error: {0}")]
    Browser(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// No `Mar <YYYY>` column anywhere in the scraped sections
    #[error("no fiscal year columns found in any section")]
    NoFiscalPeriods,

    #[error("invocation cancelled")]
    Cancelled,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl From<chromiumoxide::error::CdpError> for ScrapeError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Self::Browser(err.to_string())
    }
}
