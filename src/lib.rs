pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod metrics;
pub mod pipeline;
pub mod process;
pub mod report;

pub use config::ScrapeConfig;
pub use error::{Result, ScrapeError};
pub use extract::{SectionId, Sections};
pub use fetch::{BrowserSource, HttpSource, PageSource, RenderedDocument, StaticSource};
pub use metrics::MetricsTable;
pub use pipeline::{analyze, run, scrape, Analysis, Report, Scrape};
