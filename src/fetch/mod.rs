// src/fetch/mod.rs

use async_trait::async_trait;
use scraper::Html;
use std::{future::Future, path::Path};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::ScrapeConfig;
use crate::error::{Result, ScrapeError};

pub mod browser;
pub mod http;
pub mod urls;

pub use browser::{BrowserSession, BrowserSource};
pub use http::HttpSource;
pub use urls::company_url;

/// A fully rendered company page.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    /// The URL the page was requested from.
    pub url: Url,
    pub html: String,
}

impl RenderedDocument {
    pub fn parse(&self) -> Html {
        Html::parse_document(&self.html)
    }
}

/// Anything that can produce the rendered page for a symbol.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn acquire(&self, symbol: &str, cancel: &CancellationToken) -> Result<RenderedDocument>;
}

/// Race `fut` against `cancel`; a cancelled token wins.
pub(crate) async fn cancellable<F, T>(cancel: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = T>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ScrapeError::Cancelled),
        v = fut => Ok(v),
    }
}

/// Serves fixed HTML; used for saved pages and tests.
#[derive(Debug, Clone)]
pub struct StaticSource {
    url_template: String,
    html: String,
}

impl StaticSource {
    pub fn new(cfg: &ScrapeConfig, html: impl Into<String>) -> Self {
        Self {
            url_template: cfg.url_template.clone(),
            html: html.into(),
        }
    }

    pub fn from_file(cfg: &ScrapeConfig, path: impl AsRef<Path>) -> Result<Self> {
        let html = std::fs::read_to_string(path)?;
        Ok(Self::new(cfg, html))
    }
}

#[async_trait]
impl PageSource for StaticSource {
    async fn acquire(&self, symbol: &str, cancel: &CancellationToken) -> Result<RenderedDocument> {
        let url = company_url(&self.url_template, symbol)?;
        if cancel.is_cancelled() {
            return Err(ScrapeError::Cancelled);
        }
        Ok(RenderedDocument {
            url,
            html: self.html.clone(),
        })
    }
}
