// src/fetch/http.rs
//
// Plain GET of the company page. No script execution, so collapsed
// breakdown rows stay collapsed; tables present in the served HTML still parse.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};
use url::Url;

use super::{cancellable, company_url, PageSource, RenderedDocument};
use crate::config::{HttpOptions, ScrapeConfig};
use crate::error::{Result, ScrapeError};

/// Delay before retry number `attempt` (1-based).
pub(crate) fn backoff_delay(initial_backoff_ms: u64, attempt: u32) -> Duration {
    let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
    Duration::from_millis(initial_backoff_ms.saturating_mul(factor))
}

async fn get_text_core(client: &Client, url: &Url) -> std::result::Result<String, reqwest::Error> {
    debug!("Fetching text from {}", url);
    client
        .get(url.clone())
        .send()
        .await?
        .error_for_status()?
        .text()
        .await
}

async fn get_text_with_retry(
    client: &Client,
    url: &Url,
    opts: &HttpOptions,
    cancel: &CancellationToken,
) -> Result<String> {
    let mut attempts = 0;
    loop {
        match cancellable(cancel, get_text_core(client, url)).await? {
            Ok(t) => return Ok(t),
            Err(e) if attempts < opts.max_retries => {
                attempts += 1;
                let backoff = backoff_delay(opts.initial_backoff_ms, attempts);
                warn!(%url, attempt = attempts, delay_ms = backoff.as_millis() as u64, error = %e, "Retrying");
                cancellable(cancel, sleep(backoff)).await?;
            }
            Err(e) => {
                error!(%url, error = %e, "Exhausted retries");
                return Err(ScrapeError::PageLoad {
                    url: url.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }
}

/// Static HTTP [`PageSource`].
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    url_template: String,
    opts: HttpOptions,
}

impl HttpSource {
    pub fn new(cfg: &ScrapeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(cfg.http.request_timeout_ms))
            .user_agent(cfg.http.user_agent.as_str())
            .cookie_store(true)
            .gzip(true)
            .build()?;
        Ok(Self {
            client,
            url_template: cfg.url_template.clone(),
            opts: cfg.http.clone(),
        })
    }
}

#[async_trait]
impl PageSource for HttpSource {
    async fn acquire(&self, symbol: &str, cancel: &CancellationToken) -> Result<RenderedDocument> {
        let url = company_url(&self.url_template, symbol)?;
        let html = get_text_with_retry(&self.client, &url, &self.opts, cancel).await?;
        debug!(bytes = html.len(), "fetched page");
        Ok(RenderedDocument { url, html })
    }
}
