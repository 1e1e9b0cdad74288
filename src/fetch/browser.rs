//! Headless Chromium acquisition via chromiumoxide.
//!
//! One browser per invocation. The session is closed after rendering whether
//! or not rendering succeeded; if a session is dropped without `close`, the
//! handler task is aborted and chromiumoxide's own `Drop` kills the child.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::{cancellable, company_url, PageSource, RenderedDocument};
use crate::config::{BrowserOptions, ScrapeConfig};
use crate::error::{Result, ScrapeError};

const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Locate a Chrome/Chromium binary on this machine.
pub fn find_chrome() -> Option<PathBuf> {
    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }
    let fallback = PathBuf::from("/usr/bin/chromium-browser");
    fallback.exists().then_some(fallback)
}

/// An owned browser process plus its CDP event loop.
pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    closed: bool,
}

impl BrowserSession {
    /// Launch a browser configured for unattended use.
    pub async fn launch(opts: &BrowserOptions) -> Result<Self> {
        let chrome = opts
            .chrome_path
            .clone()
            .or_else(find_chrome)
            .ok_or_else(|| ScrapeError::Browser("Chrome/Chromium executable not found".into()))?;

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome)
            .no_sandbox()
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .window_size(opts.window_width, opts.window_height)
            .viewport(Viewport {
                width: opts.window_width,
                height: opts.window_height,
                ..Viewport::default()
            })
            .request_timeout(opts.page_load_timeout());
        builder = if opts.headless {
            builder.arg("--headless=new")
        } else {
            builder.with_head()
        };
        let config = builder.build().map_err(ScrapeError::Browser)?;

        let (browser, mut handler) = Browser::launch(config).await?;
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "cdp handler stopped");
                    break;
                }
            }
        });
        info!(
            width = opts.window_width,
            height = opts.window_height,
            "browser launched"
        );

        Ok(Self {
            browser,
            handler,
            closed: false,
        })
    }

    /// Navigate, expand collapsed rows, wait for the page to settle, and snapshot the HTML.
    #[instrument(level = "info", skip(self, url, opts, cancel), fields(url = %url))]
    pub async fn render(
        &self,
        url: &Url,
        opts: &BrowserOptions,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let start = Instant::now();
        let load = async {
            let page = self.browser.new_page(url.as_str()).await?;
            page.wait_for_navigation().await?;
            Ok::<Page, CdpError>(page)
        };
        let page = match cancellable(cancel, tokio::time::timeout(opts.page_load_timeout(), load))
            .await?
        {
            Ok(Ok(page)) => page,
            Ok(Err(e)) => {
                return Err(ScrapeError::PageLoad {
                    url: url.to_string(),
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                return Err(ScrapeError::PageLoad {
                    url: url.to_string(),
                    reason: format!("timed out after {:?}", opts.page_load_timeout()),
                })
            }
        };
        info!(elapsed = ?start.elapsed(), "page loaded");

        let mut expanded = 0usize;
        for control in &opts.expand_controls {
            if click_control(&page, control, opts, cancel).await? {
                expanded += 1;
            }
        }
        debug!(
            expanded,
            requested = opts.expand_controls.len(),
            "expansion controls"
        );

        cancellable(cancel, tokio::time::sleep(opts.settle_interval())).await?;

        let html = page.content().await?;
        if let Err(e) = page.close().await {
            debug!(error = %e, "page close failed");
        }
        info!(bytes = html.len(), elapsed = ?start.elapsed(), "page rendered");
        Ok(html)
    }

    /// Close the browser and stop the handler. Never fails; problems are logged.
    pub async fn close(mut self) {
        match tokio::time::timeout(CLOSE_TIMEOUT, self.browser.close()).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => warn!(error = %e, "browser close failed"),
            Err(_) => warn!("browser close timed out"),
        }
        if let Ok(Err(e)) = tokio::time::timeout(CLOSE_TIMEOUT, self.browser.wait()).await {
            debug!(error = %e, "waiting for browser exit failed");
        }
        self.handler.abort();
        self.closed = true;
        debug!("browser session closed");
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler.abort();
        if !self.closed {
            warn!("browser session dropped without close");
        }
    }
}

async fn find_button(page: &Page, name: &str) -> std::result::Result<Option<Element>, CdpError> {
    for el in page.find_elements("button").await? {
        if let Some(text) = el.inner_text().await? {
            if text.contains(name) {
                return Ok(Some(el));
            }
        }
    }
    Ok(None)
}

/// Best-effort click on the button whose text contains `name`.
///
/// Polls until `click_timeout`; `Ok(false)` when the control never became clickable.
/// Only cancellation is an error.
async fn click_control(
    page: &Page,
    name: &str,
    opts: &BrowserOptions,
    cancel: &CancellationToken,
) -> Result<bool> {
    let attempt = async {
        loop {
            match find_button(page, name).await {
                Ok(Some(el)) => match el.click().await {
                    Ok(_) => return,
                    Err(e) => debug!(control = name, error = %e, "click attempt failed"),
                },
                Ok(None) => {}
                Err(e) => debug!(control = name, error = %e, "lookup failed"),
            }
            tokio::time::sleep(opts.click_poll()).await;
        }
    };

    match cancellable(cancel, tokio::time::timeout(opts.click_timeout(), attempt)).await? {
        Ok(()) => {
            info!(control = name, "expanded");
            Ok(true)
        }
        Err(_) => {
            warn!(
                control = name,
                timeout = ?opts.click_timeout(),
                "expansion control not clickable; skipped"
            );
            Ok(false)
        }
    }
}

/// Browser-backed [`PageSource`].
#[derive(Debug, Clone)]
pub struct BrowserSource {
    url_template: String,
    opts: BrowserOptions,
}

impl BrowserSource {
    pub fn new(cfg: &ScrapeConfig) -> Self {
        Self {
            url_template: cfg.url_template.clone(),
            opts: cfg.browser.clone(),
        }
    }
}

#[async_trait]
impl PageSource for BrowserSource {
    async fn acquire(&self, symbol: &str, cancel: &CancellationToken) -> Result<RenderedDocument> {
        let url = company_url(&self.url_template, symbol)?;
        if cancel.is_cancelled() {
            return Err(ScrapeError::Cancelled);
        }
        let session = BrowserSession::launch(&self.opts).await?;
        let rendered = session.render(&url, &self.opts, cancel).await;
        session.close().await;
        Ok(RenderedDocument { url, html: rendered? })
    }
}
