// src/config.rs

use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};
use tracing::{debug, info};

use crate::error::{Result, ScrapeError};
use crate::process::{DuplicateColumns, MatchStrategy, PeriodWindow};

pub const DEFAULT_URL_TEMPLATE: &str = "https://www.screener.in/company/{symbol}/consolidated/";

/// Buttons on the company page that reveal collapsed sub-rows.
pub const DEFAULT_EXPAND_CONTROLS: &[&str] =
    &["Borrowings", "Other Assets", "Cash from Investing Activity"];

/// Everything a single invocation needs to know; loaded once, passed by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Must contain `{symbol}`.
    pub url_template: String,
    pub browser: BrowserOptions,
    pub http: HttpOptions,
    pub periods: PeriodWindow,
    pub matching: MatchStrategy,
    pub duplicate_columns: DuplicateColumns,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            browser: BrowserOptions::default(),
            http: HttpOptions::default(),
            periods: PeriodWindow::default(),
            matching: MatchStrategy::default(),
            duplicate_columns: DuplicateColumns::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserOptions {
    /// Falls back to PATH discovery when unset.
    pub chrome_path: Option<PathBuf>,
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    pub expand_controls: Vec<String>,
    pub page_load_timeout_ms: u64,
    pub click_timeout_ms: u64,
    pub click_poll_ms: u64,
    pub settle_ms: u64,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            chrome_path: None,
            headless: true,
            window_width: 1920,
            window_height: 1080,
            expand_controls: DEFAULT_EXPAND_CONTROLS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            page_load_timeout_ms: 30_000,
            click_timeout_ms: 10_000,
            click_poll_ms: 250,
            settle_ms: 5_000,
        }
    }
}

impl BrowserOptions {
    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_millis(self.page_load_timeout_ms)
    }

    pub fn click_timeout(&self) -> Duration {
        Duration::from_millis(self.click_timeout_ms)
    }

    pub fn click_poll(&self) -> Duration {
        Duration::from_millis(self.click_poll_ms.max(1))
    }

    pub fn settle_interval(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpOptions {
    pub user_agent: String,
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0".to_string(),
            max_retries: 0,
            initial_backoff_ms: 500,
            request_timeout_ms: 30_000,
        }
    }
}

impl ScrapeConfig {
    /// Read a YAML file, apply `SCREENER_*` environment overrides, validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let mut cfg: Self = serde_yaml::from_str(&text)?;
        info!(path = %path.display(), "loaded config");
        cfg.apply_env_from(|key| std::env::var(key).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Defaults plus environment overrides.
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();
        cfg.apply_env_from(|key| std::env::var(key).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply overrides using `lookup` for variable access, so tests need not touch the process env.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("SCREENER_URL_TEMPLATE") {
            debug!(value = %v, "override url_template");
            self.url_template = v;
        }
        if let Some(v) = lookup("SCREENER_CHROME_PATH") {
            debug!(value = %v, "override chrome_path");
            self.browser.chrome_path = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("SCREENER_SETTLE_MS") {
            self.browser.settle_ms = v
                .trim()
                .parse()
                .map_err(|_| ScrapeError::Config(format!("SCREENER_SETTLE_MS={v:?}")))?;
        }
        if let Some(v) = lookup("SCREENER_HEADLESS") {
            self.browser.headless = match v.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => return Err(ScrapeError::Config(format!("SCREENER_HEADLESS={v:?}"))),
            };
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.url_template.contains("{symbol}") {
            return Err(ScrapeError::Config(format!(
                "url_template `{}` has no {{symbol}} placeholder",
                self.url_template
            )));
        }
        if self.browser.window_width == 0 || self.browser.window_height == 0 {
            return Err(ScrapeError::Config("window size must be non-zero".into()));
        }
        if self.periods.size == 0 {
            return Err(ScrapeError::Config("period window size must be > 0".into()));
        }
        Ok(())
    }
}
