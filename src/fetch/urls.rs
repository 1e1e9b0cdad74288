// src/fetch/urls.rs
use url::Url;

use crate::error::{Result, ScrapeError};

/// Build the company page URL from `template` (which holds a `{symbol}` placeholder).
///
/// The symbol is trimmed and upper-cased; anything beyond ASCII alphanumerics
/// and `-`, `_`, `&`, `.` is rejected.
pub fn company_url(template: &str, symbol: &str) -> Result<Url> {
    let symbol = symbol.trim().to_uppercase();
    let valid = !symbol.is_empty()
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '&' | '.'));
    if !valid {
        return Err(ScrapeError::InvalidSymbol(symbol));
    }
    let raw = template.replace("{symbol}", &symbol);
    Url::parse(&raw).map_err(|e| ScrapeError::Config(format!("url template {template:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_URL_TEMPLATE;

    #[test]
    fn builds_consolidated_url() {
        let url = company_url(DEFAULT_URL_TEMPLATE, " tcs ").unwrap();
        assert_eq!(url.as_str(), "https://www.screener.in/company/TCS/consolidated/");
    }

    #[test]
    fn keeps_ampersand_symbols() {
        let url = company_url(DEFAULT_URL_TEMPLATE, "m&m").unwrap();
        assert_eq!(url.path(), "/company/M&M/consolidated/");
    }

    #[test]
    fn rejects_empty_and_path_like_symbols() {
        assert!(matches!(
            company_url(DEFAULT_URL_TEMPLATE, "  "),
            Err(ScrapeError::InvalidSymbol(_))
        ));
        assert!(matches!(
            company_url(DEFAULT_URL_TEMPLATE, "../admin"),
            Err(ScrapeError::InvalidSymbol(_))
        ));
    }
}
