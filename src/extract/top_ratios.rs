// src/extract/top_ratios.rs

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::debug;

use crate::process::{clean_value, normalize_ws, RawTable};

static TOP_RATIOS_LI: Lazy<Selector> =
    Lazy::new(|| Selector::parse("ul#top-ratios li").expect("top ratios selector"));

pub const METRIC: &str = "Metric";
pub const VALUE: &str = "Value";

/// Trailing tokens that are units rather than values (`Dividend Yield 1.2 %`).
const UNIT_TOKENS: &[&str] = &["%", "Cr."];

fn pair(metric: &str, value: &str) -> Vec<String> {
    vec![metric.trim().to_string(), clean_value(value)]
}

/// Turn one `li` text into one or more (metric, value) rows.
fn parse_entry(text: &str) -> Vec<Vec<String>> {
    for key in ["Market Cap", "Current Price"] {
        if let Some((_, rest)) = text.split_once(key) {
            return vec![pair(key, rest)];
        }
    }

    if let Some((_, rest)) = text.split_once("High / Low") {
        return match rest.split_once('/') {
            Some((high, low)) => vec![pair("High", high), pair("Low", low)],
            None => vec![pair("High / Low", rest)],
        };
    }

    let unprefixed = normalize_ws(&text.replace('₹', ""));
    let mut body = unprefixed.as_str();
    while let Some(stripped) = UNIT_TOKENS
        .iter()
        .find_map(|u| body.strip_suffix(*u).filter(|s| s.ends_with(' ')))
    {
        body = stripped.trim_end();
    }
    match body.rsplit_once(' ') {
        Some((label, value)) => vec![pair(label, value)],
        None => vec![pair(body, "")],
    }
}

/// Parse the `ul#top-ratios` summary list into a two-column `Metric`/`Value` table.
///
/// Returns `None` when the list is absent or has no entries.
pub fn extract_top_ratios(doc: &Html) -> Option<RawTable> {
    let rows: Vec<Vec<String>> = doc
        .select(&TOP_RATIOS_LI)
        .map(|li| {
            li.text()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|text| !text.is_empty())
        .flat_map(|text| parse_entry(&text))
        .collect();

    debug!(entries = rows.len(), "top ratios");
    if rows.is_empty() {
        return None;
    }
    Some(RawTable::new(vec![METRIC.into(), VALUE.into()], rows))
}
