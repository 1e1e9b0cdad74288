// src/process/series.rs

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::normalize::{NormalizedTable, Record};
use super::periods::Period;
use super::utils::parse_number;

/// How a line item is located in a table's key column.
#[derive(Debug, Clone)]
pub enum LabelPattern {
    /// Case-insensitive substring.
    Contains(String),
    /// Case-insensitive regular expression, unanchored.
    Regex(Regex),
    /// Case-insensitive equality against any of the labels, ignoring a trailing `+`.
    Exact(Vec<String>),
}

impl LabelPattern {
    pub fn contains(needle: impl Into<String>) -> Self {
        Self::Contains(needle.into())
    }

    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map(Self::Regex)
    }

    pub fn exact<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Exact(labels.into_iter().map(Into::into).collect())
    }

    pub fn matches(&self, label: &str) -> bool {
        match self {
            Self::Contains(needle) => label.to_lowercase().contains(&needle.to_lowercase()),
            Self::Regex(re) => re.is_match(label),
            Self::Exact(allowed) => {
                let label = strip_expander(label);
                allowed
                    .iter()
                    .any(|a| strip_expander(a).eq_ignore_ascii_case(label))
            }
        }
    }
}

/// `Sales +` -> `Sales`; the `+` marks rows with a collapsible breakdown.
fn strip_expander(label: &str) -> &str {
    label.trim().trim_end_matches('+').trim_end()
}

/// Which flavour of [`LabelPattern`] the metrics layer builds its lookups with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Substring / regex patterns, first match in row order.
    #[default]
    Substring,
    /// Exact label allow-lists.
    Exact,
}

/// A period-indexed numeric series. `None` is the missing marker, never zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Series {
    points: Vec<(Period, Option<f64>)>,
}

impl Series {
    pub fn new(points: Vec<(Period, Option<f64>)>) -> Self {
        Self { points }
    }

    pub fn missing(periods: &[Period]) -> Self {
        Self {
            points: periods.iter().map(|p| (*p, None)).collect(),
        }
    }

    pub fn get(&self, period: &Period) -> Option<f64> {
        self.points
            .iter()
            .find(|(p, _)| p == period)
            .and_then(|(_, v)| *v)
    }

    pub fn periods(&self) -> impl Iterator<Item = &Period> {
        self.points.iter().map(|(p, _)| p)
    }

    pub fn values(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.points.iter().map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Period, Option<f64>)> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_all_missing(&self) -> bool {
        self.points.iter().all(|(_, v)| v.is_none())
    }

    /// Restrict (or extend with missing markers) to exactly `periods`.
    pub fn align(&self, periods: &[Period]) -> Self {
        Self {
            points: periods.iter().map(|p| (*p, self.get(p))).collect(),
        }
    }

    /// Apply `f` per point; missing stays missing.
    pub fn map<F>(&self, f: F) -> Self
    where
        F: Fn(f64) -> Option<f64>,
    {
        Self {
            points: self.points.iter().map(|(p, v)| (*p, v.and_then(&f))).collect(),
        }
    }

    /// Combine with `other` per period of `self`; missing on either side stays missing.
    pub fn zip_with<F>(&self, other: &Self, f: F) -> Self
    where
        F: Fn(f64, f64) -> Option<f64>,
    {
        Self {
            points: self
                .points
                .iter()
                .map(|(p, a)| {
                    let v = match (a, other.get(p)) {
                        (Some(a), Some(b)) => f(*a, b),
                        _ => None,
                    };
                    (*p, v)
                })
                .collect(),
        }
    }

    /// Explicit downstream transform for charting: missing becomes `0.0`.
    pub fn zero_filled(&self) -> Vec<(Period, f64)> {
        self.points
            .iter()
            .map(|(p, v)| (*p, v.unwrap_or(0.0)))
            .collect()
    }
}

/// First record, in source order, whose label matches.
pub fn find_row<'a>(table: &'a NormalizedTable, pattern: &LabelPattern) -> Option<&'a Record> {
    table
        .records()
        .iter()
        .find(|r| pattern.matches(table.label(r)))
}

/// Period-indexed values of the first row matching `pattern`.
///
/// No matching row gives an all-missing series; unparsable cells and absent
/// columns give a missing marker for that period.
pub fn extract_series(table: &NormalizedTable, pattern: &LabelPattern, periods: &[Period]) -> Series {
    let Some(record) = find_row(table, pattern) else {
        trace!(?pattern, "no matching row");
        return Series::missing(periods);
    };
    let points = periods
        .iter()
        .map(|p| {
            let value = record.get(&p.label()).and_then(parse_number);
            (*p, value)
        })
        .collect();
    Series::new(points)
}

/// Like [`extract_series`] over a section's tables: the first table with a matching row wins.
pub fn find_series(tables: &[NormalizedTable], pattern: &LabelPattern, periods: &[Period]) -> Series {
    match tables.iter().find(|t| find_row(t, pattern).is_some()) {
        Some(table) => extract_series(table, pattern, periods),
        None => {
            debug!(?pattern, tables = tables.len(), "line item unavailable");
            Series::missing(periods)
        }
    }
}

/// One numeric cell: the `column` value of the first row matching `pattern`.
pub fn scalar(tables: &[NormalizedTable], pattern: &LabelPattern, column: &str) -> Option<f64> {
    tables
        .iter()
        .find_map(|t| find_row(t, pattern))
        .and_then(|r| r.get(column))
        .and_then(parse_number)
}
