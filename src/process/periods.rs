// src/process/periods.rs

use chrono::Month;
use serde::{Deserialize, Serialize, Serializer};
use std::{cmp::Ordering, collections::BTreeSet, fmt, str::FromStr};
use tracing::{debug, info};

use super::normalize::NormalizedTable;
use crate::error::{Result, ScrapeError};

/// A reporting column label such as `Mar 2024`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Period {
    pub month: Month,
    pub year: i32,
}

impl Period {
    pub fn new(month: Month, year: i32) -> Self {
        Self { month, year }
    }

    pub fn label(&self) -> String {
        self.to_string()
    }
}

/// `Mar`, `Jun`, ... as printed in the site's column headers.
pub fn month_abbrev(month: Month) -> &'static str {
    &month.name()[..3]
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", month_abbrev(self.month), self.year)
    }
}

impl Ord for Period {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.year, self.month.number_from_month())
            .cmp(&(other.year, other.month.number_from_month()))
    }
}

impl PartialOrd for Period {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePeriodError(pub String);

impl fmt::Display for ParsePeriodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not a period label: {:?}", self.0)
    }
}

impl std::error::Error for ParsePeriodError {}

impl FromStr for Period {
    type Err = ParsePeriodError;

    /// Accepts `<Mon> <YYYY>`: a three-letter month and a four-digit year.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let err = || ParsePeriodError(s.to_string());
        let mut parts = s.split_whitespace();
        let (mon, year) = match (parts.next(), parts.next(), parts.next()) {
            (Some(m), Some(y), None) => (m, y),
            _ => return Err(err()),
        };
        if mon.len() != 3 || !mon.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(err());
        }
        if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
            return Err(err());
        }
        let month = Month::from_str(mon).map_err(|_| err())?;
        let year = year.parse().map_err(|_| err())?;
        Ok(Self { month, year })
    }
}

/// Serde helper: months as their three-letter abbreviation.
mod month_serde {
    use super::month_abbrev;
    use chrono::Month;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use std::str::FromStr;

    pub fn serialize<S: Serializer>(month: &Month, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(month_abbrev(*month))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Month, D::Error> {
        let raw = String::deserialize(d)?;
        Month::from_str(raw.trim()).map_err(|_| D::Error::custom(format!("bad month {raw:?}")))
    }
}

/// Which columns count as fiscal years and how many of the latest to keep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodWindow {
    #[serde(with = "month_serde")]
    pub fiscal_month: Month,
    pub size: usize,
}

impl Default for PeriodWindow {
    fn default() -> Self {
        Self {
            fiscal_month: Month::March,
            size: 8,
        }
    }
}

/// Period-parsable columns of one table, in column order.
pub fn table_periods(table: &NormalizedTable) -> Vec<Period> {
    let mut out: Vec<Period> = Vec::new();
    for col in table.columns() {
        if let Ok(p) = col.parse::<Period>() {
            if !out.contains(&p) {
                out.push(p);
            }
        }
    }
    out
}

/// Scan every column of every table and return the `window.size` most recent
/// fiscal year-ends, ascending.
///
/// Only columns whose month is `window.fiscal_month` qualify. Finding none is fatal.
pub fn compute_master_periods<'a, I>(tables: I, window: &PeriodWindow) -> Result<Vec<Period>>
where
    I: IntoIterator<Item = &'a NormalizedTable>,
{
    if window.size == 0 {
        return Err(ScrapeError::Config("period window size must be > 0".into()));
    }
    let mut years = BTreeSet::new();
    let mut scanned = 0usize;
    for table in tables {
        scanned += 1;
        for p in table_periods(table) {
            if p.month == window.fiscal_month {
                years.insert(p.year);
            }
        }
    }
    if years.is_empty() {
        debug!(tables = scanned, "no fiscal year columns");
        return Err(ScrapeError::NoFiscalPeriods);
    }

    let skip = years.len().saturating_sub(window.size);
    let periods: Vec<Period> = years
        .into_iter()
        .skip(skip)
        .map(|y| Period::new(window.fiscal_month, y))
        .collect();
    info!(
        first = ?periods.first().map(Period::label),
        last = ?periods.last().map(Period::label),
        count = periods.len(),
        "master period window"
    );
    Ok(periods)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{normalize, DuplicateColumns, RawTable, PARAMETERS};

    fn table_with(cols: &[&str]) -> NormalizedTable {
        let mut headers = vec![String::new()];
        headers.extend(cols.iter().map(|c| c.to_string()));
        let row: Vec<String> = std::iter::once("Sales".to_string())
            .chain(cols.iter().map(|_| "1".to_string()))
            .collect();
        normalize(
            &RawTable::new(headers, vec![row]),
            PARAMETERS,
            DuplicateColumns::default(),
        )
    }

    #[test]
    fn parses_and_displays_labels() {
        let p: Period = " Mar 2024 ".parse().unwrap();
        assert_eq!(p, Period::new(Month::March, 2024));
        assert_eq!(p.to_string(), "Mar 2024");
        assert!("March 2024".parse::<Period>().is_err());
        assert!("Mar 24".parse::<Period>().is_err());
        assert!("TTM".parse::<Period>().is_err());
        assert!("Mar 2024 x".parse::<Period>().is_err());
    }

    #[test]
    fn ordering_is_chronological() {
        let a: Period = "Dec 2023".parse().unwrap();
        let b: Period = "Mar 2024".parse().unwrap();
        let c: Period = "Jun 2024".parse().unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn keeps_eight_most_recent_years() {
        let cols: Vec<String> = (2019..=2027).map(|y| format!("Mar {y}")).collect();
        let refs: Vec<&str> = cols.iter().map(String::as_str).collect();
        let t = table_with(&refs);
        let periods = compute_master_periods([&t], &PeriodWindow::default()).unwrap();
        let labels: Vec<String> = periods.iter().map(Period::label).collect();
        let expected: Vec<String> = (2020..=2027).map(|y| format!("Mar {y}")).collect();
        assert_eq!(labels, expected);
    }

    #[test]
    fn unions_years_across_tables_and_ignores_quarters() {
        let a = table_with(&["Mar 2022", "TTM"]);
        let b = table_with(&["Jun 2023", "Mar 2023", "Mar 2022"]);
        let periods = compute_master_periods([&a, &b], &PeriodWindow::default()).unwrap();
        assert_eq!(
            periods,
            vec![Period::new(Month::March, 2022), Period::new(Month::March, 2023)]
        );
    }

    #[test]
    fn no_fiscal_columns_is_fatal() {
        let t = table_with(&["Jun 2023", "Sep 2023"]);
        let err = compute_master_periods([&t], &PeriodWindow::default()).unwrap_err();
        assert!(matches!(err, ScrapeError::NoFiscalPeriods));
        let none: [&NormalizedTable; 0] = [];
        assert!(compute_master_periods(none, &PeriodWindow::default()).is_err());
    }

    #[test]
    fn zero_size_window_is_config_error_with_logging_on() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .finish();
        let t = table_with(&["Mar 2024"]);
        let window = PeriodWindow {
            fiscal_month: Month::March,
            size: 0,
        };
        let result = tracing::subscriber::with_default(subscriber, || {
            compute_master_periods([&t], &window)
        });
        assert!(matches!(result, Err(ScrapeError::Config(_))));
    }

    #[test]
    fn table_periods_preserve_column_order() {
        let t = table_with(&["Jun 2023", "Sep 2023", "Dec 2023", "TTM"]);
        let labels: Vec<String> = table_periods(&t).iter().map(Period::label).collect();
        assert_eq!(labels, vec!["Jun 2023", "Sep 2023", "Dec 2023"]);
    }
}
