// src/metrics/quarterly.rs

use tracing::{debug, info};

use super::labels::LineItem;
use super::{percent, ratio, MetricsTable, INTEREST_COVERAGE, OPERATING_MARGIN};
use crate::config::ScrapeConfig;
use crate::process::{extract_series, table_periods, NormalizedTable};

/// Operating margin and interest coverage across every quarter column of `table`.
///
/// `None` when the table has no period columns.
pub fn compute_quarterly_metrics(
    table: &NormalizedTable,
    cfg: &ScrapeConfig,
) -> Option<MetricsTable> {
    let periods = table_periods(table);
    if periods.is_empty() {
        debug!("quarters table has no period columns");
        return None;
    }

    let series = |item: LineItem| extract_series(table, &item.pattern(cfg.matching), &periods);
    let sales = series(LineItem::Sales);
    let op = series(LineItem::OperatingProfit);
    let interest = series(LineItem::Interest);

    let mut out = MetricsTable::new(periods);
    out.push(OPERATING_MARGIN, &op.zip_with(&sales, percent));
    out.push(INTEREST_COVERAGE, &op.zip_with(&interest, ratio));
    info!(quarters = out.periods.len(), "computed quarterly metrics");
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{normalize, DuplicateColumns, RawTable, PARAMETERS};

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn margin_and_coverage_per_quarter() {
        let t = normalize(
            &RawTable::new(
                s(&["", "Jun 2024", "Sep 2024", "Dec 2024"]),
                vec![
                    s(&["Sales +", "400", "500", "0"]),
                    s(&["Expenses +", "300", "400", "10"]),
                    s(&["Operating Profit", "100", "100", "-10"]),
                    s(&["Interest", "10", "0", "5"]),
                ],
            ),
            PARAMETERS,
            DuplicateColumns::default(),
        );
        let q = compute_quarterly_metrics(&t, &ScrapeConfig::default()).unwrap();
        assert_eq!(q.periods.len(), 3);
        let opm = q.get(OPERATING_MARGIN).unwrap();
        assert_eq!(opm.get(&q.periods[0]), Some(25.0));
        assert_eq!(opm.get(&q.periods[1]), Some(20.0));
        assert_eq!(opm.get(&q.periods[2]), None);
        let cov = q.get(INTEREST_COVERAGE).unwrap();
        assert_eq!(cov.get(&q.periods[0]), Some(10.0));
        assert_eq!(cov.get(&q.periods[1]), None);
        assert_eq!(cov.get(&q.periods[2]), Some(-2.0));
    }

    #[test]
    fn no_period_columns_is_none() {
        let t = normalize(
            &RawTable::new(s(&["", "TTM"]), vec![s(&["Sales", "1"])]),
            PARAMETERS,
            DuplicateColumns::default(),
        );
        assert!(compute_quarterly_metrics(&t, &ScrapeConfig::default()).is_none());
    }
}
