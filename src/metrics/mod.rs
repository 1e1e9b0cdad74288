// src/metrics/mod.rs
//
// Derived financial metrics over aligned series. A missing operand, a zero
// denominator or a non-finite result yields a missing value for that period.

pub mod inputs;
pub mod labels;
pub mod quarterly;

pub use inputs::MetricInputs;
pub use labels::LineItem;
pub use quarterly::compute_quarterly_metrics;

use serde::Serialize;
use tracing::{debug, info};

use crate::process::{round2, Period, Series};

pub const SALES: &str = "Sales";
pub const OPERATING_PROFIT: &str = "Operating Profit";
pub const NET_PROFIT: &str = "Net Profit";
pub const CASH_EQUIVALENTS: &str = "Cash Equivalents";
pub const LONG_TERM_BORROWINGS: &str = "Long Term Borrowings";
pub const SHORT_TERM_BORROWINGS: &str = "Short Term Borrowings";
pub const CASH_FROM_OPERATIONS: &str = "Cash from Operating Activity";
pub const FIXED_ASSETS_PURCHASED: &str = "Fixed Assets Purchased";
pub const OPERATING_MARGIN: &str = "Operating Margin %";
pub const INTEREST_COVERAGE: &str = "Interest Coverage";
pub const FREE_CASH_FLOW: &str = "Free Cash Flow";
pub const TOTAL_CAPITAL_EMPLOYED: &str = "Total Capital Employed";
pub const ROCE: &str = "ROCE %";
pub const ROE: &str = "ROE %";
pub const EV_EBIT: &str = "EV/EBIT";
pub const EPS: &str = "EPS (Rs)";
pub const DEBTOR_DAYS: &str = "Debtor Days";

/// Named metric rows over a fixed period list, in presentation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsTable {
    pub periods: Vec<Period>,
    pub rows: Vec<(String, Series)>,
}

impl MetricsTable {
    pub fn new(periods: Vec<Period>) -> Self {
        Self {
            periods,
            rows: Vec::new(),
        }
    }

    /// Append a row, aligned to this table's periods.
    pub fn push(&mut self, name: &str, series: &Series) {
        self.rows
            .push((name.to_string(), series.align(&self.periods)));
    }

    pub fn get(&self, name: &str) -> Option<&Series> {
        self.rows.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub(crate) fn ratio(num: f64, den: f64) -> Option<f64> {
    if den == 0.0 {
        return None;
    }
    round2(num / den)
}

pub(crate) fn percent(num: f64, den: f64) -> Option<f64> {
    if den == 0.0 {
        return None;
    }
    round2(num / den * 100.0)
}

fn sum(a: f64, b: f64) -> Option<f64> {
    round2(a + b)
}

/// Yearly metrics over `periods`. Every row has a value slot for every period.
pub fn compute_metrics(inputs: &MetricInputs, periods: &[Period]) -> MetricsTable {
    let a = |s: &Series| s.align(periods);
    let sales = a(&inputs.sales);
    let op = a(&inputs.operating_profit);
    let np = a(&inputs.net_profit);
    let cash = a(&inputs.cash_equivalents);
    let ltb = a(&inputs.long_term_borrowings);
    let stb = a(&inputs.short_term_borrowings);
    let cfo = a(&inputs.cash_from_operations);
    let capex = a(&inputs.fixed_assets_purchased);
    let equity = a(&inputs.equity);
    let reserves = a(&inputs.reserves);
    let interest = a(&inputs.interest);

    let opm = op.zip_with(&sales, percent);
    let coverage = op.zip_with(&interest, ratio);
    let fcf = cfo.zip_with(&capex, sum);
    let net_worth = equity.zip_with(&reserves, |e, r| Some(e + r));
    let borrowings = ltb.zip_with(&stb, |l, s| Some(l + s));
    let tce = net_worth.zip_with(&borrowings, sum);
    let roce = op.zip_with(&tce, percent);
    let roe = np.zip_with(&net_worth, percent);
    let ev = match inputs.market_cap {
        Some(mc) => borrowings.zip_with(&cash, |b, c| Some(mc + b - c)),
        None => Series::missing(periods),
    };
    let ev_ebit = ev.zip_with(&op, ratio);

    let mut table = MetricsTable::new(periods.to_vec());
    table.push(SALES, &sales);
    table.push(OPERATING_PROFIT, &op);
    table.push(NET_PROFIT, &np);
    table.push(CASH_EQUIVALENTS, &cash);
    table.push(LONG_TERM_BORROWINGS, &ltb);
    table.push(SHORT_TERM_BORROWINGS, &stb);
    table.push(CASH_FROM_OPERATIONS, &cfo);
    table.push(FIXED_ASSETS_PURCHASED, &capex);
    table.push(OPERATING_MARGIN, &opm);
    table.push(INTEREST_COVERAGE, &coverage);
    table.push(FREE_CASH_FLOW, &fcf);
    table.push(TOTAL_CAPITAL_EMPLOYED, &tce);
    table.push(ROCE, &roce);
    table.push(ROE, &roe);
    table.push(EV_EBIT, &ev_ebit);
    table.push(EPS, &inputs.eps);
    table.push(DEBTOR_DAYS, &inputs.debtor_days);

    let missing = table.rows.iter().filter(|(_, s)| s.is_all_missing()).count();
    debug!(missing, "all-missing metric rows");
    info!(
        metrics = table.len(),
        periods = periods.len(),
        "computed yearly metrics"
    );
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn periods() -> Vec<Period> {
        vec!["Mar 2023".parse().unwrap(), "Mar 2024".parse().unwrap()]
    }

    fn series(values: &[Option<f64>]) -> Series {
        Series::new(periods().into_iter().zip(values.iter().copied()).collect())
    }

    fn full_inputs() -> MetricInputs {
        MetricInputs {
            sales: series(&[Some(1000.0), Some(1200.0)]),
            operating_profit: series(&[Some(200.0), Some(300.0)]),
            net_profit: series(&[Some(100.0), Some(150.0)]),
            eps: series(&[Some(10.5), Some(12.25)]),
            interest: series(&[Some(20.0), Some(0.0)]),
            cash_equivalents: series(&[Some(50.0), Some(80.0)]),
            long_term_borrowings: series(&[Some(300.0), Some(200.0)]),
            short_term_borrowings: series(&[Some(100.0), Some(100.0)]),
            equity: series(&[Some(100.0), Some(100.0)]),
            reserves: series(&[Some(500.0), Some(650.0)]),
            cash_from_operations: series(&[Some(180.0), Some(260.0)]),
            fixed_assets_purchased: series(&[Some(-80.0), Some(-120.0)]),
            debtor_days: series(&[Some(45.0), None]),
            market_cap: Some(10_000.0),
        }
    }

    #[test]
    fn computes_every_metric_in_order() {
        let ps = periods();
        let t = compute_metrics(&full_inputs(), &ps);
        let names: Vec<&str> = t.names().collect();
        assert_eq!(
            names,
            vec![
                SALES,
                OPERATING_PROFIT,
                NET_PROFIT,
                CASH_EQUIVALENTS,
                LONG_TERM_BORROWINGS,
                SHORT_TERM_BORROWINGS,
                CASH_FROM_OPERATIONS,
                FIXED_ASSETS_PURCHASED,
                OPERATING_MARGIN,
                INTEREST_COVERAGE,
                FREE_CASH_FLOW,
                TOTAL_CAPITAL_EMPLOYED,
                ROCE,
                ROE,
                EV_EBIT,
                EPS,
                DEBTOR_DAYS,
            ]
        );
        for (_, s) in &t.rows {
            assert_eq!(s.len(), ps.len());
        }

        let at = |name: &str, i: usize| t.get(name).unwrap().get(&ps[i]);
        assert_eq!(at(OPERATING_MARGIN, 0), Some(20.0));
        assert_eq!(at(OPERATING_MARGIN, 1), Some(25.0));
        assert_eq!(at(INTEREST_COVERAGE, 0), Some(10.0));
        assert_eq!(at(FREE_CASH_FLOW, 0), Some(100.0));
        assert_eq!(at(TOTAL_CAPITAL_EMPLOYED, 0), Some(1000.0));
        assert_eq!(at(ROCE, 0), Some(20.0));
        assert_eq!(at(ROE, 1), Some(20.0));
        // (10000 + 300 + 100 - 50) / 200
        assert_eq!(at(EV_EBIT, 0), Some(51.75));
        assert_eq!(at(EPS, 1), Some(12.25));
        assert_eq!(at(DEBTOR_DAYS, 1), None);
    }

    #[test]
    fn zero_denominator_is_missing() {
        let ps = periods();
        let mut inputs = full_inputs();
        inputs.sales = series(&[Some(0.0), Some(1200.0)]);
        let t = compute_metrics(&inputs, &ps);
        assert_eq!(t.get(OPERATING_MARGIN).unwrap().get(&ps[0]), None);
        assert_eq!(t.get(OPERATING_MARGIN).unwrap().get(&ps[1]), Some(25.0));
        // interest is zero in the second year
        assert_eq!(t.get(INTEREST_COVERAGE).unwrap().get(&ps[1]), None);
    }

    #[test]
    fn missing_operand_propagates() {
        let ps = periods();
        let mut inputs = full_inputs();
        inputs.short_term_borrowings = series(&[None, Some(100.0)]);
        let t = compute_metrics(&inputs, &ps);
        assert_eq!(t.get(TOTAL_CAPITAL_EMPLOYED).unwrap().get(&ps[0]), None);
        assert_eq!(t.get(ROCE).unwrap().get(&ps[0]), None);
        assert_eq!(t.get(EV_EBIT).unwrap().get(&ps[0]), None);
        assert!(t.get(ROCE).unwrap().get(&ps[1]).is_some());
    }

    #[test]
    fn absent_inputs_give_all_missing_rows() {
        let ps = periods();
        let t = compute_metrics(&MetricInputs::default(), &ps);
        assert_eq!(t.len(), 17);
        for (name, s) in &t.rows {
            assert_eq!(s.len(), 2, "{name}");
            assert!(s.is_all_missing(), "{name}");
        }
    }

    #[test]
    fn no_market_cap_means_no_ev_ebit() {
        let ps = periods();
        let mut inputs = full_inputs();
        inputs.market_cap = None;
        let t = compute_metrics(&inputs, &ps);
        assert!(t.get(EV_EBIT).unwrap().is_all_missing());
        assert!(!t.get(ROCE).unwrap().is_all_missing());
    }

    #[test]
    fn ratios_round_to_two_places() {
        assert_eq!(percent(1.0, 3.0), Some(33.33));
        assert_eq!(ratio(2.0, 3.0), Some(0.67));
        assert_eq!(ratio(1.0, 0.0), None);
    }
}
