// src/metrics/inputs.rs

use tracing::debug;

use super::labels::{LineItem, TOP_RATIO_VALUE};
use crate::extract::Sections;
use crate::process::{find_series, scalar, MatchStrategy, NormalizedTable, Period, Series};

/// Every raw line item the yearly metrics need, aligned to one period list.
///
/// Items whose section or row is absent are all-missing series, never zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricInputs {
    pub sales: Series,
    pub operating_profit: Series,
    pub net_profit: Series,
    pub eps: Series,
    pub interest: Series,
    pub cash_equivalents: Series,
    pub long_term_borrowings: Series,
    pub short_term_borrowings: Series,
    pub equity: Series,
    pub reserves: Series,
    pub cash_from_operations: Series,
    pub fixed_assets_purchased: Series,
    pub debtor_days: Series,
    pub market_cap: Option<f64>,
}

fn tables_for(sections: &Sections, item: LineItem) -> &[NormalizedTable] {
    sections
        .get(&item.section())
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

impl MetricInputs {
    pub fn gather(sections: &Sections, periods: &[Period], strategy: MatchStrategy) -> Self {
        let series = |item: LineItem| {
            let s = find_series(tables_for(sections, item), &item.pattern(strategy), periods);
            if s.is_all_missing() {
                debug!(?item, "no values in window");
            }
            s
        };
        let market_cap = scalar(
            tables_for(sections, LineItem::MarketCap),
            &LineItem::MarketCap.pattern(strategy),
            TOP_RATIO_VALUE,
        );
        debug!(?market_cap, "market cap");

        Self {
            sales: series(LineItem::Sales),
            operating_profit: series(LineItem::OperatingProfit),
            net_profit: series(LineItem::NetProfit),
            eps: series(LineItem::Eps),
            interest: series(LineItem::Interest),
            cash_equivalents: series(LineItem::CashEquivalents),
            long_term_borrowings: series(LineItem::LongTermBorrowings),
            short_term_borrowings: series(LineItem::ShortTermBorrowings),
            equity: series(LineItem::Equity),
            reserves: series(LineItem::Reserves),
            cash_from_operations: series(LineItem::CashFromOperations),
            fixed_assets_purchased: series(LineItem::FixedAssetsPurchased),
            debtor_days: series(LineItem::DebtorDays),
            market_cap,
        }
    }
}
