// src/metrics/labels.rs

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use crate::extract::SectionId;
use crate::process::{LabelPattern, MatchStrategy};

fn ci(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .expect("label regex")
}

static CASH_EQUIVALENTS: Lazy<Regex> = Lazy::new(|| ci(r"Cash\s*Equivalents|Cash"));
static LONG_TERM_BORROWINGS: Lazy<Regex> = Lazy::new(|| ci(r"Long\s*term\s*Borrowings"));
static SHORT_TERM_BORROWINGS: Lazy<Regex> = Lazy::new(|| ci(r"Short\s*term\s*Borrowings"));
static CASH_FROM_OPERATIONS: Lazy<Regex> =
    Lazy::new(|| ci(r"Cash\s*from\s*Operating\s*Activity"));
static FIXED_ASSETS_PURCHASED: Lazy<Regex> = Lazy::new(|| ci(r"Fixed\s*assets\s*purchased"));

/// Column of the top-ratios table holding the figure.
pub const TOP_RATIO_VALUE: &str = "Value";

/// A raw line item the metrics are computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineItem {
    Sales,
    OperatingProfit,
    NetProfit,
    Eps,
    Interest,
    CashEquivalents,
    LongTermBorrowings,
    ShortTermBorrowings,
    Equity,
    Reserves,
    CashFromOperations,
    FixedAssetsPurchased,
    DebtorDays,
    MarketCap,
}

impl LineItem {
    pub const ALL: [LineItem; 14] = [
        LineItem::Sales,
        LineItem::OperatingProfit,
        LineItem::NetProfit,
        LineItem::Eps,
        LineItem::Interest,
        LineItem::CashEquivalents,
        LineItem::LongTermBorrowings,
        LineItem::ShortTermBorrowings,
        LineItem::Equity,
        LineItem::Reserves,
        LineItem::CashFromOperations,
        LineItem::FixedAssetsPurchased,
        LineItem::DebtorDays,
        LineItem::MarketCap,
    ];

    /// Section the row is looked up in.
    pub fn section(&self) -> SectionId {
        use LineItem::*;
        match self {
            Sales | OperatingProfit | NetProfit | Eps | Interest => SectionId::ProfitLoss,
            CashEquivalents | LongTermBorrowings | ShortTermBorrowings | Equity | Reserves => {
                SectionId::BalanceSheet
            }
            CashFromOperations | FixedAssetsPurchased => SectionId::CashFlow,
            DebtorDays => SectionId::Ratios,
            MarketCap => SectionId::TopRatios,
        }
    }

    pub fn pattern(&self, strategy: MatchStrategy) -> LabelPattern {
        match strategy {
            MatchStrategy::Substring => self.substring_pattern(),
            MatchStrategy::Exact => LabelPattern::exact(self.allowed_labels().iter().copied()),
        }
    }

    fn substring_pattern(&self) -> LabelPattern {
        use LineItem::*;
        match self {
            Sales => LabelPattern::contains("Sales"),
            OperatingProfit => LabelPattern::contains("Operating Profit"),
            NetProfit => LabelPattern::contains("Net Profit"),
            Eps => LabelPattern::contains("EPS in Rs"),
            Interest => LabelPattern::contains("Interest"),
            CashEquivalents => LabelPattern::Regex(CASH_EQUIVALENTS.clone()),
            LongTermBorrowings => LabelPattern::Regex(LONG_TERM_BORROWINGS.clone()),
            ShortTermBorrowings => LabelPattern::Regex(SHORT_TERM_BORROWINGS.clone()),
            Equity => LabelPattern::contains("Equity"),
            Reserves => LabelPattern::contains("Reserves"),
            CashFromOperations => LabelPattern::Regex(CASH_FROM_OPERATIONS.clone()),
            FixedAssetsPurchased => LabelPattern::Regex(FIXED_ASSETS_PURCHASED.clone()),
            DebtorDays => LabelPattern::contains("Debtor Days"),
            MarketCap => LabelPattern::contains("Market Cap"),
        }
    }

    /// Row labels accepted under [`MatchStrategy::Exact`].
    pub fn allowed_labels(&self) -> &'static [&'static str] {
        use LineItem::*;
        match self {
            Sales => &["Sales", "Revenue", "Revenue from Operations"],
            OperatingProfit => &["Operating Profit", "Financing Profit"],
            NetProfit => &["Net Profit"],
            Eps => &["EPS in Rs"],
            Interest => &["Interest"],
            CashEquivalents => &["Cash Equivalents", "Cash & Bank"],
            LongTermBorrowings => &["Long term Borrowings"],
            ShortTermBorrowings => &["Short term Borrowings"],
            Equity => &["Equity Capital", "Share Capital"],
            Reserves => &["Reserves"],
            CashFromOperations => &["Cash from Operating Activity"],
            FixedAssetsPurchased => &["Fixed assets purchased"],
            DebtorDays => &["Debtor Days"],
            MarketCap => &["Market Cap"],
        }
    }
}
