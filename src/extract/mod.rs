// src/extract/mod.rs
pub mod tables;
pub mod top_ratios;

pub use tables::extract_tables;
pub use top_ratios::extract_top_ratios;

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

use crate::process::{NormalizedTable, COMPANY, PARAMETERS};

/// Normalized tables per section. Every [`SectionId`] has an entry, possibly empty.
pub type Sections = BTreeMap<SectionId, Vec<NormalizedTable>>;

/// The fixed set of page regions the pipeline knows about.
///
/// Declaration order is the order sections are scraped and reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionId {
    Quarters,
    ProfitLoss,
    Peers,
    BalanceSheet,
    CashFlow,
    Ratios,
    Shareholding,
    /// Synthetic: built from the `ul#top-ratios` label list, not a table.
    TopRatios,
}

impl SectionId {
    /// Sections located by element id and read as `<table>`s.
    pub const TABLE_SECTIONS: [SectionId; 7] = [
        SectionId::Quarters,
        SectionId::ProfitLoss,
        SectionId::Peers,
        SectionId::BalanceSheet,
        SectionId::CashFlow,
        SectionId::Ratios,
        SectionId::Shareholding,
    ];

    pub const ALL: [SectionId; 8] = [
        SectionId::Quarters,
        SectionId::ProfitLoss,
        SectionId::Peers,
        SectionId::BalanceSheet,
        SectionId::CashFlow,
        SectionId::Ratios,
        SectionId::Shareholding,
        SectionId::TopRatios,
    ];

    /// Element id on the page.
    pub fn id(&self) -> &'static str {
        match self {
            SectionId::Quarters => "quarters",
            SectionId::ProfitLoss => "profit-loss",
            SectionId::Peers => "peers",
            SectionId::BalanceSheet => "balance-sheet",
            SectionId::CashFlow => "cash-flow",
            SectionId::Ratios => "ratios",
            SectionId::Shareholding => "shareholding",
            SectionId::TopRatios => "top-ratios",
        }
    }

    /// Display name used by tabbed front-ends.
    pub fn title(&self) -> &'static str {
        match self {
            SectionId::Quarters => "Qtrly. P&L",
            SectionId::ProfitLoss => "Yearly P&L",
            SectionId::Peers => "Peers",
            SectionId::BalanceSheet => "Balance Sheet",
            SectionId::CashFlow => "Cash Flow",
            SectionId::Ratios => "Ratios",
            SectionId::Shareholding => "Shareholding",
            SectionId::TopRatios => "Top Ratios",
        }
    }

    /// Name given to the first column on normalization.
    pub fn key_column(&self) -> &'static str {
        match self {
            SectionId::Peers => COMPANY,
            _ => PARAMETERS,
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
