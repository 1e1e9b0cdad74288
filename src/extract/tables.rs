// src/extract/tables.rs

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace};

use super::SectionId;
use crate::process::{normalize_ws, RawTable};

static TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").expect("table selector"));
static TR: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("tr selector"));

/// Every `<table>` inside the element whose id is `section.id()`.
///
/// A section missing from the page yields an empty list.
pub fn extract_tables(doc: &Html, section: SectionId) -> Vec<RawTable> {
    let selector = match Selector::parse(&format!(r#"[id="{}"]"#, section.id())) {
        Ok(s) => s,
        Err(e) => {
            debug!(section = %section, error = ?e, "bad section selector");
            return Vec::new();
        }
    };
    let Some(root) = doc.select(&selector).next() else {
        debug!(section = %section, "section not present");
        return Vec::new();
    };

    let tables: Vec<RawTable> = root.select(&TABLE).map(parse_table).collect();
    debug!(section = %section, tables = tables.len(), "extracted tables");
    tables
}

/// Nearest enclosing element named `name`, stopping at the first `<table>`.
fn enclosing<'a>(el: &ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| a.value().name() == name || a.value().name() == "table")
        .filter(|a| a.value().name() == name)
}

fn owned_by(tr: &ElementRef<'_>, table: &ElementRef<'_>) -> bool {
    enclosing(tr, "table").map_or(false, |t| t.id() == table.id())
}

fn cells(tr: &ElementRef<'_>) -> Vec<String> {
    tr.children()
        .filter_map(ElementRef::wrap)
        .filter(|c| matches!(c.value().name(), "th" | "td"))
        .map(|c| normalize_ws(&c.text().collect::<Vec<_>>().join(" ")))
        .collect()
}

/// Header is the first `thead` row when there is one, otherwise the first row.
pub(crate) fn parse_table(table: ElementRef<'_>) -> RawTable {
    let rows: Vec<ElementRef<'_>> = table.select(&TR).filter(|tr| owned_by(tr, &table)).collect();
    if rows.is_empty() {
        return RawTable::default();
    }

    let header_idx = rows
        .iter()
        .position(|tr| enclosing(tr, "thead").is_some())
        .unwrap_or(0);
    let headers = cells(&rows[header_idx]);

    let body: Vec<Vec<String>> = rows
        .iter()
        .enumerate()
        .filter(|(idx, tr)| *idx != header_idx && enclosing(tr, "thead").is_none())
        .map(|(_, tr)| cells(tr))
        .filter(|row| !row.is_empty())
        .collect();

    trace!(headers = ?headers, rows = body.len(), "parsed table");
    RawTable::new(headers, body)
}
