// src/process/normalize.rs

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, trace};

use super::raw_table::RawTable;
use super::utils::{clean_value, normalize_ws};

pub const PARAMETERS: &str = "Parameters";
pub const COMPANY: &str = "Company";

/// How repeated header names are resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateColumns {
    /// One column per distinct name; the rightmost cell wins.
    #[default]
    LastWriteWins,
    /// Later duplicates become `name.1`, `name.2`, ...
    Suffix,
}

/// A single body row keyed by column name. Holds the key column plus every table column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    cells: BTreeMap<String, String>,
}

impl Record {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Canonical form of one extracted table. Built once by [`normalize`], read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedTable {
    key_column: String,
    columns: Vec<String>,
    records: Vec<Record>,
}

impl NormalizedTable {
    pub fn empty(key_column: &str) -> Self {
        Self {
            key_column: key_column.to_string(),
            columns: Vec::new(),
            records: Vec::new(),
        }
    }

    /// Name of the row-label column (`Parameters` or `Company`).
    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    /// Data columns, first-encountered order, key column excluded.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Row label of `record`; empty string when the cell is blank.
    pub fn label<'a>(&self, record: &'a Record) -> &'a str {
        record.get(&self.key_column).unwrap_or("")
    }

    /// Key column followed by the data columns.
    pub fn headers(&self) -> Vec<&str> {
        std::iter::once(self.key_column.as_str())
            .chain(self.columns.iter().map(String::as_str))
            .collect()
    }

    /// Row values in `headers()` order.
    pub fn rows(&self) -> Vec<Vec<&str>> {
        let headers = self.headers();
        self.records
            .iter()
            .map(|r| headers.iter().map(|h| r.get(h).unwrap_or("")).collect())
            .collect()
    }
}

/// Resolve the final column name for every header position.
fn resolve_names(headers: &[String], key_column: &str, strategy: DuplicateColumns) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    headers
        .iter()
        .enumerate()
        .map(|(idx, raw)| {
            let base = if idx == 0 {
                key_column.to_string()
            } else {
                let h = normalize_ws(raw);
                if h.is_empty() {
                    format!("Unnamed: {idx}")
                } else {
                    h
                }
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let name = match strategy {
                DuplicateColumns::Suffix if *count > 0 => format!("{base}.{count}"),
                _ => base,
            };
            *count += 1;
            name
        })
        .collect()
}

/// Convert a raw table into its canonical form.
///
/// The first header becomes `key_column`, every cell goes through [`clean_value`],
/// rows of the wrong width are skipped. An empty raw table yields an empty table.
pub fn normalize(raw: &RawTable, key_column: &str, strategy: DuplicateColumns) -> NormalizedTable {
    if raw.headers.is_empty() {
        return NormalizedTable::empty(key_column);
    }

    let names = resolve_names(&raw.headers, key_column, strategy);
    let mut columns: Vec<String> = Vec::with_capacity(names.len().saturating_sub(1));
    for name in names.iter().skip(1) {
        if name != key_column && !columns.contains(name) {
            columns.push(name.clone());
        }
    }

    let records: Vec<Record> = raw
        .well_formed_rows()
        .map(|row| {
            let mut cells = BTreeMap::new();
            for (name, cell) in names.iter().zip(row) {
                // last write wins when names collide
                cells.insert(name.clone(), clean_value(&normalize_ws(cell)));
            }
            trace!(?cells, "record");
            Record { cells }
        })
        .collect();

    debug!(
        key = key_column,
        columns = columns.len(),
        records = records.len(),
        dropped = raw.rows.len() - records.len(),
        "normalized table"
    );

    NormalizedTable {
        key_column: key_column.to_string(),
        columns,
        records,
    }
}
