use serde::Serialize;
use tracing::debug;

/// One `<table>` as it came off the page: header cells plus body rows, all text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawTable {
    /// Cells of the header row (the `thead` row, or the first row when there is none).
    pub headers: Vec<String>,
    /// Each body row, one string per cell. May contain rows of the wrong width.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.rows.is_empty()
    }

    /// Rows whose width matches the header; the rest are skipped and logged.
    pub fn well_formed_rows(&self) -> impl Iterator<Item = &Vec<String>> + '_ {
        let width = self.headers.len();
        self.rows.iter().enumerate().filter_map(move |(idx, row)| {
            if row.len() == width {
                Some(row)
            } else {
                debug!(
                    row = idx,
                    cells = row.len(),
                    headers = width,
                    "dropping malformed row"
                );
                None
            }
        })
    }
}
