// src/report.rs

use serde_json::{json, Map, Value};
use std::{fmt::Write as _, io::Write};
use tracing::debug;

use crate::error::Result;
use crate::extract::Sections;
use crate::metrics::MetricsTable;

/// `{ "<section-id>": [ { "headers": [...], "rows": [[...]] } ] }`, one key per section.
pub fn sections_json(sections: &Sections) -> Value {
    let mut doc = Map::new();
    for (section, tables) in sections {
        let tables: Vec<Value> = tables
            .iter()
            .map(|t| json!({ "headers": t.headers(), "rows": t.rows() }))
            .collect();
        doc.insert(section.id().to_string(), Value::Array(tables));
    }
    Value::Object(doc)
}

fn cell(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

/// `Metric,<period...>` header then one line per metric; missing values are empty cells.
pub fn write_metrics_csv<W: Write>(table: &MetricsTable, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut header = vec!["Metric".to_string()];
    header.extend(table.periods.iter().map(|p| p.label()));
    wtr.write_record(&header)?;
    for (name, series) in &table.rows {
        let mut record = vec![name.clone()];
        record.extend(table.periods.iter().map(|p| cell(series.get(p))));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    debug!(rows = table.rows.len(), "wrote metrics csv");
    Ok(())
}

/// Fixed-width text rendering for terminals; missing values print as `-`.
pub fn render_metrics(table: &MetricsTable) -> String {
    let name_w = table
        .names()
        .map(str::len)
        .chain(std::iter::once("Metric".len()))
        .max()
        .unwrap_or(0);
    let col_w = 12;
    let mut out = String::new();
    let _ = write!(out, "{:<name_w$}", "Metric");
    for p in &table.periods {
        let _ = write!(out, " {:>col_w$}", p.label());
    }
    out.push('\n');
    for (name, series) in &table.rows {
        let _ = write!(out, "{name:<name_w$}");
        for p in &table.periods {
            match series.get(p) {
                Some(v) => {
                    let _ = write!(out, " {v:>col_w$.2}");
                }
                None => {
                    let _ = write!(out, " {:>col_w$}", "-");
                }
            }
        }
        out.push('\n');
    }
    out
}
