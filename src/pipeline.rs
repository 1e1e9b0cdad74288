// src/pipeline.rs

use scraper::Html;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::config::ScrapeConfig;
use crate::error::{Result, ScrapeError};
use crate::extract::{extract_tables, extract_top_ratios, SectionId, Sections};
use crate::fetch::PageSource;
use crate::metrics::{compute_metrics, compute_quarterly_metrics, MetricInputs, MetricsTable};
use crate::process::{compute_master_periods, normalize, NormalizedTable, Period, RawTable};

/// What one page yielded: a status line plus the normalized tables per section.
#[derive(Debug, Clone)]
pub struct Scrape {
    /// `[INFO]: URL: <url>`
    pub status: String,
    pub sections: Sections,
}

impl Scrape {
    pub fn tables(&self, section: SectionId) -> &[NormalizedTable] {
        self.sections
            .get(&section)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone)]
pub struct Analysis {
    pub periods: Vec<Period>,
    pub yearly: MetricsTable,
    pub quarterly: Option<MetricsTable>,
}

#[derive(Debug, Clone)]
pub struct Report {
    pub scrape: Scrape,
    pub analysis: Analysis,
}

fn section_tables(doc: &Html, section: SectionId, cfg: &ScrapeConfig) -> Vec<NormalizedTable> {
    let raws: Vec<RawTable> = match section {
        SectionId::TopRatios => extract_top_ratios(doc).into_iter().collect(),
        _ => extract_tables(doc, section),
    };
    raws.iter()
        .map(|raw| normalize(raw, section.key_column(), cfg.duplicate_columns))
        .filter(|t| !t.is_empty())
        .collect()
}

/// Extract and normalize every known section of a rendered page.
///
/// Absent sections map to an empty list.
pub fn extract_sections(html: &str, cfg: &ScrapeConfig) -> Sections {
    extract_document(&Html::parse_document(html), cfg)
}

/// [`extract_sections`] over an already parsed document.
pub fn extract_document(doc: &Html, cfg: &ScrapeConfig) -> Sections {
    let mut sections = Sections::new();
    for section in SectionId::ALL {
        let tables = section_tables(doc, section, cfg);
        if tables.is_empty() {
            debug!(%section, "section absent");
        } else {
            debug!(
                %section,
                tables = tables.len(),
                rows = tables.iter().map(|t| t.records().len()).sum::<usize>(),
                "section extracted"
            );
        }
        sections.insert(section, tables);
    }
    sections
}

/// Acquire the page for `symbol` and extract its sections.
#[instrument(level = "info", skip(source, cfg, cancel))]
pub async fn scrape<S>(
    source: &S,
    symbol: &str,
    cfg: &ScrapeConfig,
    cancel: &CancellationToken,
) -> Result<Scrape>
where
    S: PageSource + ?Sized,
{
    if cancel.is_cancelled() {
        return Err(ScrapeError::Cancelled);
    }
    let page = source.acquire(symbol, cancel).await?;
    let status = format!("[INFO]: URL: {}", page.url);
    info!("{}", status);

    let sections = extract_document(&page.parse(), cfg);
    let found = sections.values().filter(|t| !t.is_empty()).count();
    info!(found, of = sections.len(), "sections extracted");
    Ok(Scrape { status, sections })
}

/// Align periods and compute metrics. Fails only when no fiscal year column exists.
#[instrument(level = "info", skip_all)]
pub fn analyze(scrape: &Scrape, cfg: &ScrapeConfig) -> Result<Analysis> {
    let periods = compute_master_periods(scrape.sections.values().flatten(), &cfg.periods)?;
    let inputs = MetricInputs::gather(&scrape.sections, &periods, cfg.matching);
    let yearly = compute_metrics(&inputs, &periods);
    let quarterly = scrape
        .tables(SectionId::Quarters)
        .first()
        .and_then(|t| compute_quarterly_metrics(t, cfg));
    Ok(Analysis {
        periods,
        yearly,
        quarterly,
    })
}

/// [`scrape`] then [`analyze`]; either failing aborts with no partial output.
pub async fn run<S>(
    source: &S,
    symbol: &str,
    cfg: &ScrapeConfig,
    cancel: &CancellationToken,
) -> Result<Report>
where
    S: PageSource + ?Sized,
{
    let scrape = scrape(source, symbol, cfg, cancel).await?;
    let analysis = analyze(&scrape, cfg)?;
    Ok(Report { scrape, analysis })
}
