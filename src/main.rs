use anyhow::{Context, Result};
use clap::Parser;
use screener_scrape::{
    extract::SectionId,
    fetch::{BrowserSource, HttpSource, PageSource, StaticSource},
    pipeline, report, ScrapeConfig,
};
use std::{fs::File, io::BufWriter, path::PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// Scrape a company's financial statements and derive yearly metrics.
#[derive(Debug, Parser)]
#[command(name = "screener-scrape", version)]
struct Cli {
    /// Ticker symbol, e.g. TCS
    symbol: String,

    /// Read a saved page instead of fetching
    #[arg(long, value_name = "FILE", conflicts_with = "http")]
    html: Option<PathBuf>,

    /// Plain HTTP GET instead of a headless browser (collapsed rows stay collapsed)
    #[arg(long)]
    http: bool,

    /// YAML config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the sections as JSON instead of the summary
    #[arg(long)]
    json: bool,

    /// Also write the yearly metrics as CSV
    #[arg(long, value_name = "FILE")]
    metrics_csv: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,screener_scrape=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // ─── 2) config ───────────────────────────────────────────────────
    let cfg = match &cli.config {
        Some(path) => ScrapeConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ScrapeConfig::from_env().context("reading environment overrides")?,
    };

    // ─── 3) pick a page source ───────────────────────────────────────
    let source: Box<dyn PageSource> = match (&cli.html, cli.http) {
        (Some(path), _) => Box::new(
            StaticSource::from_file(&cfg, path)
                .with_context(|| format!("reading {}", path.display()))?,
        ),
        (None, true) => Box::new(HttpSource::new(&cfg).context("building HTTP client")?),
        (None, false) => Box::new(BrowserSource::new(&cfg)),
    };

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received; cancelling");
                cancel.cancel();
            }
        });
    }

    // ─── 4) scrape + analyze ─────────────────────────────────────────
    let report = pipeline::run(source.as_ref(), &cli.symbol, &cfg, &cancel)
        .await
        .with_context(|| format!("scraping {}", cli.symbol))?;

    if let Some(path) = &cli.metrics_csv {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        report::write_metrics_csv(&report.analysis.yearly, BufWriter::new(file))
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "metrics csv written");
    }

    // ─── 5) output ───────────────────────────────────────────────────
    if cli.json {
        let doc = report::sections_json(&report.scrape.sections);
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!("{}", report.scrape.status);
    for section in SectionId::ALL {
        let tables = report.scrape.tables(section);
        println!("{:<14} {} table(s)", section.title(), tables.len());
    }
    let window: Vec<String> = report.analysis.periods.iter().map(|p| p.label()).collect();
    println!("\nPeriods: {}", window.join(", "));
    println!("\n{}", report::render_metrics(&report.analysis.yearly));
    if let Some(q) = &report.analysis.quarterly {
        println!("Quarterly\n{}", report::render_metrics(q));
    }
    Ok(())
}
