use screener_scrape::{
    extract::SectionId,
    fetch::StaticSource,
    metrics,
    pipeline::{self, Report},
    process::Period,
    report, ScrapeConfig, ScrapeError,
};
use tokio_util::sync::CancellationToken;

const FIXTURE: &str = include_str!("fixtures/company.html");

async fn run_fixture(html: &str) -> Result<Report, ScrapeError> {
    let cfg = ScrapeConfig::default();
    let source = StaticSource::new(&cfg, html);
    pipeline::run(&source, "acme", &cfg, &CancellationToken::new()).await
}

fn p(label: &str) -> Period {
    label.parse().unwrap()
}

#[tokio::test]
async fn full_page_yields_every_section_and_metric() {
    let report = run_fixture(FIXTURE).await.unwrap();
    assert_eq!(
        report.scrape.status,
        "[INFO]: URL: https://www.screener.in/company/ACME/consolidated/"
    );
    for section in SectionId::ALL {
        assert!(
            !report.scrape.tables(section).is_empty(),
            "{section} should have a table"
        );
    }
    assert_eq!(report.scrape.tables(SectionId::ProfitLoss).len(), 1);
    assert_eq!(report.scrape.tables(SectionId::Peers)[0].key_column(), "Company");

    // Mar 2016..Mar 2025 seen; the latest eight kept
    let labels: Vec<String> = report.analysis.periods.iter().map(Period::label).collect();
    let expected: Vec<String> = (2018..=2025).map(|y| format!("Mar {y}")).collect();
    assert_eq!(labels, expected);

    let yearly = &report.analysis.yearly;
    assert_eq!(yearly.len(), 17);
    let at = |name: &str, period: &str| yearly.get(name).unwrap().get(&p(period));

    assert_eq!(at(metrics::SALES, "Mar 2024"), Some(1600.0));
    assert_eq!(at(metrics::OPERATING_MARGIN, "Mar 2024"), Some(20.0));
    assert_eq!(at(metrics::INTEREST_COVERAGE, "Mar 2024"), Some(10.0));
    assert_eq!(at(metrics::FREE_CASH_FLOW, "Mar 2024"), Some(175.0));
    assert_eq!(at(metrics::TOTAL_CAPITAL_EMPLOYED, "Mar 2024"), Some(1500.0));
    assert_eq!(at(metrics::ROCE, "Mar 2024"), Some(21.33));
    assert_eq!(at(metrics::ROE, "Mar 2024"), Some(15.0));
    assert_eq!(at(metrics::EV_EBIT, "Mar 2024"), Some(38.13));
    assert_eq!(at(metrics::EPS, "Mar 2024"), Some(18.0));
    assert_eq!(at(metrics::DEBTOR_DAYS, "Mar 2024"), Some(46.0));
}

#[tokio::test]
async fn missing_operands_stay_missing() {
    let report = run_fixture(FIXTURE).await.unwrap();
    let yearly = &report.analysis.yearly;
    let at = |name: &str, period: &str| yearly.get(name).unwrap().get(&p(period));

    // zero sales
    assert_eq!(at(metrics::OPERATING_MARGIN, "Mar 2021"), None);
    assert_eq!(at(metrics::INTEREST_COVERAGE, "Mar 2021"), Some(-2.0));
    // blank short term borrowings cell
    assert_eq!(at(metrics::TOTAL_CAPITAL_EMPLOYED, "Mar 2022"), None);
    assert_eq!(at(metrics::ROCE, "Mar 2022"), None);
    assert_eq!(at(metrics::EV_EBIT, "Mar 2022"), None);
    // cash flow starts in 2020
    assert_eq!(at(metrics::FREE_CASH_FLOW, "Mar 2019"), None);
    // only the quarterly table reaches Mar 2025
    assert_eq!(at(metrics::SALES, "Mar 2025"), None);
}

#[tokio::test]
async fn quarterly_metrics_cover_quarter_columns() {
    let report = run_fixture(FIXTURE).await.unwrap();
    let q = report.analysis.quarterly.expect("quarterly metrics");
    let labels: Vec<String> = q.periods.iter().map(Period::label).collect();
    assert_eq!(labels, vec!["Jun 2024", "Sep 2024", "Dec 2024", "Mar 2025"]);
    let opm = q.get(metrics::OPERATING_MARGIN).unwrap();
    assert!(opm.values().all(|v| v == Some(20.0)));
    let cov = q.get(metrics::INTEREST_COVERAGE).unwrap();
    assert_eq!(cov.values().collect::<Vec<_>>(), vec![Some(10.0), None, Some(10.0), Some(8.0)]);
}

#[tokio::test]
async fn absent_balance_sheet_is_not_fatal() {
    let html = FIXTURE.replace(r#"id="balance-sheet""#, r#"id="balance-sheet-hidden""#);
    let report = run_fixture(&html).await.unwrap();
    assert!(report.scrape.tables(SectionId::BalanceSheet).is_empty());

    let yearly = &report.analysis.yearly;
    for name in [
        metrics::TOTAL_CAPITAL_EMPLOYED,
        metrics::ROCE,
        metrics::ROE,
        metrics::EV_EBIT,
        metrics::CASH_EQUIVALENTS,
    ] {
        let series = yearly.get(name).unwrap();
        assert_eq!(series.len(), 8, "{name}");
        assert!(series.is_all_missing(), "{name}");
    }
    assert_eq!(
        yearly.get(metrics::OPERATING_MARGIN).unwrap().get(&p("Mar 2024")),
        Some(20.0)
    );
}

#[tokio::test]
async fn page_without_fiscal_years_is_fatal() {
    let html = r#"<html><body><section id="quarters"><table>
        <thead><tr><th></th><th>Jun 2024</th><th>Sep 2024</th></tr></thead>
        <tbody><tr><td>Sales</td><td>1</td><td>2</td></tr></tbody>
    </table></section></body></html>"#;
    let err = run_fixture(html).await.unwrap_err();
    assert!(matches!(err, ScrapeError::NoFiscalPeriods));
}

#[tokio::test]
async fn json_and_csv_exports() -> anyhow::Result<()> {
    let report = run_fixture(FIXTURE).await?;

    let doc = report::sections_json(&report.scrape.sections);
    let obj = doc.as_object().unwrap();
    assert_eq!(obj.len(), SectionId::ALL.len());
    assert_eq!(doc["peers"][0]["headers"][0], "Company");
    assert_eq!(doc["peers"][0]["rows"][1][1], "Globex Corp");
    assert_eq!(doc["top-ratios"][0]["headers"], serde_json::json!(["Parameters", "Value"]));

    let tmp = tempfile::NamedTempFile::new()?;
    report::write_metrics_csv(&report.analysis.yearly, tmp.reopen()?)?;
    let text = std::fs::read_to_string(tmp.path())?;
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("Metric,Mar 2018,Mar 2019,Mar 2020,Mar 2021,Mar 2022,Mar 2023,Mar 2024,Mar 2025")
    );
    assert!(text.lines().any(|l| l == "Debtor Days,,,,40,42,44,46,"));
    Ok(())
}
