mod common;

use common::{RecordingReporter, StubFetcher};
use cotacao_bot::orchestrator::ACTIVITY_LABEL;
use cotacao_bot::services::AlertType;
use cotacao_bot::{process_rows, RowOutcome, Table};
use serde_json::json;

#[tokio::test]
async fn test_all_rows_succeed() {
    let fetcher = StubFetcher::default()
        .with_quote("dólar", "5,00", "11 de junho de 2025")
        .with_quote("euro", "6,10", "11 de junho de 2025");
    let reporter = RecordingReporter::default();
    let mut table = Table::from_currencies(["dólar", "euro"]);

    let report = process_rows(&fetcher, &mut table, &reporter).await;

    assert_eq!(report.result.total, 2);
    assert_eq!(report.result.processed, 2);
    assert_eq!(report.result.failed, 0);
    assert!(table
        .rows()
        .iter()
        .all(|r| !r.rate.is_empty() && !r.as_of_date.is_empty()));
    assert_eq!(table.rows()[1].rate, "6,10");

    let entries = reporter.log_entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(
        entries[0],
        json!({ "moeda": "dólar", "cotacao": "5,00", "data": "11 de junho de 2025" })
    );
    assert!(reporter.events().iter().all(|e| match e {
        common::Event::LogEntry { label, .. } => label == ACTIVITY_LABEL,
        _ => true,
    }));
}

#[tokio::test]
async fn test_missing_currency_counts_as_failed_without_fetch() {
    let fetcher = StubFetcher::default().with_quote("euro", "6,10", "hoje");
    let reporter = RecordingReporter::default();
    let mut table = Table::from_currencies(["", "euro", "   "]);

    let report = process_rows(&fetcher, &mut table, &reporter).await;

    assert_eq!(report.result.processed, 1);
    assert_eq!(report.result.failed, 2);
    assert_eq!(fetcher.calls(), vec!["euro".to_string()]);
    assert!(matches!(report.outcomes[0], RowOutcome::MissingCurrency));
    assert!(matches!(report.outcomes[2], RowOutcome::MissingCurrency));
    assert!(table.rows()[0].rate.is_empty());
    assert!(table.rows()[0].as_of_date.is_empty());
}

#[tokio::test]
async fn test_failed_row_does_not_abort_batch() {
    let fetcher = StubFetcher::default()
        .with_quote("dólar", "5,00", "hoje")
        .with_quote("iene", "0,03", "hoje");
    let reporter = RecordingReporter::default();
    let mut table = Table::from_currencies(["dólar", "euro", "iene"]);

    let report = process_rows(&fetcher, &mut table, &reporter).await;

    assert_eq!(report.result.processed, 2);
    assert_eq!(report.result.failed, 1);
    assert_eq!(fetcher.calls(), vec!["dólar", "euro", "iene"]);

    assert!(table.rows()[1].rate.is_empty());
    assert_eq!(table.rows()[2].rate, "0,03");

    match &report.outcomes[1] {
        RowOutcome::FetchFailure(e) => assert_eq!(e.currency, "euro"),
        other => panic!("期望 FetchFailure, 实际: {:?}", other),
    }

    let errors: Vec<_> = reporter
        .alerts()
        .into_iter()
        .filter(|a| a.alert_type == AlertType::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].title.contains("euro"));
}

#[tokio::test]
async fn test_repeated_currency_is_fetched_again() {
    let fetcher = StubFetcher::default().with_quote("dólar", "5,00", "hoje");
    let reporter = RecordingReporter::default();
    let mut table = Table::from_currencies(["dólar", "dólar"]);

    let report = process_rows(&fetcher, &mut table, &reporter).await;

    assert_eq!(report.result.processed, 2);
    assert_eq!(fetcher.calls().len(), 2);
}

#[tokio::test]
async fn test_empty_table() {
    let fetcher = StubFetcher::default();
    let reporter = RecordingReporter::default();
    let mut table = Table::default();

    let report = process_rows(&fetcher, &mut table, &reporter).await;

    assert_eq!(report.result.total, 0);
    assert_eq!(report.result.processed, 0);
    assert_eq!(report.result.failed, 0);
    assert!(reporter.events().is_empty());
}
