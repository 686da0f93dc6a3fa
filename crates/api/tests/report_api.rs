//! Integration tests for the client-activity report download endpoint.

mod common;

use axum::http::{header, StatusCode};
use chrono::{Duration, NaiveDate, Utc};
use common::{body_bytes, body_json, get, StubExecutor};
use fleetpulse_athena::AthenaError;
use fleetpulse_core::window::week_start_of;
use fleetpulse_core::QueryTable;

/// A date safely inside a four-week trailing window: the Monday two weeks
/// before the current week. Stays valid even if the week rolls over between
/// building the stub and the handler reading the clock.
fn in_window_date() -> NaiveDate {
    week_start_of(Utc::now().date_naive()) - Duration::days(14)
}

fn trip_columns() -> Vec<String> {
    // "fare" stands in for the other columns a SELECT * drags along.
    ["udn", "client", "status", "trip_type", "start_date", "fare"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn trip_row(unit: &str, client: &str, date: NaiveDate) -> Vec<String> {
    vec![
        unit.to_string(),
        client.to_string(),
        "1".to_string(),
        "RE".to_string(),
        date.format("%Y-%m-%d").to_string(),
        "150.00".to_string(),
    ]
}

// ---------------------------------------------------------------------------
// Test: happy path returns an xlsx attachment
// ---------------------------------------------------------------------------

#[tokio::test]
async fn report_download_returns_xlsx_attachment() {
    let date = in_window_date();
    let table = QueryTable::new(
        trip_columns(),
        vec![
            trip_row("NORTE", "ACME SA", date),
            trip_row("NORTE", "ACME SA", date),
        ],
    );

    let app = common::build_test_app(StubExecutor::with_table(table));
    let response = get(app, "/api/v1/reports/client-activity?weeks=4").await;

    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .expect("Missing Content-Type header")
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(
        content_type,
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );

    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .expect("Missing Content-Disposition header")
        .to_str()
        .unwrap()
        .to_string();
    assert!(
        disposition.starts_with("attachment; filename=\"client_activity_"),
        "Unexpected disposition: {disposition}"
    );
    assert!(disposition.ends_with(".xlsx\""), "Unexpected disposition: {disposition}");

    // One client over a four-week window: one row per window week.
    let row_count = response
        .headers()
        .get("x-report-rows")
        .expect("Missing x-report-rows header")
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(row_count, "4");

    // xlsx files are zip archives.
    let bytes = body_bytes(response).await;
    assert_eq!(&bytes[..2], b"PK");
}

// ---------------------------------------------------------------------------
// Test: every observed client gets a full set of window weeks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn report_rows_scale_with_observed_clients() {
    let date = in_window_date();
    let table = QueryTable::new(
        trip_columns(),
        vec![
            trip_row("NORTE", "ACME SA", date),
            trip_row("SUR", "TRANSPORTES RUIZ", date),
        ],
    );

    let app = common::build_test_app(StubExecutor::with_table(table));
    let response = get(app, "/api/v1/reports/client-activity?weeks=4").await;

    assert_eq!(response.status(), StatusCode::OK);

    // Two clients x four weeks.
    let row_count = response
        .headers()
        .get("x-report-rows")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(row_count, "8");
}

// ---------------------------------------------------------------------------
// Test: an empty result set still renders a workbook
// ---------------------------------------------------------------------------

#[tokio::test]
async fn report_with_no_trips_returns_empty_workbook() {
    let table = QueryTable::new(trip_columns(), Vec::new());

    let app = common::build_test_app(StubExecutor::with_table(table));
    let response = get(app, "/api/v1/reports/client-activity").await;

    assert_eq!(response.status(), StatusCode::OK);

    let row_count = response
        .headers()
        .get("x-report-rows")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(row_count, "0");

    let bytes = body_bytes(response).await;
    assert_eq!(&bytes[..2], b"PK");
}

// ---------------------------------------------------------------------------
// Test: parameter validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn report_rejects_zero_weeks() {
    let table = QueryTable::new(trip_columns(), Vec::new());

    let app = common::build_test_app(StubExecutor::with_table(table));
    let response = get(app, "/api/v1/reports/client-activity?weeks=0").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn report_rejects_unknown_database() {
    let table = QueryTable::new(trip_columns(), Vec::new());

    let app = common::build_test_app(StubExecutor::with_table(table));
    let response = get(app, "/api/v1/reports/client-activity?database=nope").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "UNKNOWN_DATABASE");
}

// ---------------------------------------------------------------------------
// Test: upstream failures map to gateway errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn report_maps_query_timeout_to_504() {
    let app = common::build_test_app(StubExecutor::with_error(|| AthenaError::Timeout {
        seconds: 300,
    }));
    let response = get(app, "/api/v1/reports/client-activity").await;

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);

    let json = body_json(response).await;
    assert_eq!(json["code"], "QUERY_TIMEOUT");
    assert_eq!(json["error"], "Query timeout after 300 seconds");
}

#[tokio::test]
async fn report_maps_failed_query_to_502() {
    let app = common::build_test_app(StubExecutor::with_error(|| AthenaError::QueryFailed {
        state: "FAILED".to_string(),
        reason: "SYNTAX_ERROR: line 1:8: Column 'nope' cannot be resolved".to_string(),
    }));
    let response = get(app, "/api/v1/reports/client-activity").await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let json = body_json(response).await;
    assert_eq!(json["code"], "QUERY_FAILED");
}

#[tokio::test]
async fn report_maps_missing_column_to_502() {
    // The warehouse answered, but without the expected trip schema.
    let table = QueryTable::new(
        vec!["foo".to_string(), "bar".to_string()],
        vec![vec!["1".to_string(), "2".to_string()]],
    );

    let app = common::build_test_app(StubExecutor::with_table(table));
    let response = get(app, "/api/v1/reports/client-activity").await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let json = body_json(response).await;
    assert_eq!(json["code"], "UPSTREAM_SCHEMA");
}
