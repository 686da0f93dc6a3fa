//! Report download endpoints.

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;

use fleetpulse_athena::DEFAULT_QUERY_TIMEOUT_SECS;
use fleetpulse_core::window::DEFAULT_TRAILING_WEEKS;

use crate::error::AppResult;
use crate::reports::{generate_client_activity_report, ReportParams};
use crate::state::AppState;

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Query parameters for the client-activity report.
#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    /// Logical database key; falls back to the configured default.
    database: Option<String>,
    /// Number of trailing complete weeks to report on.
    #[serde(default = "default_weeks")]
    weeks: usize,
    /// Query poll deadline in seconds.
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

fn default_weeks() -> usize {
    DEFAULT_TRAILING_WEEKS
}

fn default_timeout_secs() -> u64 {
    DEFAULT_QUERY_TIMEOUT_SECS
}

/// GET /reports/client-activity -- generate and download the weekly
/// client-activity workbook.
async fn client_activity_report(
    State(state): State<AppState>,
    Query(params): Query<ReportQuery>,
) -> AppResult<Response> {
    let database_key = params
        .database
        .unwrap_or_else(|| state.executor.default_database().to_string());
    let report_params = ReportParams {
        database_key,
        weeks: params.weeks,
        timeout_secs: params.timeout_secs,
    };

    let artifact = generate_client_activity_report(
        state.executor.as_ref(),
        &report_params,
        Utc::now().date_naive(),
    )
    .await?;

    // All header values are static or numeric, so the builder cannot fail.
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, XLSX_CONTENT_TYPE)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", artifact.file_name),
        )
        .header("x-report-rows", artifact.row_count.to_string())
        .body(Body::from(artifact.bytes))
        .unwrap();
    Ok(response)
}

/// Mount report routes (intended to be nested under `/reports`).
pub fn router() -> Router<AppState> {
    Router::new().route("/client-activity", get(client_activity_report))
}
