//! Report generation pipeline.
//!
//! Ties the workspace crates together: build the reporting window, run the
//! trip query against the warehouse, derive the weekly activity rows, and
//! render them into an xlsx workbook.

use chrono::NaiveDate;
use fleetpulse_athena::{QueryExecutor, QueryRequest};
use fleetpulse_core::{build_activity_report, ReportWindow};
use fleetpulse_export::write_activity_workbook;

use crate::error::AppResult;

/// Warehouse table holding one row per billed trip.
const TRIP_BILLING_TABLE: &str = "trip_billing";

/// Parameters for a client-activity report run.
#[derive(Debug, Clone)]
pub struct ReportParams {
    /// Logical database key resolved by the executor.
    pub database_key: String,
    /// Number of trailing complete weeks to report on.
    pub weeks: usize,
    /// Query poll deadline in seconds.
    pub timeout_secs: u64,
}

/// A rendered report ready to be served as a download.
#[derive(Debug)]
pub struct ReportArtifact {
    /// Suggested download file name.
    pub file_name: String,
    /// Number of data rows in the workbook.
    pub row_count: usize,
    /// The xlsx file contents.
    pub bytes: Vec<u8>,
}

/// SQL for the trip rows inside the reporting window.
///
/// The query only narrows by date; status, trip-type, and client filters are
/// applied in `fleetpulse_core` so their rules live in one place.
pub fn trip_billing_query(window: &ReportWindow) -> String {
    format!(
        "SELECT * FROM {TRIP_BILLING_TABLE} WHERE start_date >= '{}' AND start_date <= '{}'",
        window.start(),
        window.end()
    )
}

/// Download file name for a report, stamped with the last window week.
pub fn report_file_name(window: &ReportWindow) -> String {
    format!(
        "client_activity_{}.xlsx",
        window.last_week_start().format("%y%m%d")
    )
}

/// Run the full report pipeline for the given parameters.
pub async fn generate_client_activity_report(
    executor: &dyn QueryExecutor,
    params: &ReportParams,
    today: NaiveDate,
) -> AppResult<ReportArtifact> {
    let window = ReportWindow::trailing(today, params.weeks)?;
    tracing::info!(
        database = %params.database_key,
        start = %window.start(),
        end = %window.end(),
        weeks = window.weeks(),
        "Planning client-activity report"
    );

    let request = QueryRequest {
        database_key: Some(params.database_key.clone()),
        query: trip_billing_query(&window),
        timeout_secs: Some(params.timeout_secs),
    };
    let table = executor.execute_and_wait(&request).await?;
    tracing::info!(rows = table.row_count(), "Trip query returned");

    let rows = build_activity_report(&table, &window)?;
    let bytes = write_activity_workbook(&rows)?;
    tracing::info!(rows = rows.len(), bytes = bytes.len(), "Report rendered");

    Ok(ReportArtifact {
        file_name: report_file_name(&window),
        row_count: rows.len(),
        bytes,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> ReportWindow {
        let today = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();
        ReportWindow::trailing(today, 3).unwrap()
    }

    #[test]
    fn query_narrows_by_window_dates() {
        let sql = trip_billing_query(&window());
        assert!(sql.contains("FROM trip_billing"));
        assert!(sql.contains("start_date >= '2025-02-17'"));
        assert!(sql.contains("start_date <= '2025-03-09'"));
    }

    #[test]
    fn file_name_is_stamped_with_last_week() {
        // Window weeks: Feb 17, Feb 24, Mar 3.
        assert_eq!(report_file_name(&window()), "client_activity_250303.xlsx");
    }
}
