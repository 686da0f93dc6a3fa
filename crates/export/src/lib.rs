//! Workbook rendering for the client-activity report.
//!
//! Turns [`ActivityRow`]s into a finished `.xlsx` in memory. The whole file
//! is built before anything is returned, so a failure never leaves a partial
//! artifact behind.

use fleetpulse_core::ActivityRow;
use rust_xlsxwriter::{Format, Table, TableColumn, TableStyle, Workbook, XlsxError};

/// Output column headers, in sheet order.
pub const REPORT_COLUMNS: [&str; 6] = [
    "business_unit",
    "client",
    "week_start",
    "trip_count",
    "flag_active_to_silent",
    "flag_silent_to_active",
];

/// Worksheet the report lands on.
const WORKSHEET_NAME: &str = "report";

/// Excel number format for the `week_start` column.
const DATE_FORMAT: &str = "yyyy-mm-dd";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Workbook rendering failed: {0}")]
    Workbook(#[from] XlsxError),
}

/// Render activity rows into xlsx bytes.
///
/// Layout: bold header row, one data row per [`ActivityRow`] in input order,
/// dates as real date cells, flags as 0/1. The data range is dressed as a
/// banded `Medium4` table without autofilter, the header row is frozen, and
/// columns are autofitted. An empty report still yields a valid workbook
/// with just the header row.
pub fn write_activity_workbook(rows: &[ActivityRow]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(WORKSHEET_NAME)?;

    let header_format = Format::new().set_bold();
    for (col, name) in REPORT_COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &header_format)?;
    }

    let date_format = Format::new().set_num_format(DATE_FORMAT);
    for (index, row) in rows.iter().enumerate() {
        let sheet_row = (index + 1) as u32;
        worksheet.write_string(sheet_row, 0, row.business_unit.as_str())?;
        worksheet.write_string(sheet_row, 1, row.client.as_str())?;
        worksheet.write_datetime_with_format(sheet_row, 2, &row.week_start, &date_format)?;
        worksheet.write_number(sheet_row, 3, row.trips)?;
        worksheet.write_number(sheet_row, 4, u8::from(row.went_silent))?;
        worksheet.write_number(sheet_row, 5, u8::from(row.went_active))?;
    }

    // An Excel table needs at least one data row; the header-only case
    // stays a plain sheet.
    if !rows.is_empty() {
        let columns: Vec<TableColumn> = REPORT_COLUMNS
            .iter()
            .map(|name| TableColumn::new().set_header(*name))
            .collect();
        let table = Table::new()
            .set_name(WORKSHEET_NAME)
            .set_style(TableStyle::Medium4)
            .set_banded_rows(true)
            .set_autofilter(false)
            .set_columns(&columns);
        worksheet.add_table(0, 0, rows.len() as u32, (REPORT_COLUMNS.len() - 1) as u16, &table)?;
    }

    worksheet.set_freeze_panes(1, 0)?;
    worksheet.autofit();

    Ok(workbook.save_to_buffer()?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
