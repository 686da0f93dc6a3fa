//! Trip-billing records: defensive typing of raw warehouse rows and the
//! countability rules deciding which trips feed the activity report.

use chrono::NaiveDate;

use crate::error::CoreError;
use crate::table::{cell, QueryTable};

// ---------------------------------------------------------------------------
// Source schema
// ---------------------------------------------------------------------------

/// Column holding the business unit code.
pub const COL_BUSINESS_UNIT: &str = "udn";
/// Column holding the client name.
pub const COL_CLIENT: &str = "client";
/// Column holding the numeric trip status.
pub const COL_STATUS: &str = "status";
/// Column holding the trip type code.
pub const COL_TRIP_TYPE: &str = "trip_type";
/// Column holding the trip start date.
pub const COL_START_DATE: &str = "start_date";

/// Date format used by the warehouse for `start_date`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ---------------------------------------------------------------------------
// Exclusion rules
// ---------------------------------------------------------------------------

/// Status code marking a voided trip.
pub const VOIDED_STATUS: i64 = 9;
/// Trip type code for ad-hoc special services.
pub const SPECIAL_SERVICE_TYPE: &str = "VA";
/// Client-name prefix for the special-group aggregate accounts.
pub const SPECIAL_GROUP_PREFIX: &str = "GRUPO VIAJES ESPECIALES - ";

// ---------------------------------------------------------------------------
// TripRecord
// ---------------------------------------------------------------------------

/// One trip-billing row, typed defensively.
///
/// Every field is optional: the warehouse serves text, and a cell that is
/// absent, empty, or unparseable becomes `None` rather than an error. Such
/// rows are excluded from counting by [`is_countable`], never fatal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripRecord {
    pub business_unit: Option<String>,
    pub client: Option<String>,
    pub status: Option<i64>,
    pub trip_type: Option<String>,
    pub start_date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

fn required_column(table: &QueryTable, column: &'static str) -> Result<usize, CoreError> {
    table
        .column_index(column)
        .ok_or(CoreError::MissingColumn { column })
}

/// Type a raw result table into [`TripRecord`]s.
///
/// Fails only when a required column is missing from the header. Columns are
/// located by name, so result ordering and extra columns do not matter.
pub fn parse_trip_records(table: &QueryTable) -> Result<Vec<TripRecord>, CoreError> {
    let unit_idx = required_column(table, COL_BUSINESS_UNIT)?;
    let client_idx = required_column(table, COL_CLIENT)?;
    let status_idx = required_column(table, COL_STATUS)?;
    let type_idx = required_column(table, COL_TRIP_TYPE)?;
    let date_idx = required_column(table, COL_START_DATE)?;

    let records = table
        .rows
        .iter()
        .map(|row| TripRecord {
            business_unit: cell(row, unit_idx).map(str::to_string),
            client: cell(row, client_idx).map(str::to_string),
            status: cell(row, status_idx).and_then(|value| value.parse().ok()),
            trip_type: cell(row, type_idx).map(str::to_string),
            start_date: cell(row, date_idx)
                .and_then(|value| NaiveDate::parse_from_str(value, DATE_FORMAT).ok()),
        })
        .collect();

    Ok(records)
}

// ---------------------------------------------------------------------------
// Countability
// ---------------------------------------------------------------------------

/// Whether a record counts toward weekly activity.
///
/// Excluded: voided trips (status 9), special services (type `VA`), the
/// special-group aggregate accounts, and any record with a missing field.
/// Matching is exact; no trimming or case folding is applied.
pub fn is_countable(record: &TripRecord) -> bool {
    let TripRecord {
        business_unit: Some(_),
        client: Some(client),
        status: Some(status),
        trip_type: Some(trip_type),
        start_date: Some(_),
    } = record
    else {
        return false;
    };

    *status != VOIDED_STATUS
        && trip_type.as_str() != SPECIAL_SERVICE_TYPE
        && !client.starts_with(SPECIAL_GROUP_PREFIX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
