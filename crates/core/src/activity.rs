//! Weekly client-activity pipeline: aggregation, dense grid, transition flags.
//!
//! The pipeline runs in stages so each one stays independently testable:
//! parse ([`crate::trips`]) → aggregate → densify → detect. The output is a
//! dense grid: every observed client appears in every window week, in a
//! deterministic order, regardless of input row order.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::CoreError;
use crate::table::QueryTable;
use crate::trips::{is_countable, parse_trip_records, TripRecord};
use crate::window::{week_start_of, ReportWindow};

// ---------------------------------------------------------------------------
// ClientKey
// ---------------------------------------------------------------------------

/// Grouping key for one client within one business unit.
///
/// The derived ordering (business unit first, then client, lexicographic by
/// Unicode code point) fixes the report's row order. The same client name
/// under two business units is two independent series.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ClientKey {
    pub business_unit: String,
    pub client: String,
}

// ---------------------------------------------------------------------------
// Weekly aggregation
// ---------------------------------------------------------------------------

/// Per-client trip counts keyed by week start (Monday).
///
/// Only weeks with at least one countable trip are present; zero-filling
/// happens in [`dense_weekly_counts`].
#[derive(Debug, Default)]
pub struct WeeklyAggregate {
    counts: HashMap<ClientKey, HashMap<NaiveDate, u32>>,
}

impl WeeklyAggregate {
    /// Count for `key` in the week starting `week_start` (0 when absent).
    pub fn count_for(&self, key: &ClientKey, week_start: NaiveDate) -> u32 {
        self.counts
            .get(key)
            .and_then(|weeks| weeks.get(&week_start))
            .copied()
            .unwrap_or(0)
    }

    /// Every client key with at least one countable trip, sorted.
    pub fn client_keys(&self) -> Vec<ClientKey> {
        let mut keys: Vec<ClientKey> = self.counts.keys().cloned().collect();
        keys.sort();
        keys
    }
}

/// Bucket countable trips into per-client, per-week counts.
///
/// Records rejected by [`is_countable`], and records whose week falls outside
/// the window, are skipped silently.
pub fn aggregate_weekly(records: &[TripRecord], window: &ReportWindow) -> WeeklyAggregate {
    let mut counts: HashMap<ClientKey, HashMap<NaiveDate, u32>> = HashMap::new();

    for record in records {
        if !is_countable(record) {
            continue;
        }
        // is_countable guarantees these fields are present.
        let (Some(business_unit), Some(client), Some(date)) =
            (&record.business_unit, &record.client, record.start_date)
        else {
            continue;
        };

        let week_start = week_start_of(date);
        if !window.contains_week(week_start) {
            continue;
        }

        let key = ClientKey {
            business_unit: business_unit.clone(),
            client: client.clone(),
        };
        *counts.entry(key).or_default().entry(week_start).or_insert(0) += 1;
    }

    WeeklyAggregate { counts }
}

// ---------------------------------------------------------------------------
// Dense grid
// ---------------------------------------------------------------------------

/// Expand the aggregate into a dense (client × week) grid, zero-filling
/// weeks without trips.
///
/// Returns one entry per observed client, sorted by key, each carrying one
/// count per window week, oldest first.
pub fn dense_weekly_counts(
    aggregate: &WeeklyAggregate,
    window: &ReportWindow,
) -> Vec<(ClientKey, Vec<u32>)> {
    let week_starts = window.week_starts();

    aggregate
        .client_keys()
        .into_iter()
        .map(|key| {
            let counts = week_starts
                .iter()
                .map(|week| aggregate.count_for(&key, *week))
                .collect();
            (key, counts)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Transition detection
// ---------------------------------------------------------------------------

/// One output row of the activity report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityRow {
    pub business_unit: String,
    pub client: String,
    /// Monday of the week this row describes.
    pub week_start: NaiveDate,
    /// Trips this client ran in this week.
    pub trips: u32,
    /// Trips in the preceding window week; `None` on the window's first week.
    pub previous_trips: Option<u32>,
    /// Active in the previous week, silent in this one.
    pub went_silent: bool,
    /// Silent in the previous week, active in this one.
    pub went_active: bool,
}

/// Walk each client's dense series and flag activity transitions.
///
/// A week is compared only against the immediately preceding window week of
/// the same client. The first week has no predecessor and never carries a
/// flag; the two flags are mutually exclusive by construction.
pub fn detect_transitions(
    dense: Vec<(ClientKey, Vec<u32>)>,
    window: &ReportWindow,
) -> Vec<ActivityRow> {
    let week_starts = window.week_starts();
    let mut rows = Vec::with_capacity(dense.len() * week_starts.len());

    for (key, counts) in dense {
        for (position, (&week_start, &trips)) in
            week_starts.iter().zip(counts.iter()).enumerate()
        {
            let previous_trips = (position > 0).then(|| counts[position - 1]);
            let went_silent = matches!(previous_trips, Some(prev) if prev > 0 && trips == 0);
            let went_active = matches!(previous_trips, Some(prev) if prev == 0 && trips > 0);

            rows.push(ActivityRow {
                business_unit: key.business_unit.clone(),
                client: key.client.clone(),
                week_start,
                trips,
                previous_trips,
                went_silent,
                went_active,
            });
        }
    }

    rows
}

// ---------------------------------------------------------------------------
// Full pipeline
// ---------------------------------------------------------------------------

/// Full transformation: raw result table in, flagged activity rows out.
///
/// The output is dense and deterministic: every observed client appears once
/// per window week, sorted by business unit, client, then week, whatever the
/// input row order was.
pub fn build_activity_report(
    table: &QueryTable,
    window: &ReportWindow,
) -> Result<Vec<ActivityRow>, CoreError> {
    let records = parse_trip_records(table)?;
    let aggregate = aggregate_weekly(&records, window);
    let dense = dense_weekly_counts(&aggregate, window);
    Ok(detect_transitions(dense, window))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
