//! Report window planning over trailing complete weeks.
//!
//! A report week runs Monday through Sunday. The window always ends on the
//! most recent completed Sunday, so the week containing "today" never leaks
//! partial counts into the report.

use chrono::{Datelike, Duration, NaiveDate};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Window length used when the caller does not ask for one.
pub const DEFAULT_TRAILING_WEEKS: usize = 8;
/// Upper bound on the window length (one year of weeks).
pub const MAX_TRAILING_WEEKS: usize = 52;

// ---------------------------------------------------------------------------
// Week arithmetic
// ---------------------------------------------------------------------------

/// Monday of the week containing `date`.
pub fn week_start_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

// ---------------------------------------------------------------------------
// ReportWindow
// ---------------------------------------------------------------------------

/// A contiguous span of complete report weeks.
///
/// Invariants: `start` is a Monday, `end` is a Sunday, and the span covers
/// exactly `weeks` whole weeks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportWindow {
    start: NaiveDate,
    end: NaiveDate,
    weeks: usize,
}

impl ReportWindow {
    /// Plan the window covering the last `weeks` complete weeks before the
    /// week containing `today`.
    ///
    /// Rejects `weeks == 0` and anything above [`MAX_TRAILING_WEEKS`]; a bad
    /// parameter should surface as a validation error, not a silent default.
    pub fn trailing(today: NaiveDate, weeks: usize) -> Result<Self, CoreError> {
        if weeks == 0 || weeks > MAX_TRAILING_WEEKS {
            return Err(CoreError::Validation(format!(
                "weeks must be between 1 and {MAX_TRAILING_WEEKS}, got {weeks}"
            )));
        }

        let days_into_week = i64::from(today.weekday().num_days_from_monday());
        let start = today - Duration::days(days_into_week + weeks as i64 * 7);
        let end = start + Duration::days(weeks as i64 * 7 - 1);

        Ok(Self { start, end, weeks })
    }

    /// First day of the window (always a Monday).
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the window (always a Sunday).
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of weeks covered.
    pub fn weeks(&self) -> usize {
        self.weeks
    }

    /// Monday of the final (most recent) week in the window.
    pub fn last_week_start(&self) -> NaiveDate {
        self.end - Duration::days(6)
    }

    /// The Mondays of every window week, oldest first.
    pub fn week_starts(&self) -> Vec<NaiveDate> {
        (0..self.weeks as i64)
            .map(|offset| self.start + Duration::days(offset * 7))
            .collect()
    }

    /// Whether the week starting on `week_start` (a Monday, as produced by
    /// [`week_start_of`]) falls inside this window.
    pub fn contains_week(&self, week_start: NaiveDate) -> bool {
        week_start >= self.start && week_start <= self.last_week_start()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
