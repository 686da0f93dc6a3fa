//! Pure domain logic for the fleetpulse reporting service.
//!
//! Turns raw trip-billing query results into the weekly client-activity
//! report: defensive row typing, countability rules, trailing-week window
//! planning, weekly aggregation, dense zero-filled grids, and transition
//! flags. Everything here is synchronous and side-effect free; the api crate
//! wires it to Athena and the workbook exporter.

pub mod activity;
pub mod error;
pub mod table;
pub mod trips;
pub mod window;

pub use activity::{build_activity_report, ActivityRow, ClientKey};
pub use error::CoreError;
pub use table::QueryTable;
pub use window::ReportWindow;
