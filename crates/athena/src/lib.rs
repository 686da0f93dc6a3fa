//! AWS Athena query execution for fleetpulse.
//!
//! [`AthenaExecutor`] wraps the Athena SDK behind the [`QueryExecutor`]
//! trait: submit a query, poll until it finishes, page the results into a
//! [`fleetpulse_core::QueryTable`]. Connection settings come from the
//! environment via [`AthenaSettings`].

pub mod client;
pub mod config;
pub mod error;

pub use client::{
    AthenaExecutor, ConnectionReport, QueryExecutor, QueryRequest, QuerySubmission,
    DEFAULT_QUERY_TIMEOUT_SECS,
};
pub use config::AthenaSettings;
pub use error::AthenaError;
