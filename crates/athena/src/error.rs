#[derive(Debug, thiserror::Error)]
pub enum AthenaError {
    /// No database is configured under the requested key.
    #[error("Unknown database key: '{0}'")]
    UnknownDatabase(String),

    /// An SDK call failed (credentials, network, throttling, ...).
    #[error("Athena request failed: {0}")]
    Request(String),

    /// The query reached a terminal non-success state.
    #[error("Query {state}: {reason}")]
    QueryFailed { state: String, reason: String },

    /// The query did not finish within the polling deadline.
    #[error("Query timeout after {seconds} seconds")]
    Timeout { seconds: u64 },
}
