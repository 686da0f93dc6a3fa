use std::sync::Arc;

use fleetpulse_athena::QueryExecutor;

use crate::config::ServerConfig;

/// Shared application state, cloned into every handler.
///
/// The query executor sits behind a trait object so tests can swap the real
/// Athena client for a stub without touching the routing layer.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration loaded at startup.
    pub config: Arc<ServerConfig>,
    /// Executor used for all warehouse queries.
    pub executor: Arc<dyn QueryExecutor>,
}
