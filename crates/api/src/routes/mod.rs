pub mod athena;
pub mod health;
pub mod reports;

use axum::Router;

use crate::config::ServerConfig;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /reports/client-activity             weekly activity workbook (GET, xlsx)
///
/// /athena/health                       connectivity for one database (GET)
/// /athena/health/all                   connectivity for all databases (GET)
///
/// Development only (`ENVIRONMENT` = development | devel):
/// /athena/databases                    configured database map (GET)
/// /athena/query                        submit a query, return its id (POST)
/// /athena/query/sync                   run a query to completion (POST)
/// /athena/query/{execution_id}         fetch results by execution id (GET)
/// ```
pub fn api_routes(config: &ServerConfig) -> Router<AppState> {
    Router::new()
        // Report downloads.
        .nest("/reports", reports::router())
        // Warehouse connectivity and ad-hoc queries.
        .nest("/athena", athena::router(config))
}
