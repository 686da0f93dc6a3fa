//! Warehouse connectivity checks and ad-hoc query endpoints.
//!
//! The health endpoints are always mounted. The query endpoints expose raw
//! SQL access and are only mounted in development environments.

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use fleetpulse_athena::{AthenaError, ConnectionReport, QueryRequest, QuerySubmission};
use fleetpulse_core::QueryTable;

use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response payloads
// ---------------------------------------------------------------------------

/// Optional `?database=` query parameter shared by several endpoints.
#[derive(Debug, Deserialize)]
pub struct DatabaseParam {
    database: Option<String>,
}

impl DatabaseParam {
    fn key_or_default(&self, state: &AppState) -> String {
        self.database
            .clone()
            .unwrap_or_else(|| state.executor.default_database().to_string())
    }
}

/// Health summary across every configured database.
#[derive(Debug, Serialize)]
struct AllDatabasesHealth {
    service: &'static str,
    results: BTreeMap<String, CheckOutcome>,
}

/// Per-database outcome inside [`AllDatabasesHealth`].
///
/// Healthy entries serialize as the connection report itself; unhealthy
/// entries as a `{ status, message }` object.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum CheckOutcome {
    Healthy(ConnectionReport),
    Unhealthy {
        status: &'static str,
        message: String,
    },
}

/// Query result payload: the table plus a row count for convenience.
#[derive(Debug, Serialize)]
struct QueryResults {
    #[serde(flatten)]
    table: QueryTable,
    row_count: usize,
}

impl From<QueryTable> for QueryResults {
    fn from(table: QueryTable) -> Self {
        let row_count = table.row_count();
        Self { table, row_count }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /athena/health -- connectivity check for one database.
async fn athena_health(
    State(state): State<AppState>,
    Query(params): Query<DatabaseParam>,
) -> AppResult<Json<ConnectionReport>> {
    let key = params.key_or_default(&state);
    let report = state
        .executor
        .check_connection(&key)
        .await
        .map_err(health_error)?;
    Ok(Json(report))
}

/// GET /athena/health/all -- connectivity check for every configured database.
///
/// Always answers 200; per-database failures are reported in the body so one
/// broken database does not mask the state of the others.
async fn athena_health_all(State(state): State<AppState>) -> Json<AllDatabasesHealth> {
    let keys: Vec<String> = state.executor.databases().keys().cloned().collect();

    let mut results = BTreeMap::new();
    for key in keys {
        let outcome = match state.executor.check_connection(&key).await {
            Ok(report) => CheckOutcome::Healthy(report),
            Err(err) => CheckOutcome::Unhealthy {
                status: "unhealthy",
                message: err.to_string(),
            },
        };
        results.insert(key, outcome);
    }

    Json(AllDatabasesHealth {
        service: "aws-athena",
        results,
    })
}

/// GET /athena/databases -- the configured database key/name map.
async fn list_databases(
    State(state): State<AppState>,
) -> Json<DataResponse<BTreeMap<String, String>>> {
    let databases: BTreeMap<String, String> = state
        .executor
        .databases()
        .iter()
        .map(|(key, name)| (key.clone(), name.clone()))
        .collect();
    Json(DataResponse::new(databases))
}

/// POST /athena/query -- submit a query and return its execution id.
async fn submit_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> AppResult<Json<DataResponse<QuerySubmission>>> {
    validate_query(&request.query)?;
    let database_key = request.database_key_or(state.executor.default_database());
    let submission = state
        .executor
        .start_query(database_key, &request.query)
        .await?;
    Ok(Json(DataResponse::new(submission)))
}

/// POST /athena/query/sync -- run a query to completion and return its rows.
async fn execute_query_sync(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> AppResult<Json<DataResponse<QueryResults>>> {
    validate_query(&request.query)?;
    let table = state.executor.execute_and_wait(&request).await?;
    Ok(Json(DataResponse::new(table.into())))
}

/// GET /athena/query/{execution_id} -- fetch results for a finished query.
async fn query_results(
    State(state): State<AppState>,
    Path(execution_id): Path<String>,
    Query(params): Query<DatabaseParam>,
) -> AppResult<Json<DataResponse<QueryResults>>> {
    let key = params.key_or_default(&state);
    let table = state.executor.fetch_results(&key, &execution_id).await?;
    Ok(Json(DataResponse::new(table.into())))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate_query(query: &str) -> AppResult<()> {
    if query.trim().is_empty() {
        return Err(AppError::BadRequest("Query must not be empty".into()));
    }
    Ok(())
}

/// Map connectivity failures for the single-database health endpoint.
///
/// An unknown key stays a 400; anything else means the warehouse could not
/// be reached and surfaces as 503.
fn health_error(err: AthenaError) -> AppError {
    match err {
        AthenaError::UnknownDatabase(_) => AppError::from(err),
        other => AppError::ServiceUnavailable(other.to_string()),
    }
}

/// Mount warehouse routes (intended to be nested under `/athena`).
pub fn router(config: &ServerConfig) -> Router<AppState> {
    let mut router = Router::new()
        .route("/health", get(athena_health))
        .route("/health/all", get(athena_health_all));

    if config.dev_routes_enabled() {
        router = router
            .route("/databases", get(list_databases))
            .route("/query", post(submit_query))
            .route("/query/sync", post(execute_query_sync))
            .route("/query/{execution_id}", get(query_results));
    }

    router
}
