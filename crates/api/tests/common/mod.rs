//! Shared helpers for API integration tests.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use fleetpulse_api::config::ServerConfig;
use fleetpulse_api::router::build_app_router;
use fleetpulse_api::state::AppState;
use fleetpulse_athena::{
    AthenaError, ConnectionReport, QueryExecutor, QueryRequest, QuerySubmission,
};
use fleetpulse_core::QueryTable;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        environment: "development".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Stub query executor
// ---------------------------------------------------------------------------

/// Query executor stub with a canned response.
///
/// Database keys are still validated against the configured map, so tests
/// exercise the unknown-key path; beyond that, every query answers with the
/// same table (or error), regardless of SQL.
pub struct StubExecutor {
    databases: HashMap<String, String>,
    default_database: String,
    respond: Box<dyn Fn() -> Result<QueryTable, AthenaError> + Send + Sync>,
}

impl StubExecutor {
    /// Stub whose every query succeeds with `table`.
    pub fn with_table(table: QueryTable) -> Self {
        Self::new(Box::new(move || Ok(table.clone())))
    }

    /// Stub whose every query fails with the error built by `make`.
    pub fn with_error(make: fn() -> AthenaError) -> Self {
        Self::new(Box::new(move || Err(make())))
    }

    /// Replace the configured database map.
    pub fn with_databases(mut self, entries: &[(&str, &str)]) -> Self {
        self.databases = entries
            .iter()
            .map(|(key, name)| (key.to_string(), name.to_string()))
            .collect();
        self
    }

    /// Change the default database key the stub reports.
    pub fn with_default_database(mut self, key: &str) -> Self {
        self.default_database = key.to_string();
        self
    }

    fn new(respond: Box<dyn Fn() -> Result<QueryTable, AthenaError> + Send + Sync>) -> Self {
        let databases = HashMap::from([
            ("bustrax".to_string(), "s3_bustrax".to_string()),
            ("analytics".to_string(), "s3_prod_analytics".to_string()),
        ]);
        Self {
            databases,
            default_database: "bustrax".to_string(),
            respond,
        }
    }

    fn resolve(&self, database_key: &str) -> Result<&str, AthenaError> {
        self.databases
            .get(database_key)
            .map(String::as_str)
            .ok_or_else(|| AthenaError::UnknownDatabase(database_key.to_string()))
    }
}

#[async_trait]
impl QueryExecutor for StubExecutor {
    fn databases(&self) -> &HashMap<String, String> {
        &self.databases
    }

    fn default_database(&self) -> &str {
        &self.default_database
    }

    async fn start_query(
        &self,
        database_key: &str,
        _sql: &str,
    ) -> Result<QuerySubmission, AthenaError> {
        let database_name = self.resolve(database_key)?.to_string();
        Ok(QuerySubmission {
            query_execution_id: "stub-execution-id".to_string(),
            database_name,
        })
    }

    async fn fetch_results(
        &self,
        database_key: &str,
        _execution_id: &str,
    ) -> Result<QueryTable, AthenaError> {
        self.resolve(database_key)?;
        (self.respond)()
    }

    async fn execute_and_wait(&self, request: &QueryRequest) -> Result<QueryTable, AthenaError> {
        self.resolve(request.database_key_or(self.default_database()))?;
        (self.respond)()
    }

    async fn check_connection(
        &self,
        database_key: &str,
    ) -> Result<ConnectionReport, AthenaError> {
        let database_name = self.resolve(database_key)?.to_string();
        // A stub that cannot answer queries should not look reachable either.
        (self.respond)()?;
        Ok(ConnectionReport {
            database_key: database_key.to_string(),
            database_name: database_name.clone(),
            database_exists: true,
            available_databases: vec![database_name],
        })
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build the full application router around a stubbed executor.
///
/// Uses [`build_app_router`] so integration tests exercise the same
/// middleware stack (CORS, request ID, timeout, tracing, panic recovery)
/// that production uses.
pub fn build_test_app(executor: StubExecutor) -> Router {
    build_test_app_with_config(executor, test_config())
}

/// As [`build_test_app`], but with a caller-supplied configuration.
pub fn build_test_app_with_config(executor: StubExecutor, config: ServerConfig) -> Router {
    let state = AppState {
        config: Arc::new(config.clone()),
        executor: Arc::new(executor),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request / response helpers
// ---------------------------------------------------------------------------

/// Send a GET request to the app and return the response.
pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect the response body and parse it as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect the response body as raw bytes.
pub async fn body_bytes(response: Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}
