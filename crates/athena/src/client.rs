//! Athena query execution client.
//!
//! Wraps [`aws_sdk_athena::Client`] with the submit → poll → fetch flow the
//! reporting service needs, behind the [`QueryExecutor`] trait so handlers
//! can be tested against a stub.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_athena::error::DisplayErrorContext;
use aws_sdk_athena::types::{QueryExecutionContext, QueryExecutionState, ResultConfiguration};
use fleetpulse_core::QueryTable;
use serde::{Deserialize, Serialize};

use crate::config::AthenaSettings;
use crate::error::AthenaError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Polling deadline applied when a request does not carry its own.
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 300;

/// Delay between successive execution-state polls.
const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Rows requested per results page (the Athena maximum).
const RESULTS_PAGE_SIZE: i32 = 1000;

/// Catalog the connectivity check lists databases from.
const CATALOG_NAME: &str = "AwsDataCatalog";

/// Databases requested by the connectivity check.
const MAX_LISTED_DATABASES: i32 = 20;

/// Databases echoed back in a [`ConnectionReport`].
const REPORTED_DATABASES: usize = 10;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// A raw query request, as accepted by the development query routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Logical database key (see [`AthenaSettings::databases`]); the
    /// executor's configured default when absent.
    #[serde(rename = "database", default)]
    pub database_key: Option<String>,
    /// SQL to execute.
    pub query: String,
    /// Polling deadline override, in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl QueryRequest {
    /// Database key for this request, falling back to `default` when the
    /// request does not name one.
    pub fn database_key_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.database_key.as_deref().unwrap_or(default)
    }

    /// Polling deadline for this request.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_QUERY_TIMEOUT_SECS))
    }
}

/// Acknowledgement for a submitted (not yet finished) query.
#[derive(Debug, Clone, Serialize)]
pub struct QuerySubmission {
    pub query_execution_id: String,
    pub database_name: String,
}

/// Result of a connectivity check against one configured database.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionReport {
    pub database_key: String,
    pub database_name: String,
    /// Whether the configured database shows up in the catalog listing.
    pub database_exists: bool,
    /// First few databases visible in the catalog.
    pub available_databases: Vec<String>,
}

// ---------------------------------------------------------------------------
// QueryExecutor trait
// ---------------------------------------------------------------------------

/// Query execution seam.
///
/// The api crate talks to this trait instead of the SDK client directly, so
/// integration tests can substitute a canned-response stub.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Logical database key → Athena database name, as configured.
    fn databases(&self) -> &HashMap<String, String>;

    /// Key used when a request does not name a database.
    fn default_database(&self) -> &str;

    /// Submit a query without waiting for it to finish.
    async fn start_query(
        &self,
        database_key: &str,
        sql: &str,
    ) -> Result<QuerySubmission, AthenaError>;

    /// Fetch the complete result set of a finished query.
    async fn fetch_results(
        &self,
        database_key: &str,
        execution_id: &str,
    ) -> Result<QueryTable, AthenaError>;

    /// Submit a query, wait for completion, and fetch its results.
    ///
    /// A request without a database key runs against
    /// [`QueryExecutor::default_database`].
    async fn execute_and_wait(&self, request: &QueryRequest) -> Result<QueryTable, AthenaError>;

    /// Verify connectivity and database visibility for one configured key.
    async fn check_connection(&self, database_key: &str)
        -> Result<ConnectionReport, AthenaError>;
}

// ---------------------------------------------------------------------------
// Poll-state classification
// ---------------------------------------------------------------------------

/// Outcome of one execution-state poll.
#[derive(Debug, PartialEq, Eq)]
enum PollOutcome {
    /// Queued or running; keep polling.
    Pending,
    Succeeded,
    /// Terminal non-success state.
    Failed { state: String, reason: String },
}

fn classify_execution(state: Option<&QueryExecutionState>, reason: Option<&str>) -> PollOutcome {
    match state {
        Some(QueryExecutionState::Succeeded) => PollOutcome::Succeeded,
        Some(state @ (QueryExecutionState::Failed | QueryExecutionState::Cancelled)) => {
            PollOutcome::Failed {
                state: state.as_str().to_string(),
                reason: reason.unwrap_or("Unknown error").to_string(),
            }
        }
        // QUEUED, RUNNING, a state this SDK does not know yet, or a response
        // with no status attached.
        _ => PollOutcome::Pending,
    }
}

// ---------------------------------------------------------------------------
// AthenaExecutor
// ---------------------------------------------------------------------------

/// The production [`QueryExecutor`] backed by the AWS SDK.
pub struct AthenaExecutor {
    client: aws_sdk_athena::Client,
    settings: AthenaSettings,
}

impl AthenaExecutor {
    /// Build an executor from settings, loading AWS credentials from the
    /// SDK's default provider chain.
    pub async fn from_settings(settings: AthenaSettings) -> Self {
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(settings.region.clone()))
            .load()
            .await;

        Self {
            client: aws_sdk_athena::Client::new(&sdk_config),
            settings,
        }
    }

    /// Poll the execution state until the query finishes or `timeout` passes.
    pub async fn wait_for_completion(
        &self,
        execution_id: &str,
        timeout: Duration,
    ) -> Result<(), AthenaError> {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            let output = self
                .client
                .get_query_execution()
                .query_execution_id(execution_id)
                .send()
                .await
                .map_err(|e| AthenaError::Request(DisplayErrorContext(e).to_string()))?;

            let status = output.query_execution().and_then(|q| q.status());
            let outcome = classify_execution(
                status.and_then(|s| s.state()),
                status.and_then(|s| s.state_change_reason()),
            );

            match outcome {
                PollOutcome::Succeeded => return Ok(()),
                PollOutcome::Failed { state, reason } => {
                    tracing::warn!(execution_id, %state, %reason, "Query did not succeed");
                    return Err(AthenaError::QueryFailed { state, reason });
                }
                PollOutcome::Pending => {}
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(AthenaError::Timeout {
                    seconds: timeout.as_secs(),
                });
            }

            tracing::debug!(execution_id, "Query still running");
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl QueryExecutor for AthenaExecutor {
    fn databases(&self) -> &HashMap<String, String> {
        &self.settings.databases
    }

    fn default_database(&self) -> &str {
        &self.settings.default_database
    }

    async fn start_query(
        &self,
        database_key: &str,
        sql: &str,
    ) -> Result<QuerySubmission, AthenaError> {
        let database_name = self.settings.resolve(database_key)?.to_string();

        let context = QueryExecutionContext::builder()
            .database(database_name.clone())
            .build();
        let result_config = ResultConfiguration::builder()
            .output_location(self.settings.output_location.clone())
            .build();

        let output = self
            .client
            .start_query_execution()
            .query_string(sql)
            .query_execution_context(context)
            .result_configuration(result_config)
            .send()
            .await
            .map_err(|e| AthenaError::Request(DisplayErrorContext(e).to_string()))?;

        let query_execution_id = output
            .query_execution_id()
            .map(str::to_string)
            .ok_or_else(|| {
                AthenaError::Request("Athena returned no query execution id".to_string())
            })?;

        tracing::info!(
            database = %database_name,
            query_execution_id = %query_execution_id,
            "Submitted Athena query"
        );

        Ok(QuerySubmission {
            query_execution_id,
            database_name,
        })
    }

    async fn fetch_results(
        &self,
        database_key: &str,
        execution_id: &str,
    ) -> Result<QueryTable, AthenaError> {
        // Results are keyed by execution id alone; the key is resolved so a
        // typo fails loudly instead of returning another database's rows.
        self.settings.resolve(database_key)?;

        let mut columns: Vec<String> = Vec::new();
        let mut rows: Vec<Vec<String>> = Vec::new();
        let mut next_token: Option<String> = None;
        let mut first_page = true;

        loop {
            let mut request = self
                .client
                .get_query_results()
                .query_execution_id(execution_id)
                .max_results(RESULTS_PAGE_SIZE);
            if let Some(token) = &next_token {
                request = request.next_token(token.clone());
            }

            let output = request
                .send()
                .await
                .map_err(|e| AthenaError::Request(DisplayErrorContext(e).to_string()))?;

            if let Some(result_set) = output.result_set() {
                if first_page {
                    columns = result_set
                        .result_set_metadata()
                        .map(|meta| {
                            meta.column_info()
                                .iter()
                                .map(|col| col.name().to_string())
                                .collect()
                        })
                        .unwrap_or_default();
                }

                for (index, row) in result_set.rows().iter().enumerate() {
                    // Athena repeats the column headers as the first row of
                    // the first page of a SELECT.
                    if first_page && index == 0 {
                        if columns.is_empty() {
                            columns = row
                                .data()
                                .iter()
                                .map(|datum| {
                                    datum.var_char_value().unwrap_or_default().to_string()
                                })
                                .collect();
                        }
                        continue;
                    }
                    rows.push(
                        row.data()
                            .iter()
                            .map(|datum| datum.var_char_value().unwrap_or_default().to_string())
                            .collect(),
                    );
                }
            }

            first_page = false;
            match output.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        tracing::debug!(execution_id, row_count = rows.len(), "Fetched query results");

        Ok(QueryTable::new(columns, rows))
    }

    async fn execute_and_wait(&self, request: &QueryRequest) -> Result<QueryTable, AthenaError> {
        let database_key = request.database_key_or(self.default_database());
        let submission = self.start_query(database_key, &request.query).await?;
        self.wait_for_completion(&submission.query_execution_id, request.timeout())
            .await?;
        self.fetch_results(database_key, &submission.query_execution_id)
            .await
    }

    async fn check_connection(
        &self,
        database_key: &str,
    ) -> Result<ConnectionReport, AthenaError> {
        let database_name = self.settings.resolve(database_key)?.to_string();

        let output = self
            .client
            .list_databases()
            .catalog_name(CATALOG_NAME)
            .max_results(MAX_LISTED_DATABASES)
            .send()
            .await
            .map_err(|e| AthenaError::Request(DisplayErrorContext(e).to_string()))?;

        let available: Vec<String> = output
            .database_list()
            .iter()
            .map(|db| db.name().to_string())
            .collect();
        let database_exists = available.iter().any(|name| name == &database_name);

        Ok(ConnectionReport {
            database_key: database_key.to_string(),
            database_name,
            database_exists,
            available_databases: available.into_iter().take(REPORTED_DATABASES).collect(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
