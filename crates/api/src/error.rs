use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fleetpulse_athena::AthenaError;
use fleetpulse_core::CoreError;
use fleetpulse_export::ExportError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps the domain errors from the workspace crates and adds HTTP-specific
/// variants. Implements [`IntoResponse`] to produce consistent JSON error
/// responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `fleetpulse_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A query execution error from `fleetpulse_athena`.
    #[error(transparent)]
    Athena(#[from] AthenaError),

    /// A workbook rendering error from `fleetpulse_export`.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A dependent service did not answer a connectivity check.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                // The warehouse answered, but without the expected schema.
                CoreError::MissingColumn { .. } => (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_SCHEMA",
                    core.to_string(),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
            },

            // --- Query execution errors ---
            AppError::Athena(athena) => classify_athena_error(athena),

            // --- Export errors ---
            AppError::Export(export) => {
                tracing::error!(error = %export, "Workbook rendering failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EXPORT_FAILED",
                    "Report export failed".to_string(),
                )
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                msg.clone(),
            ),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a query execution error into an HTTP status, error code, and message.
///
/// - An unknown database key is the caller's mistake: 400.
/// - A poll deadline expiring maps to 504.
/// - A failed or cancelled query, or an SDK-level failure, maps to 502 --
///   the upstream warehouse misbehaved, not this service.
fn classify_athena_error(err: &AthenaError) -> (StatusCode, &'static str, String) {
    match err {
        AthenaError::UnknownDatabase(_) => {
            (StatusCode::BAD_REQUEST, "UNKNOWN_DATABASE", err.to_string())
        }
        AthenaError::Timeout { .. } => {
            (StatusCode::GATEWAY_TIMEOUT, "QUERY_TIMEOUT", err.to_string())
        }
        AthenaError::QueryFailed { .. } => {
            (StatusCode::BAD_GATEWAY, "QUERY_FAILED", err.to_string())
        }
        AthenaError::Request(msg) => {
            tracing::error!(error = %msg, "Athena request error");
            (
                StatusCode::BAD_GATEWAY,
                "ATHENA_ERROR",
                "Query service request failed".to_string(),
            )
        }
    }
}
