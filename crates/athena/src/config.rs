//! Athena connection settings loaded from environment variables.

use std::collections::HashMap;

use crate::error::AthenaError;

/// Athena connection settings.
///
/// Credentials are deliberately absent: the SDK's default provider chain
/// picks them up (env vars, shared config file, instance metadata).
#[derive(Debug, Clone)]
pub struct AthenaSettings {
    /// AWS region queries run in.
    pub region: String,
    /// S3 prefix where Athena stages query results.
    pub output_location: String,
    /// Logical database key → Athena database name.
    pub databases: HashMap<String, String>,
    /// Key used when a request does not name a database.
    pub default_database: String,
}

impl AthenaSettings {
    /// Load settings from environment variables.
    ///
    /// | Env Var                     | Default                 |
    /// |-----------------------------|-------------------------|
    /// | `AWS_REGION`                | `us-west-2`             |
    /// | `ATHENA_S3_OUTPUT_LOCATION` | *(required)*            |
    /// | `ATHENA_DATABASES`          | `{"bustrax": "s3_bustrax", "analytics": "s3_prod_analytics"}` |
    /// | `ATHENA_DEFAULT_DATABASE`   | `bustrax`               |
    ///
    /// `ATHENA_DATABASES` is a JSON object mapping logical keys to Athena
    /// database names. Panics on a missing output location or a malformed
    /// map -- misconfiguration should fail at startup, not at query time.
    pub fn from_env() -> Self {
        let region = std::env::var("AWS_REGION").unwrap_or_else(|_| "us-west-2".into());

        let output_location = std::env::var("ATHENA_S3_OUTPUT_LOCATION")
            .expect("ATHENA_S3_OUTPUT_LOCATION must be set");

        let databases = match std::env::var("ATHENA_DATABASES") {
            Ok(raw) => parse_database_map(&raw)
                .unwrap_or_else(|e| panic!("ATHENA_DATABASES must be a JSON object: {e}")),
            Err(_) => default_database_map(),
        };

        let default_database =
            std::env::var("ATHENA_DEFAULT_DATABASE").unwrap_or_else(|_| "bustrax".into());

        Self {
            region,
            output_location,
            databases,
            default_database,
        }
    }

    /// Resolve a logical database key to its Athena database name.
    pub fn resolve(&self, key: &str) -> Result<&str, AthenaError> {
        self.databases
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| AthenaError::UnknownDatabase(key.to_string()))
    }
}

/// Parse the `ATHENA_DATABASES` JSON object.
pub fn parse_database_map(raw: &str) -> Result<HashMap<String, String>, serde_json::Error> {
    serde_json::from_str(raw)
}

fn default_database_map() -> HashMap<String, String> {
    HashMap::from([
        ("bustrax".to_string(), "s3_bustrax".to_string()),
        ("analytics".to_string(), "s3_prod_analytics".to_string()),
    ])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
