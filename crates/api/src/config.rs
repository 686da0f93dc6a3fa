/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `330`). Must stay above the
    /// query polling deadline, or report downloads get cut off mid-poll.
    pub request_timeout_secs: u64,
    /// Deployment environment name (default: `development`).
    pub environment: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `8000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `330`                      |
    /// | `ENVIRONMENT`          | `development`              |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "330".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let environment =
            std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            environment,
        }
    }

    /// Whether the raw-query development routes are mounted.
    pub fn dev_routes_enabled(&self) -> bool {
        matches!(self.environment.as_str(), "development" | "devel")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn config_for(environment: &str) -> ServerConfig {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec![],
            request_timeout_secs: 330,
            environment: environment.to_string(),
        }
    }

    #[test]
    fn dev_routes_enabled_in_development() {
        assert!(config_for("development").dev_routes_enabled());
        assert!(config_for("devel").dev_routes_enabled());
    }

    #[test]
    fn dev_routes_disabled_elsewhere() {
        assert!(!config_for("production").dev_routes_enabled());
        assert!(!config_for("staging").dev_routes_enabled());
        // Matching is exact, not prefix-based.
        assert!(!config_for("Development").dev_routes_enabled());
    }
}
