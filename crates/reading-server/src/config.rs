//! Server configuration from environment variables.

use std::env;
use std::str::FromStr;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::InvalidValue {
                name: "LOG_FORMAT".to_string(),
                reason: format!("expected text or json, got {other:?}"),
            }),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Database connection URL.
    pub database_url: String,
    /// Server port to listen on.
    pub port: u16,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Plain text or JSON log lines.
    pub log_format: LogFormat,
    /// CORS allowed origins (comma-separated or "*" for all).
    pub cors_allowed_origins: String,
    /// Path prefix for every API route, e.g. `/api/v1`. Empty mounts at the
    /// root.
    pub api_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            cors_allowed_origins: "*".to_string(),
            api_prefix: "/api/v1".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `DATABASE_URL`: Database connection string
    ///
    /// Optional:
    /// - `PORT`: Server port (default: 3000)
    /// - `LOG_LEVEL`: Logging level (default: "info")
    /// - `LOG_FORMAT`: "text" or "json" (default: "text")
    /// - `CORS_ALLOWED_ORIGINS`: Allowed CORS origins (default: "*")
    /// - `API_PREFIX`: Route prefix (default: "/api/v1")
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?;

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: "PORT".to_string(),
                reason: format!("expected a port number, got {raw:?}"),
            })?,
            None => defaults.port,
        };

        let log_format = match lookup("LOG_FORMAT") {
            Some(raw) => raw.parse()?,
            None => defaults.log_format,
        };

        Ok(Self {
            database_url,
            port,
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_format,
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .unwrap_or(defaults.cors_allowed_origins),
            api_prefix: normalize_prefix(
                &lookup("API_PREFIX").unwrap_or(defaults.api_prefix),
            ),
        })
    }

    /// Get the socket address for the server.
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

/// Leading slash, no trailing slash; `/` and blank become empty.
fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Invalid environment variable value.
    #[error("invalid value for environment variable {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_values() {
        let config =
            ServerConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/test")]))
                .unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.cors_allowed_origins, "*");
        assert_eq!(config.api_prefix, "/api/v1");
    }

    #[test]
    fn test_missing_database_url() {
        let err = ServerConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(name) if name == "DATABASE_URL"));
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = ServerConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/test"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name, .. } if name == "PORT"));
    }

    #[test]
    fn test_json_logs_and_prefix_normalization() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/test"),
            ("LOG_FORMAT", "JSON"),
            ("API_PREFIX", "api/v2/"),
        ]))
        .unwrap();
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.api_prefix, "/api/v2");
        assert_eq!(normalize_prefix("/"), "");
    }
}
