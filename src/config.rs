//! Application configuration module
//! Handles environment variable loading, configuration validation, and application settings

use crate::workers::status_poller::PollerConfig;
use std::env;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub polling: PollingConfig,
    pub routes: RouteConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Checkout backend configuration
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub api_url: String,
    pub request_timeout: u64, // seconds
}

/// Order status polling configuration
#[derive(Debug, Clone)]
pub struct PollingConfig {
    pub timeout_ms: u64,
}

/// Paths of the payment outcome pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteConfig {
    pub success_path: String,
    pub cancelled_path: String,
    pub error_path: String,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log format options
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Plain,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(AppConfig {
            server: ServerConfig::from_env()?,
            backend: BackendConfig::from_env()?,
            polling: PollingConfig::from_env()?,
            routes: RouteConfig::from_env(),
            logging: LoggingConfig::from_env(),
        })
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.backend.validate()?;
        self.polling.validate()?;
        self.routes.validate()?;
        self.logging.validate()?;

        Ok(())
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(ServerConfig {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".to_string()))?,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidValue(
                "SERVER_PORT cannot be 0".to_string(),
            ));
        }

        if self.host.is_empty() {
            return Err(ConfigError::InvalidValue(
                "SERVER_HOST cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
            request_timeout: 10,
        }
    }
}

impl BackendConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(BackendConfig {
            api_url: env::var("BACKEND_API_URL").unwrap_or(defaults.api_url),
            request_timeout: match env::var("BACKEND_TIMEOUT_SECS") {
                Ok(raw) => raw
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("BACKEND_TIMEOUT_SECS".to_string()))?,
                Err(_) => defaults.request_timeout,
            },
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue(
                "BACKEND_API_URL must be a valid URL".to_string(),
            ));
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::InvalidValue(
                "BACKEND_TIMEOUT_SECS".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { timeout_ms: 15_000 }
    }
}

impl PollingConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(PollingConfig {
            timeout_ms: env::var("POLL_TIMEOUT_MS")
                .unwrap_or_else(|_| "15000".to_string())
                .parse()?,
        })
    }

    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            deadline: Duration::from_millis(self.timeout_ms),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "POLL_TIMEOUT_MS must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            success_path: "/betaling/suksess".to_string(),
            cancelled_path: "/betaling/avbrutt".to_string(),
            error_path: "/betaling/feil".to_string(),
        }
    }
}

impl RouteConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        RouteConfig {
            success_path: env::var("SUCCESS_PATH").unwrap_or(defaults.success_path),
            cancelled_path: env::var("CANCELLED_PATH").unwrap_or(defaults.cancelled_path),
            error_path: env::var("ERROR_PATH").unwrap_or(defaults.error_path),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, path) in [
            ("SUCCESS_PATH", &self.success_path),
            ("CANCELLED_PATH", &self.cancelled_path),
            ("ERROR_PATH", &self.error_path),
        ] {
            if !path.starts_with('/') || path.contains('?') {
                return Err(ConfigError::ValidationFailed(format!(
                    "{} must be an absolute path without a query",
                    name
                )));
            }
        }

        Ok(())
    }
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "INFO".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "plain".to_string())
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Plain,
            },
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];
        if !valid_levels.contains(&self.level.to_uppercase().as_str()) {
            return Err(ConfigError::InvalidValue("LOG_LEVEL".to_string()));
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for configuration: {0}")]
    InvalidValue(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

impl From<std::num::ParseIntError> for ConfigError {
    fn from(_: std::num::ParseIntError) -> Self {
        ConfigError::InvalidValue("Failed to parse integer value".to_string())
    }
}
