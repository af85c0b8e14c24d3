//! # Claims API Configuration
//!
//! Process-wide settings, read once at startup and shared read-only for the
//! lifetime of the process.
//!
//! ## Sources (lowest to highest precedence)
//!
//! 1. Built-in defaults (the `Default` impls below)
//! 2. TOML file: `config/claims-api.toml`, or the path in `CLAIMS_API_CONFIG`
//! 3. `CLAIMS_API__<SECTION>__<KEY>` environment variables
//! 4. Legacy warehouse variables: `REDSHIFT_HOST`, `REDSHIFT_USER`,
//!    `REDSHIFT_PASSWORD`, `REDSHIFT_DB`, `REDSHIFT_PORT`, `REDSHIFT_SSLMODE`
//!
//! ## Usage
//!
//! ```rust,no_run
//! use claims_api::config::ConfigLoader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::from_process_env().load()?;
//! println!("connecting to port {}", config.database.port);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigLoader;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ClaimsApiConfig {
    pub database: DatabaseConfig,
    pub retry: RetryConfig,
    pub query: QueryLimitsConfig,
    pub web: WebConfig,
}

impl ClaimsApiConfig {
    /// Check every value that would otherwise fail later at request time.
    ///
    /// Absent credentials are not an error here; the connection factory
    /// reports them per request so that liveness keeps working.
    pub fn validate(&self) -> ConfigResult<()> {
        self.database.validate()?;
        self.retry.validate()?;
        self.query.validate()?;
        self.web.validate()
    }

    /// JSON view of the configuration with secrets masked, for logging
    pub fn sanitized(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// A credential that never appears in `Debug` or serialized output.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the underlying value. Only the connection factory should call this.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString([REDACTED])")
    }
}

impl Serialize for SecretString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("[REDACTED]")
    }
}

/// SQL dialect spoken by the backend.
///
/// Only the status normalisation expression differs between the two.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    #[default]
    Redshift,
    Postgres,
}

/// Warehouse connection settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: Option<String>,
    pub user: Option<String>,
    pub password: Option<SecretString>,
    pub database: String,
    pub port: u16,
    pub require_ssl: bool,
    /// Reported to the backend as `application_name`
    pub application_name: String,
    /// Schema-qualified table holding claim records
    pub claims_table: String,
    pub dialect: SqlDialect,
    pub connect_timeout_ms: u64,
    pub readiness_timeout_ms: u64,
    /// Server-side statement timeout; 0 disables it
    pub statement_timeout_ms: u64,
    /// Client-side deadline on each statement, independent of the backend
    pub query_timeout_ms: u64,
    pub keepalive: KeepaliveConfig,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: None,
            user: None,
            password: None,
            database: "dev".to_string(),
            port: 5439,
            require_ssl: false,
            application_name: "claims-api".to_string(),
            claims_table: "aicp_insurance.claims_processed".to_string(),
            dialect: SqlDialect::Redshift,
            connect_timeout_ms: 3000,
            readiness_timeout_ms: 2000,
            statement_timeout_ms: 0,
            query_timeout_ms: 15_000,
            keepalive: KeepaliveConfig::default(),
        }
    }
}

impl DatabaseConfig {
    /// Names of required connection settings that are absent or empty
    pub fn missing_settings(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.host.as_deref().map_or(true, str::is_empty) {
            missing.push("database.host");
        }
        if self.user.as_deref().map_or(true, str::is_empty) {
            missing.push("database.user");
        }
        if self.password.as_ref().map_or(true, SecretString::is_empty) {
            missing.push("database.password");
        }
        if self.database.is_empty() {
            missing.push("database.database");
        }
        missing
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn readiness_timeout(&self) -> Duration {
        Duration::from_millis(self.readiness_timeout_ms)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn statement_timeout(&self) -> Option<Duration> {
        (self.statement_timeout_ms > 0).then(|| Duration::from_millis(self.statement_timeout_ms))
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.port == 0 {
            return Err(ConfigurationError::invalid_value(
                "database.port",
                "port must be between 1 and 65535",
            ));
        }
        if self.connect_timeout_ms == 0 {
            return Err(ConfigurationError::invalid_value(
                "database.connect_timeout_ms",
                "connect timeout must be greater than zero",
            ));
        }
        if self.readiness_timeout_ms == 0 {
            return Err(ConfigurationError::invalid_value(
                "database.readiness_timeout_ms",
                "readiness timeout must be greater than zero",
            ));
        }
        if self.query_timeout_ms == 0 {
            return Err(ConfigurationError::invalid_value(
                "database.query_timeout_ms",
                "query timeout must be greater than zero",
            ));
        }
        if !is_qualified_identifier(&self.claims_table) {
            return Err(ConfigurationError::invalid_value(
                "database.claims_table",
                "expected a plain or schema-qualified identifier such as schema.table",
            ));
        }
        self.keepalive.validate()
    }
}

/// TCP keep-alive parameters requested for each session
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct KeepaliveConfig {
    pub enabled: bool,
    pub idle_seconds: u32,
    pub interval_seconds: u32,
    pub count: u32,
}

impl Default for KeepaliveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            idle_seconds: 30,
            interval_seconds: 10,
            count: 3,
        }
    }
}

impl KeepaliveConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.enabled && (self.idle_seconds == 0 || self.interval_seconds == 0 || self.count == 0)
        {
            return Err(ConfigurationError::invalid_value(
                "database.keepalive",
                "idle_seconds, interval_seconds and count must be non-zero when enabled",
            ));
        }
        Ok(())
    }
}

/// Bounded exponential backoff for query-path connection acquisition
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            base_delay_ms: 500,
            max_delay_ms: 8000,
        }
    }
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.max_attempts == 0 {
            return Err(ConfigurationError::invalid_value(
                "retry.max_attempts",
                "at least one attempt is required",
            ));
        }
        if self.max_delay_ms < self.base_delay_ms {
            return Err(ConfigurationError::invalid_value(
                "retry.max_delay_ms",
                "cap must not be smaller than the base delay",
            ));
        }
        Ok(())
    }
}

/// Bounds applied to the `days` and `limit` parameters of status listings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QueryLimitsConfig {
    pub default_days: i64,
    pub min_days: i64,
    pub max_days: i64,
    pub default_limit: i64,
    pub min_limit: i64,
    pub max_limit: i64,
}

impl Default for QueryLimitsConfig {
    fn default() -> Self {
        Self {
            default_days: 7,
            min_days: 1,
            max_days: 90,
            default_limit: 50,
            min_limit: 1,
            max_limit: 500,
        }
    }
}

impl QueryLimitsConfig {
    fn validate(&self) -> ConfigResult<()> {
        check_range("query.days", self.min_days, self.default_days, self.max_days)?;
        check_range(
            "query.limit",
            self.min_limit,
            self.default_limit,
            self.max_limit,
        )
    }
}

fn check_range(field: &str, min: i64, default: i64, max: i64) -> ConfigResult<()> {
    if min < 1 || min > default || default > max {
        return Err(ConfigurationError::invalid_value(
            field,
            "bounds must satisfy 1 <= min <= default <= max",
        ));
    }
    Ok(())
}

/// HTTP server settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WebConfig {
    pub bind_address: String,
    /// Must exceed the worst-case retry series or slow requests are cut short
    pub request_timeout_ms: u64,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            request_timeout_ms: 60_000,
        }
    }
}

impl WebConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn socket_addr(&self) -> ConfigResult<SocketAddr> {
        self.bind_address.parse().map_err(|_| {
            ConfigurationError::invalid_value("web.bind_address", "expected host:port")
        })
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.request_timeout_ms == 0 {
            return Err(ConfigurationError::invalid_value(
                "web.request_timeout_ms",
                "request timeout must be greater than zero",
            ));
        }
        self.socket_addr().map(|_| ())
    }
}

/// `table` or `schema.table`, ASCII identifiers only
fn is_qualified_identifier(name: &str) -> bool {
    let parts: Vec<&str> = name.split('.').collect();
    parts.len() <= 2
        && parts.iter().all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}
