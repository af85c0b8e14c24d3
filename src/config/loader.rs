//! Configuration Loader
//!
//! Layers the TOML file, prefixed environment variables and the legacy
//! `REDSHIFT_*` variables on top of the built-in defaults, then validates.

use super::error::{ConfigResult, ConfigurationError};
use super::ClaimsApiConfig;
use config::{Config, Environment, File, FileFormat};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info};

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_VAR: &str = "CLAIMS_API_CONFIG";

/// File consulted when no explicit path is given; optional
pub const DEFAULT_CONFIG_FILE: &str = "config/claims-api.toml";

const ENV_PREFIX: &str = "CLAIMS_API";
const ENV_SEPARATOR: &str = "__";

/// Legacy variable names and the keys they override
const LEGACY_ENV_KEYS: &[(&str, &str)] = &[
    ("REDSHIFT_HOST", "database.host"),
    ("REDSHIFT_USER", "database.user"),
    ("REDSHIFT_PASSWORD", "database.password"),
    ("REDSHIFT_DB", "database.database"),
    ("REDSHIFT_PORT", "database.port"),
];

const LEGACY_SSLMODE_VAR: &str = "REDSHIFT_SSLMODE";

/// Builds a [`ClaimsApiConfig`] from files and an environment snapshot.
///
/// The environment is captured as a map rather than read lazily so that tests
/// can load configurations without touching process state.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    env: HashMap<String, String>,
}

impl ConfigLoader {
    /// Loader over the current process environment
    pub fn from_process_env() -> Self {
        let env: HashMap<String, String> = std::env::vars().collect();
        let file = env.get(CONFIG_PATH_VAR).map(PathBuf::from);
        Self { file, env }
    }

    /// Loader over an explicit environment map
    pub fn with_env(env: HashMap<String, String>) -> Self {
        Self { file: None, env }
    }

    /// Use an explicit configuration file, which then must exist
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Load and validate the configuration
    pub fn load(&self) -> ConfigResult<ClaimsApiConfig> {
        let (file_path, required) = match &self.file {
            Some(path) => (path.clone(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        debug!(
            file = %file_path.display(),
            required,
            "Loading claims API configuration"
        );

        let prefixed: config::Map<String, String> = self
            .env
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let mut builder = Config::builder()
            .add_source(
                File::from(file_path.as_path())
                    .format(FileFormat::Toml)
                    .required(required),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator(ENV_SEPARATOR)
                    .source(Some(prefixed)),
            );

        for (var, key) in LEGACY_ENV_KEYS {
            builder = builder.set_override_option(*key, self.legacy_value(var))?;
        }
        builder = builder.set_override_option("database.require_ssl", self.legacy_ssl_mode()?)?;

        let config: ClaimsApiConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        let missing = config.database.missing_settings();
        info!(
            port = config.database.port,
            database = %config.database.database,
            dialect = ?config.database.dialect,
            require_ssl = config.database.require_ssl,
            backend_configured = missing.is_empty(),
            "Configuration loaded successfully"
        );
        debug!(config = %config.sanitized(), "Effective configuration");

        Ok(config)
    }

    fn legacy_value(&self, var: &str) -> Option<String> {
        self.env.get(var).filter(|value| !value.is_empty()).cloned()
    }

    /// libpq-style sslmode folded into the `require_ssl` flag
    fn legacy_ssl_mode(&self) -> ConfigResult<Option<bool>> {
        let Some(mode) = self.legacy_value(LEGACY_SSLMODE_VAR) else {
            return Ok(None);
        };
        match mode.to_ascii_lowercase().as_str() {
            "require" | "verify-ca" | "verify-full" => Ok(Some(true)),
            "disable" | "allow" | "prefer" => Ok(Some(false)),
            _ => Err(ConfigurationError::invalid_value(
                LEGACY_SSLMODE_VAR,
                "expected one of disable, allow, prefer, require, verify-ca, verify-full",
            )),
        }
    }
}
