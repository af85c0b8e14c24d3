//! Connection Factory
//!
//! Opens one fresh backend session per call. Connection settings are resolved
//! once from [`DatabaseConfig`]; if any required credential is absent the
//! factory still builds, and every acquisition fails fast with
//! [`ConnectError::Configuration`] naming the missing settings.

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use sqlx::{Connection, PgConnection};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::claims::{ClaimSql, PgClaimConnection};
use super::BoxedClaimStore;
use crate::config::{DatabaseConfig, SqlDialect};
use crate::error::ConnectError;

/// Source of backend sessions.
///
/// Each call makes exactly one connection attempt bounded by
/// `connect_timeout`; retrying is the caller's decision.
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    async fn acquire(&self, connect_timeout: Duration) -> Result<BoxedClaimStore, ConnectError>;
}

enum ConnectTarget {
    Ready(Box<PgConnectOptions>),
    Unconfigured(Vec<&'static str>),
}

/// [`ConnectionFactory`] opening sqlx Postgres-protocol connections
pub struct PgConnectionFactory {
    target: ConnectTarget,
    sql: Arc<ClaimSql>,
}

impl std::fmt::Debug for PgConnectionFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let configured = matches!(self.target, ConnectTarget::Ready(_));
        f.debug_struct("PgConnectionFactory")
            .field("configured", &configured)
            .finish()
    }
}

impl PgConnectionFactory {
    pub fn from_config(config: &DatabaseConfig) -> Self {
        let sql = Arc::new(ClaimSql::new(&config.claims_table, config.dialect));

        let missing = config.missing_settings();
        if !missing.is_empty() {
            warn!(
                missing = ?missing,
                "Backend connection settings incomplete; every connection attempt will fail"
            );
            return Self {
                target: ConnectTarget::Unconfigured(missing),
                sql,
            };
        }

        Self {
            target: ConnectTarget::Ready(Box::new(connect_options(config))),
            sql,
        }
    }

    /// Whether all required connection settings were supplied
    pub fn is_configured(&self) -> bool {
        matches!(self.target, ConnectTarget::Ready(_))
    }
}

#[async_trait]
impl ConnectionFactory for PgConnectionFactory {
    async fn acquire(&self, connect_timeout: Duration) -> Result<BoxedClaimStore, ConnectError> {
        let options = match &self.target {
            ConnectTarget::Ready(options) => options.as_ref(),
            ConnectTarget::Unconfigured(missing) => {
                return Err(ConnectError::missing_settings(missing.iter().copied()));
            }
        };

        let started = Instant::now();
        match tokio::time::timeout(connect_timeout, PgConnection::connect_with(options)).await {
            Ok(Ok(conn)) => {
                debug!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Backend session established"
                );
                Ok(Box::new(PgClaimConnection::new(conn, Arc::clone(&self.sql))))
            }
            Ok(Err(e)) => Err(ConnectError::from_sqlx(e)),
            Err(_) => Err(ConnectError::Timeout {
                timeout: connect_timeout,
            }),
        }
    }
}

/// Connect options for a fully configured backend.
///
/// sqlx does not expose client socket keep-alive. A dead backend is detected
/// by the per-statement deadline in the claim query service; the server-side
/// `tcp_keepalives_*` settings are only requested from Postgres, which lets
/// it reap clients that vanished.
fn connect_options(config: &DatabaseConfig) -> PgConnectOptions {
    let ssl_mode = if config.require_ssl {
        PgSslMode::Require
    } else {
        PgSslMode::Prefer
    };

    let mut options = PgConnectOptions::new_without_pgpass()
        .host(config.host.as_deref().unwrap_or_default())
        .port(config.port)
        .username(config.user.as_deref().unwrap_or_default())
        .password(config.password.as_ref().map_or("", |p| p.expose()))
        .database(&config.database)
        .application_name(&config.application_name)
        .ssl_mode(ssl_mode);

    let startup = startup_parameters(config);
    if !startup.is_empty() {
        options = options.options(startup);
    }
    options
}

fn startup_parameters(config: &DatabaseConfig) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(timeout) = config.statement_timeout() {
        params.push(("statement_timeout", timeout.as_millis().to_string()));
    }
    let keepalive = &config.keepalive;
    if keepalive.enabled && config.dialect == SqlDialect::Postgres {
        params.push(("tcp_keepalives_idle", keepalive.idle_seconds.to_string()));
        params.push((
            "tcp_keepalives_interval",
            keepalive.interval_seconds.to_string(),
        ));
        params.push(("tcp_keepalives_count", keepalive.count.to_string()));
    }
    params
}
