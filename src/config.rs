//! Configuration for the metric store and its connection pool.

use crate::tracking::adapters::postgres::MetricPgPool;
use crate::tracking::domain::{DEFAULT_TABLE_PREFIX, MetricDomainError, TablePrefix};
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of pooled database connections.
const DEFAULT_POOL_MAX_SIZE: u32 = 10;

/// Settings for a metric store deployment.
///
/// Missing fields fall back to their defaults when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricStoreConfig {
    /// Prefix shared by every shard table.
    pub table_prefix: String,
    /// `PostgreSQL` connection URL, required only to build a pool.
    pub database_url: Option<String>,
    /// Maximum number of pooled connections.
    pub pool_max_size: u32,
}

impl Default for MetricStoreConfig {
    fn default() -> Self {
        Self {
            table_prefix: DEFAULT_TABLE_PREFIX.to_owned(),
            database_url: None,
            pool_max_size: DEFAULT_POOL_MAX_SIZE,
        }
    }
}

/// Errors raised while loading or applying configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration document is not valid JSON for this schema.
    #[error("invalid configuration document: {0}")]
    Parse(#[from] serde_json::Error),

    /// The table prefix is not usable.
    #[error(transparent)]
    Prefix(#[from] MetricDomainError),

    /// The pool size is zero.
    #[error("pool_max_size must be positive")]
    EmptyPool,

    /// A pool was requested without a database URL.
    #[error("database_url is required to build a connection pool")]
    MissingDatabaseUrl,

    /// The connection pool could not be built.
    #[error("failed to build connection pool: {0}")]
    Pool(#[from] PoolError),
}

impl MetricStoreConfig {
    /// Parses and validates a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed documents and any
    /// validation error from [`Self::validate`].
    pub fn from_json_str(document: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the settings and returns the parsed table prefix.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Prefix`] for an invalid prefix and
    /// [`ConfigError::EmptyPool`] for a zero pool size.
    pub fn validate(&self) -> Result<TablePrefix, ConfigError> {
        let prefix = TablePrefix::new(self.table_prefix.clone())?;
        if self.pool_max_size == 0 {
            return Err(ConfigError::EmptyPool);
        }
        Ok(prefix)
    }

    /// Builds a `PostgreSQL` connection pool from the settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingDatabaseUrl`] without a URL, and
    /// [`ConfigError::Pool`] when the pool cannot connect.
    pub fn build_pool(&self) -> Result<MetricPgPool, ConfigError> {
        self.validate()?;
        let url = self
            .database_url
            .as_deref()
            .ok_or(ConfigError::MissingDatabaseUrl)?;
        let manager = ConnectionManager::<PgConnection>::new(url);
        Ok(Pool::builder()
            .max_size(self.pool_max_size)
            .build(manager)?)
    }
}
