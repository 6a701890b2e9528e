//! Storage port for shard materialization and metric row access.

use crate::tracking::domain::{MetricFilter, MetricId, MetricRecord, ShardTable};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for metric storage operations.
pub type MetricStorageResult<T> = Result<T, MetricStorageError>;

/// Physical storage contract for metric shards.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetricStorage: Send + Sync {
    /// Creates the shard table and its indexes unless they already exist.
    ///
    /// Must succeed when called repeatedly or concurrently for the same
    /// table.
    ///
    /// # Errors
    ///
    /// Returns [`MetricStorageError`] when the table cannot be created for
    /// any reason other than already existing.
    async fn ensure_shard(&self, table: &ShardTable) -> MetricStorageResult<()>;

    /// Inserts a new record and returns the identifier the shard assigned.
    ///
    /// The record's own identifier, if any, is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`MetricStorageError::MissingShard`] when the table does not
    /// exist, or another variant when the write fails.
    async fn insert(
        &self,
        table: &ShardTable,
        record: &MetricRecord,
    ) -> MetricStorageResult<MetricId>;

    /// Overwrites the row matching the record's identifier.
    ///
    /// Returns `false` when the record has no identifier or no row with that
    /// identifier exists in the table.
    ///
    /// # Errors
    ///
    /// Returns [`MetricStorageError`] when the write fails.
    async fn update(&self, table: &ShardTable, record: &MetricRecord) -> MetricStorageResult<bool>;

    /// Returns every record in the table matching the filter.
    ///
    /// # Errors
    ///
    /// Returns [`MetricStorageError`] when the read fails or a row cannot be
    /// mapped back into a record.
    async fn query(
        &self,
        table: &ShardTable,
        filter: &MetricFilter,
    ) -> MetricStorageResult<Vec<MetricRecord>>;
}

/// Errors returned by metric storage implementations.
#[derive(Debug, Clone, Error)]
pub enum MetricStorageError {
    /// A connection could not be obtained or the blocking task failed.
    #[error("connection error: {0}")]
    Connection(String),

    /// The referenced shard table does not exist.
    #[error("shard table does not exist: {0}")]
    MissingShard(ShardTable),

    /// The shard's identifier sequence has no values left.
    #[error("identifier sequence exhausted for {0}")]
    SequenceExhausted(ShardTable),

    /// A stored row could not be mapped back into a metric record.
    #[error("corrupt metric row {id} in {table}: {reason}")]
    Corrupt {
        /// Table holding the row.
        table: ShardTable,
        /// Raw identifier of the row.
        id: i64,
        /// Description of the mapping failure.
        reason: String,
    },

    /// Statement-level failure reported by the database.
    #[error("database error: {0}")]
    Database(Arc<dyn std::error::Error + Send + Sync>),
}

impl MetricStorageError {
    /// Creates a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Wraps a database error.
    pub fn database(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Database(Arc::new(err))
    }

    /// Creates a corrupt-row error.
    #[must_use]
    pub fn corrupt(table: &ShardTable, id: i64, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            table: table.clone(),
            id,
            reason: reason.into(),
        }
    }
}
