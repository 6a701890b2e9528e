//! Service layer routing metric reads and writes to date-partitioned shards.

use super::ShardRegistry;
use crate::config::{ConfigError, MetricStoreConfig};
use crate::record::touch_before_save;
use crate::tracking::{
    domain::{
        MetricDomainError, MetricFilter, MetricId, MetricRecord, ShardHandle, ShardKey,
        ShardSelector, TablePrefix,
    },
    ports::{MetricStorage, MetricStorageError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Service-level errors for metric store operations.
#[derive(Debug, Error)]
pub enum MetricStoreError {
    /// Domain validation failed before any I/O.
    #[error(transparent)]
    Domain(#[from] MetricDomainError),

    /// The shard table could not be materialized; the shard was not cached.
    #[error("failed to create shard {shard}: {source}")]
    SchemaCreation {
        /// Shard whose table creation failed.
        shard: ShardKey,
        /// Underlying storage failure.
        source: MetricStorageError,
    },

    /// Persisting a record failed.
    #[error("failed to write metric to shard {shard}: {source}")]
    Write {
        /// Target shard.
        shard: ShardKey,
        /// Underlying storage failure.
        source: MetricStorageError,
    },

    /// Reading records failed.
    #[error("failed to query metrics from shard {shard}: {source}")]
    Query {
        /// Queried shard.
        shard: ShardKey,
        /// Underlying storage failure.
        source: MetricStorageError,
    },

    /// A saved record was written through a selector naming another shard.
    ///
    /// Identifiers are shard-local, so the update would overwrite an
    /// unrelated row.
    #[error("metric belongs to shard {bound}, not {requested}")]
    ShardMismatch {
        /// Shard the record was saved to or loaded from.
        bound: ShardKey,
        /// Shard the selector resolved to.
        requested: ShardKey,
    },

    /// An update targeted an identifier that does not exist in the shard.
    #[error("metric {id} not found in shard {shard}")]
    RecordNotFound {
        /// Target shard.
        shard: ShardKey,
        /// Missing identifier.
        id: MetricId,
    },
}

impl MetricStoreError {
    /// Returns `true` when the failure came from acquiring a connection
    /// rather than from a statement.
    #[must_use]
    pub const fn is_connection_failure(&self) -> bool {
        matches!(
            self,
            Self::SchemaCreation {
                source: MetricStorageError::Connection(_),
                ..
            } | Self::Write {
                source: MetricStorageError::Connection(_),
                ..
            } | Self::Query {
                source: MetricStorageError::Connection(_),
                ..
            }
        )
    }
}

/// Result type for metric store operations.
pub type MetricStoreResult<T> = Result<T, MetricStoreError>;

/// Date-partitioned metric store.
///
/// Resolves each operation to a shard table, creating the table on first use
/// and caching its handle in the owned [`ShardRegistry`]. Clones share the
/// storage, clock, and registry. The current shard follows the clock's local
/// calendar date.
pub struct MetricStore<S, C>
where
    S: MetricStorage,
    C: Clock + Send + Sync,
{
    storage: Arc<S>,
    clock: Arc<C>,
    prefix: TablePrefix,
    registry: Arc<ShardRegistry>,
}

impl<S, C> Clone for MetricStore<S, C>
where
    S: MetricStorage,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            clock: Arc::clone(&self.clock),
            prefix: self.prefix.clone(),
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<S, C> MetricStore<S, C>
where
    S: MetricStorage,
    C: Clock + Send + Sync,
{
    /// Creates a store using the default table prefix and an empty registry.
    #[must_use]
    pub fn new(storage: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            storage,
            clock,
            prefix: TablePrefix::default(),
            registry: Arc::new(ShardRegistry::new()),
        }
    }

    /// Creates a store whose table prefix comes from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the configuration is invalid.
    pub fn from_config(
        storage: Arc<S>,
        clock: Arc<C>,
        config: &MetricStoreConfig,
    ) -> Result<Self, ConfigError> {
        let prefix = config.validate()?;
        Ok(Self::new(storage, clock).with_prefix(prefix))
    }

    /// Sets the prefix shared by every shard table.
    #[must_use]
    pub fn with_prefix(mut self, prefix: TablePrefix) -> Self {
        self.prefix = prefix;
        self
    }

    /// Returns the table prefix.
    #[must_use]
    pub const fn prefix(&self) -> &TablePrefix {
        &self.prefix
    }

    /// Returns the keys of every shard resolved so far, sorted.
    #[must_use]
    pub fn cached_shards(&self) -> Vec<ShardKey> {
        self.registry.keys()
    }

    /// Resolves the shard a selector refers to, creating its table on first
    /// use.
    ///
    /// Cached shards are returned without touching storage. Concurrent first
    /// resolutions of one key may each issue the idempotent create; all of
    /// them receive an equivalent handle.
    ///
    /// # Errors
    ///
    /// Returns [`MetricStoreError::Domain`] for malformed labels or table
    /// names, and [`MetricStoreError::SchemaCreation`] when the table cannot
    /// be created. Nothing is cached on failure.
    #[instrument(skip(self, selector), fields(selector = %selector))]
    pub async fn resolve_shard(&self, selector: &ShardSelector) -> MetricStoreResult<ShardHandle> {
        let key = self.shard_key(selector)?;
        self.materialize(key).await
    }

    fn shard_key(&self, selector: &ShardSelector) -> MetricStoreResult<ShardKey> {
        let today = self.clock.local().date_naive();
        selector.shard_key(today).map_err(MetricStoreError::from)
    }

    async fn materialize(&self, key: ShardKey) -> MetricStoreResult<ShardHandle> {
        let table = self.prefix.shard_table(&key)?;
        if let Some(handle) = self.registry.get(&table) {
            debug!(shard = %key, "shard cache hit");
            return Ok(handle);
        }

        debug!(shard = %key, table = %table, "shard cache miss");
        if let Err(source) = self.storage.ensure_shard(&table).await {
            warn!(shard = %key, table = %table, error = %source, "shard creation failed");
            return Err(MetricStoreError::SchemaCreation { shard: key, source });
        }

        info!(shard = %key, table = %table, "metric shard ready");
        Ok(self.registry.insert(ShardHandle::new(key, table)))
    }

    /// Persists a record into the selected shard.
    ///
    /// The record's update timestamp is set to the current time first. Records
    /// without an identifier are inserted and receive the identifier the shard
    /// assigned; records with one overwrite the stored row. Either way the
    /// record ends up bound to the shard it was written to.
    ///
    /// # Errors
    ///
    /// Returns [`MetricStoreError::ShardMismatch`] before any I/O when a
    /// saved record is bound to a different shard than the selector names,
    /// [`MetricStoreError::Write`] when storage rejects the write and
    /// [`MetricStoreError::RecordNotFound`] when an update matches no row,
    /// plus any error from [`Self::resolve_shard`].
    #[instrument(skip(self, selector, record), fields(selector = %selector))]
    pub async fn write_metric(
        &self,
        selector: &ShardSelector,
        record: &mut MetricRecord,
    ) -> MetricStoreResult<()> {
        let requested = self.shard_key(selector)?;
        if let (Some(_), Some(bound)) = (record.id(), record.shard())
            && *bound != requested
        {
            return Err(MetricStoreError::ShardMismatch {
                bound: bound.clone(),
                requested,
            });
        }
        let shard = self.materialize(requested).await?;
        touch_before_save(record, &*self.clock);

        let write_error = |source| MetricStoreError::Write {
            shard: shard.key().clone(),
            source,
        };
        match record.id() {
            None => {
                let id = self
                    .storage
                    .insert(shard.table(), record)
                    .await
                    .map_err(write_error)?;
                record.assign_id(id);
                record.bind_shard(shard.key().clone());
            }
            Some(id) => {
                let updated = self
                    .storage
                    .update(shard.table(), record)
                    .await
                    .map_err(write_error)?;
                if !updated {
                    return Err(MetricStoreError::RecordNotFound {
                        shard: shard.key().clone(),
                        id,
                    });
                }
                record.bind_shard(shard.key().clone());
            }
        }
        Ok(())
    }

    /// Returns the records in the selected shard that match the filter.
    ///
    /// The result is read from the database at call time; no ordering is
    /// promised. Returned records are bound to the queried shard.
    ///
    /// # Errors
    ///
    /// Returns [`MetricStoreError::Query`] when the read fails, plus any error
    /// from [`Self::resolve_shard`].
    #[instrument(skip(self, selector, filter), fields(selector = %selector))]
    pub async fn query_metrics(
        &self,
        selector: &ShardSelector,
        filter: &MetricFilter,
    ) -> MetricStoreResult<Vec<MetricRecord>> {
        let shard = self.resolve_shard(selector).await?;
        let mut records = self
            .storage
            .query(shard.table(), filter)
            .await
            .map_err(|source| MetricStoreError::Query {
                shard: shard.key().clone(),
                source,
            })?;
        for record in &mut records {
            record.bind_shard(shard.key().clone());
        }
        debug!(shard = %shard.key(), count = records.len(), "metrics queried");
        Ok(records)
    }
}
