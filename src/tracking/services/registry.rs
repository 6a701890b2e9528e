//! Process-local cache of materialized shards.

use crate::tracking::domain::{ShardHandle, ShardKey, ShardTable};
use std::collections::{BTreeSet, HashMap};
use std::sync::{PoisonError, RwLock};

/// Cache mapping physical shard tables to their handles.
///
/// Keying by table keeps stores with different prefixes apart. Entries are only added after the backing table is known to exist and are
/// never evicted. Every mutation is a single map insert, so a poisoned lock
/// still guards a consistent map and is recovered rather than reported.
#[derive(Debug, Default)]
pub struct ShardRegistry {
    shards: RwLock<HashMap<ShardTable, ShardHandle>>,
}

impl ShardRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached handle for a table.
    #[must_use]
    pub fn get(&self, table: &ShardTable) -> Option<ShardHandle> {
        self.shards
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(table)
            .cloned()
    }

    /// Caches a handle and returns the handle now registered for its table.
    ///
    /// When a concurrent caller registered the same table first, that handle
    /// is kept and returned.
    pub fn insert(&self, handle: ShardHandle) -> ShardHandle {
        self.shards
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(handle.table().clone())
            .or_insert(handle)
            .clone()
    }

    /// Returns the distinct cached shard keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<ShardKey> {
        self.shards
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|handle| handle.key().clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Returns the number of cached shards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shards
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` when no shard has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
