//! In-memory metric storage for tests and embedded use.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use crate::tracking::{
    domain::{MetricFilter, MetricId, MetricRecord, ShardTable},
    ports::{MetricStorage, MetricStorageError, MetricStorageResult},
};

/// Thread-safe in-memory metric storage.
///
/// Each ensured shard table is a separate row map with its own identifier
/// sequence, mirroring one `BIGSERIAL` table per shard.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMetricStorage {
    state: Arc<RwLock<InMemoryStorageState>>,
}

#[derive(Debug, Default)]
struct InMemoryStorageState {
    tables: HashMap<ShardTable, InMemoryTable>,
}

#[derive(Debug, Default)]
struct InMemoryTable {
    rows: BTreeMap<MetricId, MetricRecord>,
    last_id: i64,
}

impl InMemoryTable {
    fn next_id(&mut self, table: &ShardTable) -> MetricStorageResult<MetricId> {
        let next = self
            .last_id
            .checked_add(1)
            .ok_or_else(|| MetricStorageError::SequenceExhausted(table.clone()))?;
        let id = MetricId::new(next).map_err(MetricStorageError::database)?;
        self.last_id = next;
        Ok(id)
    }
}

impl InMemoryMetricStorage {
    /// Creates storage with no tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the names of all materialized tables, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`MetricStorageError::Connection`] when the state lock is
    /// poisoned.
    pub fn table_names(&self) -> MetricStorageResult<Vec<ShardTable>> {
        let state = self.state.read().map_err(poisoned)?;
        let mut names: Vec<ShardTable> = state.tables.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

fn poisoned<E: std::fmt::Display>(err: E) -> MetricStorageError {
    MetricStorageError::connection(err.to_string())
}

#[async_trait]
impl MetricStorage for InMemoryMetricStorage {
    async fn ensure_shard(&self, table: &ShardTable) -> MetricStorageResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.tables.entry(table.clone()).or_default();
        Ok(())
    }

    async fn insert(
        &self,
        table: &ShardTable,
        record: &MetricRecord,
    ) -> MetricStorageResult<MetricId> {
        let mut state = self.state.write().map_err(poisoned)?;
        let rows = state
            .tables
            .get_mut(table)
            .ok_or_else(|| MetricStorageError::MissingShard(table.clone()))?;

        let id = rows.next_id(table)?;
        let mut stored = record.clone();
        stored.assign_id(id);
        rows.rows.insert(id, stored);
        Ok(id)
    }

    async fn update(&self, table: &ShardTable, record: &MetricRecord) -> MetricStorageResult<bool> {
        let mut state = self.state.write().map_err(poisoned)?;
        let rows = state
            .tables
            .get_mut(table)
            .ok_or_else(|| MetricStorageError::MissingShard(table.clone()))?;

        let Some(id) = record.id() else {
            return Ok(false);
        };
        let Some(existing) = rows.rows.get_mut(&id) else {
            return Ok(false);
        };
        *existing = record.clone();
        Ok(true)
    }

    async fn query(
        &self,
        table: &ShardTable,
        filter: &MetricFilter,
    ) -> MetricStorageResult<Vec<MetricRecord>> {
        let state = self.state.read().map_err(poisoned)?;
        let rows = state
            .tables
            .get(table)
            .ok_or_else(|| MetricStorageError::MissingShard(table.clone()))?;
        Ok(rows
            .rows
            .values()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::{
        domain::{ShardKey, TablePrefix},
        services::MetricStoreError,
    };
    use rstest::{fixture, rstest};

    #[fixture]
    fn table() -> ShardTable {
        let key = ShardKey::from_label("exp").expect("valid label");
        TablePrefix::default()
            .shard_table(&key)
            .expect("valid table name")
    }

    #[rstest]
    fn identifiers_start_at_one_per_table(table: ShardTable) {
        let mut rows = InMemoryTable::default();

        assert_eq!(rows.next_id(&table).map(MetricId::value).ok(), Some(1));
        assert_eq!(rows.next_id(&table).map(MetricId::value).ok(), Some(2));
    }

    #[rstest]
    fn exhausted_sequence_is_not_a_connection_failure(table: ShardTable) {
        let mut rows = InMemoryTable {
            rows: BTreeMap::new(),
            last_id: i64::MAX,
        };

        let error = rows.next_id(&table).expect_err("sequence should be exhausted");

        assert!(matches!(
            &error,
            MetricStorageError::SequenceExhausted(exhausted) if *exhausted == table
        ));
        assert_eq!(rows.last_id, i64::MAX);
        let write_failure = MetricStoreError::Write {
            shard: ShardKey::from_label("exp").expect("valid label"),
            source: error,
        };
        assert!(!write_failure.is_connection_failure());
    }
}
