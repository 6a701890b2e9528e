//! `PostgreSQL` storage implementation for metric shards.

use super::{
    ddl::{create_shard_sql, insert_sql, select_sql, update_sql},
    models::{InsertedId, MetricRow},
};
use crate::tracking::{
    domain::{MetricFilter, MetricId, MetricRecord, ShardTable, TablePrefix},
    ports::{MetricStorage, MetricStorageError, MetricStorageResult},
};
use async_trait::async_trait;
use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::{BigInt, Integer, Nullable, Text, Timestamptz};
use tracing::debug;

/// `PostgreSQL` connection pool type used by metric adapters.
pub type MetricPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed metric storage with one table per shard.
#[derive(Debug, Clone)]
pub struct PostgresMetricStorage {
    pool: MetricPgPool,
}

impl PostgresMetricStorage {
    /// Creates storage from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: MetricPgPool) -> Self {
        Self { pool }
    }

    /// Creates the undated base table that carries the prefix as its name.
    ///
    /// Intended for start-up, so deployments without any shard yet still
    /// expose the metric column layout.
    ///
    /// # Errors
    ///
    /// Returns [`MetricStorageError`] when the table cannot be created.
    pub async fn bootstrap(&self, prefix: &TablePrefix) -> MetricStorageResult<()> {
        self.ensure_shard(&prefix.base_table()).await
    }

    async fn run_blocking<F, T>(&self, f: F) -> MetricStorageResult<T>
    where
        F: FnOnce(&mut PgConnection) -> MetricStorageResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool
                .get()
                .map_err(|err| MetricStorageError::connection(err.to_string()))?;
            f(&mut connection)
        })
        .await
        .map_err(|err| MetricStorageError::connection(format!("task join error: {err}")))?
    }
}

#[async_trait]
impl MetricStorage for PostgresMetricStorage {
    async fn ensure_shard(&self, table: &ShardTable) -> MetricStorageResult<()> {
        let target = table.clone();
        self.run_blocking(move |connection| {
            let ddl = create_shard_sql(&target);
            let outcome = connection.transaction(|conn| conn.batch_execute(&ddl));
            match outcome {
                Ok(()) => Ok(()),
                // A concurrent creator committed the same table first.
                Err(DieselError::DatabaseError(ref kind, ref info))
                    if matches!(kind, DatabaseErrorKind::UniqueViolation)
                        || is_duplicate_relation(info.as_ref()) =>
                {
                    debug!(table = %target, "shard table created concurrently");
                    Ok(())
                }
                Err(err) => Err(MetricStorageError::database(err)),
            }
        })
        .await
    }

    async fn insert(
        &self,
        table: &ShardTable,
        record: &MetricRecord,
    ) -> MetricStorageResult<MetricId> {
        let target = table.clone();
        let row = record.clone();
        self.run_blocking(move |connection| {
            let source = row.source();
            let point = row.point();
            let inserted = diesel::sql_query(insert_sql(&target))
                .bind::<Text, _>(source.job_id())
                .bind::<Text, _>(source.component_name())
                .bind::<Text, _>(source.task_id())
                .bind::<Text, _>(source.role())
                .bind::<Text, _>(source.party_id())
                .bind::<Text, _>(point.namespace())
                .bind::<Text, _>(point.name())
                .bind::<Text, _>(point.key())
                .bind::<Text, _>(row.value())
                .bind::<Integer, _>(point.kind().code())
                .bind::<Timestamptz, _>(row.created_at())
                .bind::<Timestamptz, _>(row.updated_at())
                .get_result::<InsertedId>(connection)
                .map_err(|err| map_statement_error(&target, err))?;
            MetricId::new(inserted.f_id).map_err(|err| {
                MetricStorageError::corrupt(&target, inserted.f_id, err.to_string())
            })
        })
        .await
    }

    async fn update(&self, table: &ShardTable, record: &MetricRecord) -> MetricStorageResult<bool> {
        let Some(id) = record.id() else {
            return Ok(false);
        };
        let target = table.clone();
        let row = record.clone();
        self.run_blocking(move |connection| {
            let source = row.source();
            let point = row.point();
            let affected = diesel::sql_query(update_sql(&target))
                .bind::<Text, _>(source.job_id())
                .bind::<Text, _>(source.component_name())
                .bind::<Text, _>(source.task_id())
                .bind::<Text, _>(source.role())
                .bind::<Text, _>(source.party_id())
                .bind::<Text, _>(point.namespace())
                .bind::<Text, _>(point.name())
                .bind::<Text, _>(point.key())
                .bind::<Text, _>(row.value())
                .bind::<Integer, _>(point.kind().code())
                .bind::<Timestamptz, _>(row.created_at())
                .bind::<Timestamptz, _>(row.updated_at())
                .bind::<BigInt, _>(id.value())
                .execute(connection)
                .map_err(|err| map_statement_error(&target, err))?;
            Ok(affected > 0)
        })
        .await
    }

    async fn query(
        &self,
        table: &ShardTable,
        filter: &MetricFilter,
    ) -> MetricStorageResult<Vec<MetricRecord>> {
        let target = table.clone();
        let predicates = filter.clone();
        self.run_blocking(move |connection| {
            let rows = diesel::sql_query(select_sql(&target))
                .bind::<Nullable<Text>, _>(predicates.job_id())
                .bind::<Nullable<Text>, _>(predicates.component_name())
                .bind::<Nullable<Text>, _>(predicates.task_id())
                .bind::<Nullable<Text>, _>(predicates.role())
                .bind::<Nullable<Text>, _>(predicates.party_id())
                .bind::<Nullable<Text>, _>(predicates.namespace())
                .bind::<Nullable<Text>, _>(predicates.name())
                .bind::<Nullable<Text>, _>(predicates.key())
                .bind::<Nullable<Integer>, _>(predicates.kind().map(|kind| kind.code()))
                .load::<MetricRow>(connection)
                .map_err(|err| map_statement_error(&target, err))?;
            rows.into_iter()
                .map(|metric_row| metric_row.into_record(&target))
                .collect()
        })
        .await
    }
}

/// Returns `true` when `CREATE ... IF NOT EXISTS` lost a race against
/// another session creating the same relation.
fn is_duplicate_relation(info: &dyn DatabaseErrorInformation) -> bool {
    info.message().contains("already exists")
}

/// Returns `true` when the statement referenced a table that does not exist.
fn is_undefined_table(info: &dyn DatabaseErrorInformation) -> bool {
    let message = info.message();
    message.starts_with("relation") && message.contains("does not exist")
}

fn map_statement_error(table: &ShardTable, err: DieselError) -> MetricStorageError {
    match err {
        DieselError::DatabaseError(_, ref info) if is_undefined_table(info.as_ref()) => {
            MetricStorageError::MissingShard(table.clone())
        }
        other => MetricStorageError::database(other),
    }
}
