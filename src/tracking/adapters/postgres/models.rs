//! Diesel row models for metric shard tables.

use crate::tracking::{
    domain::{
        MetricId, MetricKind, MetricPoint, MetricRecord, MetricSource, PersistedMetricData,
        ShardTable,
    },
    ports::{MetricStorageError, MetricStorageResult},
};
use chrono::{DateTime, Utc};
use diesel::QueryableByName;

/// Query result row for metric records.
#[derive(Debug, Clone, QueryableByName)]
pub(super) struct MetricRow {
    /// Shard-local identifier.
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub f_id: i64,
    /// Job identifier.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub f_job_id: String,
    /// Pipeline component name.
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub f_component_name: String,
    /// Task identifier.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub f_task_id: String,
    /// Reporting role.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub f_role: String,
    /// Reporting party.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub f_party_id: String,
    /// Metric namespace.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub f_metric_namespace: String,
    /// Metric name.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub f_metric_name: String,
    /// Key within the metric.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub f_key: String,
    /// Serialized payload.
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub f_value: String,
    /// Kind code, 0 for data and 1 for meta.
    #[diesel(sql_type = diesel::sql_types::Integer)]
    pub f_type: i32,
    /// Creation timestamp.
    #[diesel(sql_type = diesel::sql_types::Timestamptz)]
    pub f_create_time: DateTime<Utc>,
    /// Last update timestamp, absent on rows written without one.
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Timestamptz>)]
    pub f_update_time: Option<DateTime<Utc>>,
}

/// `RETURNING f_id` row of an insert.
#[derive(Debug, Clone, Copy, QueryableByName)]
pub(super) struct InsertedId {
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub f_id: i64,
}

impl MetricRow {
    /// Maps the row back into a domain record.
    pub(super) fn into_record(self, table: &ShardTable) -> MetricStorageResult<MetricRecord> {
        let Self {
            f_id,
            f_job_id,
            f_component_name,
            f_task_id,
            f_role,
            f_party_id,
            f_metric_namespace,
            f_metric_name,
            f_key,
            f_value,
            f_type,
            f_create_time,
            f_update_time,
        } = self;

        let corrupt = |reason: String| MetricStorageError::corrupt(table, f_id, reason);
        let id = MetricId::new(f_id).map_err(|err| corrupt(err.to_string()))?;
        let kind = MetricKind::try_from(f_type).map_err(|err| corrupt(err.to_string()))?;
        let source = MetricSource::new(f_job_id, f_component_name, f_task_id, f_role, f_party_id)
            .map_err(|err| corrupt(err.to_string()))?;
        let point = MetricPoint::new(f_metric_namespace, f_metric_name, f_key, kind)
            .map_err(|err| corrupt(err.to_string()))?;

        Ok(MetricRecord::from_persisted(PersistedMetricData {
            id,
            shard: None,
            source,
            point,
            value: f_value,
            created_at: f_create_time,
            updated_at: f_update_time.unwrap_or(f_create_time),
        }))
    }
}
