//! Metric record aggregate and the value types it is built from.

use super::{MetricDomainError, MetricId, ParseMetricKindError, ShardKey};
use crate::record::Touch;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

const JOB_ID_LIMIT: usize = 100;
const TASK_ID_LIMIT: usize = 100;
const ROLE_LIMIT: usize = 50;
const PARTY_ID_LIMIT: usize = 50;
const NAMESPACE_LIMIT: usize = 200;
const NAME_LIMIT: usize = 500;
const KEY_LIMIT: usize = 200;

/// Discriminates raw metric values from their descriptive metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// A raw metric value.
    Data,
    /// Metadata describing a metric.
    Meta,
}

impl MetricKind {
    /// Returns the integer code stored in the `f_type` column.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Data => 0,
            Self::Meta => 1,
        }
    }
}

impl TryFrom<i32> for MetricKind {
    type Error = ParseMetricKindError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Data),
            1 => Ok(Self::Meta),
            other => Err(ParseMetricKindError(other)),
        }
    }
}

/// The job, task, and party that reported a metric.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "MetricSourceFields")]
pub struct MetricSource {
    job_id: String,
    component_name: String,
    task_id: String,
    role: String,
    party_id: String,
}

impl MetricSource {
    /// Creates a validated metric source.
    ///
    /// # Errors
    ///
    /// Returns [`MetricDomainError`] when a required field is blank or a
    /// field exceeds its column width.
    pub fn new(
        job_id: impl Into<String>,
        component_name: impl Into<String>,
        task_id: impl Into<String>,
        role: impl Into<String>,
        party_id: impl Into<String>,
    ) -> Result<Self, MetricDomainError> {
        let source = Self {
            job_id: job_id.into(),
            component_name: component_name.into(),
            task_id: task_id.into(),
            role: role.into(),
            party_id: party_id.into(),
        };
        require_text("job_id", &source.job_id, JOB_ID_LIMIT)?;
        require_text("task_id", &source.task_id, TASK_ID_LIMIT)?;
        require_text("role", &source.role, ROLE_LIMIT)?;
        require_text("party_id", &source.party_id, PARTY_ID_LIMIT)?;
        Ok(source)
    }

    /// Returns the job identifier.
    #[must_use]
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Returns the component name within the job's pipeline.
    #[must_use]
    pub fn component_name(&self) -> &str {
        &self.component_name
    }

    /// Returns the task identifier.
    #[must_use]
    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// Returns the role of the reporting party.
    #[must_use]
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Returns the reporting party identifier.
    #[must_use]
    pub fn party_id(&self) -> &str {
        &self.party_id
    }
}

#[derive(Deserialize)]
struct MetricSourceFields {
    job_id: String,
    #[serde(default)]
    component_name: String,
    task_id: String,
    role: String,
    party_id: String,
}

impl TryFrom<MetricSourceFields> for MetricSource {
    type Error = MetricDomainError;

    fn try_from(fields: MetricSourceFields) -> Result<Self, Self::Error> {
        Self::new(
            fields.job_id,
            fields.component_name,
            fields.task_id,
            fields.role,
            fields.party_id,
        )
    }
}

/// Namespace, name, key, and kind of a metric observation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "MetricPointFields")]
pub struct MetricPoint {
    namespace: String,
    name: String,
    key: String,
    kind: MetricKind,
}

impl MetricPoint {
    /// Creates a validated metric point.
    ///
    /// # Errors
    ///
    /// Returns [`MetricDomainError`] when a field is blank or exceeds its
    /// column width.
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        key: impl Into<String>,
        kind: MetricKind,
    ) -> Result<Self, MetricDomainError> {
        let point = Self {
            namespace: namespace.into(),
            name: name.into(),
            key: key.into(),
            kind,
        };
        require_text("metric_namespace", &point.namespace, NAMESPACE_LIMIT)?;
        require_text("metric_name", &point.name, NAME_LIMIT)?;
        require_text("key", &point.key, KEY_LIMIT)?;
        Ok(point)
    }

    /// Returns the metric namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the metric name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the key within the metric.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns whether this point holds data or metadata.
    #[must_use]
    pub const fn kind(&self) -> MetricKind {
        self.kind
    }
}

#[derive(Deserialize)]
struct MetricPointFields {
    namespace: String,
    name: String,
    key: String,
    kind: MetricKind,
}

impl TryFrom<MetricPointFields> for MetricPoint {
    type Error = MetricDomainError;

    fn try_from(fields: MetricPointFields) -> Result<Self, Self::Error> {
        Self::new(fields.namespace, fields.name, fields.key, fields.kind)
    }
}

/// One stored metric observation.
///
/// Identifiers are only unique within a shard, so a saved record remembers
/// the shard it was written to or read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricRecord {
    id: Option<MetricId>,
    shard: Option<ShardKey>,
    source: MetricSource,
    point: MetricPoint,
    value: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted metric record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedMetricData {
    /// Store-assigned identifier.
    pub id: MetricId,
    /// Shard the row lives in, when known.
    pub shard: Option<ShardKey>,
    /// Reporting job, task, and party.
    pub source: MetricSource,
    /// Namespace, name, key, and kind.
    pub point: MetricPoint,
    /// Serialized metric payload.
    pub value: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last persist timestamp.
    pub updated_at: DateTime<Utc>,
}

impl MetricRecord {
    /// Creates an unsaved metric record stamped with the current time.
    #[must_use]
    pub fn new(
        source: MetricSource,
        point: MetricPoint,
        value: impl Into<String>,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: None,
            shard: None,
            source,
            point,
            value: value.into(),
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a metric record from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedMetricData) -> Self {
        Self {
            id: Some(data.id),
            shard: data.shard,
            source: data.source,
            point: data.point,
            value: data.value,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the store-assigned identifier, if the record has been saved.
    #[must_use]
    pub const fn id(&self) -> Option<MetricId> {
        self.id
    }

    /// Returns the shard the record was saved to or loaded from.
    #[must_use]
    pub const fn shard(&self) -> Option<&ShardKey> {
        self.shard.as_ref()
    }

    /// Returns the reporting job, task, and party.
    #[must_use]
    pub const fn source(&self) -> &MetricSource {
        &self.source
    }

    /// Returns the metric point.
    #[must_use]
    pub const fn point(&self) -> &MetricPoint {
        &self.point
    }

    /// Returns the serialized payload.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the timestamp of the latest persist.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replaces the serialized payload.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Records the identifier assigned by the store on first insert.
    pub(crate) const fn assign_id(&mut self, id: MetricId) {
        self.id = Some(id);
    }

    /// Binds the record to the shard holding its row.
    pub(crate) fn bind_shard(&mut self, shard: ShardKey) {
        self.shard = Some(shard);
    }
}

impl Touch for MetricRecord {
    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

fn require_text(field: &'static str, value: &str, limit: usize) -> Result<(), MetricDomainError> {
    if value.trim().is_empty() {
        return Err(MetricDomainError::EmptyField { field });
    }
    let actual = value.chars().count();
    if actual > limit {
        return Err(MetricDomainError::FieldTooLong {
            field,
            limit,
            actual,
        });
    }
    Ok(())
}
