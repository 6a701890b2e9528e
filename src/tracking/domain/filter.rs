//! Equality filter applied to metric reads.

use super::{MetricKind, MetricRecord};

/// Optional equality predicates over metric record fields.
///
/// Unset predicates match everything, so the default filter selects every
/// record in a shard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricFilter {
    job_id: Option<String>,
    component_name: Option<String>,
    task_id: Option<String>,
    role: Option<String>,
    party_id: Option<String>,
    namespace: Option<String>,
    name: Option<String>,
    key: Option<String>,
    kind: Option<MetricKind>,
}

impl MetricFilter {
    /// Creates a filter that matches every record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts results to one job.
    #[must_use]
    pub fn with_job_id(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = Some(job_id.into());
        self
    }

    /// Restricts results to one pipeline component.
    #[must_use]
    pub fn with_component_name(mut self, component_name: impl Into<String>) -> Self {
        self.component_name = Some(component_name.into());
        self
    }

    /// Restricts results to one task.
    #[must_use]
    pub fn with_task_id(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    /// Restricts results to one role.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Restricts results to one party.
    #[must_use]
    pub fn with_party_id(mut self, party_id: impl Into<String>) -> Self {
        self.party_id = Some(party_id.into());
        self
    }

    /// Restricts results to one metric namespace.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Restricts results to one metric name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Restricts results to one key.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Restricts results to data or metadata records.
    #[must_use]
    pub const fn with_kind(mut self, kind: MetricKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Returns the job predicate.
    #[must_use]
    pub fn job_id(&self) -> Option<&str> {
        self.job_id.as_deref()
    }

    /// Returns the component predicate.
    #[must_use]
    pub fn component_name(&self) -> Option<&str> {
        self.component_name.as_deref()
    }

    /// Returns the task predicate.
    #[must_use]
    pub fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref()
    }

    /// Returns the role predicate.
    #[must_use]
    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    /// Returns the party predicate.
    #[must_use]
    pub fn party_id(&self) -> Option<&str> {
        self.party_id.as_deref()
    }

    /// Returns the namespace predicate.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Returns the name predicate.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the key predicate.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Returns the kind predicate.
    #[must_use]
    pub const fn kind(&self) -> Option<MetricKind> {
        self.kind
    }

    /// Returns `true` when every set predicate equals the record's field.
    #[must_use]
    pub fn matches(&self, record: &MetricRecord) -> bool {
        let source = record.source();
        let point = record.point();
        field_matches(self.job_id(), source.job_id())
            && field_matches(self.component_name(), source.component_name())
            && field_matches(self.task_id(), source.task_id())
            && field_matches(self.role(), source.role())
            && field_matches(self.party_id(), source.party_id())
            && field_matches(self.namespace(), point.namespace())
            && field_matches(self.name(), point.name())
            && field_matches(self.key(), point.key())
            && self.kind.is_none_or(|kind| kind == point.kind())
    }
}

fn field_matches(expected: Option<&str>, actual: &str) -> bool {
    expected.is_none_or(|value| value == actual)
}
