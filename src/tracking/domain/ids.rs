//! Identifier types for the metric domain.

use super::MetricDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned identifier of a persisted metric record.
///
/// Identifiers are unique within one shard only; the same value may appear in
/// two different shards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct MetricId(i64);

impl MetricId {
    /// Creates a validated metric identifier.
    ///
    /// # Errors
    ///
    /// Returns [`MetricDomainError::InvalidMetricId`] when the value is zero
    /// or negative.
    pub const fn new(value: i64) -> Result<Self, MetricDomainError> {
        if value <= 0 {
            return Err(MetricDomainError::InvalidMetricId(value));
        }
        Ok(Self(value))
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for MetricId {
    type Error = MetricDomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MetricId> for i64 {
    fn from(id: MetricId) -> Self {
        id.0
    }
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
