//! Port contracts for metric tracking.
//!
//! Ports define infrastructure-agnostic interfaces used by the metric store.

pub mod storage;

pub use storage::{MetricStorage, MetricStorageError, MetricStorageResult};

#[cfg(test)]
pub use storage::MockMetricStorage;
