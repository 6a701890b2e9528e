//! Domain model for date-partitioned metric tracking.
//!
//! Metric records, shard keys, and read filters live here with no knowledge
//! of the database that eventually stores them.

mod error;
mod filter;
mod ids;
mod metric;
mod shard;

pub use error::{MetricDomainError, ParseMetricKindError};
pub use filter::MetricFilter;
pub use ids::MetricId;
pub use metric::{MetricKind, MetricPoint, MetricRecord, MetricSource, PersistedMetricData};
pub use shard::{
    DEFAULT_TABLE_PREFIX, MAX_TABLE_NAME_LEN, ShardHandle, ShardKey, ShardSelector, ShardTable,
    TablePrefix,
};
