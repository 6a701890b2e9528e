//! Application services for date-partitioned metric storage.

mod registry;
mod store;

pub use registry::ShardRegistry;
pub use store::{MetricStore, MetricStoreError, MetricStoreResult};
