//! `PostgreSQL` adapters for metric shard persistence.

mod ddl;
mod models;
mod storage;

pub use storage::{MetricPgPool, PostgresMetricStorage};
