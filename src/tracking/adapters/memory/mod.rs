//! In-memory adapters for metric tracking.

mod storage;

pub use storage::InMemoryMetricStorage;
