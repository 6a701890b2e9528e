//! Shared world state for metric sharding BDD scenarios.

use chrono::{DateTime, Local, TimeZone, Utc};
use flowstore::tracking::{
    adapters::memory::InMemoryMetricStorage,
    domain::MetricRecord,
    services::{MetricStore, MetricStoreError},
};
use mockable::Clock;
use rstest::fixture;
use std::sync::{Arc, Mutex, PoisonError};

/// Clock whose reading is set explicitly by scenario steps.
///
/// Its local wall-clock reading matches the UTC one, whatever the host zone.
#[derive(Debug, Default)]
pub struct ScenarioClock {
    now: Mutex<DateTime<Utc>>,
}

impl ScenarioClock {
    /// Moves the clock to the given instant.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }
}

impl Clock for ScenarioClock {
    fn local(&self) -> DateTime<Local> {
        let now = self.utc();
        Local
            .from_local_datetime(&now.naive_utc())
            .earliest()
            .unwrap_or_else(|| now.with_timezone(&Local))
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Store type used by the BDD world.
pub type TestMetricStore = MetricStore<InMemoryMetricStorage, ScenarioClock>;

/// Scenario world for metric sharding behaviour tests.
pub struct ShardingWorld {
    pub storage: InMemoryMetricStorage,
    pub clock: Arc<ScenarioClock>,
    pub store: TestMetricStore,
    pub first_record: Option<MetricRecord>,
    pub last_write_result: Option<Result<(), MetricStoreError>>,
    pub last_query_result: Option<Result<Vec<MetricRecord>, MetricStoreError>>,
}

impl ShardingWorld {
    /// Creates a world over empty in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        let storage = InMemoryMetricStorage::new();
        let clock = Arc::new(ScenarioClock::default());
        let store = MetricStore::new(Arc::new(storage.clone()), Arc::clone(&clock));
        Self {
            storage,
            clock,
            store,
            first_record: None,
            last_write_result: None,
            last_query_result: None,
        }
    }
}

impl Default for ShardingWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> ShardingWorld {
    ShardingWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

/// Parses an RFC 3339 instant from a step argument.
///
/// # Errors
///
/// Returns an error when the text is not a valid RFC 3339 timestamp.
pub fn parse_instant(text: &str) -> Result<DateTime<Utc>, eyre::Report> {
    DateTime::parse_from_rfc3339(text)
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|err| eyre::eyre!("invalid instant {text}: {err}"))
}
