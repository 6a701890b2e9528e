//! Unit tests for date-partitioned metric tracking.


use crate::tracking::domain::{MetricKind, MetricPoint, MetricRecord, MetricSource};
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use std::sync::{Mutex, PoisonError};

/// Clock frozen at an instant that tests can move explicitly.
///
/// Its local reading is the UTC reading shifted by a fixed offset, whatever
/// the host zone is.
pub(super) struct SteppingClock {
    now: Mutex<DateTime<Utc>>,
    local_offset: TimeDelta,
}

impl SteppingClock {
    pub(super) const fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
            local_offset: TimeDelta::zero(),
        }
    }

    pub(super) fn with_local_offset(mut self, hours: i64) -> Self {
        self.local_offset = TimeDelta::hours(hours);
        self
    }

    pub(super) fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        let wall = (self.utc() + self.local_offset).naive_utc();
        Local
            .from_local_datetime(&wall)
            .earliest()
            .expect("test wall-clock time exists in the host zone")
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub(super) fn instant(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, second)
        .single()
        .expect("valid test timestamp")
}

pub(super) fn source() -> MetricSource {
    MetricSource::new(
        "202401011200000000001",
        "hetero_lr_0",
        "202401011200000000001_hetero_lr_0",
        "guest",
        "9999",
    )
    .expect("valid metric source")
}

pub(super) fn data_record(
    namespace: &str,
    name: &str,
    key: &str,
    clock: &impl Clock,
) -> MetricRecord {
    let point = MetricPoint::new(namespace, name, key, MetricKind::Data).expect("valid point");
    MetricRecord::new(source(), point, "0.6931", clock)
}
