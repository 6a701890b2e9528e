//! Persistence conventions shared by every stored record type.
//!
//! Records that carry a last-update timestamp implement [`Touch`]. Persist
//! paths call [`touch_before_save`] immediately before writing, so the
//! timestamp always reflects the latest save whether the row is new or
//! already stored. Types without such a field simply do not implement the
//! trait and cannot be passed to the hook.

use chrono::{DateTime, Utc};
use mockable::Clock;

/// Capability of records that track when they were last persisted.
pub trait Touch {
    /// Sets the record's last-update timestamp.
    fn touch(&mut self, now: DateTime<Utc>);
}

/// Stamps `record` with the current clock time ahead of a write.
///
/// Returns the timestamp that was applied.
pub fn touch_before_save<R, C>(record: &mut R, clock: &C) -> DateTime<Utc>
where
    R: Touch + ?Sized,
    C: Clock + ?Sized,
{
    let now = clock.utc();
    record.touch(now);
    now
}
