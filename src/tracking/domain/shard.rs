//! Shard keys, selectors, and physical table names.

use super::MetricDomainError;
use chrono::{DateTime, Datelike, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default prefix shared by every metric shard table.
pub const DEFAULT_TABLE_PREFIX: &str = "t_tracking_metric";

/// Format used for date-derived shard keys.
const DATE_KEY_FORMAT: &str = "%Y%m%d";

/// Trailing label segments reserved for relations derived from a table name:
/// the shard indexes, the `f_id` sequence, and the primary key.
const RESERVED_LABEL_SUFFIXES: [&str; 3] = ["idx", "seq", "pkey"];

/// Years whose `%Y` rendering is exactly four digits.
const SHARD_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

/// Longest accepted table prefix in bytes.
const MAX_PREFIX_LEN: usize = 30;

/// Longest accepted physical table name in bytes.
///
/// Index names append up to 14 bytes to the table name and `PostgreSQL`
/// truncates identifiers beyond 63 bytes.
pub const MAX_TABLE_NAME_LEN: usize = 48;

/// Partition label identifying one metric shard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShardKey(String);

impl ShardKey {
    /// Derives the shard key for a calendar date (`YYYYMMDD`).
    ///
    /// # Errors
    ///
    /// Returns [`MetricDomainError::DateOutOfRange`] for years that do not
    /// render as four digits.
    pub fn for_date(date: NaiveDate) -> Result<Self, MetricDomainError> {
        if !SHARD_YEARS.contains(&date.year()) {
            return Err(MetricDomainError::DateOutOfRange(date));
        }
        Ok(Self(date.format(DATE_KEY_FORMAT).to_string()))
    }

    /// Creates a shard key from an explicit partition label.
    ///
    /// Surrounding whitespace is ignored. A label whose last `_`-separated
    /// segment is `idx`, `seq` or `pkey` would name a table after an index,
    /// sequence, or primary key of another shard, so it is refused.
    ///
    /// # Errors
    ///
    /// Returns [`MetricDomainError::InvalidShardLabel`] when the label is
    /// empty or contains anything other than ASCII letters, digits and `_`,
    /// and [`MetricDomainError::ReservedShardLabel`] for reserved suffixes.
    pub fn from_label(label: &str) -> Result<Self, MetricDomainError> {
        let trimmed = label.trim();
        let is_valid = !trimmed.is_empty()
            && trimmed
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
        if !is_valid {
            return Err(MetricDomainError::InvalidShardLabel(label.to_owned()));
        }
        let last_segment = trimmed.rsplit('_').next().unwrap_or(trimmed);
        if RESERVED_LABEL_SUFFIXES
            .iter()
            .any(|suffix| last_segment.eq_ignore_ascii_case(suffix))
        {
            return Err(MetricDomainError::ReservedShardLabel(trimmed.to_owned()));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the key as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ShardKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ShardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Caller-facing description of which shard an operation targets.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ShardSelector {
    /// The shard for today's date, according to the store clock.
    #[default]
    Current,
    /// The shard for an explicit calendar date.
    Date(NaiveDate),
    /// An explicit partition label. Blank labels behave like [`Self::Current`].
    Label(String),
}

impl ShardSelector {
    /// Builds a selector from an optional label and an optional reference
    /// date.
    ///
    /// A non-blank label takes precedence over the date; without either the
    /// selector targets today's shard.
    #[must_use]
    pub fn from_parts(label: Option<&str>, date: Option<NaiveDate>) -> Self {
        match (label.filter(|value| !value.trim().is_empty()), date) {
            (Some(value), _) => Self::Label(value.to_owned()),
            (None, Some(day)) => Self::Date(day),
            (None, None) => Self::Current,
        }
    }

    /// Selects the shard for the calendar date of an instant in its own
    /// time zone.
    #[must_use]
    pub fn at<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        Self::Date(instant.date_naive())
    }

    /// Selects the shard a saved record is bound to.
    #[must_use]
    pub fn bound_to(key: &ShardKey) -> Self {
        Self::Label(key.as_str().to_owned())
    }

    /// Selects a shard by explicit partition label.
    #[must_use]
    pub fn label(value: impl Into<String>) -> Self {
        Self::Label(value.into())
    }

    /// Computes the shard key, using `today` only when the selector carries
    /// neither a usable label nor a date.
    ///
    /// # Errors
    ///
    /// Returns [`MetricDomainError::InvalidShardLabel`] or
    /// [`MetricDomainError::ReservedShardLabel`] for unusable labels, and
    /// [`MetricDomainError::DateOutOfRange`] for dates without a key.
    pub fn shard_key(&self, today: NaiveDate) -> Result<ShardKey, MetricDomainError> {
        match self {
            Self::Label(value) if !value.trim().is_empty() => ShardKey::from_label(value),
            Self::Date(day) => ShardKey::for_date(*day),
            Self::Label(_) | Self::Current => ShardKey::for_date(today),
        }
    }
}

impl fmt::Display for ShardSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Current => write!(f, "current"),
            Self::Date(day) => write!(f, "date:{}", day.format(DATE_KEY_FORMAT)),
            Self::Label(value) => write!(f, "label:{value}"),
        }
    }
}

/// Validated name prefix shared by all shards of one metric store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TablePrefix(String);

impl TablePrefix {
    /// Creates a validated table prefix.
    ///
    /// # Errors
    ///
    /// Returns [`MetricDomainError::InvalidTablePrefix`] unless the value is a
    /// lowercase SQL identifier of at most 30 bytes.
    pub fn new(value: impl Into<String>) -> Result<Self, MetricDomainError> {
        let raw = value.into();
        let mut chars = raw.chars();
        let starts_well = chars
            .next()
            .is_some_and(|ch| ch.is_ascii_lowercase() || ch == '_');
        let rest_valid =
            chars.all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_');
        if !starts_well || !rest_valid || raw.len() > MAX_PREFIX_LEN {
            return Err(MetricDomainError::InvalidTablePrefix(raw));
        }
        Ok(Self(raw))
    }

    /// Returns the prefix as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the base table, which carries the prefix as its full name.
    #[must_use]
    pub fn base_table(&self) -> ShardTable {
        ShardTable(self.0.clone())
    }

    /// Returns the physical table for a shard key.
    ///
    /// # Errors
    ///
    /// Returns [`MetricDomainError::ShardTableNameTooLong`] when the combined
    /// name exceeds [`MAX_TABLE_NAME_LEN`].
    pub fn shard_table(&self, key: &ShardKey) -> Result<ShardTable, MetricDomainError> {
        let name = format!("{}_{}", self.0, key.as_str());
        if name.len() > MAX_TABLE_NAME_LEN {
            return Err(MetricDomainError::ShardTableNameTooLong {
                name,
                limit: MAX_TABLE_NAME_LEN,
            });
        }
        Ok(ShardTable(name))
    }
}

impl Default for TablePrefix {
    fn default() -> Self {
        Self(DEFAULT_TABLE_PREFIX.to_owned())
    }
}

impl TryFrom<String> for ShardKey {
    type Error = MetricDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_label(&value)
    }
}

impl From<ShardKey> for String {
    fn from(key: ShardKey) -> Self {
        key.0
    }
}

impl TryFrom<String> for TablePrefix {
    type Error = MetricDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TablePrefix> for String {
    fn from(prefix: TablePrefix) -> Self {
        prefix.0
    }
}

impl fmt::Display for TablePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name of a physical table holding metric rows.
///
/// Only constructed from a validated [`TablePrefix`] and [`ShardKey`], so the
/// name is always a safe identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShardTable(String);

impl ShardTable {
    /// Returns the table name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ShardTable {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ShardTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolved shard: its key and the physical table backing it.
///
/// Handles built for the same key are interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShardHandle {
    key: ShardKey,
    table: ShardTable,
}

impl ShardHandle {
    /// Binds a shard key to its physical table.
    #[must_use]
    pub const fn new(key: ShardKey, table: ShardTable) -> Self {
        Self { key, table }
    }

    /// Returns the shard key.
    #[must_use]
    pub const fn key(&self) -> &ShardKey {
        &self.key
    }

    /// Returns the physical table.
    #[must_use]
    pub const fn table(&self) -> &ShardTable {
        &self.table
    }
}
