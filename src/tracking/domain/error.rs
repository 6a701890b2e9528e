//! Error types for metric domain validation and parsing.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors returned while constructing metric domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MetricDomainError {
    /// A required text field is empty after trimming.
    #[error("metric field '{field}' must not be empty")]
    EmptyField {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A text field exceeds its persisted column width.
    #[error("metric field '{field}' is {actual} characters long, limit is {limit}")]
    FieldTooLong {
        /// Name of the offending field.
        field: &'static str,
        /// Column width in characters.
        limit: usize,
        /// Actual length in characters.
        actual: usize,
    },

    /// A shard label contains characters that are not valid in a table name.
    #[error("invalid shard label '{0}', expected ASCII letters, digits or '_'")]
    InvalidShardLabel(String),

    /// A shard label ends in a suffix `PostgreSQL` uses for the indexes and
    /// sequences of another shard.
    #[error("shard label '{0}' ends in a reserved suffix (_idx, _seq or _pkey)")]
    ReservedShardLabel(String),

    /// A date falls outside the years that render as four digits.
    #[error("date {0} is outside the shard key range 0000-01-01..=9999-12-31")]
    DateOutOfRange(NaiveDate),

    /// The physical table name would exceed the identifier budget.
    #[error("shard table name '{name}' exceeds {limit} bytes")]
    ShardTableNameTooLong {
        /// The rejected table name.
        name: String,
        /// Maximum table name length in bytes.
        limit: usize,
    },

    /// The table prefix is not a lowercase SQL identifier.
    #[error("invalid shard table prefix '{0}'")]
    InvalidTablePrefix(String),

    /// A metric identifier is not a positive integer.
    #[error("invalid metric identifier {0}, expected a positive integer")]
    InvalidMetricId(i64),
}

/// Error returned while parsing metric kinds from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown metric kind code: {0}")]
pub struct ParseMetricKindError(pub i32);
