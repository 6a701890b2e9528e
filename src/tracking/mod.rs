//! Date-partitioned storage for job tracking metrics.
//!
//! Metrics reported by running jobs are spread over one table per shard key,
//! where the key is an explicit label or the `YYYYMMDD` date of the request.
//! Shard tables are created on first use and their handles cached for the
//! lifetime of the owning store. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
