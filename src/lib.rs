//! Flowstore: persistence layer for distributed job orchestration.
//!
//! This crate stores the tracking metrics that running jobs report, spreading
//! them over date-partitioned shard tables so no single table grows without
//! bound.
//!
//! # Architecture
//!
//! Flowstore follows hexagonal architecture principles:
//!
//! - **Domain**: Pure metric and shard types with no infrastructure
//!   dependencies
//! - **Ports**: Abstract trait interfaces for storage
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`)
//!
//! # Modules
//!
//! - [`tracking`]: Date-partitioned metric store
//! - [`record`]: Touch-on-save convention shared by stored records
//! - [`config`]: Store and connection pool settings

pub mod config;
pub mod record;
pub mod tracking;
