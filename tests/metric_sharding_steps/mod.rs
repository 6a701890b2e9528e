//! Step definitions for metric sharding scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
