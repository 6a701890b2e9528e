//! Adapter implementations for the metric storage port.

pub mod memory;
pub mod postgres;
