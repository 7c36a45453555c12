//! Infrastructure adapters: the in-memory host and telemetry setup.

pub mod error;
pub mod memory;
pub mod telemetry;
