//! `puntoventa-observability` — tracing/logging initialization.

pub mod tracing;

pub use tracing::init;
