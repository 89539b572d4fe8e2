//! Shared test utilities used across the LPgraph crates.

pub mod ci;
pub mod tracing;
