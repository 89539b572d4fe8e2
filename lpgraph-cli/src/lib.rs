//! Support library for the `lpgraph` binary.
//!
//! Re-exports the CLI and logging modules so doctests and integration tests
//! can exercise the commands without spawning a subprocess.

pub mod cli;
pub mod logging;
