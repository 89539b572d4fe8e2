//! Command-line interface orchestration for LPgraph.
//!
//! `run` loads a weighted edge list, scores every selected method and writes
//! ten reconstructions per method; `methods` lists the registry.

mod commands;

pub use commands::{
    Cli, CliError, Command, DuplicateMode, ExecutionSummary, MethodRow, MethodsCommand,
    RunCommand, render_summary, run_cli,
};

#[cfg(test)]
mod test_helpers;
