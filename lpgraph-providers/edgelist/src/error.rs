//! Errors raised while reading edge-list and group files.

use std::{io, path::PathBuf};

use lpgraph_core::GraphError;
use thiserror::Error;

/// Failure to turn an edge-list (and optional group file) into a graph.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EdgeListError {
    /// The file could not be opened.
    #[error("failed to open `{path}`: {source}")]
    Open {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// Reading a line failed part-way through the input.
    #[error("failed to read line {line}: {source}")]
    Read {
        /// One-based line number.
        line: usize,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// A record ended before a required column.
    #[error("line {line}: missing {field} column")]
    MissingField {
        /// One-based line number.
        line: usize,
        /// Name of the absent column.
        field: &'static str,
    },
    /// The weight column did not parse as a number.
    #[error("line {line}: weight `{raw}` is not a number")]
    InvalidWeight {
        /// One-based line number.
        line: usize,
        /// The offending token.
        raw: String,
    },
    /// The record violated a graph invariant such as a self-loop.
    #[error("line {line}: {source}")]
    Record {
        /// One-based line number.
        line: usize,
        /// The rejected invariant.
        #[source]
        source: GraphError,
    },
    /// The finished graph was rejected, typically because it had no edges.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl EdgeListError {
    /// Returns a stable machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Open { .. } => "EDGELIST_OPEN",
            Self::Read { .. } => "EDGELIST_READ",
            Self::MissingField { .. } => "EDGELIST_MISSING_FIELD",
            Self::InvalidWeight { .. } => "EDGELIST_INVALID_WEIGHT",
            Self::Record { .. } => "EDGELIST_INVALID_RECORD",
            Self::Graph(_) => "EDGELIST_INVALID_GRAPH",
        }
    }

    /// Returns the one-based line number when the error is tied to a record.
    #[must_use]
    pub const fn line(&self) -> Option<usize> {
        match self {
            Self::Read { line, .. }
            | Self::MissingField { line, .. }
            | Self::InvalidWeight { line, .. }
            | Self::Record { line, .. } => Some(*line),
            Self::Open { .. } | Self::Graph(_) => None,
        }
    }
}
