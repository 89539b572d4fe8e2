//! Error types for the LPgraph core library.
//!
//! Defines the error enums exposed by the public API. Each enum carries a
//! stable machine-readable code so the CLI and log pipelines can classify
//! failures without matching on display strings.

use std::{error::Error as StdError, fmt, io, path::PathBuf, sync::Arc};

use thiserror::Error;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// An error raised while assembling a [`crate::Graph`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GraphError {
    /// An edge joined a node to itself.
    #[error("edge joins node `{node}` to itself")]
    SelfLoop {
        /// Label of the offending node.
        node: Arc<str>,
    },
    /// An edge weight was NaN or infinite.
    #[error("edge ({source_node}, {target_node}) has non-finite weight {weight}")]
    NonFiniteWeight {
        /// Label of the first endpoint.
        source_node: Arc<str>,
        /// Label of the second endpoint.
        target_node: Arc<str>,
        /// The rejected weight.
        weight: f64,
    },
    /// The graph contained no training edges.
    #[error("graph `{graph}` contains no training edges")]
    Empty {
        /// Name of the empty graph.
        graph: Arc<str>,
    },
}

define_error_codes! {
    /// Stable codes describing [`GraphError`] variants.
    enum GraphErrorCode for GraphError {
        /// An edge joined a node to itself.
        SelfLoop => SelfLoop { .. } => "GRAPH_SELF_LOOP",
        /// An edge weight was NaN or infinite.
        NonFiniteWeight => NonFiniteWeight { .. } => "GRAPH_NON_FINITE_WEIGHT",
        /// The graph contained no training edges.
        Empty => Empty { .. } => "GRAPH_EMPTY",
    }
}

/// An error produced by a [`crate::ScoringMethod`] implementation.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ScoringError {
    /// The method needs group membership but the graph carries none.
    #[error("method `{method}` requires group membership but the graph has none")]
    MissingGroups {
        /// Name of the method that required groups.
        method: Arc<str>,
    },
    /// The method's configuration record did not match what it expects.
    #[error("method `{method}` received invalid parameters: {reason}")]
    InvalidParameters {
        /// Name of the misconfigured method.
        method: Arc<str>,
        /// Human-readable description of the mismatch.
        reason: &'static str,
    },
    /// A candidate referenced a node that is not part of the graph.
    #[error("method `{method}` was handed unknown node index {index}")]
    UnknownNode {
        /// Name of the method that detected the problem.
        method: Arc<str>,
        /// Offending node index.
        index: usize,
    },
    /// The method emitted an edge joining a node to itself.
    #[error("method `{method}` predicted a self loop on node index {index}")]
    SelfLoop {
        /// Name of the method that produced the edge.
        method: Arc<str>,
        /// Node index at both ends of the edge.
        index: usize,
    },
    /// The method emitted a NaN or infinite score.
    #[error("method `{method}` produced a non-finite score for node indices {source_index} and {target_index}")]
    NonFiniteScore {
        /// Name of the method that produced the score.
        method: Arc<str>,
        /// Source node index of the offending edge.
        source_index: usize,
        /// Target node index of the offending edge.
        target_index: usize,
    },
    /// The graph is too large for a method holding dense per-node state.
    #[error("method `{method}` supports at most {limit} nodes; the graph has {nodes}")]
    GraphTooLarge {
        /// Name of the method that refused the graph.
        method: Arc<str>,
        /// Node count of the graph.
        nodes: usize,
        /// Largest node count the method accepts.
        limit: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`ScoringError`] variants.
    enum ScoringErrorCode for ScoringError {
        /// The method needs group membership but the graph carries none.
        MissingGroups => MissingGroups { .. } => "SCORING_MISSING_GROUPS",
        /// The method's configuration record did not match what it expects.
        InvalidParameters => InvalidParameters { .. } => "SCORING_INVALID_PARAMETERS",
        /// A candidate referenced a node that is not part of the graph.
        UnknownNode => UnknownNode { .. } => "SCORING_UNKNOWN_NODE",
        /// The method emitted an edge joining a node to itself.
        SelfLoop => SelfLoop { .. } => "SCORING_SELF_LOOP",
        /// The method emitted a NaN or infinite score.
        NonFiniteScore => NonFiniteScore { .. } => "SCORING_NON_FINITE_SCORE",
        /// The graph is too large for a method holding dense per-node state.
        GraphTooLarge => GraphTooLarge { .. } => "SCORING_GRAPH_TOO_LARGE",
    }
}

/// An error raised while populating a [`crate::MethodRegistry`].
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum RegistryError {
    /// A method with the same name is already registered.
    #[error("method `{name}` is already registered")]
    DuplicateMethod {
        /// The clashing method name.
        name: Arc<str>,
    },
}

define_error_codes! {
    /// Stable codes describing [`RegistryError`] variants.
    enum RegistryErrorCode for RegistryError {
        /// A method with the same name is already registered.
        DuplicateMethod => DuplicateMethod { .. } => "REGISTRY_DUPLICATE_METHOD",
    }
}

/// An error raised while writing a reconstructed graph artifact.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// The output directory could not be created or opened.
    #[error("failed to open output directory `{path}`: {source}")]
    Directory {
        /// Directory that could not be prepared.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// Writing the artifact file failed.
    #[error("failed to write artifact `{path}`: {source}")]
    Write {
        /// Artifact path that could not be written.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// An edge referenced a node the graph cannot label.
    #[error("artifact `{path}` references unknown node index {index}")]
    UnknownNode {
        /// Artifact being written.
        path: PathBuf,
        /// Node index without a label.
        index: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`ArtifactError`] variants.
    enum ArtifactErrorCode for ArtifactError {
        /// The output directory could not be created or opened.
        Directory => Directory { .. } => "ARTIFACT_DIRECTORY",
        /// Writing the artifact file failed.
        Write => Write { .. } => "ARTIFACT_WRITE",
        /// An edge referenced a node the graph cannot label.
        UnknownNode => UnknownNode { .. } => "ARTIFACT_UNKNOWN_NODE",
    }
}

/// Error type produced when configuring or running a [`crate::Pipeline`].
///
/// Only configuration mistakes and graph loading failures surface here. Per
/// method and per artifact failures are recorded in the
/// [`crate::PipelineReport`] instead.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The candidate hop limit must be at least one.
    #[error("max_hops must be at least 1 (got {got})")]
    InvalidMaxHops {
        /// The rejected hop limit.
        got: usize,
    },
    /// The artifact extension was empty or contained a path separator.
    #[error("artifact extension `{extension}` is invalid")]
    InvalidExtension {
        /// The rejected extension.
        extension: String,
    },
    /// The graph source could not be read or parsed.
    #[error("failed to load graph source `{source_name}`: {error}")]
    GraphLoad {
        /// Name reported by the graph source.
        source_name: Arc<str>,
        /// Underlying loader failure.
        #[source]
        error: Box<dyn StdError + Send + Sync>,
    },
}

define_error_codes! {
    /// Stable codes describing [`PipelineError`] variants.
    enum PipelineErrorCode for PipelineError {
        /// The candidate hop limit must be at least one.
        InvalidMaxHops => InvalidMaxHops { .. } => "PIPELINE_INVALID_MAX_HOPS",
        /// The artifact extension was empty or contained a path separator.
        InvalidExtension => InvalidExtension { .. } => "PIPELINE_INVALID_EXTENSION",
        /// The graph source could not be read or parsed.
        GraphLoad => GraphLoad { .. } => "PIPELINE_GRAPH_LOAD_FAILED",
    }
}

/// Convenient alias for results returned by the pipeline API.
pub type Result<T> = core::result::Result<T, PipelineError>;
