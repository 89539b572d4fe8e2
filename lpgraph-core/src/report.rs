//! Run reports returned by the pipeline driver.

use std::{path::PathBuf, sync::Arc};

use crate::{error::ScoringError, graph::Graph};

/// What happened to one method during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodOutcome {
    /// Candidates were ranked and the ten levels were attempted.
    Completed {
        /// Paths of the artifacts written, in level order.
        artifacts: Vec<PathBuf>,
        /// Number of levels whose artifact could not be written.
        failed_artifacts: usize,
    },
    /// The method name is not in the registry.
    Unresolved,
    /// The predictor produced no candidates.
    EmptyCandidates,
    /// The predictor failed.
    ScoringFailed {
        /// The predictor error.
        error: ScoringError,
    },
}

impl MethodOutcome {
    /// Returns `true` when the method was skipped without attempting any
    /// artifact.
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        !matches!(self, Self::Completed { .. })
    }

    /// Returns a short lowercase label for summaries.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Completed { failed_artifacts: 0, .. } => "completed",
            Self::Completed { .. } => "partial",
            Self::Unresolved => "unresolved",
            Self::EmptyCandidates => "empty",
            Self::ScoringFailed { .. } => "failed",
        }
    }
}

/// Per-method entry of a [`PipelineReport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodReport {
    method: Arc<str>,
    candidates: usize,
    outcome: MethodOutcome,
}

impl MethodReport {
    pub(crate) fn new(method: impl Into<Arc<str>>, candidates: usize, outcome: MethodOutcome) -> Self {
        Self {
            method: method.into(),
            candidates,
            outcome,
        }
    }

    /// Returns the method name as requested.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns how many scored candidates the method produced.
    #[must_use]
    pub fn candidates(&self) -> usize {
        self.candidates
    }

    /// Returns the outcome.
    #[must_use]
    pub fn outcome(&self) -> &MethodOutcome {
        &self.outcome
    }

    /// Returns the artifacts written for this method.
    #[must_use]
    pub fn artifacts(&self) -> &[PathBuf] {
        match &self.outcome {
            MethodOutcome::Completed { artifacts, .. } => artifacts,
            _ => &[],
        }
    }
}

/// Summary of a whole run.
///
/// A report is produced whenever the graph loads, whatever happened to the
/// individual methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    graph: Arc<str>,
    node_count: usize,
    training_edges: usize,
    methods: Vec<MethodReport>,
}

impl PipelineReport {
    pub(crate) fn new(graph: &Graph, methods: Vec<MethodReport>) -> Self {
        Self {
            graph: Arc::from(graph.name()),
            node_count: graph.node_count(),
            training_edges: graph.training_edges().len(),
            methods,
        }
    }

    /// Returns the graph name.
    #[must_use]
    pub fn graph(&self) -> &str {
        &self.graph
    }

    /// Returns the number of nodes in the loaded graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Returns the number of training edges.
    #[must_use]
    pub fn training_edges(&self) -> usize {
        self.training_edges
    }

    /// Returns the per-method reports in run order.
    #[must_use]
    pub fn methods(&self) -> &[MethodReport] {
        &self.methods
    }

    /// Looks up the report for `method`.
    #[must_use]
    pub fn method(&self, method: &str) -> Option<&MethodReport> {
        self.methods.iter().find(|report| report.method() == method)
    }

    /// Returns the total number of artifacts written.
    #[must_use]
    pub fn artifacts_written(&self) -> usize {
        self.methods.iter().map(|report| report.artifacts().len()).sum()
    }

    /// Returns the total number of artifacts that failed to write.
    #[must_use]
    pub fn artifact_failures(&self) -> usize {
        self.methods
            .iter()
            .map(|report| match report.outcome() {
                MethodOutcome::Completed { failed_artifacts, .. } => *failed_artifacts,
                _ => 0,
            })
            .sum()
    }

    /// Returns the number of methods skipped without artifacts.
    #[must_use]
    pub fn skipped_methods(&self) -> usize {
        self.methods
            .iter()
            .filter(|report| report.outcome().is_skipped())
            .count()
    }
}
