//! Pipeline driver: configuration, the per-method loop and batch reporting.
//!
//! The driver is the only error boundary of a run. Loading the graph is the
//! single fatal step; everything after it is isolated per method or per
//! artifact and recorded in the [`PipelineReport`].

use std::{
    collections::HashSet,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    sync::Arc,
};

use tracing::{Span, debug, info, instrument, warn};

use crate::{
    Result,
    artifact::{ArtifactId, ArtifactLayout, ArtifactSink, DEFAULT_EXTENSION, DirectorySink, render_edge_list},
    error::PipelineError,
    graph::Graph,
    registry::MethodRegistry,
    report::{MethodOutcome, MethodReport, PipelineReport},
    runner::{Prediction, PredictionRunner},
    source::GraphSource,
    threshold::{DuplicatePolicy, RankedCandidates, ThresholdReconstructor},
};

/// Default candidate hop limit.
pub const DEFAULT_MAX_HOPS: usize = 2;

/// Configures and constructs [`Pipeline`] instances.
///
/// # Examples
/// ```
/// use lpgraph_core::{DuplicatePolicy, MethodRegistry, PipelineBuilder};
///
/// let pipeline = PipelineBuilder::new()
///     .with_registry(MethodRegistry::new())
///     .with_output_dir("results")
///     .with_duplicate_policy(DuplicatePolicy::DropTrainingDuplicates)
///     .build()
///     .expect("configuration is valid");
/// assert_eq!(pipeline.max_hops().get(), 2);
/// assert_eq!(pipeline.layout().extension(), "lpg");
/// ```
#[derive(Debug, Clone)]
pub struct PipelineBuilder {
    registry: MethodRegistry,
    output_dir: PathBuf,
    extension: String,
    max_hops: usize,
    duplicate_policy: DuplicatePolicy,
    methods: Option<Vec<Arc<str>>>,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self {
            registry: MethodRegistry::new(),
            output_dir: PathBuf::from("."),
            extension: DEFAULT_EXTENSION.to_owned(),
            max_hops: DEFAULT_MAX_HOPS,
            duplicate_policy: DuplicatePolicy::default(),
            methods: None,
        }
    }
}

impl PipelineBuilder {
    /// Creates a builder populated with default parameters.
    ///
    /// # Examples
    /// ```
    /// use lpgraph_core::{DuplicatePolicy, PipelineBuilder};
    ///
    /// let builder = PipelineBuilder::new();
    /// assert_eq!(builder.max_hops(), 2);
    /// assert_eq!(builder.duplicate_policy(), DuplicatePolicy::Keep);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the methods available to the run.
    #[must_use]
    pub fn with_registry(mut self, registry: MethodRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Sets the directory artifacts are written to.
    #[must_use]
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Overrides the artifact extension, given without the leading dot.
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Overrides the candidate hop limit.
    #[must_use]
    pub fn with_max_hops(mut self, max_hops: usize) -> Self {
        self.max_hops = max_hops;
        self
    }

    /// Returns the configured hop limit.
    #[must_use]
    pub fn max_hops(&self) -> usize {
        self.max_hops
    }

    /// Sets how candidates repeating a training edge are handled.
    #[must_use]
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// Returns the configured duplicate policy.
    #[must_use]
    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.duplicate_policy
    }

    /// Restricts the run to `methods`, in the given order.
    ///
    /// Names are not checked here. Unknown names are reported as unresolved
    /// when the pipeline runs, without affecting the other methods. A name
    /// given more than once runs once, at its first position.
    #[must_use]
    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        self.methods = Some(methods.into_iter().map(Into::into).collect());
        self
    }

    /// Validates the configuration and constructs a [`Pipeline`].
    ///
    /// # Errors
    /// Returns [`PipelineError::InvalidMaxHops`] for a zero hop limit and
    /// [`PipelineError::InvalidExtension`] for an empty extension or one
    /// containing a dot or path separator.
    pub fn build(self) -> Result<Pipeline> {
        let max_hops = NonZeroUsize::new(self.max_hops)
            .ok_or(PipelineError::InvalidMaxHops { got: self.max_hops })?;
        if !is_valid_extension(&self.extension) {
            return Err(PipelineError::InvalidExtension {
                extension: self.extension,
            });
        }
        let methods = match self.methods {
            Some(selected) => first_occurrences(selected),
            None => self.registry.descriptors().iter().map(|d| d.name_arc()).collect(),
        };

        Ok(Pipeline {
            registry: self.registry,
            layout: ArtifactLayout::new(self.output_dir, self.extension),
            max_hops,
            duplicate_policy: self.duplicate_policy,
            methods,
        })
    }
}

fn first_occurrences(selected: Vec<Arc<str>>) -> Vec<Arc<str>> {
    let mut seen = HashSet::with_capacity(selected.len());
    selected
        .into_iter()
        .filter(|name| {
            let fresh = seen.insert(Arc::clone(name));
            if !fresh {
                debug!(method = &**name, "method selected more than once; running it once");
            }
            fresh
        })
        .collect()
}

fn is_valid_extension(extension: &str) -> bool {
    !extension.is_empty() && !extension.contains(['.', '/', '\\'])
}

/// Runs every selected method against one graph and writes the ten
/// reconstructed graphs of each.
///
/// # Examples
/// ```
/// use lpgraph_core::{
///     CandidatePair, Edge, Graph, GraphBuilder, MemorySink, MethodDescriptor, MethodFamily,
///     MethodParams, MethodRegistry, PipelineBuilder, ScoringError, ScoringMethod,
/// };
///
/// struct Unit;
///
/// impl ScoringMethod for Unit {
///     fn name(&self) -> &str { "Unit" }
///     fn score(&self, _: &Graph, candidates: &[CandidatePair]) -> Result<Vec<Edge>, ScoringError> {
///         Ok(candidates.iter().map(|pair| pair.scored(1.0)).collect())
///     }
/// }
///
/// let mut registry = MethodRegistry::new();
/// registry.register(MethodDescriptor::new(
///     "Unit",
///     MethodFamily::Structural,
///     MethodParams::None,
///     |_| Ok(Box::new(Unit)),
/// ))?;
///
/// let mut builder = GraphBuilder::new("path");
/// builder.add_edge("a", "b", 1.0)?;
/// builder.add_edge("b", "c", 1.0)?;
/// let graph = builder.build()?;
///
/// let pipeline = PipelineBuilder::new().with_registry(registry).build()?;
/// let sink = MemorySink::new();
/// let report = pipeline.run_with_sink(&graph, &sink)?;
/// assert_eq!(report.artifacts_written(), 10);
/// assert_eq!(sink.artifacts().len(), 10);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    registry: MethodRegistry,
    layout: ArtifactLayout,
    max_hops: NonZeroUsize,
    duplicate_policy: DuplicatePolicy,
    methods: Vec<Arc<str>>,
}

impl Pipeline {
    /// Returns the registry methods are resolved against.
    #[must_use]
    pub fn registry(&self) -> &MethodRegistry {
        &self.registry
    }

    /// Returns the artifact naming layout.
    #[must_use]
    pub fn layout(&self) -> &ArtifactLayout {
        &self.layout
    }

    /// Returns the output directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        self.layout.directory()
    }

    /// Returns the candidate hop limit.
    #[must_use]
    pub fn max_hops(&self) -> NonZeroUsize {
        self.max_hops
    }

    /// Returns the duplicate policy.
    #[must_use]
    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.duplicate_policy
    }

    /// Returns the method names the run iterates, in order.
    #[must_use]
    pub fn methods(&self) -> &[Arc<str>] {
        &self.methods
    }

    /// Runs the pipeline, writing artifacts into the output directory.
    ///
    /// # Errors
    /// Returns [`PipelineError::GraphLoad`] when the source fails to load.
    /// Method and artifact failures are reported in the returned
    /// [`PipelineReport`] instead.
    pub fn run<S: GraphSource>(&self, source: &S) -> Result<PipelineReport> {
        let sink = DirectorySink::new(self.layout.clone());
        self.run_with_sink(source, &sink)
    }

    /// Runs the pipeline against a caller supplied sink.
    ///
    /// Artifact paths follow the sink's own [`ArtifactLayout`].
    ///
    /// # Errors
    /// Returns [`PipelineError::GraphLoad`] when the source fails to load.
    #[instrument(
        name = "core.run",
        err,
        skip(self, source, sink),
        fields(
            graph_source = %source.name(),
            max_hops = self.max_hops.get(),
            duplicates = %self.duplicate_policy,
            methods = self.methods.len(),
            nodes = tracing::field::Empty,
            training_edges = tracing::field::Empty,
        ),
    )]
    pub fn run_with_sink<S, K>(&self, source: &S, sink: &K) -> Result<PipelineReport>
    where
        S: GraphSource,
        K: ArtifactSink + ?Sized,
    {
        let graph = source.load().map_err(|error| PipelineError::GraphLoad {
            source_name: Arc::from(source.name()),
            error: Box::new(error),
        })?;
        let span = Span::current();
        span.record("nodes", graph.node_count());
        span.record("training_edges", graph.training_edges().len());
        info!(
            graph = graph.name(),
            nodes = graph.node_count(),
            training_edges = graph.training_edges().len(),
            "graph loaded"
        );

        let runner = PredictionRunner::new(&graph, &self.registry, self.max_hops);
        let reconstructor = ThresholdReconstructor::new(graph.training_edges(), self.duplicate_policy);
        let reports: Vec<MethodReport> = self
            .methods
            .iter()
            .map(|method| self.run_method(&runner, &reconstructor, sink, method))
            .collect();

        let report = PipelineReport::new(&graph, reports);
        info!(
            methods = report.methods().len(),
            skipped = report.skipped_methods(),
            artifacts = report.artifacts_written(),
            failed_artifacts = report.artifact_failures(),
            "process finished"
        );
        Ok(report)
    }

    fn run_method<K: ArtifactSink + ?Sized>(
        &self,
        runner: &PredictionRunner<'_>,
        reconstructor: &ThresholdReconstructor<'_>,
        sink: &K,
        method: &Arc<str>,
    ) -> MethodReport {
        info!(method = &**method, "running method");
        let candidates = match runner.run_prediction(method) {
            Ok(Prediction::Resolved(candidates)) => candidates,
            Ok(Prediction::Unresolved) => {
                record_skip();
                return MethodReport::new(Arc::clone(method), 0, MethodOutcome::Unresolved);
            }
            Err(error) => {
                warn!(
                    method = &**method,
                    error = %error,
                    code = %error.code(),
                    "predictor failed; skipping method"
                );
                record_skip();
                return MethodReport::new(
                    Arc::clone(method),
                    0,
                    MethodOutcome::ScoringFailed { error },
                );
            }
        };

        if candidates.is_empty() {
            warn!(method = &**method, "predictor returned no candidates; skipping reconstruction");
            record_skip();
            return MethodReport::new(Arc::clone(method), 0, MethodOutcome::EmptyCandidates);
        }

        let ranked = RankedCandidates::rank(candidates);
        let outcome = emit_levels(runner.graph(), method, &ranked, reconstructor, sink);
        MethodReport::new(Arc::clone(method), ranked.len(), outcome)
    }
}

#[instrument(
    name = "core.reconstruct",
    skip_all,
    fields(method = %method, candidates = ranked.len()),
)]
fn emit_levels<K: ArtifactSink + ?Sized>(
    graph: &Graph,
    method: &Arc<str>,
    ranked: &RankedCandidates,
    reconstructor: &ThresholdReconstructor<'_>,
    sink: &K,
) -> MethodOutcome {
    let mut artifacts = Vec::new();
    let mut failed_artifacts = 0;
    for set in reconstructor.reconstruct_all(ranked) {
        let id = ArtifactId::new(Arc::clone(method), set.level());
        let path = sink.layout().resolve(&id);
        let written =
            render_edge_list(graph, &set, &path).and_then(|contents| sink.write(&id, &contents));
        match written {
            Ok(path) => {
                info!(
                    artifact = %path.display(),
                    level = set.level().get(),
                    predicted = set.predicted().len(),
                    edges = set.len(),
                    "artifact created"
                );
                record_written();
                artifacts.push(path);
            }
            Err(error) => {
                warn!(
                    artifact = %path.display(),
                    error = %error,
                    code = %error.code(),
                    "artifact could not be written; skipping"
                );
                record_failure();
                failed_artifacts += 1;
            }
        }
    }
    debug!(
        written = artifacts.len(),
        failed = failed_artifacts,
        "method reconstruction finished"
    );
    MethodOutcome::Completed {
        artifacts,
        failed_artifacts,
    }
}

#[cfg(feature = "metrics")]
fn record_written() {
    metrics::counter!("lpgraph_artifacts_written").increment(1);
}

#[cfg(not(feature = "metrics"))]
fn record_written() {}

#[cfg(feature = "metrics")]
fn record_failure() {
    metrics::counter!("lpgraph_artifact_failures").increment(1);
}

#[cfg(not(feature = "metrics"))]
fn record_failure() {}

#[cfg(feature = "metrics")]
fn record_skip() {
    metrics::counter!("lpgraph_methods_skipped").increment(1);
}

#[cfg(not(feature = "metrics"))]
fn record_skip() {}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case::zero_hops(PipelineBuilder::new().with_max_hops(0), "PIPELINE_INVALID_MAX_HOPS")]
    #[case::empty_extension(PipelineBuilder::new().with_extension(""), "PIPELINE_INVALID_EXTENSION")]
    #[case::dotted_extension(PipelineBuilder::new().with_extension(".lpg"), "PIPELINE_INVALID_EXTENSION")]
    #[case::separator(PipelineBuilder::new().with_extension("a/b"), "PIPELINE_INVALID_EXTENSION")]
    fn build_rejects_invalid_configuration(#[case] builder: PipelineBuilder, #[case] code: &str) {
        let err = builder.build().expect_err("configuration must be rejected");
        assert_eq!(err.code().as_str(), code);
    }

    #[test]
    fn default_selection_follows_registry_order() {
        use crate::{
            edge::{CandidatePair, Edge},
            error::ScoringError,
            registry::{MethodDescriptor, MethodFamily, MethodParams},
            scoring::ScoringMethod,
        };

        struct Nothing;

        impl ScoringMethod for Nothing {
            fn name(&self) -> &str {
                "Nothing"
            }

            fn score(
                &self,
                _: &Graph,
                _: &[CandidatePair],
            ) -> core::result::Result<Vec<Edge>, ScoringError> {
                Ok(Vec::new())
            }
        }

        let mut registry = MethodRegistry::new();
        for name in ["B", "A", "C"] {
            registry
                .register(MethodDescriptor::new(
                    name,
                    MethodFamily::Structural,
                    MethodParams::None,
                    |_| Ok(Box::new(Nothing)),
                ))
                .expect("unique names");
        }
        let pipeline = PipelineBuilder::new()
            .with_registry(registry)
            .build()
            .expect("valid configuration");
        let names: Vec<&str> = pipeline.methods().iter().map(|m| &**m).collect();
        assert_eq!(names, vec!["B", "A", "C"]);
    }

    #[test]
    fn explicit_selection_keeps_caller_order_and_unknown_names() {
        let pipeline = PipelineBuilder::new()
            .with_methods(["Katz", "Bogus", "Jaccard"])
            .build()
            .expect("valid configuration");
        let names: Vec<&str> = pipeline.methods().iter().map(|m| &**m).collect();
        assert_eq!(names, vec!["Katz", "Bogus", "Jaccard"]);
    }

    #[test]
    fn repeated_selection_runs_once_at_first_position() {
        let pipeline = PipelineBuilder::new()
            .with_methods(["Jaccard", "Katz", "Jaccard", "Katz", "Bogus", "Bogus"])
            .build()
            .expect("valid configuration");
        let names: Vec<&str> = pipeline.methods().iter().map(|m| &**m).collect();
        assert_eq!(names, vec!["Jaccard", "Katz", "Bogus"]);
    }
}
