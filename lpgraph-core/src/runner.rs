//! Prediction runner: resolves one method name and scores the candidates.

use std::num::NonZeroUsize;

use once_cell::unsync::OnceCell;
use tracing::{debug, instrument, warn};

use crate::{
    edge::{CandidatePair, Edge},
    error::ScoringError,
    graph::Graph,
    registry::MethodRegistry,
    scoring::ScoringMethod,
};

/// Result of [`PredictionRunner::run_prediction`].
#[derive(Clone, Debug, PartialEq)]
pub enum Prediction {
    /// The method resolved and produced these unsorted scored candidates.
    Resolved(Vec<Edge>),
    /// The method name is not in the registry.
    Unresolved,
}

impl Prediction {
    /// Returns the scored candidates; empty when the method was unresolved.
    #[must_use]
    pub fn candidates(&self) -> &[Edge] {
        match self {
            Self::Resolved(edges) => edges,
            Self::Unresolved => &[],
        }
    }

    /// Consumes the prediction, returning the scored candidates.
    #[must_use]
    pub fn into_candidates(self) -> Vec<Edge> {
        match self {
            Self::Resolved(edges) => edges,
            Self::Unresolved => Vec::new(),
        }
    }

    /// Returns `true` when the method name was found in the registry.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

/// Runs registered predictors against one graph.
///
/// Candidate pairs depend only on the graph and the hop limit, so they are
/// enumerated on first use and shared by every method of the run.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use lpgraph_core::{
///     CandidatePair, Edge, Graph, GraphBuilder, MethodDescriptor, MethodFamily, MethodParams,
///     MethodRegistry, PredictionRunner, ScoringError, ScoringMethod,
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
/// let mut builder = GraphBuilder::new("path");
/// builder.add_edge("a", "b", 1.0)?;
/// builder.add_edge("b", "c", 1.0)?;
/// let graph = builder.build()?;
///
/// let mut registry = MethodRegistry::new();
/// registry.register(MethodDescriptor::new(
///     "Unit",
///     MethodFamily::Structural,
///     MethodParams::None,
///     |_| Ok(Box::new(Unit)),
/// ))?;
///
/// let runner = PredictionRunner::new(&graph, &registry, NonZeroUsize::new(2).expect("non-zero"));
/// assert_eq!(runner.run_prediction("Unit")?.candidates().len(), 1);
/// assert!(!runner.run_prediction("Missing")?.is_resolved());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct PredictionRunner<'a> {
    graph: &'a Graph,
    registry: &'a MethodRegistry,
    max_hops: NonZeroUsize,
    candidates: OnceCell<Vec<CandidatePair>>,
}

impl<'a> PredictionRunner<'a> {
    /// Creates a runner over `graph` using the methods in `registry`.
    #[must_use]
    pub fn new(graph: &'a Graph, registry: &'a MethodRegistry, max_hops: NonZeroUsize) -> Self {
        Self {
            graph,
            registry,
            max_hops,
            candidates: OnceCell::new(),
        }
    }

    /// Returns the graph the runner scores.
    #[must_use]
    pub fn graph(&self) -> &'a Graph {
        self.graph
    }

    /// Returns the candidate hop limit.
    #[must_use]
    pub fn max_hops(&self) -> NonZeroUsize {
        self.max_hops
    }

    /// Returns the candidate pairs, enumerating them on first call.
    pub fn candidate_pairs(&self) -> &[CandidatePair] {
        self.candidates
            .get_or_init(|| self.graph.candidate_pairs(self.max_hops))
    }

    /// Resolves `name`, runs the predictor and returns its raw output.
    ///
    /// The returned candidates are in whatever order the predictor produced
    /// them. An unknown name is a soft failure: a warning is logged and
    /// [`Prediction::Unresolved`] is returned.
    ///
    /// # Errors
    /// Returns the predictor's [`ScoringError`]. Output is validated before
    /// it is returned: an edge outside the graph fails with
    /// [`ScoringError::UnknownNode`], an edge joining a node to itself with
    /// [`ScoringError::SelfLoop`], and a NaN or infinite score with
    /// [`ScoringError::NonFiniteScore`].
    #[instrument(
        name = "core.predict",
        err,
        skip(self),
        fields(graph = %self.graph.name(), max_hops = self.max_hops.get()),
    )]
    pub fn run_prediction(&self, name: &str) -> Result<Prediction, ScoringError> {
        let Some(descriptor) = self.registry.resolve(name) else {
            warn!(method = name, "method is not registered; nothing to score");
            return Ok(Prediction::Unresolved);
        };

        let predictor = descriptor.instantiate()?;
        let candidates = self.candidate_pairs();
        let scored = predictor.score(self.graph, candidates)?;
        self.check_output(descriptor.name(), &scored)?;
        debug!(
            method = predictor.name(),
            candidates = candidates.len(),
            scored = scored.len(),
            "predictor finished"
        );
        Ok(Prediction::Resolved(scored))
    }

    fn check_output(&self, method: &str, scored: &[Edge]) -> Result<(), ScoringError> {
        let node_count = self.graph.node_count();
        for edge in scored {
            let (source, target) = (edge.source().index(), edge.target().index());
            if let Some(index) = [source, target].into_iter().find(|&i| i >= node_count) {
                return Err(ScoringError::UnknownNode {
                    method: method.into(),
                    index,
                });
            }
            if source == target {
                return Err(ScoringError::SelfLoop {
                    method: method.into(),
                    index: source,
                });
            }
            if !edge.value().is_finite() {
                return Err(ScoringError::NonFiniteScore {
                    method: method.into(),
                    source_index: source,
                    target_index: target,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::{fixture, rstest};

    use crate::{
        edge::NodeId,
        graph::GraphBuilder,
        registry::{MethodDescriptor, MethodFamily, MethodParams},
    };

    struct Constant(f64);

    impl ScoringMethod for Constant {
        fn name(&self) -> &str {
            "Constant"
        }

        fn score(&self, _: &Graph, candidates: &[CandidatePair]) -> Result<Vec<Edge>, ScoringError> {
            Ok(candidates.iter().map(|pair| pair.scored(self.0)).collect())
        }
    }

    struct OutOfRange;

    impl ScoringMethod for OutOfRange {
        fn name(&self) -> &str {
            "OutOfRange"
        }

        fn score(&self, _: &Graph, _: &[CandidatePair]) -> Result<Vec<Edge>, ScoringError> {
            Ok(vec![Edge::new(NodeId::new(0), NodeId::new(99), 1.0)])
        }
    }

    #[fixture]
    fn graph() -> Graph {
        let mut builder = GraphBuilder::new("star");
        for leaf in ["a", "b", "c"] {
            builder.add_edge("hub", leaf, 1.0).expect("edge must be valid");
        }
        builder.build().expect("graph must build")
    }

    #[fixture]
    fn registry() -> MethodRegistry {
        let mut registry = MethodRegistry::new();
        registry
            .register(MethodDescriptor::new(
                "Constant",
                MethodFamily::Structural,
                MethodParams::None,
                |_| Ok(Box::new(Constant(0.5))),
            ))
            .expect("unique name");
        registry
            .register(MethodDescriptor::new(
                "OutOfRange",
                MethodFamily::Structural,
                MethodParams::None,
                |_| Ok(Box::new(OutOfRange)),
            ))
            .expect("unique name");
        registry
            .register(MethodDescriptor::new(
                "Broken",
                MethodFamily::Global,
                MethodParams::None,
                |_| {
                    Err(ScoringError::InvalidParameters {
                        method: "Broken".into(),
                        reason: "no parameters accepted",
                    })
                },
            ))
            .expect("unique name");
        registry
    }

    fn two_hops() -> NonZeroUsize {
        NonZeroUsize::new(2).expect("non-zero")
    }

    #[rstest]
    fn resolved_method_scores_every_candidate(graph: Graph, registry: MethodRegistry) {
        let runner = PredictionRunner::new(&graph, &registry, two_hops());
        let prediction = runner.run_prediction("Constant").expect("scoring succeeds");
        assert!(prediction.is_resolved());
        // Three leaves around one hub give three leaf pairs.
        assert_eq!(prediction.candidates().len(), 3);
        assert!(prediction.candidates().iter().all(|edge| edge.value() == 0.5));
    }

    #[rstest]
    fn unknown_method_yields_empty_unresolved(graph: Graph, registry: MethodRegistry) {
        let runner = PredictionRunner::new(&graph, &registry, two_hops());
        let prediction = runner.run_prediction("Nope").expect("soft failure");
        assert_eq!(prediction, Prediction::Unresolved);
        assert!(prediction.into_candidates().is_empty());
    }

    #[rstest]
    fn factory_errors_propagate(graph: Graph, registry: MethodRegistry) {
        let runner = PredictionRunner::new(&graph, &registry, two_hops());
        let err = runner.run_prediction("Broken").expect_err("factory fails");
        assert!(matches!(err, ScoringError::InvalidParameters { .. }));
    }

    #[rstest]
    fn edges_outside_the_graph_are_rejected(graph: Graph, registry: MethodRegistry) {
        let runner = PredictionRunner::new(&graph, &registry, two_hops());
        let err = runner.run_prediction("OutOfRange").expect_err("index 99 is unknown");
        assert_eq!(
            err,
            ScoringError::UnknownNode {
                method: "OutOfRange".into(),
                index: 99,
            }
        );
    }

    #[rstest]
    fn candidate_pairs_are_enumerated_once(graph: Graph) {
        let registry = MethodRegistry::new();
        let runner = PredictionRunner::new(&graph, &registry, two_hops());
        let first = runner.candidate_pairs().as_ptr();
        let second = runner.candidate_pairs().as_ptr();
        assert_eq!(first, second);
        assert_eq!(runner.candidate_pairs().len(), 3);
    }
}
