//! The scoring contract every link predictor satisfies.

use crate::{
    edge::{CandidatePair, Edge},
    error::ScoringError,
    graph::Graph,
};

/// A link predictor: assigns a score to each candidate pair of a graph.
///
/// Implementations receive the candidate pairs the pipeline enumerated for
/// the run and return one scored [`Edge`] per pair they keep. The output may
/// come in any order; the pipeline ranks it. Deterministic predictors must
/// return the same scores for the same graph and candidates.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use lpgraph_core::{CandidatePair, Edge, Graph, GraphBuilder, ScoringError, ScoringMethod};
///
/// struct DegreeSum;
///
/// impl ScoringMethod for DegreeSum {
///     fn name(&self) -> &str { "DegreeSum" }
///     fn score(&self, graph: &Graph, candidates: &[CandidatePair]) -> Result<Vec<Edge>, ScoringError> {
///         Ok(candidates
///             .iter()
///             .map(|pair| {
///                 let total = graph.degree(pair.first()) + graph.degree(pair.second());
///                 pair.scored(f64::from(u32::try_from(total).unwrap_or(u32::MAX)))
///             })
///             .collect())
///     }
/// }
///
/// let mut builder = GraphBuilder::new("demo");
/// builder.add_edge("a", "b", 1.0)?;
/// builder.add_edge("b", "c", 1.0)?;
/// let graph = builder.build()?;
/// let candidates = graph.candidate_pairs(NonZeroUsize::new(2).expect("non-zero"));
/// let scored = DegreeSum.score(&graph, &candidates)?;
/// assert_eq!(scored.len(), 1);
/// assert_eq!(scored[0].value(), 2.0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait ScoringMethod {
    /// Returns the registry name of the method.
    fn name(&self) -> &str;

    /// Scores the candidate pairs.
    ///
    /// # Errors
    /// Returns a [`ScoringError`] when the graph lacks data the method needs
    /// or the candidates reference unknown nodes.
    fn score(&self, graph: &Graph, candidates: &[CandidatePair]) -> Result<Vec<Edge>, ScoringError>;
}

impl<T: ScoringMethod + ?Sized> ScoringMethod for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn score(&self, graph: &Graph, candidates: &[CandidatePair]) -> Result<Vec<Edge>, ScoringError> {
        (**self).score(graph, candidates)
    }
}
