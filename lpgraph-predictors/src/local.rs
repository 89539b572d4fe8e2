//! Neighbourhood-overlap predictors, unweighted and weighted.
//!
//! Every index here only looks at the two endpoints and their shared
//! neighbours, so scoring is a single pass over the candidates.

use lpgraph_core::{
    CandidatePair, Edge, Graph, MethodFamily, NodeId, ScoringError, ScoringMethod, SharedNeighbour,
};

use crate::count;

/// The local similarity indices.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum LocalIndex {
    /// `|Γx ∩ Γy|`.
    CommonNeighbors,
    /// `Σ_{z ∈ Γx ∩ Γy} 1 / ln k_z`.
    AdamicAdar,
    /// `|Γx ∩ Γy| / |Γx ∪ Γy|`.
    Jaccard,
    /// `Σ_{z ∈ Γx ∩ Γy} 1 / k_z`.
    ResourceAllocation,
    /// `k_x · k_y`.
    PreferentialAttachment,
    /// `Σ_z w(x,z) + w(z,y)`.
    WeightedCommonNeighbors,
    /// `Σ_z (w(x,z) + w(z,y)) / ln(1 + s_z)`.
    WeightedAdamicAdar,
    /// `Σ_z (w(x,z) + w(z,y)) / (s_x + s_y)`.
    WeightedJaccard,
    /// `Σ_z (w(x,z) + w(z,y)) / s_z`.
    WeightedResourceAllocation,
    /// `s_x · s_y`.
    WeightedPreferentialAttachment,
}

impl LocalIndex {
    /// Every local index in registry order.
    pub const ALL: [Self; 10] = [
        Self::CommonNeighbors,
        Self::AdamicAdar,
        Self::Jaccard,
        Self::ResourceAllocation,
        Self::PreferentialAttachment,
        Self::WeightedCommonNeighbors,
        Self::WeightedAdamicAdar,
        Self::WeightedJaccard,
        Self::WeightedResourceAllocation,
        Self::WeightedPreferentialAttachment,
    ];

    /// Returns the registry name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::CommonNeighbors => "CommonNeighbors",
            Self::AdamicAdar => "AdamicAdar",
            Self::Jaccard => "Jaccard",
            Self::ResourceAllocation => "ResourceAllocation",
            Self::PreferentialAttachment => "PreferentialAttachment",
            Self::WeightedCommonNeighbors => "WeightedCommonNeighbors",
            Self::WeightedAdamicAdar => "WeightedAdamicAdar",
            Self::WeightedJaccard => "WeightedJaccard",
            Self::WeightedResourceAllocation => "WeightedResourceAllocation",
            Self::WeightedPreferentialAttachment => "WeightedPreferentialAttachment",
        }
    }

    /// Returns whether the index reads edge weights.
    #[must_use]
    pub const fn family(self) -> MethodFamily {
        match self {
            Self::CommonNeighbors
            | Self::AdamicAdar
            | Self::Jaccard
            | Self::ResourceAllocation
            | Self::PreferentialAttachment => MethodFamily::Structural,
            Self::WeightedCommonNeighbors
            | Self::WeightedAdamicAdar
            | Self::WeightedJaccard
            | Self::WeightedResourceAllocation
            | Self::WeightedPreferentialAttachment => MethodFamily::Weighted,
        }
    }

    /// Scores one pair.
    #[must_use]
    pub fn score_pair(self, graph: &Graph, x: NodeId, y: NodeId) -> f64 {
        match self {
            Self::PreferentialAttachment => count(graph.degree(x)) * count(graph.degree(y)),
            Self::WeightedPreferentialAttachment => graph.strength(x) * graph.strength(y),
            _ => self.overlap(graph, x, y, &graph.shared_neighbours(x, y)),
        }
    }

    fn overlap(self, graph: &Graph, x: NodeId, y: NodeId, shared: &[SharedNeighbour]) -> f64 {
        let path_weight = |z: &SharedNeighbour| z.first_weight + z.second_weight;
        match self {
            Self::CommonNeighbors => count(shared.len()),
            Self::AdamicAdar => shared
                .iter()
                .map(|z| count(graph.degree(z.node)).ln())
                .filter(|log_degree| *log_degree > 0.0)
                .map(f64::recip)
                .sum(),
            Self::Jaccard => {
                let union = graph.degree(x) + graph.degree(y) - shared.len();
                if union == 0 {
                    0.0
                } else {
                    count(shared.len()) / count(union)
                }
            }
            Self::ResourceAllocation => shared
                .iter()
                .map(|z| count(graph.degree(z.node)).recip())
                .sum(),
            Self::WeightedCommonNeighbors => shared.iter().map(path_weight).sum(),
            Self::WeightedAdamicAdar => shared
                .iter()
                .filter_map(|z| {
                    let norm = graph.strength(z.node).ln_1p();
                    (norm > 0.0).then(|| path_weight(z) / norm)
                })
                .sum(),
            Self::WeightedJaccard => {
                let total = graph.strength(x) + graph.strength(y);
                if total > 0.0 {
                    shared.iter().map(path_weight).sum::<f64>() / total
                } else {
                    0.0
                }
            }
            Self::WeightedResourceAllocation => shared
                .iter()
                .filter_map(|z| {
                    let strength = graph.strength(z.node);
                    (strength > 0.0).then(|| path_weight(z) / strength)
                })
                .sum(),
            Self::PreferentialAttachment | Self::WeightedPreferentialAttachment => {
                self.score_pair(graph, x, y)
            }
        }
    }
}

/// [`ScoringMethod`] backed by a [`LocalIndex`].
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use lpgraph_core::{GraphBuilder, ScoringMethod};
/// use lpgraph_predictors::{LocalIndex, LocalPredictor};
///
/// let mut builder = GraphBuilder::new("wedge");
/// builder.add_edge("a", "b", 1.0)?;
/// builder.add_edge("b", "c", 1.0)?;
/// let graph = builder.build()?;
/// let candidates = graph.candidate_pairs(NonZeroUsize::new(2).expect("non-zero"));
///
/// let scored = LocalPredictor::new(LocalIndex::CommonNeighbors).score(&graph, &candidates)?;
/// assert_eq!(scored[0].value(), 1.0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LocalPredictor {
    index: LocalIndex,
}

impl LocalPredictor {
    /// Creates a predictor for `index`.
    #[must_use]
    pub const fn new(index: LocalIndex) -> Self {
        Self { index }
    }

    /// Returns the wrapped index.
    #[must_use]
    pub const fn index(&self) -> LocalIndex {
        self.index
    }
}

impl ScoringMethod for LocalPredictor {
    fn name(&self) -> &str {
        self.index.name()
    }

    fn score(&self, graph: &Graph, candidates: &[CandidatePair]) -> Result<Vec<Edge>, ScoringError> {
        Ok(candidates
            .iter()
            .map(|pair| pair.scored(self.index.score_pair(graph, pair.first(), pair.second())))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use lpgraph_core::GraphBuilder;
    use rstest::{fixture, rstest};

    /// `x` and `y` share `p` and `q`; `p` also touches `r`.
    #[fixture]
    fn diamond() -> Graph {
        let mut builder = GraphBuilder::new("diamond");
        for (s, t, w) in [
            ("x", "p", 1.0),
            ("x", "q", 2.0),
            ("y", "p", 3.0),
            ("y", "q", 1.0),
            ("p", "r", 4.0),
        ] {
            builder.add_edge(s, t, w).expect("edge must be valid");
        }
        builder.build().expect("graph must build")
    }

    fn score(graph: &Graph, index: LocalIndex) -> f64 {
        let x = graph.node("x").expect("x exists");
        let y = graph.node("y").expect("y exists");
        index.score_pair(graph, x, y)
    }

    fn close(actual: f64, expected: f64) -> bool {
        (actual - expected).abs() < 1e-12
    }

    #[rstest]
    #[case(LocalIndex::CommonNeighbors, 2.0)]
    #[case(LocalIndex::AdamicAdar, 1.0 / 3.0_f64.ln() + 1.0 / 2.0_f64.ln())]
    #[case(LocalIndex::Jaccard, 1.0)]
    #[case(LocalIndex::ResourceAllocation, 1.0 / 3.0 + 1.0 / 2.0)]
    #[case(LocalIndex::PreferentialAttachment, 4.0)]
    #[case(LocalIndex::WeightedCommonNeighbors, 7.0)]
    #[case(LocalIndex::WeightedAdamicAdar, 4.0 / 9.0_f64.ln() + 3.0 / 4.0_f64.ln())]
    #[case(LocalIndex::WeightedJaccard, 7.0 / 7.0)]
    #[case(LocalIndex::WeightedResourceAllocation, 4.0 / 8.0 + 3.0 / 3.0)]
    #[case(LocalIndex::WeightedPreferentialAttachment, 12.0)]
    fn indices_match_hand_computed_values(diamond: Graph, #[case] index: LocalIndex, #[case] expected: f64) {
        let actual = score(&diamond, index);
        assert!(close(actual, expected), "{}: {actual} != {expected}", index.name());
    }

    #[rstest]
    fn scores_are_symmetric(diamond: Graph) {
        let x = diamond.node("x").expect("x exists");
        let r = diamond.node("r").expect("r exists");
        for index in LocalIndex::ALL {
            assert!(close(index.score_pair(&diamond, x, r), index.score_pair(&diamond, r, x)));
        }
    }

    #[test]
    fn names_are_unique() {
        let mut names: Vec<&str> = LocalIndex::ALL.iter().map(|index| index.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), LocalIndex::ALL.len());
    }

    #[rstest]
    fn predictor_scores_each_candidate_once(diamond: Graph) {
        let candidates = diamond.candidate_pairs(std::num::NonZeroUsize::new(2).expect("non-zero"));
        let scored = LocalPredictor::new(LocalIndex::Jaccard)
            .score(&diamond, &candidates)
            .expect("local indices never fail");
        assert_eq!(scored.len(), candidates.len());
        for (edge, pair) in scored.iter().zip(&candidates) {
            assert_eq!(edge.pair(), (pair.first(), pair.second()));
        }
    }
}
