//! Group-overlap predictors.
//!
//! These need the membership table loaded alongside the graph and fail with
//! [`ScoringError::MissingGroups`] when it is absent.

use std::sync::Arc;

use lpgraph_core::{
    CandidatePair, Edge, Graph, GroupId, NodeId, ScoringError, ScoringMethod,
};

use crate::count;

/// The group-overlap measures.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum GroupIndex {
    /// `|Γx ∩ Γy| + |Gx ∩ Gy|`.
    CommonNeighborsOfGroups,
    /// Jaccard overlap of `Gx` and `Gy` plus the share of common neighbours
    /// belonging to a group of either endpoint.
    TotalAndPartialOverlappingOfGroups,
    /// `|W| / (|O| + δ)`, where `W` holds common neighbours sharing a group
    /// with both endpoints and `O` the remaining common neighbours.
    WithinAndOutsideCommonGroups,
}

impl GroupIndex {
    /// Every group measure in registry order.
    pub const ALL: [Self; 3] = [
        Self::CommonNeighborsOfGroups,
        Self::TotalAndPartialOverlappingOfGroups,
        Self::WithinAndOutsideCommonGroups,
    ];

    /// Returns the registry name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::CommonNeighborsOfGroups => "CommonNeighborsOfGroups",
            Self::TotalAndPartialOverlappingOfGroups => "TotalAndPartialOverlappingOfGroups",
            Self::WithinAndOutsideCommonGroups => "WithinAndOutsideCommonGroups",
        }
    }
}

fn intersection(left: &[GroupId], right: &[GroupId]) -> Vec<GroupId> {
    let mut shared = Vec::new();
    let (mut i, mut j) = (0, 0);
    while let (Some(l), Some(r)) = (left.get(i), right.get(j)) {
        match l.cmp(r) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                shared.push(*l);
                i += 1;
                j += 1;
            }
        }
    }
    shared
}

fn intersects(left: &[GroupId], right: &[GroupId]) -> bool {
    left.iter().any(|group| right.binary_search(group).is_ok())
}

/// [`ScoringMethod`] backed by a [`GroupIndex`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroupPredictor {
    index: GroupIndex,
    delta: f64,
}

impl GroupPredictor {
    /// Creates a predictor. `delta` only affects
    /// [`GroupIndex::WithinAndOutsideCommonGroups`].
    #[must_use]
    pub const fn new(index: GroupIndex, delta: f64) -> Self {
        Self { index, delta }
    }

    /// Returns the wrapped measure.
    #[must_use]
    pub const fn index(&self) -> GroupIndex {
        self.index
    }

    fn score_pair(&self, graph: &Graph, x: NodeId, y: NodeId) -> Result<f64, ScoringError> {
        let (Some(gx), Some(gy)) = (graph.groups(x), graph.groups(y)) else {
            return Err(self.missing_groups());
        };
        let shared_groups = intersection(gx, gy);
        let common = graph.shared_neighbours(x, y);
        let score = match self.index {
            GroupIndex::CommonNeighborsOfGroups => count(common.len()) + count(shared_groups.len()),
            GroupIndex::TotalAndPartialOverlappingOfGroups => {
                let union = gx.len() + gy.len() - shared_groups.len();
                let total = if union == 0 {
                    0.0
                } else {
                    count(shared_groups.len()) / count(union)
                };
                let partial = if common.is_empty() {
                    0.0
                } else {
                    let touching = common
                        .iter()
                        .filter(|z| {
                            graph
                                .groups(z.node)
                                .is_some_and(|gz| intersects(gz, gx) || intersects(gz, gy))
                        })
                        .count();
                    count(touching) / count(common.len())
                };
                total + partial
            }
            GroupIndex::WithinAndOutsideCommonGroups => {
                let within = common
                    .iter()
                    .filter(|z| {
                        graph
                            .groups(z.node)
                            .is_some_and(|gz| intersects(gz, &shared_groups))
                    })
                    .count();
                let outside = common.len() - within;
                count(within) / (count(outside) + self.delta)
            }
        };
        Ok(score)
    }

    fn missing_groups(&self) -> ScoringError {
        ScoringError::MissingGroups {
            method: Arc::from(self.index.name()),
        }
    }
}

impl ScoringMethod for GroupPredictor {
    fn name(&self) -> &str {
        self.index.name()
    }

    fn score(&self, graph: &Graph, candidates: &[CandidatePair]) -> Result<Vec<Edge>, ScoringError> {
        if !graph.has_groups() {
            return Err(self.missing_groups());
        }
        candidates
            .iter()
            .map(|pair| {
                self.score_pair(graph, pair.first(), pair.second())
                    .map(|score| pair.scored(score))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use lpgraph_core::GraphBuilder;
    use rstest::{fixture, rstest};

    /// `x` and `y` share neighbours `p`, `q` and `r`.
    ///
    /// Groups: x {red, blue}, y {blue, green}, p {blue}, q {red}, r none.
    #[fixture]
    fn grouped() -> Graph {
        let mut builder = GraphBuilder::new("grouped");
        for z in ["p", "q", "r"] {
            builder.add_edge("x", z, 1.0).expect("edge must be valid");
            builder.add_edge("y", z, 1.0).expect("edge must be valid");
        }
        for (node, group) in [
            ("x", "red"),
            ("x", "blue"),
            ("y", "blue"),
            ("y", "green"),
            ("p", "blue"),
            ("q", "red"),
        ] {
            assert!(builder.add_membership(node, group));
        }
        builder.build().expect("graph must build")
    }

    fn score(graph: &Graph, index: GroupIndex) -> f64 {
        let pair = CandidatePair::new(
            graph.node("x").expect("x exists"),
            graph.node("y").expect("y exists"),
        )
        .expect("distinct nodes");
        GroupPredictor::new(index, 0.001)
            .score(graph, &[pair])
            .expect("graph carries groups")[0]
            .value()
    }

    #[rstest]
    #[case(GroupIndex::CommonNeighborsOfGroups, 3.0 + 1.0)]
    #[case(GroupIndex::TotalAndPartialOverlappingOfGroups, 1.0 / 3.0 + 2.0 / 3.0)]
    #[case(GroupIndex::WithinAndOutsideCommonGroups, 1.0 / 2.001)]
    fn measures_match_hand_computed_values(grouped: Graph, #[case] index: GroupIndex, #[case] expected: f64) {
        let actual = score(&grouped, index);
        assert!((actual - expected).abs() < 1e-12, "{}: {actual} != {expected}", index.name());
    }

    #[rstest]
    #[case(GroupIndex::CommonNeighborsOfGroups)]
    #[case(GroupIndex::TotalAndPartialOverlappingOfGroups)]
    #[case(GroupIndex::WithinAndOutsideCommonGroups)]
    fn missing_membership_is_a_recoverable_error(#[case] index: GroupIndex) {
        let mut builder = GraphBuilder::new("plain");
        builder.add_edge("a", "b", 1.0).expect("edge must be valid");
        let graph = builder.build().expect("graph must build");

        let err = GroupPredictor::new(index, 0.001)
            .score(&graph, &[])
            .expect_err("groups are required");
        assert_eq!(
            err,
            ScoringError::MissingGroups {
                method: Arc::from(index.name())
            }
        );
    }

    #[test]
    fn nodes_without_groups_score_on_neighbours_alone() {
        let mut builder = GraphBuilder::new("sparse-groups").with_group_table();
        builder.add_edge("a", "m", 1.0).expect("edge must be valid");
        builder.add_edge("m", "b", 1.0).expect("edge must be valid");
        let graph = builder.build().expect("graph must build");
        let pair = CandidatePair::new(
            graph.node("a").expect("a exists"),
            graph.node("b").expect("b exists"),
        )
        .expect("distinct nodes");

        let scores: Vec<f64> = GroupIndex::ALL
            .iter()
            .map(|&index| {
                GroupPredictor::new(index, 0.001)
                    .score(&graph, &[pair])
                    .expect("empty table still counts as groups")[0]
                    .value()
            })
            .collect();
        assert_eq!(scores, vec![1.0, 0.0, 0.0]);
    }
}
