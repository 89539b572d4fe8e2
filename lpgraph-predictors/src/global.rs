//! Path and random-walk predictors.
//!
//! These look beyond the immediate neighbourhood, so they precompute
//! per-root vectors (Katz, rooted PageRank) or a full similarity matrix
//! (SimRank) before reading off candidate scores.

use std::{collections::HashMap, num::NonZeroUsize};

use lpgraph_core::{CandidatePair, Edge, Graph, NodeId, ScoringError, ScoringMethod};
use tracing::debug;

use crate::{
    count,
    registry::{KATZ, ROOTED_PAGERANK, SIMRANK},
};

/// Largest graph SimRank accepts; its iteration holds three `n × n` matrices.
pub const SIMRANK_NODE_LIMIT: usize = 8_192;

/// Upper bound on the cached rooted PageRank entries (rows × nodes).
pub const PAGERANK_CACHE_CELLS: usize = 1 << 26;

fn entry(values: &[f64], node: NodeId) -> f64 {
    values.get(node.index()).copied().unwrap_or(0.0)
}

fn unit_vector(len: usize, node: NodeId) -> Vec<f64> {
    let mut values = vec![0.0; len];
    if let Some(slot) = values.get_mut(node.index()) {
        *slot = 1.0;
    }
    values
}

/// Truncated Katz index: `Σ_{l=1..L} β^l · walks_l(x, y)`.
///
/// Walks are counted on the unweighted adjacency structure.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Katz {
    path_length: NonZeroUsize,
    beta: f64,
}

impl Katz {
    /// Creates a Katz predictor.
    #[must_use]
    pub const fn new(path_length: NonZeroUsize, beta: f64) -> Self {
        Self { path_length, beta }
    }

    /// Returns the longest walk length counted.
    #[must_use]
    pub const fn path_length(&self) -> NonZeroUsize {
        self.path_length
    }

    /// Returns the per-step attenuation.
    #[must_use]
    pub const fn beta(&self) -> f64 {
        self.beta
    }

    /// Katz scores from `root` to every node.
    fn scores_from(&self, graph: &Graph, root: NodeId) -> Vec<f64> {
        let mut walks = unit_vector(graph.node_count(), root);
        let mut scores = vec![0.0; walks.len()];
        let mut attenuation = 1.0;
        for _ in 0..self.path_length.get() {
            walks = graph
                .nodes()
                .map(|node| {
                    graph
                        .neighbours(node)
                        .iter()
                        .map(|n| entry(&walks, n.node()))
                        .sum::<f64>()
                })
                .collect();
            attenuation *= self.beta;
            for (score, walk) in scores.iter_mut().zip(&walks) {
                *score += attenuation * walk;
            }
        }
        scores
    }
}

impl ScoringMethod for Katz {
    fn name(&self) -> &str {
        KATZ
    }

    fn score(&self, graph: &Graph, candidates: &[CandidatePair]) -> Result<Vec<Edge>, ScoringError> {
        // Candidates usually arrive grouped by `first`, so one cached row
        // covers a whole run of pairs.
        let mut cached: Option<(NodeId, Vec<f64>)> = None;
        let mut roots = 0_usize;
        let mut scored = Vec::with_capacity(candidates.len());
        for pair in candidates {
            let row = match cached.take() {
                Some((root, row)) if root == pair.first() => row,
                _ => {
                    roots += 1;
                    self.scores_from(graph, pair.first())
                }
            };
            scored.push(pair.scored(entry(&row, pair.second())));
            cached = Some((pair.first(), row));
        }
        debug!(method = KATZ, roots, candidates = candidates.len(), "katz walks counted");
        Ok(scored)
    }
}

/// SimRank similarity with decay `C`, iterated a fixed number of times.
///
/// `s(a, a) = 1`; for `a ≠ b`,
/// `s(a, b) = C / (|Γa||Γb|) · Σ_{i∈Γa} Σ_{j∈Γb} s(i, j)`, and zero when
/// either node is isolated. The whole `n × n` matrix is held in memory, so
/// graphs above [`SIMRANK_NODE_LIMIT`] nodes fail with
/// [`ScoringError::GraphTooLarge`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimRank {
    decay: f64,
    iterations: NonZeroUsize,
}

impl SimRank {
    /// Creates a SimRank predictor.
    #[must_use]
    pub const fn new(decay: f64, iterations: NonZeroUsize) -> Self {
        Self { decay, iterations }
    }

    /// Returns the decay constant.
    #[must_use]
    pub const fn decay(&self) -> f64 {
        self.decay
    }

    /// Returns the iteration count.
    #[must_use]
    pub const fn iterations(&self) -> NonZeroUsize {
        self.iterations
    }

    /// Computes the row-major similarity matrix.
    fn similarity(&self, graph: &Graph) -> Vec<f64> {
        let n = graph.node_count();
        let mut current = vec![0.0; n * n];
        for (index, row) in current.chunks_mut(n).enumerate() {
            if let Some(slot) = row.get_mut(index) {
                *slot = 1.0;
            }
        }

        for _ in 0..self.iterations.get() {
            // partial[a][j] = mean over i ∈ Γa of s(i, j)
            let mut partial = vec![0.0; n * n];
            for (a, target) in graph.nodes().zip(partial.chunks_mut(n)) {
                let neighbours = graph.neighbours(a);
                if neighbours.is_empty() {
                    continue;
                }
                let scale = count(neighbours.len()).recip();
                for neighbour in neighbours {
                    for (t, s) in target.iter_mut().zip(row(&current, n, neighbour.node())) {
                        *t += scale * s;
                    }
                }
            }

            let mut next = vec![0.0; n * n];
            for (a, target) in graph.nodes().zip(next.chunks_mut(n)) {
                let source = row(&partial, n, a);
                for (b, slot) in graph.nodes().zip(target.iter_mut()) {
                    if a == b {
                        *slot = 1.0;
                        continue;
                    }
                    let neighbours = graph.neighbours(b);
                    if neighbours.is_empty() {
                        continue;
                    }
                    let total: f64 = neighbours.iter().map(|j| entry(source, j.node())).sum();
                    *slot = self.decay * total / count(neighbours.len());
                }
            }
            current = next;
        }
        current
    }
}

fn row(matrix: &[f64], n: usize, node: NodeId) -> &[f64] {
    let start = node.index() * n;
    matrix.get(start..start + n).unwrap_or(&[])
}

impl ScoringMethod for SimRank {
    fn name(&self) -> &str {
        SIMRANK
    }

    fn score(&self, graph: &Graph, candidates: &[CandidatePair]) -> Result<Vec<Edge>, ScoringError> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }
        let n = graph.node_count();
        if n > SIMRANK_NODE_LIMIT {
            return Err(ScoringError::GraphTooLarge {
                method: SIMRANK.into(),
                nodes: n,
                limit: SIMRANK_NODE_LIMIT,
            });
        }
        let matrix = self.similarity(graph);
        debug!(
            method = SIMRANK,
            nodes = n,
            iterations = self.iterations.get(),
            "simrank matrix computed"
        );
        Ok(candidates
            .iter()
            .map(|pair| pair.scored(entry(row(&matrix, n, pair.first()), pair.second())))
            .collect())
    }
}

/// Rooted PageRank, symmetrised as `π_x(y) + π_y(x)`.
///
/// The walk follows an edge with probability proportional to its weight and
/// jumps back to the root with probability `alpha`. Nodes without positive
/// outgoing weight send their mass back to the root. Non-positive weights
/// carry no walk probability. Per-root rows are cached up to
/// [`PAGERANK_CACHE_CELLS`] entries, then the cache starts over.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RootedPageRank {
    alpha: f64,
    iterations: NonZeroUsize,
    tolerance: f64,
}

impl RootedPageRank {
    /// Creates a rooted PageRank predictor.
    #[must_use]
    pub const fn new(alpha: f64, iterations: NonZeroUsize, tolerance: f64) -> Self {
        Self {
            alpha,
            iterations,
            tolerance,
        }
    }

    /// Returns the restart probability.
    #[must_use]
    pub const fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Returns the iteration cap per root.
    #[must_use]
    pub const fn iterations(&self) -> NonZeroUsize {
        self.iterations
    }

    /// Returns the L1 convergence tolerance.
    #[must_use]
    pub const fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Stationary distribution of the walk restarting at `root`.
    fn stationary(&self, graph: &Graph, root: NodeId, out_weight: &[f64]) -> Vec<f64> {
        let restart = unit_vector(graph.node_count(), root);
        let mut rank = restart.clone();
        for step in 0..self.iterations.get() {
            let mut next: Vec<f64> = restart.iter().map(|r| self.alpha * r).collect();
            let mut dangling = 0.0;
            for node in graph.nodes() {
                let mass = entry(&rank, node);
                if mass == 0.0 {
                    continue;
                }
                let total = entry(out_weight, node);
                if total <= 0.0 {
                    dangling += mass;
                    continue;
                }
                for neighbour in graph.neighbours(node) {
                    if neighbour.weight() > 0.0
                        && let Some(slot) = next.get_mut(neighbour.node().index())
                    {
                        *slot += (1.0 - self.alpha) * mass * neighbour.weight() / total;
                    }
                }
            }
            if let Some(slot) = next.get_mut(root.index()) {
                *slot += (1.0 - self.alpha) * dangling;
            }

            let delta: f64 = next.iter().zip(&rank).map(|(a, b)| (a - b).abs()).sum();
            rank = next;
            if delta < self.tolerance {
                debug!(method = ROOTED_PAGERANK, root = root.index(), steps = step + 1, "walk converged");
                break;
            }
        }
        rank
    }
}

impl ScoringMethod for RootedPageRank {
    fn name(&self) -> &str {
        ROOTED_PAGERANK
    }

    fn score(&self, graph: &Graph, candidates: &[CandidatePair]) -> Result<Vec<Edge>, ScoringError> {
        let out_weight: Vec<f64> = graph
            .nodes()
            .map(|node| {
                graph
                    .neighbours(node)
                    .iter()
                    .map(|n| n.weight().max(0.0))
                    .sum::<f64>()
            })
            .collect();
        let capacity = cache_capacity(graph.node_count());
        let mut ranks: HashMap<NodeId, Vec<f64>> = HashMap::new();
        let mut roots = 0_usize;
        let mut scored = Vec::with_capacity(candidates.len());
        for pair in candidates {
            let (x, y) = (pair.first(), pair.second());
            let mut rooted_at = |root: NodeId, other: NodeId| {
                if !ranks.contains_key(&root) {
                    if ranks.len() >= capacity {
                        ranks.clear();
                    }
                    roots += 1;
                }
                let row = ranks
                    .entry(root)
                    .or_insert_with(|| self.stationary(graph, root, &out_weight));
                entry(row, other)
            };
            let forward = rooted_at(x, y);
            let backward = rooted_at(y, x);
            scored.push(pair.scored(forward + backward));
        }
        debug!(method = ROOTED_PAGERANK, roots, capacity, "rooted walks computed");
        Ok(scored)
    }
}

/// Number of per-root rows that fit in [`PAGERANK_CACHE_CELLS`], never
/// fewer than the two endpoints of one candidate.
fn cache_capacity(nodes: usize) -> usize {
    (PAGERANK_CACHE_CELLS / nodes.max(1)).max(2)
}
