//! Link predictors for LPgraph.
//!
//! Every predictor implements [`lpgraph_core::ScoringMethod`]. The
//! [`standard_registry`] wires the thirteen structural, weighted and global
//! methods with their default parameters; [`registry_with_groups`] appends the
//! group-overlap measures for graphs loaded with membership data.

mod global;
mod groups;
mod local;
mod registry;

pub use crate::{
    global::{Katz, PAGERANK_CACHE_CELLS, RootedPageRank, SIMRANK_NODE_LIMIT, SimRank},
    groups::{GroupIndex, GroupPredictor},
    local::{LocalIndex, LocalPredictor},
    registry::{
        DEFAULT_GROUP_DELTA, DEFAULT_KATZ_BETA, DEFAULT_PAGERANK_ALPHA,
        DEFAULT_PAGERANK_ITERATIONS, DEFAULT_PAGERANK_TOLERANCE, DEFAULT_PATH_LENGTH,
        DEFAULT_SIMRANK_DECAY, DEFAULT_SIMRANK_ITERATIONS, KATZ, ROOTED_PAGERANK, SIMRANK,
        group_descriptor, katz_descriptor, local_descriptor, registry_with_groups,
        rooted_pagerank_descriptor, simrank_descriptor, standard_registry,
    },
};

/// Converts a count into a score component.
#[inline]
pub(crate) fn count(value: usize) -> f64 {
    value as f64
}
