//! Default method catalogue.
//!
//! Registration order is the run order: the five structural indices, their
//! weighted counterparts, then Katz, SimRank and rooted PageRank. Group
//! measures are appended only by [`registry_with_groups`].

use std::{num::NonZeroUsize, sync::Arc};

use lpgraph_core::{
    MethodDescriptor, MethodFamily, MethodParams, MethodRegistry, RegistryError, ScoringError,
    ScoringMethod,
};

use crate::{
    global::{Katz, RootedPageRank, SimRank},
    groups::{GroupIndex, GroupPredictor},
    local::{LocalIndex, LocalPredictor},
};

/// Registry name of the Katz index.
pub const KATZ: &str = "Katz";
/// Registry name of SimRank.
pub const SIMRANK: &str = "SimRank";
/// Registry name of rooted PageRank.
pub const ROOTED_PAGERANK: &str = "RootedPageRank";

/// Longest walk counted by Katz.
pub const DEFAULT_PATH_LENGTH: NonZeroUsize = NonZeroUsize::MIN.saturating_add(4);
/// Katz attenuation per step.
pub const DEFAULT_KATZ_BETA: f64 = 0.05;
/// SimRank decay constant `C`.
pub const DEFAULT_SIMRANK_DECAY: f64 = 0.8;
/// SimRank fixed-point iterations.
pub const DEFAULT_SIMRANK_ITERATIONS: NonZeroUsize = NonZeroUsize::MIN.saturating_add(4);
/// Rooted PageRank restart probability.
pub const DEFAULT_PAGERANK_ALPHA: f64 = 0.15;
/// Rooted PageRank iteration cap per root.
pub const DEFAULT_PAGERANK_ITERATIONS: NonZeroUsize = NonZeroUsize::MIN.saturating_add(99);
/// Rooted PageRank L1 convergence tolerance.
pub const DEFAULT_PAGERANK_TOLERANCE: f64 = 1e-9;
/// Smoothing added to the outside-group count.
pub const DEFAULT_GROUP_DELTA: f64 = 0.001;

type Built = Result<Box<dyn ScoringMethod>, ScoringError>;

fn invalid(method: &str, reason: &'static str) -> ScoringError {
    ScoringError::InvalidParameters {
        method: Arc::from(method),
        reason,
    }
}

fn is_probability(value: f64) -> bool {
    value > 0.0 && value < 1.0
}

/// Describes a parameterless local index.
#[must_use]
pub fn local_descriptor(index: LocalIndex) -> MethodDescriptor {
    MethodDescriptor::new(index.name(), index.family(), MethodParams::None, move |params| -> Built {
        match params {
            MethodParams::None => Ok(Box::new(LocalPredictor::new(index))),
            _ => Err(invalid(index.name(), "method takes no parameters")),
        }
    })
}

/// Describes Katz with `params`, which must be [`MethodParams::Katz`].
#[must_use]
pub fn katz_descriptor(params: MethodParams) -> MethodDescriptor {
    MethodDescriptor::new(KATZ, MethodFamily::Global, params, |params| -> Built {
        match *params {
            MethodParams::Katz { path_length, beta } if beta.is_finite() && beta > 0.0 => {
                Ok(Box::new(Katz::new(path_length, beta)))
            }
            MethodParams::Katz { .. } => Err(invalid(KATZ, "beta must be positive and finite")),
            _ => Err(invalid(KATZ, "expected Katz parameters")),
        }
    })
}

/// Describes SimRank with `params`, which must be [`MethodParams::SimRank`].
#[must_use]
pub fn simrank_descriptor(params: MethodParams) -> MethodDescriptor {
    MethodDescriptor::new(SIMRANK, MethodFamily::Global, params, |params| -> Built {
        match *params {
            MethodParams::SimRank { decay, iterations } if is_probability(decay) => {
                Ok(Box::new(SimRank::new(decay, iterations)))
            }
            MethodParams::SimRank { .. } => Err(invalid(SIMRANK, "decay must lie in (0, 1)")),
            _ => Err(invalid(SIMRANK, "expected SimRank parameters")),
        }
    })
}

/// Describes rooted PageRank with `params`, which must be
/// [`MethodParams::RootedPageRank`].
#[must_use]
pub fn rooted_pagerank_descriptor(params: MethodParams) -> MethodDescriptor {
    MethodDescriptor::new(ROOTED_PAGERANK, MethodFamily::Global, params, |params| -> Built {
        match *params {
            MethodParams::RootedPageRank {
                alpha,
                iterations,
                tolerance,
            } if is_probability(alpha) && tolerance.is_finite() && tolerance >= 0.0 => {
                Ok(Box::new(RootedPageRank::new(alpha, iterations, tolerance)))
            }
            MethodParams::RootedPageRank { .. } => Err(invalid(
                ROOTED_PAGERANK,
                "alpha must lie in (0, 1) and tolerance must be non-negative",
            )),
            _ => Err(invalid(ROOTED_PAGERANK, "expected rooted PageRank parameters")),
        }
    })
}

/// Describes a group measure with `params`, which must be
/// [`MethodParams::GroupOverlap`].
#[must_use]
pub fn group_descriptor(index: GroupIndex, params: MethodParams) -> MethodDescriptor {
    MethodDescriptor::new(index.name(), MethodFamily::GroupOverlap, params, move |params| -> Built {
        match *params {
            MethodParams::GroupOverlap { delta } if delta.is_finite() && delta > 0.0 => {
                Ok(Box::new(GroupPredictor::new(index, delta)))
            }
            MethodParams::GroupOverlap { .. } => {
                Err(invalid(index.name(), "delta must be positive and finite"))
            }
            _ => Err(invalid(index.name(), "expected group-overlap parameters")),
        }
    })
}

fn standard_descriptors() -> impl Iterator<Item = MethodDescriptor> {
    LocalIndex::ALL.into_iter().map(local_descriptor).chain([
        katz_descriptor(MethodParams::Katz {
            path_length: DEFAULT_PATH_LENGTH,
            beta: DEFAULT_KATZ_BETA,
        }),
        simrank_descriptor(MethodParams::SimRank {
            decay: DEFAULT_SIMRANK_DECAY,
            iterations: DEFAULT_SIMRANK_ITERATIONS,
        }),
        rooted_pagerank_descriptor(MethodParams::RootedPageRank {
            alpha: DEFAULT_PAGERANK_ALPHA,
            iterations: DEFAULT_PAGERANK_ITERATIONS,
            tolerance: DEFAULT_PAGERANK_TOLERANCE,
        }),
    ])
}

fn group_descriptors() -> impl Iterator<Item = MethodDescriptor> {
    GroupIndex::ALL.into_iter().map(|index| {
        group_descriptor(
            index,
            MethodParams::GroupOverlap {
                delta: DEFAULT_GROUP_DELTA,
            },
        )
    })
}

fn collect(descriptors: impl Iterator<Item = MethodDescriptor>) -> Result<MethodRegistry, RegistryError> {
    let mut registry = MethodRegistry::new();
    for descriptor in descriptors {
        registry.register(descriptor)?;
    }
    Ok(registry)
}

/// Builds the thirteen non-group methods with their default parameters.
///
/// # Errors
/// Returns [`RegistryError::DuplicateMethod`] if two built-in methods share a
/// name.
///
/// # Examples
/// ```
/// let registry = lpgraph_predictors::standard_registry()?;
/// assert_eq!(registry.len(), 13);
/// assert_eq!(registry.list_methods().next(), Some("CommonNeighbors"));
/// # Ok::<(), lpgraph_core::RegistryError>(())
/// ```
pub fn standard_registry() -> Result<MethodRegistry, RegistryError> {
    collect(standard_descriptors())
}

/// Builds the standard methods followed by the three group measures.
///
/// # Errors
/// Returns [`RegistryError::DuplicateMethod`] if two built-in methods share a
/// name.
pub fn registry_with_groups() -> Result<MethodRegistry, RegistryError> {
    collect(standard_descriptors().chain(group_descriptors()))
}
