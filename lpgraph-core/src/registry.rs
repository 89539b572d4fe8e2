//! Method registry: the ordered catalogue of scoring methods.
//!
//! Each entry pairs a method name with its fixed construction parameters and a
//! factory closure. Dispatch is a lookup in this table, so adding a predictor
//! never touches the runner.

use std::{collections::HashMap, fmt, num::NonZeroUsize, sync::Arc};

use crate::{
    error::{RegistryError, ScoringError},
    scoring::ScoringMethod,
};

/// Broad predictor families, used for listing and filtering.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MethodFamily {
    /// Unweighted neighbourhood overlap measures.
    Structural,
    /// Neighbourhood overlap measures using edge weights.
    Weighted,
    /// Path and random-walk based measures over the whole graph.
    Global,
    /// Measures based on shared or disjoint group membership.
    GroupOverlap,
}

impl MethodFamily {
    /// Returns a stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Structural => "structural",
            Self::Weighted => "weighted",
            Self::Global => "global",
            Self::GroupOverlap => "group-overlap",
        }
    }
}

impl fmt::Display for MethodFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-method configuration record handed to a factory.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MethodParams {
    /// The method takes no parameters.
    None,
    /// Truncated Katz index.
    Katz {
        /// Longest path length counted.
        path_length: NonZeroUsize,
        /// Per-step attenuation factor.
        beta: f64,
    },
    /// SimRank similarity.
    SimRank {
        /// Decay constant `C`.
        decay: f64,
        /// Number of fixed-point iterations.
        iterations: NonZeroUsize,
    },
    /// Rooted PageRank.
    RootedPageRank {
        /// Probability of restarting at the root on each step.
        alpha: f64,
        /// Maximum power iterations per root.
        iterations: NonZeroUsize,
        /// L1 convergence tolerance.
        tolerance: f64,
    },
    /// Group-overlap measures.
    GroupOverlap {
        /// Smoothing constant added to denominators.
        delta: f64,
    },
}

impl fmt::Display for MethodParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("-"),
            Self::Katz { path_length, beta } => {
                write!(f, "path_length={path_length} beta={beta}")
            }
            Self::SimRank { decay, iterations } => {
                write!(f, "decay={decay} iterations={iterations}")
            }
            Self::RootedPageRank {
                alpha,
                iterations,
                tolerance,
            } => write!(f, "alpha={alpha} iterations={iterations} tolerance={tolerance}"),
            Self::GroupOverlap { delta } => write!(f, "delta={delta}"),
        }
    }
}

type FactoryFn =
    dyn Fn(&MethodParams) -> Result<Box<dyn ScoringMethod>, ScoringError> + Send + Sync;

/// Static description of one scoring method.
///
/// # Examples
/// ```
/// use lpgraph_core::{
///     CandidatePair, Edge, Graph, MethodDescriptor, MethodFamily, MethodParams, ScoringError,
///     ScoringMethod,
/// };
///
/// struct Constant;
///
/// impl ScoringMethod for Constant {
///     fn name(&self) -> &str { "Constant" }
///     fn score(&self, _: &Graph, candidates: &[CandidatePair]) -> Result<Vec<Edge>, ScoringError> {
///         Ok(candidates.iter().map(|pair| pair.scored(1.0)).collect())
///     }
/// }
///
/// let descriptor = MethodDescriptor::new(
///     "Constant",
///     MethodFamily::Structural,
///     MethodParams::None,
///     |_| Ok(Box::new(Constant)),
/// );
/// assert_eq!(descriptor.name(), "Constant");
/// let method = descriptor.instantiate()?;
/// assert_eq!(method.name(), "Constant");
/// # Ok::<(), ScoringError>(())
/// ```
#[derive(Clone)]
pub struct MethodDescriptor {
    name: Arc<str>,
    family: MethodFamily,
    params: MethodParams,
    factory: Arc<FactoryFn>,
}

impl MethodDescriptor {
    /// Creates a descriptor.
    pub fn new<F>(
        name: impl Into<Arc<str>>,
        family: MethodFamily,
        params: MethodParams,
        factory: F,
    ) -> Self
    where
        F: Fn(&MethodParams) -> Result<Box<dyn ScoringMethod>, ScoringError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            family,
            params,
            factory: Arc::new(factory),
        }
    }

    /// Returns the method name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the shared method name handle.
    #[must_use]
    pub fn name_arc(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    /// Returns the method family.
    #[must_use]
    pub fn family(&self) -> MethodFamily {
        self.family
    }

    /// Returns the construction parameters.
    #[must_use]
    pub fn params(&self) -> &MethodParams {
        &self.params
    }

    /// Builds a predictor from the stored parameters.
    ///
    /// # Errors
    /// Propagates the factory's [`ScoringError`], typically
    /// [`ScoringError::InvalidParameters`].
    pub fn instantiate(&self) -> Result<Box<dyn ScoringMethod>, ScoringError> {
        (self.factory)(&self.params)
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("family", &self.family)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Ordered, name-indexed catalogue of [`MethodDescriptor`]s.
///
/// Registration order is the order methods run in and the order their
/// artifacts appear.
#[derive(Clone, Debug, Default)]
pub struct MethodRegistry {
    descriptors: Vec<MethodDescriptor>,
    index: HashMap<Arc<str>, usize>,
}

impl MethodRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a method.
    ///
    /// # Errors
    /// Returns [`RegistryError::DuplicateMethod`] when the name is taken.
    pub fn register(&mut self, descriptor: MethodDescriptor) -> Result<(), RegistryError> {
        if self.index.contains_key(descriptor.name()) {
            return Err(RegistryError::DuplicateMethod {
                name: descriptor.name_arc(),
            });
        }
        self.index
            .insert(descriptor.name_arc(), self.descriptors.len());
        self.descriptors.push(descriptor);
        Ok(())
    }

    /// Returns the method names in registration order.
    pub fn list_methods(&self) -> impl Iterator<Item = &str> + '_ {
        self.descriptors.iter().map(MethodDescriptor::name)
    }

    /// Returns every descriptor in registration order.
    #[must_use]
    pub fn descriptors(&self) -> &[MethodDescriptor] {
        &self.descriptors
    }

    /// Looks up a method by exact name.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&MethodDescriptor> {
        self.index
            .get(name)
            .and_then(|&position| self.descriptors.get(position))
    }

    /// Returns the number of registered methods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns `true` when no method is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{CandidatePair, Edge, Graph};

    struct Fixed(&'static str);

    impl ScoringMethod for Fixed {
        fn name(&self) -> &str {
            self.0
        }

        fn score(&self, _: &Graph, candidates: &[CandidatePair]) -> Result<Vec<Edge>, ScoringError> {
            Ok(candidates.iter().map(|pair| pair.scored(0.0)).collect())
        }
    }

    fn descriptor(name: &'static str) -> MethodDescriptor {
        MethodDescriptor::new(name, MethodFamily::Structural, MethodParams::None, move |_| {
            Ok(Box::new(Fixed(name)))
        })
    }

    #[test]
    fn list_methods_preserves_registration_order() {
        let mut registry = MethodRegistry::new();
        for name in ["Zeta", "Alpha", "Mu"] {
            registry.register(descriptor(name)).expect("names are unique");
        }
        let names: Vec<&str> = registry.list_methods().collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mu"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn register_rejects_duplicate_names() {
        let mut registry = MethodRegistry::new();
        registry.register(descriptor("Katz")).expect("first insert succeeds");
        let err = registry
            .register(descriptor("Katz"))
            .expect_err("duplicate must fail");
        assert_eq!(
            err,
            RegistryError::DuplicateMethod {
                name: Arc::from("Katz")
            }
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn resolve_is_exact_and_case_sensitive() {
        let mut registry = MethodRegistry::new();
        registry.register(descriptor("Jaccard")).expect("insert succeeds");
        assert!(registry.resolve("Jaccard").is_some());
        assert!(registry.resolve("jaccard").is_none());
        assert!(registry.resolve("Unknown").is_none());
    }

    #[test]
    fn params_display_lists_values() {
        let params = MethodParams::Katz {
            path_length: NonZeroUsize::new(5).expect("non-zero"),
            beta: 0.05,
        };
        assert_eq!(params.to_string(), "path_length=5 beta=0.05");
        assert_eq!(MethodParams::None.to_string(), "-");
    }
}
