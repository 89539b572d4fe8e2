//! Fixtures shared by the core integration suites.
#![allow(dead_code, reason = "each suite uses a different subset of the fixtures")]

use std::{error::Error, fmt, sync::Arc};

use lpgraph_core::{
    CandidatePair, Edge, Graph, GraphBuilder, GraphSource, MethodDescriptor, MethodFamily,
    MethodParams, MethodRegistry, ScoringError, ScoringMethod,
};
use lpgraph_test_support::ci::property_test_profile::ProptestRunProfile;
use proptest::test_runner::Config as ProptestConfig;

/// Builds a proptest configuration from the shared CI profile.
#[must_use]
pub fn suite_proptest_config(default_cases: u32) -> ProptestConfig {
    let profile = ProptestRunProfile::load(default_cases, false);
    ProptestConfig {
        cases: profile.cases(),
        fork: profile.fork(),
        ..ProptestConfig::default()
    }
}

/// Predictor returning a fixed list of labelled, scored pairs regardless of
/// the candidates it is handed.
#[derive(Clone, Debug)]
pub struct Scripted {
    name: &'static str,
    edges: Arc<[(&'static str, &'static str, f64)]>,
}

impl Scripted {
    #[must_use]
    pub fn new(name: &'static str, edges: &[(&'static str, &'static str, f64)]) -> Self {
        Self {
            name,
            edges: Arc::from(edges),
        }
    }

    #[must_use]
    pub fn descriptor(self) -> MethodDescriptor {
        let name = self.name;
        MethodDescriptor::new(name, MethodFamily::Structural, MethodParams::None, move |_| {
            Ok(Box::new(self.clone()))
        })
    }
}

impl ScoringMethod for Scripted {
    fn name(&self) -> &str {
        self.name
    }

    fn score(&self, graph: &Graph, _: &[CandidatePair]) -> Result<Vec<Edge>, ScoringError> {
        self.edges
            .iter()
            .map(|&(source, target, score)| {
                let lookup = |label| {
                    graph.node(label).ok_or(ScoringError::UnknownNode {
                        method: self.name.into(),
                        index: usize::MAX,
                    })
                };
                Ok(Edge::new(lookup(source)?, lookup(target)?, score))
            })
            .collect()
    }
}

/// Predictor that always fails.
#[derive(Clone, Copy, Debug)]
pub struct Failing;

impl ScoringMethod for Failing {
    fn name(&self) -> &str {
        "Failing"
    }

    fn score(&self, _: &Graph, _: &[CandidatePair]) -> Result<Vec<Edge>, ScoringError> {
        Err(ScoringError::MissingGroups {
            method: "Failing".into(),
        })
    }
}

/// Registry holding `scripts` in order, followed by [`Failing`].
#[must_use]
pub fn scripted_registry(scripts: Vec<Scripted>) -> MethodRegistry {
    let mut registry = MethodRegistry::new();
    for script in scripts {
        registry
            .register(script.descriptor())
            .expect("script names must be unique");
    }
    registry
        .register(MethodDescriptor::new(
            "Failing",
            MethodFamily::GroupOverlap,
            MethodParams::None,
            |_| Ok(Box::new(Failing)),
        ))
        .expect("Failing is registered once");
    registry
}

/// Training edges `(A,B,1)` and `(B,C,1)` plus an isolated node `D`.
#[must_use]
pub fn example_graph() -> Graph {
    let mut builder = GraphBuilder::new("example");
    builder.add_edge("A", "B", 1.0).expect("edge must be valid");
    builder.add_edge("B", "C", 1.0).expect("edge must be valid");
    builder.add_node("D");
    builder.build().expect("graph must build")
}

/// Candidates `(C,D,0.9)`, `(A,D,0.9)`, `(B,D,0.1)` in that order.
#[must_use]
pub fn example_script() -> Scripted {
    Scripted::new("Example", &[("C", "D", 0.9), ("A", "D", 0.9), ("B", "D", 0.1)])
}

/// Source that always fails to load.
#[derive(Debug)]
pub struct Unreadable;

/// Error raised by [`Unreadable`].
#[derive(Debug)]
pub struct UnreadableError;

impl fmt::Display for UnreadableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("source is unreadable")
    }
}

impl Error for UnreadableError {}

impl GraphSource for Unreadable {
    type Error = UnreadableError;

    fn name(&self) -> &str {
        "unreadable"
    }

    fn load(&self) -> Result<Graph, UnreadableError> {
        Err(UnreadableError)
    }
}
