//! Score sanity properties over random positively weighted graphs.

use std::num::NonZeroUsize;

use lpgraph_core::{Graph, GraphBuilder};
use lpgraph_predictors::standard_registry;
use lpgraph_test_support::ci::property_test_profile::ProptestRunProfile;
use proptest::{
    collection::vec,
    prelude::any,
    prop_assert, prop_assert_eq, proptest,
    test_runner::Config,
};
use test_strategy::Arbitrary;

const NODES: usize = 9;

fn config() -> Config {
    let profile = ProptestRunProfile::load(48, false);
    Config {
        cases: profile.cases(),
        fork: profile.fork(),
        ..Config::default()
    }
}

#[derive(Clone, Debug, Arbitrary)]
struct RandomGraph {
    #[strategy(vec((0..NODES, 0..NODES, 1_u8..=8), 1..24))]
    edges: Vec<(usize, usize, u8)>,
}

impl RandomGraph {
    fn build(&self) -> Option<Graph> {
        let mut builder = GraphBuilder::new("random");
        for &(a, b, weight) in &self.edges {
            if a != b {
                builder
                    .add_edge(&format!("n{a}"), &format!("n{b}"), f64::from(weight) / 4.0)
                    .ok()?;
            }
        }
        builder.build().ok()
    }
}

proptest! {
    #![proptest_config(config())]

    #[test]
    fn scores_are_finite_and_non_negative(graph in any::<RandomGraph>()) {
        let Some(graph) = graph.build() else { return Ok(()); };
        let candidates = graph.candidate_pairs(NonZeroUsize::new(2).expect("non-zero"));
        let registry = standard_registry().expect("names are unique");

        for descriptor in registry.descriptors() {
            let method = descriptor.instantiate().expect("defaults are valid");
            let scored = method.score(&graph, &candidates).expect("standard methods never fail");
            prop_assert_eq!(scored.len(), candidates.len());
            for (edge, pair) in scored.iter().zip(&candidates) {
                prop_assert_eq!(edge.pair(), (pair.first(), pair.second()));
                prop_assert!(
                    edge.value().is_finite() && edge.value() >= 0.0,
                    "{} scored {}",
                    descriptor.name(),
                    edge.value()
                );
            }
        }
    }

    #[test]
    fn scores_do_not_depend_on_candidate_order(graph in any::<RandomGraph>()) {
        let Some(graph) = graph.build() else { return Ok(()); };
        let candidates = graph.candidate_pairs(NonZeroUsize::new(3).expect("non-zero"));
        let mut reversed = candidates.clone();
        reversed.reverse();
        let registry = standard_registry().expect("names are unique");

        for descriptor in registry.descriptors() {
            let method = descriptor.instantiate().expect("defaults are valid");
            let forward = method.score(&graph, &candidates).expect("standard methods never fail");
            let mut backward = method.score(&graph, &reversed).expect("standard methods never fail");
            backward.reverse();
            prop_assert_eq!(forward, backward, "{}", descriptor.name());
        }
    }
}
