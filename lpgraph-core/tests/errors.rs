//! Error codes and messages exposed by the core crate.

use std::{io, path::PathBuf, sync::Arc};

use lpgraph_core::{
    ArtifactError, GraphBuilder, GraphError, PipelineBuilder, PipelineError, RegistryError,
    ScoringError,
};
use rstest::rstest;

#[rstest]
#[case::self_loop(GraphError::SelfLoop { node: Arc::from("x") }, "GRAPH_SELF_LOOP")]
#[case::weight(
    GraphError::NonFiniteWeight {
        source_node: Arc::from("a"),
        target_node: Arc::from("b"),
        weight: f64::NAN,
    },
    "GRAPH_NON_FINITE_WEIGHT"
)]
#[case::empty(GraphError::Empty { graph: Arc::from("g") }, "GRAPH_EMPTY")]
fn graph_error_codes_are_stable(#[case] error: GraphError, #[case] code: &str) {
    assert_eq!(error.code().as_str(), code);
    assert_eq!(error.code().to_string(), code);
}

#[rstest]
#[case::missing_groups(
    ScoringError::MissingGroups { method: Arc::from("CommonNeighborsOfGroups") },
    "SCORING_MISSING_GROUPS",
    "method `CommonNeighborsOfGroups` requires group membership but the graph has none"
)]
#[case::invalid_parameters(
    ScoringError::InvalidParameters { method: Arc::from("Katz"), reason: "expected Katz parameters" },
    "SCORING_INVALID_PARAMETERS",
    "method `Katz` received invalid parameters: expected Katz parameters"
)]
#[case::graph_too_large(
    ScoringError::GraphTooLarge { method: Arc::from("SimRank"), nodes: 9000, limit: 8192 },
    "SCORING_GRAPH_TOO_LARGE",
    "method `SimRank` supports at most 8192 nodes; the graph has 9000"
)]
fn scoring_errors_carry_code_and_message(
    #[case] error: ScoringError,
    #[case] code: &str,
    #[case] message: &str,
) {
    assert_eq!(error.code().as_str(), code);
    assert_eq!(error.to_string(), message);
}

#[test]
fn artifact_errors_keep_their_source() {
    let error = ArtifactError::Write {
        path: PathBuf::from("out/Katz-Top10.lpg"),
        source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
    };
    assert_eq!(error.code().as_str(), "ARTIFACT_WRITE");
    let source = std::error::Error::source(&error).expect("io error is the source");
    assert_eq!(source.to_string(), "denied");
}

#[test]
fn registry_duplicate_has_code() {
    let error = RegistryError::DuplicateMethod {
        name: Arc::from("Jaccard"),
    };
    assert_eq!(error.code().as_str(), "REGISTRY_DUPLICATE_METHOD");
    assert_eq!(error.to_string(), "method `Jaccard` is already registered");
}

#[test]
fn builder_errors_report_the_rejected_value() {
    let err = PipelineBuilder::new()
        .with_max_hops(0)
        .build()
        .expect_err("zero hops are invalid");
    assert!(matches!(err, PipelineError::InvalidMaxHops { got: 0 }));
    assert_eq!(err.to_string(), "max_hops must be at least 1 (got 0)");
}

#[test]
fn graph_builder_errors_name_the_node() {
    let mut builder = GraphBuilder::new("loops");
    let err = builder
        .add_edge("n7", "n7", 1.0)
        .expect_err("self loops are rejected");
    assert_eq!(err.to_string(), "edge joins node `n7` to itself");
}
