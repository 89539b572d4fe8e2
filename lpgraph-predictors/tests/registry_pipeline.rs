//! The built-in registries driven through the core pipeline.

use lpgraph_core::{
    ArtifactId, Graph, GraphBuilder, MemorySink, MethodOutcome, PipelineBuilder, ScoringError,
    ThresholdLevel,
};
use lpgraph_predictors::{registry_with_groups, standard_registry};
use rstest::{fixture, rstest};

/// Two triangles joined by a bridge `c - d`, with one group per triangle.
#[fixture]
fn bridged(#[default(true)] with_groups: bool) -> Graph {
    let mut builder = GraphBuilder::new("bridged");
    for (s, t, w) in [
        ("a", "b", 1.0),
        ("b", "c", 2.0),
        ("a", "c", 1.0),
        ("c", "d", 0.5),
        ("d", "e", 1.0),
        ("e", "f", 3.0),
        ("d", "f", 1.0),
    ] {
        builder.add_edge(s, t, w).expect("edge must be valid");
    }
    if with_groups {
        for (node, group) in [("a", "left"), ("b", "left"), ("c", "left"), ("d", "right"), ("e", "right"), ("f", "right")] {
            builder.add_membership(node, group);
        }
    }
    builder.build().expect("graph must build")
}

#[rstest]
fn every_standard_method_writes_ten_artifacts(#[with(false)] bridged: Graph) {
    let registry = standard_registry().expect("names are unique");
    let names: Vec<String> = registry.list_methods().map(str::to_owned).collect();
    let pipeline = PipelineBuilder::new()
        .with_registry(registry)
        .build()
        .expect("configuration is valid");
    let sink = MemorySink::new();
    let report = pipeline.run_with_sink(&bridged, &sink).expect("run succeeds");

    assert_eq!(report.methods().len(), 13);
    assert_eq!(report.artifacts_written(), 13 * 10);
    for name in &names {
        let full = sink
            .get(&ArtifactId::new(name.as_str(), ThresholdLevel::MAX))
            .expect("full reconstruction is written");
        // Seven training edges plus the four two-hop candidates.
        assert_eq!(full.lines().count(), 7 + 4, "{name}");
        assert!(full.starts_with("a b 1\nb c 2\na c 1\n"), "{name}");
    }
}

#[rstest]
fn group_measures_fail_softly_without_membership(#[with(false)] bridged: Graph) {
    let pipeline = PipelineBuilder::new()
        .with_registry(registry_with_groups().expect("names are unique"))
        .build()
        .expect("configuration is valid");
    let sink = MemorySink::new();
    let report = pipeline.run_with_sink(&bridged, &sink).expect("run succeeds");

    let outcome = report
        .method("WithinAndOutsideCommonGroups")
        .map(|m| m.outcome().clone());
    assert!(matches!(
        outcome,
        Some(MethodOutcome::ScoringFailed {
            error: ScoringError::MissingGroups { .. }
        })
    ));
    assert_eq!(report.skipped_methods(), 3);
    assert_eq!(report.artifacts_written(), 13 * 10);
}

#[rstest]
fn group_measures_run_with_membership(bridged: Graph) {
    let pipeline = PipelineBuilder::new()
        .with_registry(registry_with_groups().expect("names are unique"))
        .with_methods(["CommonNeighborsOfGroups", "WithinAndOutsideCommonGroups"])
        .build()
        .expect("configuration is valid");
    let sink = MemorySink::new();
    let report = pipeline.run_with_sink(&bridged, &sink).expect("run succeeds");

    assert_eq!(report.skipped_methods(), 0);
    assert_eq!(report.artifacts_written(), 20);

    // Every two-hop pair straddles the bridge, so only the shared neighbour
    // counts.
    let full = sink
        .get(&ArtifactId::new("CommonNeighborsOfGroups", ThresholdLevel::MAX))
        .expect("artifact written");
    assert!(full.lines().skip(7).all(|line| line.ends_with(" 1")));
}
