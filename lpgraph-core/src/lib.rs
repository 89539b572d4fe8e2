//! LPgraph core library.
//!
//! Ranks link-prediction candidates produced by pluggable scoring methods and
//! reconstructs the training graph at ten cumulative coverage thresholds.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod artifact;
mod edge;
mod error;
mod graph;
mod pipeline;
mod registry;
mod report;
mod runner;
mod scoring;
mod source;
mod threshold;

pub use crate::{
    artifact::{
        ArtifactId, ArtifactLayout, ArtifactSink, DEFAULT_EXTENSION, DirectorySink, MemorySink,
        render_edge_list,
    },
    edge::{CandidatePair, Edge, NodeId},
    error::{
        ArtifactError, ArtifactErrorCode, GraphError, GraphErrorCode, PipelineError,
        PipelineErrorCode, RegistryError, RegistryErrorCode, Result, ScoringError,
        ScoringErrorCode,
    },
    graph::{EdgeInsertion, Graph, GraphBuilder, GroupId, Neighbour, SharedNeighbour},
    pipeline::{DEFAULT_MAX_HOPS, Pipeline, PipelineBuilder},
    registry::{MethodDescriptor, MethodFamily, MethodParams, MethodRegistry},
    report::{MethodOutcome, MethodReport, PipelineReport},
    runner::{Prediction, PredictionRunner},
    scoring::ScoringMethod,
    source::GraphSource,
    threshold::{
        DuplicatePolicy, LEVEL_COUNT, RankedCandidates, ReconstructedEdgeSet, ThresholdLevel,
        ThresholdReconstructor,
    },
};
