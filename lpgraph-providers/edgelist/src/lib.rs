//! Edge-list provider implementing [`GraphSource`].
//!
//! Reads whitespace-separated `source target weight` records, plus an
//! optional `node group [group…]` membership file for the group-overlap
//! predictors.

mod error;
mod parse;

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use lpgraph_core::{Graph, GraphBuilder, GraphSource};
use tracing::{Span, field, info, instrument};

pub use crate::{
    error::EdgeListError,
    parse::{EdgeListStats, GroupStats, read_edges, read_groups},
};

/// Weighted edge-list file, optionally paired with a group membership file.
///
/// # Examples
/// ```
/// use lpgraph_core::GraphSource;
/// use lpgraph_providers_edgelist::EdgeListSource;
/// use tempfile::TempDir;
///
/// let dir = TempDir::new()?;
/// let path = dir.path().join("karate.txt");
/// std::fs::write(&path, "1 2 1.0\n2 3 1.0\n")?;
///
/// let source = EdgeListSource::new(&path);
/// assert_eq!(source.name(), "karate");
/// let graph = source.load()?;
/// assert_eq!(graph.training_edges().len(), 2);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct EdgeListSource {
    path: PathBuf,
    groups: Option<PathBuf>,
    name: String,
}

impl EdgeListSource {
    /// Creates a source for `path`, named after the file stem.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = derive_graph_name(&path);
        Self {
            path,
            groups: None,
            name,
        }
    }

    /// Overrides the graph name used in diagnostics and reports.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Attaches a group membership file.
    #[must_use]
    pub fn with_groups(mut self, path: impl Into<PathBuf>) -> Self {
        self.groups = Some(path.into());
        self
    }

    /// Returns the edge-list path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the group membership path, if any.
    #[must_use]
    pub fn groups_path(&self) -> Option<&Path> {
        self.groups.as_deref()
    }
}

fn open(path: &Path) -> Result<BufReader<File>, EdgeListError> {
    let file = File::open(path).map_err(|source| EdgeListError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

/// Derives a graph name from the file stem, falling back to `graph`.
fn derive_graph_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|value| value.to_str())
        .filter(|stem| !stem.is_empty())
        .map_or_else(|| "graph".to_owned(), ToOwned::to_owned)
}

impl GraphSource for EdgeListSource {
    type Error = EdgeListError;

    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "edgelist.load",
        err,
        skip(self),
        fields(path = %self.path.display(), edges = field::Empty, groups = field::Empty),
    )]
    fn load(&self) -> Result<Graph, EdgeListError> {
        let mut builder = GraphBuilder::new(self.name.as_str());
        let stats = read_edges(&mut builder, open(&self.path)?)?;
        let span = Span::current();
        span.record("edges", stats.edges);
        info!(
            graph = self.name.as_str(),
            edges = stats.edges,
            duplicates = stats.duplicates,
            "edge list read"
        );

        if let Some(groups) = &self.groups {
            span.record("groups", field::display(groups.display()));
            let group_stats = read_groups(&mut builder, open(groups)?)?;
            info!(
                memberships = group_stats.memberships,
                unknown_nodes = group_stats.unknown_nodes,
                "group memberships read"
            );
        }

        Ok(builder.build()?)
    }
}
