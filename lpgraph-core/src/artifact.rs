//! Reconstructed graph artifacts: naming, rendering and sinks.
//!
//! An artifact is identified by `(method, level)`. [`ArtifactLayout`] turns
//! that identifier into a path inside the output directory using one rule:
//! `{method}-Top{percent}.{extension}`.

use std::{
    fmt::{self, Write as _},
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use cap_std::{ambient_authority, fs::Dir};

use crate::{
    edge::NodeId,
    error::ArtifactError,
    graph::Graph,
    threshold::{ReconstructedEdgeSet, ThresholdLevel},
};

/// Default file extension for reconstructed graphs.
pub const DEFAULT_EXTENSION: &str = "lpg";

/// Identifies one reconstructed graph of a run.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ArtifactId {
    method: Arc<str>,
    level: ThresholdLevel,
}

impl ArtifactId {
    /// Creates an identifier for `method` at `level`.
    #[must_use]
    pub fn new(method: impl Into<Arc<str>>, level: ThresholdLevel) -> Self {
        Self {
            method: method.into(),
            level,
        }
    }

    /// Returns the method name.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns the threshold level.
    #[must_use]
    pub fn level(&self) -> ThresholdLevel {
        self.level
    }

    /// Returns the file stem, e.g. `Katz-Top30`.
    #[must_use]
    pub fn stem(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-Top{}", self.method, self.level.percent())
    }
}

/// Output directory and extension shared by every artifact of a run.
///
/// # Examples
/// ```
/// use lpgraph_core::{ArtifactId, ArtifactLayout, ThresholdLevel};
///
/// let layout = ArtifactLayout::new("out", "lpg");
/// let level = ThresholdLevel::new(3).expect("3 is a valid level");
/// let path = layout.resolve(&ArtifactId::new("Jaccard", level));
/// assert_eq!(path, std::path::Path::new("out").join("Jaccard-Top30.lpg"));
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ArtifactLayout {
    directory: PathBuf,
    extension: String,
}

impl ArtifactLayout {
    /// Creates a layout rooted at `directory`.
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            extension: extension.into(),
        }
    }

    /// Returns the output directory.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Returns the artifact extension without the leading dot.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Returns the file name of `id` within the output directory.
    #[must_use]
    pub fn file_name(&self, id: &ArtifactId) -> String {
        format!("{}.{}", id.stem(), self.extension)
    }

    /// Returns the full path of `id`.
    #[must_use]
    pub fn resolve(&self, id: &ArtifactId) -> PathBuf {
        self.directory.join(self.file_name(id))
    }
}

impl Default for ArtifactLayout {
    fn default() -> Self {
        Self::new(PathBuf::new(), DEFAULT_EXTENSION)
    }
}

/// Renders a reconstructed set as a weighted edge list.
///
/// One `source target value` line per edge, training edges first, using the
/// labels the graph was loaded with.
///
/// # Errors
/// Returns [`ArtifactError::UnknownNode`] when an edge references a node the
/// graph cannot label.
pub fn render_edge_list(
    graph: &Graph,
    edges: &ReconstructedEdgeSet<'_>,
    path: &Path,
) -> Result<String, ArtifactError> {
    let mut out = String::new();
    for edge in edges.iter() {
        let source = label(graph, edge.source().index(), path)?;
        let target = label(graph, edge.target().index(), path)?;
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{source} {target} {}", edge.value());
    }
    Ok(out)
}

fn label<'g>(graph: &'g Graph, index: usize, path: &Path) -> Result<&'g str, ArtifactError> {
    graph
        .label(NodeId::new(index))
        .ok_or_else(|| ArtifactError::UnknownNode {
            path: path.to_path_buf(),
            index,
        })
}

/// Destination for rendered artifacts.
///
/// Sinks take `&self` so one sink can serve every method of a run.
pub trait ArtifactSink {
    /// Returns the naming layout the sink writes with.
    fn layout(&self) -> &ArtifactLayout;

    /// Stores `contents` under `id`, returning the path written.
    ///
    /// # Errors
    /// Returns an [`ArtifactError`] when the artifact cannot be stored. The
    /// pipeline treats this as a per-artifact failure.
    fn write(&self, id: &ArtifactId, contents: &str) -> Result<PathBuf, ArtifactError>;
}

impl<S: ArtifactSink + ?Sized> ArtifactSink for &S {
    fn layout(&self) -> &ArtifactLayout {
        (**self).layout()
    }

    fn write(&self, id: &ArtifactId, contents: &str) -> Result<PathBuf, ArtifactError> {
        (**self).write(id, contents)
    }
}

/// Writes artifacts into a directory on disk.
///
/// The directory is created on each write rather than up front, so a missing
/// or read-only output directory fails individual artifacts instead of the
/// whole run.
#[derive(Clone, Debug)]
pub struct DirectorySink {
    layout: ArtifactLayout,
}

impl DirectorySink {
    /// Creates a sink for `layout`.
    #[must_use]
    pub fn new(layout: ArtifactLayout) -> Self {
        Self { layout }
    }

    fn open(&self) -> Result<Dir, ArtifactError> {
        let directory = self.layout.directory();
        let directory_error = |source| ArtifactError::Directory {
            path: directory.to_path_buf(),
            source,
        };
        Dir::create_ambient_dir_all(directory, ambient_authority()).map_err(directory_error)?;
        Dir::open_ambient_dir(directory, ambient_authority()).map_err(directory_error)
    }
}

impl ArtifactSink for DirectorySink {
    fn layout(&self) -> &ArtifactLayout {
        &self.layout
    }

    fn write(&self, id: &ArtifactId, contents: &str) -> Result<PathBuf, ArtifactError> {
        let dir = self.open()?;
        let path = self.layout.resolve(id);
        dir.write(self.layout.file_name(id), contents)
            .map_err(|source| ArtifactError::Write {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}

/// Keeps artifacts in memory, in write order.
///
/// Useful for tests and for callers that post-process reconstructed graphs
/// without touching the filesystem.
#[derive(Debug, Default)]
pub struct MemorySink {
    layout: ArtifactLayout,
    artifacts: Mutex<Vec<(ArtifactId, String)>>,
}

impl MemorySink {
    /// Creates an empty sink with the default layout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty sink reporting paths under `layout`.
    #[must_use]
    pub fn with_layout(layout: ArtifactLayout) -> Self {
        Self {
            layout,
            artifacts: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of the stored artifacts.
    #[must_use]
    pub fn artifacts(&self) -> Vec<(ArtifactId, String)> {
        self.artifacts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the contents stored for `id`.
    #[must_use]
    pub fn get(&self, id: &ArtifactId) -> Option<String> {
        self.artifacts()
            .into_iter()
            .find_map(|(stored, contents)| (&stored == id).then_some(contents))
    }
}

impl ArtifactSink for MemorySink {
    fn layout(&self) -> &ArtifactLayout {
        &self.layout
    }

    fn write(&self, id: &ArtifactId, contents: &str) -> Result<PathBuf, ArtifactError> {
        let mut artifacts = self
            .artifacts
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        artifacts.push((id.clone(), contents.to_owned()));
        Ok(self.layout.resolve(id))
    }
}
