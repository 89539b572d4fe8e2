//! Graph source abstraction consumed by the pipeline driver.

use std::{convert::Infallible, error::Error as StdError};

use crate::graph::Graph;

/// Something that can produce the training [`Graph`] for a run.
///
/// The pipeline calls [`GraphSource::load`] exactly once per run. Loading
/// failures are the only fatal condition of a run.
///
/// # Examples
/// ```
/// use lpgraph_core::{Graph, GraphBuilder, GraphError, GraphSource};
///
/// struct Triangle;
///
/// impl GraphSource for Triangle {
///     type Error = GraphError;
///
///     fn name(&self) -> &str { "triangle" }
///
///     fn load(&self) -> Result<Graph, GraphError> {
///         let mut builder = GraphBuilder::new(self.name());
///         builder.add_edge("a", "b", 1.0)?;
///         builder.add_edge("b", "c", 1.0)?;
///         builder.add_edge("c", "a", 1.0)?;
///         builder.build()
///     }
/// }
///
/// let graph = Triangle.load()?;
/// assert_eq!(graph.node_count(), 3);
/// # Ok::<(), GraphError>(())
/// ```
pub trait GraphSource {
    /// Error raised when the source cannot be read or parsed.
    type Error: StdError + Send + Sync + 'static;

    /// Returns a human-readable name.
    fn name(&self) -> &str;

    /// Loads the graph.
    ///
    /// # Errors
    /// Returns [`Self::Error`] when the underlying data is unreadable or
    /// malformed.
    fn load(&self) -> Result<Graph, Self::Error>;
}

/// An already assembled graph acts as its own source.
impl GraphSource for Graph {
    type Error = Infallible;

    fn name(&self) -> &str {
        Self::name(self)
    }

    fn load(&self) -> Result<Graph, Infallible> {
        Ok(self.clone())
    }
}
