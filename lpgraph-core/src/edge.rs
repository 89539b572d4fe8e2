//! Edge and node identifier types shared by the pipeline and predictors.

use std::{cmp::Ordering, fmt};

/// Dense index of a node inside a [`crate::Graph`].
///
/// Identifiers are assigned in first-seen order while the graph loads, so
/// the same input file always yields the same numbering.
///
/// # Examples
/// ```
/// use lpgraph_core::NodeId;
///
/// let id = NodeId::new(3);
/// assert_eq!(id.index(), 3);
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NodeId(usize);

impl NodeId {
    /// Wraps a raw node index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the raw node index.
    #[must_use]
    #[rustfmt::skip]
    pub const fn index(self) -> usize { self.0 }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A weighted or scored link between two distinct nodes.
///
/// Training edges carry the observed strength as their value, predicted
/// edges carry the predictor score. The endpoints keep the order they were
/// given in so artifacts reproduce the input orientation, while
/// [`Edge::same_pair`] compares them as an unordered pair.
///
/// # Examples
/// ```
/// use lpgraph_core::{Edge, NodeId};
///
/// let edge = Edge::new(NodeId::new(4), NodeId::new(1), 0.5);
/// assert_eq!(edge.source(), NodeId::new(4));
/// assert_eq!(edge.pair(), (NodeId::new(1), NodeId::new(4)));
/// assert!(edge.same_pair(&Edge::new(NodeId::new(1), NodeId::new(4), 2.0)));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    source: NodeId,
    target: NodeId,
    value: f64,
}

impl Edge {
    /// Creates an edge.
    ///
    /// Callers are responsible for `source != target`; the graph builder and
    /// [`CandidatePair`] both enforce it before constructing edges, and the
    /// prediction runner rejects predicted self loops.
    #[must_use]
    pub const fn new(source: NodeId, target: NodeId, value: f64) -> Self {
        Self {
            source,
            target,
            value,
        }
    }

    /// Returns the first endpoint as given.
    #[must_use]
    #[rustfmt::skip]
    pub const fn source(&self) -> NodeId { self.source }

    /// Returns the second endpoint as given.
    #[must_use]
    #[rustfmt::skip]
    pub const fn target(&self) -> NodeId { self.target }

    /// Returns the weight or score.
    #[must_use]
    #[rustfmt::skip]
    pub const fn value(&self) -> f64 { self.value }

    /// Returns the endpoints ordered as `(min, max)`.
    #[must_use]
    pub fn pair(&self) -> (NodeId, NodeId) {
        if self.source <= self.target {
            (self.source, self.target)
        } else {
            (self.target, self.source)
        }
    }

    /// Returns `true` when both edges join the same two nodes, in either
    /// orientation.
    #[must_use]
    pub fn same_pair(&self, other: &Self) -> bool {
        self.pair() == other.pair()
    }

    /// Orders edges by descending value using [`f64::total_cmp`].
    ///
    /// Used with a stable sort so equal scores keep their input order.
    #[must_use]
    pub fn cmp_by_value_desc(&self, other: &Self) -> Ordering {
        other.value.total_cmp(&self.value)
    }
}

/// An unordered pair of distinct, non-adjacent nodes proposed for scoring.
///
/// Pairs are always stored with `first < second`.
///
/// # Examples
/// ```
/// use lpgraph_core::{CandidatePair, NodeId};
///
/// let pair = CandidatePair::new(NodeId::new(5), NodeId::new(2)).expect("distinct nodes");
/// assert_eq!(pair.first(), NodeId::new(2));
/// assert_eq!(pair.second(), NodeId::new(5));
/// assert!(CandidatePair::new(NodeId::new(1), NodeId::new(1)).is_none());
///
/// let edge = pair.scored(0.75);
/// assert_eq!(edge.value(), 0.75);
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CandidatePair {
    first: NodeId,
    second: NodeId,
}

impl CandidatePair {
    /// Builds a canonical pair, returning `None` for a self pair.
    #[must_use]
    pub fn new(a: NodeId, b: NodeId) -> Option<Self> {
        match a.cmp(&b) {
            Ordering::Less => Some(Self {
                first: a,
                second: b,
            }),
            Ordering::Greater => Some(Self {
                first: b,
                second: a,
            }),
            Ordering::Equal => None,
        }
    }

    /// Returns the smaller endpoint.
    #[must_use]
    #[rustfmt::skip]
    pub const fn first(&self) -> NodeId { self.first }

    /// Returns the larger endpoint.
    #[must_use]
    #[rustfmt::skip]
    pub const fn second(&self) -> NodeId { self.second }

    /// Attaches a score, producing a predicted [`Edge`].
    #[must_use]
    pub const fn scored(self, score: f64) -> Edge {
        Edge::new(self.first, self.second, score)
    }
}
