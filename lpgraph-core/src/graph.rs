//! Training graph storage.
//!
//! [`Graph`] owns the training edge list exactly as it was loaded plus an
//! adjacency index used by predictors. It is assembled through
//! [`GraphBuilder`] and is read-only afterwards.

use std::{
    collections::{HashMap, HashSet, VecDeque},
    num::NonZeroUsize,
    sync::Arc,
};

use crate::{
    edge::{CandidatePair, Edge, NodeId},
    error::GraphError,
};

/// Dense index of a group in the graph's membership table.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct GroupId(usize);

impl GroupId {
    /// Returns the raw group index.
    #[must_use]
    #[rustfmt::skip]
    pub const fn index(self) -> usize { self.0 }
}

/// One adjacency entry: the neighbouring node and the connecting weight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbour {
    node: NodeId,
    weight: f64,
}

impl Neighbour {
    /// Returns the neighbouring node.
    #[must_use]
    #[rustfmt::skip]
    pub const fn node(&self) -> NodeId { self.node }

    /// Returns the weight of the connecting training edge.
    #[must_use]
    #[rustfmt::skip]
    pub const fn weight(&self) -> f64 { self.weight }
}

/// A neighbour shared by both endpoints of a pair, with the weight of each
/// connecting edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SharedNeighbour {
    /// The shared neighbour.
    pub node: NodeId,
    /// Weight of the edge between the first endpoint and `node`.
    pub first_weight: f64,
    /// Weight of the edge between the second endpoint and `node`.
    pub second_weight: f64,
}

/// Outcome of [`GraphBuilder::add_edge`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EdgeInsertion {
    /// The edge was added to the training set.
    Added,
    /// The unordered pair was already present; the first occurrence wins.
    Duplicate,
}

/// Undirected weighted training graph.
///
/// # Examples
/// ```
/// use lpgraph_core::GraphBuilder;
///
/// let mut builder = GraphBuilder::new("demo");
/// builder.add_edge("a", "b", 1.0)?;
/// builder.add_edge("b", "c", 2.0)?;
/// let graph = builder.build()?;
///
/// assert_eq!(graph.node_count(), 3);
/// assert_eq!(graph.training_edges().len(), 2);
/// let b = graph.node("b").expect("b was loaded");
/// assert_eq!(graph.degree(b), 2);
/// assert_eq!(graph.strength(b), 3.0);
/// # Ok::<(), lpgraph_core::GraphError>(())
/// ```
#[derive(Clone, Debug)]
pub struct Graph {
    name: Arc<str>,
    labels: Vec<Arc<str>>,
    index: HashMap<Arc<str>, NodeId>,
    training: Vec<Edge>,
    adjacency: Vec<Vec<Neighbour>>,
    strengths: Vec<f64>,
    memberships: Option<Vec<Vec<GroupId>>>,
    group_labels: Vec<Arc<str>>,
}

impl Graph {
    /// Returns the graph name, usually derived from its source file.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.labels.len()
    }

    /// Iterates node identifiers in index order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.labels.len()).map(NodeId::new)
    }

    /// Returns the training edges in load order.
    #[must_use]
    pub fn training_edges(&self) -> &[Edge] {
        &self.training
    }

    /// Returns the label a node was loaded with.
    #[must_use]
    pub fn label(&self, node: NodeId) -> Option<&str> {
        self.labels.get(node.index()).map(AsRef::as_ref)
    }

    /// Looks up a node by label.
    #[must_use]
    pub fn node(&self, label: &str) -> Option<NodeId> {
        self.index.get(label).copied()
    }

    /// Returns the neighbours of `node` sorted by node index. Unknown nodes
    /// have no neighbours.
    #[must_use]
    pub fn neighbours(&self, node: NodeId) -> &[Neighbour] {
        self.adjacency.get(node.index()).map_or(&[][..], Vec::as_slice)
    }

    /// Returns the number of neighbours of `node`.
    #[must_use]
    pub fn degree(&self, node: NodeId) -> usize {
        self.neighbours(node).len()
    }

    /// Returns the summed weight of the edges incident to `node`.
    #[must_use]
    pub fn strength(&self, node: NodeId) -> f64 {
        self.strengths.get(node.index()).copied().unwrap_or(0.0)
    }

    /// Returns the weight of the training edge joining `a` and `b`.
    #[must_use]
    pub fn weight(&self, a: NodeId, b: NodeId) -> Option<f64> {
        let neighbours = self.neighbours(a);
        neighbours
            .binary_search_by(|entry| entry.node.cmp(&b))
            .ok()
            .and_then(|position| neighbours.get(position))
            .map(Neighbour::weight)
    }

    /// Returns `true` when `a` and `b` share a training edge.
    #[must_use]
    pub fn are_adjacent(&self, a: NodeId, b: NodeId) -> bool {
        self.weight(a, b).is_some()
    }

    /// Returns the neighbours shared by `a` and `b`, in node index order.
    #[must_use]
    pub fn shared_neighbours(&self, a: NodeId, b: NodeId) -> Vec<SharedNeighbour> {
        let mut left = self.neighbours(a).iter().peekable();
        let mut right = self.neighbours(b).iter().peekable();
        let mut shared = Vec::new();
        while let (Some(l), Some(r)) = (left.peek(), right.peek()) {
            match l.node.cmp(&r.node) {
                std::cmp::Ordering::Less => {
                    left.next();
                }
                std::cmp::Ordering::Greater => {
                    right.next();
                }
                std::cmp::Ordering::Equal => {
                    shared.push(SharedNeighbour {
                        node: l.node,
                        first_weight: l.weight,
                        second_weight: r.weight,
                    });
                    left.next();
                    right.next();
                }
            }
        }
        shared
    }

    /// Returns `true` when group membership data was loaded.
    #[must_use]
    pub fn has_groups(&self) -> bool {
        self.memberships.is_some()
    }

    /// Returns the groups `node` belongs to, sorted by index.
    ///
    /// `None` means the graph carries no membership data at all; a node with
    /// no groups yields an empty slice.
    #[must_use]
    pub fn groups(&self, node: NodeId) -> Option<&[GroupId]> {
        self.memberships
            .as_ref()
            .map(|table| table.get(node.index()).map_or(&[][..], Vec::as_slice))
    }

    /// Returns the number of distinct groups.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.group_labels.len()
    }

    /// Returns the label of a group.
    #[must_use]
    pub fn group_label(&self, group: GroupId) -> Option<&str> {
        self.group_labels.get(group.index()).map(AsRef::as_ref)
    }

    /// Enumerates unordered non-adjacent pairs joined by a path of at most
    /// `max_hops` edges.
    ///
    /// Pairs come out in ascending `(first, second)` order so every predictor
    /// sees the same candidate sequence for the same graph.
    ///
    /// # Examples
    /// ```
    /// use std::num::NonZeroUsize;
    /// use lpgraph_core::GraphBuilder;
    ///
    /// let mut builder = GraphBuilder::new("path");
    /// builder.add_edge("a", "b", 1.0)?;
    /// builder.add_edge("b", "c", 1.0)?;
    /// builder.add_edge("c", "d", 1.0)?;
    /// let graph = builder.build()?;
    ///
    /// let two_hops = graph.candidate_pairs(NonZeroUsize::new(2).expect("non-zero"));
    /// assert_eq!(two_hops.len(), 2); // (a, c) and (b, d)
    /// let three_hops = graph.candidate_pairs(NonZeroUsize::new(3).expect("non-zero"));
    /// assert_eq!(three_hops.len(), 3);
    /// # Ok::<(), lpgraph_core::GraphError>(())
    /// ```
    #[must_use]
    pub fn candidate_pairs(&self, max_hops: NonZeroUsize) -> Vec<CandidatePair> {
        let node_count = self.node_count();
        let mut pairs = Vec::new();
        let mut depth: Vec<Option<usize>> = vec![None; node_count];
        let mut touched = Vec::new();
        let mut queue = VecDeque::new();

        for origin in self.nodes() {
            touched.clear();
            queue.clear();
            mark(&mut depth, &mut touched, origin, 0);
            queue.push_back((origin, 0_usize));

            while let Some((current, hops)) = queue.pop_front() {
                if hops == max_hops.get() {
                    continue;
                }
                for neighbour in self.neighbours(current) {
                    if depth.get(neighbour.node.index()).copied().flatten().is_none() {
                        mark(&mut depth, &mut touched, neighbour.node, hops + 1);
                        queue.push_back((neighbour.node, hops + 1));
                    }
                }
            }

            let mut reached: Vec<NodeId> = touched
                .iter()
                .copied()
                .filter(|&node| {
                    node > origin && depth.get(node.index()).copied().flatten() >= Some(2)
                })
                .collect();
            reached.sort_unstable();
            pairs.extend(
                reached
                    .into_iter()
                    .filter_map(|node| CandidatePair::new(origin, node)),
            );

            for node in &touched {
                if let Some(slot) = depth.get_mut(node.index()) {
                    *slot = None;
                }
            }
        }
        pairs
    }
}

fn mark(depth: &mut [Option<usize>], touched: &mut Vec<NodeId>, node: NodeId, hops: usize) {
    if let Some(slot) = depth.get_mut(node.index()) {
        *slot = Some(hops);
        touched.push(node);
    }
}

/// Assembles a [`Graph`] from labelled edges and optional group memberships.
///
/// Node identifiers are assigned in first-seen order.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    name: Arc<str>,
    labels: Vec<Arc<str>>,
    index: HashMap<Arc<str>, NodeId>,
    training: Vec<Edge>,
    seen: HashSet<(NodeId, NodeId)>,
    memberships: Vec<(NodeId, GroupId)>,
    group_index: HashMap<Arc<str>, GroupId>,
    group_labels: Vec<Arc<str>>,
    expects_groups: bool,
}

impl GraphBuilder {
    /// Creates an empty builder for a graph called `name`.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            labels: Vec::new(),
            index: HashMap::new(),
            training: Vec::new(),
            seen: HashSet::new(),
            memberships: Vec::new(),
            group_index: HashMap::new(),
            group_labels: Vec::new(),
            expects_groups: false,
        }
    }

    /// Adds a training edge between two labelled nodes.
    ///
    /// A repeated unordered pair is ignored and reported as
    /// [`EdgeInsertion::Duplicate`].
    ///
    /// # Errors
    /// Returns [`GraphError::SelfLoop`] when both labels match and
    /// [`GraphError::NonFiniteWeight`] when `weight` is NaN or infinite.
    pub fn add_edge(
        &mut self,
        source: &str,
        target: &str,
        weight: f64,
    ) -> Result<EdgeInsertion, GraphError> {
        if source == target {
            return Err(GraphError::SelfLoop {
                node: Arc::from(source),
            });
        }
        if !weight.is_finite() {
            return Err(GraphError::NonFiniteWeight {
                source_node: Arc::from(source),
                target_node: Arc::from(target),
                weight,
            });
        }

        let source_id = self.intern(source);
        let target_id = self.intern(target);
        let key = if source_id < target_id {
            (source_id, target_id)
        } else {
            (target_id, source_id)
        };
        if !self.seen.insert(key) {
            return Ok(EdgeInsertion::Duplicate);
        }
        self.training.push(Edge::new(source_id, target_id, weight));
        Ok(EdgeInsertion::Added)
    }

    /// Adds a node without edges, returning its identifier. Existing labels
    /// keep their identifier.
    pub fn add_node(&mut self, label: &str) -> NodeId {
        self.intern(label)
    }

    /// Records that `node` belongs to `group`.
    ///
    /// Returns `false` when `node` has not been seen in any edge; such
    /// memberships are dropped. Calling this at least once marks the graph as
    /// carrying membership data, even if every record was dropped.
    pub fn add_membership(&mut self, node: &str, group: &str) -> bool {
        self.enable_groups();
        let Some(node_id) = self.index.get(node).copied() else {
            return false;
        };
        let group_id = match self.group_index.get(group) {
            Some(id) => *id,
            None => {
                let id = GroupId(self.group_labels.len());
                let label: Arc<str> = Arc::from(group);
                self.group_labels.push(Arc::clone(&label));
                self.group_index.insert(label, id);
                id
            }
        };
        self.memberships.push((node_id, group_id));
        true
    }

    /// Marks the graph as carrying membership data without adding records.
    #[must_use]
    pub fn with_group_table(mut self) -> Self {
        self.enable_groups();
        self
    }

    /// In-place form of [`GraphBuilder::with_group_table`].
    pub fn enable_groups(&mut self) {
        self.expects_groups = true;
    }

    /// Returns the number of training edges added so far.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.training.len()
    }

    /// Finalises the graph.
    ///
    /// # Errors
    /// Returns [`GraphError::Empty`] when no training edge was added.
    pub fn build(self) -> Result<Graph, GraphError> {
        if self.training.is_empty() {
            return Err(GraphError::Empty { graph: self.name });
        }

        let node_count = self.labels.len();
        let mut adjacency: Vec<Vec<Neighbour>> = vec![Vec::new(); node_count];
        let mut strengths = vec![0.0_f64; node_count];
        for edge in &self.training {
            push_neighbour(&mut adjacency, &mut strengths, edge.source(), edge.target(), edge.value());
            push_neighbour(&mut adjacency, &mut strengths, edge.target(), edge.source(), edge.value());
        }
        for list in &mut adjacency {
            list.sort_by(|a, b| a.node.cmp(&b.node));
        }

        let memberships = self.expects_groups.then(|| {
            let mut table: Vec<Vec<GroupId>> = vec![Vec::new(); node_count];
            for (node, group) in &self.memberships {
                if let Some(groups) = table.get_mut(node.index()) {
                    groups.push(*group);
                }
            }
            for groups in &mut table {
                groups.sort_unstable();
                groups.dedup();
            }
            table
        });

        Ok(Graph {
            name: self.name,
            labels: self.labels,
            index: self.index,
            training: self.training,
            adjacency,
            strengths,
            memberships,
            group_labels: self.group_labels,
        })
    }

    fn intern(&mut self, label: &str) -> NodeId {
        if let Some(id) = self.index.get(label) {
            return *id;
        }
        let id = NodeId::new(self.labels.len());
        let label: Arc<str> = Arc::from(label);
        self.labels.push(Arc::clone(&label));
        self.index.insert(label, id);
        id
    }
}

fn push_neighbour(
    adjacency: &mut [Vec<Neighbour>],
    strengths: &mut [f64],
    from: NodeId,
    to: NodeId,
    weight: f64,
) {
    if let Some(list) = adjacency.get_mut(from.index()) {
        list.push(Neighbour { node: to, weight });
    }
    if let Some(strength) = strengths.get_mut(from.index()) {
        *strength += weight;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::{fixture, rstest};

    #[fixture]
    fn square_with_tail() -> Graph {
        // a - b - c - d - a forms a square, d - e hangs off it.
        let mut builder = GraphBuilder::new("square");
        for (s, t, w) in [("a", "b", 1.0), ("b", "c", 2.0), ("c", "d", 1.0), ("d", "a", 0.5), ("d", "e", 3.0)] {
            builder.add_edge(s, t, w).expect("edge must be valid");
        }
        builder.build().expect("graph must build")
    }

    fn id(graph: &Graph, label: &str) -> NodeId {
        graph.node(label).expect("label must exist")
    }

    #[rstest]
    fn adjacency_is_symmetric_and_sorted(square_with_tail: Graph) {
        let graph = square_with_tail;
        for node in graph.nodes() {
            let neighbours = graph.neighbours(node);
            assert!(neighbours.windows(2).all(|w| w[0].node() < w[1].node()));
            for entry in neighbours {
                assert_eq!(graph.weight(entry.node(), node), Some(entry.weight()));
            }
        }
        assert_eq!(graph.strength(id(&graph, "d")), 4.5);
    }

    #[rstest]
    fn shared_neighbours_report_both_weights(square_with_tail: Graph) {
        let graph = square_with_tail;
        let shared = graph.shared_neighbours(id(&graph, "a"), id(&graph, "c"));
        let labels: Vec<&str> = shared
            .iter()
            .filter_map(|entry| graph.label(entry.node))
            .collect();
        assert_eq!(labels, vec!["b", "d"]);
        assert_eq!(shared[0].first_weight, 1.0);
        assert_eq!(shared[0].second_weight, 2.0);
    }

    #[rstest]
    #[case(1, vec![])]
    #[case(2, vec![("a", "c"), ("b", "d"), ("a", "e"), ("c", "e")])]
    #[case(3, vec![("a", "c"), ("b", "d"), ("a", "e"), ("b", "e"), ("c", "e")])]
    fn candidate_pairs_respect_hop_limit(
        square_with_tail: Graph,
        #[case] hops: usize,
        #[case] expected: Vec<(&str, &str)>,
    ) {
        let graph = square_with_tail;
        let limit = NonZeroUsize::new(hops).expect("hops are non-zero");
        let pairs = graph.candidate_pairs(limit);
        let mut expected_pairs: Vec<CandidatePair> = expected
            .into_iter()
            .filter_map(|(a, b)| CandidatePair::new(id(&graph, a), id(&graph, b)))
            .collect();
        expected_pairs.sort_unstable();
        assert_eq!(pairs, expected_pairs);
        assert!(pairs.iter().all(|p| !graph.are_adjacent(p.first(), p.second())));
    }

    #[test]
    fn duplicate_pairs_keep_first_occurrence() {
        let mut builder = GraphBuilder::new("dup");
        assert_eq!(builder.add_edge("x", "y", 1.0), Ok(EdgeInsertion::Added));
        assert_eq!(builder.add_edge("y", "x", 7.0), Ok(EdgeInsertion::Duplicate));
        let graph = builder.build().expect("graph must build");
        assert_eq!(graph.training_edges().len(), 1);
        assert_eq!(graph.weight(id(&graph, "y"), id(&graph, "x")), Some(1.0));
    }

    #[rstest]
    #[case::self_loop("a", "a", 1.0)]
    #[case::nan("a", "b", f64::NAN)]
    #[case::infinite("a", "b", f64::INFINITY)]
    fn add_edge_rejects_invalid_records(#[case] source: &str, #[case] target: &str, #[case] weight: f64) {
        let mut builder = GraphBuilder::new("bad");
        assert!(builder.add_edge(source, target, weight).is_err());
        assert_eq!(builder.edge_count(), 0);
    }

    #[test]
    fn build_rejects_empty_graph() {
        let err = GraphBuilder::new("empty").build().expect_err("empty graph must fail");
        assert!(matches!(err, GraphError::Empty { .. }));
    }

    #[test]
    fn isolated_nodes_have_no_neighbours() {
        let mut builder = GraphBuilder::new("isolated");
        builder.add_edge("a", "b", 1.0).expect("edge must be valid");
        let lonely = builder.add_node("z");
        assert_eq!(builder.add_node("a"), NodeId::new(0));
        let graph = builder.build().expect("graph must build");
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.degree(lonely), 0);
        assert_eq!(graph.strength(lonely), 0.0);
        assert_eq!(graph.label(lonely), Some("z"));
    }

    #[test]
    fn memberships_are_optional_and_deduplicated() {
        let mut builder = GraphBuilder::new("groups");
        builder.add_edge("a", "b", 1.0).expect("edge must be valid");
        let plain = builder.clone().build().expect("graph must build");
        assert!(!plain.has_groups());
        assert_eq!(plain.groups(NodeId::new(0)), None);

        assert!(builder.add_membership("a", "g1"));
        assert!(builder.add_membership("a", "g1"));
        assert!(!builder.add_membership("zz", "g1"));
        let grouped = builder.build().expect("graph must build");
        assert!(grouped.has_groups());
        assert_eq!(grouped.group_count(), 1);
        assert_eq!(grouped.groups(id(&grouped, "a")).map(<[GroupId]>::len), Some(1));
        assert_eq!(grouped.groups(id(&grouped, "b")), Some(&[][..]));
    }
}
