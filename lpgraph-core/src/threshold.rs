//! Multi-threshold graph reconstruction.
//!
//! Scored candidates are ranked once per method. Each of the ten
//! [`ThresholdLevel`]s then keeps a cumulative prefix of that ranking and
//! appends it to the training edges.

use std::{borrow::Cow, collections::HashSet, fmt, iter::Chain, slice::Iter};

use crate::edge::{Edge, NodeId};

/// Number of threshold levels per method.
pub const LEVEL_COUNT: u8 = 10;

/// One of the ten cumulative coverage levels, `1..=10`.
///
/// Level `k` keeps `⌊k × n / 10⌋` of `n` ranked candidates.
///
/// # Examples
/// ```
/// use lpgraph_core::ThresholdLevel;
///
/// let level = ThresholdLevel::new(4).expect("4 is in range");
/// assert_eq!(level.percent(), 40);
/// assert_eq!(level.retained(3), 1);
/// assert!(ThresholdLevel::new(0).is_none());
/// assert_eq!(ThresholdLevel::all().count(), 10);
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ThresholdLevel(u8);

impl ThresholdLevel {
    /// The 10% level.
    pub const MIN: Self = Self(1);
    /// The 100% level.
    pub const MAX: Self = Self(LEVEL_COUNT);

    /// Returns the level for `value`, or `None` outside `1..=10`.
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value >= 1 && value <= LEVEL_COUNT {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Returns the raw level.
    #[must_use]
    #[rustfmt::skip]
    pub const fn get(self) -> u8 { self.0 }

    /// Returns the coverage percentage, `10..=100`.
    #[must_use]
    pub const fn percent(self) -> u16 {
        self.0 as u16 * 10
    }

    /// Returns how many of `candidate_count` ranked candidates this level
    /// keeps, rounding down.
    #[must_use]
    pub const fn retained(self, candidate_count: usize) -> usize {
        let level = self.0 as usize;
        let tenths = LEVEL_COUNT as usize;
        // Split to avoid overflowing `level * candidate_count`.
        (candidate_count / tenths) * level + (candidate_count % tenths) * level / tenths
    }

    /// Iterates every level in ascending order.
    pub fn all() -> impl Iterator<Item = Self> + Clone {
        (1..=LEVEL_COUNT).map(Self)
    }
}

impl fmt::Display for ThresholdLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

/// Scored candidates in descending score order.
///
/// Ranking is a stable sort on [`f64::total_cmp`], so tied scores keep the
/// order the predictor produced them in and the result never depends on
/// anything but the input sequence.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RankedCandidates {
    edges: Vec<Edge>,
}

impl RankedCandidates {
    /// Ranks `edges` by descending value.
    #[must_use]
    pub fn rank(mut edges: Vec<Edge>) -> Self {
        edges.sort_by(Edge::cmp_by_value_desc);
        Self { edges }
    }

    /// Returns the ranked edges.
    #[must_use]
    pub fn as_slice(&self) -> &[Edge] {
        &self.edges
    }

    /// Returns the number of ranked candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` when there is nothing to rank.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Returns the prefix retained at `level`.
    #[must_use]
    pub fn prefix(&self, level: ThresholdLevel) -> &[Edge] {
        let top = level.retained(self.edges.len());
        self.edges.get(..top).unwrap_or(&self.edges)
    }
}

/// How the retained prefix treats candidates that repeat a training edge.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum DuplicatePolicy {
    /// Concatenate training edges and the prefix unchanged.
    #[default]
    Keep,
    /// Drop prefix candidates whose unordered pair is already a training
    /// edge. The prefix length is still computed from the full ranking.
    DropTrainingDuplicates,
}

impl DuplicatePolicy {
    /// Returns a stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Keep => "keep",
            Self::DropTrainingDuplicates => "drop",
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Training edges followed by the retained candidates of one level.
#[derive(Clone, Debug, PartialEq)]
pub struct ReconstructedEdgeSet<'a> {
    level: ThresholdLevel,
    training: &'a [Edge],
    predicted: Cow<'a, [Edge]>,
}

impl<'a> ReconstructedEdgeSet<'a> {
    /// Returns the level this set was built for.
    #[must_use]
    pub fn level(&self) -> ThresholdLevel {
        self.level
    }

    /// Returns the training part.
    #[must_use]
    pub fn training(&self) -> &'a [Edge] {
        self.training
    }

    /// Returns the predicted part, in rank order.
    #[must_use]
    pub fn predicted(&self) -> &[Edge] {
        &self.predicted
    }

    /// Returns the total number of edges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.training.len() + self.predicted.len()
    }

    /// Returns `true` when the set holds no edge at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates training edges then predicted edges.
    pub fn iter(&self) -> Chain<Iter<'_, Edge>, Iter<'_, Edge>> {
        self.training.iter().chain(self.predicted.iter())
    }
}

impl<'s> IntoIterator for &'s ReconstructedEdgeSet<'_> {
    type Item = &'s Edge;
    type IntoIter = Chain<Iter<'s, Edge>, Iter<'s, Edge>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Builds reconstructed edge sets for one graph.
///
/// # Examples
/// ```
/// use lpgraph_core::{
///     DuplicatePolicy, Edge, NodeId, RankedCandidates, ThresholdLevel, ThresholdReconstructor,
/// };
///
/// let n = NodeId::new;
/// let training = [Edge::new(n(0), n(1), 1.0), Edge::new(n(1), n(2), 1.0)];
/// let ranked = RankedCandidates::rank(vec![
///     Edge::new(n(2), n(3), 0.9),
///     Edge::new(n(0), n(3), 0.9),
///     Edge::new(n(1), n(3), 0.1),
/// ]);
/// let reconstructor = ThresholdReconstructor::new(&training, DuplicatePolicy::Keep);
///
/// let level = |value| ThresholdLevel::new(value).expect("valid level");
/// assert_eq!(reconstructor.reconstruct(&ranked, level(1)).len(), 2);
/// assert_eq!(reconstructor.reconstruct(&ranked, level(4)).predicted(), &ranked.as_slice()[..1]);
/// assert_eq!(reconstructor.reconstruct(&ranked, level(10)).len(), 5);
/// ```
#[derive(Clone, Debug)]
pub struct ThresholdReconstructor<'a> {
    training: &'a [Edge],
    policy: DuplicatePolicy,
    training_pairs: HashSet<(NodeId, NodeId)>,
}

impl<'a> ThresholdReconstructor<'a> {
    /// Creates a reconstructor over `training`.
    #[must_use]
    pub fn new(training: &'a [Edge], policy: DuplicatePolicy) -> Self {
        let training_pairs = match policy {
            DuplicatePolicy::Keep => HashSet::new(),
            DuplicatePolicy::DropTrainingDuplicates => training.iter().map(Edge::pair).collect(),
        };
        Self {
            training,
            policy,
            training_pairs,
        }
    }

    /// Returns the duplicate policy.
    #[must_use]
    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Builds the edge set for `level`.
    #[must_use]
    pub fn reconstruct<'s>(
        &'s self,
        ranked: &'s RankedCandidates,
        level: ThresholdLevel,
    ) -> ReconstructedEdgeSet<'s> {
        let prefix = ranked.prefix(level);
        let predicted = match self.policy {
            DuplicatePolicy::Keep => Cow::Borrowed(prefix),
            DuplicatePolicy::DropTrainingDuplicates => Cow::Owned(
                prefix
                    .iter()
                    .filter(|edge| !self.training_pairs.contains(&edge.pair()))
                    .copied()
                    .collect(),
            ),
        };
        ReconstructedEdgeSet {
            level,
            training: self.training,
            predicted,
        }
    }

    /// Builds the edge sets for every level in ascending order.
    pub fn reconstruct_all<'s>(
        &'s self,
        ranked: &'s RankedCandidates,
    ) -> impl Iterator<Item = ReconstructedEdgeSet<'s>> + 's {
        ThresholdLevel::all().map(move |level| self.reconstruct(ranked, level))
    }
}
