//! Line-oriented readers for edge-list and group membership records.

use std::io::BufRead;

use lpgraph_core::{EdgeInsertion, GraphBuilder};
use tracing::debug;

use crate::error::EdgeListError;

/// Counters gathered while reading an edge list.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct EdgeListStats {
    /// Records added as training edges.
    pub edges: usize,
    /// Records repeating an earlier unordered pair.
    pub duplicates: usize,
    /// Blank and comment lines.
    pub skipped_lines: usize,
}

/// Counters gathered while reading a group file.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct GroupStats {
    /// Memberships recorded.
    pub memberships: usize,
    /// Records naming a node absent from the edge list.
    pub unknown_nodes: usize,
}

/// Returns the trimmed record, or `None` for blank and comment lines.
fn record(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    (!trimmed.is_empty() && !trimmed.starts_with(['#', '%'])).then_some(trimmed)
}

/// Reads `source target weight [extra…]` records into `builder`.
///
/// Columns beyond the third are ignored. A repeated unordered pair keeps its
/// first weight.
///
/// # Errors
/// Returns [`EdgeListError`] carrying the line number for unreadable lines,
/// short records, unparsable weights and rejected edges.
///
/// # Examples
/// ```
/// use std::io::Cursor;
/// use lpgraph_core::GraphBuilder;
/// use lpgraph_providers_edgelist::read_edges;
///
/// let mut builder = GraphBuilder::new("demo");
/// let stats = read_edges(&mut builder, Cursor::new("# comment\na b 1\nb c 0.5\nb a 9\n"))?;
/// assert_eq!((stats.edges, stats.duplicates, stats.skipped_lines), (2, 1, 1));
/// # Ok::<(), lpgraph_providers_edgelist::EdgeListError>(())
/// ```
pub fn read_edges<R: BufRead>(
    builder: &mut GraphBuilder,
    reader: R,
) -> Result<EdgeListStats, EdgeListError> {
    let mut stats = EdgeListStats::default();
    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let text = line.map_err(|source| EdgeListError::Read {
            line: line_number,
            source,
        })?;
        let Some(fields) = record(&text) else {
            stats.skipped_lines += 1;
            continue;
        };
        let mut columns = fields.split_whitespace();
        let missing = |field| EdgeListError::MissingField {
            line: line_number,
            field,
        };
        let source = columns.next().ok_or_else(|| missing("source"))?;
        let target = columns.next().ok_or_else(|| missing("target"))?;
        let raw = columns.next().ok_or_else(|| missing("weight"))?;
        let weight: f64 = raw.parse().map_err(|_| EdgeListError::InvalidWeight {
            line: line_number,
            raw: raw.to_owned(),
        })?;

        let insertion = builder
            .add_edge(source, target, weight)
            .map_err(|error| EdgeListError::Record {
                line: line_number,
                source: error,
            })?;
        match insertion {
            EdgeInsertion::Added => stats.edges += 1,
            EdgeInsertion::Duplicate => {
                stats.duplicates += 1;
                debug!(
                    line = line_number,
                    source, target, "repeated pair ignored; first occurrence kept"
                );
            }
        }
    }
    Ok(stats)
}

/// Reads `node group [group…]` records into `builder`.
///
/// The builder is marked as carrying membership data even when the file
/// holds no records. Nodes that did not appear in the edge list are skipped.
///
/// # Errors
/// Returns [`EdgeListError::Read`] for unreadable lines and
/// [`EdgeListError::MissingField`] for a record without any group.
pub fn read_groups<R: BufRead>(
    builder: &mut GraphBuilder,
    reader: R,
) -> Result<GroupStats, EdgeListError> {
    builder.enable_groups();
    let mut stats = GroupStats::default();
    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let text = line.map_err(|source| EdgeListError::Read {
            line: line_number,
            source,
        })?;
        let Some(fields) = record(&text) else {
            continue;
        };
        let mut columns = fields.split_whitespace();
        let (Some(node), Some(first)) = (columns.next(), columns.next()) else {
            return Err(EdgeListError::MissingField {
                line: line_number,
                field: "group",
            });
        };
        if !builder.add_membership(node, first) {
            stats.unknown_nodes += 1;
            debug!(line = line_number, node, "group record names an unknown node; skipped");
            continue;
        }
        stats.memberships += 1;
        for group in columns {
            builder.add_membership(node, group);
            stats.memberships += 1;
        }
    }
    Ok(stats)
}
