//! CFI extraction from concrete tree positions
//!
//! The inverse of resolution: walk upward from a node or range boundary,
//! counting positions under the same filter convention the resolver uses,
//! so that `from_range(to_range(parse(s))) == s` for engine-generated
//! CFIs.

use crate::node::{counted_parent, index_child_nodes, index_in_parent, NodeFilter, NodeKind, NodeLike, Slot};
use crate::resolver::{Location, Range};
use crate::types::{Cfi, CfiRange, Segment, Step};

/// The segment addressing `node` from its tree root.
///
/// Each step carries an ID assertion when the element has an `id`
/// attribute. Nodes inside skipped wrappers are addressed as children of
/// the nearest counted ancestor.
pub fn from_element<N: NodeLike>(node: &N, filter: Option<NodeFilter<'_, N>>) -> Segment {
    let mut steps = Vec::new();
    let mut current = node.clone();
    while let Some(parent) = counted_parent(&current, filter) {
        if let Some(index) = index_in_parent(&parent, &current, filter) {
            let mut step = Step::new(index);
            if current.kind() == NodeKind::Element {
                step.id = current.id();
            }
            steps.push(step);
        }
        current = parent;
    }
    steps.reverse();
    Segment::with_steps(steps)
}

/// Segments for several elements at once, one per element. Used to
/// precompute a stable base CFI per structural unit (e.g. spine item).
pub fn from_elements<N: NodeLike>(nodes: &[N], filter: Option<NodeFilter<'_, N>>) -> Vec<Segment> {
    nodes.iter().map(|n| from_element(n, filter)).collect()
}

/// Full step list for one range boundary. Text boundaries get a terminal
/// odd step whose offset counts the surviving characters of the whole
/// run up to the boundary, so offsets are unaffected by skipped wrappers
/// around individual text nodes.
fn location_steps<N: NodeLike>(location: &Location<N>, filter: Option<NodeFilter<'_, N>>) -> Vec<Step> {
    match location {
        Location::Node(el) => from_element(el, filter).steps,
        Location::Text { node, offset } => {
            let Some(parent) = counted_parent(node, filter) else {
                return Vec::new();
            };
            let mut steps = from_element(&parent, filter).steps;
            for (i, slot) in index_child_nodes(&parent, filter).iter().enumerate() {
                let Slot::Run(run) = slot else { continue };
                let Some(pos) = run.iter().position(|n| n.is_same(node)) else {
                    continue;
                };
                let preceding: usize = run[..pos].iter().map(NodeLike::text_len).sum();
                let mut step = Step::new(i as u32 + 1);
                step.offset = Some((preceding + offset) as u32);
                steps.push(step);
                break;
            }
            steps
        }
    }
}

/// Derive a CFI from a range.
///
/// Coinciding boundaries collapse to the single-path form; otherwise the
/// shared parent is the longest common prefix of the two step lists,
/// excluding each terminal step.
pub fn from_range<N: NodeLike>(range: &Range<N>, filter: Option<NodeFilter<'_, N>>) -> Cfi {
    let start = location_steps(&range.start, filter);
    let end = location_steps(&range.end, filter);

    if start == end {
        return Cfi::new(vec![Segment::with_steps(start)]);
    }

    let limit = start.len().saturating_sub(1).min(end.len().saturating_sub(1));
    let mut common = 0;
    while common < limit && start[common] == end[common] {
        common += 1;
    }

    Cfi::with_range(
        vec![Segment::with_steps(start[..common].to_vec())],
        CfiRange {
            start: Segment::with_steps(start[common..].to_vec()),
            end: Segment::with_steps(end[common..].to_vec()),
        },
    )
}
