//! CFI resolution against a concrete tree
//!
//! Resolution descends by ordinal position among counted children,
//! using ID assertions to recover when the ordinal target has drifted
//! (CFI producers historically disagree about which of the two is the
//! "true" pointer, so either is tolerated).

use thiserror::Error;
use tracing::debug;

use crate::node::{
    apply_filter, index_child_nodes, slot_at, surviving_children, FilterAction, NodeFilter,
    NodeKind, NodeLike, Slot,
};
use crate::types::{Cfi, Segment, Step};

/// Resolution failure, generic over the payload a partial resolution
/// still produces (a node for [`to_element`], a range for [`to_range`]).
#[derive(Debug, Error)]
pub enum ResolveError<T> {
    /// Ordinal out of range with no usable ID fallback. The hard failure:
    /// callers should treat the location as unavailable.
    #[error("no node at step /{index}")]
    NotFound { index: u32 },

    /// An ID assertion was present but matched nothing; the ordinal
    /// descent still succeeded. A diagnostic condition: callers should
    /// proceed with the carried result.
    #[error("id assertion [{expected}] did not match the resolved node")]
    PartiallyResolved { resolved: T, expected: String },
}

/// A resolved point: an element itself, or a character offset within one
/// physical text node.
#[derive(Debug, Clone)]
pub enum Location<N> {
    Node(N),
    Text { node: N, offset: usize },
}

impl<N: NodeLike> Location<N> {
    pub fn node(&self) -> &N {
        match self {
            Location::Node(node) => node,
            Location::Text { node, .. } => node,
        }
    }

    pub fn is_same(&self, other: &Self) -> bool {
        match (self, other) {
            (Location::Node(a), Location::Node(b)) => a.is_same(b),
            (
                Location::Text { node: a, offset: x },
                Location::Text { node: b, offset: y },
            ) => a.is_same(b) && x == y,
            _ => false,
        }
    }
}

/// A span between two resolved points. Collapsed when start and end
/// coincide.
#[derive(Debug, Clone)]
pub struct Range<N> {
    pub start: Location<N>,
    pub end: Location<N>,
}

#[derive(PartialEq)]
enum Phase {
    Before,
    Inside,
    Done,
}

impl<N: NodeLike> Range<N> {
    pub fn is_collapsed(&self) -> bool {
        self.start.is_same(&self.end)
    }

    /// The character data spanned by this range, honoring the filter the
    /// range was resolved under: rejected subtrees contribute nothing,
    /// skipped wrappers contribute their surviving text in place.
    pub fn text(&self, filter: Option<NodeFilter<'_, N>>) -> String {
        let mut out = String::new();
        let Some(ancestor) = common_ancestor(self.start.node(), self.end.node()) else {
            return out;
        };
        let mut phase = Phase::Before;
        collect(&ancestor, self, filter, &mut phase, &mut out);
        out
    }
}

fn common_ancestor<N: NodeLike>(a: &N, b: &N) -> Option<N> {
    let mut chain = vec![a.clone()];
    let mut cur = a.clone();
    while let Some(parent) = cur.parent() {
        chain.push(parent.clone());
        cur = parent;
    }
    let mut candidate = b.clone();
    loop {
        if chain.iter().any(|n| n.is_same(&candidate)) {
            return Some(candidate);
        }
        candidate = candidate.parent()?;
    }
}

fn collect<N: NodeLike>(
    node: &N,
    range: &Range<N>,
    filter: Option<NodeFilter<'_, N>>,
    phase: &mut Phase,
    out: &mut String,
) {
    if *phase == Phase::Done {
        return;
    }
    if let Location::Node(el) = &range.start {
        if *phase == Phase::Before && node.is_same(el) {
            *phase = Phase::Inside;
        }
    }
    match node.kind() {
        NodeKind::Text => {
            let text = node.text().unwrap_or_default();
            let mut from = 0;
            if let Location::Text { node: n, offset } = &range.start {
                if node.is_same(n) {
                    *phase = Phase::Inside;
                    from = *offset;
                }
            }
            let mut to = None;
            if let Location::Text { node: n, offset } = &range.end {
                if node.is_same(n) {
                    to = Some(*offset);
                }
            }
            if *phase == Phase::Inside {
                let upto = to.unwrap_or_else(|| text.chars().count());
                out.extend(text.chars().skip(from).take(upto.saturating_sub(from)));
            }
            if to.is_some() {
                *phase = Phase::Done;
            }
        }
        NodeKind::Element => {
            for child in surviving_children(node, filter) {
                collect(&child, range, filter, phase, out);
                if *phase == Phase::Done {
                    break;
                }
            }
            if let Location::Node(el) = &range.end {
                if node.is_same(el) {
                    *phase = Phase::Done;
                }
            }
        }
        NodeKind::Other => {}
    }
}

/// Resolve one step against `node`'s indexed children. `Err` carries the
/// index of the failing step.
fn step_down<N: NodeLike>(
    root: &N,
    node: &N,
    step: &Step,
    filter: Option<NodeFilter<'_, N>>,
    mismatch: &mut Option<String>,
) -> Result<Slot<N>, u32> {
    let slots = index_child_nodes(node, filter);
    match slot_at(&slots, step.index) {
        Some(Slot::Run(run)) => Ok(Slot::Run(run.clone())),
        Some(Slot::Element(el)) => {
            let Some(id) = &step.id else {
                return Ok(Slot::Element(el.clone()));
            };
            if el.id().as_deref() == Some(id) {
                return Ok(Slot::Element(el.clone()));
            }
            if let Some(found) = find_by_id(root, id, filter) {
                debug!(id = %id, index = step.index, "id assertion mismatch, following by-id lookup");
                return Ok(Slot::Element(found));
            }
            debug!(id = %id, index = step.index, "id assertion matched nothing, keeping ordinal result");
            mismatch.get_or_insert_with(|| id.clone());
            Ok(Slot::Element(el.clone()))
        }
        None => {
            if let Some(id) = &step.id {
                if let Some(found) = find_by_id(root, id, filter) {
                    debug!(id = %id, index = step.index, "ordinal out of range, recovered by id");
                    return Ok(Slot::Element(found));
                }
            }
            Err(step.index)
        }
    }
}

/// Depth-first search for an element by id. Rejected subtrees are
/// invisible to resolution.
fn find_by_id<N: NodeLike>(node: &N, id: &str, filter: Option<NodeFilter<'_, N>>) -> Option<N> {
    if apply_filter(node, filter) == FilterAction::RejectSubtree {
        return None;
    }
    if node.kind() == NodeKind::Element && node.id().as_deref() == Some(id) {
        return Some(node.clone());
    }
    for child in node.children() {
        if let Some(found) = find_by_id(&child, id, filter) {
            return Some(found);
        }
    }
    None
}

/// Resolve a segment of element steps to the node it addresses.
///
/// Odd step indices address character data, not elements, so a segment
/// containing one resolves as `NotFound` here; use [`to_range`] for text
/// positions.
pub fn to_element<N: NodeLike>(
    root: &N,
    segment: &Segment,
    filter: Option<NodeFilter<'_, N>>,
) -> Result<N, ResolveError<N>> {
    let mut mismatch = None;
    let mut node = root.clone();
    for step in &segment.steps {
        match step_down(root, &node, step, filter, &mut mismatch) {
            Ok(Slot::Element(el)) => node = el,
            Ok(Slot::Run(_)) => return Err(ResolveError::NotFound { index: step.index }),
            Err(index) => return Err(ResolveError::NotFound { index }),
        }
    }
    match mismatch {
        None => Ok(node),
        Some(expected) => Err(ResolveError::PartiallyResolved {
            resolved: node,
            expected,
        }),
    }
}

/// Map a logical offset into a run of physical text nodes.
fn locate_in_run<N: NodeLike>(parent: &N, run: &[N], offset: usize) -> Location<N> {
    let mut acc = 0;
    for node in run {
        let len = node.text_len();
        if offset <= acc + len {
            return Location::Text {
                node: node.clone(),
                offset: offset - acc,
            };
        }
        acc += len;
    }
    // past the end of the run: clamp to the final node, or anchor an
    // empty run to its element
    match run.last() {
        Some(last) => Location::Text {
            node: last.clone(),
            offset: last.text_len(),
        },
        None => Location::Node(parent.clone()),
    }
}

fn resolve_location<N: NodeLike>(
    root: &N,
    steps: &[Step],
    filter: Option<NodeFilter<'_, N>>,
    mismatch: &mut Option<String>,
) -> Result<Location<N>, u32> {
    let mut node = root.clone();
    for (i, step) in steps.iter().enumerate() {
        match step_down(root, &node, step, filter, mismatch)? {
            Slot::Element(el) => node = el,
            Slot::Run(run) => {
                // character data is terminal
                if i + 1 != steps.len() {
                    return Err(step.index);
                }
                let offset = step.offset.unwrap_or(0) as usize;
                return Ok(locate_in_run(&node, &run, offset));
            }
        }
    }
    Ok(Location::Node(node))
}

/// Resolve a CFI's final segment against `root` into a [`Range`].
///
/// Point CFIs yield a collapsed range. Earlier segments address other
/// trees across indirections; which tree each one targets is the
/// caller's decision, so only the last segment is resolved here.
pub fn to_range<N: NodeLike>(
    root: &N,
    cfi: &Cfi,
    filter: Option<NodeFilter<'_, N>>,
) -> Result<Range<N>, ResolveError<Range<N>>> {
    let mut mismatch = None;

    let start_path = cfi.collapse(false);
    let end_path = cfi.collapse(true);
    let start_steps = start_path.segments.last().map_or(&[][..], |s| s.steps.as_slice());
    let end_steps = end_path.segments.last().map_or(&[][..], |s| s.steps.as_slice());

    let start = resolve_location(root, start_steps, filter, &mut mismatch)
        .map_err(|index| ResolveError::NotFound { index })?;
    let end = resolve_location(root, end_steps, filter, &mut mismatch)
        .map_err(|index| ResolveError::NotFound { index })?;

    let range = Range { start, end };
    match mismatch {
        None => Ok(range),
        Some(expected) => Err(ResolveError::PartiallyResolved {
            resolved: range,
            expected,
        }),
    }
}
