//! Duck-typed tree access
//!
//! The engine never touches a concrete document tree directly; it sees
//! trees through [`NodeLike`], one adapter per host representation (see
//! the `roxmltree` adapter in this crate). All character offsets and
//! lengths are counted in Unicode scalar values.

/// Node classification as seen by the engine.
///
/// `Other` covers comments and processing instructions: they are invisible
/// to CFI indexing and do not split runs of character data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
    Other,
}

/// Decision returned by a node filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterAction {
    /// Count the node normally
    Accept,
    /// Exclude the node and its entire subtree from counting
    RejectSubtree,
    /// Exclude the node itself but count its children in its place
    SkipSelf,
}

/// Caller-supplied subtree filter.
pub type NodeFilter<'a, N> = &'a dyn Fn(&N) -> FilterAction;

/// Minimal tree interface the engine resolves against.
///
/// `parent` must return `None` at the document element: the engine
/// addresses everything relative to the root node the caller supplies,
/// and extraction stops climbing when `parent` runs out.
pub trait NodeLike: Clone {
    fn kind(&self) -> NodeKind;

    /// All child nodes, in document order
    fn children(&self) -> Vec<Self>;

    fn parent(&self) -> Option<Self>;

    /// The `id` attribute, for element nodes that carry one
    fn id(&self) -> Option<String>;

    /// Character data content, for text nodes
    fn text(&self) -> Option<String>;

    /// Node identity (not structural equality)
    fn is_same(&self, other: &Self) -> bool;

    /// Character count of this node's text
    fn text_len(&self) -> usize {
        self.text().map(|t| t.chars().count()).unwrap_or(0)
    }
}

pub(crate) fn apply_filter<N: NodeLike>(node: &N, filter: Option<NodeFilter<'_, N>>) -> FilterAction {
    filter.map_or(FilterAction::Accept, |f| f(node))
}

/// Children surviving the filter: rejected subtrees vanish entirely,
/// skipped nodes are replaced in place by their own surviving children.
pub(crate) fn surviving_children<N: NodeLike>(
    node: &N,
    filter: Option<NodeFilter<'_, N>>,
) -> Vec<N> {
    let mut out = Vec::new();
    for child in node.children() {
        match apply_filter(&child, filter) {
            FilterAction::Accept => out.push(child),
            FilterAction::RejectSubtree => {}
            FilterAction::SkipSelf => out.extend(surviving_children(&child, filter)),
        }
    }
    out
}

/// One CFI-indexable child position.
///
/// A node's countable children form the alternating list
/// `[run, element, run, element, ..., run]` where each run is a possibly
/// empty sequence of adjacent character-data nodes. CFI index `i`
/// addresses position `i - 1`, so `/2` is the first element child and
/// `/1` the character data before it.
#[derive(Debug, Clone)]
pub(crate) enum Slot<N> {
    Element(N),
    Run(Vec<N>),
}

pub(crate) fn index_child_nodes<N: NodeLike>(
    node: &N,
    filter: Option<NodeFilter<'_, N>>,
) -> Vec<Slot<N>> {
    let mut slots = vec![Slot::Run(Vec::new())];
    for child in surviving_children(node, filter) {
        match child.kind() {
            NodeKind::Element => {
                slots.push(Slot::Element(child));
                slots.push(Slot::Run(Vec::new()));
            }
            NodeKind::Text => {
                if let Some(Slot::Run(run)) = slots.last_mut() {
                    run.push(child);
                }
            }
            NodeKind::Other => {}
        }
    }
    slots
}

/// The slot a CFI step index addresses. Index `0` never resolves.
pub(crate) fn slot_at<N>(slots: &[Slot<N>], index: u32) -> Option<&Slot<N>> {
    slots.get((index as usize).checked_sub(1)?)
}

/// CFI index of `child` among `parent`'s indexed children: the slot
/// holding the element, or the run containing the text node.
pub(crate) fn index_in_parent<N: NodeLike>(
    parent: &N,
    child: &N,
    filter: Option<NodeFilter<'_, N>>,
) -> Option<u32> {
    for (i, slot) in index_child_nodes(parent, filter).iter().enumerate() {
        let found = match slot {
            Slot::Element(el) => el.is_same(child),
            Slot::Run(run) => run.iter().any(|n| n.is_same(child)),
        };
        if found {
            return Some(i as u32 + 1);
        }
    }
    None
}

/// Nearest ancestor that is itself counted: skipped wrappers are
/// transparent, so a node physically inside one belongs to the closest
/// non-skipped ancestor's child list. `None` once the root is reached.
pub(crate) fn counted_parent<N: NodeLike>(
    node: &N,
    filter: Option<NodeFilter<'_, N>>,
) -> Option<N> {
    let mut parent = node.parent()?;
    while apply_filter(&parent, filter) == FilterAction::SkipSelf {
        parent = parent.parent()?;
    }
    Some(parent)
}
