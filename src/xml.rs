//! [`NodeLike`] adapter for `roxmltree`
//!
//! Lets the engine resolve CFIs directly against parsed XML/XHTML
//! documents. The document node is hidden: `parent` ends at the root
//! element, so paths are relative to it, and callers pass
//! `doc.root_element()` as the resolution root. CDATA sections surface
//! as text nodes; comments and processing instructions map to
//! [`NodeKind::Other`].

use roxmltree::{Node, NodeType};

use crate::node::{NodeKind, NodeLike};

impl<'a, 'input> NodeLike for Node<'a, 'input> {
    fn kind(&self) -> NodeKind {
        match self.node_type() {
            NodeType::Element => NodeKind::Element,
            NodeType::Text => NodeKind::Text,
            _ => NodeKind::Other,
        }
    }

    fn children(&self) -> Vec<Self> {
        Node::children(self).collect()
    }

    fn parent(&self) -> Option<Self> {
        Node::parent(self).filter(|p| p.node_type() != NodeType::Root)
    }

    fn id(&self) -> Option<String> {
        self.attribute("id").map(str::to_string)
    }

    fn text(&self) -> Option<String> {
        match self.node_type() {
            NodeType::Text => Node::text(self).map(str::to_string),
            _ => None,
        }
    }

    fn is_same(&self, other: &Self) -> bool {
        self == other
    }
}
