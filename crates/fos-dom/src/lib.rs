//! fOS DOM - Document Object Model
//!
//! Arena-based DOM tree with class lists, element visibility, bubbling
//! event dispatch and native form submission.

mod node;
mod tree;
mod classlist;
mod document;
mod events;
mod actions;
pub mod forms;

pub use node::{Node, NodeData, ElementData, Attribute};
pub use tree::{DomTree, Children, Ancestors, Descendants};
pub use classlist::DOMTokenList;
pub use document::{Document, DocumentHandle};
pub use events::{EventType, DomEvent, Listener, ListenerRegistry, dispatch_event};
pub use actions::{click, focus, blur, set_value, request_submit};
pub use forms::{FormData, FormMethod, FormSubmission};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check if this refers to a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Raw arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// DOM errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    #[error("Node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("Node {0:?} cannot be inserted there")]
    HierarchyRequest(NodeId),

    #[error("Expected <{expected}>, found <{found}>")]
    UnexpectedTag { expected: String, found: String },
}
