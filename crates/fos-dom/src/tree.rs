//! DOM Tree (arena-based allocation)

use crate::{DomError, ElementData, Node, NodeId};

/// Arena-based DOM tree
///
/// Slot 0 always holds the document node.
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self { nodes: vec![Node::document()] }
    }

    /// Document node
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Number of nodes in the tree, document node included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when only the document node exists
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(Node::element(tag))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(Node::text(text))
    }

    /// Element data, if `id` is an element
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(Node::as_element)
    }

    /// Mutable element data, if `id` is an element
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(Node::as_element_mut)
    }

    /// Element data or the reason it is unavailable
    pub fn try_element(&self, id: NodeId) -> Result<&ElementData, DomError> {
        let node = self.get(id).ok_or(DomError::NodeNotFound(id))?;
        node.as_element().ok_or(DomError::NotAnElement(id))
    }

    fn try_element_mut(&mut self, id: NodeId) -> Result<&mut ElementData, DomError> {
        let node = self.get_mut(id).ok_or(DomError::NodeNotFound(id))?;
        node.as_element_mut().ok_or(DomError::NotAnElement(id))
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    /// Append `child` as the last child of `parent`, moving it if attached
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check_insertable(parent, child)?;
        self.detach(child);
        self.link_last(parent, child);
        Ok(())
    }

    /// Create an element and append it to `parent`
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> Result<NodeId, DomError> {
        let child = self.create_element(tag);
        self.append_child(parent, child)?;
        Ok(child)
    }

    /// Insert `node` directly after `reference` under the same parent
    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) -> Result<(), DomError> {
        let parent = self.get(reference).ok_or(DomError::NodeNotFound(reference))?.parent;
        if !parent.is_valid() || node == reference {
            return Err(DomError::HierarchyRequest(node));
        }
        self.check_insertable(parent, node)?;
        self.detach(node);

        let next = self.nodes[reference.index()].next_sibling;
        {
            let n = &mut self.nodes[node.index()];
            n.parent = parent;
            n.prev_sibling = reference;
            n.next_sibling = next;
        }
        self.nodes[reference.index()].next_sibling = node;
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = node;
        } else {
            self.nodes[parent.index()].last_child = node;
        }
        Ok(())
    }

    /// Unlink a node from its parent. Detached nodes are left untouched.
    pub fn detach(&mut self, child: NodeId) {
        let Some(node) = self.get(child) else { return };
        let (parent, prev, next) = (node.parent, node.prev_sibling, node.next_sibling);
        if !parent.is_valid() {
            return;
        }

        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else {
            self.nodes[parent.index()].last_child = prev;
        }

        let n = &mut self.nodes[child.index()];
        n.parent = NodeId::NONE;
        n.prev_sibling = NodeId::NONE;
        n.next_sibling = NodeId::NONE;
    }

    /// Both ids must come from this tree's allocator.
    pub(crate) fn link_last(&mut self, parent: NodeId, child: NodeId) {
        let last = self.nodes[parent.index()].last_child;
        {
            let c = &mut self.nodes[child.index()];
            c.parent = parent;
            c.prev_sibling = last;
            c.next_sibling = NodeId::NONE;
        }
        if last.is_valid() {
            self.nodes[last.index()].next_sibling = child;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
        self.nodes[parent.index()].last_child = child;
    }

    fn check_insertable(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.get(parent).ok_or(DomError::NodeNotFound(parent))?;
        self.get(child).ok_or(DomError::NodeNotFound(child))?;
        if child == NodeId::ROOT || child == parent || self.ancestors(parent).any(|a| a == child) {
            return Err(DomError::HierarchyRequest(child));
        }
        Ok(())
    }

    /// Direct children in order
    pub fn children(&self, id: NodeId) -> Children<'_> {
        let next = self.get(id).map_or(NodeId::NONE, |n| n.first_child);
        Children { tree: self, next }
    }

    /// Strict ancestors, nearest first
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        let next = self.get(id).map_or(NodeId::NONE, |n| n.parent);
        Ancestors { tree: self, next }
    }

    /// Strict descendants in document order
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let next = self.get(id).map_or(NodeId::NONE, |n| n.first_child);
        Descendants { tree: self, root: id, next }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Tag name of an element
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag.as_str())
    }

    /// Check whether `id` is an element with the given tag
    pub fn is_element_named(&self, id: NodeId, tag: &str) -> bool {
        self.element(id).is_some_and(|e| e.tag.eq_ignore_ascii_case(tag))
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).is_some_and(|e| e.classes.contains(class))
    }

    /// Nearest strict ancestor carrying `class`
    pub fn closest_with_class(&self, id: NodeId, class: &str) -> Option<NodeId> {
        self.ancestors(id).find(|&a| self.has_class(a, class))
    }

    /// Descendants of `root` carrying `class`, in document order
    pub fn find_by_class(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(root).filter(|&d| self.has_class(d, class)).collect()
    }

    /// First descendant of `root` whose id matches
    pub fn find_by_id(&self, root: NodeId, id: &str) -> Option<NodeId> {
        self.descendants(root)
            .find(|&d| self.element(d).is_some_and(|e| e.id.as_deref() == Some(id)))
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.get_attr(name))
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.element(id).is_some_and(|e| e.has_attr(name))
    }

    /// Current control value
    pub fn value(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.value.as_str())
    }

    pub fn is_hidden(&self, id: NodeId) -> bool {
        self.element(id).is_some_and(|e| e.hidden)
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .filter_map(|d| self.get(d).and_then(Node::as_text))
            .collect()
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Add a class; returns `true` if the class list changed
    pub fn add_class(&mut self, id: NodeId, class: &str) -> bool {
        self.element_mut(id).is_some_and(|e| e.classes.add(class))
    }

    /// Remove a class; returns `true` if the class list changed
    pub fn remove_class(&mut self, id: NodeId, class: &str) -> bool {
        self.element_mut(id).is_some_and(|e| e.classes.remove(class))
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.try_element_mut(id)?.set_attr(name, value);
        Ok(())
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> Result<bool, DomError> {
        Ok(self.try_element_mut(id)?.remove_attr(name))
    }

    pub fn set_value(&mut self, id: NodeId, value: &str) -> Result<(), DomError> {
        self.try_element_mut(id)?.value = value.to_string();
        Ok(())
    }

    pub fn show(&mut self, id: NodeId) {
        if let Some(e) = self.element_mut(id) {
            e.hidden = false;
        }
    }

    pub fn hide(&mut self, id: NodeId) {
        if let Some(e) = self.element_mut(id) {
            e.hidden = true;
        }
    }

    /// Replace all children with a single text node
    pub fn set_text(&mut self, id: NodeId, text: &str) -> Result<(), DomError> {
        self.try_element(id)?;
        let children: Vec<NodeId> = self.children(id).collect();
        for child in children {
            self.detach(child);
        }
        let text_node = self.create_text(text);
        self.link_last(id, text_node);
        Ok(())
    }
}

/// Iterator over direct children
#[derive(Debug)]
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next;
        self.next = self.tree.get(current)?.next_sibling;
        Some(current)
    }
}

/// Iterator over strict ancestors
#[derive(Debug)]
pub struct Ancestors<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next;
        self.next = self.tree.get(current)?.parent;
        Some(current)
    }
}

/// Pre-order iterator over strict descendants
#[derive(Debug)]
pub struct Descendants<'a> {
    tree: &'a DomTree,
    root: NodeId,
    next: NodeId,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next;
        let node = self.tree.get(current)?;

        self.next = if node.first_child.is_valid() {
            node.first_child
        } else {
            let mut cursor = current;
            loop {
                if cursor == self.root {
                    break NodeId::NONE;
                }
                let Some(n) = self.tree.get(cursor) else { break NodeId::NONE };
                if n.next_sibling.is_valid() {
                    break n.next_sibling;
                }
                cursor = n.parent;
            }
        };
        Some(current)
    }
}
