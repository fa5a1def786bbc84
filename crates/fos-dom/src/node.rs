//! DOM Node
//!
//! Nodes link to each other through `NodeId`s instead of pointers, so the
//! whole tree lives in one arena and can be shared behind a single borrow.

use crate::{DOMTokenList, NodeId};

/// One arena slot. Links are `NodeId::NONE` when absent.
#[derive(Debug)]
pub struct Node {
    pub parent: NodeId,
    pub first_child: NodeId,
    /// Kept so appends don't walk the sibling chain
    pub last_child: NodeId,
    pub prev_sibling: NodeId,
    pub next_sibling: NodeId,
    pub data: NodeData,
}

impl Node {
    fn unlinked(data: NodeData) -> Self {
        let none = NodeId::NONE;
        Self {
            parent: none,
            first_child: none,
            last_child: none,
            prev_sibling: none,
            next_sibling: none,
            data,
        }
    }

    pub fn element(tag: &str) -> Self {
        Self::unlinked(NodeData::Element(ElementData::new(tag)))
    }

    pub fn text(content: &str) -> Self {
        Self::unlinked(NodeData::Text(content.to_owned()))
    }

    /// The arena root every document tree hangs from
    pub fn document() -> Self {
        Self::unlinked(NodeData::Document)
    }

    pub fn as_element(&self) -> Option<&ElementData> {
        if let NodeData::Element(element) = &self.data { Some(element) } else { None }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        if let NodeData::Element(element) = &mut self.data { Some(element) } else { None }
    }

    pub fn as_text(&self) -> Option<&str> {
        if let NodeData::Text(text) = &self.data { Some(text) } else { None }
    }
}

/// What a node holds
#[derive(Debug)]
pub enum NodeData {
    Document,
    Element(ElementData),
    Text(String),
}

/// Tag, attributes and control state of an element
///
/// `id` and `class` are kept out of `attrs`: the id is cached for lookups
/// and classes live in a token list.
#[derive(Debug)]
pub struct ElementData {
    /// Lowercased tag name
    pub tag: String,
    /// Cached id attribute
    pub id: Option<String>,
    /// Class list
    pub classes: DOMTokenList,
    /// Remaining attributes in insertion order
    pub attrs: Vec<Attribute>,
    /// Current value of a form control
    pub value: String,
    /// `display: none` toggle used by show/hide
    pub hidden: bool,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            id: None,
            classes: DOMTokenList::new(),
            attrs: Vec::new(),
            value: String::new(),
            hidden: false,
        }
    }

    /// Attribute value; `id` comes from the cached field
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        if name == "id" {
            return self.id.as_deref();
        }
        self.attrs.iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Check for a (possibly valueless) attribute
    pub fn has_attr(&self, name: &str) -> bool {
        match name {
            "id" => self.id.is_some(),
            "class" => !self.classes.is_empty(),
            _ => self.attrs.iter().any(|a| a.name == name),
        }
    }

    /// Set an attribute, routing `id`, `class` and `value` to their fields
    pub fn set_attr(&mut self, name: &str, value: &str) {
        match name {
            "id" => self.id = Some(value.to_string()),
            "class" => self.classes = DOMTokenList::parse(value),
            "value" => {
                self.value = value.to_string();
                self.upsert(name, value);
            }
            _ => self.upsert(name, value),
        }
    }

    /// Remove an attribute, returning whether it existed
    pub fn remove_attr(&mut self, name: &str) -> bool {
        match name {
            "id" => self.id.take().is_some(),
            "class" => {
                let had = !self.classes.is_empty();
                self.classes = DOMTokenList::new();
                had
            }
            _ => {
                let before = self.attrs.len();
                self.attrs.retain(|a| a.name != name);
                before != self.attrs.len()
            }
        }
    }

    fn upsert(&mut self, name: &str, value: &str) {
        if let Some(attr) = self.attrs.iter_mut().find(|a| a.name == name) {
            attr.value = value.to_string();
            return;
        }
        self.attrs.push(Attribute { name: name.to_string(), value: value.to_string() });
    }
}

/// Name/value pair other than `id` and `class`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}
