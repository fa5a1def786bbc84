//! Document
//!
//! Owner of a DOM tree plus the page state that event dispatch and form
//! submission need.

use std::cell::RefCell;
use std::rc::Rc;

use crate::{DomError, DomEvent, DomTree, EventType, FormSubmission, ListenerRegistry, NodeId};

/// Shared, single-threaded handle to a document.
///
/// Controllers and listeners hold clones of this handle; borrows are kept
/// short so that event dispatch can re-enter the document.
pub type DocumentHandle = Rc<RefCell<Document>>;

/// A page: its tree, listeners, focus and the forms it has submitted
#[derive(Debug)]
pub struct Document {
    tree: DomTree,
    listeners: ListenerRegistry,
    url: String,
    /// `<html>`, `<head>` and `<body>`, in that order
    skeleton: [NodeId; 3],
    focused: Option<NodeId>,
    /// Native form submissions, oldest first
    submissions: Vec<FormSubmission>,
}

impl Document {
    /// Document at `url` with an empty `<html><head></head><body></body></html>`
    pub fn new(url: &str) -> Self {
        let mut tree = DomTree::new();
        let [html, head, body] = ["html", "head", "body"].map(|tag| tree.create_element(tag));
        tree.link_last(tree.root(), html);
        tree.link_last(html, head);
        tree.link_last(html, body);

        Self {
            tree,
            listeners: ListenerRegistry::new(),
            url: url.to_owned(),
            skeleton: [html, head, body],
            focused: None,
            submissions: Vec::new(),
        }
    }

    pub fn into_handle(self) -> DocumentHandle {
        Rc::new(RefCell::new(self))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The `<html>` element
    pub fn document_element(&self) -> NodeId {
        self.skeleton[0]
    }

    pub fn head(&self) -> NodeId {
        self.skeleton[1]
    }

    pub fn body(&self) -> NodeId {
        self.skeleton[2]
    }

    /// First element in tree order whose id is `id`
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree.find_by_id(self.tree.root(), id)
    }

    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    /// Register a listener on `node`
    pub fn add_event_listener(
        &mut self,
        node: NodeId,
        event_type: EventType,
        listener: impl Fn(&mut DomEvent) + 'static,
    ) {
        self.listeners.add(node, event_type, Rc::new(listener));
    }

    /// Element currently holding focus
    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    pub(crate) fn set_focused(&mut self, node: Option<NodeId>) {
        self.focused = node;
    }

    /// Submit `form` without firing a submit event.
    ///
    /// Serializes the form's controls and records the submission.
    pub fn submit_form(&mut self, form: NodeId) -> Result<&FormSubmission, DomError> {
        let submission = FormSubmission::from_form(&self.tree, form)?;
        tracing::debug!(
            action = %submission.action,
            method = ?submission.method,
            fields = submission.data.len(),
            "native form submission"
        );
        self.submissions.push(submission);
        Ok(&self.submissions[self.submissions.len() - 1])
    }

    /// Native submissions performed so far
    pub fn submissions(&self) -> &[FormSubmission] {
        &self.submissions
    }

    /// Drain the submission log
    pub fn take_submissions(&mut self) -> Vec<FormSubmission> {
        std::mem::take(&mut self.submissions)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}
