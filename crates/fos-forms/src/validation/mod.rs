//! Validation engine capability
//!
//! A controller never evaluates field rules itself. It attaches an engine
//! to its form through [`ValidationEngine`], hands it hooks in
//! [`ValidatorSettings`], and afterwards only asks the resulting
//! [`Validator`] for an aggregate verdict.

mod constraints;
mod engine;

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use fos_dom::{DocumentHandle, DomTree, NodeId};

pub use constraints::{FieldConstraints, InputKind, ValidityState};
pub use engine::{ConstraintEngine, ConstraintValidator};

/// One failing field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub message: String,
    pub element: NodeId,
}

/// Errors found by the last validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorReport {
    /// Field name to message
    pub map: BTreeMap<String, String>,
    /// Failing fields in document order
    pub list: Vec<FieldError>,
}

impl ErrorReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: &str, element: NodeId, message: impl Into<String>) {
        let message = message.into();
        self.map.entry(name.to_string()).or_insert_with(|| message.clone());
        self.list.push(FieldError { message, element });
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn message_for(&self, name: &str) -> Option<&str> {
        self.map.get(name).map(String::as_str)
    }

    pub fn contains(&self, element: NodeId) -> bool {
        self.list.iter().any(|e| e.element == element)
    }
}

/// Marks or clears a field's error state. Receives the class to apply.
///
/// Runs while the engine holds the document, so it works on the tree it is
/// given rather than on a document handle.
pub type HighlightHook = Rc<dyn Fn(&mut DomTree, NodeId, &str)>;

/// Called whenever the engine wants errors displayed
pub type ShowErrorsHook = Rc<dyn Fn(&dyn Validator, &ErrorReport)>;

/// Called for a valid submission. Returns whether that submission may
/// proceed natively.
pub type SubmitHook = Rc<dyn Fn(&dyn Validator, NodeId) -> bool>;

/// Hooks and options handed to an engine on attach
#[derive(Clone)]
pub struct ValidatorSettings {
    pub error_class: String,
    pub highlight: Option<HighlightHook>,
    pub unhighlight: Option<HighlightHook>,
    pub show_errors: Option<ShowErrorsHook>,
    pub submit_handler: Option<SubmitHook>,
}

impl Default for ValidatorSettings {
    fn default() -> Self {
        Self {
            error_class: "error".to_string(),
            highlight: None,
            unhighlight: None,
            show_errors: None,
            submit_handler: None,
        }
    }
}

impl fmt::Debug for ValidatorSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorSettings")
            .field("error_class", &self.error_class)
            .field("highlight", &self.highlight.is_some())
            .field("unhighlight", &self.unhighlight.is_some())
            .field("show_errors", &self.show_errors.is_some())
            .field("submit_handler", &self.submit_handler.is_some())
            .finish()
    }
}

/// A validation engine attached to one form
pub trait Validator {
    /// Form this validator is attached to
    fn form(&self) -> NodeId;

    /// Whether every field currently passes. Displays nothing.
    fn check_form(&self) -> bool;

    /// Errors found by the last validation pass
    fn errors(&self) -> ErrorReport;

    /// Render the last validation pass with the engine's own presentation
    fn default_show_errors(&self);

    /// Forget the submit hook so the next submission goes through natively
    fn clear_submit_hook(&self);

    fn has_submit_hook(&self) -> bool;
}

/// Attaches validators to forms
pub trait ValidationEngine {
    fn attach(
        &self,
        document: &DocumentHandle,
        form: NodeId,
        settings: ValidatorSettings,
    ) -> Rc<dyn Validator>;
}
