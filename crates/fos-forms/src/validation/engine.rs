//! Constraint validation engine
//!
//! Validates fields against the rules in their markup, re-validating a
//! field on every `change` and the whole form on `submit`.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use fos_dom::forms::is_form_control;
use fos_dom::{focus, DocumentHandle, DomEvent, DomTree, EventType, NodeId};

use super::{ErrorReport, FieldConstraints, ValidationEngine, Validator, ValidatorSettings};

/// Attaches [`ConstraintValidator`]s, at most one per live form
#[derive(Debug, Default)]
pub struct ConstraintEngine {
    attached: RefCell<Vec<Weak<ConstraintValidator>>>,
}

impl ConstraintEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validator already attached to `form` in `document`, if still alive
    pub fn validator_for(&self, document: &DocumentHandle, form: NodeId) -> Option<Rc<ConstraintValidator>> {
        self.attached
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .find(|v| v.form == form && Rc::ptr_eq(&v.document, document))
    }
}

impl ValidationEngine for ConstraintEngine {
    /// Attaching to a form that already has a live validator returns that
    /// validator unchanged; the new settings are ignored.
    fn attach(
        &self,
        document: &DocumentHandle,
        form: NodeId,
        settings: ValidatorSettings,
    ) -> Rc<dyn Validator> {
        if let Some(existing) = self.validator_for(document, form) {
            tracing::debug!(form = ?form, "validator already attached");
            return existing;
        }

        let validator = Rc::new(ConstraintValidator {
            document: document.clone(),
            form,
            settings: RefCell::new(settings),
            report: RefCell::new(ErrorReport::new()),
            checked: RefCell::new(Vec::new()),
        });
        validator.install();

        let mut attached = self.attached.borrow_mut();
        attached.retain(|v| v.strong_count() > 0);
        attached.push(Rc::downgrade(&validator));
        tracing::debug!(form = ?form, fields = validator.fields().len(), "validator attached");

        validator
    }
}

/// Constraint validator bound to one form
#[derive(Debug)]
pub struct ConstraintValidator {
    document: DocumentHandle,
    form: NodeId,
    settings: RefCell<ValidatorSettings>,
    /// Result of the last validation pass
    report: RefCell<ErrorReport>,
    /// Fields covered by the last validation pass
    checked: RefCell<Vec<NodeId>>,
}

impl ConstraintValidator {
    fn install(self: &Rc<Self>) {
        let mut doc = self.document.borrow_mut();

        let weak = Rc::downgrade(self);
        doc.add_event_listener(self.form, EventType::Change, move |event: &mut DomEvent| {
            if let Some(validator) = weak.upgrade() {
                validator.element_changed(event.target);
            }
        });

        let weak = Rc::downgrade(self);
        doc.add_event_listener(self.form, EventType::Submit, move |event: &mut DomEvent| {
            if let Some(validator) = weak.upgrade() {
                if event.target == validator.form {
                    validator.handle_submit(event);
                }
            }
        });
    }

    /// Fields subject to validation, in document order
    pub fn fields(&self) -> Vec<NodeId> {
        let doc = self.document.borrow();
        Self::collect_fields(doc.tree(), self.form)
    }

    fn collect_fields(tree: &DomTree, form: NodeId) -> Vec<NodeId> {
        tree.descendants(form)
            .filter(|&d| Self::is_validatable(tree, d))
            .collect()
    }

    fn is_validatable(tree: &DomTree, id: NodeId) -> bool {
        if !is_form_control(tree, id) || !tree.has_attr(id, "name") || tree.has_attr(id, "disabled") {
            return false;
        }
        !matches!(
            tree.attr(id, "type").map(str::to_ascii_lowercase).as_deref(),
            Some("submit" | "reset" | "button" | "image" | "hidden")
        )
    }

    fn evaluate(tree: &DomTree, fields: &[NodeId]) -> ErrorReport {
        let mut report = ErrorReport::new();
        for &field in fields {
            let value = tree.value(field).unwrap_or_default();
            let state = FieldConstraints::from_element(tree, field).validate(value);
            if !state.valid() {
                let name = tree.attr(field, "name").unwrap_or_default();
                report.push(name, field, state.validation_message());
            }
        }
        report
    }

    /// Re-validate one field and display the result
    pub fn element_changed(&self, field: NodeId) {
        let report = {
            let doc = self.document.borrow();
            if !Self::is_validatable(doc.tree(), field) || !doc.tree().ancestors(field).any(|a| a == self.form) {
                return;
            }
            Self::evaluate(doc.tree(), &[field])
        };
        tracing::trace!(field = ?field, errors = report.len(), "field validated");

        *self.report.borrow_mut() = report;
        *self.checked.borrow_mut() = vec![field];
        self.show_errors();
    }

    /// Validate every field and display the result. Returns the verdict.
    pub fn validate_form(&self) -> bool {
        let (fields, report) = {
            let doc = self.document.borrow();
            let fields = Self::collect_fields(doc.tree(), self.form);
            let report = Self::evaluate(doc.tree(), &fields);
            (fields, report)
        };
        let valid = report.is_empty();

        *self.report.borrow_mut() = report;
        *self.checked.borrow_mut() = fields;
        self.show_errors();
        valid
    }

    fn show_errors(&self) {
        let hook = self.settings.borrow().show_errors.clone();
        match hook {
            Some(hook) => {
                let report = self.errors();
                hook(self as &dyn Validator, &report);
            }
            None => self.default_show_errors(),
        }
    }

    fn handle_submit(&self, event: &mut DomEvent) {
        if !self.validate_form() {
            event.prevent_default();
            let first_invalid = self.report.borrow().list.first().map(|e| e.element);
            if let Some(field) = first_invalid {
                focus(&self.document, field);
            }
            tracing::debug!(form = ?self.form, "submission blocked by invalid fields");
            return;
        }

        let hook = self.settings.borrow().submit_handler.clone();
        if let Some(hook) = hook {
            if !hook(self as &dyn Validator, self.form) {
                event.prevent_default();
            }
        }
    }

    /// Label displaying the error for `field`, if one was created
    pub fn error_label(&self, field: NodeId) -> Option<NodeId> {
        let doc = self.document.borrow();
        let error_class = self.settings.borrow().error_class.clone();
        find_label(doc.tree(), field, &error_class)
    }
}

impl Validator for ConstraintValidator {
    fn form(&self) -> NodeId {
        self.form
    }

    fn check_form(&self) -> bool {
        let doc = self.document.borrow();
        let fields = Self::collect_fields(doc.tree(), self.form);
        Self::evaluate(doc.tree(), &fields).is_empty()
    }

    fn errors(&self) -> ErrorReport {
        self.report.borrow().clone()
    }

    /// Highlights failing fields and labels them with their message;
    /// unhighlights checked fields that passed and hides their labels.
    fn default_show_errors(&self) {
        let report = self.errors();
        let checked = self.checked.borrow().clone();
        let (error_class, highlight, unhighlight) = {
            let settings = self.settings.borrow();
            (settings.error_class.clone(), settings.highlight.clone(), settings.unhighlight.clone())
        };

        let mut doc = self.document.borrow_mut();
        let tree = doc.tree_mut();

        for error in &report.list {
            match &highlight {
                Some(hook) => hook(&mut *tree, error.element, &error_class),
                None => {
                    tree.add_class(error.element, &error_class);
                }
            }
            show_label(tree, error.element, &error.message, &error_class);
        }

        for field in checked.into_iter().filter(|&f| !report.contains(f)) {
            match &unhighlight {
                Some(hook) => hook(&mut *tree, field, &error_class),
                None => {
                    tree.remove_class(field, &error_class);
                }
            }
            if let Some(label) = find_label(tree, field, &error_class) {
                tree.hide(label);
            }
        }
    }

    fn clear_submit_hook(&self) {
        self.settings.borrow_mut().submit_handler = None;
    }

    fn has_submit_hook(&self) -> bool {
        self.settings.borrow().submit_handler.is_some()
    }
}

fn find_label(tree: &DomTree, field: NodeId, error_class: &str) -> Option<NodeId> {
    let name = tree.attr(field, "name")?;
    let parent = tree.get(field)?.parent;
    tree.children(parent).find(|&c| {
        tree.is_element_named(c, "label")
            && tree.has_class(c, error_class)
            && tree.attr(c, "for") == Some(name)
    })
}

fn show_label(tree: &mut DomTree, field: NodeId, message: &str, error_class: &str) {
    let label = match find_label(tree, field, error_class) {
        Some(label) => label,
        None => {
            let name = tree.attr(field, "name").unwrap_or_default().to_string();
            let label = tree.create_element("label");
            tree.add_class(label, error_class);
            if let Err(err) = tree
                .set_attr(label, "for", &name)
                .and_then(|()| tree.insert_after(field, label))
            {
                tracing::warn!(%err, field = ?field, "cannot place error label");
                return;
            }
            label
        }
    };

    if let Err(err) = tree.set_text(label, message) {
        tracing::warn!(%err, label = ?label, "cannot update error label");
    }
    tree.show(label);
}

#[cfg(test)]
mod tests {
    use super::*;
    use fos_dom::{request_submit, set_value, Document};

    fn form_with_title() -> (DocumentHandle, NodeId, NodeId) {
        let document = Document::default().into_handle();
        let (form, title) = {
            let mut doc = document.borrow_mut();
            let body = doc.body();
            let tree = doc.tree_mut();
            let form = tree.append_element(body, "form").unwrap();
            let row = tree.append_element(form, "div").unwrap();
            let title = tree.append_element(row, "input").unwrap();
            tree.set_attr(title, "name", "title").unwrap();
            tree.set_attr(title, "class", "required").unwrap();
            (form, title)
        };
        (document, form, title)
    }

    #[test]
    fn test_attach_twice_returns_same_validator() {
        let (document, form, _) = form_with_title();
        let engine = ConstraintEngine::new();

        let first = engine.attach(&document, form, ValidatorSettings::default());
        let second = engine.attach(&document, form, ValidatorSettings::default());
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(document.borrow().listeners().count(form, &EventType::Submit), 1);
    }

    #[test]
    fn test_default_show_errors_labels_field() {
        let (document, form, title) = form_with_title();
        let engine = ConstraintEngine::new();
        let validator = engine.attach(&document, form, ValidatorSettings::default());
        assert!(!validator.check_form());

        set_value(&document, title, "").unwrap();
        let concrete = engine.validator_for(&document, form).unwrap();
        let label = concrete.error_label(title).unwrap();
        {
            let doc = document.borrow();
            assert!(doc.tree().has_class(title, "error"));
            assert_eq!(doc.tree().text_content(label), "Please fill out this field.");
            assert!(!doc.tree().is_hidden(label));
        }

        set_value(&document, title, "A Title").unwrap();
        let doc = document.borrow();
        assert!(!doc.tree().has_class(title, "error"));
        assert!(doc.tree().is_hidden(label));
        assert!(validator.errors().is_empty());
    }

    #[test]
    fn test_check_form_has_no_side_effects() {
        let (document, form, title) = form_with_title();
        let engine = ConstraintEngine::new();
        let validator = engine.attach(&document, form, ValidatorSettings::default());

        assert!(!validator.check_form());
        assert!(validator.errors().is_empty());
        assert!(!document.borrow().tree().has_class(title, "error"));
    }

    #[test]
    fn test_invalid_submit_is_blocked_and_focuses_field() {
        let (document, form, title) = form_with_title();
        let engine = ConstraintEngine::new();
        let validator = engine.attach(&document, form, ValidatorSettings::default());

        assert_eq!(request_submit(&document, form), Ok(false));
        assert_eq!(document.borrow().focused(), Some(title));
        assert_eq!(validator.errors().message_for("title"), Some("Please fill out this field."));
        assert!(document.borrow().submissions().is_empty());
    }

    #[test]
    fn test_submit_hook_decides_native_submission() {
        let (document, form, title) = form_with_title();
        document.borrow_mut().tree_mut().set_value(title, "Ready").unwrap();

        let settings = ValidatorSettings {
            submit_handler: Some(Rc::new(|_: &dyn Validator, _: NodeId| false)),
            ..Default::default()
        };
        let validator = ConstraintEngine::new().attach(&document, form, settings);

        assert_eq!(request_submit(&document, form), Ok(false));
        assert!(validator.has_submit_hook());

        validator.clear_submit_hook();
        assert_eq!(request_submit(&document, form), Ok(true));
        assert_eq!(document.borrow().submissions().len(), 1);
    }

    #[test]
    fn test_disabled_and_hidden_fields_skipped() {
        let (document, form, title) = form_with_title();
        {
            let mut doc = document.borrow_mut();
            let tree = doc.tree_mut();
            tree.set_attr(title, "disabled", "").unwrap();
            let hidden = tree.append_element(form, "input").unwrap();
            tree.set_attr(hidden, "name", "csrf").unwrap();
            tree.set_attr(hidden, "type", "hidden").unwrap();
            tree.set_attr(hidden, "class", "required").unwrap();
        }
        let validator = ConstraintEngine::new().attach(&document, form, ValidatorSettings::default());
        assert!(validator.check_form());
    }
}
