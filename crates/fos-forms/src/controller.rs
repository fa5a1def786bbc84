//! Form controller
//!
//! Binds to one `<form>` and turns validation results, cancel clicks and
//! submit attempts into [`FormEvent`]s.

use std::fmt;
use std::rc::{Rc, Weak};

use fos_dom::{dispatch_event, Document, DocumentHandle, DomEvent, DomTree, EventType, NodeId};

use crate::validation::{HighlightHook, ShowErrorsHook, SubmitHook};
use crate::{
    bind_context, find_enclosing_group, ErrorReport, FormError, FormEvent, FormMarkup, FormOptions,
    Handler, SubmitStrategy, ValidationEngine, Validator, ValidatorSettings,
};

/// Outcome of a validated submit attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitArbitration {
    /// A nested form widget prevented the submission
    Vetoed,
    /// The caller's strategy ran and returned this value
    Strategy(bool),
    /// The form was submitted natively
    Native,
}

/// Lifecycle controller for a single form
pub struct FormController {
    handler: Rc<dyn Handler>,
    markup: FormMarkup,
    validator: Rc<dyn Validator>,
    submit_strategy: Option<SubmitStrategy>,
}

impl FormController {
    /// Bind a controller to the handler's element.
    ///
    /// Styles buttons, attaches the validation engine, wires the cancel
    /// button and multilingual fields, then publishes the form's initial
    /// validity. Fails if the element is not a `<form>`.
    pub fn bind(
        handler: impl Handler + 'static,
        engine: &dyn ValidationEngine,
        options: FormOptions,
    ) -> Result<Rc<Self>, FormError> {
        let handler: Rc<dyn Handler> = Rc::new(handler);
        let document = handler.document();
        let form = handler.element();

        ensure_form(&document.borrow(), form)?;

        let FormOptions { submit_strategy, markup } = options;
        style_buttons(document.borrow_mut().tree_mut(), form, &markup);

        let controller = Rc::new_cyclic(|this: &Weak<Self>| {
            let settings = Self::validator_settings(this, &markup);
            let validator = engine.attach(&document, form, settings);
            Self { handler, markup, validator, submit_strategy }
        });

        controller.bind_cancel_button(&document);
        controller.bind_multilingual_fields(&document);
        tracing::debug!(
            form = ?form,
            custom_submit = controller.submit_strategy.is_some(),
            "form controller bound"
        );

        controller.emit_validity(controller.validator.as_ref());
        Ok(controller)
    }

    fn validator_settings(this: &Weak<Self>, markup: &FormMarkup) -> ValidatorSettings {
        let highlight: HighlightHook = Rc::new(|tree: &mut DomTree, element: NodeId, class: &str| {
            if let Some(row) = form_row(tree, element) {
                tree.add_class(row, class);
            }
        });
        let unhighlight: HighlightHook = Rc::new(|tree: &mut DomTree, element: NodeId, class: &str| {
            if let Some(row) = form_row(tree, element) {
                tree.remove_class(row, class);
            }
        });

        let ctx = bind_context(this);
        let show_errors: ShowErrorsHook = Rc::new(move |validator: &dyn Validator, report: &ErrorReport| {
            ctx.with(|controller| controller.form_change(validator, report));
        });

        let ctx = bind_context(this);
        let submit_handler: SubmitHook = Rc::new(move |validator: &dyn Validator, form: NodeId| {
            ctx.with(|controller| controller.submit_handler(validator, form))
                .unwrap_or(false)
        });

        ValidatorSettings {
            error_class: markup.error_class.clone(),
            highlight: Some(highlight),
            unhighlight: Some(unhighlight),
            show_errors: Some(show_errors),
            submit_handler: Some(submit_handler),
        }
    }

    fn bind_cancel_button(self: &Rc<Self>, document: &DocumentHandle) {
        let button = document.borrow().tree().find_by_id(self.element(), &self.markup.cancel_button_id);
        let Some(button) = button else { return };

        let ctx = bind_context(&Rc::downgrade(self));
        document.borrow_mut().add_event_listener(button, EventType::Click, move |_: &mut DomEvent| {
            ctx.with(|controller| controller.cancel_form());
        });
    }

    fn bind_multilingual_fields(self: &Rc<Self>, document: &DocumentHandle) {
        let (primaries, extras) = {
            let doc = document.borrow();
            let tree = doc.tree();
            (
                tree.find_by_class(self.element(), &self.markup.multilingual_primary_class),
                tree.find_by_class(self.element(), &self.markup.multilingual_extra_class),
            )
        };

        let mut doc = document.borrow_mut();
        for input in primaries {
            let ctx = bind_context(&Rc::downgrade(self));
            doc.add_event_listener(input, EventType::Focus, move |event: &mut DomEvent| {
                ctx.with(|controller| controller.multilingual_show(event.target));
            });
        }
        for input in extras {
            let ctx = bind_context(&Rc::downgrade(self));
            doc.add_event_listener(input, EventType::Blur, move |event: &mut DomEvent| {
                ctx.with(|controller| controller.multilingual_hide(event.target));
            });
        }
    }

    fn emit_validity(&self, validator: &dyn Validator) {
        let valid = validator.check_form();
        self.handler.emit(FormEvent::validity(valid));
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Field change / error display callback from the validation engine.
    ///
    /// Lets the engine render its errors, then publishes exactly one of
    /// `formValid` or `formInvalid`.
    pub fn form_change(&self, validator: &dyn Validator, report: &ErrorReport) {
        validator.default_show_errors();
        tracing::trace!(errors = report.len(), "form changed");
        self.emit_validity(validator);
    }

    /// Publish `formCanceled`
    pub fn cancel_form(&self) {
        tracing::debug!(form = ?self.element(), "form canceled");
        self.handler.emit(FormEvent::Canceled);
    }

    /// Open the localization popover around a focused primary input
    pub fn multilingual_show(&self, input: NodeId) {
        let document = self.handler.document();
        let mut doc = document.borrow_mut();
        let tree = doc.tree_mut();
        if let Some(group) = find_enclosing_group(tree, input, &self.markup) {
            group.show(tree, &self.markup);
        }
    }

    /// Close the localization popover around a blurred alternate input
    pub fn multilingual_hide(&self, input: NodeId) {
        let document = self.handler.document();
        let mut doc = document.borrow_mut();
        let tree = doc.tree_mut();
        if let Some(group) = find_enclosing_group(tree, input, &self.markup) {
            group.hide(tree, &self.markup);
        }
    }

    /// Decide what happens to a submission that passed validation.
    ///
    /// Nested form widgets get a cancelable `formSubmitRequested` first; if
    /// none prevents it, the caller's strategy runs, or without one the form
    /// is submitted natively. Exactly one of the three outcomes happens.
    pub fn arbitrate_submit(&self, validator: &dyn Validator, form: NodeId) -> SubmitArbitration {
        let document = self.handler.document();
        let widgets = document.borrow().tree().find_by_class(form, &self.markup.form_widget_class);

        let mut event = DomEvent::custom(FormEvent::SubmitRequested.name(), form);
        for widget in widgets {
            event.retarget(widget);
            dispatch_event(&document, &mut event);
        }
        if event.is_default_prevented() {
            tracing::debug!(form = ?form, "submission vetoed by a form widget");
            return SubmitArbitration::Vetoed;
        }

        if let Some(strategy) = &self.submit_strategy {
            let result = strategy(self, validator, form);
            tracing::debug!(form = ?form, result, "submit strategy ran");
            return SubmitArbitration::Strategy(result);
        }

        // Any later submit event must reach the browser without coming back here.
        validator.clear_submit_hook();
        let submitted = document.borrow_mut().submit_form(self.element()).map(|_| ());
        match submitted {
            Ok(()) => tracing::debug!(form = ?form, "native submission"),
            Err(err) => tracing::warn!(%err, form = ?form, "native submission failed"),
        }
        SubmitArbitration::Native
    }

    fn submit_handler(&self, validator: &dyn Validator, form: NodeId) -> bool {
        match self.arbitrate_submit(validator, form) {
            SubmitArbitration::Strategy(proceed) => proceed,
            SubmitArbitration::Vetoed | SubmitArbitration::Native => false,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// The bound form
    pub fn element(&self) -> NodeId {
        self.handler.element()
    }

    pub fn handler(&self) -> &Rc<dyn Handler> {
        &self.handler
    }

    pub fn validator(&self) -> &Rc<dyn Validator> {
        &self.validator
    }

    pub fn markup(&self) -> &FormMarkup {
        &self.markup
    }

    pub fn has_submit_strategy(&self) -> bool {
        self.submit_strategy.is_some()
    }

    /// Current aggregate verdict, without publishing anything
    pub fn is_valid(&self) -> bool {
        self.validator.check_form()
    }
}

impl fmt::Debug for FormController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormController")
            .field("element", &self.element())
            .field("submit_strategy", &self.submit_strategy.is_some())
            .finish()
    }
}

fn ensure_form(doc: &Document, form: NodeId) -> Result<(), FormError> {
    let found = match doc.tree().element(form) {
        Some(element) if element.tag == "form" => return Ok(()),
        Some(element) => format!("<{}>", element.tag),
        None if doc.tree().get(form).is_some() => "a non-element node".to_string(),
        None => "a missing node".to_string(),
    };
    tracing::warn!(element = ?form, %found, "refusing to bind form controller");
    Err(FormError::InvalidBinding { found })
}

fn style_buttons(tree: &mut DomTree, form: NodeId, markup: &FormMarkup) {
    for button in tree.find_by_class(form, &markup.button_class) {
        for class in &markup.styled_button_classes {
            tree.add_class(button, class);
        }
        if !tree.has_attr(button, "role") {
            if let Err(err) = tree.set_attr(button, "role", "button") {
                tracing::warn!(%err, button = ?button, "cannot mark button role");
            }
        }
    }
}

/// The row holding a field: its grandparent element
fn form_row(tree: &DomTree, element: NodeId) -> Option<NodeId> {
    tree.ancestors(element)
        .nth(1)
        .filter(|&row| tree.element(row).is_some())
}
