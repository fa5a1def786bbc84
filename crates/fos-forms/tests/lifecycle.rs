//! Form lifecycle tests
//!
//! Drives a bound controller through a real document and the constraint
//! engine: bind, field changes, cancel, multilingual fields and submission.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use fos_dom::{blur, click, focus, request_submit, set_value, Document, DocumentHandle, DomEvent, EventType, NodeId};
use fos_forms::{
    ConstraintEngine, FormController, FormError, FormEvent, FormMarkup, FormOptions, Handler, HandlerCore,
};

/// Editing form used by every test
struct Fixture {
    document: DocumentHandle,
    form: NodeId,
    row: NodeId,
    title: NodeId,
    cancel: NodeId,
    save: NodeId,
    widget: NodeId,
    container: NodeId,
    popover: NodeId,
    primary: NodeId,
    extra: NodeId,
}

impl Fixture {
    /// ```text
    /// <form action="/submission/save">
    ///   <div class="row"><div><input name="title" class="required"></div></div>
    ///   <div class="pkp_controllers_form_localization_container">
    ///     <input name="abstract[en]" class="multilingual_primary">
    ///     <div class="pkp_controllers_form_localization_popover" hidden>
    ///       <input name="abstract[fr]" class="multilingual_extra">
    ///     </div>
    ///   </div>
    ///   <div class="formWidget"></div>
    ///   <button id="cancelFormButton">
    ///   <button class="button" type="submit">
    /// </form>
    /// ```
    fn new(title: &str) -> Self {
        let markup = FormMarkup::default();
        let document = Document::new("https://journal.example/submission").into_handle();
        let mut doc = document.borrow_mut();
        let body = doc.body();
        let tree = doc.tree_mut();

        let form = tree.append_element(body, "form").unwrap();
        tree.set_attr(form, "action", "/submission/save").unwrap();

        let row = tree.append_element(form, "div").unwrap();
        tree.add_class(row, "row");
        let cell = tree.append_element(row, "div").unwrap();
        let title_input = tree.append_element(cell, "input").unwrap();
        tree.set_attr(title_input, "name", "title").unwrap();
        tree.set_attr(title_input, "class", "required").unwrap();
        tree.set_value(title_input, title).unwrap();

        let container = tree.append_element(form, "div").unwrap();
        tree.add_class(container, &markup.localization_container_class);
        let primary = tree.append_element(container, "input").unwrap();
        tree.set_attr(primary, "name", "abstract[en]").unwrap();
        tree.add_class(primary, &markup.multilingual_primary_class);
        let popover = tree.append_element(container, "div").unwrap();
        tree.add_class(popover, &markup.localization_popover_class);
        tree.hide(popover);
        let extra = tree.append_element(popover, "input").unwrap();
        tree.set_attr(extra, "name", "abstract[fr]").unwrap();
        tree.add_class(extra, &markup.multilingual_extra_class);

        let widget = tree.append_element(form, "div").unwrap();
        tree.add_class(widget, &markup.form_widget_class);

        let cancel = tree.append_element(form, "button").unwrap();
        tree.set_attr(cancel, "id", &markup.cancel_button_id).unwrap();
        let save = tree.append_element(form, "button").unwrap();
        tree.set_attr(save, "class", "button").unwrap();
        tree.set_attr(save, "type", "submit").unwrap();

        drop(doc);
        Self {
            document,
            form,
            row,
            title: title_input,
            cancel,
            save,
            widget,
            container,
            popover,
            primary,
            extra,
        }
    }

    /// Handler recording every published event
    fn recording_handler(&self) -> (HandlerCore, Rc<RefCell<Vec<FormEvent>>>) {
        let handler = HandlerCore::new(self.document.clone(), self.form);
        let log = Rc::new(RefCell::new(Vec::new()));
        for event in FormEvent::ALL {
            let log = log.clone();
            handler.on(event, Rc::new(move |e: FormEvent| log.borrow_mut().push(e)));
        }
        (handler, log)
    }

    fn bind(&self, options: FormOptions) -> (Rc<FormController>, Rc<RefCell<Vec<FormEvent>>>) {
        let (handler, log) = self.recording_handler();
        let controller = FormController::bind(handler, &ConstraintEngine::new(), options).unwrap();
        (controller, log)
    }

    fn submissions(&self) -> usize {
        self.document.borrow().submissions().len()
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// BINDING
// ============================================================================

#[test]
fn test_bind_publishes_initial_validity() {
    init_tracing();

    let fixture = Fixture::new("");
    let (_controller, log) = fixture.bind(FormOptions::default());
    assert_eq!(*log.borrow(), vec![FormEvent::Invalid]);

    let fixture = Fixture::new("Open Access in Practice");
    let (controller, log) = fixture.bind(FormOptions::default());
    assert_eq!(*log.borrow(), vec![FormEvent::Valid]);
    assert!(controller.is_valid());
}

#[test]
fn test_bind_displays_nothing() {
    let fixture = Fixture::new("");
    let (_controller, _) = fixture.bind(FormOptions::default());

    let doc = fixture.document.borrow();
    assert!(!doc.tree().has_class(fixture.row, "error"));
    assert!(doc.submissions().is_empty());
}

#[test]
fn test_bind_styles_buttons() {
    let fixture = Fixture::new("");
    let (_controller, _) = fixture.bind(FormOptions::default());

    let doc = fixture.document.borrow();
    let tree = doc.tree();
    assert!(tree.has_class(fixture.save, "ui-button"));
    assert!(tree.has_class(fixture.save, "ui-widget"));
    assert_eq!(tree.attr(fixture.save, "role"), Some("button"));
    assert!(!tree.has_class(fixture.cancel, "ui-button"));
}

#[test]
fn test_bind_rejects_non_form() {
    let fixture = Fixture::new("");
    let handler = HandlerCore::new(fixture.document.clone(), fixture.row);

    let err = FormController::bind(handler, &ConstraintEngine::new(), FormOptions::default()).unwrap_err();
    assert!(matches!(&err, FormError::InvalidBinding { found } if found == "<div>"));
    assert_eq!(fixture.document.borrow().listeners().count(fixture.row, &EventType::Change), 0);
}

#[test]
fn test_dom_listeners_hear_form_events() -> anyhow::Result<()> {
    let fixture = Fixture::new("");
    let body = fixture.document.borrow().body();
    let heard = Rc::new(RefCell::new(Vec::new()));
    for event in [FormEvent::Valid, FormEvent::Invalid] {
        let heard = heard.clone();
        fixture.document.borrow_mut().add_event_listener(body, event.event_type(), move |e: &mut DomEvent| {
            heard.borrow_mut().push(e.event_type.name().to_string());
        });
    }

    let (_controller, _) = fixture.bind(FormOptions::default());
    set_value(&fixture.document, fixture.title, "Peer Review Week")?;

    assert_eq!(*heard.borrow(), vec!["formInvalid", "formValid"]);
    Ok(())
}

// ============================================================================
// FIELD CHANGES
// ============================================================================

#[test]
fn test_change_publishes_validity() -> anyhow::Result<()> {
    let fixture = Fixture::new("");
    let (_controller, log) = fixture.bind(FormOptions::default());

    set_value(&fixture.document, fixture.title, "Peer Review Week")?;
    set_value(&fixture.document, fixture.title, "")?;

    assert_eq!(
        *log.borrow(),
        vec![FormEvent::Invalid, FormEvent::Valid, FormEvent::Invalid]
    );
    Ok(())
}

#[test]
fn test_change_highlights_form_row() -> anyhow::Result<()> {
    let fixture = Fixture::new("Draft");
    let (_controller, _) = fixture.bind(FormOptions::default());

    set_value(&fixture.document, fixture.title, "")?;
    {
        let doc = fixture.document.borrow();
        assert!(doc.tree().has_class(fixture.row, "error"));
        assert!(!doc.tree().has_class(fixture.title, "error"));
    }

    set_value(&fixture.document, fixture.title, "Final")?;
    assert!(!fixture.document.borrow().tree().has_class(fixture.row, "error"));
    Ok(())
}

#[test]
fn test_change_of_other_field_reports_whole_form() -> anyhow::Result<()> {
    let fixture = Fixture::new("");
    let (_controller, log) = fixture.bind(FormOptions::default());

    // The abstract is valid, but the title still is not
    set_value(&fixture.document, fixture.primary, "An abstract")?;
    assert_eq!(*log.borrow(), vec![FormEvent::Invalid, FormEvent::Invalid]);
    Ok(())
}

// ============================================================================
// CANCEL
// ============================================================================

#[test]
fn test_cancel_publishes_only_canceled() {
    let fixture = Fixture::new("");
    let (_controller, log) = fixture.bind(FormOptions::default());
    log.borrow_mut().clear();

    click(&fixture.document, fixture.cancel);
    click(&fixture.document, fixture.cancel);

    assert_eq!(*log.borrow(), vec![FormEvent::Canceled, FormEvent::Canceled]);
    assert_eq!(fixture.submissions(), 0);
}

#[test]
fn test_custom_cancel_button_id() -> anyhow::Result<()> {
    let fixture = Fixture::new("");
    fixture.document.borrow_mut().tree_mut().set_attr(fixture.save, "id", "closeButton")?;

    let markup = FormMarkup::from_json(r#"{ "cancelButtonId": "closeButton" }"#)?;
    let (_controller, log) = fixture.bind(FormOptions::new().with_markup(markup));
    log.borrow_mut().clear();

    click(&fixture.document, fixture.cancel);
    assert!(log.borrow().is_empty());

    click(&fixture.document, fixture.save);
    assert_eq!(*log.borrow(), vec![FormEvent::Canceled]);
    Ok(())
}

// ============================================================================
// MULTILINGUAL FIELDS
// ============================================================================

#[test]
fn test_focus_primary_opens_popover() {
    let fixture = Fixture::new("");
    let (controller, _) = fixture.bind(FormOptions::default());
    let focus_class = controller.markup().container_focus_class.clone();

    focus(&fixture.document, fixture.primary);
    {
        let doc = fixture.document.borrow();
        assert!(!doc.tree().is_hidden(fixture.popover));
        assert!(doc.tree().has_class(fixture.container, &focus_class));
    }

    // Moving into the alternate locale keeps it open
    focus(&fixture.document, fixture.extra);
    assert!(!fixture.document.borrow().tree().is_hidden(fixture.popover));

    blur(&fixture.document);
    let doc = fixture.document.borrow();
    assert!(doc.tree().is_hidden(fixture.popover));
    assert!(!doc.tree().has_class(fixture.container, &focus_class));
}

#[test]
fn test_multilingual_without_container_is_noop() {
    let fixture = Fixture::new("");
    let markup = FormMarkup::default();
    let (stray_primary, stray_extra) = {
        let mut doc = fixture.document.borrow_mut();
        let tree = doc.tree_mut();
        let primary = tree.append_element(fixture.form, "input").unwrap();
        tree.set_attr(primary, "name", "subtitle[en]").unwrap();
        tree.add_class(primary, &markup.multilingual_primary_class);
        let extra = tree.append_element(fixture.form, "input").unwrap();
        tree.set_attr(extra, "name", "subtitle[fr]").unwrap();
        tree.add_class(extra, &markup.multilingual_extra_class);
        (primary, extra)
    };
    let (controller, log) = fixture.bind(FormOptions::default());
    log.borrow_mut().clear();
    let classes_before = {
        let doc = fixture.document.borrow();
        let tree = doc.tree();
        [fixture.form, fixture.container, stray_primary, stray_extra].map(|node| tree.element(node).map(|e| e.classes.value()))
    };

    focus(&fixture.document, stray_primary);
    focus(&fixture.document, stray_extra);
    blur(&fixture.document);
    controller.multilingual_show(NodeId::NONE);

    assert!(log.borrow().is_empty());
    let doc = fixture.document.borrow();
    let tree = doc.tree();
    assert!(tree.is_hidden(fixture.popover));
    assert!(!tree.has_class(fixture.container, &markup.container_focus_class));
    let classes_after = [fixture.form, fixture.container, stray_primary, stray_extra]
        .map(|node| tree.element(node).map(|e| e.classes.value()));
    assert_eq!(classes_after, classes_before);
}

// ============================================================================
// SUBMISSION
// ============================================================================

#[test]
fn test_native_submission_happens_once() -> anyhow::Result<()> {
    let fixture = Fixture::new("Open Access in Practice");
    let (controller, _) = fixture.bind(FormOptions::default());

    // The outer attempt is superseded by the controller's own submission
    assert!(!request_submit(&fixture.document, fixture.form)?);

    let doc = fixture.document.borrow();
    let submissions = doc.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].action, "/submission/save");
    assert_eq!(submissions[0].data.get("title"), Some("Open Access in Practice"));
    assert!(!controller.validator().has_submit_hook());
    Ok(())
}

#[test]
fn test_native_submission_fires_one_submit_event() -> anyhow::Result<()> {
    let fixture = Fixture::new("Open Access in Practice");
    let (_controller, log) = fixture.bind(FormOptions::default());
    let seen = Rc::new(Cell::new(0));
    {
        let seen = seen.clone();
        let mut doc = fixture.document.borrow_mut();
        let body = doc.body();
        doc.add_event_listener(body, EventType::Submit, move |_: &mut DomEvent| seen.set(seen.get() + 1));
    }
    log.borrow_mut().clear();

    request_submit(&fixture.document, fixture.form)?;

    assert_eq!(seen.get(), 1);
    assert_eq!(*log.borrow(), vec![FormEvent::Valid]);
    assert_eq!(fixture.submissions(), 1);
    Ok(())
}

#[test]
fn test_strategy_replaces_native_submission() -> anyhow::Result<()> {
    let fixture = Fixture::new("Open Access in Practice");
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    let options = FormOptions::new().with_submit_strategy(move |controller, validator, form| {
        counter.set(counter.get() + 1);
        assert_eq!(form, controller.element());
        assert!(validator.check_form());
        false
    });

    let (controller, _) = fixture.bind(options);
    assert!(controller.has_submit_strategy());

    assert!(!request_submit(&fixture.document, fixture.form)?);
    assert!(!request_submit(&fixture.document, fixture.form)?);

    assert_eq!(calls.get(), 2);
    assert_eq!(fixture.submissions(), 0);
    assert!(controller.validator().has_submit_hook());
    Ok(())
}

#[test]
fn test_strategy_may_let_submission_proceed() -> anyhow::Result<()> {
    let fixture = Fixture::new("Open Access in Practice");
    let (_controller, _) = fixture.bind(FormOptions::new().with_submit_strategy(|_, _, _| true));

    assert!(request_submit(&fixture.document, fixture.form)?);
    assert_eq!(fixture.submissions(), 1);
    Ok(())
}

#[test]
fn test_widget_veto_blocks_everything() -> anyhow::Result<()> {
    let fixture = Fixture::new("Open Access in Practice");
    let requested = Rc::new(Cell::new(0));
    let seen = requested.clone();
    fixture.document.borrow_mut().add_event_listener(
        fixture.widget,
        FormEvent::SubmitRequested.event_type(),
        move |e: &mut DomEvent| {
            seen.set(seen.get() + 1);
            e.prevent_default();
        },
    );

    let strategy_ran = Rc::new(Cell::new(false));
    let ran = strategy_ran.clone();
    let (controller, _) = fixture.bind(FormOptions::new().with_submit_strategy(move |_, _, _| {
        ran.set(true);
        true
    }));

    assert!(!request_submit(&fixture.document, fixture.form)?);
    assert_eq!(requested.get(), 1);
    assert!(!strategy_ran.get());
    assert_eq!(fixture.submissions(), 0);
    assert!(controller.validator().has_submit_hook());
    Ok(())
}

#[test]
fn test_invalid_submission_never_reaches_widgets() -> anyhow::Result<()> {
    let fixture = Fixture::new("");
    let requested = Rc::new(Cell::new(0));
    let seen = requested.clone();
    fixture.document.borrow_mut().add_event_listener(
        fixture.widget,
        FormEvent::SubmitRequested.event_type(),
        move |_: &mut DomEvent| seen.set(seen.get() + 1),
    );
    let (_controller, log) = fixture.bind(FormOptions::default());

    assert!(!request_submit(&fixture.document, fixture.form)?);

    assert_eq!(requested.get(), 0);
    assert_eq!(fixture.submissions(), 0);
    assert_eq!(fixture.document.borrow().focused(), Some(fixture.title));
    assert_eq!(log.borrow().last(), Some(&FormEvent::Invalid));
    Ok(())
}

// ============================================================================
// TEARDOWN
// ============================================================================

#[test]
fn test_dropped_controller_goes_quiet() -> anyhow::Result<()> {
    let fixture = Fixture::new("");
    let (controller, log) = fixture.bind(FormOptions::default());
    assert_eq!(controller.handler().element(), fixture.form);
    drop(controller);
    log.borrow_mut().clear();

    click(&fixture.document, fixture.cancel);
    set_value(&fixture.document, fixture.title, "Late edit")?;
    focus(&fixture.document, fixture.primary);

    assert!(log.borrow().is_empty());
    assert!(fixture.document.borrow().tree().is_hidden(fixture.popover));

    // With nothing attached the browser submits on its own
    assert!(request_submit(&fixture.document, fixture.form)?);
    assert_eq!(fixture.submissions(), 1);
    Ok(())
}
