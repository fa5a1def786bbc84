//! User interaction
//!
//! Synthesizes the event sequences a browser produces for clicks, focus
//! changes, typing and form submission.

use crate::{dispatch_event, DocumentHandle, DomError, DomEvent, EventType, NodeId};

/// Click `target`. Returns `false` if a listener prevented the default.
pub fn click(document: &DocumentHandle, target: NodeId) -> bool {
    let mut event = DomEvent::new(EventType::Click, target);
    dispatch_event(document, &mut event)
}

/// Move focus to `target`, blurring the previously focused element first.
pub fn focus(document: &DocumentHandle, target: NodeId) {
    let previous = document.borrow().focused();
    if previous == Some(target) {
        return;
    }
    if previous.is_some() {
        blur(document);
    }

    document.borrow_mut().set_focused(Some(target));
    let mut event = DomEvent::new(EventType::Focus, target);
    dispatch_event(document, &mut event);
}

/// Remove focus from the focused element, if any.
pub fn blur(document: &DocumentHandle) {
    let previous = document.borrow().focused();
    let Some(previous) = previous else { return };

    document.borrow_mut().set_focused(None);
    let mut event = DomEvent::new(EventType::Blur, previous);
    dispatch_event(document, &mut event);
}

/// Replace a control's value the way typing does: `input` then `change`.
pub fn set_value(document: &DocumentHandle, target: NodeId, value: &str) -> Result<(), DomError> {
    document.borrow_mut().tree_mut().set_value(target, value)?;

    let mut event = DomEvent::new(EventType::Input, target);
    dispatch_event(document, &mut event);
    let mut event = DomEvent::new(EventType::Change, target);
    dispatch_event(document, &mut event);
    Ok(())
}

/// Fire a cancelable `submit` at `form` and submit natively unless a
/// listener prevented it. Returns whether the native submission happened.
pub fn request_submit(document: &DocumentHandle, form: NodeId) -> Result<bool, DomError> {
    {
        let doc = document.borrow();
        let element = doc.tree().try_element(form)?;
        if element.tag != "form" {
            return Err(DomError::UnexpectedTag {
                expected: "form".to_string(),
                found: element.tag.clone(),
            });
        }
    }

    let mut event = DomEvent::new(EventType::Submit, form);
    if !dispatch_event(document, &mut event) {
        tracing::debug!(form = ?form, "submission prevented");
        return Ok(false);
    }

    document.borrow_mut().submit_form(form)?;
    Ok(true)
}
