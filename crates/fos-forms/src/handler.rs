//! Handler capability
//!
//! What a controller needs from its host: the bound element, the document
//! it lives in, and an event channel shared with the rest of the page.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use fos_dom::{dispatch_event, DocumentHandle, DomEvent, NodeId};

use crate::FormEvent;

/// Callback notified of a published event
pub type Subscriber = Rc<dyn Fn(FormEvent)>;

/// Event and element access for a controller
pub trait Handler {
    /// Element the controller is bound to
    fn element(&self) -> NodeId;

    /// Document owning the element
    fn document(&self) -> DocumentHandle;

    /// Publish an event to subscribers
    fn emit(&self, event: FormEvent);

    /// Subscribe to an event
    fn on(&self, event: FormEvent, subscriber: Subscriber);
}

/// Default [`Handler`].
///
/// Clones share one subscriber table, so a page component can keep a clone
/// and subscribe before handing the handler to a controller.
#[derive(Clone)]
pub struct HandlerCore {
    inner: Rc<HandlerInner>,
}

struct HandlerInner {
    document: DocumentHandle,
    element: NodeId,
    subscribers: RefCell<HashMap<FormEvent, Vec<Subscriber>>>,
}

impl HandlerCore {
    pub fn new(document: DocumentHandle, element: NodeId) -> Self {
        Self {
            inner: Rc::new(HandlerInner {
                document,
                element,
                subscribers: RefCell::new(HashMap::new()),
            }),
        }
    }

    /// Number of subscribers for `event`
    pub fn subscriber_count(&self, event: FormEvent) -> usize {
        self.inner.subscribers.borrow().get(&event).map_or(0, Vec::len)
    }
}

impl Handler for HandlerCore {
    fn element(&self) -> NodeId {
        self.inner.element
    }

    fn document(&self) -> DocumentHandle {
        self.inner.document.clone()
    }

    /// Notifies subscribers in registration order, then bubbles the event
    /// through the DOM from the bound element.
    fn emit(&self, event: FormEvent) {
        tracing::trace!(event = event.name(), element = ?self.inner.element, "emit");

        let subscribers = self.inner.subscribers
            .borrow()
            .get(&event)
            .cloned()
            .unwrap_or_default();
        for subscriber in subscribers {
            subscriber(event);
        }

        let mut dom_event = DomEvent::custom(event.name(), self.inner.element).with_cancelable(false);
        dispatch_event(&self.inner.document, &mut dom_event);
    }

    fn on(&self, event: FormEvent, subscriber: Subscriber) {
        self.inner.subscribers.borrow_mut().entry(event).or_default().push(subscriber);
    }
}

impl fmt::Debug for HandlerCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerCore")
            .field("element", &self.inner.element)
            .field("subscribers", &self.inner.subscribers.borrow().values().map(Vec::len).sum::<usize>())
            .finish()
    }
}

/// Controller reference captured by callbacks handed to other components.
///
/// Holds the controller weakly: callbacks stored in the DOM or in the
/// validation engine never keep a torn-down controller alive, and become
/// no-ops once it is dropped.
pub struct BoundContext<T> {
    target: Weak<T>,
}

impl<T> BoundContext<T> {
    /// Run `f` with the controller, if it is still alive
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.target.upgrade().map(|target| f(&target))
    }

    pub fn is_alive(&self) -> bool {
        self.target.strong_count() > 0
    }
}

impl<T> Clone for BoundContext<T> {
    fn clone(&self) -> Self {
        Self { target: self.target.clone() }
    }
}

impl<T> fmt::Debug for BoundContext<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundContext").field("alive", &self.is_alive()).finish()
    }
}

/// Capture `target` as the context for a callback
pub fn bind_context<T>(target: &Weak<T>) -> BoundContext<T> {
    BoundContext { target: target.clone() }
}
