//! DOM Events
//!
//! Event objects, the per-node listener registry and bubbling dispatch.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::{DocumentHandle, NodeId};

/// Event type identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventType {
    Click,
    Focus,
    Blur,
    Input,
    Change,
    Submit,
    /// Application-defined event, identified by name
    Custom(String),
}

impl EventType {
    pub fn custom(name: impl Into<String>) -> Self {
        Self::Custom(name.into())
    }

    /// Check if this event type can bubble
    pub fn bubbles(&self) -> bool {
        !matches!(self, EventType::Focus | EventType::Blur)
    }

    /// Check if listeners may cancel the default action
    pub fn cancelable(&self) -> bool {
        matches!(self, EventType::Click | EventType::Submit | EventType::Custom(_))
    }

    /// Event name as seen by listeners
    pub fn name(&self) -> &str {
        match self {
            EventType::Click => "click",
            EventType::Focus => "focus",
            EventType::Blur => "blur",
            EventType::Input => "input",
            EventType::Change => "change",
            EventType::Submit => "submit",
            EventType::Custom(name) => name,
        }
    }
}

/// DOM event
#[derive(Debug, Clone)]
pub struct DomEvent {
    pub event_type: EventType,
    pub target: NodeId,
    /// Node whose listeners are currently running
    pub current_target: Option<NodeId>,
    pub bubbles: bool,
    pub cancelable: bool,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl DomEvent {
    /// Create an event with the type's default bubbling/cancelable flags
    pub fn new(event_type: EventType, target: NodeId) -> Self {
        Self {
            bubbles: event_type.bubbles(),
            cancelable: event_type.cancelable(),
            event_type,
            target,
            current_target: None,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// Create a bubbling, cancelable custom event
    pub fn custom(name: impl Into<String>, target: NodeId) -> Self {
        Self::new(EventType::custom(name), target)
    }

    pub fn with_cancelable(mut self, cancelable: bool) -> Self {
        self.cancelable = cancelable;
        self
    }

    /// Point the same event object at another target.
    ///
    /// Keeps the default-prevented flag, so one event can be fired at
    /// several nodes and inspected once afterwards.
    pub fn retarget(&mut self, target: NodeId) {
        self.target = target;
        self.current_target = None;
        self.propagation_stopped = false;
    }

    /// Prevent default action
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    /// Stop propagation
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Check if default was prevented
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// Event listener callback
pub type Listener = Rc<dyn Fn(&mut DomEvent)>;

/// Listeners keyed by (node, event type), in registration order
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: HashMap<(NodeId, EventType), Vec<Listener>>,
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("bindings", &self.listeners.len())
            .field("listeners", &self.len())
            .finish()
    }
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener
    pub fn add(&mut self, node: NodeId, event_type: EventType, listener: Listener) {
        self.listeners.entry((node, event_type)).or_default().push(listener);
    }

    /// Snapshot of the listeners bound to `node` for `event_type`
    pub fn listeners_for(&self, node: NodeId, event_type: &EventType) -> Vec<Listener> {
        self.listeners
            .get(&(node, event_type.clone()))
            .cloned()
            .unwrap_or_default()
    }

    /// Number of listeners bound to `node` for `event_type`
    pub fn count(&self, node: NodeId, event_type: &EventType) -> usize {
        self.listeners
            .get(&(node, event_type.clone()))
            .map_or(0, Vec::len)
    }

    /// Total number of listeners
    pub fn len(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Dispatch `event` at its target, then up the ancestor chain if it bubbles.
///
/// Listener lists are snapshotted per node and the document is not borrowed
/// while a listener runs, so listeners may mutate the document or dispatch
/// further events. Returns `true` when the default action was not prevented.
pub fn dispatch_event(document: &DocumentHandle, event: &mut DomEvent) -> bool {
    let path: Vec<NodeId> = {
        let doc = document.borrow();
        let tree = doc.tree();
        if tree.get(event.target).is_none() {
            Vec::new()
        } else if event.bubbles {
            std::iter::once(event.target).chain(tree.ancestors(event.target)).collect()
        } else {
            vec![event.target]
        }
    };

    tracing::trace!(event = event.event_type.name(), target = ?event.target, "dispatch");

    for node in path {
        event.current_target = Some(node);
        let listeners = document.borrow().listeners().listeners_for(node, &event.event_type);
        for listener in listeners {
            listener(event);
        }
        if event.propagation_stopped {
            break;
        }
    }
    event.current_target = None;

    !event.default_prevented
}
