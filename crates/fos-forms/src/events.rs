//! Form events
//!
//! The closed set of events a form controller publishes.

use std::fmt;
use std::str::FromStr;

use fos_dom::EventType;
use serde::{Deserialize, Serialize};

/// Event published by a form controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormEvent {
    /// Every field satisfies its rules
    #[serde(rename = "formValid")]
    Valid,
    /// At least one field fails its rules
    #[serde(rename = "formInvalid")]
    Invalid,
    /// The cancel button was clicked
    #[serde(rename = "formCanceled")]
    Canceled,
    /// Fired at nested form widgets before submitting; cancelable
    #[serde(rename = "formSubmitRequested")]
    SubmitRequested,
}

impl FormEvent {
    pub const ALL: [FormEvent; 4] = [
        FormEvent::Valid,
        FormEvent::Invalid,
        FormEvent::Canceled,
        FormEvent::SubmitRequested,
    ];

    /// Wire name, as used for DOM event types
    pub fn name(self) -> &'static str {
        match self {
            FormEvent::Valid => "formValid",
            FormEvent::Invalid => "formInvalid",
            FormEvent::Canceled => "formCanceled",
            FormEvent::SubmitRequested => "formSubmitRequested",
        }
    }

    /// `Valid` or `Invalid` for an aggregate verdict
    pub fn validity(valid: bool) -> Self {
        if valid { FormEvent::Valid } else { FormEvent::Invalid }
    }

    /// DOM event type carrying this event
    pub fn event_type(self) -> EventType {
        EventType::custom(self.name())
    }
}

impl fmt::Display for FormEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unrecognized form event name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown form event: {0}")]
pub struct UnknownFormEvent(pub String);

impl FromStr for FormEvent {
    type Err = UnknownFormEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter()
            .find(|e| e.name() == s)
            .ok_or_else(|| UnknownFormEvent(s.to_string()))
    }
}
