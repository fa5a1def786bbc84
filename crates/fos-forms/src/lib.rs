//! fOS Forms - Form lifecycle controller
//!
//! Binds a controller to a single `<form>`, wires a validation engine into
//! it and reports the form's state to the rest of the page as events:
//!
//! - `formValid` / `formInvalid` once at bind time and after every field change
//! - `formCanceled` when the cancel button is clicked
//! - `formSubmitRequested`, fired at nested form widgets before a validated
//!   submission goes ahead; any widget may veto it
//!
//! ```ignore
//! let handler = HandlerCore::new(document.clone(), form);
//! handler.on(FormEvent::Valid, Rc::new(|_| enable_save()));
//! let controller = FormController::bind(handler, &ConstraintEngine::new(), FormOptions::default())?;
//! ```

mod config;
mod controller;
mod events;
mod handler;
mod multilingual;
pub mod validation;

pub use config::{FormMarkup, FormOptions, SubmitStrategy};
pub use controller::{FormController, SubmitArbitration};
pub use events::{FormEvent, UnknownFormEvent};
pub use handler::{bind_context, BoundContext, Handler, HandlerCore, Subscriber};
pub use multilingual::{find_enclosing_group, LocalizationGroup};
pub use validation::{
    ConstraintEngine, ConstraintValidator, ErrorReport, FieldError, ValidationEngine, Validator,
    ValidatorSettings,
};

/// Form controller errors
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("A form controller can only be bound to an HTML form element, not {found}")]
    InvalidBinding { found: String },

    #[error("Invalid form markup configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Dom(#[from] fos_dom::DomError),
}
