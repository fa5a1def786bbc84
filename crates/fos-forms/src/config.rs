//! Controller configuration
//!
//! The markup contract (reserved ids and classes) and per-form options.

use std::fmt;
use std::rc::Rc;

use fos_dom::NodeId;
use serde::{Deserialize, Serialize};

use crate::{FormController, FormError, Validator};

/// Ids and classes the controller looks for inside a form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormMarkup {
    /// Id of the cancel button
    pub cancel_button_id: String,
    /// Class marking buttons to style
    pub button_class: String,
    /// Classes added to every styled button
    pub styled_button_classes: Vec<String>,
    /// Primary-locale input of a multilingual field
    pub multilingual_primary_class: String,
    /// Alternate-locale inputs of a multilingual field
    pub multilingual_extra_class: String,
    pub localization_container_class: String,
    pub localization_popover_class: String,
    /// Added to a localization container while its popover is open
    pub container_focus_class: String,
    /// Nested widgets that take part in the submit veto
    pub form_widget_class: String,
    /// Class applied to invalid fields and their rows
    pub error_class: String,
}

impl Default for FormMarkup {
    fn default() -> Self {
        Self {
            cancel_button_id: "cancelFormButton".to_string(),
            button_class: "button".to_string(),
            styled_button_classes: vec!["ui-button".to_string(), "ui-widget".to_string()],
            multilingual_primary_class: "multilingual_primary".to_string(),
            multilingual_extra_class: "multilingual_extra".to_string(),
            localization_container_class: "pkp_controllers_form_localization_container".to_string(),
            localization_popover_class: "pkp_controllers_form_localization_popover".to_string(),
            container_focus_class: "pkp_controllers_form_localization_container_focus".to_string(),
            form_widget_class: "formWidget".to_string(),
            error_class: "error".to_string(),
        }
    }
}

impl FormMarkup {
    /// Parse from JSON; missing keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self, FormError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Caller-supplied replacement for native submission.
///
/// Runs with the controller as context after validation passed and no
/// nested widget vetoed. The return value tells the validation engine
/// whether the submission that triggered it may still proceed natively.
pub type SubmitStrategy = Rc<dyn Fn(&FormController, &dyn Validator, NodeId) -> bool>;

/// Options accepted by [`FormController::bind`]
#[derive(Clone, Default)]
pub struct FormOptions {
    pub submit_strategy: Option<SubmitStrategy>,
    pub markup: FormMarkup,
}

impl FormOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_submit_strategy(
        mut self,
        strategy: impl Fn(&FormController, &dyn Validator, NodeId) -> bool + 'static,
    ) -> Self {
        self.submit_strategy = Some(Rc::new(strategy));
        self
    }

    pub fn with_markup(mut self, markup: FormMarkup) -> Self {
        self.markup = markup;
        self
    }
}

impl fmt::Debug for FormOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormOptions")
            .field("submit_strategy", &self.submit_strategy.is_some())
            .field("markup", &self.markup)
            .finish()
    }
}
