//! Field constraints
//!
//! Rules read from a field's markup and the validity state they produce.
//! Rules may be given as attributes (`required`, `type="email"`) or as
//! classes (`class="required email"`).

use fos_dom::{DomTree, NodeId};

/// Validity state for a field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidityState {
    /// Required but empty
    pub value_missing: bool,
    /// Not a valid email/url
    pub type_mismatch: bool,
    /// Not a number where one is expected
    pub bad_input: bool,
    pub too_long: bool,
    pub too_short: bool,
    pub range_underflow: bool,
    pub range_overflow: bool,
    pub step_mismatch: bool,
}

impl ValidityState {
    /// Check if all constraints are satisfied
    pub fn valid(&self) -> bool {
        !self.value_missing &&
        !self.type_mismatch &&
        !self.bad_input &&
        !self.too_long &&
        !self.too_short &&
        !self.range_underflow &&
        !self.range_overflow &&
        !self.step_mismatch
    }

    /// Message for the first failing constraint
    pub fn validation_message(&self) -> &'static str {
        if self.value_missing {
            "Please fill out this field."
        } else if self.type_mismatch {
            "Please enter a valid value."
        } else if self.bad_input {
            "Please enter a number."
        } else if self.too_long {
            "Please shorten this text."
        } else if self.too_short {
            "Please lengthen this text."
        } else if self.range_underflow {
            "Value must be greater or equal to minimum."
        } else if self.range_overflow {
            "Value must be less or equal to maximum."
        } else if self.step_mismatch {
            "Please enter a valid value."
        } else {
            ""
        }
    }
}

/// Value kind checked on non-empty values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputKind {
    #[default]
    Text,
    Email,
    Url,
    Number,
}

/// Constraints for one field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldConstraints {
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
    pub kind: InputKind,
}

impl FieldConstraints {
    /// Read constraints from a field's attributes and classes
    pub fn from_element(tree: &DomTree, field: NodeId) -> Self {
        let marked = |rule: &str| tree.has_attr(field, rule) || tree.has_class(field, rule);
        let number = |name: &str| tree.attr(field, name).and_then(|v| v.trim().parse::<f64>().ok());
        let length = |name: &str| tree.attr(field, name).and_then(|v| v.trim().parse::<usize>().ok());

        let declared = tree.attr(field, "type").map(str::to_ascii_lowercase);
        let kind = match declared.as_deref() {
            Some("email") => InputKind::Email,
            Some("url") => InputKind::Url,
            Some("number") => InputKind::Number,
            _ if tree.has_class(field, "email") => InputKind::Email,
            _ if tree.has_class(field, "url") => InputKind::Url,
            _ if tree.has_class(field, "number") => InputKind::Number,
            _ => InputKind::Text,
        };

        Self {
            required: marked("required"),
            min_length: length("minlength"),
            max_length: length("maxlength"),
            min: number("min"),
            max: number("max"),
            step: number("step").filter(|s| *s > 0.0),
            kind,
        }
    }

    /// Validate a value. Only `required` applies to an empty value.
    pub fn validate(&self, value: &str) -> ValidityState {
        let mut state = ValidityState::default();
        let trimmed = value.trim();

        if trimmed.is_empty() {
            state.value_missing = self.required;
            return state;
        }

        let chars = value.chars().count();
        if let Some(max) = self.max_length {
            state.too_long = chars > max;
        }
        if let Some(min) = self.min_length {
            state.too_short = chars < min;
        }

        match self.kind {
            InputKind::Email => state.type_mismatch = !is_valid_email(trimmed),
            InputKind::Url => state.type_mismatch = !is_valid_url(trimmed),
            InputKind::Number => match trimmed.parse::<f64>() {
                Ok(num) if num.is_finite() => self.check_numeric(num, &mut state),
                _ => state.bad_input = true,
            },
            InputKind::Text => {}
        }

        state
    }

    fn check_numeric(&self, num: f64, state: &mut ValidityState) {
        if let Some(min) = self.min {
            state.range_underflow = num < min;
        }
        if let Some(max) = self.max {
            state.range_overflow = num > max;
        }
        if let Some(step) = self.step {
            let steps = (num - self.min.unwrap_or(0.0)) / step;
            state.step_mismatch = (steps - steps.round()).abs() > 1e-9;
        }
    }
}

fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else { return false };
    !local.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
}

fn is_valid_url(value: &str) -> bool {
    ["http://", "https://", "ftp://"]
        .iter()
        .find_map(|scheme| value.strip_prefix(scheme))
        .is_some_and(|rest| !rest.is_empty() && !rest.starts_with('/') && !rest.contains(' '))
}
