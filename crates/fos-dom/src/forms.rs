//! Form submission
//!
//! Collects a form's controls into `FormData` for native submission.

use crate::{DomError, DomTree, NodeId};

/// `method` attribute of a form; anything unrecognized is GET
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormMethod {
    #[default]
    Get,
    Post,
    Dialog,
}

impl FormMethod {
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "post" => Self::Post,
            "dialog" => Self::Dialog,
            _ => Self::Get,
        }
    }
}

/// Form data set, in tree order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    entries: Vec<(String, String)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry after the existing ones
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Get the first value for `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Every value submitted under `name`, in order
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.entries.iter()
            .filter(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn has(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Drop every entry named `name`
    pub fn delete(&mut self, name: &str) {
        self.entries.retain(|(n, _)| n != name);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(name, value)` pairs in tree order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// `application/x-www-form-urlencoded` body
    pub fn to_url_encoded(&self) -> String {
        self.entries.iter()
            .map(|(name, value)| format!("{}={}", url_encode(name), url_encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

fn url_encode(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                result.push(byte as char);
            }
            b' ' => result.push('+'),
            _ => result.push_str(&format!("%{:02X}", byte)),
        }
    }
    result
}

/// A native submission of a form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSubmission {
    pub form: NodeId,
    pub action: String,
    pub method: FormMethod,
    pub data: FormData,
}

impl FormSubmission {
    /// Build the submission for `form` from its current control values
    pub fn from_form(tree: &DomTree, form: NodeId) -> Result<Self, DomError> {
        let element = tree.try_element(form)?;
        if element.tag != "form" {
            return Err(DomError::UnexpectedTag {
                expected: "form".to_string(),
                found: element.tag.clone(),
            });
        }

        let mut data = FormData::new();
        for control in tree.descendants(form).filter(|&d| is_successful_control(tree, d)) {
            if let (Some(name), Some(value)) = (tree.attr(control, "name"), tree.value(control)) {
                data.append(name, value);
            }
        }

        Ok(Self {
            form,
            action: element.get_attr("action").unwrap_or_default().to_string(),
            method: element.get_attr("method").map(FormMethod::parse).unwrap_or_default(),
            data,
        })
    }
}

/// Input types that never contribute a value on submission
fn is_button_like(input_type: &str) -> bool {
    matches!(input_type, "submit" | "reset" | "button" | "image" | "file")
}

/// Check whether a node is a form control
pub fn is_form_control(tree: &DomTree, id: NodeId) -> bool {
    tree.tag_name(id)
        .is_some_and(|tag| matches!(tag, "input" | "textarea" | "select"))
}

/// Check whether a control's value is included in a native submission
pub fn is_successful_control(tree: &DomTree, id: NodeId) -> bool {
    if !is_form_control(tree, id) || !tree.has_attr(id, "name") || tree.has_attr(id, "disabled") {
        return false;
    }
    match tree.attr(id, "type").map(str::to_ascii_lowercase).as_deref() {
        Some(t) if is_button_like(t) => false,
        Some("checkbox" | "radio") => tree.has_attr(id, "checked"),
        _ => true,
    }
}
