//! Class token lists
//!
//! The ordered, duplicate-free set of classes on an element. The controller
//! layer leans on this for error rows, styled buttons and focus markers.

use std::fmt;

/// Whitespace-separated class tokens in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DOMTokenList {
    tokens: Vec<String>,
}

impl DOMTokenList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a `class` attribute value. Repeated tokens collapse.
    pub fn parse(class_attr: &str) -> Self {
        let mut list = Self::new();
        class_attr.split_whitespace().for_each(|token| {
            list.add(token);
        });
        list
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.position(token).is_some()
    }

    /// Returns `false` for an empty token or one already present
    pub fn add(&mut self, token: &str) -> bool {
        let fresh = !token.is_empty() && !self.contains(token);
        if fresh {
            self.tokens.push(token.to_owned());
        }
        fresh
    }

    /// Returns whether the token was present
    pub fn remove(&mut self, token: &str) -> bool {
        match self.position(token) {
            Some(index) => {
                self.tokens.remove(index);
                true
            }
            None => false,
        }
    }

    /// Flip `token`, or pin it on/off with `force`. Returns whether it is
    /// present afterwards.
    pub fn toggle(&mut self, token: &str, force: Option<bool>) -> bool {
        let want = force.unwrap_or_else(|| !self.contains(token));
        if want {
            self.add(token);
        } else {
            self.remove(token);
        }
        want && !token.is_empty()
    }

    /// Serialized form, as the `class` attribute would read
    pub fn value(&self) -> String {
        self.to_string()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    fn position(&self, token: &str) -> Option<usize> {
        self.tokens.iter().position(|t| t == token)
    }
}

impl fmt::Display for DOMTokenList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(token)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_collapses_repeats() {
        let list = DOMTokenList::parse("  button  button ui-widget ");
        assert_eq!(list.len(), 2);
        assert_eq!(list.value(), "button ui-widget");
        assert_eq!(list.iter().collect::<Vec<_>>(), vec!["button", "ui-widget"]);
    }

    #[test]
    fn test_add_and_remove_report_changes() {
        let mut list = DOMTokenList::new();
        assert!(list.add("error"));
        assert!(!list.add("error"));
        assert!(!list.add(""));

        assert!(list.remove("error"));
        assert!(!list.remove("error"));
        assert!(list.is_empty());
    }

    #[test]
    fn test_toggle_with_and_without_force() {
        let mut list = DOMTokenList::parse("row");

        assert!(list.toggle("container_focus", None));
        assert!(!list.toggle("container_focus", None));
        assert!(!list.contains("container_focus"));

        assert!(list.toggle("error", Some(true)));
        assert!(list.toggle("error", Some(true)));
        assert_eq!(list.to_string(), "row error");
        assert!(!list.toggle("error", Some(false)));
        assert!(!list.toggle("", Some(true)));
    }
}
