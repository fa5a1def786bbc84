//! Multilingual fields
//!
//! A multilingual field is a primary-locale input plus a popover of
//! alternate-locale inputs, all inside a localization container. Groups are
//! not stored anywhere; they are rediscovered from the DOM on every event.

use fos_dom::{DomTree, NodeId};

use crate::FormMarkup;

/// Localization container and the popovers inside it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizationGroup {
    pub container: NodeId,
    pub popovers: Vec<NodeId>,
}

/// Find the nearest localization container enclosing `element`
pub fn find_enclosing_group(tree: &DomTree, element: NodeId, markup: &FormMarkup) -> Option<LocalizationGroup> {
    let container = tree.closest_with_class(element, &markup.localization_container_class)?;
    let popovers = tree.find_by_class(container, &markup.localization_popover_class);
    Some(LocalizationGroup { container, popovers })
}

impl LocalizationGroup {
    /// Reveal the alternate locales and mark the container focused
    pub fn show(&self, tree: &mut DomTree, markup: &FormMarkup) {
        for &popover in &self.popovers {
            tree.show(popover);
        }
        tree.add_class(self.container, &markup.container_focus_class);
    }

    /// Collapse the alternate locales and clear the focus marker
    pub fn hide(&self, tree: &mut DomTree, markup: &FormMarkup) {
        for &popover in &self.popovers {
            tree.hide(popover);
        }
        tree.remove_class(self.container, &markup.container_focus_class);
    }

    pub fn is_open(&self, tree: &DomTree, markup: &FormMarkup) -> bool {
        tree.has_class(self.container, &markup.container_focus_class)
    }
}
