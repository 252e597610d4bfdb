//! In-editor clipboard: either copied elements or a whole copied page.

#[cfg(test)]
#[path = "clipboard_test.rs"]
mod clipboard_test;

use crate::doc::{Element, Page};

/// Clipboard contents. Elements and page are mutually exclusive.
#[derive(Debug, Clone, Default)]
pub enum Clipboard {
    #[default]
    Empty,
    /// Deep copies of elements plus the index of the page they came from.
    Elements { source_page: usize, elements: Vec<Element> },
    /// Deep copy of a whole page.
    Page(Page),
}

impl Clipboard {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Number of copied elements (a copied page counts as zero).
    #[must_use]
    pub fn element_count(&self) -> usize {
        match self {
            Self::Elements { elements, .. } => elements.len(),
            _ => 0,
        }
    }

    /// Fresh copies of the held elements for pasting onto `target_page`.
    ///
    /// Ids are regenerated, recursively for group children. The copies are
    /// shifted by `offset` on both axes only when pasting back onto the page
    /// they were copied from.
    #[must_use]
    pub fn paste_elements(&self, target_page: usize, offset: f64) -> Option<Vec<Element>> {
        let Self::Elements { source_page, elements } = self else {
            return None;
        };
        let shift = if *source_page == target_page { offset } else { 0.0 };
        Some(
            elements
                .iter()
                .map(|el| {
                    let mut copy = el.reidentified();
                    copy.x += shift;
                    copy.y += shift;
                    copy
                })
                .collect(),
        )
    }

    /// A fresh copy of the held page, or `None` if no page is held.
    #[must_use]
    pub fn paste_page(&self) -> Option<Page> {
        match self {
            Self::Page(page) => Some(page.duplicated()),
            _ => None,
        }
    }
}
