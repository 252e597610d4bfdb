//! Project files: a JSON array of pages.
//!
//! Decoding checks the document shape before handing it to serde so that a
//! malformed file is reported by page index rather than by byte offset.

#[cfg(test)]
#[path = "project_test.rs"]
mod project_test;

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::doc::{Element, Page};

/// Error returned when reading or writing a project file.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("project is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("project must be a JSON array of pages")]
    NotAnArray,
    #[error("project contains no pages")]
    Empty,
    /// Page at `index` lacks a non-empty `id`, a non-empty `title` or an `elements` array.
    #[error("page {index} is malformed: {reason}")]
    MalformedPage { index: usize, reason: &'static str },
    #[error("id `{0}` is used more than once")]
    DuplicateId(String),
}

/// Parse and validate a project file.
///
/// # Errors
///
/// Returns [`ProjectError`] when the text is not JSON, is not a non-empty
/// array of pages, a page misses required fields, an element does not match
/// the element schema, or two pages or elements share an id.
pub fn decode_pages(text: &str) -> Result<Vec<Page>, ProjectError> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Array(raw_pages) = &value else {
        return Err(ProjectError::NotAnArray);
    };
    if raw_pages.is_empty() {
        return Err(ProjectError::Empty);
    }
    for (index, raw) in raw_pages.iter().enumerate() {
        check_page_shape(index, raw)?;
    }

    let pages: Vec<Page> = serde_json::from_value(value)?;
    check_unique_ids(&pages)?;
    debug!(pages = pages.len(), "decoded project");
    Ok(pages)
}

/// Serialize pages as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`ProjectError::Json`] if serialization fails.
pub fn encode_pages(pages: &[Page]) -> Result<String, ProjectError> {
    Ok(serde_json::to_string_pretty(pages)?)
}

fn check_page_shape(index: usize, raw: &Value) -> Result<(), ProjectError> {
    let non_empty = |key: &str| raw.get(key).and_then(Value::as_str).is_some_and(|s| !s.is_empty());
    if !raw.is_object() {
        return Err(ProjectError::MalformedPage { index, reason: "not an object" });
    }
    if !non_empty("id") {
        return Err(ProjectError::MalformedPage { index, reason: "missing id" });
    }
    if !non_empty("title") {
        return Err(ProjectError::MalformedPage { index, reason: "missing title" });
    }
    if !raw.get("elements").is_some_and(Value::is_array) {
        return Err(ProjectError::MalformedPage { index, reason: "elements is not an array" });
    }
    Ok(())
}

fn check_unique_ids(pages: &[Page]) -> Result<(), ProjectError> {
    fn visit<'a>(el: &'a Element, seen: &mut HashSet<&'a str>) -> Result<(), ProjectError> {
        if !seen.insert(el.id.as_str()) {
            return Err(ProjectError::DuplicateId(el.id.clone()));
        }
        el.children().iter().try_for_each(|child| visit(child, seen))
    }

    let mut page_ids = HashSet::new();
    let mut element_ids = HashSet::new();
    for page in pages {
        if !page_ids.insert(page.id.as_str()) {
            return Err(ProjectError::DuplicateId(page.id.clone()));
        }
        for el in &page.elements {
            visit(el, &mut element_ids)?;
        }
    }
    Ok(())
}

/// Counts describing a project, as printed by the command-line tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
    pub pages: usize,
    /// Top-level elements across all pages.
    pub elements: usize,
    /// Elements nested inside groups.
    pub grouped: usize,
    pub locked: usize,
    /// Element counts by kind, nested children included.
    pub by_kind: BTreeMap<String, usize>,
}

/// Tally pages and elements by kind.
#[must_use]
pub fn summarize(pages: &[Page]) -> ProjectSummary {
    fn tally(el: &Element, nested: bool, summary: &mut ProjectSummary) {
        *summary.by_kind.entry(el.kind.as_str().to_owned()).or_default() += 1;
        if nested {
            summary.grouped += 1;
        }
        if el.locked {
            summary.locked += 1;
        }
        for child in el.children() {
            tally(child, true, summary);
        }
    }

    let mut summary = ProjectSummary { pages: pages.len(), ..Default::default() };
    for page in pages {
        summary.elements += page.elements.len();
        for el in &page.elements {
            tally(el, false, &mut summary);
        }
    }
    summary
}
