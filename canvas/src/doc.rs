//! Document model: pages, elements, sparse patches and the page store.
//!
//! This module defines what is on a page (`Element`, `ElementKind`), the
//! page itself (`Page`, `ContentArea`), a sparse-update type for property
//! edits (`ElementPatch`), a typed accessor for the open-ended `styles` bag
//! (`StyleProps`), and the runtime store of all pages (`DocStore`).
//!
//! Field names serialize in camelCase so project files written by the
//! browser editor load unchanged. Every structural edit (group, ungroup,
//! reorder, duplicate) is a pure operation on a `Page`; the engine snapshots
//! whole page lists around them for undo.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::camera::Point;
use crate::geometry::{Rect, bounding_box};

/// Unique identifier for an element or page.
pub type ElementId = String;

/// Open map of presentation attributes (`backgroundColor`, `fontSize`, ...).
pub type Styles = Map<String, Value>;

/// The kind of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// A text box; `content` holds the body.
    Text,
    /// An image; `content` holds the source reference.
    Image,
    /// A plain styled box (rectangle or, with a large radius, circle).
    Shape,
    /// Reserved. Loads and moves like any element.
    Video,
    /// A container whose `group_children` are positioned relative to it.
    Group,
}

impl ElementKind {
    /// Lowercase name, as used in ids and on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Shape => "shape",
            Self::Video => "video",
            Self::Group => "group",
        }
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

/// A positioned visual unit on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Unique identifier, stable for the document's lifetime.
    pub id: ElementId,
    /// Element type.
    #[serde(rename = "type")]
    pub kind: ElementKind,
    /// Text body or image source. Absent for shapes and groups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Left edge in page-local coordinates (group-local for group children).
    pub x: f64,
    /// Top edge in page-local coordinates (group-local for group children).
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Clockwise rotation in degrees around the element center.
    #[serde(default)]
    pub rotation: f64,
    /// Locked elements can be selected but not transformed.
    #[serde(default, skip_serializing_if = "is_false")]
    pub locked: bool,
    /// Informational back-reference only; never set on group children.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<ElementId>,
    /// Children of a `group`, in draw order, with group-local coordinates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_children: Option<Vec<Element>>,
    /// Presentation attributes, opaque to the geometry engine.
    #[serde(default)]
    pub styles: Styles,
}

impl Element {
    /// A new unlocked, unrotated element with a freshly generated id.
    #[must_use]
    pub fn new(kind: ElementKind, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: new_element_id(kind),
            kind,
            content: None,
            x,
            y,
            width,
            height,
            rotation: 0.0,
            locked: false,
            group_id: None,
            group_children: (kind == ElementKind::Group).then(Vec::new),
            styles: Styles::new(),
        }
    }

    /// Axis-aligned box, ignoring rotation.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Overwrite position and size from `rect`.
    pub fn set_bounds(&mut self, rect: Rect) {
        self.x = rect.x;
        self.y = rect.y;
        self.width = rect.width;
        self.height = rect.height;
    }

    #[must_use]
    pub fn is_group(&self) -> bool {
        self.kind == ElementKind::Group
    }

    /// Group children, or an empty slice for non-groups.
    #[must_use]
    pub fn children(&self) -> &[Element] {
        self.group_children.as_deref().unwrap_or(&[])
    }

    /// Deep clone with fresh ids for the element and, recursively, its children.
    #[must_use]
    pub fn reidentified(&self) -> Element {
        let mut copy = self.clone();
        copy.id = new_element_id(self.kind);
        if let Some(children) = &self.group_children {
            copy.group_children = Some(children.iter().map(Element::reidentified).collect());
        }
        copy
    }

    /// Replace the children with `start_children` scaled by `sx` / `sy`.
    ///
    /// Only child geometry is scaled; font sizes and other styles are left
    /// alone. No-op for non-groups.
    pub fn scale_children_from(&mut self, start_children: &[Element], sx: f64, sy: f64) {
        if !self.is_group() {
            return;
        }
        let scaled = start_children
            .iter()
            .map(|child| {
                let mut child = child.clone();
                child.set_bounds(child.bounds().scaled(sx, sy));
                child
            })
            .collect();
        self.group_children = Some(scaled);
    }

    /// Apply a sparse patch. Style keys with `null` values are removed.
    pub fn apply_patch(&mut self, patch: &ElementPatch) {
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(w) = patch.width {
            self.width = w;
        }
        if let Some(h) = patch.height {
            self.height = h;
        }
        if let Some(r) = patch.rotation {
            self.rotation = r;
        }
        if let Some(locked) = patch.locked {
            self.locked = locked;
        }
        if let Some(ref content) = patch.content {
            self.content = Some(content.clone());
        }
        if let Some(ref children) = patch.group_children {
            if self.is_group() {
                self.group_children = Some(children.clone());
            }
        }
        if let Some(ref styles) = patch.styles {
            for (k, v) in styles {
                if v.is_null() {
                    self.styles.remove(k);
                } else {
                    self.styles.insert(k.clone(), v.clone());
                }
            }
        }
    }
}

/// Sparse update for an element. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    /// Style keys to merge or remove (null values delete keys).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<Styles>,
    /// Replacement children; ignored for non-groups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_children: Option<Vec<Element>>,
}

impl ElementPatch {
    /// Patch that moves an element to `(x, y)`.
    #[must_use]
    pub fn position(x: f64, y: f64) -> Self {
        Self { x: Some(x), y: Some(y), ..Default::default() }
    }
}

/// Typed access to common style fields of an element.
pub struct StyleProps<'a> {
    styles: &'a Styles,
}

impl<'a> StyleProps<'a> {
    #[must_use]
    pub fn new(styles: &'a Styles) -> Self {
        Self { styles }
    }

    /// Fill color, if any.
    #[must_use]
    pub fn background_color(&self) -> Option<&'a str> {
        self.styles.get("backgroundColor").and_then(Value::as_str)
    }

    /// Text color. Defaults to black.
    #[must_use]
    pub fn color(&self) -> &'a str {
        self.styles.get("color").and_then(Value::as_str).unwrap_or("#000000")
    }

    /// Font size in layout units. Defaults to 16.
    #[must_use]
    pub fn font_size(&self) -> f64 {
        self.styles.get("fontSize").and_then(Value::as_f64).unwrap_or(16.0)
    }

    /// CSS font weight, as a string. Defaults to `"normal"`.
    #[must_use]
    pub fn font_weight(&self) -> String {
        match self.styles.get("fontWeight") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => "normal".to_owned(),
        }
    }

    /// Text alignment. Defaults to `"left"`.
    #[must_use]
    pub fn text_align(&self) -> &'a str {
        self.styles.get("textAlign").and_then(Value::as_str).unwrap_or("left")
    }

    /// Corner radius. Defaults to 0.
    #[must_use]
    pub fn border_radius(&self) -> f64 {
        self.styles.get("borderRadius").and_then(Value::as_f64).unwrap_or(0.0)
    }

    /// Opacity in `[0, 1]`. Defaults to 1.
    #[must_use]
    pub fn opacity(&self) -> f64 {
        self.styles
            .get("opacity")
            .and_then(Value::as_f64)
            .unwrap_or(1.0)
            .clamp(0.0, 1.0)
    }
}

// =============================================================
// Page
// =============================================================

/// Inset drawing region used by non-cover pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentArea {
    /// Inset from every page edge, in layout units.
    pub margin: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
}

fn default_background() -> String {
    "#ffffff".to_owned()
}

/// A page: elements in z-order (last drawn on top) plus page-level styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: ElementId,
    pub title: String,
    pub elements: Vec<Element>,
    #[serde(default = "default_background")]
    pub background_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_area: Option<ContentArea>,
}

impl Page {
    /// An empty white page with a fresh id.
    #[must_use]
    pub fn new(title: &str) -> Self {
        Self {
            id: new_page_id(),
            title: title.to_owned(),
            elements: Vec::new(),
            background_color: default_background(),
            content_area: None,
        }
    }

    /// Offset of the drawing region from the page's top-left corner.
    #[must_use]
    pub fn content_origin(&self) -> Point {
        let margin = self.content_area.as_ref().map_or(0.0, |c| c.margin);
        Point::new(margin, margin)
    }

    /// Size of the drawing region elements are positioned in.
    #[must_use]
    pub fn region_size(&self, page_width: f64, page_height: f64) -> (f64, f64) {
        let margin = self.content_area.as_ref().map_or(0.0, |c| c.margin);
        ((page_width - 2.0 * margin).max(0.0), (page_height - 2.0 * margin).max(0.0))
    }

    #[must_use]
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.elements.iter().position(|e| e.id == id)
    }

    #[must_use]
    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn element_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    /// Append an element on top of the stack.
    pub fn insert(&mut self, element: Element) {
        self.elements.push(element);
    }

    /// Remove an element by id, returning it if it was present.
    pub fn remove(&mut self, id: &str) -> Option<Element> {
        let index = self.index_of(id)?;
        Some(self.elements.remove(index))
    }

    /// Move an element to the top of the stack. Returns false if absent.
    pub fn bring_to_front(&mut self, id: &str) -> bool {
        let Some(element) = self.remove(id) else {
            return false;
        };
        self.elements.push(element);
        true
    }

    /// Move an element to the bottom of the stack. Returns false if absent.
    pub fn send_to_back(&mut self, id: &str) -> bool {
        let Some(element) = self.remove(id) else {
            return false;
        };
        self.elements.insert(0, element);
        true
    }

    /// Wrap the listed elements in a new group appended to the page.
    ///
    /// Needs at least two of `ids` on this page. The group sits at the union
    /// of the members' unrotated boxes; members become group-local children
    /// in page order. A member that is itself a group contributes its
    /// children instead, so groups stay one level deep.
    pub fn group(&mut self, ids: &[ElementId]) -> Option<ElementId> {
        let members: Vec<Element> = self.elements.iter().filter(|e| ids.contains(&e.id)).cloned().collect();
        if members.len() < 2 {
            return None;
        }
        let bounds = bounding_box(members.iter().map(Element::bounds))?;

        let mut children = Vec::new();
        for member in members {
            if member.is_group() {
                let (dx, dy) = (member.x - bounds.x, member.y - bounds.y);
                children.extend(member.children().iter().cloned().map(|c| detached(c, dx, dy)));
            } else {
                children.push(detached(member, -bounds.x, -bounds.y));
            }
        }

        let mut group = Element::new(ElementKind::Group, bounds.x, bounds.y, bounds.width, bounds.height);
        group.group_children = Some(children);
        let group_id = group.id.clone();

        self.elements.retain(|e| !ids.contains(&e.id));
        self.elements.push(group);
        Some(group_id)
    }

    /// Dissolve a group, putting its children back where the group was.
    ///
    /// Returns the released child ids, or `None` if `id` is not a group here.
    pub fn ungroup(&mut self, id: &str) -> Option<Vec<ElementId>> {
        let index = self.index_of(id)?;
        if !self.elements.get(index).is_some_and(Element::is_group) {
            return None;
        }
        let group = self.elements.remove(index);
        let released: Vec<Element> = group
            .group_children
            .unwrap_or_default()
            .into_iter()
            .map(|child| detached(child, group.x, group.y))
            .collect();
        let ids = released.iter().map(|c| c.id.clone()).collect();
        self.elements.splice(index..index, released);
        Some(ids)
    }

    /// Deep copy with a fresh page id, fresh element ids and a `(Copy)` title.
    #[must_use]
    pub fn duplicated(&self) -> Page {
        Page {
            id: new_page_id(),
            title: format!("{} (Copy)", self.title),
            elements: self.elements.iter().map(Element::reidentified).collect(),
            background_color: self.background_color.clone(),
            content_area: self.content_area.clone(),
        }
    }
}

// =============================================================
// Ids
// =============================================================

fn now_millis() -> u64 {
    #[cfg(target_arch = "wasm32")]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        js_sys::Date::now() as u64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }
}

fn random_suffix() -> String {
    let mut raw = Uuid::new_v4().simple().to_string();
    raw.truncate(9);
    raw
}

/// Move an element into another coordinate space and drop its group link.
fn detached(mut el: Element, dx: f64, dy: f64) -> Element {
    el.set_bounds(el.bounds().translated(dx, dy));
    el.group_id = None;
    el
}

/// Generate an element id of the form `{kind}-{millis}-{random}`.
#[must_use]
pub fn new_element_id(kind: ElementKind) -> ElementId {
    format!("{}-{}-{}", kind.as_str(), now_millis(), random_suffix())
}

/// Generate a page id of the form `p{millis}-{random}`.
#[must_use]
pub fn new_page_id() -> ElementId {
    format!("p{}-{}", now_millis(), random_suffix())
}

// =============================================================
// DocStore
// =============================================================

/// In-memory store of the document's pages and which of them are visible.
#[derive(Debug, Clone)]
pub struct DocStore {
    pages: Vec<Page>,
    active: usize,
    double_page: bool,
}

impl DocStore {
    /// Create a store from pages. An empty list gets one blank page.
    #[must_use]
    pub fn new(pages: Vec<Page>) -> Self {
        let mut store = Self { pages: Vec::new(), active: 0, double_page: false };
        store.replace_pages(pages);
        store
    }

    /// Replace every page, keeping the active index in range.
    pub fn replace_pages(&mut self, pages: Vec<Page>) {
        self.pages = if pages.is_empty() { vec![Page::new("New Page")] } else { pages };
        self.active = self.active.min(self.pages.len() - 1);
    }

    #[must_use]
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    #[must_use]
    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn page_mut(&mut self, index: usize) -> Option<&mut Page> {
        self.pages.get_mut(index)
    }

    #[must_use]
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Make `index` the active page. Returns false if out of range.
    pub fn set_active(&mut self, index: usize) -> bool {
        if index >= self.pages.len() {
            return false;
        }
        self.active = index;
        true
    }

    #[must_use]
    pub fn double_page(&self) -> bool {
        self.double_page
    }

    pub fn set_double_page(&mut self, on: bool) {
        self.double_page = on;
    }

    /// Indices of the pages on screen: the active page, then the facing page
    /// in double-page view when one exists.
    #[must_use]
    pub fn visible_pages(&self) -> Vec<usize> {
        let mut visible = vec![self.active];
        if self.double_page && self.active + 1 < self.pages.len() {
            visible.push(self.active + 1);
        }
        visible
    }

    /// Page index holding element `id` (top-level elements only).
    #[must_use]
    pub fn page_of(&self, id: &str) -> Option<usize> {
        self.pages.iter().position(|p| p.index_of(id).is_some())
    }

    /// Look up a top-level element anywhere in the document.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Element> {
        self.pages.iter().find_map(|p| p.element(id))
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.pages.iter_mut().find_map(|p| p.element_mut(id))
    }

    /// Apply a patch to an element. Returns false if the element doesn't exist.
    pub fn apply_patch(&mut self, id: &str, patch: &ElementPatch) -> bool {
        let Some(element) = self.get_mut(id) else {
            return false;
        };
        element.apply_patch(patch);
        true
    }

    /// Remove an element from whichever page holds it.
    pub fn remove(&mut self, id: &str) -> Option<Element> {
        self.pages.iter_mut().find_map(|p| p.remove(id))
    }

    /// Insert a page after `index` and return where it landed.
    pub fn insert_page_after(&mut self, index: usize, page: Page) -> usize {
        let at = (index + 1).min(self.pages.len());
        self.pages.insert(at, page);
        at
    }

    /// Total top-level elements across all pages.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.pages.iter().map(|p| p.elements.len()).sum()
    }
}

impl Default for DocStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
