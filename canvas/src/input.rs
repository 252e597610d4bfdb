//! Input model: modifier keys, mouse buttons, keys, and the gesture state machine.
//!
//! `Modifiers` captures the user's intent at the time of a pointer or key
//! event. `UiState` is what the renderer needs beyond the document: the
//! selection plus transient overlays (snap guides, marquee). `InputState` is
//! the active gesture between pointer-down and pointer-up, carrying the
//! gesture-start geometry every pointer-move is computed from.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::Point;
use crate::doc::{Element, ElementId};
use crate::geometry::{Rect, ResizeAnchor, SnapGuide, SnapTargets};

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Toggle-in-selection on click.
    #[must_use]
    pub fn multi_select(self) -> bool {
        self.shift || self.ctrl || self.meta
    }

    /// Shortcut modifier (Ctrl on most platforms, Command on macOS).
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }

    /// Keep the start aspect ratio while resizing.
    #[must_use]
    pub fn keep_aspect(self) -> bool {
        self.shift
    }

    /// Round resize deltas to whole units.
    #[must_use]
    pub fn precise(self) -> bool {
        self.alt
    }

    /// Snap rotation to common angles.
    #[must_use]
    pub fn snap_angle(self) -> bool {
        self.shift
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the browser (e.g. `"Delete"`, `"ArrowLeft"`, `"z"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    /// Unit step for arrow keys, `None` for every other key.
    #[must_use]
    pub fn arrow_direction(&self) -> Option<(f64, f64)> {
        match self.0.as_str() {
            "ArrowLeft" => Some((-1.0, 0.0)),
            "ArrowRight" => Some((1.0, 0.0)),
            "ArrowUp" => Some((0.0, -1.0)),
            "ArrowDown" => Some((0.0, 1.0)),
            _ => None,
        }
    }

    /// Case-insensitive comparison against a single-character shortcut.
    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        let mut chars = self.0.chars();
        chars.next().is_some_and(|first| first.eq_ignore_ascii_case(&c)) && chars.next().is_none()
    }
}

/// A rubber-band rectangle on one page, in page-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marquee {
    /// Index of the page the marquee is drawn on.
    pub page: usize,
    pub rect: Rect,
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Selected element ids in selection order; the first one is primary.
    pub selection: Vec<ElementId>,
    /// Snap guides for the active drag, in page-local coordinates.
    pub guides: Vec<SnapGuide>,
    /// Page the guides belong to.
    pub guide_page: usize,
    /// Marquee while one is being dragged.
    pub marquee: Option<Marquee>,
}

impl UiState {
    #[must_use]
    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.iter().any(|s| s == id)
    }

    /// Add `id` if absent, remove it if present. Returns whether it is now selected.
    pub fn toggle(&mut self, id: &str) -> bool {
        if let Some(index) = self.selection.iter().position(|s| s == id) {
            self.selection.remove(index);
            false
        } else {
            self.selection.push(id.to_owned());
            true
        }
    }

    /// Drop transient overlays.
    pub fn clear_overlays(&mut self) {
        self.guides.clear();
        self.marquee = None;
    }
}

/// Where a pointer-down landed, in document terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PagePoint {
    /// Index into the document's page list.
    pub page: usize,
    /// Visible slot of that page (0 = active, 1 = facing page).
    pub slot: usize,
    /// Coordinates relative to the page's drawing region.
    pub local: Point,
}

/// Internal state for the input state machine.
///
/// Each active variant carries the gesture context needed to compute the next
/// geometry from the gesture start, never incrementally.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Moving the selection by dragging one of its elements.
    Dragging {
        /// Id of the element under the pointer; snapping uses its box.
        id: ElementId,
        /// Page holding the grabbed element.
        page: usize,
        /// Visible slot of that page.
        slot: usize,
        /// Pointer position at pointer-down, page-local.
        start_pointer: Point,
        /// Grabbed element box at pointer-down.
        start: Rect,
        /// Every unlocked selected element with its position at pointer-down.
        moving: Vec<(ElementId, Point)>,
        /// Alignment lines from the non-moving elements and the page region.
        targets: SnapTargets,
        /// Non-moving element boxes, for gap labels.
        neighbors: Vec<Rect>,
        /// Drawing region size of the page.
        region: (f64, f64),
    },
    /// Resizing the single selected element by one of its handles.
    Resizing {
        id: ElementId,
        page: usize,
        slot: usize,
        anchor: ResizeAnchor,
        start_pointer: Point,
        start: Rect,
        /// Group children at pointer-down; scaled from these on every move.
        start_children: Vec<Element>,
        /// Widths of the other elements on the page.
        widths: Vec<f64>,
        /// Heights of the other elements on the page.
        heights: Vec<f64>,
    },
    /// Rotating the single selected element around its center.
    Rotating {
        id: ElementId,
        page: usize,
        slot: usize,
        /// Element center, page-local.
        center: Point,
    },
    /// Dragging a selection rectangle over empty page area.
    Marqueeing {
        page: usize,
        slot: usize,
        /// Page-local corner where the drag started.
        start: Point,
    },
}

impl InputState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Short name for tracing.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Dragging { .. } => "dragging",
            Self::Resizing { .. } => "resizing",
            Self::Rotating { .. } => "rotating",
            Self::Marqueeing { .. } => "marqueeing",
        }
    }
}
