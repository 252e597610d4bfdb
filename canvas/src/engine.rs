use tracing::{debug, trace};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::camera::{Camera, PageLayout, Point};
use crate::clipboard::Clipboard;
use crate::config::EditorConfig;
use crate::consts::MARQUEE_CLICK_SLOP;
use crate::doc::{DocStore, Element, ElementId, ElementPatch, Page};
use crate::geometry::{
    Rect, ResizeAnchor, SnapTargets, annotate_gaps, is_valid_size, resize, rotation_from_pointer, snap_angle,
    snap_position, snap_size,
};
use crate::hit::{self, Hit, HitPart};
use crate::history::{Frame, History};
use crate::input::{Button, InputState, Key, Marquee, Modifiers, PagePoint, UiState};
use crate::render;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers and operations for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The page list changed; the host may persist or refresh side panels.
    DocumentChanged,
    /// The selection changed to these ids.
    SelectionChanged(Vec<ElementId>),
    /// A different page became active.
    ActivePageChanged(usize),
    SetCursor(String),
    RenderNeeded,
}

/// Editor state and behavior with no dependency on a browser canvas.
///
/// [`Engine`] wraps this with the canvas element; tests drive it directly.
pub struct EngineCore {
    pub doc: DocStore,
    pub camera: Camera,
    pub ui: UiState,
    pub input: InputState,
    pub history: History,
    pub clipboard: Clipboard,
    pub config: EditorConfig,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub dpr: f64,
    show_grid: bool,
    cursor: &'static str,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::with_config(EditorConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with custom thresholds and history depth.
    #[must_use]
    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            doc: DocStore::default(),
            camera: Camera::default(),
            ui: UiState::default(),
            input: InputState::default(),
            history: History::new(config.history_limit),
            clipboard: Clipboard::default(),
            config,
            viewport_width: 0.0,
            viewport_height: 0.0,
            dpr: 1.0,
            show_grid: false,
            cursor: "default",
        }
    }

    // --- Data inputs ---

    /// Replace the whole document, e.g. after opening a project file.
    ///
    /// History, selection and any gesture in progress are discarded.
    pub fn load_pages(&mut self, pages: Vec<Page>) -> Vec<Action> {
        self.doc.replace_pages(pages);
        self.doc.set_active(0);
        self.history.clear();
        self.ui = UiState::default();
        self.input = InputState::Idle;
        debug!(pages = self.doc.pages().len(), elements = self.doc.element_count(), "loaded document");
        vec![
            Action::DocumentChanged,
            Action::SelectionChanged(Vec::new()),
            Action::ActivePageChanged(0),
            Action::RenderNeeded,
        ]
    }

    /// Switch the active page. Clears the selection.
    pub fn set_active_page(&mut self, index: usize) -> Vec<Action> {
        if index == self.doc.active_index() || !self.doc.set_active(index) {
            return Vec::new();
        }
        self.input = InputState::Idle;
        self.ui.clear_overlays();
        let mut actions = vec![Action::ActivePageChanged(index)];
        actions.extend(self.replace_selection(Vec::new()));
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Toggle side-by-side view of the active and following page.
    pub fn set_double_page(&mut self, on: bool) -> Vec<Action> {
        if self.doc.double_page() == on {
            return Vec::new();
        }
        self.doc.set_double_page(on);
        vec![Action::RenderNeeded]
    }

    /// Show or hide the background grid drawn under each visible page's elements.
    pub fn set_show_grid(&mut self, on: bool) -> Vec<Action> {
        if self.show_grid == on {
            return Vec::new();
        }
        self.show_grid = on;
        vec![Action::RenderNeeded]
    }

    #[must_use]
    pub fn show_grid(&self) -> bool {
        self.show_grid
    }

    /// Set the zoom factor. Non-positive or non-finite values are ignored.
    pub fn set_zoom(&mut self, zoom: f64) -> Vec<Action> {
        if !zoom.is_finite() || zoom <= 0.0 {
            return Vec::new();
        }
        self.camera.zoom = zoom;
        vec![Action::RenderNeeded]
    }

    /// Set the pan offset in CSS pixels.
    pub fn set_pan(&mut self, pan_x: f64, pan_y: f64) -> Vec<Action> {
        self.camera.pan_x = pan_x;
        self.camera.pan_y = pan_y;
        vec![Action::RenderNeeded]
    }

    /// Update viewport dimensions and device pixel ratio.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.viewport_width = width_css;
        self.viewport_height = height_css;
        self.dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
    }

    // --- Queries ---

    /// Selected ids in selection order.
    #[must_use]
    pub fn selection(&self) -> &[ElementId] {
        &self.ui.selection
    }

    /// Look up a top-level element by id on any page.
    #[must_use]
    pub fn element(&self, id: &str) -> Option<&Element> {
        self.doc.get(id)
    }

    #[must_use]
    pub fn pages(&self) -> &[Page] {
        self.doc.pages()
    }

    #[must_use]
    pub fn active_page(&self) -> usize {
        self.doc.active_index()
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    /// Placement of the visible pages in world space.
    #[must_use]
    pub fn layout(&self) -> PageLayout {
        PageLayout { page_width: self.config.page_width, page_height: self.config.page_height, gap: self.config.page_gap }
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // --- Selection & property edits ---

    /// Replace the selection. Ids that don't exist are dropped.
    pub fn select_elements(&mut self, ids: Vec<ElementId>) -> Vec<Action> {
        let mut kept: Vec<ElementId> = Vec::with_capacity(ids.len());
        for id in ids {
            if self.doc.get(&id).is_some() && !kept.contains(&id) {
                kept.push(id);
            }
        }
        match self.replace_selection(kept) {
            Some(changed) => vec![changed, Action::RenderNeeded],
            None => Vec::new(),
        }
    }

    /// Apply a property patch to one element.
    ///
    /// Does not record history; callers that want the edit undoable call
    /// [`Self::record_change`] first.
    pub fn update_element(&mut self, id: &str, patch: &ElementPatch) -> Vec<Action> {
        if !self.doc.apply_patch(id, patch) {
            return Vec::new();
        }
        vec![Action::DocumentChanged, Action::RenderNeeded]
    }

    /// Apply several patches at once. Unknown ids are skipped.
    pub fn update_elements(&mut self, updates: &[(ElementId, ElementPatch)]) -> Vec<Action> {
        let mut any = false;
        for (id, patch) in updates {
            any |= self.doc.apply_patch(id, patch);
        }
        if any { vec![Action::DocumentChanged, Action::RenderNeeded] } else { Vec::new() }
    }

    /// Push the current document onto the undo stack ahead of an external edit.
    pub fn record_change(&mut self) {
        self.history.record(self.doc.pages().to_vec());
    }

    // --- Structural operations ---

    /// Delete one element from whichever page holds it.
    pub fn delete_element(&mut self, id: &str) -> Vec<Action> {
        if self.doc.get(id).is_none() {
            return Vec::new();
        }
        self.record_change();
        self.doc.remove(id);
        debug!(%id, "deleted element");
        let kept = self.ui.selection.iter().filter(|s| *s != id).cloned().collect();
        self.committed(kept)
    }

    /// Delete every selected element.
    pub fn delete_selected(&mut self) -> Vec<Action> {
        let ids: Vec<ElementId> = self.ui.selection.iter().filter(|id| self.doc.get(id).is_some()).cloned().collect();
        if ids.is_empty() {
            return Vec::new();
        }
        self.record_change();
        for id in &ids {
            self.doc.remove(id);
        }
        debug!(count = ids.len(), "deleted selection");
        self.committed(Vec::new())
    }

    /// Clone an element next to itself and select the clone.
    pub fn duplicate_element(&mut self, id: &str) -> Vec<Action> {
        let Some(page_index) = self.doc.page_of(id) else {
            return Vec::new();
        };
        let Some(mut copy) = self.doc.get(id).map(Element::reidentified) else {
            return Vec::new();
        };
        copy.x += self.config.paste_offset;
        copy.y += self.config.paste_offset;
        let new_id = copy.id.clone();

        self.record_change();
        if let Some(page) = self.doc.page_mut(page_index) {
            page.insert(copy);
        }
        debug!(source = %id, %new_id, "duplicated element");
        self.committed(vec![new_id])
    }

    /// Group the selected elements, per page, when a page holds at least two of them.
    pub fn group(&mut self) -> Vec<Action> {
        let selection = self.ui.selection.clone();
        if selection.len() < 2 {
            return Vec::new();
        }
        let targets: Vec<usize> = (0..self.doc.pages().len())
            .filter(|&p| {
                self.doc
                    .page(p)
                    .is_some_and(|page| selection.iter().filter(|id| page.index_of(id).is_some()).count() >= 2)
            })
            .collect();
        if targets.is_empty() {
            return Vec::new();
        }

        self.record_change();
        let mut groups = Vec::new();
        for p in targets {
            if let Some(gid) = self.doc.page_mut(p).and_then(|page| page.group(&selection)) {
                groups.push(gid);
            }
        }
        debug!(members = selection.len(), groups = groups.len(), "grouped selection");
        self.committed(groups)
    }

    /// Dissolve every selected group; the released children become the selection.
    pub fn ungroup(&mut self) -> Vec<Action> {
        let groups: Vec<ElementId> =
            self.ui.selection.iter().filter(|id| self.doc.get(id).is_some_and(Element::is_group)).cloned().collect();
        if groups.is_empty() {
            return Vec::new();
        }

        self.record_change();
        let mut released = Vec::new();
        for gid in &groups {
            let Some(p) = self.doc.page_of(gid) else {
                continue;
            };
            if let Some(children) = self.doc.page_mut(p).and_then(|page| page.ungroup(gid)) {
                released.extend(children);
            }
        }
        debug!(groups = groups.len(), released = released.len(), "ungrouped selection");
        self.committed(released)
    }

    /// Move an element to the top of its page's stack.
    pub fn bring_forward(&mut self, id: &str) -> Vec<Action> {
        self.restack(id, true)
    }

    /// Move an element to the bottom of its page's stack.
    pub fn send_backward(&mut self, id: &str) -> Vec<Action> {
        self.restack(id, false)
    }

    fn restack(&mut self, id: &str, to_front: bool) -> Vec<Action> {
        let Some(p) = self.doc.page_of(id) else {
            return Vec::new();
        };
        let Some(page) = self.doc.page(p) else {
            return Vec::new();
        };
        let target = if to_front { page.elements.len() - 1 } else { 0 };
        if page.index_of(id) == Some(target) {
            return Vec::new();
        }

        self.record_change();
        if let Some(page) = self.doc.page_mut(p) {
            if to_front {
                page.bring_to_front(id);
            } else {
                page.send_to_back(id);
            }
        }
        debug!(%id, to_front, "restacked element");
        vec![Action::DocumentChanged, Action::RenderNeeded]
    }

    // --- Clipboard ---

    /// Copy the selection, or the active page when nothing is selected.
    pub fn copy(&mut self) {
        let elements: Vec<Element> = self.ui.selection.iter().filter_map(|id| self.doc.get(id)).cloned().collect();
        if let Some(first) = elements.first() {
            let source_page = self.doc.page_of(&first.id).unwrap_or(self.doc.active_index());
            debug!(count = elements.len(), source_page, "copied elements");
            self.clipboard = Clipboard::Elements { source_page, elements };
        } else if let Some(page) = self.doc.page(self.doc.active_index()) {
            debug!(page = %page.id, "copied page");
            self.clipboard = Clipboard::Page(page.clone());
        }
    }

    /// Paste copied elements onto the active page, or a copied page after it.
    pub fn paste(&mut self) -> Vec<Action> {
        if self.clipboard.is_empty() {
            return Vec::new();
        }
        let active = self.doc.active_index();
        if self.clipboard.element_count() > 0 {
            let Some(pasted) = self.clipboard.paste_elements(active, self.config.paste_offset) else {
                return Vec::new();
            };
            self.record_change();
            let ids: Vec<ElementId> = pasted.iter().map(|el| el.id.clone()).collect();
            if let Some(page) = self.doc.page_mut(active) {
                page.elements.extend(pasted);
            }
            debug!(count = ids.len(), page = active, "pasted elements");
            return self.committed(ids);
        }

        if !self.ui.selection.is_empty() {
            return Vec::new();
        }
        let Some(page) = self.clipboard.paste_page() else {
            return Vec::new();
        };
        self.record_change();
        let title = page.title.clone();
        let at = self.doc.insert_page_after(active, page);
        self.doc.set_active(at);
        debug!(%title, index = at, "pasted page");
        vec![Action::DocumentChanged, Action::ActivePageChanged(at), Action::RenderNeeded]
    }

    // --- History ---

    /// Restore the state before the most recent recorded mutation.
    pub fn undo(&mut self) -> Vec<Action> {
        if !self.history.can_undo() {
            return Vec::new();
        }
        let current = self.doc.pages().to_vec();
        match self.history.undo(current) {
            Some(frame) => self.restore(frame, "undo"),
            None => Vec::new(),
        }
    }

    /// Re-apply the most recently undone mutation.
    pub fn redo(&mut self) -> Vec<Action> {
        if !self.history.can_redo() {
            return Vec::new();
        }
        let current = self.doc.pages().to_vec();
        match self.history.redo(current) {
            Some(frame) => self.restore(frame, "redo"),
            None => Vec::new(),
        }
    }

    fn restore(&mut self, frame: Frame, direction: &'static str) -> Vec<Action> {
        let active_before = self.doc.active_index();
        self.doc.replace_pages(frame);
        self.input = InputState::Idle;
        self.ui.clear_overlays();

        let mut actions = vec![Action::DocumentChanged];
        let kept = self.ui.selection.iter().filter(|id| self.doc.get(id).is_some()).cloned().collect();
        actions.extend(self.replace_selection(kept));
        if self.doc.active_index() != active_before {
            actions.push(Action::ActivePageChanged(self.doc.active_index()));
        }
        actions.push(Action::RenderNeeded);
        debug!(direction, undo = self.history.undo_depth(), redo = self.history.redo_depth(), "restored frame");
        actions
    }

    // --- Keyboard ---

    /// Move every unlocked selected element by `(dx, dy)` as one undo step.
    pub fn nudge(&mut self, dx: f64, dy: f64) -> Vec<Action> {
        let moves: Vec<(ElementId, ElementPatch)> = self
            .ui
            .selection
            .iter()
            .filter_map(|id| self.doc.get(id))
            .filter(|el| !el.locked)
            .map(|el| (el.id.clone(), ElementPatch::position(el.x + dx, el.y + dy)))
            .collect();
        if moves.is_empty() {
            return Vec::new();
        }
        self.record_change();
        trace!(count = moves.len(), dx, dy, "nudged selection");
        self.update_elements(&moves)
    }

    /// Handle a key press. Ignored while a pointer gesture is active.
    pub fn on_key_down(&mut self, key: Key, modifiers: Modifiers) -> Vec<Action> {
        if !self.input.is_idle() {
            return Vec::new();
        }

        if modifiers.command() {
            if key.is_char('z') {
                return if modifiers.shift { self.redo() } else { self.undo() };
            }
            if key.is_char('y') {
                return self.redo();
            }
            if key.is_char('c') {
                self.copy();
                return Vec::new();
            }
            if key.is_char('v') {
                return self.paste();
            }
            if key.is_char('d') {
                return match self.ui.selection.first().cloned() {
                    Some(id) => self.duplicate_element(&id),
                    None => Vec::new(),
                };
            }
            if key.is_char('g') {
                return if modifiers.shift { self.ungroup() } else { self.group() };
            }
            return Vec::new();
        }

        if let Some((ux, uy)) = key.arrow_direction() {
            let step = self.config.nudge_step;
            return self.nudge(ux * step, uy * step);
        }

        match key.0.as_str() {
            "Delete" | "Backspace" => self.delete_selected(),
            "Escape" => self.select_elements(Vec::new()),
            _ => Vec::new(),
        }
    }

    // --- Pointer ---

    /// Start a gesture: select, drag, resize, rotate or marquee.
    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        if button != Button::Primary || !self.input.is_idle() {
            return Vec::new();
        }
        if let Some((id, part, at)) = self.handle_under(screen_pt) {
            return self.grab_handle(&id, part, at);
        }
        let Some(at) = self.locate(screen_pt) else {
            trace!("pointer down outside pages");
            let mut actions: Vec<Action> = self.replace_selection(Vec::new()).into_iter().collect();
            if !actions.is_empty() {
                actions.push(Action::RenderNeeded);
            }
            return actions;
        };
        let Some(page) = self.doc.page(at.page) else {
            return Vec::new();
        };

        match hit::hit_test(at.local, page, &self.ui.selection, self.camera.zoom) {
            Some(Hit { element_id, part: HitPart::Body }) => self.press_element(&element_id, at, modifiers),
            Some(Hit { element_id, part }) => self.grab_handle(&element_id, part, at),
            None => {
                trace!(page = at.page, "marquee start");
                self.input = InputState::Marqueeing { page: at.page, slot: at.slot, start: at.local };
                Vec::new()
            }
        }
    }

    /// Advance the active gesture, or update the hover cursor when idle.
    pub fn on_pointer_move(&mut self, screen_pt: Point, modifiers: Modifiers) -> Vec<Action> {
        let gesture = std::mem::take(&mut self.input);
        let actions = match &gesture {
            InputState::Idle => self.hover(screen_pt),
            InputState::Dragging { .. } => self.drag_to(screen_pt, &gesture),
            InputState::Resizing { .. } => self.resize_to(screen_pt, &gesture, modifiers),
            InputState::Rotating { .. } => self.rotate_to(screen_pt, &gesture, modifiers),
            InputState::Marqueeing { page, slot, start } => {
                let end = self.local_in_slot(screen_pt, *page, *slot);
                self.ui.marquee = Some(Marquee { page: *page, rect: Rect::from_points(*start, end) });
                vec![Action::RenderNeeded]
            }
        };
        self.input = gesture;
        actions
    }

    /// Finish the active gesture. Transforms are already applied; a marquee resolves here.
    pub fn on_pointer_up(&mut self, screen_pt: Point, button: Button, _modifiers: Modifiers) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        let gesture = std::mem::take(&mut self.input);
        trace!(gesture = gesture.name(), "pointer up");
        self.ui.clear_overlays();

        let mut actions = match gesture {
            InputState::Idle => return Vec::new(),
            InputState::Marqueeing { page, slot, start } => {
                let end = self.local_in_slot(screen_pt, page, slot);
                self.finish_marquee(page, Rect::from_points(start, end))
            }
            InputState::Dragging { id, .. } | InputState::Resizing { id, .. } | InputState::Rotating { id, .. } => {
                debug!(%id, "gesture committed");
                vec![Action::DocumentChanged]
            }
        };
        actions.extend(self.cursor_action("default"));
        actions.push(Action::RenderNeeded);
        actions
    }

    fn press_element(&mut self, id: &str, at: PagePoint, modifiers: Modifiers) -> Vec<Action> {
        let before = self.ui.selection.clone();
        let selected = if modifiers.multi_select() {
            self.ui.toggle(id)
        } else {
            self.ui.selection = vec![id.to_owned()];
            true
        };
        let mut actions = Vec::new();
        if self.ui.selection != before {
            actions.push(Action::SelectionChanged(self.ui.selection.clone()));
            actions.push(Action::RenderNeeded);
        }

        if !selected {
            return actions;
        }
        if self.doc.get(id).is_some_and(|el| el.locked) {
            trace!(%id, "locked element selected; no gesture");
            return actions;
        }
        self.begin_drag(id, at);
        actions.extend(self.cursor_action("move"));
        actions
    }

    fn begin_drag(&mut self, id: &str, at: PagePoint) {
        let Some(page) = self.doc.page(at.page) else {
            return;
        };
        let Some(grabbed) = page.element(id) else {
            return;
        };
        let start = grabbed.bounds();
        let moving: Vec<(ElementId, Point)> = self
            .ui
            .selection
            .iter()
            .filter_map(|sid| self.doc.get(sid))
            .filter(|el| !el.locked)
            .map(|el| (el.id.clone(), Point::new(el.x, el.y)))
            .collect();
        let neighbors: Vec<Rect> = page
            .elements
            .iter()
            .filter(|el| !moving.iter().any(|(mid, _)| *mid == el.id))
            .map(Element::bounds)
            .collect();
        let region = page.region_size(self.config.page_width, self.config.page_height);
        let targets = SnapTargets::collect(&neighbors, region.0, region.1);

        self.record_change();
        trace!(%id, moving = moving.len(), "drag start");
        self.input = InputState::Dragging {
            id: id.to_owned(),
            page: at.page,
            slot: at.slot,
            start_pointer: at.local,
            start,
            moving,
            targets,
            neighbors,
            region,
        };
    }

    fn begin_resize(&mut self, id: &str, anchor: ResizeAnchor, at: PagePoint) {
        let Some(page) = self.doc.page(at.page) else {
            return;
        };
        let Some(el) = page.element(id).filter(|el| !el.locked) else {
            return;
        };
        let start = el.bounds();
        let start_children = el.children().to_vec();
        let (widths, heights): (Vec<f64>, Vec<f64>) =
            page.elements.iter().filter(|other| other.id != id).map(|other| (other.width, other.height)).unzip();

        self.record_change();
        trace!(%id, ?anchor, "resize start");
        self.input = InputState::Resizing {
            id: id.to_owned(),
            page: at.page,
            slot: at.slot,
            anchor,
            start_pointer: at.local,
            start,
            start_children,
            widths,
            heights,
        };
    }

    fn begin_rotate(&mut self, id: &str, at: PagePoint) {
        let Some(el) = self.doc.page(at.page).and_then(|page| page.element(id)).filter(|el| !el.locked) else {
            return;
        };
        let center = el.bounds().center();

        self.record_change();
        trace!(%id, "rotate start");
        self.input = InputState::Rotating { id: id.to_owned(), page: at.page, slot: at.slot, center };
    }

    fn drag_to(&mut self, screen_pt: Point, gesture: &InputState) -> Vec<Action> {
        let InputState::Dragging { page, slot, start_pointer, start, moving, targets, neighbors, region, .. } = gesture
        else {
            return Vec::new();
        };
        let p = self.local_in_slot(screen_pt, *page, *slot);
        let proposed = Point::new(start.x + p.x - start_pointer.x, start.y + p.y - start_pointer.y);
        let snapped = snap_position(start.width, start.height, proposed, targets, self.config.snap_threshold);
        let (dx, dy) = (snapped.x - start.x, snapped.y - start.y);

        for (id, origin) in moving {
            self.doc.apply_patch(id, &ElementPatch::position(origin.x + dx, origin.y + dy));
        }

        let mut guides = snapped.guides;
        annotate_gaps(&mut guides, neighbors, region.0, region.1);
        self.ui.guides = guides;
        self.ui.guide_page = *page;
        vec![Action::RenderNeeded]
    }

    fn resize_to(&mut self, screen_pt: Point, gesture: &InputState, modifiers: Modifiers) -> Vec<Action> {
        let InputState::Resizing { id, page, slot, anchor, start_pointer, start, start_children, widths, heights } =
            gesture
        else {
            return Vec::new();
        };
        let p = self.local_in_slot(screen_pt, *page, *slot);
        let keep_aspect = modifiers.keep_aspect();
        let proposed =
            resize(*start, *anchor, p.x - start_pointer.x, p.y - start_pointer.y, keep_aspect, modifiers.precise());
        let rect = snap_size(proposed, *start, *anchor, keep_aspect, widths, heights, self.config.size_snap_threshold);
        if !is_valid_size(&rect, self.config.min_element_size) {
            trace!(%id, width = rect.width, height = rect.height, "resize below minimum; ignored");
            return Vec::new();
        }

        let Some(el) = self.doc.get_mut(id) else {
            return Vec::new();
        };
        el.set_bounds(rect);
        el.scale_children_from(start_children, rect.width / start.width, rect.height / start.height);
        vec![Action::RenderNeeded]
    }

    fn rotate_to(&mut self, screen_pt: Point, gesture: &InputState, modifiers: Modifiers) -> Vec<Action> {
        let InputState::Rotating { id, page, slot, center } = gesture else {
            return Vec::new();
        };
        let p = self.local_in_slot(screen_pt, *page, *slot);
        let raw = rotation_from_pointer(*center, p);
        let angle = if modifiers.snap_angle() { snap_angle(raw) } else { raw };
        let patch = ElementPatch { rotation: Some(angle), ..Default::default() };
        if self.doc.apply_patch(id, &patch) { vec![Action::RenderNeeded] } else { Vec::new() }
    }

    fn finish_marquee(&mut self, page: usize, rect: Rect) -> Vec<Action> {
        if rect.width < MARQUEE_CLICK_SLOP && rect.height < MARQUEE_CLICK_SLOP {
            trace!("empty-area click");
            return self.replace_selection(Vec::new()).into_iter().collect();
        }
        let hits: Vec<ElementId> = self
            .doc
            .page(page)
            .map(|p| p.elements.iter().filter(|el| el.bounds().intersects(&rect)).map(|el| el.id.clone()).collect())
            .unwrap_or_default();
        trace!(hits = hits.len(), "marquee end");
        if hits.is_empty() {
            return Vec::new();
        }
        self.replace_selection(hits).into_iter().collect()
    }

    fn hover(&mut self, screen_pt: Point) -> Vec<Action> {
        let hit = match self.handle_under(screen_pt) {
            Some((element_id, part, _)) => Some(Hit { element_id, part }),
            None => self.locate(screen_pt).and_then(|at| {
                let page = self.doc.page(at.page)?;
                hit::hit_test(at.local, page, &self.ui.selection, self.camera.zoom)
            }),
        };
        let cursor = match hit {
            Some(Hit { part: HitPart::ResizeHandle(anchor), .. }) => anchor.cursor(),
            Some(Hit { part: HitPart::RotateHandle, .. }) => "grab",
            Some(Hit { element_id, part: HitPart::Body }) => {
                if self.doc.get(&element_id).is_some_and(|el| el.locked) {
                    "not-allowed"
                } else {
                    "move"
                }
            }
            None => "default",
        };
        self.cursor_action(cursor).into_iter().collect()
    }

    /// Start a resize or rotate from a handle hit.
    fn grab_handle(&mut self, id: &str, part: HitPart, at: PagePoint) -> Vec<Action> {
        match part {
            HitPart::ResizeHandle(anchor) => {
                self.begin_resize(id, anchor, at);
                self.cursor_action(anchor.cursor()).into_iter().collect()
            }
            HitPart::RotateHandle => {
                self.begin_rotate(id, at);
                self.cursor_action("grabbing").into_iter().collect()
            }
            HitPart::Body => Vec::new(),
        }
    }

    // --- Helpers ---

    /// Map a screen point to the visible page under it, in drawing-region coordinates.
    fn locate(&self, screen_pt: Point) -> Option<PagePoint> {
        let world = self.camera.screen_to_world(screen_pt);
        let visible = self.doc.visible_pages();
        let (slot, on_page) = self.layout().slot_at(world, visible.len())?;
        let page = *visible.get(slot)?;
        let origin = self.doc.page(page)?.content_origin();
        Some(PagePoint { page, slot, local: on_page.relative_to(origin) })
    }

    /// The handle of the single selected element under a screen point. Handles
    /// stick out past the element, so this also finds them off the page.
    fn handle_under(&self, screen_pt: Point) -> Option<(ElementId, HitPart, PagePoint)> {
        let [id] = self.ui.selection.as_slice() else {
            return None;
        };
        let page = self.doc.page_of(id)?;
        let slot = self.doc.visible_pages().iter().position(|&p| p == page)?;
        let el = self.doc.page(page)?.element(id)?;
        let local = self.local_in_slot(screen_pt, page, slot);
        let part = hit::handle_hit(local, el, self.camera.zoom)?;
        Some((id.clone(), part, PagePoint { page, slot, local }))
    }

    /// Drawing-region coordinates of a screen point relative to a known page slot,
    /// whether or not the point is over that page.
    fn local_in_slot(&self, screen_pt: Point, page: usize, slot: usize) -> Point {
        let on_page = self.camera.screen_to_world(screen_pt).relative_to(self.layout().slot_origin(slot));
        let origin = self.doc.page(page).map_or(Point::new(0.0, 0.0), Page::content_origin);
        on_page.relative_to(origin)
    }

    fn replace_selection(&mut self, ids: Vec<ElementId>) -> Option<Action> {
        if self.ui.selection == ids {
            return None;
        }
        self.ui.selection = ids;
        Some(Action::SelectionChanged(self.ui.selection.clone()))
    }

    /// Standard result of a recorded mutation that also sets the selection.
    fn committed(&mut self, selection: Vec<ElementId>) -> Vec<Action> {
        let mut actions = vec![Action::DocumentChanged];
        actions.extend(self.replace_selection(selection));
        actions.push(Action::RenderNeeded);
        actions
    }

    fn cursor_action(&mut self, cursor: &'static str) -> Option<Action> {
        if self.cursor == cursor {
            return None;
        }
        self.cursor = cursor;
        Some(Action::SetCursor(cursor.to_owned()))
    }
}

/// The full canvas engine. Wraps `EngineCore` and owns the browser canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    pub core: EngineCore,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement, config: EditorConfig) -> Self {
        let mut core = EngineCore::with_config(config);
        core.set_viewport(f64::from(canvas.width()), f64::from(canvas.height()), 1.0);
        Self { canvas, core }
    }

    // --- Delegated data inputs ---

    pub fn load_pages(&mut self, pages: Vec<Page>) -> Vec<Action> {
        self.core.load_pages(pages)
    }

    pub fn set_active_page(&mut self, index: usize) -> Vec<Action> {
        self.core.set_active_page(index)
    }

    pub fn set_double_page(&mut self, on: bool) -> Vec<Action> {
        self.core.set_double_page(on)
    }

    pub fn set_show_grid(&mut self, on: bool) -> Vec<Action> {
        self.core.set_show_grid(on)
    }

    pub fn set_zoom(&mut self, zoom: f64) -> Vec<Action> {
        self.core.set_zoom(zoom)
    }

    /// Update viewport dimensions and device pixel ratio, resizing the backing store.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.core.set_viewport(width_css, height_css, dpr);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            self.canvas.set_width((width_css * self.core.dpr).round().max(0.0) as u32);
            self.canvas.set_height((height_css * self.core.dpr).round().max(0.0) as u32);
        }
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_down(screen_pt, button, modifiers)
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_move(screen_pt, modifiers)
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_up(screen_pt, button, modifiers)
    }

    pub fn on_key_down(&mut self, key: Key, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_key_down(key, modifiers)
    }

    // --- Render ---

    /// Draw the current state to the canvas.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the 2D context is unavailable or a `Canvas2D` call fails.
    pub fn render(&self) -> Result<(), JsValue> {
        let ctx = self
            .canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        render::draw(&ctx, &self.core)
    }
}
