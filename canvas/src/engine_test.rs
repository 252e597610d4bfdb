#![allow(clippy::float_cmp)]

use super::*;
use crate::doc::{ContentArea, ElementKind};
use crate::geometry::Orientation;

// =============================================================
// Helpers
// =============================================================

fn shape(id: &str, x: f64, y: f64, w: f64, h: f64) -> Element {
    let mut el = Element::new(ElementKind::Shape, x, y, w, h);
    el.id = id.to_owned();
    el
}

fn page(id: &str, elements: Vec<Element>) -> Page {
    let mut page = Page::new(id);
    page.id = id.to_owned();
    page.elements = elements;
    page
}

fn core_with(elements: Vec<Element>) -> EngineCore {
    let mut core = EngineCore::new();
    core.load_pages(vec![page("p1", elements)]);
    core
}

/// Page 1 holds A and B side by side, as in the snapping scenario.
fn scenario() -> EngineCore {
    core_with(vec![shape("a", 0.0, 0.0, 100.0, 50.0), shape("b", 200.0, 0.0, 100.0, 50.0)])
}

fn el<'a>(core: &'a EngineCore, id: &str) -> &'a Element {
    core.element(id).unwrap()
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn no_mods() -> Modifiers {
    Modifiers::default()
}

fn shift() -> Modifiers {
    Modifiers { shift: true, ..Default::default() }
}

fn ctrl() -> Modifiers {
    Modifiers { ctrl: true, ..Default::default() }
}

fn key(name: &str) -> Key {
    Key(name.to_owned())
}

fn ids(list: &[&str]) -> Vec<ElementId> {
    list.iter().map(|s| (*s).to_owned()).collect()
}

/// Full gesture: press at `from`, move to each point in `path`, release at the last one.
fn gesture(core: &mut EngineCore, from: Point, path: &[Point], mods: Modifiers) -> Vec<Action> {
    let mut actions = core.on_pointer_down(from, Button::Primary, mods);
    for &p in path {
        actions.extend(core.on_pointer_move(p, mods));
    }
    let end = path.last().copied().unwrap_or(from);
    actions.extend(core.on_pointer_up(end, Button::Primary, mods));
    actions
}

fn has_action(actions: &[Action], pred: impl Fn(&Action) -> bool) -> bool {
    actions.iter().any(pred)
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// =============================================================
// Construction and data inputs
// =============================================================

#[test]
fn core_new_has_one_blank_page_and_no_selection() {
    let core = EngineCore::new();
    assert_eq!(core.pages().len(), 1);
    assert!(core.selection().is_empty());
    assert!(!core.can_undo());
    assert_eq!(core.camera().zoom, 1.0);
}

#[test]
fn load_pages_resets_history_and_selection() {
    let mut core = scenario();
    core.select_elements(ids(&["a"]));
    core.nudge(1.0, 0.0);
    assert!(core.can_undo());

    let actions = core.load_pages(vec![page("fresh", vec![])]);
    assert!(has_action(&actions, |a| matches!(a, Action::DocumentChanged)));
    assert!(!core.can_undo());
    assert!(core.selection().is_empty());
    assert_eq!(core.pages()[0].id, "fresh");
}

#[test]
fn set_zoom_rejects_non_positive() {
    let mut core = EngineCore::new();
    assert!(core.set_zoom(0.0).is_empty());
    assert!(core.set_zoom(f64::NAN).is_empty());
    assert_eq!(core.set_zoom(2.0), vec![Action::RenderNeeded]);
    assert_eq!(core.camera().zoom, 2.0);
}

#[test]
fn select_elements_drops_unknown_and_duplicate_ids() {
    let mut core = scenario();
    let actions = core.select_elements(ids(&["b", "zzz", "a", "b"]));
    assert_eq!(core.selection(), ["b", "a"]);
    assert!(has_action(&actions, |a| matches!(a, Action::SelectionChanged(s) if s.len() == 2)));
    assert!(core.select_elements(ids(&["b", "a"])).is_empty());
}

#[test]
fn update_element_patches_without_history() {
    let mut core = scenario();
    let actions = core.update_element("a", &ElementPatch::position(5.0, 6.0));
    assert!(has_action(&actions, |a| matches!(a, Action::DocumentChanged)));
    assert_eq!((el(&core, "a").x, el(&core, "a").y), (5.0, 6.0));
    assert!(!core.can_undo());
    assert!(core.update_element("missing", &ElementPatch::position(1.0, 1.0)).is_empty());
}

#[test]
fn record_change_makes_external_edit_undoable() {
    let mut core = scenario();
    core.record_change();
    core.update_element("a", &ElementPatch { rotation: Some(30.0), ..Default::default() });
    core.undo();
    assert_eq!(el(&core, "a").rotation, 0.0);
}

#[test]
fn update_elements_applies_batch() {
    let mut core = scenario();
    let updates = vec![
        ("a".to_owned(), ElementPatch::position(1.0, 1.0)),
        ("b".to_owned(), ElementPatch::position(2.0, 2.0)),
        ("nope".to_owned(), ElementPatch::position(3.0, 3.0)),
    ];
    assert!(!core.update_elements(&updates).is_empty());
    assert_eq!(el(&core, "b").x, 2.0);
}

// =============================================================
// Selection by pointer
// =============================================================

#[test]
fn click_selects_single_element() {
    let mut core = scenario();
    let actions = gesture(&mut core, pt(50.0, 25.0), &[], no_mods());
    assert_eq!(core.selection(), ["a"]);
    assert!(has_action(&actions, |a| matches!(a, Action::SelectionChanged(_))));
}

#[test]
fn plain_click_replaces_selection() {
    let mut core = scenario();
    core.select_elements(ids(&["a", "b"]));
    gesture(&mut core, pt(250.0, 25.0), &[], no_mods());
    assert_eq!(core.selection(), ["b"]);
}

#[test]
fn modifier_click_toggles_membership() {
    let mut core = scenario();
    gesture(&mut core, pt(50.0, 25.0), &[], no_mods());
    gesture(&mut core, pt(250.0, 25.0), &[], shift());
    assert_eq!(core.selection(), ["a", "b"]);
    gesture(&mut core, pt(50.0, 25.0), &[], Modifiers { meta: true, ..Default::default() });
    assert_eq!(core.selection(), ["b"]);
}

#[test]
fn toggling_out_starts_no_gesture() {
    let mut core = scenario();
    core.select_elements(ids(&["a", "b"]));
    core.on_pointer_down(pt(50.0, 25.0), Button::Primary, shift());
    assert!(core.input.is_idle());
    assert!(!core.can_undo());
}

#[test]
fn click_on_empty_page_area_clears_selection() {
    let mut core = scenario();
    core.select_elements(ids(&["a"]));
    gesture(&mut core, pt(400.0, 400.0), &[], no_mods());
    assert!(core.selection().is_empty());
}

#[test]
fn click_outside_pages_clears_selection() {
    let mut core = scenario();
    core.select_elements(ids(&["a"]));
    let actions = core.on_pointer_down(pt(-50.0, -50.0), Button::Primary, no_mods());
    assert!(core.selection().is_empty());
    assert!(has_action(&actions, |a| matches!(a, Action::SelectionChanged(s) if s.is_empty())));
    assert!(core.input.is_idle());
}

#[test]
fn non_primary_button_is_ignored() {
    let mut core = scenario();
    assert!(core.on_pointer_down(pt(50.0, 25.0), Button::Secondary, no_mods()).is_empty());
    assert!(core.selection().is_empty());
}

#[test]
fn pointer_down_during_gesture_is_ignored() {
    let mut core = scenario();
    core.on_pointer_down(pt(50.0, 25.0), Button::Primary, no_mods());
    assert!(core.on_pointer_down(pt(250.0, 25.0), Button::Primary, no_mods()).is_empty());
    assert_eq!(core.selection(), ["a"]);
    assert_eq!(core.input.name(), "dragging");
}

#[test]
fn zoom_maps_screen_to_page() {
    let mut core = scenario();
    core.set_zoom(2.0);
    gesture(&mut core, pt(100.0, 50.0), &[], no_mods());
    assert_eq!(core.selection(), ["a"]);
}

#[test]
fn content_area_margin_offsets_hits() {
    let mut p = page("p1", vec![shape("a", 0.0, 0.0, 100.0, 50.0)]);
    p.content_area = Some(ContentArea { margin: 40.0, background_color: None });
    let mut core = EngineCore::new();
    core.load_pages(vec![p]);

    gesture(&mut core, pt(20.0, 20.0), &[], no_mods());
    assert!(core.selection().is_empty());
    gesture(&mut core, pt(90.0, 65.0), &[], no_mods());
    assert_eq!(core.selection(), ["a"]);
}

#[test]
fn double_page_view_hits_facing_page() {
    let mut core = EngineCore::new();
    core.load_pages(vec![page("p1", vec![]), page("p2", vec![shape("right", 10.0, 10.0, 50.0, 50.0)])]);
    gesture(&mut core, pt(808.0, 20.0), &[], no_mods());
    assert!(core.selection().is_empty());

    core.set_double_page(true);
    gesture(&mut core, pt(808.0, 20.0), &[], no_mods());
    assert_eq!(core.selection(), ["right"]);
}

#[test]
fn show_grid_toggle_requests_render_only_on_change() {
    let mut core = scenario();
    assert!(!core.show_grid());
    assert_eq!(core.set_show_grid(true), vec![Action::RenderNeeded]);
    assert!(core.show_grid());
    assert!(core.set_show_grid(true).is_empty());
    assert_eq!(core.set_show_grid(false), vec![Action::RenderNeeded]);
    assert!(!core.show_grid());
    assert!(!core.can_undo());
}

#[test]
fn hover_reports_cursor_changes_once() {
    let mut core = scenario();
    let actions = core.on_pointer_move(pt(50.0, 25.0), no_mods());
    assert_eq!(actions, vec![Action::SetCursor("move".into())]);
    assert!(core.on_pointer_move(pt(60.0, 25.0), no_mods()).is_empty());
    let actions = core.on_pointer_move(pt(500.0, 500.0), no_mods());
    assert_eq!(actions, vec![Action::SetCursor("default".into())]);
}

// =============================================================
// Dragging and snapping
// =============================================================

#[test]
fn drag_snaps_right_edge_to_neighbor_left_edge() {
    let mut core = scenario();
    core.on_pointer_down(pt(50.0, 25.0), Button::Primary, no_mods());
    core.on_pointer_move(pt(147.0, 25.0), no_mods());

    assert_eq!(el(&core, "a").x, 100.0);
    let vertical: Vec<_> = core.ui.guides.iter().filter(|g| g.orientation == Orientation::Vertical).collect();
    assert_eq!(vertical.len(), 1);
    assert_eq!(vertical[0].position, 200.0);
    assert_eq!(vertical[0].gap_start, 0.0);
    assert_eq!(vertical[0].gap_end, 0.0);

    core.on_pointer_up(pt(147.0, 25.0), Button::Primary, no_mods());
    assert!(core.ui.guides.is_empty());
    assert_eq!(el(&core, "a").x, 100.0);
}

#[test]
fn drag_outside_threshold_does_not_snap() {
    let mut core = core_with(vec![shape("a", 100.0, 300.0, 50.0, 50.0), shape("b", 400.0, 600.0, 50.0, 50.0)]);
    gesture(&mut core, pt(125.0, 325.0), &[pt(138.0, 342.0)], no_mods());
    assert_eq!((el(&core, "a").x, el(&core, "a").y), (113.0, 317.0));
}

#[test]
fn drag_gap_labels_measure_to_neighbors() {
    let mut core = core_with(vec![
        shape("left", 0.0, 500.0, 100.0, 50.0),
        shape("a", 300.0, 300.0, 50.0, 50.0),
        shape("right", 500.0, 500.0, 100.0, 50.0),
    ]);
    // Center a's midline on x = 397 (page center): left edge at 372.
    core.on_pointer_down(pt(325.0, 325.0), Button::Primary, no_mods());
    core.on_pointer_move(pt(398.0, 325.0), no_mods());
    assert_eq!(el(&core, "a").x, 372.0);
    let guide = core.ui.guides.iter().find(|g| g.orientation == Orientation::Vertical).unwrap();
    assert_eq!(guide.position, 397.0);
    assert_eq!(guide.gap_start, 297.0);
    assert_eq!(guide.gap_end, 103.0);
}

#[test]
fn multi_drag_moves_selection_by_grabbed_delta() {
    let mut core = core_with(vec![shape("a", 100.0, 300.0, 50.0, 50.0), shape("b", 400.0, 600.0, 50.0, 50.0)]);
    core.select_elements(ids(&["b"]));
    gesture(&mut core, pt(125.0, 325.0), &[pt(130.0, 330.0), pt(138.0, 342.0)], shift());
    assert_eq!(core.selection(), ["b", "a"]);
    assert_eq!((el(&core, "a").x, el(&core, "a").y), (113.0, 317.0));
    assert_eq!((el(&core, "b").x, el(&core, "b").y), (413.0, 617.0));
}

#[test]
fn multi_drag_skips_locked_members() {
    let mut pinned = shape("pinned", 400.0, 600.0, 50.0, 50.0);
    pinned.locked = true;
    let mut core = core_with(vec![shape("a", 100.0, 300.0, 50.0, 50.0), pinned]);
    core.select_elements(ids(&["pinned"]));
    gesture(&mut core, pt(125.0, 325.0), &[pt(138.0, 342.0)], shift());
    assert_eq!(el(&core, "a").x, 113.0);
    assert_eq!((el(&core, "pinned").x, el(&core, "pinned").y), (400.0, 600.0));
}

#[test]
fn drag_is_one_history_frame() {
    let mut core = scenario();
    let path: Vec<Point> = (0..30).map(|i| pt(50.0 + f64::from(i), 300.0)).collect();
    let actions = gesture(&mut core, pt(50.0, 25.0), &path, no_mods());
    assert_eq!(core.history.undo_depth(), 1);
    assert_eq!(actions.iter().filter(|a| matches!(a, Action::DocumentChanged)).count(), 1);

    core.undo();
    assert_eq!((el(&core, "a").x, el(&core, "a").y), (0.0, 0.0));
}

#[test]
fn snap_result_is_deterministic() {
    let run = || {
        let mut core = scenario();
        core.on_pointer_down(pt(50.0, 25.0), Button::Primary, no_mods());
        core.on_pointer_move(pt(148.5, 27.0), no_mods());
        (el(&core, "a").bounds(), core.ui.guides.clone())
    };
    assert_eq!(run(), run());
}

// =============================================================
// Locked elements
// =============================================================

#[test]
fn locked_element_never_moves() {
    let mut locked = shape("lock", 100.0, 100.0, 100.0, 100.0);
    locked.locked = true;
    let mut core = core_with(vec![locked]);
    let before = el(&core, "lock").clone();

    gesture(&mut core, pt(150.0, 150.0), &[pt(300.0, 400.0)], no_mods());
    assert_eq!(core.selection(), ["lock"]);
    // Where the handles would be for an unlocked element.
    gesture(&mut core, pt(200.0, 200.0), &[pt(260.0, 260.0)], no_mods());
    gesture(&mut core, pt(150.0, 76.0), &[pt(300.0, 150.0)], no_mods());
    gesture(&mut core, pt(150.0, 150.0), &[pt(10.0, 10.0)], shift());

    let after = el(&core, "lock");
    assert_eq!(after.bounds(), before.bounds());
    assert_eq!(after.rotation, before.rotation);
    assert!(!core.can_undo());
}

// =============================================================
// Resizing
// =============================================================

fn resizable() -> EngineCore {
    let mut core = core_with(vec![shape("r", 100.0, 100.0, 200.0, 100.0)]);
    core.select_elements(ids(&["r"]));
    core
}

#[test]
fn se_handle_resizes_both_axes() {
    let mut core = resizable();
    gesture(&mut core, pt(300.0, 200.0), &[pt(340.0, 230.0)], no_mods());
    assert_eq!(el(&core, "r").bounds(), Rect::new(100.0, 100.0, 240.0, 130.0));
    assert_eq!(core.history.undo_depth(), 1);
}

#[test]
fn nw_handle_keeps_opposite_corner() {
    let mut core = resizable();
    gesture(&mut core, pt(100.0, 100.0), &[pt(130.0, 120.0)], no_mods());
    let r = el(&core, "r").bounds();
    assert_eq!(r, Rect::new(130.0, 120.0, 170.0, 80.0));
    assert_eq!((r.right(), r.bottom()), (300.0, 200.0));
}

#[test]
fn edge_handle_changes_one_axis() {
    let mut core = resizable();
    gesture(&mut core, pt(300.0, 150.0), &[pt(350.0, 190.0)], no_mods());
    assert_eq!(el(&core, "r").bounds(), Rect::new(100.0, 100.0, 250.0, 100.0));
}

#[test]
fn aspect_lock_holds_for_every_corner() {
    let corners = [(pt(100.0, 100.0), pt(60.0, 90.0)), (pt(300.0, 100.0), pt(337.0, 120.0)), (pt(100.0, 200.0), pt(70.0, 260.0)), (pt(300.0, 200.0), pt(351.0, 211.0))];
    for (handle, to) in corners {
        let mut core = resizable();
        gesture(&mut core, handle, &[to], shift());
        let r = el(&core, "r").bounds();
        assert!(approx(r.width / r.height, 2.0), "ratio broke for handle at {handle:?}: {r:?}");
        assert_eq!(core.selection(), ["r"]);
    }
}

#[test]
fn precision_modifier_rounds_deltas() {
    let mut core = resizable();
    let alt = Modifiers { alt: true, ..Default::default() };
    gesture(&mut core, pt(300.0, 200.0), &[pt(310.4, 205.6)], alt);
    assert_eq!(el(&core, "r").bounds(), Rect::new(100.0, 100.0, 210.0, 106.0));
}

#[test]
fn resize_never_goes_to_minimum() {
    let mut core = resizable();
    core.on_pointer_down(pt(300.0, 200.0), Button::Primary, no_mods());
    core.on_pointer_move(pt(150.0, 150.0), no_mods());
    assert_eq!(el(&core, "r").bounds(), Rect::new(100.0, 100.0, 50.0, 50.0));

    for p in [pt(105.0, 150.0), pt(110.0, 150.0), pt(150.0, 110.0), pt(0.0, 0.0), pt(111.0, 105.0)] {
        core.on_pointer_move(p, no_mods());
        let r = el(&core, "r").bounds();
        assert!(r.width > 10.0 && r.height > 10.0, "{r:?}");
    }
    core.on_pointer_up(pt(111.0, 105.0), Button::Primary, no_mods());
    assert_eq!(el(&core, "r").bounds(), Rect::new(100.0, 100.0, 50.0, 50.0));
}

#[test]
fn resize_snaps_to_neighbor_width() {
    let mut core = core_with(vec![shape("r", 100.0, 100.0, 200.0, 100.0), shape("n", 100.0, 500.0, 250.0, 40.0)]);
    core.select_elements(ids(&["r"]));
    gesture(&mut core, pt(300.0, 150.0), &[pt(348.5, 150.0)], no_mods());
    assert_eq!(el(&core, "r").width, 250.0);
}

#[test]
fn group_resize_scales_children_not_fonts() {
    let mut core = scenario();
    core.update_element("a", &ElementPatch { styles: Some(serde_json::json!({ "fontSize": 20 }).as_object().cloned().unwrap()), ..Default::default() });
    core.select_elements(ids(&["a", "b"]));
    core.group();
    let gid = core.selection()[0].clone();

    gesture(&mut core, pt(300.0, 50.0), &[pt(600.0, 100.0)], no_mods());
    let group = el(&core, &gid);
    assert_eq!(group.bounds(), Rect::new(0.0, 0.0, 600.0, 100.0));
    assert_eq!(group.children()[0].bounds(), Rect::new(0.0, 0.0, 200.0, 100.0));
    assert_eq!(group.children()[1].bounds(), Rect::new(400.0, 0.0, 200.0, 100.0));
    assert_eq!(group.children()[0].styles.get("fontSize"), Some(&serde_json::json!(20)));
}

// =============================================================
// Rotation
// =============================================================

fn rotatable() -> EngineCore {
    let mut core = core_with(vec![shape("r", 100.0, 100.0, 100.0, 100.0)]);
    core.select_elements(ids(&["r"]));
    core
}

#[test]
fn rotate_handle_sets_angle_from_pointer() {
    let mut core = rotatable();
    gesture(&mut core, pt(150.0, 76.0), &[pt(250.0, 150.0)], no_mods());
    assert!(approx(el(&core, "r").rotation, 90.0));
    assert_eq!(core.history.undo_depth(), 1);
}

#[test]
fn rotate_with_shift_snaps_to_common_angle() {
    let mut core = rotatable();
    gesture(&mut core, pt(150.0, 76.0), &[pt(250.0, 155.0)], shift());
    assert_eq!(el(&core, "r").rotation, 90.0);
}

#[test]
fn rotation_stays_in_range() {
    let mut core = rotatable();
    gesture(&mut core, pt(150.0, 76.0), &[pt(149.0, 50.0)], no_mods());
    let r = el(&core, "r").rotation;
    assert!((0.0..360.0).contains(&r));
    assert!(r > 359.0);
}

#[test]
fn rotate_handle_above_page_edge_is_grabbable() {
    let mut core = core_with(vec![shape("t", 100.0, 0.0, 100.0, 50.0)]);
    core.select_elements(ids(&["t"]));

    let hover = core.on_pointer_move(pt(150.0, -24.0), no_mods());
    assert!(has_action(&hover, |a| matches!(a, Action::SetCursor(c) if c == "grab")));

    core.on_pointer_down(pt(150.0, -24.0), Button::Primary, no_mods());
    assert_eq!(core.input.name(), "rotating");
    assert_eq!(core.ui.selection, ids(&["t"]));

    core.on_pointer_move(pt(250.0, 25.0), no_mods());
    core.on_pointer_up(pt(250.0, 25.0), Button::Primary, no_mods());
    assert!(approx(el(&core, "t").rotation, 90.0));
}

#[test]
fn resize_handle_left_of_page_edge_is_grabbable() {
    let mut core = core_with(vec![shape("w", 0.0, 100.0, 100.0, 50.0)]);
    core.select_elements(ids(&["w"]));

    core.on_pointer_down(pt(-3.0, 125.0), Button::Primary, no_mods());
    assert_eq!(core.input.name(), "resizing");

    core.on_pointer_move(pt(-23.0, 125.0), no_mods());
    core.on_pointer_up(pt(-23.0, 125.0), Button::Primary, no_mods());
    let r = el(&core, "w").bounds();
    assert_eq!((r.x, r.width), (-20.0, 120.0));
    assert_eq!(core.ui.selection, ids(&["w"]));
}

#[test]
fn off_page_press_away_from_handles_still_deselects() {
    let mut core = core_with(vec![shape("t", 100.0, 0.0, 100.0, 50.0)]);
    core.select_elements(ids(&["t"]));
    let actions = core.on_pointer_down(pt(400.0, -60.0), Button::Primary, no_mods());
    assert!(core.input.is_idle());
    assert!(core.ui.selection.is_empty());
    assert!(has_action(&actions, |a| matches!(a, Action::SelectionChanged(s) if s.is_empty())));
}

// =============================================================
// Marquee
// =============================================================

#[test]
fn marquee_selects_overlapping_elements() {
    let mut core = scenario();
    core.on_pointer_down(pt(50.0, 400.0), Button::Primary, no_mods());
    core.on_pointer_move(pt(250.0, 20.0), no_mods());
    assert!(core.ui.marquee.is_some());
    core.on_pointer_up(pt(250.0, 20.0), Button::Primary, no_mods());

    assert_eq!(core.selection(), ["a", "b"]);
    assert!(core.ui.marquee.is_none());
    assert!(!core.can_undo());
}

#[test]
fn marquee_replaces_even_with_modifier() {
    let mut core = core_with(vec![shape("a", 0.0, 0.0, 100.0, 50.0), shape("c", 0.0, 600.0, 100.0, 50.0)]);
    core.select_elements(ids(&["c"]));
    gesture(&mut core, pt(300.0, 300.0), &[pt(50.0, 25.0)], shift());
    assert_eq!(core.selection(), ["a"]);
}

#[test]
fn empty_marquee_keeps_selection() {
    let mut core = scenario();
    core.select_elements(ids(&["a"]));
    gesture(&mut core, pt(400.0, 400.0), &[pt(500.0, 500.0)], no_mods());
    assert_eq!(core.selection(), ["a"]);
}

// =============================================================
// Structural operations
// =============================================================

#[test]
fn group_scenario_builds_expected_box() {
    let mut core = scenario();
    core.select_elements(ids(&["a", "b"]));
    let actions = core.group();
    assert!(has_action(&actions, |a| matches!(a, Action::DocumentChanged)));

    let gid = core.selection()[0].clone();
    let group = el(&core, &gid);
    assert_eq!(group.kind, ElementKind::Group);
    assert_eq!(group.bounds(), Rect::new(0.0, 0.0, 300.0, 50.0));
    assert_eq!((group.children()[0].x, group.children()[0].y), (0.0, 0.0));
    assert_eq!((group.children()[1].x, group.children()[1].y), (200.0, 0.0));
    assert!(core.element("a").is_none());
}

#[test]
fn group_needs_two_selected() {
    let mut core = scenario();
    core.select_elements(ids(&["a"]));
    assert!(core.group().is_empty());
    assert!(!core.can_undo());
}

#[test]
fn group_then_ungroup_round_trips() {
    let mut core = core_with(vec![shape("a", 13.25, 40.5, 100.0, 50.0), shape("b", 220.0, 7.0, 60.0, 80.0)]);
    let before: Vec<Rect> = ["a", "b"].iter().map(|id| el(&core, id).bounds()).collect();
    core.select_elements(ids(&["a", "b"]));
    core.group();
    let gid = core.selection()[0].clone();

    core.ungroup();
    assert!(core.element(&gid).is_none());
    assert_eq!(core.selection(), ["a", "b"]);
    for (id, rect) in ["a", "b"].iter().zip(before) {
        let r = el(&core, id).bounds();
        assert!(approx(r.x, rect.x) && approx(r.y, rect.y));
        assert_eq!((r.width, r.height), (rect.width, rect.height));
    }
    assert_eq!(core.history.undo_depth(), 2);
}

#[test]
fn ungroup_without_group_is_noop() {
    let mut core = scenario();
    core.select_elements(ids(&["a"]));
    assert!(core.ungroup().is_empty());
}

#[test]
fn duplicate_offsets_and_selects_clone() {
    let mut core = scenario();
    let actions = core.duplicate_element("a");
    let new_id = core.selection()[0].clone();
    assert_ne!(new_id, "a");
    let copy = el(&core, &new_id);
    assert_eq!((copy.x, copy.y), (20.0, 20.0));
    assert_eq!(core.pages()[0].elements.last().unwrap().id, new_id);
    assert!(has_action(&actions, |a| matches!(a, Action::SelectionChanged(_))));
    assert!(core.duplicate_element("missing").is_empty());
}

#[test]
fn duplicate_on_facing_page_stays_on_that_page() {
    let mut core = EngineCore::new();
    core.load_pages(vec![page("p1", vec![]), page("p2", vec![shape("right", 10.0, 10.0, 50.0, 50.0)])]);
    core.set_double_page(true);
    assert_eq!(core.pages().len(), 2);

    core.duplicate_element("right");
    let new_id = core.selection()[0].clone();
    assert!(core.pages()[0].elements.is_empty());
    assert_eq!(core.pages()[1].elements.len(), 2);
    let copy = el(&core, &new_id);
    assert_eq!((copy.x, copy.y), (30.0, 30.0));
}

#[test]
fn delete_selected_removes_all() {
    let mut core = scenario();
    core.select_elements(ids(&["a", "b"]));
    core.delete_selected();
    assert!(core.pages()[0].elements.is_empty());
    assert!(core.selection().is_empty());
    assert_eq!(core.history.undo_depth(), 1);
    assert!(core.delete_selected().is_empty());
}

#[test]
fn delete_element_prunes_selection() {
    let mut core = scenario();
    core.select_elements(ids(&["a", "b"]));
    core.delete_element("a");
    assert_eq!(core.selection(), ["b"]);
    assert!(core.delete_element("a").is_empty());
}

#[test]
fn bring_forward_and_send_backward() {
    let mut core = scenario();
    assert!(core.bring_forward("b").is_empty());
    core.bring_forward("a");
    let order: Vec<&str> = core.pages()[0].elements.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(order, ["b", "a"]);
    core.send_backward("a");
    let order: Vec<&str> = core.pages()[0].elements.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(order, ["a", "b"]);
    assert_eq!(core.history.undo_depth(), 2);
}

// =============================================================
// Clipboard
// =============================================================

#[test]
fn same_page_paste_offsets() {
    let mut core = scenario();
    core.select_elements(ids(&["a"]));
    core.copy();
    core.paste();
    let pasted = el(&core, &core.selection()[0]);
    assert_eq!((pasted.x, pasted.y), (20.0, 20.0));
}

#[test]
fn cross_page_paste_keeps_coordinates() {
    let mut core = EngineCore::new();
    core.load_pages(vec![page("p1", vec![shape("a", 33.0, 44.0, 100.0, 50.0)]), page("p2", vec![])]);
    core.select_elements(ids(&["a"]));
    core.copy();
    core.set_active_page(1);
    let actions = core.paste();

    let pasted = &core.pages()[1].elements;
    assert_eq!(pasted.len(), 1);
    assert_ne!(pasted[0].id, "a");
    assert_eq!((pasted[0].x, pasted[0].y), (33.0, 44.0));
    assert_eq!(core.selection(), [pasted[0].id.clone()]);
    assert!(has_action(&actions, |a| matches!(a, Action::DocumentChanged)));
}

#[test]
fn copy_is_a_deep_clone() {
    let mut core = scenario();
    core.select_elements(ids(&["a"]));
    core.copy();
    core.update_element("a", &ElementPatch::position(500.0, 500.0));
    core.set_active_page(0);
    core.paste();
    let pasted = el(&core, &core.selection()[0]);
    assert_eq!((pasted.x, pasted.y), (20.0, 20.0));
}

#[test]
fn paste_with_empty_clipboard_is_noop() {
    let mut core = scenario();
    assert!(core.paste().is_empty());
    assert!(!core.can_undo());
}

#[test]
fn page_copy_and_paste_inserts_after_active() {
    let mut core = EngineCore::new();
    core.load_pages(vec![page("p1", vec![shape("a", 0.0, 0.0, 10.0, 10.0)]), page("p2", vec![])]);
    core.copy();
    let actions = core.paste();

    assert_eq!(core.pages().len(), 3);
    assert_eq!(core.active_page(), 1);
    let copy = &core.pages()[1];
    assert_eq!(copy.title, "p1 (Copy)");
    assert_ne!(copy.id, "p1");
    assert_ne!(copy.elements[0].id, "a");
    assert_eq!(core.pages()[2].id, "p2");
    assert!(has_action(&actions, |a| *a == Action::ActivePageChanged(1)));

    core.undo();
    assert_eq!(core.pages().len(), 2);
    assert_eq!(core.active_page(), 1);
}

// =============================================================
// History
// =============================================================

#[test]
fn history_keeps_fifty_frames() {
    let mut core = scenario();
    core.select_elements(ids(&["a"]));
    for _ in 0..60 {
        core.nudge(1.0, 0.0);
    }
    assert_eq!(el(&core, "a").x, 60.0);
    assert_eq!(core.history.undo_depth(), 50);

    for _ in 0..50 {
        assert!(!core.undo().is_empty());
    }
    assert_eq!(el(&core, "a").x, 10.0);
    assert!(core.undo().is_empty());
}

#[test]
fn undo_then_redo_restores_post_mutation_state() {
    let mut core = scenario();
    core.select_elements(ids(&["a", "b"]));
    core.group();
    let after = core.pages().to_vec();

    core.undo();
    assert_ne!(core.pages(), after.as_slice());
    core.redo();
    assert_eq!(core.pages(), after.as_slice());
}

#[test]
fn redo_without_undo_is_noop() {
    let mut core = scenario();
    core.select_elements(ids(&["a"]));
    core.nudge(0.0, 1.0);
    let state = core.pages().to_vec();
    assert!(core.redo().is_empty());
    assert_eq!(core.pages(), state.as_slice());
}

#[test]
fn new_mutation_clears_redo() {
    let mut core = scenario();
    core.select_elements(ids(&["a"]));
    core.nudge(1.0, 0.0);
    core.undo();
    assert!(core.can_redo());
    core.nudge(0.0, 1.0);
    assert!(!core.can_redo());
}

#[test]
fn undo_prunes_selection() {
    let mut core = scenario();
    core.duplicate_element("a");
    let new_id = core.selection()[0].clone();
    let actions = core.undo();
    assert!(core.element(&new_id).is_none());
    assert!(core.selection().is_empty());
    assert!(has_action(&actions, |a| matches!(a, Action::SelectionChanged(s) if s.is_empty())));
}

// =============================================================
// Keyboard
// =============================================================

#[test]
fn arrow_keys_nudge_one_frame_each() {
    let mut core = scenario();
    core.select_elements(ids(&["a", "b"]));
    core.on_key_down(key("ArrowRight"), no_mods());
    core.on_key_down(key("ArrowDown"), no_mods());
    core.on_key_down(key("ArrowDown"), no_mods());
    assert_eq!((el(&core, "a").x, el(&core, "a").y), (1.0, 2.0));
    assert_eq!((el(&core, "b").x, el(&core, "b").y), (201.0, 2.0));
    assert_eq!(core.history.undo_depth(), 3);
}

#[test]
fn nudge_skips_locked_and_empty_selection() {
    let mut locked = shape("l", 0.0, 0.0, 20.0, 20.0);
    locked.locked = true;
    let mut core = core_with(vec![locked]);
    assert!(core.on_key_down(key("ArrowLeft"), no_mods()).is_empty());
    core.select_elements(ids(&["l"]));
    assert!(core.on_key_down(key("ArrowLeft"), no_mods()).is_empty());
    assert_eq!(el(&core, "l").x, 0.0);
    assert!(!core.can_undo());
}

#[test]
fn shortcut_keys_drive_history() {
    let mut core = scenario();
    core.select_elements(ids(&["a"]));
    core.on_key_down(key("ArrowRight"), no_mods());
    core.on_key_down(key("z"), ctrl());
    assert_eq!(el(&core, "a").x, 0.0);
    core.on_key_down(key("Z"), Modifiers { ctrl: true, shift: true, ..Default::default() });
    assert_eq!(el(&core, "a").x, 1.0);
    core.on_key_down(key("z"), Modifiers { meta: true, ..Default::default() });
    core.on_key_down(key("y"), ctrl());
    assert_eq!(el(&core, "a").x, 1.0);
}

#[test]
fn shortcut_keys_copy_paste_duplicate_group() {
    let mut core = scenario();
    core.select_elements(ids(&["a"]));
    core.on_key_down(key("c"), ctrl());
    core.on_key_down(key("v"), ctrl());
    assert_eq!(core.pages()[0].elements.len(), 3);
    core.on_key_down(key("d"), ctrl());
    assert_eq!(core.pages()[0].elements.len(), 4);

    core.select_elements(ids(&["a", "b"]));
    core.on_key_down(key("g"), ctrl());
    let gid = core.selection()[0].clone();
    assert!(el(&core, &gid).is_group());
    core.on_key_down(key("G"), Modifiers { ctrl: true, shift: true, ..Default::default() });
    assert_eq!(core.selection(), ["a", "b"]);
}

#[test]
fn delete_and_escape_keys() {
    let mut core = scenario();
    core.select_elements(ids(&["a"]));
    core.on_key_down(key("Escape"), no_mods());
    assert!(core.selection().is_empty());
    core.select_elements(ids(&["b"]));
    core.on_key_down(key("Backspace"), no_mods());
    assert!(core.element("b").is_none());
}

#[test]
fn keys_ignored_mid_gesture() {
    let mut core = scenario();
    core.on_pointer_down(pt(50.0, 25.0), Button::Primary, no_mods());
    assert!(core.on_key_down(key("Delete"), no_mods()).is_empty());
    assert!(core.element("a").is_some());
}

// =============================================================
// Pages
// =============================================================

#[test]
fn set_active_page_clears_selection() {
    let mut core = EngineCore::new();
    core.load_pages(vec![page("p1", vec![shape("a", 0.0, 0.0, 10.0, 10.0)]), page("p2", vec![])]);
    core.select_elements(ids(&["a"]));
    let actions = core.set_active_page(1);
    assert_eq!(actions[0], Action::ActivePageChanged(1));
    assert!(core.selection().is_empty());
    assert!(core.set_active_page(5).is_empty());
    assert!(core.set_active_page(1).is_empty());
}
