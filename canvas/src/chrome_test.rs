use super::*;
use crate::doc::ElementKind;

const EPSILON: f64 = 1e-9;

fn near(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < EPSILON && (a.y - b.y).abs() < EPSILON
}

fn element(locked: bool) -> Element {
    let mut el = Element::new(ElementKind::Shape, 100.0, 100.0, 200.0, 100.0);
    el.locked = locked;
    el
}

#[test]
fn handles_follow_anchor_order() {
    let handles = resize_handle_positions(Rect::new(0.0, 0.0, 100.0, 50.0), 0.0);
    assert_eq!(handles[0], (ResizeAnchor::N, Point::new(50.0, 0.0)));
    assert_eq!(handles[3], (ResizeAnchor::Se, Point::new(100.0, 50.0)));
    assert_eq!(handles[7], (ResizeAnchor::Nw, Point::new(0.0, 0.0)));
}

#[test]
fn handles_rotate_with_element() {
    let handles = resize_handle_positions(Rect::new(0.0, 0.0, 100.0, 100.0), 90.0);
    // North handle of a box rotated a quarter turn clockwise sits on the east side.
    assert!(near(handles[0].1, Point::new(100.0, 50.0)));
}

#[test]
fn rotate_handle_distance_scales_with_zoom() {
    let rect = Rect::new(0.0, 100.0, 100.0, 50.0);
    assert!(near(rotate_handle_position(rect, 0.0, 1.0), Point::new(50.0, 76.0)));
    assert!(near(rotate_handle_position(rect, 0.0, 2.0), Point::new(50.0, 88.0)));
}

#[test]
fn outline_is_clockwise_corners() {
    let corners = outline(Rect::new(10.0, 20.0, 30.0, 40.0), 0.0);
    assert_eq!(corners[0], Point::new(10.0, 20.0));
    assert_eq!(corners[2], Point::new(40.0, 60.0));
}

#[test]
fn single_unlocked_selection_has_handles() {
    let el = element(false);
    let decos = decorations(&[&el], 1, 1.0);
    assert_eq!(decos.len(), 1);
    assert_eq!(decos[0].handles.len(), 8);
    assert!(decos[0].rotate_handle.is_some());
    assert!(decos[0].lock_badge.is_none());
    assert!(!decos[0].locked);
}

#[test]
fn single_locked_selection_shows_badge_only() {
    let el = element(true);
    let decos = decorations(&[&el], 1, 1.0);
    assert!(decos[0].handles.is_empty());
    assert!(decos[0].rotate_handle.is_none());
    assert!(near(decos[0].lock_badge.unwrap(), Point::new(288.0, 112.0)));
}

#[test]
fn multi_selection_suppresses_handles() {
    let a = element(false);
    let b = element(false);
    let decos = decorations(&[&a, &b], 2, 1.0);
    assert_eq!(decos.len(), 2);
    assert!(decos.iter().all(|d| d.handles.is_empty() && d.rotate_handle.is_none()));
}

#[test]
fn locked_flag_survives_multi_selection() {
    let a = element(true);
    let b = element(false);
    let decos = decorations(&[&a, &b], 2, 1.0);
    assert!(decos[0].locked && decos[0].lock_badge.is_none());
    assert!(!decos[1].locked);
}

#[test]
fn other_page_selection_counts_toward_multi() {
    let a = element(false);
    let decos = decorations(&[&a], 2, 1.0);
    assert!(decos[0].handles.is_empty());
}
