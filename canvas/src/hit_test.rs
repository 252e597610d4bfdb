use super::*;
use crate::doc::{Element, ElementKind};

fn page_with(elements: Vec<Element>) -> Page {
    let mut page = Page::new("Test");
    page.elements = elements;
    page
}

fn shape(id: &str, x: f64, y: f64, w: f64, h: f64) -> Element {
    let mut el = Element::new(ElementKind::Shape, x, y, w, h);
    el.id = id.to_owned();
    el
}

fn sel(ids: &[&str]) -> Vec<ElementId> {
    ids.iter().map(|s| (*s).to_owned()).collect()
}

// =============================================================
// Bodies
// =============================================================

#[test]
fn miss_on_empty_area() {
    let page = page_with(vec![shape("a", 0.0, 0.0, 50.0, 50.0)]);
    assert!(hit_test(Point::new(200.0, 200.0), &page, &[], 1.0).is_none());
}

#[test]
fn topmost_body_wins() {
    let page = page_with(vec![shape("under", 0.0, 0.0, 100.0, 100.0), shape("over", 50.0, 50.0, 100.0, 100.0)]);
    let hit = hit_test(Point::new(75.0, 75.0), &page, &[], 1.0).unwrap();
    assert_eq!(hit.element_id, "over");
    assert_eq!(hit.part, HitPart::Body);
    let hit = hit_test(Point::new(25.0, 25.0), &page, &[], 1.0).unwrap();
    assert_eq!(hit.element_id, "under");
}

#[test]
fn body_uses_rotated_frame() {
    // A 200x20 bar rotated 90 degrees stands upright around its center (100, 10).
    let mut bar = shape("bar", 0.0, 0.0, 200.0, 20.0);
    bar.rotation = 90.0;
    let page = page_with(vec![bar]);
    assert!(hit_test(Point::new(100.0, 80.0), &page, &[], 1.0).is_some());
    assert!(hit_test(Point::new(180.0, 10.0), &page, &[], 1.0).is_none());
}

// =============================================================
// Handles
// =============================================================

#[test]
fn resize_handle_of_single_selection() {
    let page = page_with(vec![shape("a", 100.0, 100.0, 100.0, 100.0)]);
    let hit = hit_test(Point::new(203.0, 201.0), &page, &sel(&["a"]), 1.0).unwrap();
    assert_eq!(hit.part, HitPart::ResizeHandle(ResizeAnchor::Se));
}

#[test]
fn rotate_handle_above_top_edge() {
    let page = page_with(vec![shape("a", 100.0, 100.0, 100.0, 100.0)]);
    let hit = hit_test(Point::new(150.0, 76.0), &page, &sel(&["a"]), 1.0).unwrap();
    assert_eq!(hit.part, HitPart::RotateHandle);
}

#[test]
fn handle_radius_shrinks_when_zoomed_in() {
    let page = page_with(vec![shape("a", 100.0, 100.0, 100.0, 100.0)]);
    // 6 units off the corner: inside the 8px radius at zoom 1, outside at zoom 2.
    let near_corner = Point::new(206.0, 200.0);
    assert!(hit_test(near_corner, &page, &sel(&["a"]), 1.0).is_some_and(|h| h.part == HitPart::ResizeHandle(ResizeAnchor::Se)));
    assert!(hit_test(near_corner, &page, &sel(&["a"]), 2.0).is_none());
}

#[test]
fn no_handles_for_multi_selection() {
    let page = page_with(vec![shape("a", 100.0, 100.0, 100.0, 100.0), shape("b", 400.0, 400.0, 10.0, 10.0)]);
    assert!(hit_test(Point::new(150.0, 76.0), &page, &sel(&["a", "b"]), 1.0).is_none());
}

#[test]
fn no_handles_for_locked_selection() {
    let mut locked = shape("a", 100.0, 100.0, 100.0, 100.0);
    locked.locked = true;
    let page = page_with(vec![locked]);
    assert!(hit_test(Point::new(150.0, 76.0), &page, &sel(&["a"]), 1.0).is_none());
    let hit = hit_test(Point::new(198.0, 198.0), &page, &sel(&["a"]), 1.0).unwrap();
    assert_eq!(hit.part, HitPart::Body);
}

#[test]
fn handle_hit_reaches_past_page_edge() {
    let el = shape("a", 0.0, 0.0, 100.0, 50.0);
    assert_eq!(handle_hit(Point::new(50.0, -24.0), &el, 1.0), Some(HitPart::RotateHandle));
    assert_eq!(handle_hit(Point::new(-3.0, 25.0), &el, 1.0), Some(HitPart::ResizeHandle(ResizeAnchor::W)));
    assert_eq!(handle_hit(Point::new(50.0, 25.0), &el, 1.0), None);
}
