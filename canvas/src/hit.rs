#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::Point;
use crate::chrome;
use crate::consts::HANDLE_RADIUS_PX;
use crate::doc::{Element, ElementId, Page};
use crate::geometry::{ResizeAnchor, rotate_point};

/// Which part of an element was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle(ResizeAnchor),
    RotateHandle,
}

/// Result of a hit test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub element_id: ElementId,
    pub part: HitPart,
}

/// Test which element (if any) of `page` is under the page-local point `local`.
///
/// When the selection is a single unlocked element on this page, its rotate
/// handle and then its resize handles are checked first. Bodies are checked
/// top-most first, in each element's rotated frame.
#[must_use]
pub fn hit_test(local: Point, page: &Page, selection: &[ElementId], zoom: f64) -> Option<Hit> {
    if let [only] = selection {
        if let Some(el) = page.element(only) {
            if let Some(part) = handle_hit(local, el, zoom) {
                return Some(Hit { element_id: el.id.clone(), part });
            }
        }
    }

    page.elements.iter().rev().find_map(|el| {
        let rect = el.bounds();
        let unrotated = rotate_point(local, rect.center(), -el.rotation);
        rect.contains(unrotated).then(|| Hit { element_id: el.id.clone(), part: HitPart::Body })
    })
}

/// The rotate or resize handle of `el` under `local`, if `el` is unlocked.
///
/// Handles may lie past the page edge, so `local` need not be on the page.
#[must_use]
pub fn handle_hit(local: Point, el: &Element, zoom: f64) -> Option<HitPart> {
    if el.locked {
        return None;
    }
    let radius = HANDLE_RADIUS_PX / zoom;
    let rect = el.bounds();

    if distance(local, chrome::rotate_handle_position(rect, el.rotation, zoom)) <= radius {
        return Some(HitPart::RotateHandle);
    }
    chrome::resize_handle_positions(rect, el.rotation)
        .into_iter()
        .find(|(_, pos)| distance(local, *pos) <= radius)
        .map(|(anchor, _)| HitPart::ResizeHandle(anchor))
}

fn distance(a: Point, b: Point) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}
