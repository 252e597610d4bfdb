//! Selection decorations, computed without a drawing context.
//!
//! Positions are page-local and already rotated with their element, so the
//! renderer draws them as-is and the hit tester checks the same points.
//! Sizes given in screen pixels are converted with the current zoom.

#[cfg(test)]
#[path = "chrome_test.rs"]
mod chrome_test;

use crate::camera::Point;
use crate::consts::{LOCK_BADGE_INSET_PX, ROTATE_HANDLE_OFFSET_PX};
use crate::doc::Element;
use crate::geometry::{Rect, ResizeAnchor, rotate_point};

/// Decorations for one selected element.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoration {
    /// Rotated corners, clockwise from top-left.
    pub outline: [Point; 4],
    /// Resize handles; empty unless this is a single unlocked selection.
    pub handles: Vec<(ResizeAnchor, Point)>,
    /// Rotate handle above the top edge, for a single unlocked selection.
    pub rotate_handle: Option<Point>,
    /// Lock badge near the top-right corner, for a single locked selection.
    pub lock_badge: Option<Point>,
    /// Locked elements get a distinct outline color.
    pub locked: bool,
}

/// Rotated corners of `rect`, clockwise from top-left.
#[must_use]
pub fn outline(rect: Rect, rotation: f64) -> [Point; 4] {
    let c = rect.center();
    [
        Point::new(rect.x, rect.y),
        Point::new(rect.right(), rect.y),
        Point::new(rect.right(), rect.bottom()),
        Point::new(rect.x, rect.bottom()),
    ]
    .map(|p| rotate_point(p, c, rotation))
}

/// The eight resize handle centers, in [`ResizeAnchor::ALL`] order.
#[must_use]
pub fn resize_handle_positions(rect: Rect, rotation: f64) -> [(ResizeAnchor, Point); 8] {
    let c = rect.center();
    ResizeAnchor::ALL.map(|anchor| {
        let (fx, fy) = anchor.unit_position();
        let p = Point::new(rect.x + rect.width * fx, rect.y + rect.height * fy);
        (anchor, rotate_point(p, c, rotation))
    })
}

/// Center of the rotate handle, a fixed screen distance above the top edge.
#[must_use]
pub fn rotate_handle_position(rect: Rect, rotation: f64, zoom: f64) -> Point {
    let c = rect.center();
    let p = Point::new(c.x, rect.y - ROTATE_HANDLE_OFFSET_PX / zoom);
    rotate_point(p, c, rotation)
}

/// Center of the lock badge, inset from the top-right corner.
#[must_use]
pub fn lock_badge_position(rect: Rect, rotation: f64, zoom: f64) -> Point {
    let inset = LOCK_BADGE_INSET_PX / zoom;
    let p = Point::new(rect.right() - inset, rect.y + inset);
    rotate_point(p, rect.center(), rotation)
}

/// Decorations for the current selection on one page.
///
/// Every selected element gets an outline. Handles appear only when exactly
/// one element is selected overall and it is unlocked; a single locked
/// selection shows the lock badge instead.
#[must_use]
pub fn decorations(selected: &[&Element], selection_len: usize, zoom: f64) -> Vec<Decoration> {
    let single = selection_len == 1;
    selected
        .iter()
        .map(|el| {
            let rect = el.bounds();
            let editable = single && !el.locked;
            Decoration {
                outline: outline(rect, el.rotation),
                handles: if editable { resize_handle_positions(rect, el.rotation).to_vec() } else { Vec::new() },
                rotate_handle: editable.then(|| rotate_handle_position(rect, el.rotation, zoom)),
                lock_badge: (single && el.locked).then(|| lock_badge_position(rect, el.rotation, zoom)),
                locked: el.locked,
            }
        })
        .collect()
}
