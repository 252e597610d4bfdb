//! Pure geometry: rectangles, alignment snapping, resize and rotation math.
//!
//! Nothing in this module touches editor state. The engine gathers the inputs
//! (start geometry, pointer deltas, neighbor rectangles) at gesture start and
//! on every pointer-move calls into here to compute the next geometry.
//!
//! All coordinates are page-local layout units. Thresholds are in the same
//! units and therefore independent of zoom.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use crate::camera::Point;
use crate::consts::{COMMON_ANGLES, GUIDE_EPSILON};

// =============================================================
// Rect
// =============================================================

/// Axis-aligned rectangle with a top-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Normalized rectangle spanning two corner points in any order.
    #[must_use]
    pub fn from_points(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Strict overlap test; rectangles that only share an edge do not intersect.
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right() && other.x < self.right() && self.y < other.bottom() && other.y < self.bottom()
    }

    /// Smallest rectangle containing both.
    #[must_use]
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(x, y, self.right().max(other.right()) - x, self.bottom().max(other.bottom()) - y)
    }

    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Scale position and size independently per axis (about the origin).
    #[must_use]
    pub fn scaled(&self, sx: f64, sy: f64) -> Rect {
        Rect::new(self.x * sx, self.y * sy, self.width * sx, self.height * sy)
    }

    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }
}

/// Union of all rectangles, or `None` for an empty input.
#[must_use]
pub fn bounding_box<I>(rects: I) -> Option<Rect>
where
    I: IntoIterator<Item = Rect>,
{
    rects.into_iter().reduce(|acc, r| acc.union(&r))
}

/// Rotate `p` about `center` by `deg` degrees (clockwise in screen space).
#[must_use]
pub fn rotate_point(p: Point, center: Point, deg: f64) -> Point {
    let (sin, cos) = deg.to_radians().sin_cos();
    let dx = p.x - center.x;
    let dy = p.y - center.y;
    Point::new(center.x + dx * cos - dy * sin, center.y + dx * sin + dy * cos)
}

// =============================================================
// Alignment snapping
// =============================================================

/// Direction of a snap guide line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// A vertical line at an x position.
    Vertical,
    /// A horizontal line at a y position.
    Horizontal,
}

/// A guide line drawn while an element is snapped, with Figma-style gap labels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapGuide {
    pub orientation: Orientation,
    /// x for vertical guides, y for horizontal guides.
    pub position: f64,
    /// Distance back to the nearest neighbor edge before the guide.
    pub gap_start: f64,
    /// Distance forward to the nearest neighbor edge after the guide.
    pub gap_end: f64,
}

impl SnapGuide {
    fn new(orientation: Orientation, position: f64) -> Self {
        Self { orientation, position, gap_start: 0.0, gap_end: 0.0 }
    }
}

/// Candidate alignment lines, collected once per gesture.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapTargets {
    /// Vertical lines: region left/center/right, then each neighbor's left/center/right.
    pub xs: Vec<f64>,
    /// Horizontal lines: region top/middle/bottom, then each neighbor's top/middle/bottom.
    pub ys: Vec<f64>,
}

impl SnapTargets {
    /// Build targets from the drawing region size and the neighbor rectangles.
    #[must_use]
    pub fn collect(neighbors: &[Rect], region_width: f64, region_height: f64) -> Self {
        let mut xs = vec![0.0, region_width / 2.0, region_width];
        let mut ys = vec![0.0, region_height / 2.0, region_height];
        for r in neighbors {
            xs.extend([r.x, r.x + r.width / 2.0, r.right()]);
            ys.extend([r.y, r.y + r.height / 2.0, r.bottom()]);
        }
        Self { xs, ys }
    }
}

/// Outcome of [`snap_position`].
#[derive(Debug, Clone, PartialEq)]
pub struct SnapResult {
    pub x: f64,
    pub y: f64,
    pub guides: Vec<SnapGuide>,
}

/// Snap a proposed top-left position of a `width` x `height` box to the targets.
///
/// Each axis is snapped independently: the left, center and right (top,
/// middle, bottom) candidates are compared against every target, and the
/// single closest pair strictly within `threshold` wins. Ties keep the first
/// pair found. An axis with no pair in range keeps its proposed value.
#[must_use]
pub fn snap_position(width: f64, height: f64, proposed: Point, targets: &SnapTargets, threshold: f64) -> SnapResult {
    let mut guides = Vec::new();

    let x = match snap_axis(proposed.x, width, &targets.xs, threshold) {
        Some(snapped) => {
            push_matching_guides(snapped, width, &targets.xs, Orientation::Vertical, &mut guides);
            snapped
        }
        None => proposed.x,
    };
    let y = match snap_axis(proposed.y, height, &targets.ys, threshold) {
        Some(snapped) => {
            push_matching_guides(snapped, height, &targets.ys, Orientation::Horizontal, &mut guides);
            snapped
        }
        None => proposed.y,
    };

    SnapResult { x, y, guides }
}

fn snap_axis(start: f64, extent: f64, targets: &[f64], threshold: f64) -> Option<f64> {
    let mut best: Option<(f64, f64)> = None;
    for offset in [0.0, extent / 2.0, extent] {
        let candidate = start + offset;
        for &target in targets {
            let dist = (candidate - target).abs();
            let closest = best.map_or(threshold, |(d, _)| d);
            if dist < closest {
                best = Some((dist, target - offset));
            }
        }
    }
    best.map(|(_, snapped)| snapped)
}

fn push_matching_guides(start: f64, extent: f64, targets: &[f64], orientation: Orientation, out: &mut Vec<SnapGuide>) {
    for offset in [0.0, extent / 2.0, extent] {
        let edge = start + offset;
        for &target in targets {
            if (edge - target).abs() >= GUIDE_EPSILON {
                continue;
            }
            let seen = out
                .iter()
                .any(|g| g.orientation == orientation && (g.position - target).abs() < GUIDE_EPSILON);
            if !seen {
                out.push(SnapGuide::new(orientation, target));
            }
        }
    }
}

/// Fill in the gap labels of every guide from the neighbor rectangles.
///
/// For a vertical guide at `p`, `gap_start` is the distance to the closest
/// neighbor right edge at or left of `p` (0 when there is none) and `gap_end`
/// the distance to the closest neighbor left edge at or right of `p`
/// (`region_width - p` when there is none). Horizontal guides use bottom/top
/// edges and `region_height`.
pub fn annotate_gaps(guides: &mut [SnapGuide], neighbors: &[Rect], region_width: f64, region_height: f64) {
    for guide in guides.iter_mut() {
        let p = guide.position;
        let (before, after, extent): (Vec<f64>, Vec<f64>, f64) = match guide.orientation {
            Orientation::Vertical => (
                neighbors.iter().map(Rect::right).filter(|&e| e <= p).collect(),
                neighbors.iter().map(|r| r.x).filter(|&e| e >= p).collect(),
                region_width,
            ),
            Orientation::Horizontal => (
                neighbors.iter().map(Rect::bottom).filter(|&e| e <= p).collect(),
                neighbors.iter().map(|r| r.y).filter(|&e| e >= p).collect(),
                region_height,
            ),
        };
        guide.gap_start = before.into_iter().reduce(f64::max).map_or(0.0, |edge| p - edge);
        guide.gap_end = after.into_iter().reduce(f64::min).map_or(extent - p, |edge| edge - p);
    }
}

// =============================================================
// Resize
// =============================================================

/// Anchor position for resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAnchor {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl ResizeAnchor {
    /// All eight handles, clockwise from the top edge.
    pub const ALL: [ResizeAnchor; 8] = [
        ResizeAnchor::N,
        ResizeAnchor::Ne,
        ResizeAnchor::E,
        ResizeAnchor::Se,
        ResizeAnchor::S,
        ResizeAnchor::Sw,
        ResizeAnchor::W,
        ResizeAnchor::Nw,
    ];

    #[must_use]
    pub fn moves_left(self) -> bool {
        matches!(self, Self::W | Self::Nw | Self::Sw)
    }

    #[must_use]
    pub fn moves_right(self) -> bool {
        matches!(self, Self::E | Self::Ne | Self::Se)
    }

    #[must_use]
    pub fn moves_top(self) -> bool {
        matches!(self, Self::N | Self::Ne | Self::Nw)
    }

    #[must_use]
    pub fn moves_bottom(self) -> bool {
        matches!(self, Self::S | Self::Se | Self::Sw)
    }

    #[must_use]
    pub fn is_corner(self) -> bool {
        matches!(self, Self::Ne | Self::Nw | Self::Se | Self::Sw)
    }

    /// Whether the handle changes the width.
    #[must_use]
    pub fn drives_width(self) -> bool {
        self.moves_left() || self.moves_right()
    }

    /// Whether the handle changes the height.
    #[must_use]
    pub fn drives_height(self) -> bool {
        self.moves_top() || self.moves_bottom()
    }

    /// Handle position on `rect` as fractions of its width and height.
    #[must_use]
    pub fn unit_position(self) -> (f64, f64) {
        let fx = if self.moves_left() {
            0.0
        } else if self.moves_right() {
            1.0
        } else {
            0.5
        };
        let fy = if self.moves_top() {
            0.0
        } else if self.moves_bottom() {
            1.0
        } else {
            0.5
        };
        (fx, fy)
    }

    /// CSS cursor name for this handle.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::N | Self::S => "ns-resize",
            Self::E | Self::W => "ew-resize",
            Self::Nw | Self::Se => "nwse-resize",
            Self::Ne | Self::Sw => "nesw-resize",
        }
    }
}

/// Place a `width` x `height` box so the edges opposite `anchor` stay where they were in `start`.
#[must_use]
pub fn anchored(start: Rect, anchor: ResizeAnchor, width: f64, height: f64) -> Rect {
    let x = if anchor.moves_left() { start.right() - width } else { start.x };
    let y = if anchor.moves_top() { start.bottom() - height } else { start.y };
    Rect::new(x, y, width, height)
}

/// Resize `start` by a pointer delta applied to `anchor`.
///
/// With `keep_aspect` the start ratio is preserved: a corner handle lets the
/// axis with the larger proportional change drive the other; an edge handle
/// drives the perpendicular dimension from the dragged one. With `precise`
/// the deltas are rounded to whole units first.
///
/// The result is not clamped; callers reject sizes below their minimum.
#[must_use]
pub fn resize(start: Rect, anchor: ResizeAnchor, dx: f64, dy: f64, keep_aspect: bool, precise: bool) -> Rect {
    let (dx, dy) = if precise { (dx.round(), dy.round()) } else { (dx, dy) };

    let mut width = start.width;
    let mut height = start.height;
    if anchor.moves_right() {
        width = start.width + dx;
    }
    if anchor.moves_left() {
        width = start.width - dx;
    }
    if anchor.moves_bottom() {
        height = start.height + dy;
    }
    if anchor.moves_top() {
        height = start.height - dy;
    }

    if keep_aspect && start.width > 0.0 && start.height > 0.0 {
        let ratio = start.width / start.height;
        let width_drives = if anchor.is_corner() {
            (width / start.width - 1.0).abs() >= (height / start.height - 1.0).abs()
        } else {
            anchor.drives_width()
        };
        if width_drives {
            height = width / ratio;
        } else {
            width = height * ratio;
        }
    }

    anchored(start, anchor, width, height)
}

/// Whether a resize result is acceptable under the minimum size.
#[must_use]
pub fn is_valid_size(rect: &Rect, min_size: f64) -> bool {
    rect.width > min_size && rect.height > min_size
}

/// Snap the dimensions of a resized box to neighbor widths and heights.
///
/// Only the dimensions the handle drives are eligible unless `keep_aspect` is
/// set, in which case both are, and a snap on one axis recomputes the other
/// from the start ratio (the axis with the smaller snap delta wins when both
/// qualify). Returns `rect` unchanged when nothing is within `threshold`.
#[must_use]
pub fn snap_size(
    rect: Rect,
    start: Rect,
    anchor: ResizeAnchor,
    keep_aspect: bool,
    widths: &[f64],
    heights: &[f64],
    threshold: f64,
) -> Rect {
    let lock = keep_aspect && start.width > 0.0 && start.height > 0.0;
    let snap_w = if lock || anchor.drives_width() { nearest_within(rect.width, widths, threshold) } else { None };
    let snap_h = if lock || anchor.drives_height() { nearest_within(rect.height, heights, threshold) } else { None };

    let (width, height) = if lock {
        let ratio = start.width / start.height;
        match (snap_w, snap_h) {
            (Some((w, dw)), Some((h, dh))) => {
                if dw <= dh {
                    (w, w / ratio)
                } else {
                    (h * ratio, h)
                }
            }
            (Some((w, _)), None) => (w, w / ratio),
            (None, Some((h, _))) => (h * ratio, h),
            (None, None) => return rect,
        }
    } else {
        if snap_w.is_none() && snap_h.is_none() {
            return rect;
        }
        (snap_w.map_or(rect.width, |(w, _)| w), snap_h.map_or(rect.height, |(h, _)| h))
    };

    anchored(start, anchor, width, height)
}

/// Closest candidate strictly within `threshold` of `value`, with its distance.
fn nearest_within(value: f64, candidates: &[f64], threshold: f64) -> Option<(f64, f64)> {
    let mut best: Option<(f64, f64)> = None;
    for &candidate in candidates {
        let dist = (value - candidate).abs();
        if dist < best.map_or(threshold, |(_, d)| d) {
            best = Some((candidate, dist));
        }
    }
    best
}

// =============================================================
// Rotation
// =============================================================

/// Wrap an angle into `[0, 360)`.
#[must_use]
pub fn normalize_degrees_360(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Shortest distance between two angles on the circle, in `[0, 180]`.
#[must_use]
pub fn angular_delta_deg(a: f64, b: f64) -> f64 {
    let delta = (a - b).abs().rem_euclid(360.0);
    delta.min(360.0 - delta)
}

/// Rotation for a pointer at `pointer` around `center`, where 0° points up.
#[must_use]
pub fn rotation_from_pointer(center: Point, pointer: Point) -> f64 {
    let radians = (pointer.y - center.y).atan2(pointer.x - center.x);
    normalize_degrees_360(radians.to_degrees() + 90.0)
}

/// Snap an angle to the closest of [`COMMON_ANGLES`] by circular distance.
#[must_use]
pub fn snap_angle(deg: f64) -> f64 {
    let deg = normalize_degrees_360(deg);
    let mut best = COMMON_ANGLES[0];
    let mut best_delta = angular_delta_deg(deg, best);
    for &angle in &COMMON_ANGLES[1..] {
        let delta = angular_delta_deg(deg, angle);
        if delta < best_delta {
            best = angle;
            best_delta = delta;
        }
    }
    best
}
