//! Shared numeric constants for the canvas crate.

// ── Page ────────────────────────────────────────────────────────

/// A4 page width at 96 DPI, in layout units.
pub const PAGE_WIDTH: f64 = 794.0;

/// A4 page height at 96 DPI, in layout units.
pub const PAGE_HEIGHT: f64 = 1123.0;

/// Horizontal gap between pages in double-page view, in layout units.
pub const PAGE_GAP: f64 = 4.0;

/// Spacing of the optional background grid, in layout units.
pub const GRID_SPACING: f64 = 20.0;

// ── Snapping ────────────────────────────────────────────────────

/// Distance (document units) below which an edge or center snaps to a target.
pub const SNAP_THRESHOLD: f64 = 5.0;

/// Distance below which a resized dimension snaps to a neighbor's dimension.
pub const SIZE_SNAP_THRESHOLD: f64 = 2.0;

/// Two positions closer than this are treated as the same guide line.
pub const GUIDE_EPSILON: f64 = 0.1;

/// Angles (degrees) that rotation snaps to while the snap modifier is held.
pub const COMMON_ANGLES: [f64; 16] = [
    0.0, 30.0, 45.0, 60.0, 90.0, 120.0, 135.0, 150.0, 180.0, 210.0, 225.0, 240.0, 270.0, 300.0, 315.0, 330.0,
];

// ── Geometry limits ─────────────────────────────────────────────

/// Width and height must stay strictly above this after a resize.
pub const MIN_ELEMENT_SIZE: f64 = 10.0;

/// Offset applied to duplicated elements and same-page pastes.
pub const PASTE_OFFSET: f64 = 20.0;

/// Distance moved by one arrow-key press.
pub const NUDGE_STEP: f64 = 1.0;

/// A marquee smaller than this on both axes is treated as a click.
pub const MARQUEE_CLICK_SLOP: f64 = 1.0;

// ── History ─────────────────────────────────────────────────────

/// Maximum number of undo frames retained.
pub const HISTORY_LIMIT: usize = 50;

// ── Hit-testing / chrome ────────────────────────────────────────

/// Screen-space hit slop in pixels for handles.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

/// Drawn size of a resize handle square, in screen pixels.
pub const HANDLE_SIZE_PX: f64 = 10.0;

/// Distance from the bounding box top edge to the rotate handle, in screen pixels.
pub const ROTATE_HANDLE_OFFSET_PX: f64 = 24.0;

/// Inset of the lock badge from the top-right corner, in screen pixels.
pub const LOCK_BADGE_INSET_PX: f64 = 12.0;
