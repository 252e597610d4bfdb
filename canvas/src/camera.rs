#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

/// A point in screen, world or page-local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// This point expressed relative to `origin`.
    #[must_use]
    pub fn relative_to(self, origin: Point) -> Point {
        Point::new(self.x - origin.x, self.y - origin.y)
    }
}

/// Pan and zoom of the page workspace.
///
/// Screen points are CSS pixels from the canvas's top-left corner. World
/// points are layout units with page slot 0 at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, zoom: 1.0 }
    }
}

impl Camera {
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        let panned = screen.relative_to(Point::new(self.pan_x, self.pan_y));
        Point::new(panned.x / self.zoom, panned.y / self.zoom)
    }

    /// World length of `px` screen pixels. Handles and badges use this to
    /// keep a constant on-screen size.
    #[must_use]
    pub fn world_len(&self, px: f64) -> f64 {
        px / self.zoom
    }
}

/// Placement of the visible pages in world space.
///
/// Visible pages sit left to right starting at the world origin, one page
/// width plus `gap` apart. Slot 0 is the active page, slot 1 the facing page
/// in double-page view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub page_width: f64,
    pub page_height: f64,
    pub gap: f64,
}

impl PageLayout {
    /// World-space top-left corner of the page in `slot`.
    #[must_use]
    pub fn slot_origin(&self, slot: usize) -> Point {
        #[allow(clippy::cast_precision_loss)]
        let x = slot as f64 * (self.page_width + self.gap);
        Point::new(x, 0.0)
    }

    /// Which of the first `slots` pages contains `world`, with the point
    /// expressed relative to that page's top-left corner.
    #[must_use]
    pub fn slot_at(&self, world: Point, slots: usize) -> Option<(usize, Point)> {
        (0..slots).find_map(|slot| {
            let local = world.relative_to(self.slot_origin(slot));
            let inside = (0.0..=self.page_width).contains(&local.x) && (0.0..=self.page_height).contains(&local.y);
            inside.then_some((slot, local))
        })
    }
}
