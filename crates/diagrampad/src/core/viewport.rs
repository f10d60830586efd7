//! Zoom and pan state for the preview pane
//!
//! The viewport knows nothing about what is drawn. It tracks a zoom factor
//! clamped to [`MIN_ZOOM`]..=[`MAX_ZOOM`] and a scroll offset that pointer
//! drags move around.

use tracing::trace;

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 5.0;
pub const DEFAULT_ZOOM: f64 = 1.0;
/// Multiplier applied per zoom step
pub const ZOOM_STEP: f64 = 1.2;
/// Scroll distance per pixel of pointer movement while dragging
pub const PAN_FACTOR: f64 = 2.0;

/// A 2D position or offset in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Display transform state of the preview
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    zoom: f64,
    scroll: Point,
    /// Last pointer position of an active drag
    drag: Option<Point>,
    hovered: bool,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            scroll: Point::ORIGIN,
            drag: None,
            hovered: false,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn scroll(&self) -> Point {
        self.scroll
    }

    pub fn is_panning(&self) -> bool {
        self.drag.is_some()
    }

    /// True while the pointer is over the viewport
    pub fn has_focus(&self) -> bool {
        self.hovered
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.zoom = (self.zoom * ZOOM_STEP).min(MAX_ZOOM);
        trace!(zoom = self.zoom, "Zoomed in");
        self.zoom
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.zoom = (self.zoom / ZOOM_STEP).max(MIN_ZOOM);
        trace!(zoom = self.zoom, "Zoomed out");
        self.zoom
    }

    /// Back to 100% with the scroll offset at the origin
    pub fn reset(&mut self) {
        self.zoom = DEFAULT_ZOOM;
        self.scroll = Point::ORIGIN;
        trace!("Viewport reset");
    }

    pub fn pointer_enter(&mut self) {
        self.hovered = true;
    }

    /// Start a drag gesture at the given pointer position
    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.hovered = true;
        self.drag = Some(Point::new(x, y));
    }

    /// Move the pointer; scrolls when a drag is active
    ///
    /// The scroll offset moves against the pointer, scaled by [`PAN_FACTOR`].
    /// Returns true when the move panned the view.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        let Some(start) = self.drag else {
            return false;
        };
        self.scroll.x -= (x - start.x) * PAN_FACTOR;
        self.scroll.y -= (y - start.y) * PAN_FACTOR;
        self.drag = Some(Point::new(x, y));
        trace!(scroll_x = self.scroll.x, scroll_y = self.scroll.y, "Panned");
        true
    }

    pub fn pointer_up(&mut self) {
        self.drag = None;
    }

    /// Leaving the viewport ends any drag and drops focus
    pub fn pointer_leave(&mut self) {
        self.drag = None;
        self.hovered = false;
    }

    /// Wheel input over the viewport
    ///
    /// Scrolling up zooms in, anything else zooms out. Returns true when the
    /// host must suppress its own page scrolling, which is whenever the
    /// viewport has focus. Wheel input without focus is ignored.
    pub fn wheel(&mut self, delta_y: f64) -> bool {
        if !self.hovered {
            return false;
        }
        if delta_y < 0.0 {
            self.zoom_in();
        } else {
            self.zoom_out();
        }
        true
    }

    /// CSS-style transform for the rendered artifact
    pub fn transform(&self) -> String {
        format!("scale({})", self.zoom)
    }

    /// Zoom as a rounded percentage, e.g. `120%`
    pub fn zoom_label(&self) -> String {
        format!("{}%", (self.zoom * 100.0).round() as i64)
    }
}
