//! Split-pane and sidebar layout state

use tracing::trace;

/// Narrowest either pane may become, in percent of the container
pub const MIN_PANE_PERCENT: f64 = 20.0;
/// Widest the editor pane may become, in percent of the container
pub const MAX_PANE_PERCENT: f64 = 80.0;
/// Below this window width the sidebar starts collapsed
pub const COMPACT_WIDTH: f64 = 768.0;

/// Editor/preview split driven by a draggable divider
#[derive(Debug, Clone, PartialEq)]
pub struct SplitLayout {
    editor_percent: f64,
    resizing: bool,
}

impl Default for SplitLayout {
    fn default() -> Self {
        Self {
            editor_percent: 50.0,
            resizing: false,
        }
    }
}

impl SplitLayout {
    pub fn editor_percent(&self) -> f64 {
        self.editor_percent
    }

    pub fn preview_percent(&self) -> f64 {
        100.0 - self.editor_percent
    }

    pub fn is_resizing(&self) -> bool {
        self.resizing
    }

    pub fn begin_resize(&mut self) {
        self.resizing = true;
    }

    /// Follow the pointer while a resize is active
    ///
    /// Positions that would make either pane narrower than
    /// [`MIN_PANE_PERCENT`] are ignored. Returns true when the split changed.
    pub fn resize_to(&mut self, pointer_x: f64, container_left: f64, container_width: f64) -> bool {
        if !self.resizing || container_width <= 0.0 {
            return false;
        }
        let percent = (pointer_x - container_left) / container_width * 100.0;
        if !(MIN_PANE_PERCENT..=MAX_PANE_PERCENT).contains(&percent) {
            return false;
        }
        self.editor_percent = percent;
        trace!(editor_percent = percent, "Split resized");
        true
    }

    pub fn end_resize(&mut self) {
        self.resizing = false;
    }
}

/// Collapsible file sidebar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sidebar {
    collapsed: bool,
}

impl Sidebar {
    /// Initial sidebar state for a window of the given width
    pub fn for_window_width(width: f64) -> Self {
        Self {
            collapsed: width < COMPACT_WIDTH,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn toggle(&mut self) -> bool {
        self.collapsed = !self.collapsed;
        self.collapsed
    }
}
