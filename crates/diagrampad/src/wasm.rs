//! WebAssembly bindings
//!
//! The browser host keeps its own store and renderer; what it borrows from
//! this crate is the pure state: viewport maths, naming and listing labels,
//! and shortcut resolution.

use chrono::{DateTime, Utc};
use wasm_bindgen::prelude::*;

use crate::core::{self, Viewport};
use crate::editor::{resolve_shortcut, Command, KeyPress};

/// Initialize WASM module
///
/// Sets up panic hooks and logging for better error messages in the browser.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    use crate::core::logging::init_logging;
    let _ = init_logging(Some("info"), None);
}

/// Zoom and pan state for the preview pane
#[wasm_bindgen]
#[derive(Debug, Default)]
pub struct ViewportHandle {
    inner: Viewport,
}

#[wasm_bindgen]
impl ViewportHandle {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zoom(&self) -> f64 {
        self.inner.zoom()
    }

    #[wasm_bindgen(js_name = scrollLeft)]
    pub fn scroll_left(&self) -> f64 {
        self.inner.scroll().x
    }

    #[wasm_bindgen(js_name = scrollTop)]
    pub fn scroll_top(&self) -> f64 {
        self.inner.scroll().y
    }

    #[wasm_bindgen(js_name = zoomIn)]
    pub fn zoom_in(&mut self) -> f64 {
        self.inner.zoom_in()
    }

    #[wasm_bindgen(js_name = zoomOut)]
    pub fn zoom_out(&mut self) -> f64 {
        self.inner.zoom_out()
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }

    #[wasm_bindgen(js_name = pointerEnter)]
    pub fn pointer_enter(&mut self) {
        self.inner.pointer_enter();
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.inner.pointer_down(x, y);
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.inner.pointer_move(x, y)
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self) {
        self.inner.pointer_up();
    }

    #[wasm_bindgen(js_name = pointerLeave)]
    pub fn pointer_leave(&mut self) {
        self.inner.pointer_leave();
    }

    /// True when the page must not scroll
    pub fn wheel(&mut self, delta_y: f64) -> bool {
        self.inner.wheel(delta_y)
    }

    /// CSS transform for the preview content
    pub fn transform(&self) -> String {
        self.inner.transform()
    }

    #[wasm_bindgen(js_name = zoomLabel)]
    pub fn zoom_label(&self) -> String {
        self.inner.zoom_label()
    }
}

/// Name for a save-as copy of `name`
#[wasm_bindgen(js_name = copyName)]
pub fn copy_name(name: &str) -> String {
    core::copy_name(name)
}

/// Relative label such as `5m ago` for two epoch-millisecond timestamps
#[wasm_bindgen(js_name = timeAgo)]
pub fn time_ago(at_ms: f64, now_ms: f64) -> Result<String, JsValue> {
    let at = from_millis(at_ms)?;
    let now = from_millis(now_ms)?;
    Ok(core::time_ago(at, now))
}

/// Name of the command a key chord triggers, or `undefined`
#[wasm_bindgen(js_name = shortcutFor)]
pub fn shortcut_for(key: &str, ctrl: bool, meta: bool, renaming: bool) -> Option<String> {
    let press = KeyPress {
        key: key.to_string(),
        ctrl,
        meta,
    };
    let name = match resolve_shortcut(&press, renaming)? {
        Command::Save => "save",
        Command::New => "new",
        Command::ToggleSidebar => "toggleSidebar",
        Command::CommitRename => "commitRename",
        Command::CancelRename => "cancelRename",
        _ => return None,
    };
    Some(name.to_string())
}

fn from_millis(ms: f64) -> Result<DateTime<Utc>, JsValue> {
    DateTime::from_timestamp_millis(ms as i64)
        .ok_or_else(|| JsValue::from_str(&format!("Timestamp out of range: {}", ms)))
}
