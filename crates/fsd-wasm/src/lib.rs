//! WASM bridge for feature-structure diagrams: exposes outline parsing,
//! indentation inspection, rebalancing, and the canvas engine to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. Everything crossing the
//! boundary is JSON text; failures come back as `{"ok":false,"error":"..."}`.

mod render2d;

pub use render2d::CanvasSurface;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use fsd_core::config::{LayoutOptions, RebalanceOptions, StyleOptions};
use fsd_core::model::Document;
use fsd_editor::{CanvasEngine, Modifiers, PointerEvent, WheelDeltaMode, WheelEvent};
use fsd_render::{SurfaceSize, Viewport};
use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

// ─── Stateless functions ────────────────────────────────────────────────

/// Parse indented outline text into a laid-out document.
/// Returns `{"ok":true,"document":{...}}` or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn parse_outline(text: &str, options_json: &str) -> String {
    let options: LayoutOptions = match options_from_json(options_json) {
        Ok(o) => o,
        Err(e) => return error_json(&e),
    };
    let doc = fsd_core::layout::parse_outline(text, &options);
    ok_json("document", &doc)
}

/// Advisory indentation report for outline text.
/// Returns `{"ok":true,"report":{"indentUnit":2,"issues":[...]}}`.
#[wasm_bindgen]
pub fn inspect_indent(text: &str) -> String {
    let report = fsd_core::inspect::inspect_feature_structure_indent_input(text);
    ok_json("report", &report)
}

/// Re-layout a manually edited document from its edges.
/// Returns `{"ok":true,"document":{...}}` or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn rebalance(document_json: &str, options_json: &str) -> String {
    let doc: Document = match serde_json::from_str(document_json) {
        Ok(d) => d,
        Err(e) => return error_json(&format!("Invalid document: {e}")),
    };
    let options: RebalanceOptions = match options_from_json(options_json) {
        Ok(o) => o,
        Err(e) => return error_json(&e),
    };
    let next = fsd_core::rebalance::rebalance_feature_structure_document(&doc, &options);
    ok_json("document", &next)
}

/// Indented outline text for a document, for re-seeding a text editor.
/// Returns `{"ok":true,"text":"..."}` or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn outline_text(document_json: &str, sort_by_position: bool) -> String {
    let doc: Document = match serde_json::from_str(document_json) {
        Ok(d) => d,
        Err(e) => return error_json(&format!("Invalid document: {e}")),
    };
    let outline = fsd_core::rebalance::document_to_outline(&doc, sort_by_position);
    ok_json("text", &fsd_core::rebalance::outline_text(&outline))
}

/// Empty input means "all defaults".
fn options_from_json<T: DeserializeOwned + Default>(json: &str) -> Result<T, String> {
    if json.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(json).map_err(|e| format!("Invalid options: {e}"))
}

fn ok_json<T: Serialize + ?Sized>(key: &str, value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(v) => {
            let mut obj = serde_json::Map::new();
            obj.insert("ok".to_string(), serde_json::Value::Bool(true));
            obj.insert(key.to_string(), v);
            serde_json::Value::Object(obj).to_string()
        }
        Err(e) => error_json(&format!("Serialization error: {e}")),
    }
}

fn error_json(message: &str) -> String {
    serde_json::json!({ "ok": false, "error": message }).to_string()
}

// ─── Canvas ─────────────────────────────────────────────────────────────

/// Queued engine callbacks, drained by JS after each call.
#[derive(Default)]
struct Outbox {
    commits: VecDeque<Document>,
    viewport: Option<Viewport>,
}

/// The WASM-facing canvas controller.
///
/// Wraps a [`CanvasEngine`] bound to an HTML canvas. JS forwards DOM events
/// here, runs [`frame`](Self::frame) from `requestAnimationFrame` while
/// [`wants_frame`](Self::wants_frame) is true, and drains committed
/// documents and viewport changes with the `take_*` methods.
#[wasm_bindgen]
pub struct FsdCanvas {
    engine: CanvasEngine<CanvasSurface>,
    outbox: Rc<RefCell<Outbox>>,
}

#[wasm_bindgen]
impl FsdCanvas {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement) -> Result<FsdCanvas, JsValue> {
        console_error_panic_hook_setup();

        let surface = CanvasSurface::new(canvas).map_err(|e| JsValue::from_str(&e))?;
        let outbox = Rc::new(RefCell::new(Outbox::default()));
        let commits = outbox.clone();
        let views = outbox.clone();
        let engine = CanvasEngine::new(surface)
            .on_document_commit(move |doc| commits.borrow_mut().commits.push_back(doc))
            .on_viewport_change(move |vp| views.borrow_mut().viewport = Some(vp));
        Ok(Self { engine, outbox })
    }

    /// Replace the document. Returns `false` if the JSON is malformed.
    pub fn set_document(&mut self, json: &str) -> bool {
        match serde_json::from_str::<Document>(json) {
            Ok(doc) => {
                let (viewport, style) = (self.engine.viewport(), *self.engine.style());
                self.engine.render(&doc, viewport, style);
                true
            }
            Err(e) => {
                log::warn!("set_document: {e}");
                false
            }
        }
    }

    pub fn set_viewport(&mut self, zoom: f64, offset_x: f64, offset_y: f64) {
        self.engine.set_viewport(Viewport::new(zoom, offset_x, offset_y));
    }

    /// Replace style options from partial JSON. Returns `false` if malformed.
    pub fn set_style(&mut self, json: &str) -> bool {
        match options_from_json::<StyleOptions>(json) {
            Ok(style) => {
                self.engine.set_style(style);
                true
            }
            Err(e) => {
                log::warn!("set_style: {e}");
                false
            }
        }
    }

    pub fn set_theme(&mut self, is_dark: bool) {
        self.engine.set_theme(is_dark);
    }

    // ── Input ──

    pub fn pointer_down(&mut self, pointer_id: i32, x: f64, y: f64) -> bool {
        self.engine.pointer_down(PointerEvent::new(pointer_id, x, y))
    }

    pub fn pointer_move(&mut self, pointer_id: i32, x: f64, y: f64) -> bool {
        self.engine.pointer_move(PointerEvent::new(pointer_id, x, y))
    }

    pub fn pointer_up(&mut self, pointer_id: i32, x: f64, y: f64) -> bool {
        self.engine.pointer_up(PointerEvent::new(pointer_id, x, y))
    }

    pub fn pointer_cancel(&mut self, pointer_id: i32, x: f64, y: f64) -> bool {
        self.engine.pointer_cancel(PointerEvent::new(pointer_id, x, y))
    }

    pub fn pointer_leave(&mut self, pointer_id: i32, x: f64, y: f64) -> bool {
        self.engine.pointer_leave(PointerEvent::new(pointer_id, x, y))
    }

    /// Returns `true` when JS should call `preventDefault()`.
    #[allow(clippy::too_many_arguments)]
    pub fn wheel(
        &mut self,
        x: f64,
        y: f64,
        delta_x: f64,
        delta_y: f64,
        delta_mode: u32,
        ctrl: bool,
        meta: bool,
        shift: bool,
        alt: bool,
    ) -> bool {
        self.engine.wheel(WheelEvent {
            x,
            y,
            delta_x,
            delta_y,
            delta_mode: WheelDeltaMode::from_dom(delta_mode),
            modifiers: Modifiers {
                shift,
                ctrl,
                alt,
                meta,
            },
        })
    }

    pub fn visibility_changed(&mut self, visible: bool, now_ms: f64) {
        self.engine.visibility_changed(visible, now_ms);
    }

    pub fn page_hide(&mut self) {
        self.engine.page_hide();
    }

    /// Forward a `ResizeObserver` content rect.
    pub fn container_resized(&mut self, width: f64, height: f64) {
        self.engine.container_resized(SurfaceSize::new(width, height));
    }

    // ── Frames ──

    pub fn wants_frame(&self, now_ms: f64) -> bool {
        self.engine.wants_frame(now_ms)
    }

    /// Earliest delayed re-render, for a `setTimeout` fallback.
    pub fn next_deadline(&self) -> Option<f64> {
        self.engine.next_deadline()
    }

    pub fn frame(&mut self, now_ms: f64) -> bool {
        self.engine.frame(now_ms)
    }

    /// Returns `false` when the canvas has no size yet.
    pub fn fit_to_view(&mut self) -> bool {
        self.engine.fit_to_view().is_some()
    }

    // ── Outbox ──

    /// Oldest committed document not yet taken, as JSON.
    pub fn take_committed_document(&mut self) -> Option<String> {
        let doc = self.outbox.borrow_mut().commits.pop_front()?;
        to_json_or_log(&doc)
    }

    /// Latest proposed viewport not yet taken, as
    /// `{"zoom":..,"offsetX":..,"offsetY":..}`.
    pub fn take_viewport_change(&mut self) -> Option<String> {
        let vp = self.outbox.borrow_mut().viewport.take()?;
        to_json_or_log(&vp)
    }

    /// CSS cursor for the current hover/drag state.
    pub fn cursor(&self) -> String {
        self.engine.cursor().as_css().to_string()
    }

    pub fn is_dragging(&self) -> bool {
        self.engine.is_dragging()
    }

    /// The bound canvas element.
    pub fn canvas(&self) -> HtmlCanvasElement {
        self.engine.surface().canvas().clone()
    }

    pub fn dispose(&mut self) {
        self.engine.dispose();
        let mut outbox = self.outbox.borrow_mut();
        outbox.commits.clear();
        outbox.viewport = None;
    }
}

fn to_json_or_log<T: Serialize>(value: &T) -> Option<String> {
    match serde_json::to_string(value) {
        Ok(json) => Some(json),
        Err(e) => {
            log::warn!("serialization failed: {e}");
            None
        }
    }
}

/// Set up better panic messages for WASM debugging.
fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("FSD WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
