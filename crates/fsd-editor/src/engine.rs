//! The canvas engine: owns a surface, mirrors the host's document and
//! viewport, schedules frames, and runs the drag gesture state machine.
//!
//! The host owns the [`Document`] and [`Viewport`]. The engine only keeps
//! copies: a pan proposes a new viewport through the viewport-change
//! callback, and a node move or root resize edits the engine's mirror and
//! hands back a fresh clone through the document-commit callback when the
//! gesture ends with real displacement.

use crate::gesture::{DragMode, DragState, move_node_position, resize_root_rect};
use crate::input::{PointerEvent, WheelEvent};
use crate::scheduler::FrameScheduler;
use crate::surface::{BackingState, Surface};
use crate::zoom::apply_wheel_zoom;
use fsd_core::config::StyleOptions;
use fsd_core::model::Document;
use fsd_render::transform::FIT_MAX_ZOOM;
use fsd_render::{
    CanvasTheme, CursorKind, Overlay, ResizeHandle, SurfaceSize, Viewport, build_display_list,
    hit_test_handle, hit_test_node,
};
use kurbo::Point;

/// World-unit margin kept around the content by [`CanvasEngine::fit_to_view`].
pub const FIT_MARGIN: f64 = 56.0;

type ViewportListener = Box<dyn FnMut(Viewport)>;
type CommitListener = Box<dyn FnMut(Document)>;

pub struct CanvasEngine<S: Surface> {
    surface: S,
    document: Document,
    /// Host document that arrived mid-gesture.
    pending_document: Option<Document>,
    viewport: Viewport,
    style: StyleOptions,
    theme: CanvasTheme,
    scheduler: FrameScheduler,
    backing: BackingState,
    cached_size: Option<SurfaceSize>,
    drag: Option<DragState>,
    hovered_handle: Option<ResizeHandle>,
    cursor: CursorKind,
    on_viewport_change: Option<ViewportListener>,
    on_document_commit: Option<CommitListener>,
    disposed: bool,
}

impl<S: Surface> CanvasEngine<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            document: Document::default(),
            pending_document: None,
            viewport: Viewport::default(),
            style: StyleOptions::default(),
            theme: CanvasTheme::default(),
            scheduler: FrameScheduler::new(),
            backing: BackingState::default(),
            cached_size: None,
            drag: None,
            hovered_handle: None,
            cursor: CursorKind::Default,
            on_viewport_change: None,
            on_document_commit: None,
            disposed: false,
        }
    }

    /// Called with the proposed viewport after a pan, wheel zoom, or fit.
    pub fn on_viewport_change(mut self, f: impl FnMut(Viewport) + 'static) -> Self {
        self.on_viewport_change = Some(Box::new(f));
        self
    }

    /// Called once per node move or root resize that actually moved.
    pub fn on_document_commit(mut self, f: impl FnMut(Document) + 'static) -> Self {
        self.on_document_commit = Some(Box::new(f));
        self
    }

    // ─── Accessors ─────────────────────────────────────────────────────────

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// The engine's mirror, including in-flight gesture edits.
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn style(&self) -> &StyleOptions {
        &self.style
    }

    pub fn hovered_handle(&self) -> Option<ResizeHandle> {
        self.hovered_handle
    }

    pub fn cursor(&self) -> CursorKind {
        self.cursor
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Whether the host should run [`frame`](Self::frame) now.
    pub fn wants_frame(&self, now_ms: f64) -> bool {
        !self.disposed
            && (self.scheduler.frame_pending()
                || self.scheduler.next_deadline().is_some_and(|d| d <= now_ms))
    }

    /// Earliest delayed re-render, for hosts that sleep between frames.
    pub fn next_deadline(&self) -> Option<f64> {
        self.scheduler.next_deadline()
    }

    // ─── Host updates ──────────────────────────────────────────────────────

    /// Take a new document, viewport, and style from the host.
    ///
    /// The document is cloned. While a node move or resize is in flight the
    /// mirror stays authoritative and the new document waits until the
    /// gesture ends. Returns `true` if the host must request a frame.
    pub fn render(&mut self, document: &Document, viewport: Viewport, style: StyleOptions) -> bool {
        if self.disposed {
            return false;
        }
        let editing = self.drag.as_ref().is_some_and(|d| d.mode.edits_document());
        if editing {
            self.pending_document = Some(document.clone());
        } else {
            self.document = document.clone();
        }
        let viewport_frame = self.set_viewport(viewport);
        let style_frame = self.set_style(style);
        viewport_frame || style_frame
    }

    /// Take a viewport from the host without touching the document. Ignored
    /// mid-pan, where the gesture owns the viewport.
    pub fn set_viewport(&mut self, viewport: Viewport) -> bool {
        if self.drag.as_ref().is_some_and(|d| d.mode == DragMode::Pan) {
            return false;
        }
        self.viewport = viewport.clamped();
        self.request_render()
    }

    pub fn set_style(&mut self, style: StyleOptions) -> bool {
        self.style = style.normalized();
        self.request_render()
    }

    pub fn set_theme(&mut self, dark: bool) -> bool {
        self.theme = if dark {
            CanvasTheme::dark()
        } else {
            CanvasTheme::light()
        };
        self.request_render()
    }

    /// The container changed size. An empty size forces a live measurement
    /// on the next frame.
    pub fn container_resized(&mut self, size: SurfaceSize) -> bool {
        if self.disposed {
            return false;
        }
        self.cached_size = (!size.is_empty()).then_some(size);
        self.scheduler.schedule_resize()
    }

    /// Page visibility changed. Hiding flushes an in-flight gesture; showing
    /// again re-renders now and twice shortly after.
    pub fn visibility_changed(&mut self, visible: bool, now_ms: f64) -> bool {
        if self.disposed {
            return false;
        }
        if !visible {
            self.finish_gesture();
            return false;
        }
        self.cached_size = None;
        self.scheduler.request_recovery_burst(now_ms)
    }

    /// `pagehide` safety net for a missed pointer-up.
    pub fn page_hide(&mut self) {
        self.finish_gesture();
    }

    // ─── Frames ────────────────────────────────────────────────────────────

    /// Run one animation-frame callback. Returns `true` if a frame was drawn.
    pub fn frame(&mut self, now_ms: f64) -> bool {
        if self.disposed {
            return false;
        }
        let work = self.scheduler.poll(now_ms);
        if work.is_empty() {
            return false;
        }
        let size = self.resolve_size();
        if size.is_empty() {
            log::warn!(
                "canvas surface is {}x{}, skipping frame",
                size.width,
                size.height
            );
            return false;
        }

        let dpr = sanitize_dpr(self.surface.device_pixel_ratio());
        if self.backing.needs_update(size, dpr) {
            self.surface.apply_backing_size(size, dpr);
            self.backing.record(size, dpr);
        }

        let overlay = Overlay {
            show_root_handles: self.document.primary_root().is_some(),
            hovered_handle: self.hovered_handle,
            active_handle: self.drag.as_ref().and_then(|d| match d.mode {
                DragMode::RootResize { handle, .. } => Some(handle),
                _ => None,
            }),
        };
        let list = build_display_list(
            &self.document,
            &self.viewport,
            &self.style,
            &self.theme,
            &overlay,
            size,
        );
        self.surface.draw(&list, dpr);
        true
    }

    fn resolve_size(&mut self) -> SurfaceSize {
        if let Some(size) = self.cached_size
            && !size.is_empty()
        {
            return size;
        }
        let live = self.surface.measure();
        self.cached_size = (!live.is_empty()).then_some(live);
        live
    }

    fn request_render(&mut self) -> bool {
        !self.disposed && self.scheduler.schedule_render()
    }

    // ─── Pointer input ─────────────────────────────────────────────────────

    /// Start a gesture: resize handle first, then node body, else pan.
    pub fn pointer_down(&mut self, ev: PointerEvent) -> bool {
        if self.disposed || self.drag.is_some() {
            return false;
        }
        let screen = ev.position();
        let world = self.viewport.screen_to_world(screen);
        let root_index = self.document.primary_root_index();

        let (mode, start_bounds) =
            match (hit_test_handle(&self.document, &self.viewport, screen), root_index) {
                (Some(handle), Some(index)) => (
                    DragMode::RootResize { index, handle },
                    Some(self.document.nodes[index].bounds()),
                ),
                _ => match hit_test_node(&self.document, world) {
                    Some(index) => (
                        DragMode::Node {
                            index,
                            is_root: Some(index) == root_index,
                        },
                        Some(self.document.nodes[index].bounds()),
                    ),
                    None => (DragMode::Pan, None),
                },
            };

        let captured = match self.surface.capture_pointer(ev.pointer_id) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("pointer capture failed, continuing uncaptured: {e}");
                false
            }
        };
        log::debug!("gesture start: {mode:?}");

        self.drag = Some(DragState {
            pointer_id: ev.pointer_id,
            mode,
            start: screen,
            start_viewport: self.viewport,
            start_bounds,
            moved: false,
            captured,
        });
        self.hovered_handle = match mode {
            DragMode::RootResize { handle, .. } => Some(handle),
            _ => None,
        };
        self.set_cursor(mode.cursor());
        self.request_render()
    }

    /// Advance the active gesture, or update hover affordances when idle.
    pub fn pointer_move(&mut self, ev: PointerEvent) -> bool {
        if self.disposed {
            return false;
        }
        let Some(mut drag) = self.drag.take() else {
            return self.update_hover(ev.position());
        };
        if drag.pointer_id != ev.pointer_id {
            self.drag = Some(drag);
            return false;
        }

        let delta = drag.track(ev.position());
        let scale = drag.start_viewport.scale();
        let delta_world = delta / scale;

        match (drag.mode, drag.start_bounds) {
            (DragMode::Pan, _) => {
                let next = drag.start_viewport.panned(delta.x, delta.y);
                self.drag = Some(drag);
                self.emit_viewport(next);
            }
            (DragMode::Node { index, is_root }, Some(start)) => {
                let p = move_node_position(
                    &start,
                    delta_world,
                    is_root,
                    self.document.width,
                    self.document.height,
                );
                if let Some(node) = self.document.nodes.get_mut(index) {
                    node.x = p.x;
                    node.y = p.y;
                }
                if is_root {
                    self.document.ensure_contains(index);
                }
                self.drag = Some(drag);
            }
            (DragMode::RootResize { index, handle }, Some(start)) => {
                let b = resize_root_rect(&start, handle, delta_world);
                if let Some(node) = self.document.nodes.get_mut(index) {
                    node.set_bounds(b);
                }
                self.document.ensure_contains(index);
                self.drag = Some(drag);
            }
            (_, None) => {
                self.drag = Some(drag);
                return false;
            }
        }
        self.request_render()
    }

    pub fn pointer_up(&mut self, ev: PointerEvent) -> bool {
        if !self.owns_pointer(ev.pointer_id) {
            return false;
        }
        self.finish_gesture()
    }

    pub fn pointer_cancel(&mut self, ev: PointerEvent) -> bool {
        if !self.owns_pointer(ev.pointer_id) {
            return false;
        }
        self.finish_gesture()
    }

    /// Pointer left the surface. Ends the gesture it owns, captured or not
    /// (an uncaptured pointer stops delivering moves once outside); an idle
    /// pointer clears hover.
    pub fn pointer_leave(&mut self, ev: PointerEvent) -> bool {
        match &self.drag {
            Some(d) if d.pointer_id == ev.pointer_id => self.finish_gesture(),
            Some(_) => false,
            None => {
                let had_hover = self.hovered_handle.take().is_some();
                self.set_cursor(CursorKind::Default);
                had_hover && self.request_render()
            }
        }
    }

    /// Ctrl/Cmd + wheel zoom. Returns `true` when the event was consumed and
    /// the host should suppress native scrolling.
    pub fn wheel(&mut self, ev: WheelEvent) -> bool {
        if self.disposed {
            return false;
        }
        match apply_wheel_zoom(&self.viewport, &ev) {
            Some(next) => {
                self.emit_viewport(next);
                self.request_render();
                true
            }
            None => false,
        }
    }

    fn owns_pointer(&self, pointer_id: i32) -> bool {
        self.drag.as_ref().is_some_and(|d| d.pointer_id == pointer_id)
    }

    fn update_hover(&mut self, screen: Point) -> bool {
        let handle = hit_test_handle(&self.document, &self.viewport, screen);
        let cursor = match handle {
            Some(h) => h.cursor(),
            None => {
                let world = self.viewport.screen_to_world(screen);
                if hit_test_node(&self.document, world).is_some() {
                    CursorKind::Grab
                } else {
                    CursorKind::Default
                }
            }
        };
        self.set_cursor(cursor);
        if handle != self.hovered_handle {
            self.hovered_handle = handle;
            return self.request_render();
        }
        false
    }

    /// End the active gesture: commit if it edited and moved, release the
    /// pointer, reset hover and cursor, then apply any held host document.
    fn finish_gesture(&mut self) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        let commit = drag.mode.edits_document() && drag.moved;
        log::debug!("gesture end: {:?}, moved={}, commit={commit}", drag.mode, drag.moved);

        if commit {
            self.document.touch();
            let snapshot = self.document.clone();
            if let Some(f) = self.on_document_commit.as_mut() {
                f(snapshot);
            }
            // The host will answer with the committed document; the older
            // one it sent mid-gesture is stale.
            self.pending_document = None;
        } else if let Some(doc) = self.pending_document.take() {
            self.document = doc;
        }

        if drag.captured
            && let Err(e) = self.surface.release_pointer(drag.pointer_id)
        {
            log::warn!("pointer release failed: {e}");
        }
        self.hovered_handle = None;
        self.set_cursor(CursorKind::Default);
        self.request_render()
    }

    // ─── Viewport ──────────────────────────────────────────────────────────

    /// Zoom and center so every node fits the surface with [`FIT_MARGIN`]
    /// around it. An empty document resets to 100% at the origin.
    pub fn fit_to_view(&mut self) -> Option<Viewport> {
        if self.disposed {
            return None;
        }
        let next = match self.document.content_bounds() {
            None => Viewport::default(),
            Some(b) => {
                let size = self.resolve_size();
                if size.is_empty() {
                    log::warn!("cannot fit to an empty surface");
                    return None;
                }
                let fit_w = size.width / (b.width + FIT_MARGIN * 2.0);
                let fit_h = size.height / (b.height + FIT_MARGIN * 2.0);
                let zoom = (fit_w.min(fit_h) * 100.0).min(FIT_MAX_ZOOM);
                let s = Viewport::new(zoom, 0.0, 0.0).scale();
                let (cx, cy) = b.center();
                Viewport::new(
                    zoom,
                    size.width / 2.0 - cx * s,
                    size.height / 2.0 - cy * s,
                )
            }
        };
        self.emit_viewport(next);
        self.request_render();
        Some(next)
    }

    fn emit_viewport(&mut self, next: Viewport) {
        self.viewport = next;
        if let Some(f) = self.on_viewport_change.as_mut() {
            f(next);
        }
    }

    fn set_cursor(&mut self, cursor: CursorKind) {
        if self.cursor != cursor {
            self.cursor = cursor;
            self.surface.set_cursor(cursor);
        }
    }

    /// Drop gesture state, pending frames, and callbacks. Later calls are
    /// no-ops.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        if let Some(drag) = self.drag.take()
            && drag.captured
            && let Err(e) = self.surface.release_pointer(drag.pointer_id)
        {
            log::warn!("pointer release failed: {e}");
        }
        self.scheduler.cancel();
        self.backing.reset();
        self.on_viewport_change = None;
        self.on_document_commit = None;
        self.pending_document = None;
        self.disposed = true;
    }
}

fn sanitize_dpr(dpr: f64) -> f64 {
    if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;

    #[test]
    fn bad_pixel_ratio_falls_back() {
        assert_eq!(sanitize_dpr(f64::NAN), 1.0);
        assert_eq!(sanitize_dpr(0.0), 1.0);
        assert_eq!(sanitize_dpr(2.0), 2.0);
    }

    #[test]
    fn renders_are_coalesced() {
        let mut engine = CanvasEngine::new(RecordingSurface::new(800.0, 600.0));
        let doc = Document::default();
        assert!(engine.render(&doc, Viewport::default(), StyleOptions::default()));
        assert!(!engine.render(&doc, Viewport::default(), StyleOptions::default()));
        assert!(engine.frame(16.0));
        assert!(!engine.frame(32.0));
        assert_eq!(engine.surface().frames, 1);
    }

    #[test]
    fn zero_size_skips_frame() {
        let mut engine = CanvasEngine::new(RecordingSurface::new(0.0, 0.0));
        engine.render(&Document::default(), Viewport::default(), StyleOptions::default());
        assert!(!engine.frame(0.0));
        assert_eq!(engine.surface().frames, 0);

        engine.surface_mut().size = SurfaceSize::new(300.0, 200.0);
        engine.container_resized(SurfaceSize::new(300.0, 200.0));
        assert!(engine.frame(16.0));
    }

    #[test]
    fn dispose_stops_everything() {
        let mut engine = CanvasEngine::new(RecordingSurface::new(800.0, 600.0));
        engine.render(&Document::default(), Viewport::default(), StyleOptions::default());
        engine.dispose();
        assert!(!engine.frame(16.0));
        assert!(!engine.render(&Document::default(), Viewport::default(), StyleOptions::default()));
        assert!(engine.is_disposed());
    }
}
