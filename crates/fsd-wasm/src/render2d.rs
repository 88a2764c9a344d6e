//! Canvas2D surface.
//!
//! Replays a [`DisplayList`] onto an HTML `<canvas>` through
//! `CanvasRenderingContext2d`, and implements the engine's [`Surface`] seam
//! (backing-buffer sizing, cursor, pointer capture) on the same element.

use fsd_editor::Surface;
use fsd_render::vello_backend::arrow_path;
use fsd_render::{CursorKind, DisplayList, DrawCmd, SurfaceSize};
use kurbo::{PathEl, Rect, Shape};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// Flattening tolerance for rounded corners, in device pixels.
const PATH_TOLERANCE: f64 = 0.1;

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, String> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| format!("getContext failed: {e:?}"))?
            .ok_or_else(|| "2d context unavailable".to_string())?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| "context is not a CanvasRenderingContext2d".to_string())?;
        Ok(Self { canvas, ctx })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    fn set_style(&self, name: &str, value: &str) {
        if let Err(e) = self.canvas.style().set_property(name, value) {
            log::warn!("failed to set canvas style {name}: {e:?}");
        }
    }
}

impl Surface for CanvasSurface {
    /// The container's box; the canvas itself when it has no parent.
    fn measure(&self) -> SurfaceSize {
        let rect = match self.canvas.parent_element() {
            Some(parent) => parent.get_bounding_client_rect(),
            None => self.canvas.get_bounding_client_rect(),
        };
        SurfaceSize::new(rect.width().floor(), rect.height().floor())
    }

    fn device_pixel_ratio(&self) -> f64 {
        web_sys::window()
            .map(|w| w.device_pixel_ratio())
            .unwrap_or(1.0)
    }

    fn apply_backing_size(&mut self, size: SurfaceSize, dpr: f64) {
        self.canvas.set_width((size.width * dpr).round() as u32);
        self.canvas.set_height((size.height * dpr).round() as u32);
        self.set_style("width", &format!("{}px", size.width));
        self.set_style("height", &format!("{}px", size.height));
    }

    fn draw(&mut self, list: &DisplayList, dpr: f64) {
        paint_display_list(&self.ctx, list, dpr);
    }

    fn set_cursor(&mut self, cursor: CursorKind) {
        self.set_style("cursor", cursor.as_css());
    }

    fn capture_pointer(&mut self, pointer_id: i32) -> Result<(), String> {
        self.canvas
            .set_pointer_capture(pointer_id)
            .map_err(|e| format!("{e:?}"))
    }

    fn release_pointer(&mut self, pointer_id: i32) -> Result<(), String> {
        self.canvas
            .release_pointer_capture(pointer_id)
            .map_err(|e| format!("{e:?}"))
    }
}

/// Draw a display list in CSS pixels, scaled by `dpr` onto the backing buffer.
pub fn paint_display_list(ctx: &CanvasRenderingContext2d, list: &DisplayList, dpr: f64) {
    if let Err(e) = ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0) {
        log::warn!("setTransform failed: {e:?}");
    }
    ctx.set_fill_style_str(list.background);
    ctx.fill_rect(0.0, 0.0, list.size.width, list.size.height);

    for cmd in &list.commands {
        match cmd {
            DrawCmd::FillRect {
                rect,
                radius,
                color,
            } => {
                ctx.set_fill_style_str(color);
                if *radius > 0.0 {
                    rect_path(ctx, *rect, *radius);
                    ctx.fill();
                } else {
                    ctx.fill_rect(rect.x0, rect.y0, rect.width(), rect.height());
                }
            }
            DrawCmd::StrokeRect {
                rect,
                radius,
                color,
                width,
            } => {
                ctx.set_stroke_style_str(color);
                ctx.set_line_width(*width);
                rect_path(ctx, *rect, *radius);
                ctx.stroke();
            }
            DrawCmd::Polyline {
                points,
                color,
                width,
            } => {
                let Some((first, rest)) = points.split_first() else {
                    continue;
                };
                ctx.set_stroke_style_str(color);
                ctx.set_line_width(*width);
                ctx.set_line_join("round");
                ctx.begin_path();
                ctx.move_to(first.x, first.y);
                for p in rest {
                    ctx.line_to(p.x, p.y);
                }
                ctx.stroke();
            }
            DrawCmd::Arrow {
                tip,
                from,
                width,
                length,
                color,
            } => {
                ctx.set_fill_style_str(color);
                ctx.begin_path();
                trace_path(ctx, arrow_path(*tip, *from, *width, *length).elements());
                ctx.fill();
            }
            DrawCmd::Text {
                text,
                center,
                font_px,
                font_family,
                color,
            } => {
                ctx.set_font(&format!("{font_px}px {font_family}"));
                ctx.set_fill_style_str(color);
                ctx.set_text_align("center");
                ctx.set_text_baseline("middle");
                if let Err(e) = ctx.fill_text(text, center.x, center.y) {
                    log::warn!("fillText failed for {text:?}: {e:?}");
                }
            }
        }
    }
}

fn rect_path(ctx: &CanvasRenderingContext2d, rect: Rect, radius: f64) {
    ctx.begin_path();
    if radius > 0.0 {
        let rounded = rect.to_rounded_rect(radius);
        let elements: Vec<PathEl> = rounded.path_elements(PATH_TOLERANCE).collect();
        trace_path(ctx, &elements);
    } else {
        ctx.rect(rect.x0, rect.y0, rect.width(), rect.height());
    }
}

fn trace_path(ctx: &CanvasRenderingContext2d, elements: &[PathEl]) {
    for el in elements {
        match *el {
            PathEl::MoveTo(p) => ctx.move_to(p.x, p.y),
            PathEl::LineTo(p) => ctx.line_to(p.x, p.y),
            PathEl::QuadTo(c, p) => ctx.quadratic_curve_to(c.x, c.y, p.x, p.y),
            PathEl::CurveTo(c1, c2, p) => ctx.bezier_curve_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y),
            PathEl::ClosePath => ctx.close_path(),
        }
    }
}
