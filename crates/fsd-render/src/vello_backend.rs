//! Display list → Vello scene.
//!
//! Replays the backend-agnostic draw commands as Vello fills and strokes.
//! Call once per frame with a freshly-cleared `Scene`; the caller presents
//! it via wgpu.

use crate::scene::{DisplayList, DrawCmd};
use crate::theme::parse_hex_color;
use kurbo::{Affine, BezPath, Point, Rect, Shape, Stroke};
use peniko::{Color, Fill};
use vello::Scene;

/// Paint a display list into a Vello scene.
pub fn paint_display_list(scene: &mut Scene, list: &DisplayList) {
    let surface = Rect::new(0.0, 0.0, list.size.width, list.size.height);
    scene.fill(
        Fill::NonZero,
        Affine::IDENTITY,
        to_color(list.background),
        None,
        &surface,
    );

    for cmd in &list.commands {
        match cmd {
            DrawCmd::FillRect {
                rect,
                radius,
                color,
            } => fill_shape(scene, &rect.to_rounded_rect(*radius), color),
            DrawCmd::StrokeRect {
                rect,
                radius,
                color,
                width,
            } => stroke_shape(scene, &rect.to_rounded_rect(*radius), color, *width),
            DrawCmd::Polyline {
                points,
                color,
                width,
            } => {
                let mut path = BezPath::new();
                let mut iter = points.iter();
                if let Some(first) = iter.next() {
                    path.move_to(*first);
                    for p in iter {
                        path.line_to(*p);
                    }
                    stroke_shape(scene, &path, color, *width);
                }
            }
            DrawCmd::Arrow {
                tip,
                from,
                width,
                length,
                color,
            } => fill_shape(scene, &arrow_path(*tip, *from, *width, *length), color),
            DrawCmd::Text { text, center, .. } => {
                // Glyph shaping needs a font context; labels are drawn by the Canvas2D backend.
                log::trace!("TEXT {:?} at ({}, {})", text, center.x, center.y);
            }
        }
    }
}

/// Triangle with its point at `tip`, base centered `length` back toward `from`.
pub fn arrow_path(tip: Point, from: Point, width: f64, length: f64) -> BezPath {
    let dir = tip - from;
    let len = dir.hypot();
    let unit = if len > f64::EPSILON {
        dir / len
    } else {
        kurbo::Vec2::new(0.0, 1.0)
    };
    let normal = kurbo::Vec2::new(-unit.y, unit.x) * (width / 2.0);
    let base = tip - unit * length;

    let mut path = BezPath::new();
    path.move_to(tip);
    path.line_to(base + normal);
    path.line_to(base - normal);
    path.close_path();
    path
}

fn fill_shape<S: Shape>(scene: &mut Scene, shape: &S, color: &str) {
    scene.fill(Fill::NonZero, Affine::IDENTITY, to_color(color), None, shape);
}

fn stroke_shape<S: Shape>(scene: &mut Scene, shape: &S, color: &str, width: f64) {
    scene.stroke(
        &Stroke::new(width),
        Affine::IDENTITY,
        to_color(color),
        None,
        shape,
    );
}

fn to_color(hex: &str) -> Color {
    let [r, g, b, a] = parse_hex_color(hex).unwrap_or([0, 0, 0, 255]);
    Color::from_rgba8(r, g, b, a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrow_points_along_the_segment() {
        let path = arrow_path(Point::new(0.0, 10.0), Point::new(0.0, 0.0), 8.0, 6.0);
        let bbox = path.bounding_box();
        assert_eq!(bbox, Rect::new(-4.0, 4.0, 4.0, 10.0));
    }

    #[test]
    fn degenerate_arrow_points_down() {
        let p = Point::new(5.0, 5.0);
        let bbox = arrow_path(p, p, 4.0, 4.0).bounding_box();
        assert_eq!(bbox, Rect::new(3.0, 1.0, 7.0, 5.0));
    }
}
