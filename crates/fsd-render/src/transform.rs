//! World ↔ screen transform.
//!
//! `screen = world * zoom / 100 + offset`. Zoom is a percentage; the offset
//! is in screen pixels.

use kurbo::{Affine, Point};
use serde::{Deserialize, Serialize};

pub const MIN_ZOOM: f64 = 10.0;
pub const MAX_ZOOM: f64 = 220.0;
pub const DEFAULT_ZOOM: f64 = 100.0;
/// `fit_to_view` never zooms in past this.
pub const FIT_MAX_ZOOM: f64 = 180.0;

/// Camera over the document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    /// Percent, `MIN_ZOOM..=MAX_ZOOM`.
    pub zoom: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

impl Viewport {
    pub fn new(zoom: f64, offset_x: f64, offset_y: f64) -> Self {
        Self {
            zoom,
            offset_x,
            offset_y,
        }
        .clamped()
    }

    /// World units → screen pixels.
    pub fn scale(&self) -> f64 {
        self.zoom / 100.0
    }

    pub fn world_to_screen(&self, p: Point) -> Point {
        let s = self.scale();
        Point::new(p.x * s + self.offset_x, p.y * s + self.offset_y)
    }

    pub fn screen_to_world(&self, p: Point) -> Point {
        let s = self.scale();
        Point::new((p.x - self.offset_x) / s, (p.y - self.offset_y) / s)
    }

    pub fn affine(&self) -> Affine {
        Affine::translate((self.offset_x, self.offset_y)) * Affine::scale(self.scale())
    }

    /// Zoom clamped into range; non-finite fields fall back to defaults.
    pub fn clamped(self) -> Self {
        let zoom = if self.zoom.is_finite() {
            self.zoom.clamp(MIN_ZOOM, MAX_ZOOM)
        } else {
            DEFAULT_ZOOM
        };
        let finite_or_zero = |v: f64| if v.is_finite() { v } else { 0.0 };
        Self {
            zoom,
            offset_x: finite_or_zero(self.offset_x),
            offset_y: finite_or_zero(self.offset_y),
        }
    }

    /// Change zoom while keeping the world point under `anchor` (screen
    /// coordinates) fixed on screen.
    pub fn zoom_at(&self, anchor: Point, zoom: f64) -> Self {
        let world = self.screen_to_world(anchor);
        let zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        let s = zoom / 100.0;
        Self {
            zoom,
            offset_x: anchor.x - world.x * s,
            offset_y: anchor.y - world.y * s,
        }
    }

    /// Same zoom, offset moved by a screen-pixel delta.
    pub fn panned(&self, dx: f64, dy: f64) -> Self {
        Self {
            offset_x: self.offset_x + dx,
            offset_y: self.offset_y + dy,
            ..*self
        }
    }
}

/// Logical (CSS pixel) size of the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub width: f64,
    pub height: f64,
}

impl SurfaceSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        !(self.width >= 1.0 && self.height >= 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_world_roundtrip() {
        let vp = Viewport::new(150.0, 30.0, -20.0);
        let p = Point::new(12.0, 34.0);
        let back = vp.screen_to_world(vp.world_to_screen(p));
        assert!((back - p).hypot() < 1e-9);
        assert_eq!(vp.world_to_screen(Point::new(10.0, 10.0)), Point::new(45.0, -5.0));
    }

    #[test]
    fn affine_matches_point_transform() {
        let vp = Viewport::new(80.0, 5.0, 7.0);
        let p = Point::new(100.0, 50.0);
        let a = vp.affine() * p;
        let b = vp.world_to_screen(p);
        assert!((a - b).hypot() < 1e-9);
    }

    #[test]
    fn zoom_at_keeps_anchor_fixed() {
        let vp = Viewport::new(100.0, 40.0, 10.0);
        let anchor = Point::new(300.0, 200.0);
        let before = vp.screen_to_world(anchor);
        let zoomed = vp.zoom_at(anchor, 160.0);
        let after = zoomed.screen_to_world(anchor);
        assert_eq!(zoomed.zoom, 160.0);
        assert!((before - after).hypot() < 1e-9);
    }

    #[test]
    fn zoom_is_clamped() {
        assert_eq!(Viewport::new(500.0, 0.0, 0.0).zoom, MAX_ZOOM);
        assert_eq!(Viewport::new(1.0, 0.0, 0.0).zoom, MIN_ZOOM);
        assert_eq!(Viewport::new(f64::NAN, f64::INFINITY, 3.0), Viewport::new(100.0, 0.0, 3.0));
    }

    #[test]
    fn empty_surface_detection() {
        assert!(SurfaceSize::new(0.0, 300.0).is_empty());
        assert!(SurfaceSize::new(f64::NAN, 300.0).is_empty());
        assert!(!SurfaceSize::new(640.0, 480.0).is_empty());
    }
}
