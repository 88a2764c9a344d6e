//! Input abstraction layer.
//!
//! Normalizes pointer and wheel events into plain structs consumed by the
//! canvas engine. Coordinates are CSS pixels relative to the surface's
//! top-left corner.

use kurbo::Point;

/// Keyboard modifiers held during an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on Windows/Linux, Cmd on macOS. Trackpad pinch also arrives as ctrl+wheel.
    pub fn zoom(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A pointer down/move/up/cancel/leave event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub pointer_id: i32,
    pub x: f64,
    pub y: f64,
}

impl PointerEvent {
    pub fn new(pointer_id: i32, x: f64, y: f64) -> Self {
        Self { pointer_id, x, y }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Unit of a wheel delta, as reported by `WheelEvent.deltaMode`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WheelDeltaMode {
    #[default]
    Pixel,
    Line,
    Page,
}

impl WheelDeltaMode {
    /// Map the DOM constant (0, 1, 2). Unknown values are treated as pixels.
    pub fn from_dom(mode: u32) -> Self {
        match mode {
            1 => WheelDeltaMode::Line,
            2 => WheelDeltaMode::Page,
            _ => WheelDeltaMode::Pixel,
        }
    }
}

/// Scroll wheel or trackpad scroll.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelEvent {
    pub x: f64,
    pub y: f64,
    pub delta_x: f64,
    pub delta_y: f64,
    pub delta_mode: WheelDeltaMode,
    pub modifiers: Modifiers,
}

impl WheelEvent {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}
