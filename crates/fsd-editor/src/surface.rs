//! The drawing surface the engine renders into.
//!
//! Implemented over an HTML canvas in the wasm bridge; [`RecordingSurface`]
//! keeps everything in memory for tests and headless hosts.

use fsd_render::{CursorKind, DisplayList, SurfaceSize};

/// Platform seam for drawing, sizing, cursor, and pointer capture.
pub trait Surface {
    /// Live measurement of the container, in CSS pixels.
    fn measure(&self) -> SurfaceSize;

    fn device_pixel_ratio(&self) -> f64;

    /// Resize the backing buffer to `size * dpr` and the CSS box to `size`.
    fn apply_backing_size(&mut self, size: SurfaceSize, dpr: f64);

    /// Replay one frame.
    fn draw(&mut self, list: &DisplayList, dpr: f64);

    fn set_cursor(&mut self, cursor: CursorKind);

    /// May fail after route transitions or when the pointer is already gone.
    fn capture_pointer(&mut self, pointer_id: i32) -> Result<(), String>;

    fn release_pointer(&mut self, pointer_id: i32) -> Result<(), String>;
}

/// Last size and pixel ratio applied to the backing buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BackingState {
    applied: Option<(SurfaceSize, f64)>,
}

impl BackingState {
    /// Whether `size`/`dpr` differ from what was applied last.
    pub fn needs_update(&self, size: SurfaceSize, dpr: f64) -> bool {
        match self.applied {
            Some((s, d)) => s != size || d != dpr,
            None => true,
        }
    }

    pub fn record(&mut self, size: SurfaceSize, dpr: f64) {
        self.applied = Some((size, dpr));
    }

    pub fn reset(&mut self) {
        self.applied = None;
    }
}

/// In-memory surface that records what the engine asked of it.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub size: SurfaceSize,
    pub dpr: f64,
    pub backing: Option<(SurfaceSize, f64)>,
    pub backing_updates: usize,
    pub frames: usize,
    pub last_frame: Option<DisplayList>,
    pub cursor: CursorKind,
    pub captured: Option<i32>,
    /// Make `capture_pointer`/`release_pointer` fail.
    pub fail_capture: bool,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: SurfaceSize::new(width, height),
            dpr: 1.0,
            ..Self::default()
        }
    }
}

impl Surface for RecordingSurface {
    fn measure(&self) -> SurfaceSize {
        self.size
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.dpr
    }

    fn apply_backing_size(&mut self, size: SurfaceSize, dpr: f64) {
        self.backing = Some((size, dpr));
        self.backing_updates += 1;
    }

    fn draw(&mut self, list: &DisplayList, _dpr: f64) {
        self.frames += 1;
        self.last_frame = Some(list.clone());
    }

    fn set_cursor(&mut self, cursor: CursorKind) {
        self.cursor = cursor;
    }

    fn capture_pointer(&mut self, pointer_id: i32) -> Result<(), String> {
        if self.fail_capture {
            return Err(format!("pointer {pointer_id} is not active"));
        }
        self.captured = Some(pointer_id);
        Ok(())
    }

    fn release_pointer(&mut self, pointer_id: i32) -> Result<(), String> {
        if self.fail_capture || self.captured != Some(pointer_id) {
            return Err(format!("pointer {pointer_id} is not captured"));
        }
        self.captured = None;
        Ok(())
    }
}
