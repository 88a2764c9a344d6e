//! Ctrl/Cmd + wheel zoom around the cursor.

use crate::input::{WheelDeltaMode, WheelEvent};
use fsd_render::Viewport;

/// Zoom units per wheel "line".
pub const LINE_DELTA_MULTIPLIER: f64 = 6.0;
/// Zoom units per wheel pixel.
pub const PIXEL_DELTA_MULTIPLIER: f64 = 0.12;
pub const MIN_ZOOM_STEP: f64 = 2.0;
pub const MAX_ZOOM_STEP: f64 = 24.0;

/// Zoom change for one wheel event, in percent points.
pub fn wheel_zoom_step(ev: &WheelEvent) -> f64 {
    let magnitude = ev.delta_y.abs();
    let raw = match ev.delta_mode {
        WheelDeltaMode::Pixel => magnitude * PIXEL_DELTA_MULTIPLIER,
        WheelDeltaMode::Line => magnitude * LINE_DELTA_MULTIPLIER,
        WheelDeltaMode::Page => MAX_ZOOM_STEP,
    };
    if raw.is_finite() {
        raw.clamp(MIN_ZOOM_STEP, MAX_ZOOM_STEP)
    } else {
        MIN_ZOOM_STEP
    }
}

/// Viewport after a wheel event, or `None` when the event is not a zoom
/// (no ctrl/meta, or no vertical delta) and the host should scroll natively.
pub fn apply_wheel_zoom(viewport: &Viewport, ev: &WheelEvent) -> Option<Viewport> {
    if !ev.modifiers.zoom() || ev.delta_y == 0.0 || !ev.delta_y.is_finite() {
        return None;
    }
    let step = wheel_zoom_step(ev);
    let target = if ev.delta_y < 0.0 {
        viewport.zoom + step
    } else {
        viewport.zoom - step
    };
    Some(viewport.zoom_at(ev.position(), target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;
    use fsd_render::transform::{MAX_ZOOM, MIN_ZOOM};

    fn wheel(delta_y: f64, mode: WheelDeltaMode) -> WheelEvent {
        WheelEvent {
            x: 200.0,
            y: 150.0,
            delta_y,
            delta_mode: mode,
            modifiers: Modifiers {
                ctrl: true,
                ..Modifiers::default()
            },
            ..WheelEvent::default()
        }
    }

    #[test]
    fn steps_scale_with_delta_and_mode() {
        assert_eq!(wheel_zoom_step(&wheel(1.0, WheelDeltaMode::Pixel)), MIN_ZOOM_STEP);
        assert_eq!(wheel_zoom_step(&wheel(100.0, WheelDeltaMode::Pixel)), 12.0);
        assert_eq!(wheel_zoom_step(&wheel(3.0, WheelDeltaMode::Line)), 18.0);
        assert_eq!(wheel_zoom_step(&wheel(-40.0, WheelDeltaMode::Line)), MAX_ZOOM_STEP);
        assert_eq!(wheel_zoom_step(&wheel(1.0, WheelDeltaMode::Page)), MAX_ZOOM_STEP);
    }

    #[test]
    fn plain_wheel_is_not_a_zoom() {
        let mut ev = wheel(-100.0, WheelDeltaMode::Pixel);
        ev.modifiers = Modifiers::default();
        assert_eq!(apply_wheel_zoom(&Viewport::default(), &ev), None);
    }

    #[test]
    fn zoom_stays_in_range() {
        let mut vp = Viewport::default();
        for _ in 0..100 {
            vp = apply_wheel_zoom(&vp, &wheel(-3.0, WheelDeltaMode::Line)).unwrap();
            assert!(vp.zoom <= MAX_ZOOM);
        }
        assert_eq!(vp.zoom, MAX_ZOOM);
        for _ in 0..100 {
            vp = apply_wheel_zoom(&vp, &wheel(500.0, WheelDeltaMode::Pixel)).unwrap();
            assert!(vp.zoom >= MIN_ZOOM);
        }
        assert_eq!(vp.zoom, MIN_ZOOM);
    }

    #[test]
    fn zoom_keeps_point_under_cursor() {
        let vp = Viewport::new(100.0, 30.0, 40.0);
        let ev = wheel(-100.0, WheelDeltaMode::Pixel);
        let before = vp.screen_to_world(ev.position());
        let after = apply_wheel_zoom(&vp, &ev).unwrap();
        assert_eq!(after.zoom, 112.0);
        let moved = after.screen_to_world(ev.position());
        assert!((moved - before).hypot() < 1e-9);
    }
}
