//! Drag gesture state and the geometry it drives.
//!
//! A gesture starts on pointer-down, is classified once (pan, node move,
//! or root resize), and ends on pointer-up/cancel. The helpers here are
//! pure: they take the snapshot captured at pointer-down plus the current
//! delta and return new geometry.

use fsd_core::model::Bounds;
use fsd_render::{CursorKind, ResizeHandle, Viewport};
use kurbo::{Point, Vec2};

/// Screen distance a pointer must travel before a drag counts as moved.
pub const MOVE_THRESHOLD_PX: f64 = 1.0;
/// Non-root nodes stay this far inside the document edges.
pub const NODE_MARGIN: f64 = 16.0;
/// The primary root stays this far from the document origin.
pub const ROOT_MARGIN: f64 = 8.0;
pub const MIN_NODE_WIDTH: f64 = 56.0;
pub const MIN_NODE_HEIGHT: f64 = 32.0;

/// How a gesture was classified at pointer-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    Pan,
    Node { index: usize, is_root: bool },
    RootResize { index: usize, handle: ResizeHandle },
}

impl DragMode {
    /// Gestures that edit the document and are committed when they moved.
    pub fn edits_document(&self) -> bool {
        !matches!(self, DragMode::Pan)
    }

    pub fn cursor(&self) -> CursorKind {
        match self {
            DragMode::Pan | DragMode::Node { .. } => CursorKind::Grabbing,
            DragMode::RootResize { handle, .. } => handle.cursor(),
        }
    }
}

/// One in-flight gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    pub pointer_id: i32,
    pub mode: DragMode,
    /// Pointer position at pointer-down, screen pixels.
    pub start: Point,
    pub start_viewport: Viewport,
    /// Target node geometry at pointer-down.
    pub start_bounds: Option<Bounds>,
    pub moved: bool,
    pub captured: bool,
}

impl DragState {
    /// Screen delta from the start point; latches `moved` past the threshold.
    pub fn track(&mut self, p: Point) -> Vec2 {
        let delta = p - self.start;
        if delta.x.abs() > MOVE_THRESHOLD_PX || delta.y.abs() > MOVE_THRESHOLD_PX {
            self.moved = true;
        }
        delta
    }
}

/// Clamp with the lower bound winning when the range is empty.
pub fn clamp_between(v: f64, lo: f64, hi: f64) -> f64 {
    v.min(hi).max(lo)
}

/// New top-left for a dragged node.
///
/// Non-root nodes stay inside `[NODE_MARGIN, doc - size - NODE_MARGIN]`;
/// the primary root only keeps `ROOT_MARGIN` from the origin and may push
/// the document outward.
pub fn move_node_position(
    start: &Bounds,
    delta_world: Vec2,
    is_root: bool,
    doc_width: f64,
    doc_height: f64,
) -> Point {
    let x = start.x + delta_world.x;
    let y = start.y + delta_world.y;
    if is_root {
        return Point::new(x.max(ROOT_MARGIN), y.max(ROOT_MARGIN));
    }
    Point::new(
        clamp_between(x, NODE_MARGIN, doc_width - start.width - NODE_MARGIN),
        clamp_between(y, NODE_MARGIN, doc_height - start.height - NODE_MARGIN),
    )
}

/// New root rectangle after dragging `handle` by `delta_world`.
///
/// Only the edges the handle owns move; the opposite edges stay put. Moving
/// edges stop `MIN_NODE_WIDTH`/`MIN_NODE_HEIGHT` short of the fixed edge.
pub fn resize_root_rect(start: &Bounds, handle: ResizeHandle, delta_world: Vec2) -> Bounds {
    let (mut left, mut top) = (start.x, start.y);
    let (mut right, mut bottom) = (start.right(), start.bottom());

    if handle.moves_left() {
        left = (left + delta_world.x).min(right - MIN_NODE_WIDTH).max(ROOT_MARGIN);
    }
    if handle.moves_right() {
        right = (right + delta_world.x).max(left + MIN_NODE_WIDTH);
    }
    if handle.moves_top() {
        top = (top + delta_world.y).min(bottom - MIN_NODE_HEIGHT).max(ROOT_MARGIN);
    }
    if handle.moves_bottom() {
        bottom = (bottom + delta_world.y).max(top + MIN_NODE_HEIGHT);
    }
    // A root that was already smaller than the minimum grows on its free side.
    right = right.max(left + MIN_NODE_WIDTH);
    bottom = bottom.max(top + MIN_NODE_HEIGHT);

    Bounds::from_edges(left, top, right, bottom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn root() -> Bounds {
        Bounds::new(100.0, 100.0, 200.0, 60.0)
    }

    #[test]
    fn threshold_latches_moved() {
        let mut d = DragState {
            pointer_id: 1,
            mode: DragMode::Pan,
            start: Point::new(10.0, 10.0),
            start_viewport: Viewport::default(),
            start_bounds: None,
            moved: false,
            captured: true,
        };
        d.track(Point::new(11.0, 10.5));
        assert!(!d.moved);
        d.track(Point::new(12.5, 10.0));
        assert!(d.moved);
        d.track(Point::new(10.0, 10.0));
        assert!(d.moved);
    }

    #[test]
    fn non_root_is_contained() {
        let leaf = Bounds::new(50.0, 50.0, 60.0, 90.0);
        let p = move_node_position(&leaf, Vec2::new(-500.0, 5000.0), false, 920.0, 620.0);
        assert_eq!(p, Point::new(NODE_MARGIN, 620.0 - 90.0 - NODE_MARGIN));
        let p = move_node_position(&leaf, Vec2::new(5000.0, -500.0), false, 920.0, 620.0);
        assert_eq!(p, Point::new(920.0 - 60.0 - NODE_MARGIN, NODE_MARGIN));
    }

    #[test]
    fn oversized_node_pins_to_margin() {
        let wide = Bounds::new(16.0, 16.0, 2000.0, 40.0);
        let p = move_node_position(&wide, Vec2::new(300.0, 0.0), false, 920.0, 620.0);
        assert_eq!(p.x, NODE_MARGIN);
    }

    #[test]
    fn root_only_floors() {
        let p = move_node_position(&root(), Vec2::new(-500.0, 4000.0), true, 920.0, 620.0);
        assert_eq!(p, Point::new(ROOT_MARGIN, 4100.0));
    }

    #[test]
    fn right_handle_is_axis_locked() {
        let b = resize_root_rect(&root(), ResizeHandle::Right, Vec2::new(40.0, 300.0));
        assert_eq!(b, Bounds::new(100.0, 100.0, 240.0, 60.0));
    }

    #[test]
    fn top_left_moves_two_edges() {
        let b = resize_root_rect(&root(), ResizeHandle::TopLeft, Vec2::new(-20.0, -30.0));
        assert_eq!(b, Bounds::new(80.0, 70.0, 220.0, 90.0));
    }

    #[test]
    fn shrinking_stops_at_minimums() {
        for handle in ResizeHandle::ALL {
            for delta in [Vec2::new(1e4, 1e4), Vec2::new(-1e4, -1e4), Vec2::new(1e4, -1e4)] {
                let b = resize_root_rect(&root(), handle, delta);
                assert!(b.width >= MIN_NODE_WIDTH, "{handle:?} {delta:?} -> {b:?}");
                assert!(b.height >= MIN_NODE_HEIGHT, "{handle:?} {delta:?} -> {b:?}");
                assert!(b.x >= ROOT_MARGIN && b.y >= ROOT_MARGIN);
            }
        }
    }

    #[test]
    fn left_handle_keeps_right_edge_fixed() {
        let b = resize_root_rect(&root(), ResizeHandle::Left, Vec2::new(500.0, 0.0));
        assert_eq!(b.right(), 300.0);
        assert_eq!(b.width, MIN_NODE_WIDTH);
    }
}
