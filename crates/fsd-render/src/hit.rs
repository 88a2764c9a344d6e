//! Hit testing: point → node or resize handle.
//!
//! Node bodies are tested in world space, last node first (last painted is
//! topmost). Resize handles are tested in screen space so their grab area
//! does not shrink when zoomed out.

use crate::transform::Viewport;
use fsd_core::model::{Bounds, Document};
use kurbo::{Point, Rect};

/// Drawn side length of a handle square, in screen pixels.
pub const HANDLE_SIZE_PX: f64 = 8.0;
/// Half-width of a handle's grab area, in screen pixels.
pub const HANDLE_HIT_RADIUS_PX: f64 = 7.0;

/// The eight resize grips around the primary root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

impl ResizeHandle {
    /// Corners before edges: where grab areas overlap, corners win.
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::TopLeft,
        ResizeHandle::TopRight,
        ResizeHandle::BottomRight,
        ResizeHandle::BottomLeft,
        ResizeHandle::Top,
        ResizeHandle::Right,
        ResizeHandle::Bottom,
        ResizeHandle::Left,
    ];

    pub fn moves_left(self) -> bool {
        matches!(self, Self::TopLeft | Self::Left | Self::BottomLeft)
    }

    pub fn moves_right(self) -> bool {
        matches!(self, Self::TopRight | Self::Right | Self::BottomRight)
    }

    pub fn moves_top(self) -> bool {
        matches!(self, Self::TopLeft | Self::Top | Self::TopRight)
    }

    pub fn moves_bottom(self) -> bool {
        matches!(self, Self::BottomLeft | Self::Bottom | Self::BottomRight)
    }

    /// Where the handle sits on `b`, in world coordinates.
    pub fn anchor(self, b: &Bounds) -> Point {
        let x = if self.moves_left() {
            b.x
        } else if self.moves_right() {
            b.right()
        } else {
            b.x + b.width / 2.0
        };
        let y = if self.moves_top() {
            b.y
        } else if self.moves_bottom() {
            b.bottom()
        } else {
            b.y + b.height / 2.0
        };
        Point::new(x, y)
    }

    pub fn cursor(self) -> CursorKind {
        match self {
            Self::TopLeft | Self::BottomRight => CursorKind::NwseResize,
            Self::TopRight | Self::BottomLeft => CursorKind::NeswResize,
            Self::Top | Self::Bottom => CursorKind::NsResize,
            Self::Left | Self::Right => CursorKind::EwResize,
        }
    }
}

/// Pointer affordance shown over the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorKind {
    #[default]
    Default,
    Grab,
    Grabbing,
    NwseResize,
    NeswResize,
    NsResize,
    EwResize,
}

impl CursorKind {
    pub fn as_css(self) -> &'static str {
        match self {
            CursorKind::Default => "default",
            CursorKind::Grab => "grab",
            CursorKind::Grabbing => "grabbing",
            CursorKind::NwseResize => "nwse-resize",
            CursorKind::NeswResize => "nesw-resize",
            CursorKind::NsResize => "ns-resize",
            CursorKind::EwResize => "ew-resize",
        }
    }
}

/// Index of the topmost node containing the world point, if any.
pub fn hit_test_node(doc: &Document, world: Point) -> Option<usize> {
    doc.nodes
        .iter()
        .rposition(|n| n.bounds().contains(world.x, world.y))
}

/// The primary-root handle under the screen point, if any.
pub fn hit_test_handle(
    doc: &Document,
    viewport: &Viewport,
    screen: Point,
) -> Option<ResizeHandle> {
    let root = doc.primary_root()?;
    let b = root.bounds();
    ResizeHandle::ALL.into_iter().find(|h| {
        let c = viewport.world_to_screen(h.anchor(&b));
        (c.x - screen.x).abs() <= HANDLE_HIT_RADIUS_PX
            && (c.y - screen.y).abs() <= HANDLE_HIT_RADIUS_PX
    })
}

/// Screen-space squares for all eight handles of `b`.
pub fn handle_rects(b: &Bounds, viewport: &Viewport) -> [(ResizeHandle, Rect); 8] {
    let half = HANDLE_SIZE_PX / 2.0;
    ResizeHandle::ALL.map(|h| {
        let c = viewport.world_to_screen(h.anchor(b));
        (h, Rect::new(c.x - half, c.y - half, c.x + half, c.y + half))
    })
}
