//! Document → display list.
//!
//! Builds a flat list of screen-space draw commands from a document, a
//! viewport, and the style options. Backends (Canvas2D, Vello) replay the
//! list; nothing here touches a platform API, and the document is only read.

use crate::hit::{ResizeHandle, handle_rects};
use crate::theme::CanvasTheme;
use crate::transform::{SurfaceSize, Viewport};
use fsd_core::config::StyleOptions;
use fsd_core::layout::{label_padding, wrap_label};
use fsd_core::model::{Document, Node, NodeKind};
use kurbo::{Point, Rect};
use smallvec::{SmallVec, smallvec};

const MODULE_RADIUS: f64 = 8.0;
const LEAF_RADIUS: f64 = 4.0;
const LABEL_LINE_HEIGHT: f64 = 1.4;
/// Gap between the root and its selection outline, in screen pixels.
const SELECTION_INSET_PX: f64 = 3.0;

/// A single screen-space drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    FillRect {
        rect: Rect,
        radius: f64,
        color: &'static str,
    },
    StrokeRect {
        rect: Rect,
        radius: f64,
        color: &'static str,
        width: f64,
    },
    Polyline {
        points: SmallVec<[Point; 4]>,
        color: &'static str,
        width: f64,
    },
    /// Filled triangle with its point at `tip`, aimed away from `from`.
    Arrow {
        tip: Point,
        from: Point,
        width: f64,
        length: f64,
        color: &'static str,
    },
    /// One line of text, centered on `center`.
    Text {
        text: String,
        center: Point,
        font_px: f64,
        font_family: &'static str,
        color: &'static str,
    },
}

/// Everything one frame needs, in paint order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DisplayList {
    pub size: SurfaceSize,
    pub background: &'static str,
    pub commands: Vec<DrawCmd>,
}

impl DisplayList {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCmd::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Interaction state drawn on top of the base scene.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Overlay {
    pub show_root_handles: bool,
    pub hovered_handle: Option<ResizeHandle>,
    pub active_handle: Option<ResizeHandle>,
}

impl Overlay {
    fn highlights(&self, h: ResizeHandle) -> bool {
        self.active_handle == Some(h)
            || (self.active_handle.is_none() && self.hovered_handle == Some(h))
    }
}

fn screen_rect(vp: &Viewport, x: f64, y: f64, w: f64, h: f64) -> Rect {
    let p0 = vp.world_to_screen(Point::new(x, y));
    let p1 = vp.world_to_screen(Point::new(x + w, y + h));
    Rect::from_points(p0, p1)
}

/// Build the display list for one frame.
pub fn build_display_list(
    doc: &Document,
    viewport: &Viewport,
    style: &StyleOptions,
    theme: &CanvasTheme,
    overlay: &Overlay,
    size: SurfaceSize,
) -> DisplayList {
    let style = style.normalized();
    let mut commands = Vec::with_capacity(doc.nodes.len() * 3 + doc.edges.len() * 2 + 12);

    let paper = screen_rect(viewport, 0.0, 0.0, doc.width, doc.height);
    commands.push(DrawCmd::FillRect {
        rect: paper,
        radius: 0.0,
        color: theme.paper,
    });
    commands.push(DrawCmd::StrokeRect {
        rect: paper,
        radius: 0.0,
        color: theme.paper_border,
        width: 1.0,
    });

    push_edges(&mut commands, doc, viewport, &style, theme);

    for node in &doc.nodes {
        push_node(&mut commands, node, viewport, &style, theme);
    }

    if overlay.show_root_handles
        && let Some(root) = doc.primary_root()
    {
        let b = root.bounds();
        let outline = screen_rect(viewport, b.x, b.y, b.width, b.height)
            .inflate(SELECTION_INSET_PX, SELECTION_INSET_PX);
        commands.push(DrawCmd::StrokeRect {
            rect: outline,
            radius: 0.0,
            color: theme.selection,
            width: 1.0,
        });
        for (handle, rect) in handle_rects(&b, viewport) {
            let fill = if overlay.highlights(handle) {
                theme.handle_active
            } else {
                theme.handle_fill
            };
            commands.push(DrawCmd::FillRect {
                rect,
                radius: 0.0,
                color: fill,
            });
            commands.push(DrawCmd::StrokeRect {
                rect,
                radius: 0.0,
                color: theme.selection,
                width: 1.0,
            });
        }
    }

    log::trace!(
        "display list: {} commands at zoom {}%",
        commands.len(),
        viewport.zoom
    );

    DisplayList {
        size,
        background: theme.background,
        commands,
    }
}

fn push_edges(
    commands: &mut Vec<DrawCmd>,
    doc: &Document,
    vp: &Viewport,
    style: &StyleOptions,
    theme: &CanvasTheme,
) {
    let scale = vp.scale();
    let index = doc.id_index();
    for edge in &doc.edges {
        let endpoints = (index.get(&edge.source), index.get(&edge.target));
        let (Some(&source), Some(&target)) = endpoints else {
            log::warn!(
                "not drawing edge {} -> {}: endpoint is not in the document",
                edge.source,
                edge.target
            );
            continue;
        };
        let (source, target) = (&doc.nodes[source], &doc.nodes[target]);
        let start = vp.world_to_screen(Point::new(
            source.x + source.width / 2.0,
            source.y + source.height,
        ));
        let tip = vp.world_to_screen(Point::new(target.x + target.width / 2.0, target.y));
        let mid_y = (start.y + tip.y) / 2.0;
        let bend = Point::new(tip.x, mid_y);

        let mut points: SmallVec<[Point; 4]> = smallvec![start, Point::new(start.x, mid_y), bend];
        if style.show_arrows {
            let length = style.arrow_length * scale;
            // Stop the line at the arrow's base so the stroke does not poke through the tip.
            let dir = tip - bend;
            let len = dir.hypot();
            let end = if len > length { tip - dir * (length / len) } else { bend };
            points.push(end);
            commands.push(DrawCmd::Polyline {
                points,
                color: theme.edge,
                width: style.line_width * scale,
            });
            commands.push(DrawCmd::Arrow {
                tip,
                from: bend,
                width: style.arrow_width * scale,
                length,
                color: theme.edge,
            });
        } else {
            points.push(tip);
            commands.push(DrawCmd::Polyline {
                points,
                color: theme.edge,
                width: style.line_width * scale,
            });
        }
    }
}

fn push_node(
    commands: &mut Vec<DrawCmd>,
    node: &Node,
    vp: &Viewport,
    style: &StyleOptions,
    theme: &CanvasTheme,
) {
    let scale = vp.scale();
    let (fill, stroke, text_color, radius) = match node.kind {
        NodeKind::Module => (
            theme.module_fill,
            theme.module_stroke,
            theme.module_text,
            MODULE_RADIUS,
        ),
        NodeKind::Leaf => (
            theme.leaf_fill,
            theme.leaf_stroke,
            theme.leaf_text,
            LEAF_RADIUS,
        ),
    };
    let rect = screen_rect(vp, node.x, node.y, node.width, node.height);
    commands.push(DrawCmd::FillRect {
        rect,
        radius: radius * scale,
        color: fill,
    });
    commands.push(DrawCmd::StrokeRect {
        rect,
        radius: radius * scale,
        color: stroke,
        width: style.line_width * scale,
    });

    let max_width = (node.width - label_padding(node.kind) * 2.0).max(style.font_size);
    let lines = wrap_label(&node.label, max_width, style.font_size);
    let line_height = style.font_size * LABEL_LINE_HEIGHT;
    let (cx, cy) = node.bounds().center();
    let top = cy - line_height * lines.len() as f64 / 2.0;
    for (i, line) in lines.into_iter().enumerate() {
        let center = vp.world_to_screen(Point::new(cx, top + line_height * (i as f64 + 0.5)));
        commands.push(DrawCmd::Text {
            text: line,
            center,
            font_px: style.font_size * scale,
            font_family: style.font_family.css(),
            color: text_color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsd_core::config::LayoutOptions;
    use fsd_core::id::NodeId;
    use fsd_core::layout::parse_outline;
    use fsd_core::model::Edge;
    use pretty_assertions::assert_eq;

    fn build(doc: &Document, style: &StyleOptions, overlay: &Overlay) -> DisplayList {
        build_display_list(
            doc,
            &Viewport::default(),
            style,
            &CanvasTheme::light(),
            overlay,
            SurfaceSize::new(800.0, 600.0),
        )
    }

    fn count(list: &DisplayList, pred: impl Fn(&DrawCmd) -> bool) -> usize {
        list.commands.iter().filter(|c| pred(c)).count()
    }

    #[test]
    fn draws_every_node_edge_and_label() {
        let doc = parse_outline("订单系统\n  用户模块\n  订单模块", &LayoutOptions::default());
        let list = build(&doc, &StyleOptions::default(), &Overlay::default());
        assert_eq!(count(&list, |c| matches!(c, DrawCmd::Polyline { .. })), 2);
        assert_eq!(count(&list, |c| matches!(c, DrawCmd::Arrow { .. })), 2);
        // Leaf boxes are narrow, so their labels wrap over several lines.
        let texts: String = list.texts().collect();
        assert_eq!(texts, "订单系统用户模块订单模块");
        assert_eq!(list.texts().next(), Some("订单系统"));
    }

    #[test]
    fn arrows_can_be_hidden() {
        let doc = parse_outline("A\n  B", &LayoutOptions::default());
        let style = StyleOptions {
            show_arrows: false,
            ..StyleOptions::default()
        };
        let list = build(&doc, &style, &Overlay::default());
        assert_eq!(count(&list, |c| matches!(c, DrawCmd::Arrow { .. })), 0);
        let Some(DrawCmd::Polyline { points, .. }) =
            list.commands.iter().find(|c| matches!(c, DrawCmd::Polyline { .. }))
        else {
            panic!("expected an edge");
        };
        let child = &doc.nodes[1];
        assert_eq!(*points.last().unwrap(), Point::new(child.x + child.width / 2.0, child.y));
    }

    #[test]
    fn edges_follow_ids_not_node_order() {
        let mut doc = parse_outline("A\n  B\n  C", &LayoutOptions::default());
        doc.nodes.reverse();
        let style = StyleOptions {
            show_arrows: false,
            ..StyleOptions::default()
        };
        let list = build(&doc, &style, &Overlay::default());
        let root = &doc.nodes[2];
        let ends: Vec<(Point, Point)> = list
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Polyline { points, .. } => Some((points[0], points[points.len() - 1])),
                _ => None,
            })
            .collect();
        let top_center = |n: &fsd_core::model::Node| Point::new(n.x + n.width / 2.0, n.y);
        let start = Point::new(root.x + root.width / 2.0, root.y + root.height);
        assert_eq!(
            ends,
            vec![(start, top_center(&doc.nodes[1])), (start, top_center(&doc.nodes[0]))]
        );
    }

    #[test]
    fn dangling_edges_are_skipped() {
        let mut doc = parse_outline("A", &LayoutOptions::default());
        doc.edges.push(Edge::new(doc.nodes[0].id, NodeId::intern("nowhere")));
        let list = build(&doc, &StyleOptions::default(), &Overlay::default());
        assert_eq!(count(&list, |c| matches!(c, DrawCmd::Polyline { .. })), 0);
    }

    #[test]
    fn root_handles_highlight_active_handle() {
        let doc = parse_outline("A\n  B", &LayoutOptions::default());
        let overlay = Overlay {
            show_root_handles: true,
            hovered_handle: Some(ResizeHandle::Left),
            active_handle: None,
        };
        let list = build(&doc, &StyleOptions::default(), &overlay);
        let theme = CanvasTheme::light();
        let active_fills = count(&list, |c| {
            matches!(c, DrawCmd::FillRect { color, .. } if *color == theme.handle_active)
        });
        assert_eq!(active_fills, 1);
        let handle_fills = count(&list, |c| {
            matches!(c, DrawCmd::FillRect { color, rect, .. }
                if *color == theme.handle_fill
                    && (rect.width() - crate::hit::HANDLE_SIZE_PX).abs() < 1e-9)
        });
        assert_eq!(handle_fills, 7);
    }

    #[test]
    fn building_does_not_touch_the_document() {
        let doc = parse_outline("A\n  B\n  C", &LayoutOptions::default());
        let before = doc.clone();
        let overlay = Overlay {
            show_root_handles: true,
            ..Overlay::default()
        };
        let _ = build(&doc, &StyleOptions::default(), &overlay);
        assert_eq!(doc, before);
    }

    #[test]
    fn zoom_scales_geometry() {
        let doc = parse_outline("A", &LayoutOptions::default());
        let vp = Viewport::new(200.0, 0.0, 0.0);
        let list = build_display_list(
            &doc,
            &vp,
            &StyleOptions::default(),
            &CanvasTheme::light(),
            &Overlay::default(),
            SurfaceSize::new(800.0, 600.0),
        );
        let node = &doc.nodes[0];
        let has_scaled_rect = list.commands.iter().any(|c| {
            matches!(c, DrawCmd::FillRect { rect, .. }
                if (rect.width() - node.width * 2.0).abs() < 1e-9)
        });
        assert!(has_scaled_rect);
    }
}
