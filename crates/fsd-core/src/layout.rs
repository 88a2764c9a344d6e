//! Top-down tree layout.
//!
//! Sizes every outline item from its label, computes bottom-up subtree
//! widths, then places each node centered over the span its subtree
//! needs. Siblings never overlap: each child owns a span at least as wide
//! as itself, and spans are separated by the sibling gap.

use crate::config::LayoutOptions;
use crate::id::NodeId;
use crate::model::*;
use crate::outline::{Outline, parse_feature_structure_by_indent};
use smallvec::SmallVec;
use std::collections::HashMap;

/// Left edge of the first root subtree.
pub const LAYOUT_ORIGIN_X: f64 = 64.0;
/// Top of the depth-0 row.
pub const LAYOUT_ORIGIN_Y: f64 = 54.0;
/// Rows are never shorter than this.
pub const MIN_ROW_HEIGHT: f64 = 56.0;

pub const ROOT_WIDTH_RANGE: (f64, f64) = (160.0, 460.0);
pub const ROOT_HEIGHT_RANGE: (f64, f64) = (48.0, 96.0);
pub const LEAF_WIDTH_RANGE: (f64, f64) = (44.0, 220.0);
pub const LEAF_HEIGHT_RANGE: (f64, f64) = (84.0, 860.0);

const ROOT_PAD_X: f64 = 24.0;
const ROOT_PAD_Y: f64 = 14.0;
const LEAF_PAD_X: f64 = 10.0;
const LEAF_PAD_Y: f64 = 12.0;
const LEAF_BASE_WIDTH: f64 = 40.0;

// ─── Text metrics ───────────────────────────────────────────────────────

/// Width units of a glyph: ASCII is 1, anything else (CJK, emoji) is 2.
pub fn glyph_units(c: char) -> usize {
    if c.is_ascii() { 1 } else { 2 }
}

pub fn text_units(text: &str) -> usize {
    text.chars().map(glyph_units).sum()
}

/// Estimated rendered width of `text` in pixels: one unit is half an em.
pub fn estimate_text_width(text: &str, font_size: f64) -> f64 {
    text_units(text) as f64 * font_size * 0.5
}

/// Horizontal text padding inside a node of the given kind.
pub fn label_padding(kind: NodeKind) -> f64 {
    match kind {
        NodeKind::Module => ROOT_PAD_X,
        NodeKind::Leaf => LEAF_PAD_X,
    }
}

/// Greedy glyph wrap of `text` into lines no wider than `max_width`.
/// Every line holds at least one glyph.
pub fn wrap_label(text: &str, max_width: f64, font_size: f64) -> Vec<String> {
    let unit = font_size * 0.5;
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0;

    for c in text.chars() {
        let w = glyph_units(c) as f64 * unit;
        if !current.is_empty() && current_width + w > max_width {
            lines.push(std::mem::take(&mut current).trim_end().to_string());
            current_width = 0.0;
            if c == ' ' {
                continue;
            }
        }
        current.push(c);
        current_width += w;
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Box size for a label at `level`.
pub fn measure_node(label: &str, level: usize, opts: &LayoutOptions) -> (f64, f64) {
    let text_width = estimate_text_width(label, opts.font_size);
    let line_height = opts.line_height_px();

    if level == 0 {
        let width = (text_width + ROOT_PAD_X * 2.0).clamp(ROOT_WIDTH_RANGE.0, ROOT_WIDTH_RANGE.1);
        let lines = wrap_label(label, width - ROOT_PAD_X * 2.0, opts.font_size)
            .len()
            .max(1);
        let height = (lines as f64 * line_height + ROOT_PAD_Y * 2.0)
            .clamp(ROOT_HEIGHT_RANGE.0, ROOT_HEIGHT_RANGE.1);
        return (width, height);
    }

    let width = if opts.single_char_per_line {
        (opts.font_size + LEAF_PAD_X * 2.0).clamp(LEAF_WIDTH_RANGE.0, LEAF_WIDTH_RANGE.1)
    } else {
        (LEAF_BASE_WIDTH + text_width * 0.5).clamp(LEAF_WIDTH_RANGE.0, LEAF_WIDTH_RANGE.1)
    };
    let lines = if opts.single_char_per_line {
        label.chars().filter(|c| !c.is_whitespace()).count()
    } else {
        wrap_label(label, width - LEAF_PAD_X * 2.0, opts.font_size).len()
    }
    .max(1);
    let height = (lines as f64 * line_height + LEAF_PAD_Y * 2.0)
        .clamp(LEAF_HEIGHT_RANGE.0, LEAF_HEIGHT_RANGE.1);
    (width, height)
}

// ─── Layout ─────────────────────────────────────────────────────────────

/// Parse outline text and lay it out in one step.
pub fn parse_outline(text: &str, opts: &LayoutOptions) -> Document {
    build_feature_structure_top_down_layout(&parse_feature_structure_by_indent(text), opts)
}

struct Tree<'a> {
    sizes: HashMap<NodeId, (f64, f64)>,
    children: HashMap<NodeId, SmallVec<[NodeId; 4]>>,
    depth: HashMap<NodeId, usize>,
    gap: f64,
    subtree: HashMap<NodeId, f64>,
    positions: HashMap<NodeId, (f64, f64)>,
    level_y: &'a [f64],
}

impl Tree<'_> {
    fn children(&self, id: NodeId) -> SmallVec<[NodeId; 4]> {
        self.children.get(&id).cloned().unwrap_or_default()
    }

    fn width_of(&self, id: NodeId) -> f64 {
        self.subtree.get(&id).copied().unwrap_or(0.0)
    }

    /// `max(own, sum(children) + gap * (n - 1))` for `root` and everything
    /// under it, memoized. Post-order over an explicit stack so chain depth
    /// is bounded by the heap, not the call stack.
    fn subtree_width(&mut self, root: NodeId) -> f64 {
        let mut stack = vec![(root, false)];
        while let Some((id, expanded)) = stack.pop() {
            if self.subtree.contains_key(&id) {
                continue;
            }
            let kids = self.children(id);
            if !expanded {
                stack.push((id, true));
                stack.extend(kids.iter().rev().map(|&k| (k, false)));
                continue;
            }
            let own = self.sizes.get(&id).map(|s| s.0).unwrap_or(0.0);
            let width = if kids.is_empty() {
                own
            } else {
                let sum: f64 = kids.iter().map(|&k| self.width_of(k)).sum();
                own.max(sum + self.gap * (kids.len() - 1) as f64)
            };
            self.subtree.insert(id, width);
        }
        self.width_of(root)
    }

    /// Center each node in `[left, left + subtree_width)` and lay its
    /// children out beneath, starting from `root`.
    fn place(&mut self, root: NodeId, left: f64) {
        self.subtree_width(root);
        let mut stack = vec![(root, left)];
        while let Some((id, left)) = stack.pop() {
            let span = self.width_of(id);
            let (w, _) = self.sizes.get(&id).copied().unwrap_or_default();
            let depth = self.depth.get(&id).copied().unwrap_or(0);
            let y = self.level_y.get(depth).copied().unwrap_or(LAYOUT_ORIGIN_Y);
            self.positions.insert(id, (left + (span - w) / 2.0, y));

            let kids = self.children(id);
            if kids.is_empty() {
                continue;
            }
            let total: f64 = kids.iter().map(|&k| self.width_of(k)).sum::<f64>()
                + self.gap * (kids.len() - 1) as f64;
            let mut cursor = left + (span - total) / 2.0;
            let mut lefts: SmallVec<[(NodeId, f64); 4]> = SmallVec::with_capacity(kids.len());
            for k in kids {
                lefts.push((k, cursor));
                cursor += self.width_of(k) + self.gap;
            }
            stack.extend(lefts.into_iter().rev());
        }
    }
}

/// Lay an outline out top-down. Total: an empty outline falls back to the
/// placeholder outline.
pub fn build_feature_structure_top_down_layout(
    outline: &Outline,
    options: &LayoutOptions,
) -> Document {
    if outline.is_empty() {
        return build_feature_structure_top_down_layout(
            &parse_feature_structure_by_indent(""),
            options,
        );
    }
    let opts = options.normalized();

    let sizes: HashMap<NodeId, (f64, f64)> = outline
        .items
        .iter()
        .map(|i| (i.id, measure_node(&i.label, i.depth, &opts)))
        .collect();
    let depth: HashMap<NodeId, usize> = outline.items.iter().map(|i| (i.id, i.depth)).collect();

    // Row heights per depth, then stacked row tops.
    let max_depth = outline.items.iter().map(|i| i.depth).max().unwrap_or(0);
    let mut row_heights = vec![MIN_ROW_HEIGHT; max_depth + 1];
    for item in &outline.items {
        let h = sizes[&item.id].1;
        row_heights[item.depth] = row_heights[item.depth].max(h);
    }
    let mut level_y = Vec::with_capacity(row_heights.len());
    let mut cursor_y = LAYOUT_ORIGIN_Y;
    for h in &row_heights {
        level_y.push(cursor_y);
        cursor_y += h + opts.node_gap_y;
    }

    let mut tree = Tree {
        sizes,
        children: outline.children_map(),
        depth,
        gap: opts.effective_gap_x(),
        subtree: HashMap::new(),
        positions: HashMap::new(),
        level_y: &level_y,
    };

    let roots: Vec<NodeId> = outline.roots().map(|i| i.id).collect();
    let mut cursor_x = LAYOUT_ORIGIN_X;
    let mut roots_width = 0.0;
    for (n, &root) in roots.iter().enumerate() {
        let span = tree.subtree_width(root);
        tree.place(root, cursor_x);
        cursor_x += span + tree.gap;
        roots_width += span + if n > 0 { tree.gap } else { 0.0 };
    }

    let nodes: Vec<Node> = outline
        .items
        .iter()
        .map(|item| {
            let (width, height) = tree.sizes[&item.id];
            let (x, y) = tree
                .positions
                .get(&item.id)
                .copied()
                .unwrap_or((LAYOUT_ORIGIN_X, LAYOUT_ORIGIN_Y));
            Node {
                id: item.id,
                label: item.label.clone(),
                kind: NodeKind::for_level(item.depth),
                x,
                y,
                width,
                height,
                level: item.depth,
            }
        })
        .collect();
    let edges: Vec<Edge> = outline
        .items
        .iter()
        .filter_map(|item| item.parent.map(|p| Edge::new(p, item.id)))
        .collect();

    let right = nodes.iter().map(|n| n.x + n.width).fold(0.0, f64::max);
    let bottom = nodes.iter().map(|n| n.y + n.height).fold(0.0, f64::max);
    let width = MIN_DOCUMENT_WIDTH
        .max(right + DOCUMENT_PAD_RIGHT)
        .max(roots_width + 120.0);
    let height = MIN_DOCUMENT_HEIGHT.max(bottom + DOCUMENT_PAD_BOTTOM);

    log::debug!(
        "top-down layout: {} nodes, {} edges, {}x{}",
        nodes.len(),
        edges.len(),
        width,
        height
    );

    Document {
        nodes,
        edges,
        width,
        height,
        generated_at: now_millis(),
    }
}
