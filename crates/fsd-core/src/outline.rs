//! Indented-text outline parsing.
//!
//! Turns lines like
//!
//! ```text
//! 订单系统
//!   用户模块
//!     - 登录
//! ```
//!
//! into a flat, depth-annotated `Outline`. Leading spaces count as one
//! indent column, tabs as four. The indent unit is auto-detected, list
//! markers are stripped, and depth jumps are clamped so every line hangs
//! off an existing ancestor.

use crate::id::NodeId;
use smallvec::SmallVec;
use std::collections::HashMap;
use winnow::combinator::alt;
use winnow::prelude::*;
use winnow::token::{one_of, take_while};

/// Substituted when the input contains no non-blank line.
pub const PLACEHOLDER_OUTLINE: &str = "系统功能结构\n  功能模块一\n  功能模块二";

/// Indent columns contributed by a tab.
pub const TAB_WIDTH: usize = 4;

/// Indent unit assumed when no line is indented.
pub const DEFAULT_INDENT_UNIT: usize = 2;

/// One outline line after depth resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineItem {
    pub id: NodeId,
    pub label: String,
    pub depth: usize,
    pub parent: Option<NodeId>,
}

/// A flat, pre-order list of outline items.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Outline {
    pub items: Vec<OutlineItem>,
    pub indent_unit: usize,
}

impl Outline {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Items without a parent, in outline order.
    pub fn roots(&self) -> impl Iterator<Item = &OutlineItem> {
        self.items.iter().filter(|i| i.parent.is_none())
    }

    /// Parent id → child ids, in outline order.
    pub fn children_map(&self) -> HashMap<NodeId, SmallVec<[NodeId; 4]>> {
        let mut map: HashMap<NodeId, SmallVec<[NodeId; 4]>> = HashMap::new();
        for item in &self.items {
            if let Some(parent) = item.parent {
                map.entry(parent).or_default().push(item.id);
            }
        }
        map
    }
}

/// Incremental outline construction with depth clamping.
///
/// Holds the most recent id seen at each open depth. A pushed item can be at
/// most one level deeper than the deepest open ancestor; anything deeper is
/// clamped down.
#[derive(Debug, Default)]
pub struct OutlineBuilder {
    items: Vec<OutlineItem>,
    stack: Vec<NodeId>,
}

impl OutlineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item at `requested_depth`; returns the depth actually used.
    pub fn push(&mut self, id: NodeId, label: String, requested_depth: usize) -> usize {
        let mut depth = requested_depth.min(self.stack.len());
        let parent = depth.checked_sub(1).and_then(|d| self.stack.get(d).copied());
        if parent.is_none() {
            depth = 0;
        }
        self.stack.truncate(depth);
        self.stack.push(id);
        self.items.push(OutlineItem {
            id,
            label,
            depth,
            parent,
        });
        depth
    }

    pub fn finish(self, indent_unit: usize) -> Outline {
        Outline {
            items: self.items,
            indent_unit,
        }
    }
}

/// Parse indented text into an outline. Total: blank input yields the
/// placeholder outline.
pub fn parse_feature_structure_by_indent(text: &str) -> Outline {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return parse_feature_structure_by_indent(PLACEHOLDER_OUTLINE);
    }

    let indents: Vec<usize> = lines.iter().map(|l| measure_indent(l).columns).collect();
    let unit = detect_indent_unit(&indents);

    let mut builder = OutlineBuilder::new();
    for (ordinal, (line, indent)) in lines.iter().zip(&indents).enumerate() {
        let label = normalize_label(line);
        builder.push(NodeId::for_line(ordinal + 1), label, indent / unit);
    }
    let outline = builder.finish(unit);
    log::debug!(
        "parsed outline: {} items, indent unit {}",
        outline.len(),
        outline.indent_unit
    );
    outline
}

// ─── Indentation ────────────────────────────────────────────────────────

/// Leading whitespace of one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndentMeasure {
    /// Spaces count 1, tabs count `TAB_WIDTH`.
    pub columns: usize,
    pub has_tab: bool,
    pub has_space: bool,
}

pub fn measure_indent(line: &str) -> IndentMeasure {
    let mut m = IndentMeasure::default();
    for c in line.chars() {
        match c {
            ' ' => {
                m.columns += 1;
                m.has_space = true;
            }
            '\t' => {
                m.columns += TAB_WIDTH;
                m.has_tab = true;
            }
            _ => break,
        }
    }
    m
}

/// Pick the indent unit from the observed indents (in columns).
///
/// 4 if every nonzero indent is a multiple of 4, else 2 if every one is even,
/// else the smallest nonzero indent. `DEFAULT_INDENT_UNIT` when nothing is
/// indented.
pub fn detect_indent_unit(indents: &[usize]) -> usize {
    let nonzero: SmallVec<[usize; 16]> = indents.iter().copied().filter(|&i| i > 0).collect();
    if nonzero.is_empty() {
        return DEFAULT_INDENT_UNIT;
    }
    if nonzero.iter().all(|i| i % 4 == 0) {
        4
    } else if nonzero.iter().all(|i| i % 2 == 0) {
        2
    } else {
        nonzero.iter().copied().min().unwrap_or(DEFAULT_INDENT_UNIT)
    }
}

// ─── Labels ─────────────────────────────────────────────────────────────

/// Trim, drop a leading list marker, and collapse internal whitespace.
pub fn normalize_label(line: &str) -> String {
    strip_list_marker(line.trim())
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Bullet,
    Ordinal,
}

/// Remove a leading `-`, `*`, `+`, `•`, `1.`, `2)`, `三、`, `(4)` style marker.
///
/// Bullets strip whether or not whitespace follows (`-登录` is common in CJK
/// outlines); ordinals must not be followed by another digit (so `1.5 版本`
/// stays intact). A marker with nothing after it is kept as the label.
pub fn strip_list_marker(label: &str) -> &str {
    let mut rest = label;
    let Ok(marker) = list_marker.parse_next(&mut rest) else {
        return label;
    };
    let boundary =
        marker == Marker::Bullet || !rest.starts_with(|c: char| c.is_ascii_digit());
    let stripped = rest.trim_start();
    if boundary && !stripped.is_empty() {
        stripped
    } else {
        label
    }
}

fn list_marker(input: &mut &str) -> ModalResult<Marker> {
    alt((
        one_of(['-', '*', '+', '•', '·']).value(Marker::Bullet),
        (numeral, one_of(['.', ')', '、', '．', '）'])).value(Marker::Ordinal),
        (one_of(['(', '（']), numeral, one_of([')', '）'])).value(Marker::Ordinal),
    ))
    .parse_next(input)
}

fn numeral<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_while(1.., |c: char| c.is_ascii_digit() || is_cjk_numeral(c)).parse_next(input)
}

fn is_cjk_numeral(c: char) -> bool {
    matches!(
        c,
        '零' | '〇' | '一' | '二' | '三' | '四' | '五' | '六' | '七' | '八' | '九' | '十' | '百'
    )
}
