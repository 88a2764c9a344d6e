//! Document model for feature-structure diagrams.
//!
//! A `Document` is a flat arena of rectangular `Node`s plus the parent→child
//! `Edge`s connecting them. Node order doubles as z-order: later nodes are
//! drawn (and hit) on top of earlier ones.

use crate::id::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Extra room kept to the right of the rightmost node.
pub const DOCUMENT_PAD_RIGHT: f64 = 72.0;
/// Extra room kept below the bottommost node.
pub const DOCUMENT_PAD_BOTTOM: f64 = 92.0;
/// Smallest canvas a document ever reports.
pub const MIN_DOCUMENT_WIDTH: f64 = 920.0;
pub const MIN_DOCUMENT_HEIGHT: f64 = 620.0;

/// Style tag of a node. Depth-0 nodes are modules, everything else is a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Module,
    Leaf,
}

impl NodeKind {
    pub fn for_level(level: usize) -> Self {
        if level == 0 {
            NodeKind::Module
        } else {
            NodeKind::Leaf
        }
    }
}

/// One outline item rendered as a box in world coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub label: String,
    pub kind: NodeKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub level: usize,
}

impl Node {
    pub fn bounds(&self) -> Bounds {
        Bounds {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }

    pub fn set_bounds(&mut self, b: Bounds) {
        self.x = b.x;
        self.y = b.y;
        self.width = b.width;
        self.height = b.height;
    }
}

/// Directed parent → child connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
}

impl Edge {
    pub fn new(source: NodeId, target: NodeId) -> Self {
        Self { source, target }
    }
}

/// Axis-aligned rectangle in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build from edge coordinates.
    pub fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds::from_edges(
            self.x.min(other.x),
            self.y.min(other.y),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    /// Grow on every side by `pad`.
    pub fn inflate(&self, pad: f64) -> Bounds {
        Bounds::from_edges(
            self.x - pad,
            self.y - pad,
            self.right() + pad,
            self.bottom() + pad,
        )
    }
}

/// A complete diagram: nodes, edges, and canvas extents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub width: f64,
    pub height: f64,
    /// Milliseconds since the Unix epoch.
    pub generated_at: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            width: MIN_DOCUMENT_WIDTH,
            height: MIN_DOCUMENT_HEIGHT,
            generated_at: now_millis(),
        }
    }
}

impl Document {
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    /// Id → position in `nodes`. The first node wins when ids repeat,
    /// matching [`Document::node`].
    pub fn id_index(&self) -> HashMap<NodeId, usize> {
        let mut index = HashMap::with_capacity(self.nodes.len());
        for (i, node) in self.nodes.iter().enumerate() {
            index.entry(node.id).or_insert(i);
        }
        index
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Index of the first depth-0 node, the only one allowed to grow the canvas.
    pub fn primary_root_index(&self) -> Option<usize> {
        self.nodes.iter().position(|n| n.level == 0)
    }

    pub fn primary_root(&self) -> Option<&Node> {
        self.primary_root_index().map(|i| &self.nodes[i])
    }

    /// Direct children of `id`, in edge order.
    pub fn children_of(&self, id: NodeId) -> Vec<NodeId> {
        self.edges
            .iter()
            .filter(|e| e.source == id)
            .map(|e| e.target)
            .collect()
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.edges.iter().find(|e| e.target == id).map(|e| e.source)
    }

    /// Edges whose source or target is not a node of this document.
    pub fn dangling_edges(&self) -> impl Iterator<Item = &Edge> {
        let index = self.id_index();
        self.edges
            .iter()
            .filter(move |e| !index.contains_key(&e.source) || !index.contains_key(&e.target))
    }

    /// Union of all node rectangles, or `None` for an empty document.
    pub fn content_bounds(&self) -> Option<Bounds> {
        self.nodes
            .iter()
            .map(Node::bounds)
            .reduce(|acc, b| acc.union(&b))
    }

    /// Grow the canvas extents so the node at `index` fits with the usual padding.
    /// Never shrinks.
    pub fn ensure_contains(&mut self, index: usize) {
        let Some(node) = self.nodes.get(index) else {
            return;
        };
        let b = node.bounds();
        self.width = self.width.max(b.right() + DOCUMENT_PAD_RIGHT);
        self.height = self.height.max(b.bottom() + DOCUMENT_PAD_BOTTOM);
    }

    /// Refresh `generated_at`.
    pub fn touch(&mut self) {
        self.generated_at = now_millis();
    }
}

/// Wall-clock milliseconds since the Unix epoch.
#[cfg(target_arch = "wasm32")]
pub fn now_millis() -> u64 {
    js_sys::Date::now().max(0.0) as u64
}

/// Wall-clock milliseconds since the Unix epoch.
#[cfg(not(target_arch = "wasm32"))]
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
