//! Re-derive a clean layout from a manually edited document.
//!
//! The document's edges are loaded into a `petgraph` digraph, siblings are
//! ordered by their current position, and a depth-first walk flattens the
//! forest back into an `Outline`, which then goes through the regular
//! top-down layout. Node ids survive the round trip.

use crate::config::RebalanceOptions;
use crate::id::NodeId;
use crate::layout::build_feature_structure_top_down_layout;
use crate::model::{Document, Node};
use crate::outline::{DEFAULT_INDENT_UNIT, Outline, OutlineBuilder};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Re-layout `doc` from its topology. Node geometry is recomputed; ids and
/// labels are kept.
#[must_use]
pub fn rebalance_feature_structure_document(
    doc: &Document,
    options: &RebalanceOptions,
) -> Document {
    let outline = document_to_outline(doc, options.sort_by_position);
    let rebalanced = build_feature_structure_top_down_layout(&outline, &options.layout);
    log::debug!(
        "rebalanced document: {} nodes in, {} nodes out",
        doc.nodes.len(),
        rebalanced.nodes.len()
    );
    rebalanced
}

fn by_position(a: &Node, b: &Node) -> Ordering {
    a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y))
}

/// Flatten a document into the outline the text parser would have produced.
///
/// Roots (no incoming edge) are visited left to right. Children follow edge
/// order, or current x/y order when `sort_by_position` is set. Nodes the walk
/// never reaches (cycles) are appended at the end, grouped by level.
pub fn document_to_outline(doc: &Document, sort_by_position: bool) -> Outline {
    let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(doc.nodes.len(), doc.edges.len());
    let mut index: HashMap<NodeId, NodeIndex> = HashMap::with_capacity(doc.nodes.len());
    for (i, node) in doc.nodes.iter().enumerate() {
        index.entry(node.id).or_insert_with(|| graph.add_node(i));
    }

    for edge in &doc.edges {
        match (index.get(&edge.source), index.get(&edge.target)) {
            (Some(&s), Some(&t)) if s != t => {
                graph.update_edge(s, t, ());
            }
            (Some(_), Some(_)) => {}
            _ => log::warn!(
                "skipping edge {} -> {}: endpoint is not in the document",
                edge.source,
                edge.target
            ),
        }
    }

    let node_at = |ix: NodeIndex| &doc.nodes[graph[ix]];

    let children = |ix: NodeIndex| -> Vec<NodeIndex> {
        let mut out: Vec<_> = graph.edges_directed(ix, Direction::Outgoing).collect();
        out.sort_by_key(|e| e.id());
        let mut kids: Vec<NodeIndex> = out.into_iter().map(|e| e.target()).collect();
        if sort_by_position {
            kids.sort_by(|&a, &b| by_position(node_at(a), node_at(b)));
        }
        kids
    };

    let mut roots: Vec<NodeIndex> = graph
        .node_indices()
        .filter(|&ix| {
            graph
                .neighbors_directed(ix, Direction::Incoming)
                .next()
                .is_none()
        })
        .collect();
    roots.sort_by(|&a, &b| by_position(node_at(a), node_at(b)));

    let mut builder = OutlineBuilder::new();
    let mut visited: HashSet<NodeIndex> = HashSet::with_capacity(graph.node_count());

    // Iterative pre-order walk; children are pushed reversed so the first
    // child pops first.
    for root in roots {
        let mut stack = vec![(root, 0usize)];
        while let Some((ix, depth)) = stack.pop() {
            if !visited.insert(ix) {
                continue;
            }
            let node = node_at(ix);
            builder.push(node.id, node.label.clone(), depth);
            for kid in children(ix).into_iter().rev() {
                if !visited.contains(&kid) {
                    stack.push((kid, depth + 1));
                }
            }
        }
    }

    let mut orphans: Vec<NodeIndex> = graph
        .node_indices()
        .filter(|ix| !visited.contains(ix))
        .collect();
    if !orphans.is_empty() {
        log::debug!("{} unreachable nodes appended after the walk", orphans.len());
    }
    orphans.sort_by(|&a, &b| {
        let (na, nb) = (node_at(a), node_at(b));
        na.level.cmp(&nb.level).then(by_position(na, nb))
    });
    for ix in orphans {
        let node = node_at(ix);
        builder.push(node.id, node.label.clone(), node.level);
    }

    builder.finish(DEFAULT_INDENT_UNIT)
}

/// Render an outline back to indented text, two spaces per level.
pub fn outline_text(outline: &Outline) -> String {
    outline
        .items
        .iter()
        .map(|item| format!("{}{}", "  ".repeat(item.depth), item.label))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutOptions;
    use crate::layout::parse_outline;
    use crate::model::Edge;
    use pretty_assertions::assert_eq;

    fn labels_and_depths(doc: &Document) -> Vec<(String, usize)> {
        doc.nodes.iter().map(|n| (n.label.clone(), n.level)).collect()
    }

    #[test]
    fn siblings_follow_current_x_order() {
        let mut doc = parse_outline("R\n  A\n  B\n  C", &LayoutOptions::default());
        // Drag C to the far left.
        doc.nodes[3].x = 0.0;
        let out = rebalance_feature_structure_document(&doc, &RebalanceOptions::default());
        assert_eq!(
            labels_and_depths(&out),
            vec![
                ("R".into(), 0),
                ("C".into(), 1),
                ("A".into(), 1),
                ("B".into(), 1)
            ]
        );
    }

    #[test]
    fn edge_order_is_kept_when_sorting_is_disabled() {
        let mut doc = parse_outline("R\n  A\n  B", &LayoutOptions::default());
        doc.nodes[2].x = 0.0;
        let opts = RebalanceOptions {
            sort_by_position: false,
            ..RebalanceOptions::default()
        };
        let out = rebalance_feature_structure_document(&doc, &opts);
        assert_eq!(out.nodes[1].label, "A");
    }

    #[test]
    fn ids_survive_rebalance() {
        let doc = parse_outline("R\n  A", &LayoutOptions::default());
        let out = rebalance_feature_structure_document(&doc, &RebalanceOptions::default());
        assert_eq!(out.nodes[1].id, doc.nodes[1].id);
        assert_eq!(out.edges, doc.edges);
    }

    #[test]
    fn cycle_members_are_not_dropped() {
        let mut doc = parse_outline("R\n  A\nX\n  Y", &LayoutOptions::default());
        let (x, y) = (doc.nodes[2].id, doc.nodes[3].id);
        // Y -> X closes a cycle, so neither has in-degree 0.
        doc.edges.push(Edge::new(y, x));
        let out = rebalance_feature_structure_document(&doc, &RebalanceOptions::default());
        assert_eq!(out.nodes.len(), 4);
        let labels: Vec<&str> = out.nodes.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(&labels[..2], &["R", "A"]);
    }

    #[test]
    fn dangling_edges_are_ignored() {
        let mut doc = parse_outline("R\n  A", &LayoutOptions::default());
        doc.edges.push(Edge::new(doc.nodes[0].id, NodeId::intern("missing")));
        let out = rebalance_feature_structure_document(&doc, &RebalanceOptions::default());
        assert_eq!(out.edges.len(), 1);
    }

    #[test]
    fn outline_text_round_trips() {
        let text = "R\n  A\n    A1\n  B";
        let doc = parse_outline(text, &LayoutOptions::default());
        assert_eq!(outline_text(&document_to_outline(&doc, true)), text);
    }
}
