//! Integration tests: outline text → layout → rebalance.
//!
//! Exercises the full `fsd-core` pipeline against the structural guarantees
//! the canvas relies on.

use fsd_core::*;
use pretty_assertions::assert_eq;
use std::collections::HashMap;

const ORDER_SYSTEM: &str = "订单系统\n  用户模块\n    登录\n    注册\n  订单模块\n    下单\n    支付\n";

const WIDE_TREE: &str = "\
平台
  - 账户中心
    1. 个人资料
    2. 安全设置
    3. 第三方绑定
  - 内容管理
    * 文章
    * 视频
      (1) 上传
      (2) 转码
  - 数据报表
";

fn label_of(doc: &Document, id: NodeId) -> String {
    doc.node(id).map(|n| n.label.clone()).unwrap_or_default()
}

/// (parent label, child label) pairs in edge order.
fn relations(doc: &Document) -> Vec<(String, String)> {
    doc.edges
        .iter()
        .map(|e| (label_of(doc, e.source), label_of(doc, e.target)))
        .collect()
}

fn depth_order(doc: &Document) -> Vec<(String, usize)> {
    doc.nodes.iter().map(|n| (n.label.clone(), n.level)).collect()
}

// ─── Example scenario ───────────────────────────────────────────────────

#[test]
fn order_system_example() {
    let doc = parse_outline(ORDER_SYSTEM, &LayoutOptions::default());

    assert_eq!(doc.nodes.len(), 7);
    assert_eq!(doc.edges.len(), 6);

    let roots: Vec<&Node> = doc.nodes.iter().filter(|n| n.level == 0).collect();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].label, "订单系统");
    assert_eq!(roots[0].kind, NodeKind::Module);

    let level1: Vec<&str> = doc
        .nodes
        .iter()
        .filter(|n| n.level == 1)
        .map(|n| n.label.as_str())
        .collect();
    assert_eq!(level1, vec!["用户模块", "订单模块"]);

    assert_eq!(
        relations(&doc),
        vec![
            ("订单系统".to_string(), "用户模块".to_string()),
            ("用户模块".to_string(), "登录".to_string()),
            ("用户模块".to_string(), "注册".to_string()),
            ("订单系统".to_string(), "订单模块".to_string()),
            ("订单模块".to_string(), "下单".to_string()),
            ("订单模块".to_string(), "支付".to_string()),
        ]
    );

    // Each module sits above both of its children, which sit side by side.
    let by_label: HashMap<&str, &Node> = doc.nodes.iter().map(|n| (n.label.as_str(), n)).collect();
    for (parent, kids) in [("用户模块", ["登录", "注册"]), ("订单模块", ["下单", "支付"])] {
        let p = by_label[parent];
        let (l, r) = (by_label[kids[0]], by_label[kids[1]]);
        assert!(l.x + l.width <= r.x, "{} overlaps {}", kids[0], kids[1]);
        let center = p.x + p.width / 2.0;
        assert!(l.x < center && center < r.x + r.width);
    }
    // Module subtrees do not collide either.
    let (user, order) = (by_label["注册"], by_label["下单"]);
    assert!(user.x + user.width <= order.x);
}

// ─── No-overlap invariant ───────────────────────────────────────────────

#[test]
fn nodes_on_the_same_row_never_overlap() {
    for avoid_crossing in [true, false] {
        let opts = LayoutOptions {
            avoid_crossing,
            ..LayoutOptions::default()
        };
        let doc = parse_outline(WIDE_TREE, &opts);
        let mut rows: HashMap<usize, Vec<&Node>> = HashMap::new();
        for node in &doc.nodes {
            rows.entry(node.level).or_default().push(node);
        }
        for row in rows.values_mut() {
            row.sort_by(|a, b| a.x.total_cmp(&b.x));
            for pair in row.windows(2) {
                let gap = pair[1].x - (pair[0].x + pair[0].width);
                assert!(
                    gap >= opts.effective_gap_x() - 1e-6,
                    "{} and {} are only {gap} apart",
                    pair[0].label,
                    pair[1].label
                );
            }
        }
    }
}

#[test]
fn nodes_stay_inside_document_extents() {
    let doc = parse_outline(WIDE_TREE, &LayoutOptions::default());
    for n in &doc.nodes {
        assert!(n.x >= 16.0 && n.y >= 16.0);
        assert!(n.x + n.width <= doc.width);
        assert!(n.y + n.height <= doc.height);
    }
}

// ─── Depth clamp ────────────────────────────────────────────────────────

#[test]
fn deep_indent_under_root_becomes_direct_child() {
    for text in ["A\n    B", "A\n    B\n  C"] {
        let doc = parse_outline(text, &LayoutOptions::default());
        assert_eq!(doc.nodes[1].level, 1, "input {text:?}");
        assert_eq!(relations(&doc)[0], ("A".to_string(), "B".to_string()));
    }
}

// ─── Rebalance ──────────────────────────────────────────────────────────

#[test]
fn rebalance_without_edits_preserves_structure() {
    for text in [ORDER_SYSTEM, WIDE_TREE, "A\nB\n  C\nD"] {
        let doc = parse_outline(text, &LayoutOptions::default());
        let out = rebalance_feature_structure_document(&doc, &RebalanceOptions::default());
        assert_eq!(relations(&out), relations(&doc));
        assert_eq!(depth_order(&out), depth_order(&doc));
    }
}

#[test]
fn rebalance_is_idempotent() {
    let mut doc = parse_outline(WIDE_TREE, &LayoutOptions::default());
    // Scramble some positions as a user would by dragging.
    for (i, node) in doc.nodes.iter_mut().enumerate() {
        node.x = ((i * 7919) % 613) as f64;
        node.y = ((i * 104_729) % 411) as f64;
    }
    let opts = RebalanceOptions::default();
    let once = rebalance_feature_structure_document(&doc, &opts);
    let twice = rebalance_feature_structure_document(&once, &opts);
    assert_eq!(depth_order(&twice), depth_order(&once));
    assert_eq!(relations(&twice), relations(&once));
    let geometry = |d: &Document| -> Vec<(f64, f64, f64, f64)> {
        d.nodes.iter().map(|n| (n.x, n.y, n.width, n.height)).collect()
    };
    assert_eq!(geometry(&twice), geometry(&once));
}

#[test]
fn rebalance_keeps_every_edge_a_parent_child_link() {
    let doc = parse_outline(WIDE_TREE, &LayoutOptions::default());
    let out = rebalance_feature_structure_document(&doc, &RebalanceOptions::default());
    assert_eq!(out.dangling_edges().count(), 0);
    for edge in &out.edges {
        let (s, t) = (out.node(edge.source).unwrap(), out.node(edge.target).unwrap());
        assert_eq!(s.level + 1, t.level);
    }
}

#[test]
fn rebalance_survives_very_deep_chains() {
    const DEPTH: usize = 20_000;
    let nodes: Vec<Node> = (0..DEPTH)
        .map(|i| Node {
            id: NodeId::intern(&format!("chain-{i}")),
            label: format!("step {i}"),
            kind: NodeKind::for_level(i),
            x: 0.0,
            y: 0.0,
            width: 60.0,
            height: 90.0,
            level: i,
        })
        .collect();
    let edges: Vec<Edge> = nodes.windows(2).map(|w| Edge::new(w[0].id, w[1].id)).collect();
    let doc = Document {
        nodes,
        edges,
        ..Document::default()
    };

    let out = rebalance_feature_structure_document(&doc, &RebalanceOptions::default());

    assert_eq!(out.nodes.len(), DEPTH);
    assert_eq!(out.edges.len(), DEPTH - 1);
    assert!(out.nodes.iter().enumerate().all(|(i, n)| n.level == i));
    assert!(out.nodes.windows(2).all(|w| w[0].y < w[1].y));
    let last = &out.nodes[DEPTH - 1];
    assert!(last.y + last.height <= out.height);
}

// ─── Inspection ─────────────────────────────────────────────────────────

#[test]
fn inspection_does_not_change_layout() {
    let text = "  A\n      B\n\t C";
    let report = inspect_feature_structure_indent_input(text);
    assert!(!report.is_clean());
    let doc = parse_outline(text, &LayoutOptions::default());
    assert_eq!(doc.nodes.len(), 3);
    assert_eq!(doc.nodes[0].level, 0);
}
