pub mod config;
pub mod id;
pub mod inspect;
pub mod layout;
pub mod model;
pub mod outline;
pub mod rebalance;

pub use config::{FontFamily, LayoutOptions, RebalanceOptions, StyleOptions};
pub use id::NodeId;
pub use inspect::{IndentIssue, IndentReport, inspect_feature_structure_indent_input};
pub use layout::{build_feature_structure_top_down_layout, measure_node, parse_outline};
pub use model::*;
pub use outline::{Outline, OutlineItem, parse_feature_structure_by_indent};
pub use rebalance::{document_to_outline, outline_text, rebalance_feature_structure_document};
