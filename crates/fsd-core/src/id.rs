//! Node identifiers.
//!
//! Ids are strings on the wire (`"node-3"`) and interned handles in memory,
//! so documents compare and hash cheaply and survive a JSON round trip.

use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Process-wide id table.
static NODE_IDS: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Prefix of ids assigned by the outline parser.
pub const LINE_ID_PREFIX: &str = "node-";

/// Interned identifier of a diagram node.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Spur);

impl NodeId {
    pub fn intern(s: &str) -> Self {
        NodeId(NODE_IDS.get_or_intern(s))
    }

    pub fn as_str(&self) -> &str {
        NODE_IDS.resolve(&self.0)
    }

    /// Id of the `ordinal`-th outline line (1-based). Parsing the same text
    /// twice therefore yields equal documents.
    pub fn for_line(ordinal: usize) -> Self {
        Self::intern(&format!("{LINE_ID_PREFIX}{ordinal}"))
    }

    /// The line ordinal for parser-assigned ids, `None` for host-chosen ones.
    pub fn line_ordinal(&self) -> Option<usize> {
        self.as_str().strip_prefix(LINE_ID_PREFIX)?.parse().ok()
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        Ok(NodeId::intern(&s))
    }
}
