//! Arc type for the multitext graph.

use serde::{Deserialize, Serialize};
use super::vertex::VertexId;

/// Arc in the multitext DAG.
///
/// Represents a directed connection from parent to child.
/// Implements `Ord` for deterministic ordering: (parent, child).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// Parent vertex (source).
    pub parent: VertexId,
    /// Child vertex (target).
    pub child: VertexId,
}

impl Edge {
    /// Create a new arc.
    pub fn new(parent: VertexId, child: VertexId) -> Self {
        Self { parent, child }
    }

    /// Same arc with both endpoints shifted by `offset`.
    pub(crate) fn shifted(&self, offset: usize) -> Self {
        Self {
            parent: VertexId::new(self.parent.index() + offset),
            child: VertexId::new(self.child.index() + offset),
        }
    }
}

// Canonical ordering: parent, then child
impl PartialOrd for Edge {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Edge {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.parent
            .cmp(&other.parent)
            .then_with(|| self.child.cmp(&other.child))
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.parent, self.child)
    }
}
