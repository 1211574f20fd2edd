//! Vertex types for the multitext graph.

use serde::{Deserialize, Serialize};
use std::fmt;
use xxhash_rust::xxh64::Xxh64;

/// Token identifier produced by a tokenizer.
pub type TokenId = u32;

/// Component of a token-level vertex: the tokens assigned to it.
pub type TokenRun = Vec<TokenId>;

/// Handle of a vertex inside a [`MultiText`](crate::MultiText) arena.
///
/// Vertex identity is the handle, never the component value: two vertices
/// holding identical text are still distinct nodes. Structural copies keep
/// the handles, so a `VertexId` identifies the same logical vertex in the
/// text-level and the token-level graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VertexId(usize);

impl VertexId {
    /// Create a handle from an arena index.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the arena index.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl From<usize> for VertexId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

/// Payload carried by a vertex.
///
/// The fingerprint contract: writing the components of a sequence of vertices
/// one after the other must feed the hasher exactly the bytes of their
/// concatenation, so fingerprints only depend on realized content.
pub trait Component: Clone + Default {
    /// Number of units (characters or tokens) in this component.
    fn unit_len(&self) -> usize;

    /// Append another component of the same kind.
    fn append(&mut self, other: &Self);

    /// Feed this component's content into a fingerprint hasher.
    fn write_fingerprint(&self, hasher: &mut Xxh64);
}

impl Component for String {
    fn unit_len(&self) -> usize {
        self.chars().count()
    }

    fn append(&mut self, other: &Self) {
        self.push_str(other);
    }

    fn write_fingerprint(&self, hasher: &mut Xxh64) {
        hasher.update(self.as_bytes());
    }
}

impl Component for TokenRun {
    fn unit_len(&self) -> usize {
        self.len()
    }

    fn append(&mut self, other: &Self) {
        self.extend_from_slice(other);
    }

    fn write_fingerprint(&self, hasher: &mut Xxh64) {
        for token in self {
            hasher.update(&token.to_le_bytes());
        }
    }
}

/// A node of the multitext DAG.
///
/// Parent and child relations are arena handles owned by the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vertex<C> {
    pub(crate) component: C,
    pub(crate) position: usize,
    pub(crate) parents: Vec<VertexId>,
    pub(crate) children: Vec<VertexId>,
}

impl<C> Vertex<C> {
    pub(crate) fn new(component: C, position: usize) -> Self {
        Self {
            component,
            position,
            parents: Vec::new(),
            children: Vec::new(),
        }
    }

    /// The payload of this vertex.
    pub fn component(&self) -> &C {
        &self.component
    }

    /// Index of the slot this vertex occupies.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Parent handles, in arc insertion order.
    pub fn parents(&self) -> &[VertexId] {
        &self.parents
    }

    /// Child handles, in arc insertion order.
    pub fn children(&self) -> &[VertexId] {
        &self.children
    }

    /// True if this vertex has no parents.
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// True if this vertex has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest<C: Component>(parts: &[C]) -> u64 {
        let mut hasher = Xxh64::new(0);
        for part in parts {
            part.write_fingerprint(&mut hasher);
        }
        hasher.digest()
    }

    #[test]
    fn test_string_fingerprint_ignores_split_point() {
        let a = digest(&["ab".to_string(), "c".to_string()]);
        let b = digest(&["a".to_string(), "bc".to_string()]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_token_run_fingerprint_ignores_split_point() {
        let a = digest::<TokenRun>(&[vec![1, 2], vec![3]]);
        let b = digest::<TokenRun>(&[vec![1], vec![2, 3]]);
        assert_eq!(a, b);
        assert_ne!(a, digest::<TokenRun>(&[vec![1, 2]]));
    }

    #[test]
    fn test_unit_len_counts_chars() {
        assert_eq!("héllo".to_string().unit_len(), 5);
        assert_eq!(vec![1u32, 2, 3].unit_len(), 3);
    }

    #[test]
    fn test_vertex_id_display() {
        assert_eq!(VertexId::new(7).to_string(), "v7");
    }
}
