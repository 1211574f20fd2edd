//! Core types for the multitext kernel.

pub mod vertex;
pub mod edge;
pub mod slot;
pub mod fingerprint;

pub use vertex::{Component, TokenId, TokenRun, Vertex, VertexId};
pub use edge::Edge;
pub use slot::{parse_slots, Slot};
pub use fingerprint::AncestralFingerprint;
