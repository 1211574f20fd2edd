//! # multitext-kernel
//!
//! Many text variants in one decoder pass.
//!
//! A multitext is a DAG of text fragments. Every root-to-leaf path spells one
//! complete variant; fragments shared by several variants are stored once.
//! The kernel answers one question:
//!
//! > Given alternatives for parts of a prompt, which tokens may each token
//! > **attend to** so that every variant is evaluated exactly as if it were
//! > alone?
//!
//! ## Core Contract
//!
//! 1. Lay out ordered slots (literals or sets of alternatives) as a DAG
//! 2. Tokenize every variant and merge the results per fragment
//! 3. Flatten into token ids, position ids, an attention mask and provenance
//!
//! ## Architecture
//!
//! ```text
//! Slots → build_multitext → MultiText<String> → TokenMerger → MultiText<TokenRun>
//!                                                                  ↓
//!                                        ModelInputs ← prepare_inputs
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Same slots + same config + same tokenizer → identical `ModelInputs::digest()`
//! - Edge ordering is canonical (parent, child)
//! - Vertices are identified by arena index, assigned in construction order

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod multitext;
pub mod builder;
pub mod tokenizer;
pub mod merge;
pub mod assembler;
pub mod canonical;
pub mod config;
pub mod pipeline;

// Re-exports
pub use types::{parse_slots, AncestralFingerprint, Component, Edge, Slot, TokenId, TokenRun, Vertex, VertexId};
pub use multitext::{GraphError, LeafAncestries, MultiText};
pub use builder::{build_multitext, build_multitext_from_json, BuildError, BuildMode};
pub use tokenizer::{Encoding, GreedyTokenizer, Tokenizer};
pub use merge::{tokenize_multitext, MergeError, MergeReport, TokenMerger};
pub use assembler::{prepare_inputs, ModelInputs, PositioningMethod, TokenProvenance};
pub use canonical::{canonical_hash, canonical_hash_hex, to_canonical_bytes};
pub use config::PipelineConfig;
pub use pipeline::{MultiTextPipeline, PipelineError};

/// Schema version of serialized configs and model inputs.
/// Increment on breaking changes to any serialized type.
pub const MULTITEXT_SCHEMA_VERSION: &str = "multitext_v1";
