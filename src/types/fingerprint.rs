//! Ancestral fingerprints.

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh64::Xxh64;

use super::vertex::Component;

/// Hash of a vertex's full realized history.
///
/// Computed over the concatenated components of the vertex's ancestry
/// (itself included) sorted by position. Two vertices with equal fingerprints
/// are interchangeable context, even across different graphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AncestralFingerprint(u64);

impl AncestralFingerprint {
    /// Seed shared by every fingerprint computation.
    const SEED: u64 = 0;

    /// Create a fingerprint from a raw hash.
    pub fn new(hash: u64) -> Self {
        Self(hash)
    }

    /// Fold position-sorted components into a fingerprint.
    pub fn from_components<'a, C, I>(components: I) -> Self
    where
        C: Component + 'a,
        I: IntoIterator<Item = &'a C>,
    {
        let mut hasher = Xxh64::new(Self::SEED);
        for component in components {
            component.write_fingerprint(&mut hasher);
        }
        Self(hasher.digest())
    }

    /// Get the raw hash.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for AncestralFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
