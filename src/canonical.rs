//! Canonical hashing of serializable values.
//!
//! Pipeline parameters and assembled model inputs are hashed over their
//! compact JSON encoding, streamed straight into an xxh64 state.
//!
//! ## Determinism Guarantees
//!
//! - Struct fields encode in declaration order
//! - Sequences encode in index order
//! - Hashed data keeps maps in `BTreeMap`, never `HashMap`

use std::io;

use serde::Serialize;
use xxhash_rust::xxh64::Xxh64;

/// Seed of every canonical hash.
pub const CANONICAL_SEED: u64 = 0;

/// Adapter feeding serializer output into a hasher.
struct HashWriter<'a>(&'a mut Xxh64);

impl io::Write for HashWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Canonical JSON bytes of a value.
///
/// # Panics
/// If the value's `Serialize` impl fails, which derived impls over
/// string-keyed maps never do.
pub fn to_canonical_bytes<T: Serialize + ?Sized>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).expect("Canonical serialization failed")
}

/// Canonical hash of a value.
///
/// Equal to `xxh64(to_canonical_bytes(value), CANONICAL_SEED)` without
/// materializing the bytes.
///
/// # Panics
/// Under the same conditions as [`to_canonical_bytes`].
pub fn canonical_hash<T: Serialize + ?Sized>(value: &T) -> u64 {
    let mut hasher = Xxh64::new(CANONICAL_SEED);
    serde_json::to_writer(HashWriter(&mut hasher), value).expect("Canonical serialization failed");
    hasher.digest()
}

/// Canonical hash as 16 lowercase hex digits.
pub fn canonical_hash_hex<T: Serialize + ?Sized>(value: &T) -> String {
    format!("{:016x}", canonical_hash(value))
}
