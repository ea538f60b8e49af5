//! SHA-256 helpers.
//!
//! Network ids, transaction hashes, signature hints for hash-x signers and
//! contract ids are all SHA-256. No other hash function appears on the wire.

use sha2::{Digest, Sha256};

/// SHA-256 of `data` as a `Vec<u8>`.
///
/// # Example
///
/// ```
/// use lumen_sdk::crypto::sha256;
///
/// assert_eq!(sha256(b"lumen").len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> Vec<u8> {
    sha256_array(data).to_vec()
}

/// SHA-256 of `data` as a fixed-size array. Prefer this one in hot paths.
pub fn sha256_array(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}
