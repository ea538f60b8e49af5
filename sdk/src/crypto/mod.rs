//! # Cryptographic Primitives
//!
//! Ed25519 for signatures, SHA-256 for everything that gets hashed. Both are
//! what the network mandates, so there is nothing to choose here, only to
//! wrap carefully.
//!
//! We don't implement either primitive ourselves; `ed25519-dalek` and `sha2`
//! do the real work.

pub mod hash;
pub mod keys;

pub use hash::{sha256, sha256_array};
pub use keys::{Keypair, PublicKey, Signature};
