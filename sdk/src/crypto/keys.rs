//! # Key Management
//!
//! Ed25519 keypairs, public keys and signatures: the Signer capability the
//! rest of the SDK consumes.
//!
//! ## Security considerations
//!
//! - Secret keys are zeroized on drop (`ed25519-dalek` does this for us).
//! - Key generation uses `OsRng`.
//! - `Keypair` never prints its secret, not even partially. Its `Debug`
//!   output is the public account id only.

use std::fmt;

use ed25519_dalek::{Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;

use crate::error::ValidationError;
use crate::strkey::{self, StrKey};

/// A signing identity on the network.
///
/// Deliberately not `Serialize`: exporting a secret should be an explicit
/// call to [`Keypair::secret_seed`], never a side effect of logging a struct.
///
/// # Examples
///
/// ```
/// use lumen_sdk::crypto::Keypair;
///
/// let kp = Keypair::random();
/// let sig = kp.sign(b"payload");
/// assert!(kp.verify(b"payload", &sig));
/// assert!(kp.account_id().starts_with('G'));
/// ```
pub struct Keypair {
    signing_key: SigningKey,
}

/// The public half of a keypair, i.e. an account id.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey {
    bytes: [u8; 32],
}

/// A 64-byte Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    bytes: [u8; 64],
}

impl Keypair {
    /// Fresh keypair from the OS RNG.
    pub fn random() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Keypair from a raw 32-byte Ed25519 seed.
    pub fn from_raw_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Keypair from an `S…` secret seed.
    pub fn from_secret(secret: &str) -> Result<Self, ValidationError> {
        match strkey::decode(secret)? {
            StrKey::SecretSeed(seed) => Ok(Self::from_raw_seed(&seed)),
            _ => Err(ValidationError::InvalidAddress {
                address: "<redacted>".to_string(),
                reason: "not a secret seed".to_string(),
            }),
        }
    }

    /// The `S…` secret seed. Handle with care.
    pub fn secret_seed(&self) -> String {
        strkey::encode(&StrKey::SecretSeed(self.signing_key.to_bytes()))
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            bytes: self.signing_key.verifying_key().to_bytes(),
        }
    }

    /// The `G…` account id of this keypair.
    pub fn account_id(&self) -> String {
        self.public_key().account_id()
    }

    /// Last four bytes of the public key, used to tag decorated signatures.
    pub fn signature_hint(&self) -> [u8; 4] {
        self.public_key().signature_hint()
    }

    /// Ed25519 signature over `message`. Deterministic.
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature {
            bytes: self.signing_key.sign(message).to_bytes(),
        }
    }

    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        self.public_key().verify(message, signature)
    }
}

impl Clone for Keypair {
    fn clone(&self) -> Self {
        Self::from_raw_seed(&self.signing_key.to_bytes())
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({})", self.account_id())
    }
}

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

impl PublicKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// Parses a `G…` account id.
    pub fn from_account_id(account_id: &str) -> Result<Self, ValidationError> {
        match strkey::decode(account_id)? {
            StrKey::PublicKey(bytes) => Ok(Self { bytes }),
            _ => Err(ValidationError::InvalidAddress {
                address: account_id.to_string(),
                reason: "expected an account id (G...)".to_string(),
            }),
        }
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    pub fn account_id(&self) -> String {
        strkey::encode(&StrKey::PublicKey(self.bytes))
    }

    pub fn signature_hint(&self) -> [u8; 4] {
        let mut hint = [0u8; 4];
        hint.copy_from_slice(&self.bytes[28..]);
        hint
    }

    /// `false` for a bad signature and for bytes that are not a curve point
    /// alike; callers only ever need the yes/no.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.bytes) else {
            return false;
        };
        let sig = DalekSignature::from_bytes(&signature.bytes);
        verifying_key.verify(message, &sig).is_ok()
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.account_id())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.account_id())
    }
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

impl Signature {
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self { bytes }
    }

    /// `None` unless `slice` is exactly 64 bytes.
    pub fn try_from_slice(slice: &[u8]) -> Option<Self> {
        let bytes: [u8; 64] = slice.try_into().ok()?;
        Some(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex_str = self.to_hex();
        write!(f, "Signature({}...{})", &hex_str[..8], &hex_str[120..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_verify_roundtrip() {
        let kp = Keypair::random();
        let sig = kp.sign(b"payment 100 XLM");
        assert!(kp.verify(b"payment 100 XLM", &sig));
        assert!(!kp.verify(b"payment 101 XLM", &sig));
    }

    #[test]
    fn wrong_key_fails_verification() {
        let kp1 = Keypair::random();
        let kp2 = Keypair::random();
        let sig = kp1.sign(b"message");
        assert!(!kp2.verify(b"message", &sig));
    }

    #[test]
    fn secret_seed_roundtrip() {
        let kp = Keypair::random();
        let seed = kp.secret_seed();
        assert!(seed.starts_with('S'));
        let restored = Keypair::from_secret(&seed).unwrap();
        assert_eq!(kp.public_key(), restored.public_key());
    }

    #[test]
    fn same_seed_same_account() {
        let kp1 = Keypair::from_raw_seed(&[42u8; 32]);
        let kp2 = Keypair::from_raw_seed(&[42u8; 32]);
        assert_eq!(kp1.account_id(), kp2.account_id());
        assert_eq!(kp1.sign(b"x"), kp2.sign(b"x"));
    }

    #[test]
    fn account_id_rejected_as_secret() {
        let kp = Keypair::random();
        assert!(Keypair::from_secret(&kp.account_id()).is_err());
    }

    #[test]
    fn public_key_from_account_id() {
        let kp = Keypair::random();
        let pk = PublicKey::from_account_id(&kp.account_id()).unwrap();
        assert_eq!(pk, kp.public_key());
        assert!(PublicKey::from_account_id(&kp.secret_seed()).is_err());
    }

    #[test]
    fn hint_is_last_four_bytes() {
        let kp = Keypair::from_raw_seed(&[7u8; 32]);
        let pk = kp.public_key();
        assert_eq!(kp.signature_hint(), pk.as_bytes()[28..32]);
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let kp = Keypair::random();
        let debug_str = format!("{:?}", kp);
        assert!(debug_str.starts_with("Keypair(G"));
        assert!(!debug_str.contains(&kp.secret_seed()));
    }

    #[test]
    fn signature_slice_length_checked() {
        assert!(Signature::try_from_slice(&[0u8; 63]).is_none());
        assert!(Signature::try_from_slice(&[0u8; 64]).is_some());
    }
}
