//! Signing: the canonical signature payload and decorated signatures.
//!
//! Signing is a separate step from building because the keypair may not
//! be available at construction time (hardware wallet, remote signer,
//! another party in a multi-sig setup). What gets signed is always the
//! hash of a [`xdr::TransactionSignaturePayload`]:
//!
//! ```text
//! sha256( networkId ‖ envelopeType (4 bytes, big-endian) ‖ XDR(body) )
//! ```
//!
//! so a signature commits to the network, the envelope kind and every byte
//! of the body. Both [`Transaction`](super::Transaction) and
//! [`FeeBumpTransaction`](super::FeeBumpTransaction) implement
//! [`Envelope`]; the only difference between them is the tagged body.

use crate::config::MAX_SIGNATURES;
use crate::crypto::{sha256_array, Keypair, PublicKey, Signature};
use crate::error::{Result, ValidationError};
use crate::xdr::{self, Limits, WriteXdr};

use super::builder::Transaction;

/// Longest signature (or hash-x preimage) a decorated signature carries.
const MAX_SIGNATURE_BYTES: usize = 64;

/// A signature tagged with the last four bytes of the signer's key, so
/// validators can find the matching signer without trying them all.
pub(crate) fn decorated(hint: [u8; 4], signature: &[u8]) -> Result<xdr::DecoratedSignature> {
    Ok(xdr::DecoratedSignature {
        hint: xdr::SignatureHint(hint),
        signature: xdr::Signature(signature.to_vec().try_into()?),
    })
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Something that can be hashed, signed and wrapped for submission.
///
/// Implementors provide the tagged body, the network id and access to the
/// signature list; hashing, signing and envelope encoding are shared.
pub trait Envelope {
    fn network_id(&self) -> &[u8; 32];

    /// The body as it sits inside the signature payload.
    fn tagged_transaction(&self) -> Result<xdr::TransactionSignaturePayloadTaggedTransaction>;

    /// The full wire envelope: body plus signatures.
    fn to_envelope(&self) -> Result<xdr::TransactionEnvelope>;

    fn signatures(&self) -> &[xdr::DecoratedSignature];

    /// Raw access to the list. Prefer [`Envelope::sign`] and friends, which
    /// enforce the signature cap.
    fn signatures_mut(&mut self) -> &mut Vec<xdr::DecoratedSignature>;

    fn signature_payload(&self) -> Result<xdr::TransactionSignaturePayload> {
        Ok(xdr::TransactionSignaturePayload {
            network_id: xdr::Hash(*self.network_id()),
            tagged_transaction: self.tagged_transaction()?,
        })
    }

    /// The exact bytes that get hashed: `networkId ‖ tag ‖ XDR(body)`.
    fn signature_base(&self) -> Result<Vec<u8>> {
        Ok(self.signature_payload()?.to_xdr(Limits::none())?)
    }

    /// The transaction hash: `sha256(signature_base)`. This is also the id
    /// the RPC node reports the transaction under.
    fn hash(&self) -> Result<[u8; 32]> {
        Ok(sha256_array(&self.signature_base()?))
    }

    fn hash_hex(&self) -> Result<String> {
        Ok(hex::encode(self.hash()?))
    }

    /// Signs the hash with `keypair` and appends the decorated signature.
    /// Nothing but the signature list changes. Signing twice with the same
    /// key appends twice.
    fn sign(&mut self, keypair: &Keypair) -> Result<()> {
        let signature = keypair.sign(&self.hash()?);
        let decorated = decorated(keypair.signature_hint(), signature.as_bytes())?;
        Ok(push_signature(self.signatures_mut(), decorated)?)
    }

    /// Appends a signature produced elsewhere, after checking it verifies
    /// against this transaction's hash under `public_key` (a `G…` id).
    fn add_signature(&mut self, public_key: &str, signature: &[u8]) -> Result<()> {
        let pk = PublicKey::from_account_id(public_key)?;
        let invalid = || ValidationError::InvalidSignature {
            public_key: public_key.to_string(),
        };
        let sig = Signature::try_from_slice(signature).ok_or_else(invalid)?;
        if !pk.verify(&self.hash()?, &sig) {
            return Err(invalid().into());
        }
        let decorated = decorated(pk.signature_hint(), sig.as_bytes())?;
        Ok(push_signature(self.signatures_mut(), decorated)?)
    }

    /// Appends a hash-x "signature": the preimage itself, hinted with the
    /// last four bytes of its sha256.
    fn sign_hash_x(&mut self, preimage: &[u8]) -> Result<()> {
        if preimage.len() > MAX_SIGNATURE_BYTES {
            return Err(ValidationError::InvalidField(format!(
                "hash-x preimage is {} bytes, the limit is {MAX_SIGNATURE_BYTES}",
                preimage.len()
            ))
            .into());
        }
        let digest = sha256_array(preimage);
        let mut hint = [0u8; 4];
        hint.copy_from_slice(&digest[28..]);
        let decorated = decorated(hint, preimage)?;
        Ok(push_signature(self.signatures_mut(), decorated)?)
    }

    /// `envelopeType ‖ body ‖ signatures`, ready for `sendTransaction`.
    fn to_envelope_xdr(&self) -> Result<Vec<u8>> {
        Ok(self.to_envelope()?.to_xdr(Limits::none())?)
    }

    fn to_envelope_xdr_base64(&self) -> Result<String> {
        Ok(self.to_envelope()?.to_xdr_base64(Limits::none())?)
    }
}

fn push_signature(
    list: &mut Vec<xdr::DecoratedSignature>,
    signature: xdr::DecoratedSignature,
) -> std::result::Result<(), ValidationError> {
    if list.len() >= MAX_SIGNATURES {
        return Err(ValidationError::TooManySignatures {
            max: MAX_SIGNATURES,
        });
    }
    list.push(signature);
    Ok(())
}

impl Envelope for Transaction {
    fn network_id(&self) -> &[u8; 32] {
        &self.network_id
    }

    fn tagged_transaction(&self) -> Result<xdr::TransactionSignaturePayloadTaggedTransaction> {
        Ok(xdr::TransactionSignaturePayloadTaggedTransaction::Tx(
            self.to_xdr_transaction()?,
        ))
    }

    fn to_envelope(&self) -> Result<xdr::TransactionEnvelope> {
        Ok(xdr::TransactionEnvelope::Tx(self.to_v1_envelope()?))
    }

    fn signatures(&self) -> &[xdr::DecoratedSignature] {
        &self.signatures
    }

    fn signatures_mut(&mut self) -> &mut Vec<xdr::DecoratedSignature> {
        &mut self.signatures
    }
}

/// Signs `tx` in place with `keypair` and hands it back for chaining.
///
/// ```rust
/// use lumen_sdk::{Account, Keypair, Network, Operation, TransactionBuilder};
/// use lumen_sdk::transaction::{sign_transaction, Envelope};
///
/// let kp = Keypair::random();
/// let account = Account::new(&kp.account_id(), 1).unwrap();
/// let mut tx = TransactionBuilder::new(&account, &Network::testnet())
///     .add_operation(Operation::bump_sequence(5))
///     .build()
///     .unwrap();
///
/// sign_transaction(&mut tx, &kp).unwrap();
/// assert_eq!(tx.signatures().len(), 1);
/// ```
pub fn sign_transaction<'a, E: Envelope>(tx: &'a mut E, keypair: &Keypair) -> Result<&'a E> {
    tx.sign(keypair)?;
    Ok(tx)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Network;
    use crate::error::Error;
    use crate::transaction::{Account, Operation, TransactionBuilder};

    fn sample_tx(signer: &Keypair) -> Transaction {
        let account = Account::new(&signer.account_id(), 100).unwrap();
        TransactionBuilder::new(&account, &Network::testnet())
            .add_operation(Operation::bump_sequence(200))
            .build()
            .unwrap()
    }

    #[test]
    fn signature_base_layout() {
        let kp = Keypair::random();
        let tx = sample_tx(&kp);
        let base = tx.signature_base().unwrap();
        let body = tx.to_xdr_transaction().unwrap().to_xdr(Limits::none()).unwrap();
        assert_eq!(&base[..32], &Network::testnet().network_id());
        assert_eq!(&base[32..36], &[0, 0, 0, 2]);
        assert_eq!(&base[36..], body.as_slice());
        assert_eq!(tx.hash().unwrap(), sha256_array(&base));
    }

    #[test]
    fn hash_depends_on_network() {
        let kp = Keypair::random();
        let tx = sample_tx(&kp);
        let mut other = tx.clone();
        other.network_id = Network::public().network_id();
        assert_ne!(tx.hash().unwrap(), other.hash().unwrap());
    }

    #[test]
    fn sign_appends_verifiable_signature() {
        let kp = Keypair::random();
        let mut tx = sample_tx(&kp);
        let hash_before = tx.hash().unwrap();

        tx.sign(&kp).unwrap();

        assert_eq!(tx.signatures().len(), 1);
        assert_eq!(tx.signatures()[0].hint.0, kp.signature_hint());
        let sig = Signature::try_from_slice(&tx.signatures()[0].signature.0).unwrap();
        assert!(kp.verify(&hash_before, &sig));
        assert_eq!(tx.hash().unwrap(), hash_before, "signing must not change the hash");
    }

    #[test]
    fn duplicate_signatures_are_kept() {
        let kp = Keypair::random();
        let mut tx = sample_tx(&kp);
        tx.sign(&kp).unwrap();
        tx.sign(&kp).unwrap();
        assert_eq!(tx.signatures().len(), 2);
        assert_eq!(tx.signatures()[0], tx.signatures()[1]);
    }

    #[test]
    fn signature_order_is_preserved() {
        let a = Keypair::random();
        let b = Keypair::random();
        let mut tx = sample_tx(&a);
        sign_transaction(&mut tx, &b).unwrap();
        sign_transaction(&mut tx, &a).unwrap();
        assert_eq!(tx.signatures()[0].hint.0, b.signature_hint());
        assert_eq!(tx.signatures()[1].hint.0, a.signature_hint());
    }

    #[test]
    fn external_signature_is_verified() {
        let kp = Keypair::random();
        let mut tx = sample_tx(&kp);
        let good = kp.sign(&tx.hash().unwrap());
        tx.add_signature(&kp.account_id(), good.as_bytes()).unwrap();
        assert_eq!(tx.signatures().len(), 1);

        let other = Keypair::random();
        let bad = other.sign(&tx.hash().unwrap());
        assert!(matches!(
            tx.add_signature(&kp.account_id(), bad.as_bytes()),
            Err(Error::Validation(ValidationError::InvalidSignature { .. }))
        ));
        assert!(tx.add_signature(&kp.account_id(), &[0u8; 10]).is_err());
        assert_eq!(tx.signatures().len(), 1);
    }

    #[test]
    fn hash_x_signature() {
        let kp = Keypair::random();
        let mut tx = sample_tx(&kp);
        let preimage = b"open sesame";
        tx.sign_hash_x(preimage).unwrap();
        let decorated = &tx.signatures()[0];
        assert_eq!(decorated.signature.0.to_vec(), preimage.to_vec());
        assert_eq!(decorated.hint.0, sha256_array(preimage)[28..]);
        assert!(tx.sign_hash_x(&[0u8; 65]).is_err());
    }

    #[test]
    fn signature_cap() {
        let kp = Keypair::random();
        let mut tx = sample_tx(&kp);
        for _ in 0..MAX_SIGNATURES {
            tx.sign(&kp).unwrap();
        }
        assert!(matches!(
            tx.sign(&kp),
            Err(Error::Validation(ValidationError::TooManySignatures { max: MAX_SIGNATURES }))
        ));
        assert_eq!(tx.signatures().len(), MAX_SIGNATURES);
    }

    #[test]
    fn envelope_wraps_body_and_signatures() {
        let kp = Keypair::random();
        let mut tx = sample_tx(&kp);
        tx.sign(&kp).unwrap();
        let env = tx.to_envelope_xdr().unwrap();
        let body = tx.to_xdr_transaction().unwrap().to_xdr(Limits::none()).unwrap();
        assert_eq!(&env[..4], &[0, 0, 0, 2]);
        assert_eq!(&env[4..4 + body.len()], body.as_slice());
        // count, hint, length-prefixed 64-byte signature
        assert_eq!(env.len(), 4 + body.len() + 4 + 4 + 4 + 64);
    }
}
