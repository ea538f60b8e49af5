//! The submitted form of a transaction: body plus signatures, tagged by kind.
//!
//! ```text
//! 0  ENVELOPE_TYPE_TX_V0        legacy body (raw ed25519 source, time bounds only)
//! 2  ENVELOPE_TYPE_TX           current body
//! 5  ENVELOPE_TYPE_TX_FEE_BUMP  fee-bump body wrapping a v1 envelope
//! ```
//!
//! Envelopes are decoded against a [`Network`]: the passphrase is not on
//! the wire, yet every hash depends on it. A v0 envelope comes back as a
//! v1 [`Transaction`]; the network hashes both forms identically, so its
//! signatures stay valid.
//!
//! Decoding is bounded by [`xdr_decode_limits`] and then runs the checks
//! the wire types leave open, so an envelope without operations is refused
//! here rather than by the network.

use crate::config::{xdr_decode_limits, Network};
use crate::error::Result;
use crate::xdr::{self, ReadXdr};

use super::builder::Transaction;
use super::fee_bump::FeeBumpTransaction;
use super::signing::Envelope;

/// A decoded envelope of either kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionEnvelope {
    Transaction(Transaction),
    FeeBump(FeeBumpTransaction),
}

impl TransactionEnvelope {
    pub fn from_xdr(bytes: &[u8], network: &Network) -> Result<Self> {
        let envelope = xdr::TransactionEnvelope::from_xdr(bytes, xdr_decode_limits())?;
        Self::from_xdr_envelope(envelope, network)
    }

    /// Decodes the base64 form RPC nodes and wallets pass around.
    pub fn from_xdr_base64(s: &str, network: &Network) -> Result<Self> {
        let envelope = xdr::TransactionEnvelope::from_xdr_base64(s, xdr_decode_limits())?;
        Self::from_xdr_envelope(envelope, network)
    }

    pub fn from_xdr_envelope(envelope: xdr::TransactionEnvelope, network: &Network) -> Result<Self> {
        let network_id = network.network_id();
        Ok(match envelope {
            xdr::TransactionEnvelope::TxV0(v0) => {
                Self::Transaction(Transaction::from_v0_envelope(v0, network_id)?)
            }
            xdr::TransactionEnvelope::Tx(v1) => {
                Self::Transaction(Transaction::from_v1_envelope(v1, network_id)?)
            }
            xdr::TransactionEnvelope::TxFeeBump(fb) => {
                Self::FeeBump(FeeBumpTransaction::from_xdr_envelope(fb, network_id)?)
            }
        })
    }

    pub fn is_fee_bump(&self) -> bool {
        matches!(self, Self::FeeBump(_))
    }

    /// The transaction whose operations actually execute.
    pub fn transaction(&self) -> &Transaction {
        match self {
            Self::Transaction(tx) => tx,
            Self::FeeBump(fb) => fb.inner_transaction(),
        }
    }
}

/// Delegates to whichever kind is inside, so signing a decoded envelope
/// signs the outermost transaction.
impl Envelope for TransactionEnvelope {
    fn network_id(&self) -> &[u8; 32] {
        match self {
            Self::Transaction(tx) => Envelope::network_id(tx),
            Self::FeeBump(fb) => Envelope::network_id(fb),
        }
    }

    fn tagged_transaction(&self) -> Result<xdr::TransactionSignaturePayloadTaggedTransaction> {
        match self {
            Self::Transaction(tx) => tx.tagged_transaction(),
            Self::FeeBump(fb) => fb.tagged_transaction(),
        }
    }

    fn to_envelope(&self) -> Result<xdr::TransactionEnvelope> {
        match self {
            Self::Transaction(tx) => tx.to_envelope(),
            Self::FeeBump(fb) => fb.to_envelope(),
        }
    }

    fn signatures(&self) -> &[xdr::DecoratedSignature] {
        match self {
            Self::Transaction(tx) => Envelope::signatures(tx),
            Self::FeeBump(fb) => Envelope::signatures(fb),
        }
    }

    fn signatures_mut(&mut self) -> &mut Vec<xdr::DecoratedSignature> {
        match self {
            Self::Transaction(tx) => tx.signatures_mut(),
            Self::FeeBump(fb) => fb.signatures_mut(),
        }
    }
}

impl From<Transaction> for TransactionEnvelope {
    fn from(tx: Transaction) -> Self {
        Self::Transaction(tx)
    }
}

impl From<FeeBumpTransaction> for TransactionEnvelope {
    fn from(fb: FeeBumpTransaction) -> Self {
        Self::FeeBump(fb)
    }
}
