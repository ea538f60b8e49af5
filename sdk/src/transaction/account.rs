//! Source accounts: plain `G…` accounts, muxed `M…` accounts, and the
//! account-plus-sequence pair the builder starts from.

use std::fmt;

use crate::crypto::PublicKey;
use crate::error::ValidationError;
use crate::strkey::{self, StrKey};
use crate::xdr;

// ---------------------------------------------------------------------------
// Key conversions
// ---------------------------------------------------------------------------

impl From<&PublicKey> for xdr::AccountId {
    fn from(pk: &PublicKey) -> Self {
        xdr::AccountId(xdr::PublicKey::PublicKeyTypeEd25519(xdr::Uint256(
            *pk.as_bytes(),
        )))
    }
}

impl From<&xdr::AccountId> for PublicKey {
    fn from(id: &xdr::AccountId) -> Self {
        let xdr::PublicKey::PublicKeyTypeEd25519(xdr::Uint256(bytes)) = &id.0;
        PublicKey::from_bytes(*bytes)
    }
}

/// Parses a `G…` address into its wire form.
pub fn account_id(address: &str) -> Result<xdr::AccountId, ValidationError> {
    Ok((&PublicKey::from_account_id(address)?).into())
}

// ---------------------------------------------------------------------------
// MuxedAccount
// ---------------------------------------------------------------------------

/// An account, optionally multiplexed with a 64-bit sub-account id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MuxedAccount {
    Ed25519(PublicKey),
    Muxed { id: u64, ed25519: PublicKey },
}

impl MuxedAccount {
    /// Parses either a `G…` or an `M…` address.
    pub fn parse(address: &str) -> Result<Self, ValidationError> {
        match strkey::decode(address)? {
            StrKey::PublicKey(bytes) => Ok(Self::Ed25519(PublicKey::from_bytes(bytes))),
            StrKey::MuxedAccount { ed25519, id } => Ok(Self::Muxed {
                id,
                ed25519: PublicKey::from_bytes(ed25519),
            }),
            _ => Err(ValidationError::InvalidAddress {
                address: address.to_string(),
                reason: "expected an account (G...) or muxed account (M...)".to_string(),
            }),
        }
    }

    /// The underlying ed25519 key, muxing stripped.
    pub fn public_key(&self) -> &PublicKey {
        match self {
            Self::Ed25519(pk) | Self::Muxed { ed25519: pk, .. } => pk,
        }
    }

    /// The `G…` account id, ignoring any mux id.
    pub fn account_id(&self) -> String {
        self.public_key().account_id()
    }

    pub fn address(&self) -> String {
        match self {
            Self::Ed25519(pk) => pk.account_id(),
            Self::Muxed { id, ed25519 } => strkey::encode(&StrKey::MuxedAccount {
                ed25519: *ed25519.as_bytes(),
                id: *id,
            }),
        }
    }
}

impl From<PublicKey> for MuxedAccount {
    fn from(pk: PublicKey) -> Self {
        Self::Ed25519(pk)
    }
}

impl fmt::Display for MuxedAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address())
    }
}

impl From<MuxedAccount> for xdr::MuxedAccount {
    fn from(account: MuxedAccount) -> Self {
        match account {
            MuxedAccount::Ed25519(pk) => Self::Ed25519(xdr::Uint256(*pk.as_bytes())),
            MuxedAccount::Muxed { id, ed25519 } => Self::MuxedEd25519(xdr::MuxedAccountMed25519 {
                id,
                ed25519: xdr::Uint256(*ed25519.as_bytes()),
            }),
        }
    }
}

impl From<&xdr::MuxedAccount> for MuxedAccount {
    fn from(account: &xdr::MuxedAccount) -> Self {
        match account {
            xdr::MuxedAccount::Ed25519(xdr::Uint256(bytes)) => {
                Self::Ed25519(PublicKey::from_bytes(*bytes))
            }
            xdr::MuxedAccount::MuxedEd25519(med) => Self::Muxed {
                id: med.id,
                ed25519: PublicKey::from_bytes(med.ed25519.0),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

/// A source account and its current sequence number.
///
/// The builder reads the sequence and uses `sequence + 1`; it does not
/// advance it. Call [`Account::increment_sequence_number`] once the
/// transaction is on its way, or re-fetch the account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    account: MuxedAccount,
    sequence: i64,
}

impl Account {
    /// `address` may be a `G…` or an `M…` address.
    pub fn new(address: &str, sequence: i64) -> Result<Self, ValidationError> {
        Ok(Self {
            account: MuxedAccount::parse(address)?,
            sequence,
        })
    }

    pub fn account_id(&self) -> String {
        self.account.account_id()
    }

    pub fn muxed_account(&self) -> &MuxedAccount {
        &self.account
    }

    pub fn sequence_number(&self) -> i64 {
        self.sequence
    }

    pub fn increment_sequence_number(&mut self) {
        self.sequence += 1;
    }
}

impl From<&xdr::AccountEntry> for Account {
    fn from(entry: &xdr::AccountEntry) -> Self {
        Self {
            account: MuxedAccount::Ed25519((&entry.account_id).into()),
            sequence: entry.seq_num.0,
        }
    }
}
