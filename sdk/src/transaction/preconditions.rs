//! Transaction validity conditions: time and ledger windows, sequence
//! constraints, and extra required signers.
//!
//! On the wire this is a three-armed union. [`Preconditions::to_xdr`] picks
//! the smallest arm that can carry the conditions actually set:
//!
//! ```text
//! PRECOND_NONE  (0)  nothing set
//! PRECOND_TIME  (1)  only time bounds
//! PRECOND_V2    (2)  anything else
//! ```
//!
//! A decoded transaction keeps whichever arm it arrived with, so its hash
//! does not depend on this choice.

use crate::config::MAX_EXTRA_SIGNERS;
use crate::error::ValidationError;
use crate::strkey::{self, StrKey};
use crate::xdr;

// ---------------------------------------------------------------------------
// SignerKey
// ---------------------------------------------------------------------------

/// Parses a `G…`, `T…`, `X…` or `P…` strkey into a signer key.
pub fn parse_signer_key(s: &str) -> Result<xdr::SignerKey, ValidationError> {
    match strkey::decode(s)? {
        StrKey::PublicKey(k) => Ok(xdr::SignerKey::Ed25519(xdr::Uint256(k))),
        StrKey::PreAuthTx(k) => Ok(xdr::SignerKey::PreAuthTx(xdr::Uint256(k))),
        StrKey::HashX(k) => Ok(xdr::SignerKey::HashX(xdr::Uint256(k))),
        StrKey::SignedPayload { ed25519, payload } => {
            let payload = payload.try_into().map_err(|_| ValidationError::InvalidAddress {
                address: s.to_string(),
                reason: "signed payload over 64 bytes".to_string(),
            })?;
            Ok(xdr::SignerKey::Ed25519SignedPayload(
                xdr::SignerKeyEd25519SignedPayload {
                    ed25519: xdr::Uint256(ed25519),
                    payload,
                },
            ))
        }
        _ => Err(ValidationError::InvalidAddress {
            address: s.to_string(),
            reason: "not a signer key".to_string(),
        }),
    }
}

pub fn signer_key_to_strkey(key: &xdr::SignerKey) -> String {
    strkey::encode(&match key {
        xdr::SignerKey::Ed25519(k) => StrKey::PublicKey(k.0),
        xdr::SignerKey::PreAuthTx(k) => StrKey::PreAuthTx(k.0),
        xdr::SignerKey::HashX(k) => StrKey::HashX(k.0),
        xdr::SignerKey::Ed25519SignedPayload(p) => StrKey::SignedPayload {
            ed25519: p.ed25519.0,
            payload: p.payload.to_vec(),
        },
    })
}

// ---------------------------------------------------------------------------
// Preconditions
// ---------------------------------------------------------------------------

/// Every condition a transaction can be gated on. All optional.
///
/// `max_time == 0` and `max_ledger == 0` mean "no upper bound".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Preconditions {
    pub time_bounds: Option<xdr::TimeBounds>,
    pub ledger_bounds: Option<xdr::LedgerBounds>,
    /// Replaces the usual "sequence must be current + 1" rule with
    /// "current must be at least this, below the transaction's own".
    pub min_sequence_number: Option<i64>,
    /// Seconds since the account's sequence last changed.
    pub min_sequence_age: u64,
    /// Ledgers since the account's sequence last changed.
    pub min_sequence_ledger_gap: u32,
    pub extra_signers: Vec<xdr::SignerKey>,
}

impl Preconditions {
    pub fn is_empty(&self) -> bool {
        self.time_bounds.is_none() && !self.needs_v2()
    }

    fn needs_v2(&self) -> bool {
        self.ledger_bounds.is_some()
            || self.min_sequence_number.is_some()
            || self.min_sequence_age != 0
            || self.min_sequence_ledger_gap != 0
            || !self.extra_signers.is_empty()
    }

    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        if self.extra_signers.len() > MAX_EXTRA_SIGNERS {
            return Err(ValidationError::TooManyExtraSigners {
                count: self.extra_signers.len(),
                max: MAX_EXTRA_SIGNERS,
            });
        }
        if let Some(tb) = &self.time_bounds {
            if tb.max_time.0 != 0 && tb.max_time.0 < tb.min_time.0 {
                return Err(ValidationError::InvalidField(format!(
                    "time bounds max {} precedes min {}",
                    tb.max_time.0, tb.min_time.0
                )));
            }
        }
        if let Some(lb) = &self.ledger_bounds {
            if lb.max_ledger != 0 && lb.max_ledger < lb.min_ledger {
                return Err(ValidationError::InvalidField(format!(
                    "ledger bounds max {} precedes min {}",
                    lb.max_ledger, lb.min_ledger
                )));
            }
        }
        Ok(())
    }

    /// Validates, then picks the wire arm.
    pub fn to_xdr(&self) -> Result<xdr::Preconditions, ValidationError> {
        self.validate()?;
        if !self.needs_v2() {
            return Ok(match &self.time_bounds {
                Some(tb) => xdr::Preconditions::Time(tb.clone()),
                None => xdr::Preconditions::None,
            });
        }
        let extra_signers = self.extra_signers.clone().try_into().map_err(|_| {
            ValidationError::TooManyExtraSigners {
                count: self.extra_signers.len(),
                max: MAX_EXTRA_SIGNERS,
            }
        })?;
        Ok(xdr::Preconditions::V2(xdr::PreconditionsV2 {
            time_bounds: self.time_bounds.clone(),
            ledger_bounds: self.ledger_bounds.clone(),
            min_seq_num: self.min_sequence_number.map(xdr::SequenceNumber),
            min_seq_age: xdr::Duration(self.min_sequence_age),
            min_seq_ledger_gap: self.min_sequence_ledger_gap,
            extra_signers,
        }))
    }
}

/// Time bounds of whichever arm `cond` is, if any.
pub fn time_bounds(cond: &xdr::Preconditions) -> Option<&xdr::TimeBounds> {
    match cond {
        xdr::Preconditions::None => None,
        xdr::Preconditions::Time(tb) => Some(tb),
        xdr::Preconditions::V2(v2) => v2.time_bounds.as_ref(),
    }
}

pub(crate) fn time_window(min_time: u64, max_time: u64) -> xdr::TimeBounds {
    xdr::TimeBounds {
        min_time: xdr::TimePoint(min_time),
        max_time: xdr::TimePoint(max_time),
    }
}
