//! Fee bumps: re-pricing a built transaction without touching it.
//!
//! A [`FeeBumpTransaction`] wraps an inner [`Transaction`] (signed or not)
//! together with a new fee source and a new total fee. The inner
//! transaction, its signatures included, is carried by value and never
//! modified; the fee source signs the outer envelope separately.
//!
//! Fee rules, for an inner transaction with `n` operations:
//!
//! - `base_fee` must be at least the network minimum (100 stroops);
//! - `base_fee` must not undercut the inner transaction's own per-operation
//!   rate;
//! - the total is `base_fee × (n + 1)` and must fit in an `int64`.
//!
//! For a Soroban inner transaction the resource fee is set aside: the rate
//! is computed from the inclusion fee alone and the resource fee is added
//! back on top of the total.

use crate::config::{BASE_FEE, MAX_OPERATIONS, MIN_OPERATIONS};
use crate::error::{Result, ValidationError};
use crate::xdr;

use super::account::MuxedAccount;
use super::builder::Transaction;
use super::signing::Envelope;

/// An outer transaction paying for an inner one.
///
/// # Wire Form
///
/// ```text
/// feeSource  MuxedAccount
/// fee        int64
/// innerTx    union { 2: TransactionV1Envelope (body + inner signatures) }
/// ext        union { 0: void }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeBumpTransaction {
    fee_source: MuxedAccount,
    fee: i64,
    inner: Transaction,
    signatures: Vec<xdr::DecoratedSignature>,
}

impl FeeBumpTransaction {
    /// Wraps `inner`, paying `base_fee` per operation plus one for the
    /// fee bump itself. `fee_source` is a `G…` or `M…` address.
    pub fn with_base_fee(
        fee_source: &str,
        base_fee: i64,
        inner: Transaction,
    ) -> Result<Self, ValidationError> {
        let fee_source = MuxedAccount::parse(fee_source)?;
        let minimum = i64::from(BASE_FEE);
        if base_fee < minimum {
            return Err(ValidationError::BaseFeeTooLow { base_fee, minimum });
        }

        let ops = inner.operations().len() as i64;
        let resource_fee = inner.resource_fee();
        let inclusion_fee = i64::from(inner.fee()).saturating_sub(resource_fee);
        // Every Transaction carries at least one operation.
        let inner_rate = inclusion_fee.checked_div(ops).ok_or(ValidationError::OperationCount {
            count: 0,
            min: MIN_OPERATIONS,
            max: MAX_OPERATIONS,
        })?;
        if base_fee < inner_rate {
            return Err(ValidationError::BaseFeeBelowInnerRate {
                base_fee,
                inner_rate,
            });
        }

        let fee = base_fee
            .checked_mul(ops + 1)
            .and_then(|f| f.checked_add(resource_fee))
            .ok_or_else(|| {
                ValidationError::FeeOverflow(format!(
                    "base fee {base_fee} × {} operations overflows int64",
                    ops + 1
                ))
            })?;

        tracing::debug!(
            fee_source = %fee_source,
            base_fee,
            fee,
            inner_operations = ops,
            "fee bump built"
        );

        Ok(Self {
            fee_source,
            fee,
            inner,
            signatures: Vec::new(),
        })
    }

    /// Wraps `inner` with an explicit total fee. It must not be negative
    /// and must cover at least what the inner transaction already bids.
    pub fn with_fee(fee_source: &str, fee: i64, inner: Transaction) -> Result<Self, ValidationError> {
        let fee_source = MuxedAccount::parse(fee_source)?;
        if fee < 0 {
            return Err(ValidationError::NegativeFee(fee));
        }
        let inner_fee = i64::from(inner.fee());
        if fee < inner_fee {
            return Err(ValidationError::FeeBelowInnerFee { fee, inner_fee });
        }
        Ok(Self {
            fee_source,
            fee,
            inner,
            signatures: Vec::new(),
        })
    }

    pub fn fee_source(&self) -> &MuxedAccount {
        &self.fee_source
    }

    pub fn fee(&self) -> i64 {
        self.fee
    }

    pub fn inner_transaction(&self) -> &Transaction {
        &self.inner
    }

    /// The wire body: fee source, fee and the inner v1 envelope.
    pub fn to_xdr_fee_bump(&self) -> Result<xdr::FeeBumpTransaction> {
        Ok(xdr::FeeBumpTransaction {
            fee_source: self.fee_source.into(),
            fee: self.fee,
            inner_tx: xdr::FeeBumpTransactionInnerTx::Tx(self.inner.to_v1_envelope()?),
            ext: xdr::FeeBumpTransactionExt::V0,
        })
    }

    /// Adopts a decoded fee-bump envelope. The inner transaction goes
    /// through the same checks as a plain v1 envelope.
    pub fn from_xdr_envelope(
        envelope: xdr::FeeBumpTransactionEnvelope,
        network_id: [u8; 32],
    ) -> Result<Self> {
        let xdr::FeeBumpTransactionEnvelope { tx, signatures } = envelope;
        let inner = match tx.inner_tx {
            xdr::FeeBumpTransactionInnerTx::Tx(inner) => Transaction::from_v1_envelope(inner, network_id)?,
        };
        Ok(Self {
            fee_source: MuxedAccount::from(&tx.fee_source),
            fee: tx.fee,
            inner,
            signatures: signatures.to_vec(),
        })
    }
}

impl Envelope for FeeBumpTransaction {
    /// Always the inner transaction's network.
    fn network_id(&self) -> &[u8; 32] {
        self.inner.network_id()
    }

    fn tagged_transaction(&self) -> Result<xdr::TransactionSignaturePayloadTaggedTransaction> {
        Ok(xdr::TransactionSignaturePayloadTaggedTransaction::TxFeeBump(
            self.to_xdr_fee_bump()?,
        ))
    }

    fn to_envelope(&self) -> Result<xdr::TransactionEnvelope> {
        Ok(xdr::TransactionEnvelope::TxFeeBump(xdr::FeeBumpTransactionEnvelope {
            tx: self.to_xdr_fee_bump()?,
            signatures: self.signatures.clone().try_into()?,
        }))
    }

    fn signatures(&self) -> &[xdr::DecoratedSignature] {
        &self.signatures
    }

    fn signatures_mut(&mut self) -> &mut Vec<xdr::DecoratedSignature> {
        &mut self.signatures
    }
}
