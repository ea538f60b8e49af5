//! Transaction construction via the builder pattern.
//!
//! The [`TransactionBuilder`] enforces a disciplined construction flow:
//! add operations, set whatever conditions apply, call `.build()`, and get
//! back an unsigned [`Transaction`] bound to one network.
//!
//! Everything the network would reject for structural reasons is rejected
//! here first, synchronously, as a [`ValidationError`]:
//!
//! - operation count outside `[1, 100]`;
//! - base fee below the network minimum, or a total fee that does not fit;
//! - memo text over 28 bytes;
//! - more than two extra signers;
//! - a Soroban operation sharing the transaction with anything else.
//!
//! The builder does not sign; that happens in [`super::signing`]. This
//! separation keeps construction testable without key material.

use chrono::Utc;

use crate::config::{Network, BASE_FEE, MAX_OPERATIONS, MIN_OPERATIONS};
use crate::error::{Result, ValidationError};
use crate::xdr;

use super::account::{Account, MuxedAccount};
use super::memo::Memo;
use super::operation::Operation;
use super::preconditions::{self, time_window, Preconditions};

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A built transaction (the v1 form) and the signatures collected so far.
///
/// Every field except the signature list is fixed at build time. Signing
/// appends through the [`super::Envelope`] trait; re-preparing for Soroban
/// produces a new value (see [`crate::rpc::assemble_transaction`]).
///
/// # Wire Form
///
/// [`Transaction::to_xdr_transaction`] yields the `xdr::Transaction` body:
///
/// ```text
/// sourceAccount  MuxedAccount
/// fee            uint32
/// seqNum         int64
/// cond           Preconditions
/// memo           Memo
/// operations     Operation<100>
/// ext            union { 0: void, 1: SorobanTransactionData }
/// ```
///
/// That body, tagged and prefixed with the network id, is what the
/// signature payload hashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub(crate) source_account: MuxedAccount,
    pub(crate) fee: u32,
    pub(crate) sequence_number: i64,
    pub(crate) preconditions: xdr::Preconditions,
    pub(crate) memo: Memo,
    pub(crate) operations: Vec<Operation>,
    pub(crate) soroban_data: Option<xdr::SorobanTransactionData>,
    pub(crate) network_id: [u8; 32],
    pub(crate) signatures: Vec<xdr::DecoratedSignature>,
}

impl Transaction {
    pub fn source_account(&self) -> &MuxedAccount {
        &self.source_account
    }

    /// Total fee in stroops, resource fee included.
    pub fn fee(&self) -> u32 {
        self.fee
    }

    pub fn sequence_number(&self) -> i64 {
        self.sequence_number
    }

    /// The conditions exactly as they go on the wire.
    pub fn preconditions(&self) -> &xdr::Preconditions {
        &self.preconditions
    }

    pub fn time_bounds(&self) -> Option<&xdr::TimeBounds> {
        preconditions::time_bounds(&self.preconditions)
    }

    pub fn memo(&self) -> &Memo {
        &self.memo
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn soroban_data(&self) -> Option<&xdr::SorobanTransactionData> {
        self.soroban_data.as_ref()
    }

    pub fn network_id(&self) -> &[u8; 32] {
        &self.network_id
    }

    /// Resource fee already folded into [`Transaction::fee`]; zero for
    /// classic transactions.
    pub fn resource_fee(&self) -> i64 {
        self.soroban_data.as_ref().map_or(0, |d| d.resource_fee)
    }

    /// Exactly one operation, and that operation is invoke-host-function,
    /// extend-footprint-TTL or restore-footprint.
    pub fn is_soroban(&self) -> bool {
        matches!(self.operations.as_slice(), [op] if op.is_soroban())
    }

    pub fn is_signed(&self) -> bool {
        !self.signatures.is_empty()
    }

    /// The wire body, without signatures.
    pub fn to_xdr_transaction(&self) -> Result<xdr::Transaction> {
        let operations: Vec<xdr::Operation> = self
            .operations
            .iter()
            .map(|op| op.as_xdr().clone())
            .collect();
        Ok(xdr::Transaction {
            source_account: self.source_account.into(),
            fee: self.fee,
            seq_num: xdr::SequenceNumber(self.sequence_number),
            cond: self.preconditions.clone(),
            memo: self.memo.as_xdr().clone(),
            operations: operations.try_into()?,
            ext: match &self.soroban_data {
                Some(data) => xdr::TransactionExt::V1(data.clone()),
                None => xdr::TransactionExt::V0,
            },
        })
    }

    /// Body plus signatures, as nested inside a fee bump.
    pub fn to_v1_envelope(&self) -> Result<xdr::TransactionV1Envelope> {
        Ok(xdr::TransactionV1Envelope {
            tx: self.to_xdr_transaction()?,
            signatures: self.signatures.clone().try_into()?,
        })
    }

    /// Adopts a decoded v1 envelope; the caller supplies the network, which
    /// the wire format does not carry. The operation count is checked
    /// again here since the wire type allows an empty list.
    pub fn from_v1_envelope(envelope: xdr::TransactionV1Envelope, network_id: [u8; 32]) -> Result<Self> {
        let xdr::TransactionV1Envelope { tx, signatures } = envelope;
        check_operation_count(tx.operations.len())?;
        Ok(Self {
            source_account: MuxedAccount::from(&tx.source_account),
            fee: tx.fee,
            sequence_number: tx.seq_num.0,
            preconditions: tx.cond,
            memo: tx.memo.into(),
            operations: tx.operations.to_vec().into_iter().map(Operation::from).collect(),
            soroban_data: match tx.ext {
                xdr::TransactionExt::V0 => None,
                xdr::TransactionExt::V1(data) => Some(data),
            },
            network_id,
            signatures: signatures.to_vec(),
        })
    }

    /// Adopts a legacy v0 envelope as the equivalent v1 transaction. The
    /// network hashes both forms identically, so its signatures stay valid.
    pub fn from_v0_envelope(envelope: xdr::TransactionV0Envelope, network_id: [u8; 32]) -> Result<Self> {
        let xdr::TransactionV0Envelope { tx, signatures } = envelope;
        let v1 = xdr::Transaction {
            source_account: xdr::MuxedAccount::Ed25519(tx.source_account_ed25519),
            fee: tx.fee,
            seq_num: tx.seq_num,
            cond: match tx.time_bounds {
                Some(tb) => xdr::Preconditions::Time(tb),
                None => xdr::Preconditions::None,
            },
            memo: tx.memo,
            operations: tx.operations,
            ext: xdr::TransactionExt::V0,
        };
        Self::from_v1_envelope(xdr::TransactionV1Envelope { tx: v1, signatures }, network_id)
    }

    /// A fresh, unsigned copy with a new fee, operation list and Soroban
    /// data. Old signatures would not cover the new body, so none carry over.
    pub(crate) fn reassembled(
        &self,
        fee: u32,
        operations: Vec<Operation>,
        soroban_data: xdr::SorobanTransactionData,
    ) -> Self {
        Self {
            source_account: self.source_account,
            fee,
            sequence_number: self.sequence_number,
            preconditions: self.preconditions.clone(),
            memo: self.memo.clone(),
            operations,
            soroban_data: Some(soroban_data),
            network_id: self.network_id,
            signatures: Vec::new(),
        }
    }
}

fn check_operation_count(count: usize) -> std::result::Result<(), ValidationError> {
    if !(MIN_OPERATIONS..=MAX_OPERATIONS).contains(&count) {
        return Err(ValidationError::OperationCount {
            count,
            min: MIN_OPERATIONS,
            max: MAX_OPERATIONS,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for unsigned [`Transaction`] instances.
///
/// # Usage
///
/// ```rust
/// use lumen_sdk::{Account, Keypair, Network, Operation, TransactionBuilder};
/// use lumen_sdk::transaction::{asset, Memo};
///
/// let source = Keypair::random();
/// let dest = Keypair::random();
/// let account = Account::new(&source.account_id(), 41).unwrap();
///
/// let tx = TransactionBuilder::new(&account, &Network::testnet())
///     .add_operation(Operation::payment(&dest.account_id(), asset::native(), 10_000_000).unwrap())
///     .memo(Memo::id(7))
///     .set_timeout(300)
///     .build()
///     .unwrap();
///
/// assert_eq!(tx.sequence_number(), 42);
/// assert_eq!(tx.fee(), 100);
/// ```
///
/// The sequence number used is the account's current one plus one. The
/// builder never advances the [`Account`] itself.
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    source: MuxedAccount,
    current_sequence: i64,
    network_id: [u8; 32],
    base_fee: u32,
    operations: Vec<Operation>,
    memo: Memo,
    preconditions: Preconditions,
    soroban_data: Option<xdr::SorobanTransactionData>,
}

impl TransactionBuilder {
    /// Defaults: base fee 100 stroops, no memo, no preconditions.
    pub fn new(account: &Account, network: &Network) -> Self {
        Self {
            source: *account.muxed_account(),
            current_sequence: account.sequence_number(),
            network_id: network.network_id(),
            base_fee: BASE_FEE,
            operations: Vec::new(),
            memo: Memo::none(),
            preconditions: Preconditions::default(),
            soroban_data: None,
        }
    }

    /// Maximum fee per operation, in stroops.
    pub fn base_fee(mut self, base_fee: u32) -> Self {
        self.base_fee = base_fee;
        self
    }

    pub fn add_operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn add_operations(mut self, operations: impl IntoIterator<Item = Operation>) -> Self {
        self.operations.extend(operations);
        self
    }

    pub fn memo(mut self, memo: Memo) -> Self {
        self.memo = memo;
        self
    }

    /// Unix-second window; a `max_time` of zero leaves it open-ended.
    pub fn time_bounds(mut self, min_time: u64, max_time: u64) -> Self {
        self.preconditions.time_bounds = Some(time_window(min_time, max_time));
        self
    }

    /// Valid until `seconds` from now. Zero means no upper bound. Keeps a
    /// lower bound set earlier through [`TransactionBuilder::time_bounds`].
    pub fn set_timeout(mut self, seconds: u64) -> Self {
        let min_time = self
            .preconditions
            .time_bounds
            .as_ref()
            .map_or(0, |tb| tb.min_time.0);
        let max_time = if seconds == 0 {
            0
        } else {
            (Utc::now().timestamp().max(0) as u64).saturating_add(seconds)
        };
        self.preconditions.time_bounds = Some(time_window(min_time, max_time));
        self
    }

    /// Ledger-sequence window; a `max_ledger` of zero leaves it open-ended.
    pub fn ledger_bounds(mut self, min_ledger: u32, max_ledger: u32) -> Self {
        self.preconditions.ledger_bounds = Some(xdr::LedgerBounds {
            min_ledger,
            max_ledger,
        });
        self
    }

    pub fn min_sequence_number(mut self, sequence: i64) -> Self {
        self.preconditions.min_sequence_number = Some(sequence);
        self
    }

    pub fn min_sequence_age(mut self, seconds: u64) -> Self {
        self.preconditions.min_sequence_age = seconds;
        self
    }

    pub fn min_sequence_ledger_gap(mut self, ledgers: u32) -> Self {
        self.preconditions.min_sequence_ledger_gap = ledgers;
        self
    }

    /// See [`super::parse_signer_key`].
    pub fn add_extra_signer(mut self, signer: xdr::SignerKey) -> Self {
        self.preconditions.extra_signers.push(signer);
        self
    }

    /// Attaches resources for a Soroban operation. Its resource fee is
    /// added on top of the per-operation fee.
    pub fn soroban_data(mut self, data: xdr::SorobanTransactionData) -> Self {
        self.soroban_data = Some(data);
        self
    }

    /// Consumes the builder and produces an unsigned [`Transaction`].
    pub fn build(self) -> Result<Transaction, ValidationError> {
        let count = self.operations.len();
        check_operation_count(count)?;
        if count > 1 && self.operations.iter().any(Operation::is_soroban) {
            return Err(ValidationError::InvalidField(
                "a Soroban operation must be the only operation in its transaction".to_string(),
            ));
        }
        if self.base_fee < BASE_FEE {
            return Err(ValidationError::BaseFeeTooLow {
                base_fee: i64::from(self.base_fee),
                minimum: i64::from(BASE_FEE),
            });
        }
        for op in &self.operations {
            op.validate()?;
        }
        let preconditions = self.preconditions.to_xdr()?;

        let fee = self.total_fee(count)?;
        let sequence_number = self.current_sequence.checked_add(1).ok_or_else(|| {
            ValidationError::InvalidField("sequence number overflow".to_string())
        })?;

        tracing::debug!(
            source = %self.source,
            sequence_number,
            operations = count,
            fee,
            "transaction built"
        );

        Ok(Transaction {
            source_account: self.source,
            fee,
            sequence_number,
            preconditions,
            memo: self.memo,
            operations: self.operations,
            soroban_data: self.soroban_data,
            network_id: self.network_id,
            signatures: Vec::new(),
        })
    }

    /// `base_fee × operations + resource_fee`, all checked.
    fn total_fee(&self, count: usize) -> Result<u32, ValidationError> {
        let resource_fee = self.soroban_data.as_ref().map_or(0, |d| d.resource_fee);
        if resource_fee < 0 {
            return Err(ValidationError::NegativeFee(resource_fee));
        }
        let fee = i64::from(self.base_fee)
            .checked_mul(count as i64)
            .and_then(|f| f.checked_add(resource_fee))
            .ok_or_else(|| ValidationError::FeeOverflow("transaction fee".to_string()))?;
        u32::try_from(fee).map_err(|_| {
            ValidationError::FeeOverflow(format!("transaction fee {fee} does not fit in 32 bits"))
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
