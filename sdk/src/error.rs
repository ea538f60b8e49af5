//! Error types shared by every public API in the SDK.
//!
//! The split mirrors where a failure comes from: [`ValidationError`] for
//! input we reject before any network call, and [`Error`] for everything
//! that can go wrong afterwards (protocol errors, undecodable responses,
//! flaky transport).

use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Malformed input caught synchronously. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A strkey (`G…`, `M…`, `S…`, `C…`, …) failed to decode.
    #[error("invalid address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    /// Operation count outside `[1, 100]`.
    #[error("transaction must have between {min} and {max} operations, got {count}")]
    OperationCount { count: usize, min: usize, max: usize },

    /// Base fee below the network floor.
    #[error("base fee {base_fee} is below the network minimum of {minimum}")]
    BaseFeeTooLow { base_fee: i64, minimum: i64 },

    /// Fee-bump base fee undercuts the inner transaction's per-operation rate.
    #[error("base fee {base_fee} is lower than the inner transaction's rate of {inner_rate}")]
    BaseFeeBelowInnerRate { base_fee: i64, inner_rate: i64 },

    /// Fee-bump total fee below the inner transaction's fee.
    #[error("fee {fee} is lower than the inner transaction's fee of {inner_fee}")]
    FeeBelowInnerFee { fee: i64, inner_fee: i64 },

    #[error("fee must not be negative, got {0}")]
    NegativeFee(i64),

    /// Fee arithmetic left the representable range.
    #[error("fee overflow: {0}")]
    FeeOverflow(String),

    #[error("memo text is {len} bytes, the limit is {max}")]
    MemoTooLong { len: usize, max: usize },

    #[error("at most {max} extra signers are allowed, got {count}")]
    TooManyExtraSigners { count: usize, max: usize },

    #[error("an envelope holds at most {max} signatures")]
    TooManySignatures { max: usize },

    /// A signature handed to `add_signature` does not verify.
    #[error("signature does not verify against {public_key}")]
    InvalidSignature { public_key: String },

    #[error("max attempts must be greater than zero")]
    InvalidMaxAttempts,

    /// Catch-all for field-level problems (bad asset code, oversized data entry, …).
    #[error("{0}")]
    InvalidField(String),
}

/// Every failure the SDK can surface.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A preparation step was asked to handle something that is not a
    /// single-operation Soroban transaction.
    #[error("transaction type error: {0}")]
    TransactionType(String),

    /// Simulation reached the node but the node reported a logical failure.
    #[error("simulation failed at ledger {latest_ledger}: {message}")]
    PrepareTransaction { message: String, latest_ledger: u32 },

    /// A response was missing a required field or had an unexpected shape.
    #[error("unexpected RPC response: {0}")]
    ResponseDecode(String),

    /// The node answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    RpcProtocol {
        code: i64,
        message: String,
        data: Option<serde_json::Value>,
    },

    /// Connection failures, timeouts and 5xx responses.
    #[error("transient network error: {0}")]
    TransientNetwork(String),

    /// A value did not encode, or bytes did not decode, as Stellar XDR.
    #[error("xdr: {0}")]
    Xdr(#[from] stellar_xdr::curr::Error),
}

impl Error {
    /// `true` for failures that may succeed if the same call is repeated.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientNetwork(_))
    }
}
