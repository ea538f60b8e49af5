//! # Transaction Module
//!
//! Construction, signing and fee bumping of Stellar transactions. Every
//! payment, trust line change and contract call reaches the network as a
//! [`Transaction`] inside an envelope.
//!
//! ## Architecture
//!
//! ```text
//! account.rs        Account (source + sequence) and muxed addresses
//! asset.rs          Native and issued assets
//! memo.rs           Memo with the 28-byte text limit
//! preconditions.rs  Time/ledger bounds, sequence conditions, extra signers
//! soroban.rs        Contract values, ledger keys, resource data
//! operation.rs      Validated operations and their convenience constructors
//! builder.rs        Transaction and the fluent TransactionBuilder
//! signing.rs        Signature payload, hashing, the Envelope trait
//! fee_bump.rs       FeeBumpTransaction
//! envelope.rs       Decoding envelopes of either kind
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Build**: [`TransactionBuilder`] validates and produces an unsigned
//!    transaction bound to one network.
//! 2. **Prepare** (Soroban only): [`crate::rpc::PreparationPipeline`]
//!    simulates and returns a re-priced copy.
//! 3. **Sign**: [`Envelope::sign`] or [`sign_transaction`], once per key.
//! 4. **Bump** (optional): wrap in a [`FeeBumpTransaction`] and sign that.
//! 5. **Submit**: send the envelope's base64 XDR.
//!
//! The wire types themselves come from [`crate::xdr`] (`stellar-xdr`); the
//! types here hold the rules the wire format cannot express.
//!
//! Amounts are `i64` stroops and fees are integer stroops throughout. No
//! floating point anywhere near monetary values.

pub mod account;
pub mod asset;
pub mod builder;
pub mod envelope;
pub mod fee_bump;
pub mod memo;
pub mod operation;
pub mod preconditions;
pub mod signing;
pub mod soroban;

pub use account::{Account, MuxedAccount};
pub use builder::{Transaction, TransactionBuilder};
pub use envelope::TransactionEnvelope;
pub use fee_bump::FeeBumpTransaction;
pub use memo::Memo;
pub use operation::Operation;
pub use preconditions::{parse_signer_key, Preconditions};
pub use signing::{sign_transaction, Envelope};
