// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Lumen SDK: Core Library
//!
//! Client-side plumbing for the Stellar network: build a transaction, sign
//! it, optionally wrap it in a fee bump, and, for Soroban contract calls, walk
//! it through the simulate → assemble → submit → poll pipeline against an
//! RPC node.
//!
//! ## Architecture
//!
//! - **config**: Protocol constants, network passphrases, RPC settings.
//! - **error**: The error taxonomy every public API returns.
//! - **crypto**: Ed25519 keys and SHA-256. Thin wrappers, nothing clever.
//! - **strkey**: `G…`/`S…`/`M…`/`C…` string keys with checksums.
//! - **xdr**: Re-export of `stellar_xdr::curr`, the wire types everything
//!   on the network is encoded as.
//! - **transaction**: Operations, memos, preconditions, the transaction
//!   model, its signing payload, envelopes, and fee bumps.
//! - **rpc**: JSON-RPC framing, the HTTP transport, and the preparation
//!   pipeline for contract-invoking transactions.
//! - **logging**: Opt-in `tracing` subscriber setup.
//!
//! ## Ground rules
//!
//! 1. Validation happens before anything touches the network.
//! 2. A built transaction only ever grows signatures. Re-preparation makes a
//!    new value; it never edits yours.
//! 3. Every fee is integer stroops with checked arithmetic.

pub mod config;
pub mod crypto;
pub mod error;
pub mod logging;
pub mod rpc;
pub mod strkey;
pub mod transaction;

pub use stellar_xdr::curr as xdr;

pub use config::Network;
pub use crypto::{Keypair, PublicKey};
pub use error::{Error, Result, ValidationError};
pub use rpc::{PreparationPipeline, RpcTransport};
pub use transaction::{
    Account, Envelope, FeeBumpTransaction, Memo, Operation, Transaction, TransactionBuilder,
    TransactionEnvelope,
};
