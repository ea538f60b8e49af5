//! # Protocol Configuration & Constants
//!
//! Every fee floor, limit and default timing the SDK relies on lives here.
//! Most of these are fixed by the network itself; changing them locally only
//! means the network will reject what you build.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use stellar_xdr::curr::Limits;

use crate::crypto::hash::sha256_array;

// ---------------------------------------------------------------------------
// Network Passphrases
// ---------------------------------------------------------------------------

/// Public network. Mistakes here cost real lumens.
pub const PUBLIC_NETWORK_PASSPHRASE: &str = "Public Global Stellar Network ; September 2015";

/// SDF test network.
pub const TESTNET_PASSPHRASE: &str = "Test SDF Network ; September 2015";

/// SDF future network, where protocol upgrades land first.
pub const FUTURENET_PASSPHRASE: &str = "Test SDF Future Network ; October 2022";

/// Default passphrase of a standalone quickstart node.
pub const STANDALONE_PASSPHRASE: &str = "Standalone Network ; February 2017";

// ---------------------------------------------------------------------------
// Fee Parameters
// ---------------------------------------------------------------------------

/// Network minimum base fee per operation, in stroops.
pub const BASE_FEE: u32 = 100;

/// One lumen expressed in stroops.
pub const STROOPS_PER_LUMEN: i64 = 10_000_000;

// ---------------------------------------------------------------------------
// Transaction Limits
// ---------------------------------------------------------------------------

/// A transaction must carry at least one operation.
pub const MIN_OPERATIONS: usize = 1;

/// And at most this many.
pub const MAX_OPERATIONS: usize = 100;

/// `MEMO_TEXT` is a `string<28>` on the wire. Bytes, not characters.
pub const MEMO_TEXT_MAX_BYTES: usize = 28;

/// Extra signers allowed in `PreconditionsV2`.
pub const MAX_EXTRA_SIGNERS: usize = 2;

/// Signatures an envelope may carry.
pub const MAX_SIGNATURES: usize = 20;

/// Payload bound of an `ED25519_SIGNED_PAYLOAD` signer key.
pub const MAX_SIGNED_PAYLOAD_BYTES: usize = 64;

// ---------------------------------------------------------------------------
// XDR Decoding
// ---------------------------------------------------------------------------

/// Nesting depth allowed when decoding untrusted XDR (contract values and
/// auth invocations are recursive).
pub const XDR_MAX_DEPTH: u32 = 500;

/// Byte budget for decoding one untrusted XDR value.
pub const XDR_MAX_LEN: usize = 4 * 1024 * 1024;

/// Limits applied to every XDR value that arrives from outside: envelopes
/// handed to [`crate::TransactionEnvelope`] and fields of RPC responses.
pub fn xdr_decode_limits() -> Limits {
    Limits {
        depth: XDR_MAX_DEPTH,
        len: XDR_MAX_LEN,
    }
}

// ---------------------------------------------------------------------------
// RPC / Polling Defaults
// ---------------------------------------------------------------------------

/// Attempts `poll_transaction` makes when the caller has no opinion.
pub const DEFAULT_POLL_ATTEMPTS: u32 = 30;

/// Pause between poll attempts. Ledgers close every ~5s, so 1s is plenty.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Per-request HTTP timeout.
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(30);

/// Default RPC endpoint, a local quickstart node.
pub const DEFAULT_RPC_URL: &str = "http://localhost:8000/soroban/rpc";

// ---------------------------------------------------------------------------
// Network
// ---------------------------------------------------------------------------

/// A Stellar network, identified by its passphrase.
///
/// Signatures commit to `sha256(passphrase)`, so a transaction signed for
/// testnet is worthless on the public network and vice versa.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Network {
    passphrase: String,
}

impl Network {
    /// Creates a network from an arbitrary passphrase.
    pub fn new(passphrase: impl Into<String>) -> Self {
        Self {
            passphrase: passphrase.into(),
        }
    }

    pub fn public() -> Self {
        Self::new(PUBLIC_NETWORK_PASSPHRASE)
    }

    pub fn testnet() -> Self {
        Self::new(TESTNET_PASSPHRASE)
    }

    pub fn futurenet() -> Self {
        Self::new(FUTURENET_PASSPHRASE)
    }

    pub fn standalone() -> Self {
        Self::new(STANDALONE_PASSPHRASE)
    }

    pub fn passphrase(&self) -> &str {
        &self.passphrase
    }

    /// The 32-byte network id: `sha256(passphrase)`.
    pub fn network_id(&self) -> [u8; 32] {
        sha256_array(self.passphrase.as_bytes())
    }
}

// ---------------------------------------------------------------------------
// RpcConfig
// ---------------------------------------------------------------------------

/// Settings for talking to an RPC node.
///
/// Deserializable so it can live inside an application's own config file;
/// every field has a default. [`RpcConfig::from_env`] layers `LUMEN_*`
/// environment variables on top.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    /// JSON-RPC endpoint URL.
    pub url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Attempts made by `poll_transaction`.
    pub poll_max_attempts: u32,
    /// Fixed pause between poll attempts, in milliseconds.
    pub poll_interval_ms: u64,
    /// Extra HTTP headers sent with every request (API keys and the like).
    pub headers: HashMap<String, String>,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_RPC_URL.to_string(),
            timeout_secs: DEFAULT_RPC_TIMEOUT.as_secs(),
            poll_max_attempts: DEFAULT_POLL_ATTEMPTS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            headers: HashMap::new(),
        }
    }
}

impl RpcConfig {
    /// Config pointing at `url`, defaults elsewhere.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `LUMEN_RPC_URL`, `LUMEN_RPC_TIMEOUT_SECS`,
    /// `LUMEN_POLL_MAX_ATTEMPTS` and `LUMEN_POLL_INTERVAL_MS`.
    ///
    /// Unparseable numeric values are ignored rather than treated as fatal;
    /// the default stays in place.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("LUMEN_RPC_URL") {
            self.url = url;
        }
        if let Some(secs) = lookup("LUMEN_RPC_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.timeout_secs = secs;
        }
        if let Some(n) = lookup("LUMEN_POLL_MAX_ATTEMPTS").and_then(|v| v.parse().ok()) {
            self.poll_max_attempts = n;
        }
        if let Some(ms) = lookup("LUMEN_POLL_INTERVAL_MS").and_then(|v| v.parse().ok()) {
            self.poll_interval_ms = ms;
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
