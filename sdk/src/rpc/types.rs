//! # JSON-RPC API Definitions
//!
//! Type-safe definitions for the subset of the Soroban RPC API the SDK
//! consumes. This module defines the request/response framing and the typed
//! result payloads; the HTTP side lives in [`super::transport`].
//!
//! ## Method Index
//!
//! | Method                  | Description                                   |
//! |-------------------------|-----------------------------------------------|
//! | `simulateTransaction`   | Dry-run a transaction, get footprint and fees |
//! | `sendTransaction`       | Submit a signed envelope                      |
//! | `getTransaction`        | Look up a submitted transaction by hash       |
//! | `getHealth`             | Node liveness and retention window            |
//! | `getNetwork`            | Passphrase and protocol version               |
//! | `getLatestLedger`       | Most recent closed ledger                     |
//! | `getLedgerEntries`      | Raw ledger entries by key                     |
//!
//! All XDR-valued fields travel as base64 strings and are decoded lazily by
//! the accessor methods, so a response with one odd field still
//! deserializes.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

use crate::config::xdr_decode_limits;
use crate::error::{Error, Result};
use crate::transaction::Account;
use crate::xdr::{self, ReadXdr};

// ---------------------------------------------------------------------------
// RPC Method Enumeration
// ---------------------------------------------------------------------------

/// Supported JSON-RPC methods. Requests carry the method as a plain
/// string, taken from [`RpcMethod::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcMethod {
    SimulateTransaction,
    SendTransaction,
    GetTransaction,
    GetHealth,
    GetNetwork,
    GetLatestLedger,
    GetLedgerEntries,
}

impl RpcMethod {
    /// The wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SimulateTransaction => "simulateTransaction",
            Self::SendTransaction => "sendTransaction",
            Self::GetTransaction => "getTransaction",
            Self::GetHealth => "getHealth",
            Self::GetNetwork => "getNetwork",
            Self::GetLatestLedger => "getLatestLedger",
            Self::GetLedgerEntries => "getLedgerEntries",
        }
    }
}

impl std::fmt::Display for RpcMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RPC Request / Response
// ---------------------------------------------------------------------------

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    /// Always "2.0".
    pub jsonrpc: String,
    /// Echoed back in the response.
    pub id: Value,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl RpcRequest {
    /// A request with a fresh UUID as its id. `Value::Null` params are
    /// left off the wire.
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: Value::String(uuid::Uuid::new_v4().to_string()),
            method: method.into(),
            params: (!params.is_null()).then_some(params),
        }
    }
}

/// A JSON-RPC 2.0 response.
///
/// Exactly one of `result` or `error` will be set by a conforming node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    /// Unwraps the envelope: the error object becomes [`Error::RpcProtocol`],
    /// a response with neither field becomes [`Error::ResponseDecode`].
    pub fn into_result(self) -> Result<Value> {
        match (self.error, self.result) {
            (Some(err), _) => Err(err.into()),
            (None, Some(result)) => Ok(result),
            (None, None) => Err(Error::ResponseDecode(
                "response has neither result nor error".to_string(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// RPC Errors
// ---------------------------------------------------------------------------

/// JSON-RPC 2.0 error object.
///
/// Standard codes:
/// - `-32700`: Parse error
/// - `-32600`: Invalid request
/// - `-32601`: Method not found
/// - `-32602`: Invalid params
/// - `-32603`: Internal error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl From<RpcError> for Error {
    fn from(err: RpcError) -> Self {
        Error::RpcProtocol {
            code: err.code,
            message: err.message,
            data: err.data,
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Nodes have sent some integer fields both as JSON numbers and as
/// strings across releases; accept either.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(i64),
        Str(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Num(n)) => Ok(Some(n)),
        Some(Raw::Str(s)) if s.is_empty() => Ok(None),
        Some(Raw::Str(s)) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

fn decode_field<T: ReadXdr>(name: &str, b64: &str) -> Result<T> {
    T::from_xdr_base64(b64, xdr_decode_limits()).map_err(|e| Error::ResponseDecode(format!("{name}: {e}")))
}

/// Deserializes a method result, mapping shape mismatches to
/// [`Error::ResponseDecode`].
pub fn parse_result<T: for<'de> Deserialize<'de>>(method: RpcMethod, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| Error::ResponseDecode(format!("{method}: {e}")))
}

// ---------------------------------------------------------------------------
// simulateTransaction
// ---------------------------------------------------------------------------

/// How simulation treats authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Check the auth entries already present.
    Enforce,
    /// Ignore present entries and record what the call needs.
    Record,
    /// Record, also allowing non-root authorization.
    RecordAllowNonroot,
}

/// Optional hints for `simulateTransaction`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationOptions {
    /// Extra CPU instructions added on top of the simulated budget.
    pub instruction_leeway: Option<u64>,
    pub auth_mode: Option<AuthMode>,
}

impl SimulationOptions {
    pub fn with_instruction_leeway(mut self, leeway: u64) -> Self {
        self.instruction_leeway = Some(leeway);
        self
    }

    pub fn with_auth_mode(mut self, mode: AuthMode) -> Self {
        self.auth_mode = Some(mode);
        self
    }

    /// Builds the `params` object for an envelope in base64.
    pub fn to_params(&self, transaction: &str) -> Value {
        let mut params = json!({ "transaction": transaction });
        if let Some(leeway) = self.instruction_leeway {
            params["resourceConfig"] = json!({ "instructionLeeway": leeway });
        }
        if let Some(mode) = self.auth_mode {
            params["authMode"] = json!(mode);
        }
        params
    }
}

/// Per-operation outcome of a simulation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulateHostFunctionResult {
    /// Base64 `SorobanAuthorizationEntry` values.
    #[serde(default)]
    pub auth: Vec<String>,
    /// Base64 `ScVal` return value.
    #[serde(default)]
    pub xdr: String,
}

impl SimulateHostFunctionResult {
    pub fn auth_entries(&self) -> Result<Vec<xdr::SorobanAuthorizationEntry>> {
        self.auth
            .iter()
            .map(|entry| decode_field("auth", entry))
            .collect()
    }
}

/// Present when the footprint touches archived entries that must be
/// restored first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestorePreamble {
    pub transaction_data: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub min_resource_fee: Option<i64>,
}

impl RestorePreamble {
    pub fn soroban_data(&self) -> Result<xdr::SorobanTransactionData> {
        decode_field("restorePreamble.transactionData", &self.transaction_data)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateTransactionResponse {
    #[serde(default)]
    pub latest_ledger: u32,
    #[serde(default, deserialize_with = "string_or_number")]
    pub min_resource_fee: Option<i64>,
    /// Base64 `SorobanTransactionData`.
    #[serde(default)]
    pub transaction_data: Option<String>,
    #[serde(default)]
    pub results: Vec<SimulateHostFunctionResult>,
    /// Set when the host function failed; the other fields are then
    /// mostly empty.
    #[serde(default)]
    pub error: Option<String>,
    /// Base64 diagnostic events.
    #[serde(default)]
    pub events: Vec<String>,
    #[serde(default)]
    pub restore_preamble: Option<RestorePreamble>,
}

impl SimulateTransactionResponse {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn needs_restore(&self) -> bool {
        self.restore_preamble.is_some()
    }

    /// The decoded resource data, or `None` when the node sent none.
    pub fn soroban_data(&self) -> Result<Option<xdr::SorobanTransactionData>> {
        self.transaction_data
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| decode_field("transactionData", s))
            .transpose()
    }
}

// ---------------------------------------------------------------------------
// sendTransaction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SendStatus {
    /// Accepted into the node's queue.
    Pending,
    /// Already seen.
    Duplicate,
    /// Queue full or fee too low right now.
    TryAgainLater,
    /// Rejected; see `error_result_xdr`.
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTransactionResponse {
    pub status: SendStatus,
    pub hash: String,
    #[serde(default)]
    pub latest_ledger: u32,
    #[serde(default, deserialize_with = "string_or_number")]
    pub latest_ledger_close_time: Option<i64>,
    /// Base64 `TransactionResult`, only with [`SendStatus::Error`].
    #[serde(default)]
    pub error_result_xdr: Option<String>,
    #[serde(default)]
    pub diagnostic_events_xdr: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// getTransaction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Success,
    /// Not (yet) in a ledger the node retains.
    NotFound,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTransactionResponse {
    pub status: TransactionStatus,
    #[serde(default)]
    pub latest_ledger: u32,
    #[serde(default, deserialize_with = "string_or_number")]
    pub latest_ledger_close_time: Option<i64>,
    #[serde(default)]
    pub oldest_ledger: u32,
    #[serde(default, deserialize_with = "string_or_number")]
    pub oldest_ledger_close_time: Option<i64>,
    #[serde(default)]
    pub ledger: Option<u32>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub application_order: Option<u32>,
    #[serde(default)]
    pub fee_bump: Option<bool>,
    #[serde(default)]
    pub envelope_xdr: Option<String>,
    #[serde(default)]
    pub result_xdr: Option<String>,
    #[serde(default)]
    pub result_meta_xdr: Option<String>,
}

impl GetTransactionResponse {
    pub fn is_found(&self) -> bool {
        self.status != TransactionStatus::NotFound
    }
}

// ---------------------------------------------------------------------------
// Node information
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetHealthResponse {
    pub status: String,
    #[serde(default)]
    pub latest_ledger: Option<u32>,
    #[serde(default)]
    pub oldest_ledger: Option<u32>,
    #[serde(default)]
    pub ledger_retention_window: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetNetworkResponse {
    pub passphrase: String,
    pub protocol_version: u32,
    #[serde(default)]
    pub friendbot_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetLatestLedgerResponse {
    pub id: String,
    pub protocol_version: u32,
    pub sequence: u32,
}

// ---------------------------------------------------------------------------
// getLedgerEntries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntryResult {
    /// Base64 `LedgerKey`.
    pub key: String,
    /// Base64 `LedgerEntryData`.
    pub xdr: String,
    #[serde(default)]
    pub last_modified_ledger_seq: Option<u32>,
    #[serde(default)]
    pub live_until_ledger_seq: Option<u32>,
}

impl LedgerEntryResult {
    pub fn data(&self) -> Result<xdr::LedgerEntryData> {
        decode_field("ledger entry", &self.xdr)
    }

    /// The account id and sequence number of an account entry.
    pub fn account(&self) -> Result<Account> {
        match self.data()? {
            xdr::LedgerEntryData::Account(entry) => Ok(Account::from(&entry)),
            other => Err(Error::ResponseDecode(format!(
                "expected an account entry, got {}",
                other.name()
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetLedgerEntriesResponse {
    #[serde(default)]
    pub entries: Option<Vec<LedgerEntryResult>>,
    #[serde(default)]
    pub latest_ledger: u32,
}

impl GetLedgerEntriesResponse {
    pub fn entries(&self) -> &[LedgerEntryResult] {
        self.entries.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;
    use crate::xdr::{Limits, WriteXdr};

    fn ledger_entry(data: xdr::LedgerEntryData) -> LedgerEntryResult {
        LedgerEntryResult {
            key: String::new(),
            xdr: data.to_xdr_base64(Limits::none()).unwrap(),
            last_modified_ledger_seq: None,
            live_until_ledger_seq: None,
        }
    }

    #[test]
    fn request_omits_null_params() {
        let req = RpcRequest::new(RpcMethod::GetHealth.as_str(), Value::Null);
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["jsonrpc"], "2.0");
        assert_eq!(v["method"], "getHealth");
        assert!(v.get("params").is_none());
        assert!(v["id"].as_str().is_some_and(|id| !id.is_empty()));
    }

    #[test]
    fn request_ids_are_unique() {
        let a = RpcRequest::new("getHealth", Value::Null);
        let b = RpcRequest::new("getHealth", Value::Null);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn error_object_becomes_protocol_error() {
        let resp: RpcResponse = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": "1",
            "error": { "code": -32602, "message": "invalid params", "data": "bad xdr" }
        }))
        .unwrap();
        match resp.into_result() {
            Err(Error::RpcProtocol {
                code,
                message,
                data,
            }) => {
                assert_eq!(code, -32602);
                assert_eq!(message, "invalid params");
                assert_eq!(data, Some(json!("bad xdr")));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn empty_response_is_decode_error() {
        let resp: RpcResponse =
            serde_json::from_value(json!({ "jsonrpc": "2.0", "id": "1" })).unwrap();
        assert!(matches!(resp.into_result(), Err(Error::ResponseDecode(_))));
    }

    #[test]
    fn min_resource_fee_accepts_string_or_number() {
        let a: SimulateTransactionResponse =
            serde_json::from_value(json!({ "latestLedger": 10, "minResourceFee": "1234" }))
                .unwrap();
        let b: SimulateTransactionResponse =
            serde_json::from_value(json!({ "latestLedger": 10, "minResourceFee": 1234 })).unwrap();
        let c: SimulateTransactionResponse =
            serde_json::from_value(json!({ "latestLedger": 10 })).unwrap();
        assert_eq!(a.min_resource_fee, Some(1234));
        assert_eq!(b.min_resource_fee, Some(1234));
        assert_eq!(c.min_resource_fee, None);
    }

    #[test]
    fn simulation_error_is_surfaced() {
        let sim: SimulateTransactionResponse = serde_json::from_value(json!({
            "latestLedger": 99,
            "error": "HostError: Error(Contract, #1)",
            "events": ["AAAA"]
        }))
        .unwrap();
        assert!(sim.is_error());
        assert!(sim.results.is_empty());
        assert_eq!(sim.soroban_data().unwrap(), None);
    }

    #[test]
    fn bad_transaction_data_is_decode_error() {
        let sim = SimulateTransactionResponse {
            transaction_data: Some("not base64!".to_string()),
            ..Default::default()
        };
        assert!(matches!(sim.soroban_data(), Err(Error::ResponseDecode(_))));
    }

    #[test]
    fn simulation_options_params() {
        let params = SimulationOptions::default()
            .with_instruction_leeway(1_000)
            .with_auth_mode(AuthMode::RecordAllowNonroot)
            .to_params("AAAA");
        assert_eq!(
            params,
            json!({
                "transaction": "AAAA",
                "resourceConfig": { "instructionLeeway": 1000 },
                "authMode": "record_allow_nonroot"
            })
        );
        assert_eq!(
            SimulationOptions::default().to_params("AAAA"),
            json!({ "transaction": "AAAA" })
        );
    }

    #[test]
    fn send_and_get_statuses() {
        let send: SendTransactionResponse = serde_json::from_value(json!({
            "status": "TRY_AGAIN_LATER",
            "hash": "ab",
            "latestLedger": 5,
            "latestLedgerCloseTime": "1700000000"
        }))
        .unwrap();
        assert_eq!(send.status, SendStatus::TryAgainLater);
        assert_eq!(send.latest_ledger_close_time, Some(1_700_000_000));

        let get: GetTransactionResponse = serde_json::from_value(json!({
            "status": "NOT_FOUND",
            "latestLedger": 5,
            "oldestLedger": 1
        }))
        .unwrap();
        assert!(!get.is_found());
    }

    #[test]
    fn method_wire_names() {
        assert_eq!(RpcMethod::SimulateTransaction.as_str(), "simulateTransaction");
        assert_eq!(RpcMethod::GetLedgerEntries.to_string(), "getLedgerEntries");
        let req = RpcRequest::new(RpcMethod::SendTransaction.as_str(), json!({}));
        assert_eq!(serde_json::to_value(&req).unwrap()["method"], "sendTransaction");
    }

    #[test]
    fn account_entry_decodes() {
        let kp = Keypair::from_raw_seed(&[4u8; 32]);
        let entry = ledger_entry(xdr::LedgerEntryData::Account(xdr::AccountEntry {
            account_id: (&kp.public_key()).into(),
            balance: 10_000_000,
            seq_num: xdr::SequenceNumber(123_456),
            num_sub_entries: 0,
            inflation_dest: None,
            flags: 0,
            home_domain: xdr::String32(xdr::StringM::default()),
            thresholds: xdr::Thresholds([1, 0, 0, 0]),
            signers: xdr::VecM::default(),
            ext: xdr::AccountEntryExt::V0,
        }));
        let account = entry.account().unwrap();
        assert_eq!(account.account_id(), kp.account_id());
        assert_eq!(account.sequence_number(), 123_456);
    }

    #[test]
    fn non_account_entry_rejected() {
        let entry = ledger_entry(xdr::LedgerEntryData::Ttl(xdr::TtlEntry {
            key_hash: xdr::Hash([0u8; 32]),
            live_until_ledger_seq: 5,
        }));
        assert!(matches!(entry.account(), Err(Error::ResponseDecode(_))));

        let truncated = LedgerEntryResult {
            key: String::new(),
            xdr: "AAAAAA==".to_string(),
            last_modified_ledger_seq: None,
            live_until_ledger_seq: None,
        };
        assert!(matches!(truncated.account(), Err(Error::ResponseDecode(_))));
    }
}
