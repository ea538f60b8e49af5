//! # RPC Module
//!
//! Talking to a Soroban RPC node: JSON-RPC framing and typed payloads
//! ([`types`]), the HTTP transport ([`transport`]), and the preparation
//! pipeline that simulates, assembles, submits and polls contract calls
//! ([`pipeline`]).

pub mod pipeline;
pub mod transport;
pub mod types;

pub use pipeline::{assemble_transaction, strategy, PreparationPipeline, Sleeper, TokioSleeper};
pub use transport::{HttpTransport, RpcTransport};
pub use types::{
    AuthMode, GetHealthResponse, GetLatestLedgerResponse, GetLedgerEntriesResponse,
    GetNetworkResponse, GetTransactionResponse, LedgerEntryResult, RpcError, RpcMethod,
    RpcRequest, RpcResponse, SendStatus, SendTransactionResponse, SimulateHostFunctionResult,
    SimulateTransactionResponse, SimulationOptions, TransactionStatus,
};
