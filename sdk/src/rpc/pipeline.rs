//! # Soroban Preparation Pipeline
//!
//! Contract-invoking transactions cannot be priced or authorized by hand:
//! the footprint, resource budget and auth entries come from a simulation
//! run by the node. The pipeline drives that round trip.
//!
//! ```text
//!  build ──▶ simulate ──▶ assemble ──▶ sign ──▶ submit ──▶ poll
//!             (RPC)        (pure)               (RPC)      (RPC, bounded)
//! ```
//!
//! - **simulate** never mutates its input and does not fail on a logical
//!   simulation error; that comes back in the response.
//! - **assemble** is a pure function ([`assemble_transaction`]): it returns
//!   a new, unsigned transaction carrying the simulated fee, auth and
//!   resource data.
//! - **prepare** is simulate + assemble, turning a simulation error into
//!   [`Error::PrepareTransaction`].
//! - **poll** is the single place where transient failures are swallowed:
//!   it rides out the gap between submission and ledger inclusion with a
//!   bounded number of attempts and a caller-chosen sleep between them.
//!
//! Everything goes through one [`RpcTransport`]; the pipeline holds no
//! other state.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::config::RpcConfig;
use crate::crypto::PublicKey;
use crate::error::{Error, Result, ValidationError};
use crate::transaction::{soroban, Account, Envelope, Transaction, TransactionEnvelope};
use crate::xdr::{self, Limits, WriteXdr};

use super::transport::{HttpTransport, RpcTransport};
use super::types::{
    parse_result, GetHealthResponse, GetLatestLedgerResponse, GetLedgerEntriesResponse,
    GetNetworkResponse, GetTransactionResponse, RpcMethod, SendTransactionResponse,
    SimulateTransactionResponse, SimulationOptions, TransactionStatus,
};

// ---------------------------------------------------------------------------
// Sleeping
// ---------------------------------------------------------------------------

/// The delay primitive used between poll attempts. Swap it out to poll
/// without real time passing.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Ready-made poll sleep strategies. A strategy maps the 1-based number of
/// the attempt that just finished to the pause before the next one.
pub mod strategy {
    use std::time::Duration;

    /// The same pause every time.
    pub fn constant(interval: Duration) -> impl Fn(u32) -> Duration + Send + Sync + Clone {
        move |_| interval
    }

    /// `step × attempt`: 1s, 2s, 3s, … for a one-second step.
    pub fn linear(step: Duration) -> impl Fn(u32) -> Duration + Send + Sync + Clone {
        move |attempt| step.saturating_mul(attempt)
    }

    /// `base × 2^(attempt − 1)`, never above `cap`.
    pub fn exponential(base: Duration, cap: Duration) -> impl Fn(u32) -> Duration + Send + Sync + Clone {
        move |attempt| {
            let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
            base.saturating_mul(factor).min(cap)
        }
    }
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Folds a simulation into `tx`, returning a new unsigned transaction.
///
/// 1. `tx` must be a single Soroban operation.
/// 2. The previous resource fee, if any, is taken out before the new
///    minimum resource fee is added, so re-assembly never double-counts.
/// 3. For an `InvokeHostFunction`, the simulation must carry exactly one
///    result; its auth entries are adopted only when the operation has none
///    of its own.
/// 4. The simulated `transactionData` is required.
///
/// `tx` is left untouched. Its signatures do not carry over, since they
/// would not cover the new body.
pub fn assemble_transaction(
    tx: &Transaction,
    simulation: &SimulateTransactionResponse,
) -> Result<Transaction> {
    ensure_soroban(tx)?;

    let classic_fee = i64::from(tx.fee()) - tx.resource_fee();
    let min_resource_fee = simulation.min_resource_fee.unwrap_or(0);
    if min_resource_fee < 0 {
        return Err(Error::ResponseDecode(format!(
            "negative minResourceFee {min_resource_fee}"
        )));
    }
    let total_fee = classic_fee
        .checked_add(min_resource_fee)
        .and_then(|fee| u32::try_from(fee).ok())
        .ok_or_else(|| {
            ValidationError::FeeOverflow(format!(
                "classic fee {classic_fee} + resource fee {min_resource_fee} does not fit in 32 bits"
            ))
        })?;

    let op = &tx.operations()[0];
    let op = match op.body() {
        xdr::OperationBody::InvokeHostFunction(invoke) => {
            let [result] = simulation.results.as_slice() else {
                return Err(Error::ResponseDecode(format!(
                    "expected exactly one simulation result for invokeHostFunction, got {}",
                    simulation.results.len()
                )));
            };
            if invoke.auth.is_empty() && !result.auth.is_empty() {
                op.with_auth_entries(result.auth_entries()?)?
            } else {
                op.clone()
            }
        }
        _ => op.clone(),
    };

    let soroban_data = simulation.soroban_data()?.ok_or_else(|| {
        Error::ResponseDecode("simulation response has no transactionData".to_string())
    })?;

    tracing::debug!(
        classic_fee,
        min_resource_fee,
        total_fee,
        latest_ledger = simulation.latest_ledger,
        "transaction assembled"
    );

    Ok(tx.reassembled(total_fee, vec![op], soroban_data))
}

fn ensure_soroban(tx: &Transaction) -> Result<()> {
    if tx.is_soroban() {
        return Ok(());
    }
    let kinds: Vec<&str> = tx.operations().iter().map(|op| op.kind_name()).collect();
    Err(Error::TransactionType(format!(
        "expected a single invoke_host_function, extend_footprint_ttl or restore_footprint \
         operation, got [{}]",
        kinds.join(", ")
    )))
}

// ---------------------------------------------------------------------------
// PreparationPipeline
// ---------------------------------------------------------------------------

/// Simulate, assemble, submit and poll against one RPC node.
///
/// Cloning is cheap; clones share the transport.
#[derive(Clone)]
pub struct PreparationPipeline {
    transport: Arc<dyn RpcTransport>,
    sleeper: Arc<dyn Sleeper>,
    poll_max_attempts: u32,
    poll_interval: Duration,
}

impl std::fmt::Debug for PreparationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparationPipeline")
            .field("poll_max_attempts", &self.poll_max_attempts)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

impl PreparationPipeline {
    /// Pipeline over `transport` with the tokio sleeper and default poll
    /// settings.
    pub fn new(transport: Arc<dyn RpcTransport>) -> Self {
        let defaults = RpcConfig::default();
        Self {
            transport,
            sleeper: Arc::new(TokioSleeper),
            poll_max_attempts: defaults.poll_max_attempts,
            poll_interval: defaults.poll_interval(),
        }
    }

    /// Pipeline over an [`HttpTransport`] built from `config`.
    pub fn from_config(config: &RpcConfig) -> Result<Self> {
        let transport = HttpTransport::from_config(config)?;
        Ok(Self::new(Arc::new(transport))
            .with_poll_settings(config.poll_max_attempts, config.poll_interval()))
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Defaults used by [`PreparationPipeline::poll`].
    pub fn with_poll_settings(mut self, max_attempts: u32, interval: Duration) -> Self {
        self.poll_max_attempts = max_attempts;
        self.poll_interval = interval;
        self
    }

    async fn request<T: for<'de> serde::Deserialize<'de>>(
        &self,
        method: RpcMethod,
        params: Value,
    ) -> Result<T> {
        let value = self.transport.call(method.as_str(), params).await?;
        parse_result(method, value)
    }

    // -- Soroban preparation ------------------------------------------------

    /// Runs `tx` through `simulateTransaction`. A failing contract call is
    /// reported in the response's `error` field, not as an `Err`.
    pub async fn simulate(
        &self,
        tx: &Transaction,
        options: Option<SimulationOptions>,
    ) -> Result<SimulateTransactionResponse> {
        ensure_soroban(tx)?;
        let envelope = tx.to_envelope_xdr_base64()?;
        let params = options.unwrap_or_default().to_params(&envelope);
        let response: SimulateTransactionResponse =
            self.request(RpcMethod::SimulateTransaction, params).await?;

        tracing::debug!(
            latest_ledger = response.latest_ledger,
            min_resource_fee = response.min_resource_fee,
            results = response.results.len(),
            error = response.error.as_deref(),
            needs_restore = response.needs_restore(),
            "simulation complete"
        );
        Ok(response)
    }

    /// Pure; see [`assemble_transaction`].
    pub fn assemble(
        &self,
        tx: &Transaction,
        simulation: &SimulateTransactionResponse,
    ) -> Result<Transaction> {
        assemble_transaction(tx, simulation)
    }

    /// Simulates and assembles in one go.
    pub async fn prepare(&self, tx: &Transaction) -> Result<Transaction> {
        self.prepare_with_options(tx, None).await
    }

    pub async fn prepare_with_options(
        &self,
        tx: &Transaction,
        options: Option<SimulationOptions>,
    ) -> Result<Transaction> {
        let simulation = self.simulate(tx, options).await?;
        if let Some(message) = &simulation.error {
            tracing::warn!(
                latest_ledger = simulation.latest_ledger,
                error = %message,
                "simulation failed"
            );
            return Err(Error::PrepareTransaction {
                message: message.clone(),
                latest_ledger: simulation.latest_ledger,
            });
        }
        assemble_transaction(tx, &simulation)
    }

    /// Prepares the transaction inside a decoded envelope. Fee-bump
    /// envelopes are refused: the outer signature and fee would both be
    /// invalidated by re-pricing the inner transaction.
    pub async fn prepare_envelope(&self, envelope: &TransactionEnvelope) -> Result<Transaction> {
        match envelope {
            TransactionEnvelope::Transaction(tx) => self.prepare(tx).await,
            TransactionEnvelope::FeeBump(_) => Err(Error::TransactionType(
                "a fee-bump envelope cannot be re-prepared; prepare the inner transaction \
                 before wrapping it"
                    .to_string(),
            )),
        }
    }

    // -- Submission -----------------------------------------------------------

    /// Sends a signed envelope. Returns as soon as the node has answered;
    /// inclusion in a ledger is what [`PreparationPipeline::poll_transaction`]
    /// waits for.
    pub async fn submit<E: Envelope + ?Sized>(&self, envelope: &E) -> Result<SendTransactionResponse> {
        let hash = envelope.hash_hex()?;
        let params = json!({ "transaction": envelope.to_envelope_xdr_base64()? });
        let response: SendTransactionResponse =
            self.request(RpcMethod::SendTransaction, params).await?;

        tracing::info!(
            hash = %hash,
            status = ?response.status,
            latest_ledger = response.latest_ledger,
            "transaction submitted"
        );
        Ok(response)
    }

    pub async fn get_transaction(&self, hash: &str) -> Result<GetTransactionResponse> {
        self.request(RpcMethod::GetTransaction, json!({ "hash": hash }))
            .await
    }

    /// [`PreparationPipeline::poll_transaction`] with the configured attempt
    /// count and a constant interval.
    pub async fn poll(&self, hash: &str) -> Result<GetTransactionResponse> {
        self.poll_transaction(
            hash,
            self.poll_max_attempts,
            strategy::constant(self.poll_interval),
        )
        .await
    }

    /// Calls `getTransaction` up to `max_attempts` times, returning as soon
    /// as the status is anything but `NOT_FOUND`.
    ///
    /// Errors from individual attempts are logged and swallowed. After the
    /// last attempt the most recent response is returned as is, which may
    /// still be `NOT_FOUND`. Only when no attempt produced a response is the
    /// last error returned. `sleep_strategy(n)` gives the pause after
    /// attempt `n`; there is no pause after the final attempt.
    pub async fn poll_transaction<S>(
        &self,
        hash: &str,
        max_attempts: u32,
        sleep_strategy: S,
    ) -> Result<GetTransactionResponse>
    where
        S: Fn(u32) -> Duration + Send + Sync,
    {
        if max_attempts == 0 {
            return Err(ValidationError::InvalidMaxAttempts.into());
        }

        let mut last_response: Option<GetTransactionResponse> = None;
        let mut last_error: Option<Error> = None;

        for attempt in 1..=max_attempts {
            match self.get_transaction(hash).await {
                Ok(response) if response.status != TransactionStatus::NotFound => {
                    tracing::info!(
                        hash,
                        attempt,
                        status = ?response.status,
                        ledger = response.ledger,
                        "transaction found"
                    );
                    return Ok(response);
                }
                Ok(response) => {
                    tracing::debug!(hash, attempt, max_attempts, "transaction not found yet");
                    last_response = Some(response);
                }
                Err(err) => {
                    tracing::warn!(hash, attempt, max_attempts, error = %err, "poll attempt failed");
                    last_error = Some(err);
                }
            }

            if attempt < max_attempts {
                self.sleeper.sleep(sleep_strategy(attempt)).await;
            }
        }

        match (last_response, last_error) {
            (Some(response), _) => Ok(response),
            (None, Some(err)) => Err(err),
            (None, None) => Err(Error::ResponseDecode(format!(
                "no getTransaction response for {hash}"
            ))),
        }
    }

    // -- Node reads -----------------------------------------------------------

    pub async fn get_health(&self) -> Result<GetHealthResponse> {
        self.request(RpcMethod::GetHealth, Value::Null).await
    }

    pub async fn get_network(&self) -> Result<GetNetworkResponse> {
        self.request(RpcMethod::GetNetwork, Value::Null).await
    }

    pub async fn get_latest_ledger(&self) -> Result<GetLatestLedgerResponse> {
        self.request(RpcMethod::GetLatestLedger, Value::Null).await
    }

    /// Raw ledger entries for `keys`; keys with no entry are simply absent.
    pub async fn get_ledger_entries(
        &self,
        keys: &[xdr::LedgerKey],
    ) -> Result<GetLedgerEntriesResponse> {
        let keys = keys
            .iter()
            .map(|key| key.to_xdr_base64(Limits::none()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        self.request(RpcMethod::GetLedgerEntries, json!({ "keys": keys }))
            .await
    }

    /// Current sequence number of a `G…` account, ready for a
    /// [`crate::TransactionBuilder`].
    pub async fn get_account(&self, account_id: &str) -> Result<Account> {
        let key = soroban::account_ledger_key(&PublicKey::from_account_id(account_id)?);
        let response = self.get_ledger_entries(std::slice::from_ref(&key)).await?;
        let entry = response.entries().first().ok_or_else(|| {
            Error::ResponseDecode(format!("account {account_id} not found"))
        })?;
        entry.account()
    }
}
