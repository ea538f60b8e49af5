//! Operations: the 27 kinds of state change a transaction can carry.
//!
//! Every operation may name its own source account; when it doesn't, the
//! transaction's source account is used. [`Operation`] wraps the wire
//! [`xdr::Operation`] and adds the constructors and checks the wire type
//! cannot express (positive amounts, non-empty data names, claimant counts).

use std::fmt;

use crate::error::{Error, ValidationError};
use crate::xdr;

use super::account::{account_id, MuxedAccount};
use super::asset::change_trust_asset;
use super::soroban::invoke_contract_args;

/// One operation plus its optional source-account override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation(xdr::Operation);

impl Operation {
    pub fn new(body: xdr::OperationBody) -> Self {
        Self(xdr::Operation {
            source_account: None,
            body,
        })
    }

    /// Overrides the source account with a `G…` or `M…` address.
    pub fn with_source(mut self, address: &str) -> Result<Self, ValidationError> {
        self.0.source_account = Some(MuxedAccount::parse(address)?.into());
        Ok(self)
    }

    pub fn source_account(&self) -> Option<MuxedAccount> {
        self.0.source_account.as_ref().map(MuxedAccount::from)
    }

    pub fn body(&self) -> &xdr::OperationBody {
        &self.0.body
    }

    /// `Payment`, `InvokeHostFunction`, …
    pub fn kind_name(&self) -> &'static str {
        self.0.body.name()
    }

    pub fn as_xdr(&self) -> &xdr::Operation {
        &self.0
    }

    pub fn create_account(destination: &str, starting_balance: i64) -> Result<Self, ValidationError> {
        Ok(Self::new(xdr::OperationBody::CreateAccount(xdr::CreateAccountOp {
            destination: account_id(destination)?,
            starting_balance,
        })))
    }

    pub fn payment(destination: &str, asset: xdr::Asset, amount: i64) -> Result<Self, ValidationError> {
        Ok(Self::new(xdr::OperationBody::Payment(xdr::PaymentOp {
            destination: MuxedAccount::parse(destination)?.into(),
            asset,
            amount,
        })))
    }

    pub fn change_trust(asset: xdr::Asset, limit: i64) -> Self {
        Self::new(xdr::OperationBody::ChangeTrust(xdr::ChangeTrustOp {
            line: change_trust_asset(asset),
            limit,
        }))
    }

    /// Sets (or, with `None`, deletes) a data entry. Names are 1-64 bytes,
    /// values at most 64 bytes.
    pub fn manage_data(name: &str, value: Option<&[u8]>) -> Result<Self, ValidationError> {
        if name.is_empty() {
            return Err(ValidationError::InvalidField(
                "data name must not be empty".to_string(),
            ));
        }
        let data_name: xdr::StringM<64> = name.try_into().map_err(|_| {
            ValidationError::InvalidField(format!(
                "data name is {} bytes, the limit is {DATA_LIMIT}",
                name.len()
            ))
        })?;
        let data_value = value
            .map(|v| {
                v.to_vec().try_into().map(xdr::DataValue).map_err(|_| {
                    ValidationError::InvalidField(format!(
                        "data value is {} bytes, the limit is {DATA_LIMIT}",
                        v.len()
                    ))
                })
            })
            .transpose()?;
        Ok(Self::new(xdr::OperationBody::ManageData(xdr::ManageDataOp {
            data_name: xdr::String64(data_name),
            data_value,
        })))
    }

    pub fn bump_sequence(bump_to: i64) -> Self {
        Self::new(xdr::OperationBody::BumpSequence(xdr::BumpSequenceOp {
            bump_to: xdr::SequenceNumber(bump_to),
        }))
    }

    /// Calls `function` on the `C…` contract, with no authorization
    /// entries; simulation fills those in.
    pub fn invoke_contract(
        contract: &str,
        function: &str,
        args: Vec<xdr::ScVal>,
    ) -> Result<Self, ValidationError> {
        Ok(Self::invoke_host_function(
            xdr::HostFunction::InvokeContract(invoke_contract_args(contract, function, args)?),
            xdr::VecM::default(),
        ))
    }

    pub fn invoke_host_function(
        host_function: xdr::HostFunction,
        auth: xdr::VecM<xdr::SorobanAuthorizationEntry>,
    ) -> Self {
        Self::new(xdr::OperationBody::InvokeHostFunction(
            xdr::InvokeHostFunctionOp {
                host_function,
                auth,
            },
        ))
    }

    pub fn extend_footprint_ttl(extend_to: u32) -> Self {
        Self::new(xdr::OperationBody::ExtendFootprintTtl(
            xdr::ExtendFootprintTtlOp {
                ext: xdr::ExtensionPoint::V0,
                extend_to,
            },
        ))
    }

    pub fn restore_footprint() -> Self {
        Self::new(xdr::OperationBody::RestoreFootprint(
            xdr::RestoreFootprintOp {
                ext: xdr::ExtensionPoint::V0,
            },
        ))
    }

    /// Invoke-host-function, extend-footprint-TTL or restore-footprint.
    pub fn is_soroban(&self) -> bool {
        matches!(
            self.0.body,
            xdr::OperationBody::InvokeHostFunction(_)
                | xdr::OperationBody::ExtendFootprintTtl(_)
                | xdr::OperationBody::RestoreFootprint(_)
        )
    }

    /// Authorization entries of an `InvokeHostFunction`, `None` for every
    /// other kind.
    pub fn auth_entries(&self) -> Option<&[xdr::SorobanAuthorizationEntry]> {
        match &self.0.body {
            xdr::OperationBody::InvokeHostFunction(op) => Some(op.auth.as_slice()),
            _ => None,
        }
    }

    /// A copy carrying `auth` instead of its current entries. Only
    /// `InvokeHostFunction` has entries; any other kind comes back unchanged.
    pub fn with_auth_entries(
        &self,
        auth: Vec<xdr::SorobanAuthorizationEntry>,
    ) -> Result<Self, Error> {
        let mut op = self.clone();
        if let xdr::OperationBody::InvokeHostFunction(invoke) = &mut op.0.body {
            invoke.auth = auth.try_into()?;
        }
        Ok(op)
    }

    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        use xdr::OperationBody as Body;

        match &self.0.body {
            Body::CreateAccount(op) => non_negative("starting_balance", op.starting_balance),
            Body::Payment(xdr::PaymentOp { amount, .. })
            | Body::Clawback(xdr::ClawbackOp { amount, .. })
            | Body::LiquidityPoolWithdraw(xdr::LiquidityPoolWithdrawOp { amount, .. }) => {
                positive("amount", *amount)
            }
            Body::PathPaymentStrictReceive(op) => {
                positive("send_max", op.send_max)?;
                positive("dest_amount", op.dest_amount)
            }
            Body::PathPaymentStrictSend(op) => {
                positive("send_amount", op.send_amount)?;
                positive("dest_min", op.dest_min)
            }
            Body::ManageSellOffer(op) => non_negative("amount", op.amount),
            Body::ManageBuyOffer(op) => non_negative("buy_amount", op.buy_amount),
            Body::CreatePassiveSellOffer(op) => positive("amount", op.amount),
            Body::ChangeTrust(op) => non_negative("limit", op.limit),
            Body::ManageData(op) if op.data_name.0.is_empty() => Err(
                ValidationError::InvalidField("data name must not be empty".to_string()),
            ),
            Body::BumpSequence(op) => non_negative("bump_to", op.bump_to.0),
            Body::CreateClaimableBalance(op) => {
                positive("amount", op.amount)?;
                if op.claimants.is_empty() {
                    return Err(ValidationError::InvalidField(
                        "a claimable balance needs at least one claimant".to_string(),
                    ));
                }
                Ok(())
            }
            Body::LiquidityPoolDeposit(op) => {
                positive("max_amount_a", op.max_amount_a)?;
                positive("max_amount_b", op.max_amount_b)
            }
            _ => Ok(()),
        }
    }
}

/// Data entry names are `string64`, values `opaque<64>`.
pub const DATA_LIMIT: usize = 64;

fn positive(field: &str, value: i64) -> Result<(), ValidationError> {
    if value <= 0 {
        return Err(ValidationError::InvalidField(format!(
            "{field} must be positive, got {value}"
        )));
    }
    Ok(())
}

fn non_negative(field: &str, value: i64) -> Result<(), ValidationError> {
    if value < 0 {
        return Err(ValidationError::InvalidField(format!(
            "{field} must not be negative, got {value}"
        )));
    }
    Ok(())
}

impl From<xdr::OperationBody> for Operation {
    fn from(body: xdr::OperationBody) -> Self {
        Self::new(body)
    }
}

impl From<xdr::Operation> for Operation {
    fn from(op: xdr::Operation) -> Self {
        Self(op)
    }
}

impl From<Operation> for xdr::Operation {
    fn from(op: Operation) -> Self {
        op.0
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source_account() {
            Some(source) => write!(f, "{} (source {})", self.kind_name(), source),
            None => f.write_str(self.kind_name()),
        }
    }
}
