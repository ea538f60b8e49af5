//! # Soroban Helpers
//!
//! Shorthand for the contract-side values a transaction carries: contract
//! addresses, symbols and integers, invocation arguments, ledger keys and
//! the resource declaration ([`xdr::SorobanTransactionData`]) that
//! simulation produces.
//!
//! The types themselves are the wire types from [`crate::xdr`]; this module
//! only adds strkey parsing and the validation the wire types leave to the
//! caller (symbol alphabet, string lengths).

use crate::crypto::PublicKey;
use crate::error::ValidationError;
use crate::strkey::{self, StrKey};
use crate::xdr;

/// `SCSymbol` is a `string<32>`.
pub const SC_SYMBOL_LIMIT: usize = 32;

// ---------------------------------------------------------------------------
// Addresses
// ---------------------------------------------------------------------------

/// Parses a `G…` account or `C…` contract strkey.
pub fn parse_address(s: &str) -> Result<xdr::ScAddress, ValidationError> {
    match strkey::decode(s)? {
        StrKey::PublicKey(k) => Ok(xdr::ScAddress::Account((&PublicKey::from_bytes(k)).into())),
        StrKey::Contract(c) => Ok(xdr::ScAddress::Contract(xdr::ContractId(xdr::Hash(c)))),
        _ => Err(ValidationError::InvalidAddress {
            address: s.to_string(),
            reason: "expected an account (G...) or contract (C...)".to_string(),
        }),
    }
}

/// The `C…` strkey of a contract id.
pub fn contract_strkey(contract_id: [u8; 32]) -> String {
    strkey::encode(&StrKey::Contract(contract_id))
}

/// The strkey of an account or contract address; `None` for the address
/// kinds a transaction never names directly.
pub fn address_strkey(address: &xdr::ScAddress) -> Option<String> {
    match address {
        xdr::ScAddress::Account(id) => Some(PublicKey::from(id).account_id()),
        xdr::ScAddress::Contract(xdr::ContractId(xdr::Hash(c))) => Some(contract_strkey(*c)),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// Symbol value; at most 32 characters from `[a-zA-Z0-9_]`.
pub fn symbol(s: &str) -> Result<xdr::ScVal, ValidationError> {
    Ok(xdr::ScVal::Symbol(sc_symbol(s)?))
}

fn sc_symbol(s: &str) -> Result<xdr::ScSymbol, ValidationError> {
    let invalid = || {
        ValidationError::InvalidField(format!(
            "symbol {s:?} must be at most {SC_SYMBOL_LIMIT} characters from [a-zA-Z0-9_]"
        ))
    };
    if s.len() > SC_SYMBOL_LIMIT || !s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
        return Err(invalid());
    }
    Ok(xdr::ScSymbol(s.try_into().map_err(|_| invalid())?))
}

pub fn i128(v: i128) -> xdr::ScVal {
    xdr::ScVal::I128(xdr::Int128Parts {
        hi: (v >> 64) as i64,
        lo: v as u64,
    })
}

pub fn u128(v: u128) -> xdr::ScVal {
    xdr::ScVal::U128(xdr::UInt128Parts {
        hi: (v >> 64) as u64,
        lo: v as u64,
    })
}

pub fn address(s: &str) -> Result<xdr::ScVal, ValidationError> {
    Ok(xdr::ScVal::Address(parse_address(s)?))
}

pub fn vec(items: Vec<xdr::ScVal>) -> Result<xdr::ScVal, ValidationError> {
    let items: xdr::VecM<xdr::ScVal> = items
        .try_into()
        .map_err(|_| ValidationError::InvalidField("too many vector items".to_string()))?;
    Ok(xdr::ScVal::Vec(Some(xdr::ScVec(items))))
}

// ---------------------------------------------------------------------------
// Invocation
// ---------------------------------------------------------------------------

/// Arguments for calling `function` on the `C…` (or `G…`) address.
pub fn invoke_contract_args(
    contract: &str,
    function: &str,
    args: Vec<xdr::ScVal>,
) -> Result<xdr::InvokeContractArgs, ValidationError> {
    Ok(xdr::InvokeContractArgs {
        contract_address: parse_address(contract)?,
        function_name: sc_symbol(function)?,
        args: args
            .try_into()
            .map_err(|_| ValidationError::InvalidField("too many call arguments".to_string()))?,
    })
}

// ---------------------------------------------------------------------------
// Ledger keys and resources
// ---------------------------------------------------------------------------

pub fn account_ledger_key(account: &PublicKey) -> xdr::LedgerKey {
    xdr::LedgerKey::Account(xdr::LedgerKeyAccount {
        account_id: account.into(),
    })
}

/// Key of a contract's instance entry, the one every invocation reads.
pub fn contract_instance_key(contract: xdr::ScAddress) -> xdr::LedgerKey {
    xdr::LedgerKey::ContractData(xdr::LedgerKeyContractData {
        contract,
        key: xdr::ScVal::LedgerKeyContractInstance,
        durability: xdr::ContractDataDurability::Persistent,
    })
}

/// A resource budget over an empty footprint.
pub fn resources(instructions: u32, disk_read_bytes: u32, write_bytes: u32) -> xdr::SorobanResources {
    xdr::SorobanResources {
        footprint: xdr::LedgerFootprint {
            read_only: xdr::VecM::default(),
            read_write: xdr::VecM::default(),
        },
        instructions,
        disk_read_bytes,
        write_bytes,
    }
}

/// Transaction data declaring `resources` and paying `resource_fee`.
pub fn transaction_data(
    resources: xdr::SorobanResources,
    resource_fee: i64,
) -> xdr::SorobanTransactionData {
    xdr::SorobanTransactionData {
        ext: xdr::SorobanTransactionDataExt::V0,
        resources,
        resource_fee,
    }
}
