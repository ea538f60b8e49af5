//! Assets: the native lumen and issued credits.
//!
//! Codes of up to 4 characters use the `alphanum4` arm, 5 to 12 the
//! `alphanum12` arm; on the wire codes are right-padded with zero bytes.

use crate::error::ValidationError;
use crate::xdr;

use super::account::account_id;

pub fn native() -> xdr::Asset {
    xdr::Asset::Native
}

/// Issued asset from a code (1-12 ASCII alphanumerics) and a `G…` issuer.
pub fn credit(code: &str, issuer: &str) -> Result<xdr::Asset, ValidationError> {
    let issuer = account_id(issuer)?;
    if code.is_empty() || code.len() > 12 || !code.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidField(format!(
            "asset code {code:?} must be 1-12 ASCII alphanumerics"
        )));
    }
    if code.len() <= 4 {
        let mut buf = [0u8; 4];
        buf[..code.len()].copy_from_slice(code.as_bytes());
        Ok(xdr::Asset::CreditAlphanum4(xdr::AlphaNum4 {
            asset_code: xdr::AssetCode4(buf),
            issuer,
        }))
    } else {
        let mut buf = [0u8; 12];
        buf[..code.len()].copy_from_slice(code.as_bytes());
        Ok(xdr::Asset::CreditAlphanum12(xdr::AlphaNum12 {
            asset_code: xdr::AssetCode12(buf),
            issuer,
        }))
    }
}

/// The code with its zero padding stripped; `"XLM"` for native.
pub fn code(asset: &xdr::Asset) -> String {
    let raw: &[u8] = match asset {
        xdr::Asset::Native => return "XLM".to_string(),
        xdr::Asset::CreditAlphanum4(a) => &a.asset_code.0,
        xdr::Asset::CreditAlphanum12(a) => &a.asset_code.0,
    };
    let end = raw.iter().position(|b| *b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

/// The trust-line form of `asset`, for `ChangeTrust`.
pub fn change_trust_asset(asset: xdr::Asset) -> xdr::ChangeTrustAsset {
    match asset {
        xdr::Asset::Native => xdr::ChangeTrustAsset::Native,
        xdr::Asset::CreditAlphanum4(a) => xdr::ChangeTrustAsset::CreditAlphanum4(a),
        xdr::Asset::CreditAlphanum12(a) => xdr::ChangeTrustAsset::CreditAlphanum12(a),
    }
}
