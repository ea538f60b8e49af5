//! Transaction memos.

use crate::config::MEMO_TEXT_MAX_BYTES;
use crate::error::ValidationError;
use crate::xdr;

/// Free-form data attached to a transaction. Ignored by the ledger, read by
/// exchanges and wallets (deposit ids and the like).
///
/// Wraps the wire [`xdr::Memo`]; the constructors enforce the 28-byte text
/// limit up front so it surfaces as a [`ValidationError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memo(xdr::Memo);

impl Memo {
    pub fn none() -> Self {
        Self(xdr::Memo::None)
    }

    /// Text memo, rejecting anything over 28 bytes (bytes, not chars).
    pub fn text(text: impl Into<String>) -> Result<Self, ValidationError> {
        let text = text.into();
        let len = text.len();
        let too_long = || ValidationError::MemoTooLong {
            len,
            max: MEMO_TEXT_MAX_BYTES,
        };
        if len > MEMO_TEXT_MAX_BYTES {
            return Err(too_long());
        }
        let text = xdr::StringM::<28>::try_from(text).map_err(|_| too_long())?;
        Ok(Self(xdr::Memo::Text(text)))
    }

    pub fn id(id: u64) -> Self {
        Self(xdr::Memo::Id(id))
    }

    pub fn hash(hash: [u8; 32]) -> Self {
        Self(xdr::Memo::Hash(xdr::Hash(hash)))
    }

    pub fn return_hash(hash: [u8; 32]) -> Self {
        Self(xdr::Memo::Return(xdr::Hash(hash)))
    }

    pub fn is_none(&self) -> bool {
        matches!(self.0, xdr::Memo::None)
    }

    pub fn as_xdr(&self) -> &xdr::Memo {
        &self.0
    }
}

impl Default for Memo {
    fn default() -> Self {
        Self::none()
    }
}

/// Decoded memos are already bounded by the wire type.
impl From<xdr::Memo> for Memo {
    fn from(memo: xdr::Memo) -> Self {
        Self(memo)
    }
}

impl From<Memo> for xdr::Memo {
    fn from(memo: Memo) -> Self {
        memo.0
    }
}
