//! # String Keys
//!
//! Every key or id a human ever copies around is a "strkey": a version byte,
//! the raw payload and a CRC16-XModem checksum, base32-encoded without
//! padding. The version byte picks the leading character:
//!
//! ```text
//! G  account id (ed25519 public key)      S  secret seed
//! M  muxed account (key + u64 id)         C  contract id
//! T  pre-authorized transaction hash      X  sha256 hash-x signer
//! P  ed25519 signed payload signer
//! ```
//!
//! Decoding is strict: wrong checksum, wrong length, non-canonical trailing
//! bits or padding characters are all rejected. A typo in an address must
//! never turn into a valid, different address.

use crate::error::ValidationError;

const VERSION_ACCOUNT_ID: u8 = 6 << 3;
const VERSION_MUXED_ACCOUNT: u8 = 12 << 3;
const VERSION_SEED: u8 = 18 << 3;
const VERSION_PRE_AUTH_TX: u8 = 19 << 3;
const VERSION_SHA256_HASH: u8 = 23 << 3;
const VERSION_SIGNED_PAYLOAD: u8 = 15 << 3;
const VERSION_CONTRACT: u8 = 2 << 3;

const ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// A decoded strkey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrKey {
    PublicKey([u8; 32]),
    SecretSeed([u8; 32]),
    MuxedAccount { ed25519: [u8; 32], id: u64 },
    PreAuthTx([u8; 32]),
    HashX([u8; 32]),
    SignedPayload { ed25519: [u8; 32], payload: Vec<u8> },
    Contract([u8; 32]),
}

/// Encodes a key into its string form.
pub fn encode(key: &StrKey) -> String {
    let (version, data) = match key {
        StrKey::PublicKey(k) => (VERSION_ACCOUNT_ID, k.to_vec()),
        StrKey::SecretSeed(k) => (VERSION_SEED, k.to_vec()),
        StrKey::PreAuthTx(k) => (VERSION_PRE_AUTH_TX, k.to_vec()),
        StrKey::HashX(k) => (VERSION_SHA256_HASH, k.to_vec()),
        StrKey::Contract(k) => (VERSION_CONTRACT, k.to_vec()),
        StrKey::MuxedAccount { ed25519, id } => {
            let mut data = ed25519.to_vec();
            data.extend_from_slice(&id.to_be_bytes());
            (VERSION_MUXED_ACCOUNT, data)
        }
        StrKey::SignedPayload { ed25519, payload } => {
            let mut data = ed25519.to_vec();
            data.extend_from_slice(&(payload.len() as u32).to_be_bytes());
            data.extend_from_slice(payload);
            data.resize(data.len() + (4 - payload.len() % 4) % 4, 0);
            (VERSION_SIGNED_PAYLOAD, data)
        }
    };

    let mut raw = Vec::with_capacity(data.len() + 3);
    raw.push(version);
    raw.extend_from_slice(&data);
    let checksum = crc16_xmodem(&raw);
    raw.extend_from_slice(&checksum.to_le_bytes());
    base32_encode(&raw)
}

/// Decodes any supported strkey.
pub fn decode(s: &str) -> Result<StrKey, ValidationError> {
    let invalid = |reason: &str| ValidationError::InvalidAddress {
        address: s.to_string(),
        reason: reason.to_string(),
    };

    let raw = base32_decode(s).ok_or_else(|| invalid("not valid base32"))?;
    if raw.len() < 3 {
        return Err(invalid("too short"));
    }
    // Re-encoding must reproduce the input exactly; this rejects
    // non-zero trailing bits and other non-canonical spellings.
    if base32_encode(&raw) != s {
        return Err(invalid("non-canonical encoding"));
    }

    let (body, checksum) = raw.split_at(raw.len() - 2);
    if crc16_xmodem(body).to_le_bytes() != [checksum[0], checksum[1]] {
        return Err(invalid("checksum mismatch"));
    }

    let version = body[0];
    let data = &body[1..];
    let key32 = |data: &[u8]| -> Result<[u8; 32], ValidationError> {
        data.try_into().map_err(|_| invalid("wrong payload length"))
    };

    match version {
        VERSION_ACCOUNT_ID => Ok(StrKey::PublicKey(key32(data)?)),
        VERSION_SEED => Ok(StrKey::SecretSeed(key32(data)?)),
        VERSION_PRE_AUTH_TX => Ok(StrKey::PreAuthTx(key32(data)?)),
        VERSION_SHA256_HASH => Ok(StrKey::HashX(key32(data)?)),
        VERSION_CONTRACT => Ok(StrKey::Contract(key32(data)?)),
        VERSION_MUXED_ACCOUNT => {
            if data.len() != 40 {
                return Err(invalid("wrong payload length"));
            }
            let ed25519 = key32(&data[..32])?;
            let mut id = [0u8; 8];
            id.copy_from_slice(&data[32..]);
            Ok(StrKey::MuxedAccount {
                ed25519,
                id: u64::from_be_bytes(id),
            })
        }
        VERSION_SIGNED_PAYLOAD => {
            if data.len() < 36 {
                return Err(invalid("wrong payload length"));
            }
            let ed25519 = key32(&data[..32])?;
            let len = u32::from_be_bytes([data[32], data[33], data[34], data[35]]) as usize;
            if len == 0 || len > crate::config::MAX_SIGNED_PAYLOAD_BYTES {
                return Err(invalid("signed payload length out of range"));
            }
            let padded = len + (4 - len % 4) % 4;
            if data.len() != 36 + padded {
                return Err(invalid("wrong payload length"));
            }
            if data[36 + len..].iter().any(|b| *b != 0) {
                return Err(invalid("non-zero payload padding"));
            }
            Ok(StrKey::SignedPayload {
                ed25519,
                payload: data[36..36 + len].to_vec(),
            })
        }
        _ => Err(invalid("unknown version byte")),
    }
}

// ---------------------------------------------------------------------------
// Base32 / CRC16
// ---------------------------------------------------------------------------

fn base32_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity((data.len() * 8).div_ceil(5));
    let mut buffer: u32 = 0;
    let mut bits = 0u32;
    for &byte in data {
        buffer = (buffer << 8) | byte as u32;
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(ALPHABET[((buffer >> bits) & 0x1f) as usize] as char);
        }
    }
    if bits > 0 {
        out.push(ALPHABET[((buffer << (5 - bits)) & 0x1f) as usize] as char);
    }
    out
}

fn base32_decode(s: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(s.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut bits = 0u32;
    for c in s.bytes() {
        let value = ALPHABET.iter().position(|&a| a == c)? as u32;
        buffer = (buffer << 5) | value;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push(((buffer >> bits) & 0xff) as u8);
        }
    }
    Some(out)
}

fn crc16_xmodem(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            };
        }
    }
    crc
}
