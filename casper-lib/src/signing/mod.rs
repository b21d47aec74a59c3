//! Request signing primitives shared by every Casper call.
//!
//! This module is the single source of truth for:
//! - Canonical parameter serialization (the HMAC input)
//! - `v1:` request signatures
//! - HS256 claim tokens exchanged with the signing service
//!
//! Every client implementation must produce byte-identical output for the
//! same inputs and pass the same test vectors.
//!
//! # Signature Format
//!
//! `signature = "v1:" + hex(hmac_sha256(key = api_secret, msg = serialize(params)))`
//!
//! where `serialize` concatenates `key || value` for every key in ascending
//! byte order, with no separators and no escaping.

mod params;
mod signature;
mod token;

pub use params::*;
pub use signature::*;
pub use token::*;

use hmac::Hmac;
use sha2::Sha256;

pub(crate) type HmacSha256 = Hmac<Sha256>;

/// Errors raised while building signatures or claim tokens.
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("signing secret must not be empty")]
    EmptySecret,
    #[error("HMAC key rejected: {0}")]
    InvalidKey(String),
    #[error("claim set could not be encoded: {0}")]
    ClaimEncoding(#[from] serde_json::Error),
}
