//! HS256 claim tokens presented to the signing service.
//!
//! # Token Format
//!
//! ```text
//! base64url({"alg":"HS256","typ":"JWT"}) "." base64url(claims) "." base64url(hmac)
//! ```
//!
//! Claims are a flat JSON object of string values with keys in ascending
//! order, including `iat` (Unix seconds, as a string). No padding is used in
//! any segment.

use std::collections::BTreeMap;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::Mac;
use serde::Serialize;

use super::{HmacSha256, SigningError};

/// Name of the issued-at claim.
pub const ISSUED_AT_CLAIM: &str = "iat";

#[derive(Serialize)]
struct TokenHeader {
    alg: &'static str,
    typ: &'static str,
}

const HEADER: TokenHeader = TokenHeader {
    alg: "HS256",
    typ: "JWT",
};

/// String assertions carried by a claim token.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ClaimSet(BTreeMap<String, String>);

impl ClaimSet {
    /// Create an empty claim set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Look up a claim.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Number of claims.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ClaimSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A signed, single-use bearer token.
///
/// `Debug` does not print the token: it embeds the session auth token.
#[derive(Clone, PartialEq, Eq)]
pub struct ClaimToken(String);

impl ClaimToken {
    /// Get the compact token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the compact string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Debug for ClaimToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ClaimToken(<redacted>)")
    }
}

/// Issue a token stamped with the current time.
pub fn issue_token(claims: &ClaimSet, secret: &str) -> Result<ClaimToken, SigningError> {
    issue_token_at(claims, secret, chrono::Utc::now().timestamp())
}

/// Issue a token with an explicit `iat`.
///
/// Deterministic: identical claims, `iat` and secret always produce the
/// same token. Any `iat` already present in `claims` is replaced.
///
/// # Example
///
/// ```
/// use casper_lib::signing::{issue_token_at, ClaimSet};
///
/// let claims = ClaimSet::new().with("username", "alice");
/// let a = issue_token_at(&claims, "secret", 1_457_484_764).unwrap();
/// let b = issue_token_at(&claims, "secret", 1_457_484_764).unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.as_str().split('.').count(), 3);
/// ```
pub fn issue_token_at(claims: &ClaimSet, secret: &str, iat: i64) -> Result<ClaimToken, SigningError> {
    if secret.is_empty() {
        return Err(SigningError::EmptySecret);
    }

    let mut stamped = claims.clone();
    stamped.0.insert(ISSUED_AT_CLAIM.to_string(), iat.to_string());

    let header = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&HEADER)?);
    let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&stamped)?);
    let signing_input = format!("{}.{}", header, payload);

    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
        .map_err(|e| SigningError::InvalidKey(e.to_string()))?;
    mac.update(signing_input.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(ClaimToken(format!("{}.{}", signing_input, signature)))
}
