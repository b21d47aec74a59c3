//! `v1:` HMAC-SHA256 request signatures.

use hmac::Mac;

use super::{HmacSha256, ParameterSet, SigningError};

/// Version prefix carried by every request signature.
pub const SIGNATURE_PREFIX: &str = "v1:";

/// Field order used by the historical client-auth signing endpoint.
pub const CLIENT_AUTH_FIELDS: &[&str] = &["password", "snapchat_version", "timestamp", "username"];

/// Field order used by the historical attestation signing endpoint.
pub const ATTESTATION_FIELDS: &[&str] = &["nonce", "protobuf", "snapchat_version"];

/// How the HMAC input is derived from a parameter set.
///
/// Servers validate against exactly one scheme per endpoint, so the scheme
/// is always chosen by the caller and never inferred from the parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignatureScheme {
    /// Every parameter, keys sorted ascending.
    FullSorted,
    /// Only the listed keys, in the listed order.
    FixedSubset(&'static [&'static str]),
}

impl SignatureScheme {
    /// The string fed to HMAC under this scheme.
    pub fn serialize(&self, params: &ParameterSet) -> String {
        match self {
            Self::FullSorted => params.canonical_string(),
            Self::FixedSubset(fields) => params.ordered_subset_string(fields),
        }
    }

    /// Sign `params` under this scheme.
    pub fn sign(&self, params: &ParameterSet, secret: &str) -> Result<RequestSignature, SigningError> {
        RequestSignature::compute(&self.serialize(params), secret)
    }
}

/// A `v1:`-prefixed, lowercase hex HMAC-SHA256 signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RequestSignature(String);

impl RequestSignature {
    fn compute(message: &str, secret: &str) -> Result<Self, SigningError> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
            .map_err(|e| SigningError::InvalidKey(e.to_string()))?;
        mac.update(message.as_bytes());
        let digest = mac.finalize().into_bytes();
        Ok(Self(format!("{}{}", SIGNATURE_PREFIX, hex::encode(digest))))
    }

    /// Get the signature as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The hex digest without the version prefix.
    pub fn digest_hex(&self) -> &str {
        &self.0[SIGNATURE_PREFIX.len()..]
    }
}

impl AsRef<str> for RequestSignature {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sign all given parameters, keys sorted. This is the canonical scheme.
///
/// # Example
///
/// ```
/// use casper_lib::signing::{sign_request, ParameterSet};
///
/// let params = ParameterSet::new().with("username", "alice");
/// let signature = sign_request(&params, "api-secret").unwrap();
/// assert!(signature.as_str().starts_with("v1:"));
/// assert_eq!(signature.digest_hex().len(), 64);
/// ```
pub fn sign_request(params: &ParameterSet, secret: &str) -> Result<RequestSignature, SigningError> {
    SignatureScheme::FullSorted.sign(params, secret)
}

/// Sign an explicit ordered subset of the parameters (legacy endpoints).
pub fn sign_request_subset(
    params: &ParameterSet,
    fields: &'static [&'static str],
    secret: &str,
) -> Result<RequestSignature, SigningError> {
    SignatureScheme::FixedSubset(fields).sign(params, secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login_params() -> ParameterSet {
        ParameterSet::new()
            .with("username", "test_username")
            .with("password", "attesttesttesttesttestpassword")
            .with("snapchat_version", "9.16.2.0")
            .with("timestamp", "0123456789")
    }

    #[test]
    fn test_signature_golden_vectors() {
        let vectors = [
            (
                "test_api_secret",
                "v1:924f4b500afc0b4eace1a32477256ebcfa0668dd7ecd46632f922f9fd7d406ba",
            ),
            (
                "f7b57dffb27e76a928feb948cdb52bf8",
                "v1:a165cec79558f5b8f714bf5a7c56b7ff746a8b56f1cbe7d27feb6359f75dc06a",
            ),
        ];
        for (secret, expected) in vectors {
            let signature = sign_request(&login_params(), secret).unwrap();
            assert_eq!(signature.as_str(), expected, "secret {}", secret);
        }
    }

    #[test]
    fn test_client_auth_subset_matches_sorted_for_same_keys() {
        // The client-auth field order happens to be sorted, so both schemes agree here.
        let full = sign_request(&login_params(), "s").unwrap();
        let subset = sign_request_subset(&login_params(), CLIENT_AUTH_FIELDS, "s").unwrap();
        assert_eq!(full, subset);
    }

    #[test]
    fn test_subset_ignores_extra_keys() {
        let with_extra = login_params().with("req_token", "abc");
        let full = sign_request(&with_extra, "s").unwrap();
        let subset = sign_request_subset(&with_extra, CLIENT_AUTH_FIELDS, "s").unwrap();
        assert_ne!(full, subset);
        assert_eq!(
            subset,
            sign_request_subset(&login_params(), CLIENT_AUTH_FIELDS, "s").unwrap()
        );
    }

    #[test]
    fn test_scheme_serialization() {
        let params = ParameterSet::new()
            .with("snapchat_version", "9.16.2.0")
            .with("protobuf", "p")
            .with("nonce", "n");
        assert_eq!(
            SignatureScheme::FixedSubset(ATTESTATION_FIELDS).serialize(&params),
            "noncenprotobufpsnapchat_version9.16.2.0"
        );
    }

    #[test]
    fn test_different_params_different_signature() {
        let a = sign_request(&login_params(), "s").unwrap();
        let b = sign_request(&login_params().with("timestamp", "1"), "s").unwrap();
        assert_ne!(a, b);
    }
}
