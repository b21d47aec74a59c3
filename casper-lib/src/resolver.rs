//! Endpoint authorization against the signing service.
//!
//! Every platform call is preceded by one exchange here: a freshly issued
//! claim token goes in as the single form field `jwt`, and a descriptor
//! comes back carrying the headers and single-use parameters the platform
//! expects for exactly one request.
//!
//! The resolver never retries. Failures surface immediately.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

use crate::config::CasperConfig;
use crate::dispatcher::{error_from_response, CASPER_API_KEY_HEADER};
use crate::signing::{issue_token, ClaimSet, ClaimToken, ParameterSet};
use crate::transport::{HttpMethod, HttpRequest, HttpTransport};
use crate::{CasperError, Result};

/// Signing service path for the session bootstrap exchange.
pub const LOGIN_PATH: &str = "/snapchat/android/login";

/// Signing service path for per-endpoint authorization.
pub const ENDPOINT_AUTH_PATH: &str = "/snapchat/android/endpointauth";

/// Form field carrying the claim token.
pub const TOKEN_FIELD: &str = "jwt";

/// Descriptor for the platform login request.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LoginDescriptor {
    /// Absolute platform login URL.
    pub url: String,
    /// Headers to send with the login request.
    #[serde(deserialize_with = "header_map")]
    pub headers: BTreeMap<String, String>,
    /// Pre-populated login parameters.
    #[serde(deserialize_with = "string_map")]
    pub params: BTreeMap<String, String>,
}

impl LoginDescriptor {
    /// Parameters as a [`ParameterSet`].
    pub fn param_set(&self) -> ParameterSet {
        self.params.clone().into()
    }
}

/// Routing and credentials for one platform endpoint.
///
/// Valid for exactly one request: the embedded request token and timestamp
/// are single-use.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct EndpointAuthorization {
    /// Platform path, e.g. `/loq/all_updates`.
    pub endpoint: String,
    /// Headers the platform expects.
    #[serde(default, deserialize_with = "header_map")]
    pub headers: BTreeMap<String, String>,
    /// Pre-populated parameters (username, request token, timestamp).
    #[serde(deserialize_with = "string_map")]
    pub params: BTreeMap<String, String>,
    /// Cache lifetime hint in milliseconds.
    #[serde(default)]
    pub cache_millis: Option<u64>,
}

impl EndpointAuthorization {
    /// Parameters as a [`ParameterSet`].
    pub fn param_set(&self) -> ParameterSet {
        self.params.clone().into()
    }
}

/// Response of the endpoint authorization exchange.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct EndpointDescriptor {
    /// One entry per authorized endpoint.
    pub endpoints: Vec<EndpointAuthorization>,
    /// Service settings, passed through untouched.
    #[serde(default)]
    pub settings: serde_json::Map<String, serde_json::Value>,
}

impl EndpointDescriptor {
    /// Find the entry for `path`.
    pub fn authorization_for(&self, path: &str) -> Option<&EndpointAuthorization> {
        self.endpoints.iter().find(|e| e.endpoint == path)
    }

    /// Take ownership of the entry for `path`, or fail with a parse error.
    pub fn into_authorization(self, path: &str) -> Result<EndpointAuthorization> {
        self.endpoints
            .into_iter()
            .find(|e| e.endpoint == path)
            .ok_or_else(|| CasperError::parse(format!("no authorization returned for {}", path)))
    }
}

/// [`string_map`] restricted to names and values that are legal HTTP headers.
fn header_map<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    use reqwest::header::{HeaderName, HeaderValue};
    use serde::de::Error;

    let headers = string_map(deserializer)?;
    for (name, value) in &headers {
        HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| D::Error::custom(format!("invalid header name '{}': {}", name, e)))?;
        HeaderValue::from_str(value)
            .map_err(|e| D::Error::custom(format!("invalid value for header '{}': {}", name, e)))?;
    }
    Ok(headers)
}

/// Accept string, number or boolean values and keep them as strings.
fn string_map<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(key, value)| {
            let value = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                other => {
                    return Err(D::Error::custom(format!(
                        "field '{}' must be a scalar, got {}",
                        key, other
                    )))
                }
            };
            Ok((key, value))
        })
        .collect()
}

/// Exchanges claim tokens for descriptors.
pub struct EndpointResolver<'a, T: ?Sized> {
    transport: &'a T,
    config: &'a CasperConfig,
}

impl<'a, T: HttpTransport + ?Sized> EndpointResolver<'a, T> {
    /// Create a resolver over a transport and configuration.
    pub fn new(transport: &'a T, config: &'a CasperConfig) -> Self {
        Self { transport, config }
    }

    /// Bootstrap a session: sign `{username, password}` and exchange it.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginDescriptor> {
        let claims = ClaimSet::new()
            .with("username", username)
            .with("password", password);
        let token = issue_token(&claims, &self.config.api_secret)?;
        self.login_with_token(&token).await
    }

    /// Exchange a prepared login token.
    pub async fn login_with_token(&self, token: &ClaimToken) -> Result<LoginDescriptor> {
        let body = self.exchange(LOGIN_PATH, token).await?;
        let descriptor: LoginDescriptor = parse_descriptor(&body, "login")?;
        tracing::debug!(url = %descriptor.url, "login descriptor resolved");
        Ok(descriptor)
    }

    /// Exchange an endpoint token.
    pub async fn resolve_endpoint(&self, token: &ClaimToken) -> Result<EndpointDescriptor> {
        let body = self.exchange(ENDPOINT_AUTH_PATH, token).await?;
        let descriptor: EndpointDescriptor = parse_descriptor(&body, "endpoint authorization")?;
        tracing::debug!(
            endpoints = descriptor.endpoints.len(),
            "endpoint descriptor resolved"
        );
        Ok(descriptor)
    }

    async fn exchange(&self, path: &str, token: &ClaimToken) -> Result<Vec<u8>> {
        let mut request = HttpRequest::new(HttpMethod::Post, self.config.service_endpoint(path))
            .with_header(CASPER_API_KEY_HEADER, self.config.api_key.as_str())
            .with_header("User-Agent", self.config.user_agent())
            .with_header("Accept", "application/json")
            .with_header("Content-Type", "application/x-www-form-urlencoded");
        request
            .params
            .push((TOKEN_FIELD.to_string(), token.as_str().to_string()));

        let response = self.transport.send(request).await?;
        if response.status != 200 {
            let err = error_from_response(&response);
            tracing::warn!(status = response.status, path, "signing service rejected token");
            return Err(err);
        }
        Ok(response.body)
    }
}

fn parse_descriptor<D: for<'de> Deserialize<'de>>(body: &[u8], label: &str) -> Result<D> {
    serde_json::from_slice(body)
        .map_err(|e| CasperError::parse_with(format!("invalid {} descriptor: {}", label, e), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_endpoint_descriptor() {
        let body = serde_json::json!({
            "endpoints": [{
                "endpoint": "/loq/all_updates",
                "headers": {"Accept": "*/*", "X-Snapchat-Client-Auth-Token": "Bearer abc"},
                "params": {"username": "alice", "req_token": "tok", "timestamp": 1457484764000u64},
                "cache_millis": 60000
            }],
            "settings": {"api_version": 2}
        });
        let descriptor: EndpointDescriptor =
            parse_descriptor(&serde_json::to_vec(&body).unwrap(), "test").unwrap();

        let auth = descriptor.authorization_for("/loq/all_updates").unwrap();
        assert_eq!(auth.params["timestamp"], "1457484764000");
        assert_eq!(auth.cache_millis, Some(60000));
        assert!(descriptor.authorization_for("/bq/friend").is_none());
    }

    #[test]
    fn test_missing_endpoints_is_parse_error() {
        let err = parse_descriptor::<EndpointDescriptor>(br#"{"settings":{}}"#, "test").unwrap_err();
        assert_eq!(err.code(), crate::CasperErrorCode::Parse);
        assert!(err.to_string().contains("endpoints"));
    }

    #[test]
    fn test_login_descriptor_requires_url() {
        let err =
            parse_descriptor::<LoginDescriptor>(br#"{"headers":{},"params":{}}"#, "login").unwrap_err();
        assert_eq!(err.code(), crate::CasperErrorCode::Parse);
    }

    #[test]
    fn test_nested_param_rejected() {
        let body = br#"{"url":"https://x","headers":{},"params":{"a":{"b":1}}}"#;
        assert!(parse_descriptor::<LoginDescriptor>(body, "login").is_err());
    }

    #[test]
    fn test_illegal_header_name_is_parse_error() {
        let body = br#"{"endpoints":[{"endpoint":"/bq/stories","headers":{"bad header":"x"},"params":{}}]}"#;
        let err = parse_descriptor::<EndpointDescriptor>(body, "endpoint authorization").unwrap_err();
        assert_eq!(err.code(), crate::CasperErrorCode::Parse);
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("bad header"));
    }

    #[test]
    fn test_illegal_header_value_is_parse_error() {
        let body = br#"{"url":"https://x","headers":{"User-Agent":"a\nb"},"params":{}}"#;
        let err = parse_descriptor::<LoginDescriptor>(body, "login").unwrap_err();
        assert_eq!(err.code(), crate::CasperErrorCode::Parse);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_not_json_is_parse_error() {
        let err = parse_descriptor::<LoginDescriptor>(b"<html>", "login").unwrap_err();
        assert_eq!(err.code(), crate::CasperErrorCode::Parse);
    }

    #[test]
    fn test_into_authorization_missing_path() {
        let descriptor = EndpointDescriptor {
            endpoints: vec![],
            settings: Default::default(),
        };
        assert!(descriptor.into_authorization("/loq/all_updates").is_err());
    }
}
