//! Authenticated request dispatch to the target platform.
//!
//! The dispatcher merges resolved headers with the fixed client headers,
//! encodes parameters according to the method, performs exactly one
//! exchange and classifies the outcome:
//!
//! | Outcome                        | Result                                   |
//! |--------------------------------|------------------------------------------|
//! | transport failure              | `Http { status: None }`                  |
//! | status == expected             | `Ok(DispatchResponse)`                   |
//! | any other status               | `Http { status }` with upstream message  |

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::config::CasperConfig;
use crate::signing::{ParameterSet, SignatureScheme};
use crate::transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use crate::{CasperError, Result};

/// Header carrying the signing service API key.
pub const CASPER_API_KEY_HEADER: &str = "X-Casper-API-Key";

/// Header carrying a `v1:` request signature.
pub const CASPER_SIGNATURE_HEADER: &str = "X-Casper-Signature";

/// Error body returned by the signing service (`code`) or the platform (`status`).
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    status: Option<i64>,
    message: String,
}

/// Build the error for a response whose status was not the one expected.
///
/// Uses the `message` of a `{code, message}` or `{status, message}` body when
/// one parses, and the status line otherwise.
pub(crate) fn error_from_response(response: &HttpResponse) -> CasperError {
    let message = match serde_json::from_slice::<ErrorEnvelope>(&response.body) {
        Ok(envelope) if !envelope.message.is_empty() => {
            match envelope.code.or(envelope.status) {
                Some(code) if code != i64::from(response.status) => {
                    format!("{} (code {})", envelope.message, code)
                }
                _ => envelope.message,
            }
        }
        _ => response.status_line.clone(),
    };
    CasperError::http(response.status, message)
}

/// One request to the platform.
#[derive(Clone, Debug)]
pub struct DispatchRequest {
    /// Request method.
    pub method: HttpMethod,
    /// Path relative to the platform base URL, or an absolute URL.
    pub path: String,
    /// Request parameters.
    pub params: ParameterSet,
    /// Resolved headers. They override the fixed client headers.
    pub headers: BTreeMap<String, String>,
    /// Status treated as success.
    pub expected_status: u16,
    /// Attach an `X-Casper-Signature` computed under this scheme.
    pub signature: Option<SignatureScheme>,
}

impl DispatchRequest {
    /// Create a request expecting `200 OK`.
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: ParameterSet::new(),
            headers: BTreeMap::new(),
            expected_status: 200,
            signature: None,
        }
    }

    /// Set the parameters.
    pub fn with_params(mut self, params: ParameterSet) -> Self {
        self.params = params;
        self
    }

    /// Set the resolved headers.
    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// Set the status treated as success.
    pub fn expect_status(mut self, status: u16) -> Self {
        self.expected_status = status;
        self
    }

    /// Sign the parameters under `scheme`.
    pub fn signed(mut self, scheme: SignatureScheme) -> Self {
        self.signature = Some(scheme);
        self
    }
}

/// A classified, successful platform response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchResponse {
    /// Status code (equal to the expected status).
    pub status: u16,
    /// Response headers, keyed by lower-cased name.
    pub headers: BTreeMap<String, String>,
    /// Raw body. Decoding is up to the caller.
    pub body: Vec<u8>,
    /// Captcha identifier from `Content-Disposition`, when present.
    pub captcha_id: Option<String>,
}

impl DispatchResponse {
    fn from_http(response: HttpResponse) -> Self {
        let captcha_id = response
            .header("content-disposition")
            .and_then(attachment_stem);
        Self {
            status: response.status,
            headers: response.headers,
            body: response.body,
            captcha_id,
        }
    }

    /// Decode the body as JSON.
    pub fn json<D: for<'de> Deserialize<'de>>(&self) -> Result<D> {
        serde_json::from_slice(&self.body).map_err(CasperError::from)
    }
}

/// `attachment;filename=abc123.zip` -> `abc123`
fn attachment_stem(disposition: &str) -> Option<String> {
    let filename = disposition
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))?
        .trim_matches('"');
    let stem = filename
        .rsplit_once('.')
        .map_or(filename, |(stem, _)| stem);
    (!stem.is_empty()).then(|| stem.to_string())
}

/// Issues platform requests over a transport.
pub struct Dispatcher<'a, T: ?Sized> {
    transport: &'a T,
    config: &'a CasperConfig,
}

impl<'a, T: HttpTransport + ?Sized> Dispatcher<'a, T> {
    /// Create a dispatcher over a transport and configuration.
    pub fn new(transport: &'a T, config: &'a CasperConfig) -> Self {
        Self { transport, config }
    }

    /// Build the wire request without sending it.
    pub fn build_request(&self, request: &DispatchRequest) -> Result<HttpRequest> {
        let mut http = HttpRequest::new(request.method, self.config.platform_endpoint(&request.path))
            .with_header(CASPER_API_KEY_HEADER, self.config.api_key.as_str())
            .with_header("User-Agent", self.config.user_agent())
            .with_header("Accept", "*/*");
        if request.method == HttpMethod::Post {
            http.set_header("Content-Type", "application/x-www-form-urlencoded");
        }
        for (name, value) in &request.headers {
            http.set_header(name, value.as_str());
        }
        if let Some(scheme) = request.signature {
            let signature = scheme.sign(&request.params, &self.config.api_secret)?;
            http.set_header(CASPER_SIGNATURE_HEADER, signature.as_str());
        }
        http.params = request.params.to_pairs();
        Ok(http)
    }

    /// Send one request and classify the response.
    #[tracing::instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn dispatch(&self, request: DispatchRequest) -> Result<DispatchResponse> {
        let http = self.build_request(&request)?;
        let response = self.transport.send(http).await?;

        if response.status == request.expected_status {
            tracing::debug!(status = response.status, bytes = response.body.len(), "dispatched");
            return Ok(DispatchResponse::from_http(response));
        }

        let err = error_from_response(&response);
        tracing::warn!(
            status = response.status,
            expected = request.expected_status,
            "unexpected platform status"
        );
        Err(err)
    }

    /// [`dispatch`](Self::dispatch) bounded by `deadline`.
    ///
    /// On expiry the in-flight request is dropped and an `Http` error without
    /// a status is returned.
    pub async fn dispatch_with_deadline(
        &self,
        request: DispatchRequest,
        deadline: Duration,
    ) -> Result<DispatchResponse> {
        let path = request.path.clone();
        tokio::time::timeout(deadline, self.dispatch(request))
            .await
            .map_err(|elapsed| {
                CasperError::transport_with(
                    format!("{} exceeded deadline of {}ms", path, deadline.as_millis()),
                    elapsed,
                )
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::{sign_request, CLIENT_AUTH_FIELDS};
    use crate::test_utils::MockTransport;

    fn config() -> CasperConfig {
        CasperConfig::new("key", "secret").with_platform_url("https://platform.test")
    }

    #[test]
    fn test_error_envelope_message() {
        let response = HttpResponse::new(
            400,
            r#"{"code":400,"message":"JWT Exception: Signature verification failed"}"#,
        );
        let err = error_from_response(&response);
        assert_eq!(err.status(), Some(400));
        assert!(err
            .to_string()
            .contains("JWT Exception: Signature verification failed"));
    }

    #[test]
    fn test_error_falls_back_to_status_line() {
        let err = error_from_response(&HttpResponse::new(502, "<html>bad gateway</html>"));
        assert_eq!(err.to_string(), "HTTP error (502): 502 Bad Gateway");
    }

    #[test]
    fn test_platform_error_code_kept() {
        let response = HttpResponse::new(401, r#"{"status":-100,"message":"Bad token","logged":false}"#);
        let err = error_from_response(&response);
        assert!(err.to_string().contains("Bad token (code -100)"));
    }

    #[test]
    fn test_attachment_stem() {
        assert_eq!(
            attachment_stem("attachment;filename=abc123.zip").as_deref(),
            Some("abc123")
        );
        assert_eq!(
            attachment_stem("attachment; filename=\"x.y.zip\"").as_deref(),
            Some("x.y")
        );
        assert_eq!(attachment_stem("inline"), None);
    }

    #[test]
    fn test_resolved_headers_override_fixed_headers() {
        let config = config();
        let transport = MockTransport::new();
        let dispatcher = Dispatcher::new(&transport, &config);

        let mut headers = BTreeMap::new();
        headers.insert("User-Agent".to_string(), "Snapchat/9.16.2.0".to_string());
        let request = DispatchRequest::new(HttpMethod::Post, "/loq/all_updates").with_headers(headers);
        let http = dispatcher.build_request(&request).unwrap();

        assert_eq!(http.url, "https://platform.test/loq/all_updates");
        assert_eq!(http.header("user-agent"), Some("Snapchat/9.16.2.0"));
        assert_eq!(http.header("x-casper-api-key"), Some("key"));
        assert_eq!(
            http.header("content-type"),
            Some("application/x-www-form-urlencoded")
        );
        assert!(http.header(CASPER_SIGNATURE_HEADER).is_none());
    }

    #[test]
    fn test_get_has_no_content_type() {
        let config = config();
        let transport = MockTransport::new();
        let dispatcher = Dispatcher::new(&transport, &config);
        let http = dispatcher
            .build_request(&DispatchRequest::new(HttpMethod::Get, "/discover/channel_list"))
            .unwrap();
        assert!(http.header("content-type").is_none());
    }

    #[test]
    fn test_signature_header_per_scheme() {
        let config = config();
        let transport = MockTransport::new();
        let dispatcher = Dispatcher::new(&transport, &config);
        let params = ParameterSet::new().with("username", "alice").with("extra", "1");

        let full = dispatcher
            .build_request(
                &DispatchRequest::new(HttpMethod::Post, "/x")
                    .with_params(params.clone())
                    .signed(SignatureScheme::FullSorted),
            )
            .unwrap();
        let expected = sign_request(&params, "secret").unwrap();
        assert_eq!(full.header(CASPER_SIGNATURE_HEADER), Some(expected.as_str()));

        let subset = dispatcher
            .build_request(
                &DispatchRequest::new(HttpMethod::Post, "/x")
                    .with_params(params)
                    .signed(SignatureScheme::FixedSubset(CLIENT_AUTH_FIELDS)),
            )
            .unwrap();
        assert_ne!(
            subset.header(CASPER_SIGNATURE_HEADER),
            Some(expected.as_str())
        );
    }

    #[tokio::test]
    async fn test_expected_non_200_status() {
        let config = config();
        let transport = MockTransport::new();
        transport.push_response(HttpResponse::new(204, Vec::new()));
        let dispatcher = Dispatcher::new(&transport, &config);

        let response = dispatcher
            .dispatch(DispatchRequest::new(HttpMethod::Post, "/bq/delete_story").expect_status(204))
            .await
            .unwrap();
        assert_eq!(response.status, 204);
    }

    #[tokio::test]
    async fn test_unexpected_success_status_is_error() {
        let config = config();
        let transport = MockTransport::new();
        transport.push_response(HttpResponse::new(200, "{}"));
        let dispatcher = Dispatcher::new(&transport, &config);

        let err = dispatcher
            .dispatch(DispatchRequest::new(HttpMethod::Post, "/bq/delete_story").expect_status(204))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(200));
    }

    #[tokio::test]
    async fn test_captcha_id_extracted() {
        let config = config();
        let transport = MockTransport::new();
        transport.push_response(
            HttpResponse::new(200, vec![0x50, 0x4b])
                .with_header("Content-Disposition", "attachment;filename=captcha42.zip"),
        );
        let dispatcher = Dispatcher::new(&transport, &config);

        let response = dispatcher
            .dispatch(DispatchRequest::new(HttpMethod::Post, "/bq/get_captcha"))
            .await
            .unwrap();
        assert_eq!(response.captcha_id.as_deref(), Some("captcha42"));
        assert_eq!(response.body, vec![0x50, 0x4b]);
    }

    #[tokio::test]
    async fn test_deadline_exceeded() {
        let config = config();
        let transport = MockTransport::new().with_delay(Duration::from_millis(200));
        transport.push_response(HttpResponse::new(200, "{}"));
        let dispatcher = Dispatcher::new(&transport, &config);

        let err = dispatcher
            .dispatch_with_deadline(
                DispatchRequest::new(HttpMethod::Post, "/loq/all_updates"),
                Duration::from_millis(10),
            )
            .await
            .unwrap_err();
        assert_eq!(err.status(), None);
        assert!(err.to_string().contains("deadline"));
    }
}
