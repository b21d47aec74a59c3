use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::config::ProxyUrl;
use crate::Result;

/// HTTP methods used by the signing service and the platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// Parameters travel in the query string.
    Get,
    /// Parameters travel in a form-encoded body.
    Post,
}

impl HttpMethod {
    /// Method name as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outgoing request. Header names are stored lower-cased.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpRequest {
    /// Request method.
    pub method: HttpMethod,
    /// Absolute URL without query string.
    pub url: String,
    /// Headers, keyed by lower-cased name.
    pub headers: BTreeMap<String, String>,
    /// Parameters, encoded according to `method`.
    pub params: Vec<(String, String)>,
}

impl HttpRequest {
    /// Create a request with no headers or parameters.
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: BTreeMap::new(),
            params: Vec::new(),
        }
    }

    /// Set a header, replacing any existing header with the same name.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
    }

    /// Builder-style [`set_header`](Self::set_header).
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// Look up a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Look up a parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// One received response. Header names are stored lower-cased.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Status line, e.g. `400 Bad Request`.
    pub status_line: String,
    /// Headers, keyed by lower-cased name.
    pub headers: BTreeMap<String, String>,
    /// Raw body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Build a response with a canonical status line.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        let reason = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or_default();
        Self {
            status,
            status_line: format!("{} {}", status, reason).trim_end().to_string(),
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    /// Builder-style header insert.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Look up a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// The only place network I/O happens.
///
/// Implementations perform exactly one exchange per call and never retry.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send a request and return whatever response arrived, of any status.
    ///
    /// Errors are reserved for transport failures where no response exists.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;

    /// Route subsequent requests through `proxy`, or directly when `None`.
    ///
    /// On error the transport keeps its previous routing.
    fn set_proxy(&mut self, proxy: Option<&ProxyUrl>) -> Result<()>;
}
