//! `reqwest`-backed transport.

use std::time::Duration;

use async_trait::async_trait;

use super::traits::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use crate::config::{CasperConfig, ProxyUrl};
use crate::{CasperError, Result};

/// Production transport over HTTPS.
///
/// When a proxy is configured, every request is routed through it and
/// invalid TLS certificates are accepted so that intercepting proxies work.
/// This never happens without an explicit proxy.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout_secs: u64,
}

impl ReqwestTransport {
    /// Build a transport from the timeout and proxy in `config`.
    pub fn new(config: &CasperConfig) -> Result<Self> {
        Self::build(config.timeout_secs, config.proxy.as_ref())
    }

    /// Build a transport with an explicit timeout and optional proxy.
    pub fn build(timeout_secs: u64, proxy: Option<&ProxyUrl>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().timeout(Duration::from_secs(timeout_secs));

        if let Some(proxy) = proxy {
            let proxy = reqwest::Proxy::all(proxy.as_str())
                .map_err(|e| CasperError::validation("proxy", e.to_string()))?;
            builder = builder.proxy(proxy).danger_accept_invalid_certs(true);
        }

        let client = builder.build().map_err(CasperError::transport)?;

        Ok(Self {
            client,
            timeout_secs,
        })
    }

    fn map_reqwest_error(&self, url: &str, e: reqwest::Error) -> CasperError {
        // Builder errors come from a malformed URL or header and never succeed on retry.
        if e.is_builder() {
            return CasperError::parse_with(format!("request to {} could not be built: {}", url, e), e);
        }
        let message = if e.is_timeout() {
            format!("{} timed out after {}s", url, self.timeout_secs)
        } else if e.is_connect() {
            format!("connection to {} failed: {}", url, e)
        } else {
            format!("request to {} failed: {}", url, e)
        };
        CasperError::transport_with(message, e)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url).query(&request.params),
            HttpMethod::Post => self.client.post(&request.url).form(&request.params),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(&request.url, e))?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.map_reqwest_error(&request.url, e))?;

        Ok(HttpResponse {
            status: status.as_u16(),
            status_line: status.to_string(),
            headers,
            body: body.to_vec(),
        })
    }

    fn set_proxy(&mut self, proxy: Option<&ProxyUrl>) -> Result<()> {
        *self = Self::build(self.timeout_secs, proxy)?;
        Ok(())
    }
}
