//! In-memory transport for exercising the client without a network.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::ProxyUrl;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};
use crate::{CasperError, Result};

/// Replays queued responses and records every request it receives.
///
/// When the queue is empty, `send` fails with a transport error.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: RwLock<VecDeque<Result<HttpResponse>>>,
    requests: RwLock<Vec<HttpRequest>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
    proxy: Option<ProxyUrl>,
}

impl MockTransport {
    /// Create an empty mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every response by `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a response.
    pub fn push_response(&self, response: HttpResponse) {
        self.responses.write().unwrap().push_back(Ok(response));
    }

    /// Queue a JSON response with the given status.
    pub fn push_json(&self, status: u16, body: serde_json::Value) {
        self.push_response(HttpResponse::new(status, body.to_string()));
    }

    /// Queue a transport failure.
    pub fn push_error(&self, message: &str) {
        self.responses
            .write()
            .unwrap()
            .push_back(Err(CasperError::transport(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                message.to_string(),
            ))));
    }

    /// Number of `send` calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Snapshot of every request received, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.read().unwrap().clone()
    }

    /// Proxy most recently applied through [`HttpTransport::set_proxy`].
    pub fn proxy(&self) -> Option<&ProxyUrl> {
        self.proxy.as_ref()
    }

    /// The most recent request.
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.read().unwrap().last().cloned()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.write().unwrap().push(request);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.responses.write().unwrap().pop_front();
        next.unwrap_or_else(|| {
            Err(CasperError::transport(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "mock transport has no queued response",
            )))
        })
    }

    fn set_proxy(&mut self, proxy: Option<&ProxyUrl>) -> Result<()> {
        self.proxy = proxy.cloned();
        Ok(())
    }
}
