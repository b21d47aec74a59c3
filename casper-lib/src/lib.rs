//! Casper client library.
//!
//! Talks to the Casper signing service, which authorizes requests to the
//! Snapchat platform, and then to the platform itself. The crate holds no
//! global state: every client owns its credentials, its transport and at
//! most one session.
//!
//! # Features
//!
//! - **Signing**: canonical parameter serialization, `v1:` HMAC-SHA256
//!   request signatures and HS256 claim tokens
//! - **Endpoint Resolution**: exchange claim tokens for per-call headers and
//!   single-use parameters
//! - **Dispatch**: a single authenticated request primitive with explicit
//!   success statuses and a classified error model
//! - **Transport Abstraction**: trait-based HTTP seam with an HTTPS
//!   implementation and an in-memory mock for tests
//!
//! # Example
//!
//! ```no_run
//! use casper_lib::{CasperClient, CasperConfig, FriendAction};
//!
//! # async fn demo() -> casper_lib::Result<()> {
//! let config = CasperConfig::new("api-key", "api-secret")
//!     .with_account("alice", "hunter2")
//!     .with_project_name("demo");
//!
//! let mut client = CasperClient::new(config)?;
//! client.login().await?;
//! client.friend(FriendAction::Add, "bob", None).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod dispatcher;
pub mod endpoints;
pub mod errors;
pub mod models;
pub mod prelude;
pub mod resolver;
pub mod signing;
pub mod transport;

/// Test utilities: an in-memory transport and canned service payloads.
///
/// This module is only available with the `test-utils` feature or in test builds.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use client::{CasperClient, Session};
pub use config::{CasperConfig, ProxyUrl};
pub use dispatcher::{DispatchRequest, DispatchResponse, Dispatcher};
pub use endpoints::{Access, Endpoint, FriendAction};
pub use errors::{BoxError, CasperError, CasperErrorCode};
pub use resolver::{EndpointAuthorization, EndpointDescriptor, EndpointResolver, LoginDescriptor};
pub use signing::{
    issue_token, sign_request, sign_request_subset, ClaimSet, ClaimToken, ParameterSet,
    RequestSignature, SignatureScheme, SigningError, SIGNATURE_PREFIX,
};
pub use transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};

/// Common result alias for Casper operations.
pub type Result<T> = std::result::Result<T, CasperError>;

/// Crate version, reported in the default user-agent.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
