//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use casper_lib::prelude::*;
//! ```

// Client
pub use crate::client::{CasperClient, Session};
pub use crate::config::{CasperConfig, ProxyUrl};
pub use crate::endpoints::{Endpoint, FriendAction};

// Error handling
pub use crate::errors::{CasperError, CasperErrorCode};
pub use crate::Result;

// Signing
pub use crate::signing::{
    issue_token, sign_request, sign_request_subset, ClaimSet, ParameterSet, SignatureScheme,
};

// Transport traits
pub use crate::transport::{HttpTransport, ReqwestTransport};
