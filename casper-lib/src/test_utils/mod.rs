//! Test utilities for Casper clients.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use casper_lib::test_utils::{fixtures, MockTransport};
//!
//! let transport = MockTransport::new();
//! transport.push_json(200, fixtures::endpoint_descriptor("/loq/all_updates"));
//! transport.push_json(200, serde_json::json!({"updates_response": {}}));
//!
//! let client = CasperClient::with_transport(fixtures::test_config(), transport);
//! ```

pub mod fixtures;
mod mock_transport;

pub use mock_transport::MockTransport;
