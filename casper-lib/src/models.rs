//! Platform response models the client itself needs to interpret.
//!
//! Everything else is returned as raw bytes or [`serde_json::Value`].

use serde::{Deserialize, Serialize};

/// Error body the platform returns with a 200 status.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformError {
    /// Human-readable reason.
    #[serde(default)]
    pub message: String,
    /// Platform status code (negative on failure).
    #[serde(default)]
    pub status: i64,
    /// Whether the account is logged in.
    #[serde(default)]
    pub logged: bool,
}

/// Session fields carried inside a login response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatesSummary {
    /// Canonical username.
    pub username: String,
    /// Session auth token.
    pub auth_token: String,
}

#[derive(Deserialize)]
pub(crate) struct LoginEnvelope {
    pub updates_response: Option<UpdatesSummary>,
    #[serde(flatten)]
    pub error: PlatformError,
}

/// Result of a successful login.
#[derive(Clone, Debug, PartialEq)]
pub struct LoginResponse {
    /// Username the session is bound to.
    pub username: String,
    /// Full response body.
    pub raw: serde_json::Value,
}

/// Result of a registration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterResponse {
    /// Session auth token for the new account.
    pub auth_token: String,
    /// Username assigned by default.
    pub default_username: String,
    /// Whether `default_username` is usable.
    pub default_username_status: bool,
    /// Registered email.
    pub email: String,
    /// Whether the account is logged in.
    pub logged: bool,
    /// Platform message on failure.
    pub message: String,
    /// Whether a phone verification text should be sent.
    pub should_send_text_to_verify_number: bool,
    /// Platform phone number for verification.
    pub snapchat_phone_number: String,
    /// Platform user id.
    pub user_id: String,
    /// Alternative usernames.
    pub username_suggestions: Vec<String>,
}

/// A captcha challenge: an archive of images and its identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaptchaChallenge {
    /// Identifier to submit with the solution.
    pub id: String,
    /// Zip archive of challenge images.
    pub archive: Vec<u8>,
}
