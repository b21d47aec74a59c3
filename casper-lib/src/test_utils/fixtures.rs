//! Canned configurations and signing service responses.

use serde_json::{json, Value};

use crate::CasperConfig;

/// API key used throughout the test suite.
pub const TEST_API_KEY: &str = "test_api_key";

/// API secret used throughout the test suite.
pub const TEST_API_SECRET: &str = "test_api_secret";

/// Configuration with test credentials and an account.
pub fn test_config() -> CasperConfig {
    CasperConfig::new(TEST_API_KEY, TEST_API_SECRET)
        .with_account("test_username", "test_password")
        .with_service_url("https://casper.test")
        .with_platform_url("https://platform.test")
}

/// Login descriptor pointing at `url`.
pub fn login_descriptor(url: &str) -> Value {
    json!({
        "url": url,
        "headers": {
            "User-Agent": "Snapchat/9.16.2.0 (Android)",
            "X-Snapchat-Client-Auth-Token": "Bearer client-auth"
        },
        "params": {
            "username": "test_username",
            "password": "test_password",
            "req_token": "login-req-token",
            "timestamp": 1457484764000u64
        }
    })
}

/// Endpoint descriptor authorizing a single `path`.
pub fn endpoint_descriptor(path: &str) -> Value {
    json!({
        "endpoints": [{
            "endpoint": path,
            "headers": {
                "User-Agent": "Snapchat/9.16.2.0 (Android)",
                "X-Snapchat-Client-Auth-Token": "Bearer client-auth",
                "X-Snapchat-UUID": "00000000-0000-0000-0000-000000000000"
            },
            "params": {
                "username": "test_username",
                "req_token": "single-use-token",
                "timestamp": 1457484764000u64
            },
            "cache_millis": 0
        }],
        "settings": {}
    })
}

/// Platform login body for a successful login.
pub fn login_success(username: &str, auth_token: &str) -> Value {
    json!({
        "updates_response": {
            "username": username,
            "auth_token": auth_token,
            "logged": true
        },
        "friends_response": {"friends": []}
    })
}

/// Platform login body for a rejected login.
pub fn login_failure(message: &str) -> Value {
    json!({
        "status": -100,
        "message": message,
        "logged": false
    })
}
