//! Client configuration.
//!
//! # Environment Variables
//!
//! [`CasperConfig::from_env`] reads:
//! - `CASPER_API_KEY`, `CASPER_API_SECRET` - signing service credentials (required)
//! - `CASPER_USERNAME`, `CASPER_PASSWORD` - platform account
//! - `CASPER_PROJECT` - project tag appended to the user-agent
//! - `CASPER_PROXY` - proxy URL (enables relaxed TLS verification)
//! - `CASPER_SERVICE_URL`, `CASPER_PLATFORM_URL` - base URL overrides
//! - `CASPER_TIMEOUT_SECS` - request timeout

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::{CasperError, Result};

/// Default signing service base URL.
pub const DEFAULT_SERVICE_URL: &str = "https://casper-api.herokuapp.com";

/// Default target platform base URL.
pub const DEFAULT_PLATFORM_URL: &str = "https://app.snapchat.com";

const PROXY_SCHEMES: &[&str] = &["http", "https"];

/// A validated proxy address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProxyUrl(String);

impl ProxyUrl {
    /// Validate a proxy URL.
    ///
    /// The scheme must be `http` or `https`, a host is required, and the
    /// authority may not contain percent-escapes.
    ///
    /// # Example
    ///
    /// ```
    /// use casper_lib::ProxyUrl;
    ///
    /// assert!(ProxyUrl::parse("http://192.168.2.3:8080").is_ok());
    /// assert!(ProxyUrl::parse("192.168.2.3:8080").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = |reason: String| CasperError::validation("proxy", reason);

        let url = reqwest::Url::parse(raw).map_err(|e| invalid(format!("{}: {}", raw, e)))?;

        if !PROXY_SCHEMES.contains(&url.scheme()) {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(invalid(format!("{} has no host", raw)));
        }

        // The URL parser percent-decodes hosts, which would accept "%31" as "1".
        let authority = raw
            .split_once("://")
            .map(|(_, rest)| rest.split('/').next().unwrap_or_default())
            .unwrap_or_default();
        if authority.contains('%') {
            return Err(invalid(format!("{} has an escaped host", raw)));
        }

        Ok(Self(raw.to_string()))
    }

    /// Get the proxy URL as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ProxyUrl {
    type Error = CasperError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ProxyUrl> for String {
    fn from(proxy: ProxyUrl) -> Self {
        proxy.0
    }
}

impl std::fmt::Display for ProxyUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Credentials and endpoints for one client instance.
#[derive(Clone, Serialize, Deserialize)]
pub struct CasperConfig {
    /// Signing service API key, sent as `X-Casper-API-Key`.
    pub api_key: String,

    /// Signing service API secret. Never serialized into requests or logs.
    #[serde(with = "zeroizing_string")]
    pub api_secret: Zeroizing<String>,

    /// Platform username.
    #[serde(default)]
    pub username: String,

    /// Platform password.
    #[serde(default, with = "zeroizing_string")]
    pub password: Zeroizing<String>,

    /// Optional project tag appended to the user-agent.
    #[serde(default)]
    pub project_name: Option<String>,

    /// Optional proxy. When set, TLS certificate verification is relaxed.
    #[serde(default)]
    pub proxy: Option<ProxyUrl>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Signing service base URL.
    #[serde(default = "default_service_url")]
    pub service_url: String,

    /// Target platform base URL.
    #[serde(default = "default_platform_url")]
    pub platform_url: String,
}

fn default_timeout() -> u64 {
    30
}

fn default_service_url() -> String {
    DEFAULT_SERVICE_URL.to_string()
}

fn default_platform_url() -> String {
    DEFAULT_PLATFORM_URL.to_string()
}

mod zeroizing_string {
    use serde::{Deserialize, Deserializer, Serializer};
    use zeroize::Zeroizing;

    pub fn serialize<S: Serializer>(value: &Zeroizing<String>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(value.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Zeroizing<String>, D::Error> {
        String::deserialize(d).map(Zeroizing::new)
    }
}

impl CasperConfig {
    /// Create a configuration with signing service credentials.
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: Zeroizing::new(api_secret.into()),
            username: String::new(),
            password: Zeroizing::new(String::new()),
            project_name: None,
            proxy: None,
            timeout_secs: default_timeout(),
            service_url: default_service_url(),
            platform_url: default_platform_url(),
        }
    }

    /// Set the platform account.
    pub fn with_account(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = Zeroizing::new(password.into());
        self
    }

    /// Set the project tag.
    pub fn with_project_name(mut self, project: impl Into<String>) -> Self {
        self.project_name = Some(project.into());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Override the signing service base URL.
    pub fn with_service_url(mut self, url: impl Into<String>) -> Self {
        self.service_url = url.into();
        self
    }

    /// Override the platform base URL.
    pub fn with_platform_url(mut self, url: impl Into<String>) -> Self {
        self.platform_url = url.into();
        self
    }

    /// Validate and set a proxy. On error the configuration is unchanged.
    pub fn set_proxy(&mut self, raw: &str) -> Result<()> {
        self.proxy = Some(ProxyUrl::parse(raw)?);
        Ok(())
    }

    /// Remove the proxy.
    pub fn clear_proxy(&mut self) {
        self.proxy = None;
    }

    /// The `User-Agent` sent to the signing service and the platform.
    pub fn user_agent(&self) -> String {
        let base = format!("CasperRustClient/{}", crate::VERSION);
        match self.project_name.as_deref() {
            Some(project) if !project.is_empty() => format!("{} ({})", base, project),
            _ => base,
        }
    }

    /// Join a path onto the signing service base URL.
    pub fn service_endpoint(&self, path: &str) -> String {
        join_url(&self.service_url, path)
    }

    /// Join a path onto the platform base URL.
    pub fn platform_endpoint(&self, path: &str) -> String {
        join_url(&self.platform_url, path)
    }

    /// Load a configuration from `CASPER_*` environment variables.
    ///
    /// Returns `None` if the API key or secret is missing, and an error if a
    /// present variable is malformed.
    pub fn from_env() -> Result<Option<Self>> {
        let (Ok(key), Ok(secret)) = (
            std::env::var("CASPER_API_KEY"),
            std::env::var("CASPER_API_SECRET"),
        ) else {
            return Ok(None);
        };

        let mut config = Self::new(key, secret);

        if let Ok(username) = std::env::var("CASPER_USERNAME") {
            config.username = username;
        }
        if let Ok(password) = std::env::var("CASPER_PASSWORD") {
            config.password = Zeroizing::new(password);
        }
        if let Ok(project) = std::env::var("CASPER_PROJECT") {
            config.project_name = Some(project);
        }
        if let Ok(proxy) = std::env::var("CASPER_PROXY") {
            config.set_proxy(&proxy)?;
        }
        if let Ok(url) = std::env::var("CASPER_SERVICE_URL") {
            config.service_url = url;
        }
        if let Ok(url) = std::env::var("CASPER_PLATFORM_URL") {
            config.platform_url = url;
        }
        if let Ok(timeout) = std::env::var("CASPER_TIMEOUT_SECS") {
            config.timeout_secs = parse_timeout_secs(&timeout)?;
        }

        Ok(Some(config))
    }
}

impl std::fmt::Debug for CasperConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CasperConfig")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("project_name", &self.project_name)
            .field("proxy", &self.proxy)
            .field("timeout_secs", &self.timeout_secs)
            .field("service_url", &self.service_url)
            .field("platform_url", &self.platform_url)
            .finish()
    }
}

/// Parse a request timeout. Zero would make every request fail immediately.
fn parse_timeout_secs(raw: &str) -> Result<u64> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(CasperError::validation(
            "CASPER_TIMEOUT_SECS",
            "must be at least 1 second",
        )),
        Ok(secs) => Ok(secs),
        Err(_) => Err(CasperError::validation("CASPER_TIMEOUT_SECS", "not an integer")),
    }
}

/// Join `path` onto `base`, or return `path` unchanged if it is absolute.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_secs() {
        assert_eq!(parse_timeout_secs("45").unwrap(), 45);
        assert_eq!(parse_timeout_secs(" 1 ").unwrap(), 1);
        for raw in ["0", "-5", "ten", ""] {
            let err = parse_timeout_secs(raw).unwrap_err();
            assert_eq!(err.code(), crate::CasperErrorCode::Validation, "{:?}", raw);
        }
    }

    #[test]
    fn test_valid_proxies() {
        for raw in [
            "http://192.168.2.3",
            "http://192.168.2.3:8080",
            "https://192.168.2.3",
        ] {
            assert!(ProxyUrl::parse(raw).is_ok(), "{} should be accepted", raw);
        }
    }

    #[test]
    fn test_invalid_proxies() {
        for raw in [
            "192.168.2.3",
            "192.168.2.3:8080",
            "192.168.2::8080",
            "192.168:8080",
            "http://192.168.0.%31/",
            "http://192.168.0.%31:8080/",
            "localhost:8080",
            "ftp://192.168.2.3",
            "socks5://127.0.0.1:9050",
            "",
        ] {
            let err = ProxyUrl::parse(raw).unwrap_err();
            assert_eq!(err.code(), crate::CasperErrorCode::Validation, "{}", raw);
        }
    }

    #[test]
    fn test_set_proxy_failure_keeps_previous_value() {
        let mut config = CasperConfig::new("key", "secret");
        config.set_proxy("http://10.0.0.1:8888").unwrap();
        assert!(config.set_proxy("10.0.0.2:8888").is_err());
        assert_eq!(
            config.proxy.as_ref().map(ProxyUrl::as_str),
            Some("http://10.0.0.1:8888")
        );
    }

    #[test]
    fn test_user_agent_with_project() {
        let config = CasperConfig::new("key", "secret");
        assert!(config.user_agent().starts_with("CasperRustClient/"));
        assert!(!config.user_agent().contains('('));

        let config = config.with_project_name("story-archiver");
        assert!(config.user_agent().ends_with(" (story-archiver)"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = CasperConfig::new("key", "super-secret").with_account("alice", "hunter2");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("alice"));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: CasperConfig = serde_json::from_value(serde_json::json!({
            "api_key": "key",
            "api_secret": "secret",
            "proxy": "http://127.0.0.1:8888"
        }))
        .unwrap();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.service_url, DEFAULT_SERVICE_URL);
        assert_eq!(config.api_secret.as_str(), "secret");
        assert!(config.proxy.is_some());

        let bad = serde_json::from_value::<CasperConfig>(serde_json::json!({
            "api_key": "key",
            "api_secret": "secret",
            "proxy": "127.0.0.1:8888"
        }));
        assert!(bad.is_err());
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("https://a.b/", "/loq/login"), "https://a.b/loq/login");
        assert_eq!(join_url("https://a.b", "loq/login"), "https://a.b/loq/login");
        assert_eq!(
            join_url("https://a.b", "https://c.d/x"),
            "https://c.d/x"
        );
    }
}
