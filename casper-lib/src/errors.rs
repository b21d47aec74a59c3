//! Error types for Casper operations.
//!
//! Every failure surfaced by the library is one of six kinds. None of them
//! is retried internally; callers own retry policy and can consult
//! [`CasperError::is_retryable`] to decide.

use std::fmt;

use crate::signing::SigningError;

/// Error codes for FFI and mobile integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum CasperErrorCode {
    /// Malformed or incomplete response body
    Parse = 1000,
    /// Transport failure or non-success HTTP status
    Http = 2000,
    /// Operation attempted without an authenticated session
    Auth = 3000,
    /// Signature or claim token construction failed
    Signing = 4000,
    /// Malformed caller input
    Validation = 5000,
    /// Capability permanently removed
    Deprecated = 6000,
}

/// Boxed underlying cause carried by [`CasperError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Comprehensive error type for Casper operations.
#[derive(Debug)]
pub enum CasperError {
    /// Response body was not valid JSON or lacked required fields.
    Parse {
        /// What could not be interpreted
        message: String,
        /// Decoder error, when one exists
        source: Option<BoxError>,
    },

    /// Transport failure (`status` is `None`) or a non-success HTTP status.
    Http {
        /// HTTP status code, when a response was received
        status: Option<u16>,
        /// Upstream error message, or the status line when none was parseable
        message: String,
        /// Transport error, when no response was received
        source: Option<BoxError>,
    },

    /// No authenticated session, or the platform rejected the credentials.
    Auth(String),

    /// Signature or claim token construction failed.
    Signing(SigningError),

    /// Caller input was rejected before any network I/O.
    Validation {
        /// Field or parameter name
        field: String,
        /// Reason for invalidity
        reason: String,
    },

    /// The requested flow no longer exists. Retrying is always futile.
    Deprecated(&'static str),
}

impl CasperError {
    /// Get the error code for FFI/mobile integration.
    pub fn code(&self) -> CasperErrorCode {
        match self {
            Self::Parse { .. } => CasperErrorCode::Parse,
            Self::Http { .. } => CasperErrorCode::Http,
            Self::Auth(_) => CasperErrorCode::Auth,
            Self::Signing(_) => CasperErrorCode::Signing,
            Self::Validation { .. } => CasperErrorCode::Validation,
            Self::Deprecated(_) => CasperErrorCode::Deprecated,
        }
    }

    /// Get the error message as an owned String (useful for FFI).
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Returns true if this error is potentially recoverable by retrying.
    ///
    /// Only transport failures and 5xx responses qualify.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { status: None, .. } => true,
            Self::Http {
                status: Some(status),
                ..
            } => (500..=599).contains(status),
            _ => false,
        }
    }

    /// HTTP status attached to this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => *status,
            _ => None,
        }
    }

    /// Create a transport error that keeps `err` as its source.
    pub fn transport<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::transport_with(err.to_string(), err)
    }

    /// Create a transport error with a custom message and `err` as its source.
    pub fn transport_with<E>(message: impl Into<String>, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Http {
            status: None,
            message: message.into(),
            source: Some(Box::new(err)),
        }
    }

    /// Create an HTTP status error.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status: Some(status),
            message: message.into(),
            source: None,
        }
    }

    /// Create a parse error with no underlying decoder error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            source: None,
        }
    }

    /// Create a parse error that keeps `err` as its source.
    pub fn parse_with<E>(message: impl Into<String>, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Parse {
            message: message.into(),
            source: Some(Box::new(err)),
        }
    }

    /// Create a validation error.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for CasperError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse { message, .. } => write!(f, "parse error: {}", message),
            Self::Http {
                status: Some(status),
                message,
                ..
            } => write!(f, "HTTP error ({}): {}", status, message),
            Self::Http {
                status: None,
                message,
                ..
            } => write!(f, "HTTP transport error: {}", message),
            Self::Auth(msg) => write!(f, "authentication error: {}", msg),
            Self::Signing(err) => write!(f, "signing error: {}", err),
            Self::Validation { field, reason } => write!(f, "invalid {}: {}", field, reason),
            Self::Deprecated(label) => {
                write!(f, "{} is deprecated and permanently unavailable", label)
            }
        }
    }
}

impl std::error::Error for CasperError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse { source, .. } | Self::Http { source, .. } => source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            Self::Signing(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CasperError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse_with(err.to_string(), err)
    }
}

impl From<SigningError> for CasperError {
    fn from(err: SigningError) -> Self {
        Self::Signing(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = CasperError::Deprecated("attestation");
        assert_eq!(err.code(), CasperErrorCode::Deprecated);
        assert!(!err.is_retryable());

        let err = CasperError::validation("proxy", "missing scheme");
        assert_eq!(err.code(), CasperErrorCode::Validation);
    }

    #[test]
    fn test_retryable_classification() {
        let reset = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "connection reset");
        assert!(CasperError::transport(reset).is_retryable());
        assert!(CasperError::http(503, "unavailable").is_retryable());
        assert!(!CasperError::http(400, "bad request").is_retryable());
        assert!(!CasperError::Auth("no session".into()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = CasperError::http(400, "JWT Exception: Signature verification failed");
        let text = err.to_string();
        assert!(text.contains("400"));
        assert!(text.contains("JWT Exception: Signature verification failed"));
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_from_json_error() {
        let err: CasperError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert_eq!(err.code(), CasperErrorCode::Parse);
    }

    #[test]
    fn test_json_error_kept_as_source() {
        use std::error::Error;

        let err: CasperError = serde_json::from_str::<serde_json::Value>("{\n  \"a\": }")
            .unwrap_err()
            .into();
        let json = err
            .source()
            .and_then(|s| s.downcast_ref::<serde_json::Error>())
            .unwrap();
        assert_eq!(json.line(), 2);
    }

    #[test]
    fn test_transport_error_kept_as_source() {
        use std::error::Error;

        let refused = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = CasperError::transport_with("connection to https://casper.test failed", refused);
        assert_eq!(err.status(), None);
        let io = err
            .source()
            .and_then(|s| s.downcast_ref::<std::io::Error>())
            .unwrap();
        assert_eq!(io.kind(), std::io::ErrorKind::ConnectionRefused);
        assert!(err.to_string().contains("connection to https://casper.test failed"));
    }

    #[test]
    fn test_signing_error_kept_as_source() {
        use std::error::Error;

        let err = CasperError::from(SigningError::EmptySecret);
        assert_eq!(err.code(), CasperErrorCode::Signing);
        assert!(err
            .source()
            .and_then(|s| s.downcast_ref::<SigningError>())
            .is_some());
        assert!(CasperError::parse("missing id").source().is_none());
    }
}
