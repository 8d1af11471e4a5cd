use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::source::{SourceError, SourceErrorKind};

/// Validation errors for caller-supplied input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter: '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("Invalid option type '{value}'. Must be one of: call, put")]
    InvalidOptionType { value: String },
    #[error("Invalid interval. Must be one of: 5minute, 10minute, hour, day, week")]
    InvalidInterval { value: String },
    #[error("Invalid span. Must be one of: day, week, month, 3month, year, 5year")]
    InvalidSpan { value: String },
    #[error("Invalid bounds. Must be one of: extended, trading, regular")]
    InvalidBounds { value: String },
    #[error("Invalid order type '{value}'. Must be one of: all, crypto, option, stock")]
    InvalidOrderKind { value: String },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },
}

/// Top-level error type for core plumbing outside the service layer.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("session file error: {0}")]
    Io(#[from] std::io::Error),
}

/// Service-level error classification surfaced to tool callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    InvalidArgument,
    AuthRequired,
    Upstream,
    Network,
}

/// Structured error returned by every service operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    kind: ServiceErrorKind,
    message: String,
}

impl ServiceError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self {
            kind: ServiceErrorKind::InvalidArgument,
            message: message.into(),
        }
    }

    pub fn auth_required(message: impl Into<String>) -> Self {
        Self {
            kind: ServiceErrorKind::AuthRequired,
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self {
            kind: ServiceErrorKind::Upstream,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: ServiceErrorKind::Network,
            message: message.into(),
        }
    }

    /// Wraps a failure raised while talking to the upstream.
    ///
    /// Auth and argument failures pass through untouched; everything else is
    /// reported as an upstream error prefixed with `context`.
    pub fn wrap_upstream(context: &str, error: SourceError) -> Self {
        match error.kind() {
            SourceErrorKind::AuthRequired => Self::auth_required(error.message()),
            SourceErrorKind::InvalidRequest => Self::invalid_argument(error.message()),
            _ => Self::upstream(format!("{context}: {}", error.message())),
        }
    }

    pub const fn kind(&self) -> ServiceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            ServiceErrorKind::InvalidArgument => "INVALID_ARGUMENT",
            ServiceErrorKind::AuthRequired => "AUTH_REQUIRED",
            ServiceErrorKind::Upstream => "ROBINHOOD_ERROR",
            ServiceErrorKind::Network => "NETWORK_ERROR",
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message)
    }
}

impl std::error::Error for ServiceError {}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::invalid_argument(value.to_string())
    }
}

/// Session failures keep their kind: an auth failure stays an auth failure and
/// a transport failure during login is a network failure.
impl From<SourceError> for ServiceError {
    fn from(value: SourceError) -> Self {
        match value.kind() {
            SourceErrorKind::AuthRequired => Self::auth_required(value.message()),
            SourceErrorKind::InvalidRequest => Self::invalid_argument(value.message()),
            SourceErrorKind::Unavailable => Self::network(value.message()),
            SourceErrorKind::NotFound | SourceErrorKind::Internal => {
                Self::upstream(value.message())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_upstream_keeps_auth_failures_unchanged() {
        let error = ServiceError::wrap_upstream(
            "Failed to fetch options chain",
            SourceError::auth_required("session expired"),
        );
        assert_eq!(error.kind(), ServiceErrorKind::AuthRequired);
        assert_eq!(error.message(), "session expired");
    }

    #[test]
    fn wrap_upstream_prefixes_transport_failures() {
        let error = ServiceError::wrap_upstream(
            "Failed to fetch options chain",
            SourceError::unavailable("connection reset"),
        );
        assert_eq!(error.kind(), ServiceErrorKind::Upstream);
        assert_eq!(
            error.message(),
            "Failed to fetch options chain: connection reset"
        );
        assert_eq!(error.code(), "ROBINHOOD_ERROR");
    }

    #[test]
    fn session_transport_failure_becomes_network_error() {
        let error = ServiceError::from(SourceError::unavailable("Failed to authenticate: dns"));
        assert_eq!(error.kind(), ServiceErrorKind::Network);
        assert_eq!(error.to_string(), "NETWORK_ERROR: Failed to authenticate: dns");
    }

    #[test]
    fn validation_errors_become_invalid_argument() {
        let error = ServiceError::from(ValidationError::InvalidOrderKind {
            value: String::from("bond"),
        });
        assert_eq!(error.kind(), ServiceErrorKind::InvalidArgument);
        assert!(error.message().contains("Invalid order type 'bond'"));
    }
}
