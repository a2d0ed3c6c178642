//! Error taxonomy shared by every hoster backend
//!
//! All backends surface the same kinds of failure regardless of which
//! provider produced them. Each error carries an [`ErrorContext`] naming the
//! resource and the attempted operation so callers can decide whether to
//! retry or abort. Nothing in this crate retries on its own.

use crate::labels::LabelChange;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Result type for hoster operations
pub type HosterResult<T> = Result<T, HosterError>;

/// Where an error happened: the remote resource and what was being done to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Resource path relative to the hoster API root, e.g. `repos/org/repo/issues/10`
    pub resource: String,

    /// Operation name, e.g. `set_labels`
    pub operation: &'static str,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new(resource: impl Into<String>, operation: &'static str) -> Self {
        Self {
            resource: resource.into(),
            operation,
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on '{}'", self.operation, self.resource)
    }
}

/// Transient provider-side failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderFailure {
    /// Rate limit exceeded, optionally with the provider's suggested wait
    #[error("rate limit exceeded{}", .retry_after.map(|d| format!(", retry after {}s", d.as_secs())).unwrap_or_default())]
    RateLimit { retry_after: Option<Duration> },

    /// Request did not complete within the configured timeout
    #[error("request timed out")]
    Timeout,

    /// Provider returned a 5xx status
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Connection or transport level failure
    #[error("network error: {message}")]
    Network { message: String },

    /// Response body larger than the configured limit
    #[error("response size {size} exceeds maximum {limit}")]
    ResponseTooLarge { size: usize, limit: usize },
}

/// Errors surfaced by entity operations
#[derive(Debug, Error)]
pub enum HosterError {
    /// Resource does not exist or the credential cannot see it
    #[error("{context}: resource not found")]
    NotFound { context: ErrorContext },

    /// Credential lacks the scope required for the operation
    #[error("{context}: permission denied: {message}")]
    Permission {
        context: ErrorContext,
        message: String,
    },

    /// Transient failure: rate limit, 5xx, timeout, network
    #[error("{context}: {kind}")]
    Provider {
        context: ErrorContext,
        kind: ProviderFailure,
    },

    /// A multi-request label update stopped part way through
    #[error(
        "{context}: label update partially applied ({} applied, failed at {failed}, {} not applied): {source}",
        .applied.len(),
        .not_applied.len()
    )]
    PartialUpdate {
        context: ErrorContext,
        /// Changes committed on the hoster before the failure
        applied: Vec<LabelChange>,
        /// The change whose request failed
        failed: LabelChange,
        /// Changes never attempted
        not_applied: Vec<LabelChange>,
        source: Box<HosterError>,
    },

    /// Provider response lacks a field the common model requires
    #[error("{context}: malformed response, missing or invalid field '{field}'")]
    MalformedResponse {
        context: ErrorContext,
        field: String,
    },

    /// Provider rejected the request payload (400, 422 and other 4xx)
    ///
    /// `status` is 0 when the payload was rejected before being sent.
    #[error("{context}: invalid request ({status}): {message}")]
    InvalidRequest {
        context: ErrorContext,
        status: u16,
        message: String,
    },

    /// Client-side misuse: bad repository reference, wrong hoster, bad base URL
    #[error("configuration error: {message}")]
    Configuration { message: String },
}

impl HosterError {
    /// Helper to create a not found error
    pub fn not_found(context: ErrorContext) -> Self {
        Self::NotFound { context }
    }

    /// Helper to create a provider failure
    pub fn provider(context: ErrorContext, kind: ProviderFailure) -> Self {
        Self::Provider { context, kind }
    }

    /// Helper to create a malformed response error
    pub fn malformed(context: &ErrorContext, field: impl Into<String>) -> Self {
        Self::MalformedResponse {
            context: context.clone(),
            field: field.into(),
        }
    }

    /// Helper to create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// The context of this error, if it came from a remote operation
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Self::NotFound { context }
            | Self::Permission { context, .. }
            | Self::Provider { context, .. }
            | Self::PartialUpdate { context, .. }
            | Self::MalformedResponse { context, .. }
            | Self::InvalidRequest { context, .. } => Some(context),
            Self::Configuration { .. } => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_permission(&self) -> bool {
        matches!(self, Self::Permission { .. })
    }

    /// Whether retrying the same call later might succeed
    ///
    /// Only a hint: whether a retry is safe depends on the idempotence of the
    /// operation, which is the caller's call.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Provider { .. })
    }

    /// Suggested wait before retrying, when the provider sent one
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Provider {
                kind: ProviderFailure::RateLimit { retry_after },
                ..
            } => *retry_after,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ErrorContext {
        ErrorContext::new("repos/org/repo/issues/10", "set_labels")
    }

    #[test]
    fn test_context_display() {
        assert_eq!(ctx().to_string(), "set_labels on 'repos/org/repo/issues/10'");
    }

    #[test]
    fn test_predicates() {
        assert!(HosterError::not_found(ctx()).is_not_found());
        assert!(HosterError::provider(ctx(), ProviderFailure::Timeout).is_transient());
        assert!(!HosterError::configuration("bad").is_transient());
        assert!(HosterError::configuration("bad").context().is_none());
    }

    #[test]
    fn test_rate_limit_display_and_retry_after() {
        let err = HosterError::provider(
            ctx(),
            ProviderFailure::RateLimit {
                retry_after: Some(Duration::from_secs(60)),
            },
        );
        assert!(err.to_string().contains("retry after 60s"));
        assert_eq!(err.retry_after(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_partial_update_display() {
        let err = HosterError::PartialUpdate {
            context: ctx(),
            applied: vec![LabelChange::Add("bug".into())],
            failed: LabelChange::Remove("core".into()),
            not_applied: vec![],
            source: Box::new(HosterError::provider(ctx(), ProviderFailure::Timeout)),
        };
        let text = err.to_string();
        assert!(text.contains("1 applied"));
        assert!(text.contains("failed at -core"));
        assert!(text.contains("0 not applied"));
    }
}
