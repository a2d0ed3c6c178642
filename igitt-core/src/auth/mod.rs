//! Credential holders
//!
//! A token wraps exactly one secret for exactly one hoster and knows how the
//! secret is attached to a request. Tokens are immutable and are shared
//! read-only (behind an `Arc`) by every entity built from them. Refreshing
//! OAuth tokens is left to the caller.

mod tokens;

pub use tokens::{GitHubToken, GitLabToken};

use crate::hoster::HosterKind;
use std::fmt;

/// How a secret is attached to an outgoing request
#[derive(Clone, PartialEq, Eq)]
pub enum AuthScheme<'a> {
    /// Sent as a request header
    Header { name: &'static str, value: String },
    /// Sent as a query parameter
    Query { name: &'static str, value: &'a str },
    /// HTTP basic authentication
    Basic { username: &'a str, password: &'a str },
}

impl AuthScheme<'_> {
    /// Short description without the secret, for logs
    pub fn describe(&self) -> String {
        match self {
            Self::Header { name, .. } => format!("header {}", name),
            Self::Query { name, .. } => format!("query parameter {}", name),
            Self::Basic { username, .. } => format!("basic auth as {}", username),
        }
    }
}

impl fmt::Debug for AuthScheme<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthScheme({} [REDACTED])", self.describe())
    }
}

/// A credential valid for one hoster
pub trait Token: Send + Sync {
    /// The hoster this credential authenticates against
    fn hoster(&self) -> HosterKind;

    /// The attachment strategy, including the secret
    fn scheme(&self) -> AuthScheme<'_>;
}
