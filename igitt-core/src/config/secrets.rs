//! Secret values in configuration
//!
//! Tokens are wrapped in [`SecretString`] from the moment they are parsed so
//! that `Debug`, `Display` and `tracing` output never contain them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Known token prefixes that identify the token type without revealing it
const TOKEN_PREFIXES: &[&str] = &["ghp_", "gho_", "ghs_", "ghu_", "github_pat_", "glpat-", "gloas-"];

/// A wrapper type for credentials
#[derive(Clone, Deserialize, Serialize)]
#[serde(transparent)]
pub struct SecretString {
    value: String,
}

impl SecretString {
    /// Create a new secret string
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Get the actual value (use with caution)
    pub fn expose_secret(&self) -> &str {
        &self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Partially redacted form for diagnostics: known prefix and last 4 characters
    pub fn partial_redact(&self) -> String {
        if self.value.is_empty() {
            return "[EMPTY]".to_string();
        }

        let len = self.value.chars().count();
        if len <= 8 {
            return "[REDACTED]".to_string();
        }

        let tail: String = self.value.chars().skip(len - 4).collect();
        match TOKEN_PREFIXES.iter().find(|p| self.value.starts_with(*p)) {
            Some(prefix) => format!("{}...{}", prefix, tail),
            None => format!("...{}", tail),
        }
    }

    /// Render according to a redaction policy
    pub fn redacted(&self, policy: RedactionPolicy) -> String {
        match policy {
            RedactionPolicy::Full => "[REDACTED]".to_string(),
            RedactionPolicy::Partial => self.partial_redact(),
            RedactionPolicy::None => self.value.clone(),
        }
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// How much of a secret diagnostics may show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RedactionPolicy {
    /// Fully redact
    #[default]
    Full,
    /// Token type prefix and last characters
    Partial,
    /// No redaction (only for local debugging)
    None,
}
