//! Errors raised while loading hoster configuration
//!
//! Loading fails in one of three places: reading and parsing the file,
//! resolving `${VAR}` placeholders, or checking the parsed hoster entries.
//! Schema checks report a [`ValidationError`] carrying the dotted path of the
//! offending entry (`hosters[1].base_url`) so a user can find it in the file.
//! Credentials never appear in any message.

use crate::hoster::HosterKind;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Line and column are 1-based; YAML and JSON parsers may omit them
    #[error("Parse error in '{path}' at line {}, column {}: {message}",
            .line.unwrap_or(0), .column.unwrap_or(0))]
    ParseError {
        path: String,
        line: Option<usize>,
        column: Option<usize>,
        message: String,
    },

    #[error(transparent)]
    ValidationError(#[from] ValidationError),

    #[error("Environment variable '{var}' not set")]
    EnvVarNotFound { var: String },

    #[error("No hoster named '{name}' in config")]
    UnknownHoster { name: String },

    /// A credential was requested for the other hoster type
    #[error("Hoster '{name}' is of type {actual}, not {expected}")]
    HosterMismatch {
        name: String,
        expected: HosterKind,
        actual: HosterKind,
    },

    #[error("Hoster '{name}': {kind} tokens are not accepted by {hoster}")]
    UnsupportedTokenKind {
        name: String,
        kind: String,
        hoster: HosterKind,
    },
}

/// A hoster entry that parsed but makes no sense
#[derive(Debug, Error)]
pub struct ValidationError {
    /// e.g. `hosters[0].token`
    pub field_path: String,
    pub kind: ValidationErrorKind,
    pub context: Option<String>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid config at '{}': {}", self.field_path, self.kind)?;
        if let Some(ctx) = &self.context {
            write!(f, " ({})", ctx)?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ValidationErrorKind {
    #[error("required field is missing")]
    RequiredFieldMissing,

    #[error("expected {expected}, got {actual}")]
    InvalidValue { expected: String, actual: String },

    #[error("out of range: {message}")]
    OutOfRange { message: String },

    /// Hoster names must be unique within one file
    #[error("duplicate value: {value}")]
    DuplicateValue { value: String },

    #[error("{message}")]
    Incompatible { message: String },

    #[error("invalid URL: {message}")]
    InvalidUrl { message: String },

    #[error("unsupported config version {actual}, expected {expected}")]
    InvalidVersion { expected: String, actual: String },
}

impl ValidationError {
    pub fn new(field_path: impl Into<String>, kind: ValidationErrorKind) -> Self {
        Self {
            field_path: field_path.into(),
            kind,
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn required(field_path: impl Into<String>) -> Self {
        Self::new(field_path, ValidationErrorKind::RequiredFieldMissing)
    }

    pub fn invalid_value(
        field_path: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::new(
            field_path,
            ValidationErrorKind::InvalidValue {
                expected: expected.into(),
                actual: actual.into(),
            },
        )
    }

    pub fn out_of_range(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            field_path,
            ValidationErrorKind::OutOfRange {
                message: message.into(),
            },
        )
    }

    pub fn incompatible(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            field_path,
            ValidationErrorKind::Incompatible {
                message: message.into(),
            },
        )
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_names_field() {
        let err = ValidationError::required("hosters[1].token").with_context("hoster 'work'");
        assert_eq!(
            err.to_string(),
            "Invalid config at 'hosters[1].token': required field is missing (hoster 'work')"
        );
    }

    #[test]
    fn test_validation_error_is_transparent() {
        let err = ConfigError::from(ValidationError::out_of_range("connection.per_page", "must be 1..=100"));
        assert_eq!(
            err.to_string(),
            "Invalid config at 'connection.per_page': out of range: must be 1..=100"
        );
    }

    #[test]
    fn test_hoster_mismatch_message() {
        let err = ConfigError::HosterMismatch {
            name: "work".to_string(),
            expected: HosterKind::GitHub,
            actual: HosterKind::GitLab,
        };
        assert_eq!(err.to_string(), "Hoster 'work' is of type gitlab, not github");
    }
}
