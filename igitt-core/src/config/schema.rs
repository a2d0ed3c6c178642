//! Configuration schema structures with serde support

use super::error::{ConfigError, ValidationError, ValidationErrorKind};
use super::secrets::SecretString;
use crate::auth::{GitHubToken, GitLabToken};
use crate::hoster::{HosterKind, LabelStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IgittConfig {
    /// Schema version (required - no default)
    pub version: String,

    /// Configured hoster accounts
    #[serde(default)]
    pub hosters: Vec<HosterConfig>,

    /// Transport settings shared by every hoster
    #[serde(default)]
    pub connection: ConnectionConfig,
}

/// One hoster account
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HosterConfig {
    /// Unique name used to look the account up
    pub name: String,

    #[serde(rename = "type")]
    pub hoster_type: HosterKind,

    /// API root, defaults to the public instance
    #[serde(default)]
    pub base_url: Option<String>,

    /// Credential (supports `${VAR}` interpolation)
    pub token: SecretString,

    /// How the credential is sent; defaults per hoster
    #[serde(default)]
    pub token_kind: Option<TokenKind>,

    /// Account name for basic authentication
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub label_strategy: Option<LabelStrategy>,
}

/// Credential flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// GitHub personal access token
    Personal,
    /// OAuth bearer token (both hosters)
    #[serde(rename = "oauth")]
    OAuth,
    /// GitLab private token header
    Private,
    /// GitLab CI job token
    Job,
    /// GitHub HTTP basic auth
    Basic,
}

impl TokenKind {
    /// Default credential flavour of a hoster
    pub fn default_for(hoster: HosterKind) -> Self {
        match hoster {
            HosterKind::GitHub => Self::Personal,
            HosterKind::GitLab => Self::Private,
        }
    }

    /// Whether this flavour exists on `hoster`
    pub fn supported_by(&self, hoster: HosterKind) -> bool {
        match hoster {
            HosterKind::GitHub => matches!(self, Self::Personal | Self::OAuth | Self::Basic),
            HosterKind::GitLab => matches!(self, Self::Private | Self::OAuth | Self::Job),
        }
    }
}

/// Transport configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionConfig {
    /// Connection timeout in milliseconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,

    /// Request timeout in milliseconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    /// Maximum idle connections per host
    #[serde(default = "default_max_idle")]
    pub max_idle_per_host: usize,

    /// Page size for list endpoints
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Largest response body accepted
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,

    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout(),
            request_timeout_ms: default_request_timeout(),
            max_idle_per_host: default_max_idle(),
            per_page: default_per_page(),
            max_response_bytes: default_max_response_bytes(),
            user_agent: None,
        }
    }
}

impl ConnectionConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

// Default value functions for serde
fn default_connect_timeout() -> u64 { 10000 }
fn default_request_timeout() -> u64 { 30000 }
fn default_max_idle() -> usize { 10 }
fn default_per_page() -> u32 { 100 }
fn default_max_response_bytes() -> usize { 10 * 1024 * 1024 }

impl IgittConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.version.is_empty() {
            return Err(ValidationError::required("version"));
        }

        // Currently support only version 0.1
        if self.version != "0.1" {
            return Err(ValidationError::new(
                "version",
                ValidationErrorKind::InvalidVersion {
                    expected: "0.1".to_string(),
                    actual: self.version.clone(),
                },
            ));
        }

        if self.hosters.is_empty() {
            return Err(ValidationError::required("hosters")
                .with_context("At least one hoster must be configured"));
        }

        let mut seen_names = HashSet::new();
        for (i, hoster) in self.hosters.iter().enumerate() {
            if !seen_names.insert(&hoster.name) {
                return Err(ValidationError::new(
                    format!("hosters[{}].name", i),
                    ValidationErrorKind::DuplicateValue {
                        value: hoster.name.clone(),
                    },
                ));
            }

            hoster.validate(&format!("hosters[{}]", i))?;
        }

        self.connection.validate("connection")
    }

    /// Look up a hoster account by name
    pub fn hoster(&self, name: &str) -> Result<&HosterConfig, ConfigError> {
        self.hosters
            .iter()
            .find(|h| h.name == name)
            .ok_or_else(|| ConfigError::UnknownHoster {
                name: name.to_string(),
            })
    }
}

impl HosterConfig {
    /// Validate hoster configuration
    pub fn validate(&self, path: &str) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::required(format!("{}.name", path)));
        }

        if self.token.is_empty() {
            return Err(ValidationError::required(format!("{}.token", path)));
        }

        if let Some(base_url) = &self.base_url {
            match url::Url::parse(base_url) {
                Ok(url) => {
                    if url.scheme() != "http" && url.scheme() != "https" {
                        return Err(ValidationError::new(
                            format!("{}.base_url", path),
                            ValidationErrorKind::InvalidUrl {
                                message: format!("URL scheme must be http or https, got: {}", url.scheme()),
                            },
                        ));
                    }
                }
                Err(e) => {
                    return Err(ValidationError::new(
                        format!("{}.base_url", path),
                        ValidationErrorKind::InvalidUrl {
                            message: e.to_string(),
                        },
                    ));
                }
            }
        }

        let kind = self.token_kind();
        if !kind.supported_by(self.hoster_type) {
            return Err(ValidationError::incompatible(
                format!("{}.token_kind", path),
                format!("{:?} tokens are not supported by {}", kind, self.hoster_type),
            ));
        }

        if kind == TokenKind::Basic && self.username.as_deref().unwrap_or("").is_empty() {
            return Err(ValidationError::required(format!("{}.username", path))
                .with_context("Basic authentication requires a username"));
        }

        Ok(())
    }

    /// Configured credential flavour or the hoster's default
    pub fn token_kind(&self) -> TokenKind {
        self.token_kind
            .unwrap_or_else(|| TokenKind::default_for(self.hoster_type))
    }

    /// API root for this account
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.hoster_type.default_base_url())
    }

    /// Label strategy for this account, the hoster's default when unset
    pub fn label_strategy(&self) -> LabelStrategy {
        self.label_strategy
            .unwrap_or(self.hoster_type.capabilities().label_strategy)
    }

    /// Build the GitHub credential
    pub fn github_token(&self) -> Result<GitHubToken, ConfigError> {
        if self.hoster_type != HosterKind::GitHub {
            return Err(self.wrong_hoster(HosterKind::GitHub));
        }

        let secret = self.token.clone();
        match self.token_kind() {
            TokenKind::Personal => Ok(GitHubToken::Personal(secret)),
            TokenKind::OAuth => Ok(GitHubToken::OAuth(secret)),
            TokenKind::Basic => Ok(GitHubToken::Basic {
                username: self.username.clone().unwrap_or_default(),
                password: secret,
            }),
            other => Err(self.unsupported(other)),
        }
    }

    /// Build the GitLab credential
    pub fn gitlab_token(&self) -> Result<GitLabToken, ConfigError> {
        if self.hoster_type != HosterKind::GitLab {
            return Err(self.wrong_hoster(HosterKind::GitLab));
        }

        let secret = self.token.clone();
        match self.token_kind() {
            TokenKind::Private => Ok(GitLabToken::Private(secret)),
            TokenKind::OAuth => Ok(GitLabToken::OAuth(secret)),
            TokenKind::Job => Ok(GitLabToken::Job(secret)),
            other => Err(self.unsupported(other)),
        }
    }

    fn wrong_hoster(&self, expected: HosterKind) -> ConfigError {
        ConfigError::HosterMismatch {
            name: self.name.clone(),
            expected,
            actual: self.hoster_type,
        }
    }

    fn unsupported(&self, kind: TokenKind) -> ConfigError {
        ConfigError::UnsupportedTokenKind {
            name: self.name.clone(),
            kind: format!("{:?}", kind),
            hoster: self.hoster_type,
        }
    }
}

impl ConnectionConfig {
    /// Validate transport settings
    pub fn validate(&self, path: &str) -> Result<(), ValidationError> {
        if self.connect_timeout_ms == 0 {
            return Err(ValidationError::out_of_range(
                format!("{}.connect_timeout_ms", path),
                "Must be greater than 0",
            ));
        }

        if self.request_timeout_ms == 0 {
            return Err(ValidationError::out_of_range(
                format!("{}.request_timeout_ms", path),
                "Must be greater than 0",
            ));
        }

        if !(1..=100).contains(&self.per_page) {
            return Err(ValidationError::out_of_range(
                format!("{}.per_page", path),
                "Must be between 1 and 100",
            ));
        }

        if self.max_response_bytes == 0 {
            return Err(ValidationError::out_of_range(
                format!("{}.max_response_bytes", path),
                "Must be greater than 0",
            ));
        }

        Ok(())
    }
}
