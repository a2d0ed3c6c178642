//! Concrete tokens for GitHub and GitLab

use super::{AuthScheme, Token};
use crate::config::SecretString;
use crate::hoster::HosterKind;

/// A GitHub credential
#[derive(Debug, Clone, PartialEq)]
pub enum GitHubToken {
    /// Personal access token, sent as `Authorization: token <secret>`
    Personal(SecretString),
    /// OAuth or app installation token, sent as `Authorization: Bearer <secret>`
    OAuth(SecretString),
    /// Username and password (or token as password) over HTTP basic auth
    Basic {
        username: String,
        password: SecretString,
    },
}

impl GitHubToken {
    pub fn personal(secret: impl Into<SecretString>) -> Self {
        Self::Personal(secret.into())
    }

    pub fn oauth(secret: impl Into<SecretString>) -> Self {
        Self::OAuth(secret.into())
    }

    pub fn basic(username: impl Into<String>, password: impl Into<SecretString>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl Token for GitHubToken {
    fn hoster(&self) -> HosterKind {
        HosterKind::GitHub
    }

    fn scheme(&self) -> AuthScheme<'_> {
        match self {
            Self::Personal(secret) => AuthScheme::Header {
                name: "Authorization",
                value: format!("token {}", secret.expose_secret()),
            },
            Self::OAuth(secret) => AuthScheme::Header {
                name: "Authorization",
                value: format!("Bearer {}", secret.expose_secret()),
            },
            Self::Basic { username, password } => AuthScheme::Basic {
                username: username.as_str(),
                password: password.expose_secret(),
            },
        }
    }
}

/// A GitLab credential
#[derive(Debug, Clone, PartialEq)]
pub enum GitLabToken {
    /// Personal, project or group access token in the `PRIVATE-TOKEN` header
    Private(SecretString),
    /// Personal access token in the `private_token` query parameter
    PrivateQuery(SecretString),
    /// OAuth2 token, sent as `Authorization: Bearer <secret>`
    OAuth(SecretString),
    /// CI job token in the `JOB-TOKEN` header
    Job(SecretString),
}

impl GitLabToken {
    pub fn private(secret: impl Into<SecretString>) -> Self {
        Self::Private(secret.into())
    }

    pub fn private_query(secret: impl Into<SecretString>) -> Self {
        Self::PrivateQuery(secret.into())
    }

    pub fn oauth(secret: impl Into<SecretString>) -> Self {
        Self::OAuth(secret.into())
    }

    pub fn job(secret: impl Into<SecretString>) -> Self {
        Self::Job(secret.into())
    }
}

impl Token for GitLabToken {
    fn hoster(&self) -> HosterKind {
        HosterKind::GitLab
    }

    fn scheme(&self) -> AuthScheme<'_> {
        match self {
            Self::Private(secret) => AuthScheme::Header {
                name: "PRIVATE-TOKEN",
                value: secret.expose_secret().to_string(),
            },
            Self::PrivateQuery(secret) => AuthScheme::Query {
                name: "private_token",
                value: secret.expose_secret(),
            },
            Self::OAuth(secret) => AuthScheme::Header {
                name: "Authorization",
                value: format!("Bearer {}", secret.expose_secret()),
            },
            Self::Job(secret) => AuthScheme::Header {
                name: "JOB-TOKEN",
                value: secret.expose_secret().to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_github_personal_header() {
        let token = GitHubToken::personal("ghp_abc");
        assert_eq!(token.hoster(), HosterKind::GitHub);
        assert_eq!(
            token.scheme(),
            AuthScheme::Header {
                name: "Authorization",
                value: "token ghp_abc".into()
            }
        );
    }

    #[test]
    fn test_github_basic() {
        let token = GitHubToken::basic("octocat", "hunter2");
        assert_eq!(
            token.scheme(),
            AuthScheme::Basic {
                username: "octocat",
                password: "hunter2"
            }
        );
    }

    #[test]
    fn test_gitlab_schemes() {
        assert_eq!(
            GitLabToken::private("glpat").scheme(),
            AuthScheme::Header {
                name: "PRIVATE-TOKEN",
                value: "glpat".into()
            }
        );
        assert_eq!(
            GitLabToken::private_query("glpat").scheme(),
            AuthScheme::Query {
                name: "private_token",
                value: "glpat"
            }
        );
        assert_eq!(
            GitLabToken::job("ci").scheme(),
            AuthScheme::Header {
                name: "JOB-TOKEN",
                value: "ci".into()
            }
        );
    }

    #[test]
    fn test_debug_output_hides_secret() {
        let token = GitLabToken::oauth("super-secret-value");
        assert!(!format!("{:?}", token).contains("super-secret-value"));
        assert!(!format!("{:?}", token.scheme()).contains("super-secret-value"));
    }
}
