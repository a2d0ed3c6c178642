//! Configuration validation utilities

use super::env::ENV_VAR_PATTERN;
use super::error::{ValidationError, ValidationErrorKind};
use super::schema::IgittConfig;
use crate::hoster::HosterKind;
use tracing::warn;

/// Configuration validator with rules on top of the schema checks
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate a configuration with extended rules
    pub fn validate(&self, config: &IgittConfig) -> Result<(), ValidationError> {
        config.validate()?;

        self.validate_placeholders(config)?;
        self.validate_api_roots(config);

        Ok(())
    }

    /// Tokens and URLs must not carry unresolved `${VAR}` placeholders
    fn validate_placeholders(&self, config: &IgittConfig) -> Result<(), ValidationError> {
        for (i, hoster) in config.hosters.iter().enumerate() {
            let vars = self.extract_env_vars(hoster.token.expose_secret());
            if let Some(var) = vars.first() {
                return Err(ValidationError::invalid_value(
                    format!("hosters[{}].token", i),
                    "credential",
                    format!("unresolved placeholder ${{{}}}", var),
                ));
            }

            if let Some(base_url) = &hoster.base_url {
                if let Some(var) = self.extract_env_vars(base_url).first() {
                    return Err(ValidationError::new(
                        format!("hosters[{}].base_url", i),
                        ValidationErrorKind::InvalidUrl {
                            message: format!("unresolved placeholder ${{{}}}", var),
                        },
                    ));
                }
            }
        }

        Ok(())
    }

    /// Self-hosted API roots usually end in a versioned path; only warn
    fn validate_api_roots(&self, config: &IgittConfig) {
        for hoster in &config.hosters {
            let Some(base_url) = &hoster.base_url else {
                continue;
            };

            let path = base_url.trim_end_matches('/');
            let suspicious = match hoster.hoster_type {
                HosterKind::GitLab => !path.ends_with("/api/v4"),
                HosterKind::GitHub => {
                    !path.ends_with("/api/v3") && !path.contains("api.github.com")
                }
            };

            if suspicious {
                warn!(
                    "Hoster '{}' base_url '{}' does not look like a {} API root",
                    hoster.name, base_url, hoster.hoster_type
                );
            }
        }
    }

    /// Extract environment variable names from a string
    pub fn extract_env_vars(&self, text: &str) -> Vec<String> {
        ENV_VAR_PATTERN
            .captures_iter(text)
            .map(|cap| cap[1].to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConnectionConfig, HosterConfig, SecretString};

    fn config(token: &str) -> IgittConfig {
        IgittConfig {
            version: "0.1".to_string(),
            hosters: vec![HosterConfig {
                name: "work".to_string(),
                hoster_type: HosterKind::GitLab,
                base_url: Some("https://gitlab.example.com/api/v4".to_string()),
                token: SecretString::new(token),
                token_kind: None,
                username: None,
                label_strategy: None,
            }],
            connection: ConnectionConfig::default(),
        }
    }

    #[test]
    fn test_env_var_extraction() {
        let validator = ConfigValidator::new();
        let vars = validator.extract_env_vars("token: ${GITLAB_TOKEN}, url: ${GITLAB_URL}");
        assert_eq!(vars, vec!["GITLAB_TOKEN", "GITLAB_URL"]);
    }

    #[test]
    fn test_unresolved_placeholder_rejected() {
        let validator = ConfigValidator::new();
        let err = validator.validate(&config("${GITLAB_TOKEN}")).unwrap_err();
        assert_eq!(err.field_path, "hosters[0].token");
        assert!(!err.to_string().contains("glpat"));
    }

    #[test]
    fn test_resolved_config_passes() {
        let validator = ConfigValidator::new();
        assert!(validator.validate(&config("glpat-123")).is_ok());
    }
}
