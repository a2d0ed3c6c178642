//! `${VAR}` interpolation for configuration files

use super::error::ConfigError;
use regex::Regex;
use std::env;
use std::sync::LazyLock;

/// `${VAR}` with an upper-case variable name
pub(crate) static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("Invalid regex"));

/// Interpolate environment variables in a configuration string
pub fn interpolate_env_vars(content: &str) -> Result<String, ConfigError> {
    interpolate_with(content, |var| env::var(var).ok())
}

/// Interpolate `${VAR}` placeholders using `lookup`
///
/// Fails on the first placeholder `lookup` cannot resolve.
pub fn interpolate_with<F>(content: &str, lookup: F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::with_capacity(content.len());
    let mut last = 0;

    for cap in ENV_VAR_PATTERN.captures_iter(content) {
        let (Some(full), Some(name)) = (cap.get(0), cap.get(1)) else {
            continue;
        };

        let value = lookup(name.as_str()).ok_or_else(|| ConfigError::EnvVarNotFound {
            var: name.as_str().to_string(),
        })?;

        result.push_str(&content[last..full.start()]);
        result.push_str(&value);
        last = full.end();
    }

    result.push_str(&content[last..]);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_interpolate_single() {
        let env = vars(&[("GITHUB_TOKEN", "ghp_abc")]);
        let result = interpolate_with("token: ${GITHUB_TOKEN}", |v| env.get(v).cloned()).unwrap();
        assert_eq!(result, "token: ghp_abc");
    }

    #[test]
    fn test_missing_var() {
        let result = interpolate_with("token: ${MISSING_VAR}", |_| None);
        match result {
            Err(ConfigError::EnvVarNotFound { var }) => assert_eq!(var, "MISSING_VAR"),
            other => panic!("Expected EnvVarNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_multiple_and_repeated_vars() {
        let env = vars(&[("VAR1", "value1"), ("VAR2", "value2")]);
        let result =
            interpolate_with("a: ${VAR1}, b: ${VAR2}, c: ${VAR1}", |v| env.get(v).cloned()).unwrap();
        assert_eq!(result, "a: value1, b: value2, c: value1");
    }

    #[test]
    fn test_lowercase_is_not_a_placeholder() {
        let result = interpolate_with("token: ${not_a_var}", |_| None).unwrap();
        assert_eq!(result, "token: ${not_a_var}");
    }

    #[test]
    fn test_reads_process_environment() {
        env::set_var("IGITT_ENV_TEST_TOKEN", "from-env");
        let result = interpolate_env_vars("token: ${IGITT_ENV_TEST_TOKEN}").unwrap();
        assert_eq!(result, "token: from-env");
        env::remove_var("IGITT_ENV_TEST_TOKEN");
    }
}
