//! HTTP error mapping utilities

use crate::error::{ErrorContext, HosterError, ProviderFailure};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use uuid::Uuid;

/// Map an HTTP status code and response body to a HosterError
pub fn map_http_error(
    status: StatusCode,
    headers: &HeaderMap,
    body: Option<String>,
    context: &ErrorContext,
    request_id: Uuid,
) -> HosterError {
    let error_message = body
        .as_deref()
        .and_then(|b| serde_json::from_str::<Value>(b).ok())
        .and_then(|v| extract_error_message(&v))
        .or_else(|| body.clone().filter(|b| !b.trim().is_empty()))
        .unwrap_or_else(|| format!("HTTP error {}", status.as_u16()));

    // Include request ID in error message
    let message_with_id = format!("{} [request_id: {}]", error_message, request_id);
    let context = context.clone();

    match status {
        StatusCode::NOT_FOUND | StatusCode::GONE => HosterError::NotFound { context },

        // GitHub reports exhausted quotas as 403 with a zero remaining counter
        StatusCode::FORBIDDEN if is_rate_limited(headers) => HosterError::Provider {
            context,
            kind: ProviderFailure::RateLimit {
                retry_after: retry_after(headers),
            },
        },

        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => HosterError::Permission {
            context,
            message: message_with_id,
        },

        StatusCode::TOO_MANY_REQUESTS => HosterError::Provider {
            context,
            kind: ProviderFailure::RateLimit {
                retry_after: retry_after(headers),
            },
        },

        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => HosterError::Provider {
            context,
            kind: ProviderFailure::Timeout,
        },

        status if status.is_server_error() => HosterError::Provider {
            context,
            kind: ProviderFailure::Server {
                status: status.as_u16(),
                message: message_with_id,
            },
        },

        status => HosterError::InvalidRequest {
            context,
            status: status.as_u16(),
            message: message_with_id,
        },
    }
}

/// Map a reqwest transport error (no HTTP status) to a HosterError
pub fn map_transport_error(err: &reqwest::Error, context: &ErrorContext, request_id: Uuid) -> HosterError {
    let kind = if err.is_timeout() {
        ProviderFailure::Timeout
    } else if err.is_connect() {
        ProviderFailure::Network {
            message: format!("Connection failed: {} [request_id: {}]", err, request_id),
        }
    } else {
        ProviderFailure::Network {
            message: format!("{} [request_id: {}]", err, request_id),
        }
    };

    HosterError::provider(context.clone(), kind)
}

/// Extract a human readable message from a GitHub or GitLab error body
fn extract_error_message(json: &Value) -> Option<String> {
    // GitHub: { "message": "...", "errors": [{ "field": "...", "code": "..." }] }
    // GitLab: { "message": "404 Project Not Found" }
    if let Some(message) = json.get("message").and_then(|v| v.as_str()) {
        let details = json
            .get("errors")
            .and_then(|v| v.as_array())
            .map(|errors| {
                errors
                    .iter()
                    .filter_map(|e| {
                        e.get("message")
                            .or_else(|| e.get("code"))
                            .and_then(|v| v.as_str())
                    })
                    .collect::<Vec<_>>()
            })
            .filter(|d| !d.is_empty());

        return Some(match details {
            Some(details) => format!("{} ({})", message, details.join(", ")),
            None => message.to_string(),
        });
    }

    // GitLab validation: { "message": { "title": ["can't be blank"] } }
    if let Some(fields) = json.get("message").and_then(|v| v.as_object()) {
        let parts: Vec<String> = fields
            .iter()
            .map(|(field, problems)| {
                let problems = match problems {
                    Value::Array(items) => items
                        .iter()
                        .filter_map(|p| p.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                    other => other.to_string(),
                };
                format!("{}: {}", field, problems)
            })
            .collect();
        return Some(parts.join("; "));
    }

    // GitLab OAuth: { "error": "insufficient_scope", "error_description": "..." }
    if let Some(error) = json.get("error").and_then(|v| v.as_str()) {
        return Some(
            match json.get("error_description").and_then(|v| v.as_str()) {
                Some(description) => format!("{}: {}", error, description),
                None => error.to_string(),
            },
        );
    }

    None
}

fn is_rate_limited(headers: &HeaderMap) -> bool {
    let exhausted = headers
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim() == "0")
        .unwrap_or(false);

    exhausted || headers.contains_key(RETRY_AFTER)
}

/// Suggested wait, from `Retry-After` or GitHub's `X-RateLimit-Reset` epoch
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    if let Some(delay) = headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_retry_after)
    {
        return Some(delay);
    }

    let reset = headers
        .get("x-ratelimit-reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok())?;
    let now = chrono::Utc::now().timestamp();
    Some(Duration::from_secs(reset.saturating_sub(now).max(0) as u64))
}

/// Parse Retry-After header value
pub fn parse_retry_after(header_value: &str) -> Option<Duration> {
    // Only the delay-seconds form; HTTP dates are not used by GitHub or GitLab
    header_value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use test_case::test_case;

    fn ctx() -> ErrorContext {
        ErrorContext::new("repos/org/repo/issues/10", "get_issue")
    }

    fn map(status: u16, headers: HeaderMap, body: Option<&str>) -> HosterError {
        map_http_error(
            StatusCode::from_u16(status).unwrap(),
            &headers,
            body.map(String::from),
            &ctx(),
            Uuid::new_v4(),
        )
    }

    #[test_case(404 ; "not found")]
    #[test_case(410 ; "gone")]
    fn test_not_found(status: u16) {
        assert!(map(status, HeaderMap::new(), None).is_not_found());
    }

    #[test_case(401 ; "unauthorized")]
    #[test_case(403 ; "forbidden")]
    fn test_permission(status: u16) {
        let err = map(status, HeaderMap::new(), Some(r#"{"message": "Must have admin rights"}"#));
        match err {
            HosterError::Permission { message, context } => {
                assert!(message.contains("Must have admin rights"));
                assert_eq!(context, ctx());
            }
            other => panic!("Expected Permission, got {:?}", other),
        }
    }

    #[test]
    fn test_github_403_rate_limit() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));
        let err = map(403, headers, Some(r#"{"message": "API rate limit exceeded"}"#));
        assert!(matches!(
            err,
            HosterError::Provider {
                kind: ProviderFailure::RateLimit { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_429_retry_after() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("60"));
        let err = map(429, headers, None);
        assert_eq!(err.retry_after(), Some(Duration::from_secs(60)));
    }

    #[test_case(500 ; "internal")]
    #[test_case(502 ; "bad gateway")]
    #[test_case(503 ; "unavailable")]
    fn test_server_errors_are_transient(status: u16) {
        let err = map(status, HeaderMap::new(), None);
        assert!(err.is_transient());
        assert!(matches!(
            err,
            HosterError::Provider {
                kind: ProviderFailure::Server { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_gateway_timeout() {
        assert!(matches!(
            map(504, HeaderMap::new(), None),
            HosterError::Provider {
                kind: ProviderFailure::Timeout,
                ..
            }
        ));
    }

    #[test]
    fn test_github_validation_details() {
        let body = r#"{"message": "Validation Failed", "errors": [{"resource": "Label", "code": "invalid", "field": "name"}]}"#;
        match map(422, HeaderMap::new(), Some(body)) {
            HosterError::InvalidRequest { status, message, .. } => {
                assert_eq!(status, 422);
                assert!(message.starts_with("Validation Failed (invalid)"));
            }
            other => panic!("Expected InvalidRequest, got {:?}", other),
        }
    }

    #[test]
    fn test_gitlab_field_errors() {
        let body = r#"{"message": {"title": ["can't be blank"]}}"#;
        match map(400, HeaderMap::new(), Some(body)) {
            HosterError::InvalidRequest { message, .. } => {
                assert!(message.starts_with("title: can't be blank"));
            }
            other => panic!("Expected InvalidRequest, got {:?}", other),
        }
    }

    #[test]
    fn test_gitlab_oauth_error() {
        let body = r#"{"error": "insufficient_scope", "error_description": "requires api scope"}"#;
        match map(403, HeaderMap::new(), Some(body)) {
            HosterError::Permission { message, .. } => {
                assert!(message.starts_with("insufficient_scope: requires api scope"));
            }
            other => panic!("Expected Permission, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_retry_after() {
        assert_eq!(parse_retry_after("120"), Some(Duration::from_secs(120)));
        assert_eq!(parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"), None);
    }
}
