//! HTTP layer for talking to hoster REST APIs
//!
//! This module implements the transport used by every backend, handling:
//! - Connection pooling and client management
//! - Credential attachment per request
//! - Error mapping onto the common taxonomy
//! - Request ID generation and correlation
//! - `Link` header pagination hints

pub mod client;
pub mod error;
pub mod pagination;

use crate::auth::AuthScheme;
use crate::error::{ErrorContext, HosterResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

/// HTTP verb of an API call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// Whether the call changes remote state
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Method::Get)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An API call described relative to the hoster's API root
///
/// Path segments are kept unencoded; they are percent-encoded one by one
/// when the URL is built, so `group/project` in a single segment becomes
/// `group%2Fproject`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Operation name reported in errors and logs
    pub operation: &'static str,
}

impl ApiRequest {
    /// Create a new request without body or query
    pub fn new(method: Method, operation: &'static str, segments: Vec<String>) -> Self {
        Self {
            method,
            segments,
            query: Vec::new(),
            body: None,
            operation,
        }
    }

    pub fn get(operation: &'static str, segments: Vec<String>) -> Self {
        Self::new(Method::Get, operation, segments)
    }

    pub fn post(operation: &'static str, segments: Vec<String>, body: Value) -> Self {
        Self::new(Method::Post, operation, segments).with_body(body)
    }

    pub fn put(operation: &'static str, segments: Vec<String>, body: Value) -> Self {
        Self::new(Method::Put, operation, segments).with_body(body)
    }

    pub fn patch(operation: &'static str, segments: Vec<String>, body: Value) -> Self {
        Self::new(Method::Patch, operation, segments).with_body(body)
    }

    pub fn delete(operation: &'static str, segments: Vec<String>) -> Self {
        Self::new(Method::Delete, operation, segments)
    }

    /// Set the JSON body
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Append a query parameter
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Resource path used in error contexts, e.g. `repos/org/repo/issues/10`
    pub fn resource(&self) -> String {
        self.segments.join("/")
    }

    /// Error context for this request
    pub fn context(&self) -> ErrorContext {
        ErrorContext::new(self.resource(), self.operation)
    }
}

/// Options for an HTTP request
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// Unique request ID for correlation
    pub request_id: Uuid,

    /// Request timeout
    pub timeout: Duration,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl RequestOptions {
    /// Create new request options with a generated request ID
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Default::default()
        }
    }

    /// Set the timeout for this request
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// A fully resolved request handed to an executor
#[derive(Debug)]
pub struct HttpRequest<'a> {
    pub method: Method,
    pub url: Url,
    pub body: Option<&'a Value>,
    pub auth: AuthScheme<'a>,
    pub context: &'a ErrorContext,
    pub options: RequestOptions,
}

/// A successful response
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code (always 2xx)
    pub status: u16,

    /// Parsed JSON body, `Value::Null` when the body was empty
    pub body: Value,

    /// URL of the next page, from the `Link` header
    pub next_page: Option<Url>,
}

/// Trait for HTTP executors
///
/// Implementations map every non-2xx status and transport failure onto
/// [`HosterError`](crate::error::HosterError) and never retry.
#[async_trait]
pub trait HttpExecutor: Send + Sync {
    /// Execute one request and parse its JSON body
    async fn execute(&self, request: HttpRequest<'_>) -> HosterResult<ApiResponse>;
}
