//! HTTP client implementation using reqwest

use crate::auth::AuthScheme;
use crate::error::{HosterError, HosterResult, ProviderFailure};
use crate::http::error::{map_http_error, map_transport_error};
use crate::http::pagination::next_link;
use crate::http::{ApiResponse, HttpExecutor, HttpRequest, Method};
use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, ClientBuilder, RequestBuilder, Response};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Maximum response size (10MB)
pub const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024;

/// Default user agent
pub const USER_AGENT: &str = concat!("IGitt/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client with connection pooling
#[derive(Clone)]
pub struct HttpClient {
    /// The underlying reqwest client
    client: Arc<Client>,

    /// Maximum response size to prevent OOM
    max_response_size: usize,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> HosterResult<Self> {
        Self::with_config(Duration::from_secs(10), Duration::from_secs(30), 10, USER_AGENT)
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(
        connect_timeout: Duration,
        request_timeout: Duration,
        max_idle_per_host: usize,
        user_agent: &str,
    ) -> HosterResult<Self> {
        let client = ClientBuilder::new()
            .pool_max_idle_per_host(max_idle_per_host)
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .user_agent(user_agent)
            .gzip(true)
            .build()
            .map_err(|e| HosterError::configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
            max_response_size: MAX_RESPONSE_SIZE,
        })
    }

    /// Override the response size limit
    pub fn with_max_response_size(mut self, max_response_size: usize) -> Self {
        self.max_response_size = max_response_size;
        self
    }

    fn builder(&self, method: Method, url: url::Url) -> RequestBuilder {
        match method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
            Method::Patch => self.client.patch(url),
            Method::Delete => self.client.delete(url),
        }
    }

    /// Attach the credential using its scheme
    fn authorize(builder: RequestBuilder, auth: &AuthScheme<'_>) -> HosterResult<RequestBuilder> {
        Ok(match auth {
            AuthScheme::Header { name, value } => {
                let mut value = HeaderValue::from_str(value).map_err(|_| {
                    HosterError::configuration(format!("Credential is not a valid {} header value", name))
                })?;
                value.set_sensitive(true);
                builder.header(*name, value)
            }
            AuthScheme::Query { name, value } => builder.query(&[(*name, *value)]),
            AuthScheme::Basic { username, password } => builder.basic_auth(username, Some(password)),
        })
    }

    /// Check response size to prevent OOM
    fn check_content_length(&self, response: &Response, request: &HttpRequest<'_>) -> HosterResult<()> {
        if let Some(content_length) = response.content_length() {
            if content_length as usize > self.max_response_size {
                return Err(HosterError::provider(
                    request.context.clone(),
                    ProviderFailure::ResponseTooLarge {
                        size: content_length as usize,
                        limit: self.max_response_size,
                    },
                ));
            }
        }

        Ok(())
    }

    /// Validate response content type
    fn validate_content_type(response: &Response, request: &HttpRequest<'_>) -> HosterResult<()> {
        if let Some(content_type) = response.headers().get(CONTENT_TYPE) {
            let content_type_str = content_type.to_str().unwrap_or("").to_lowercase();

            if !content_type_str.contains("json") {
                warn!(
                    "Expected JSON from {}, got: {} [request_id: {}]",
                    request.url, content_type_str, request.options.request_id
                );
                return Err(HosterError::malformed(request.context, "content-type"));
            }
        }

        Ok(())
    }
}

#[async_trait]
impl HttpExecutor for HttpClient {
    async fn execute(&self, request: HttpRequest<'_>) -> HosterResult<ApiResponse> {
        let request_id = request.options.request_id;

        info!(
            "Executing {} {} ({}) [request_id: {}]",
            request.method, request.url, request.context.operation, request_id
        );
        debug!("Authenticating with {}", request.auth.describe());

        let mut req_builder = self
            .builder(request.method, request.url.clone())
            .timeout(request.options.timeout)
            .header(ACCEPT, "application/json")
            .header("X-Request-ID", request_id.to_string());

        req_builder = Self::authorize(req_builder, &request.auth)?;

        if let Some(body) = request.body {
            req_builder = req_builder.json(body);
        }

        // Execute request
        let response = req_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                warn!("Request timeout for {} [request_id: {}]", request.url, request_id);
            } else {
                error!("Request error for {} [request_id: {}]: {}", request.url, request_id, e);
            }
            map_transport_error(&e, request.context, request_id)
        })?;

        let status = response.status();
        debug!("Response status: {} [request_id: {}]", status, request_id);

        // Check for non-success status codes
        if !status.is_success() {
            // Capture headers for rate limit parsing
            let headers = response.headers().clone();

            // Try to get response body for error details
            let body = response.text().await.ok();

            warn!(
                "Request failed with status {} for {} [request_id: {}]",
                status, request.url, request_id
            );

            return Err(map_http_error(status, &headers, body, request.context, request_id));
        }

        self.check_content_length(&response, &request)?;

        let next_page = next_link(response.headers());
        let content_type_checked = Self::validate_content_type(&response, &request);

        let response_text = response
            .text()
            .await
            .map_err(|e| map_transport_error(&e, request.context, request_id))?;

        // Check response size after reading
        if response_text.len() > self.max_response_size {
            return Err(HosterError::provider(
                request.context.clone(),
                ProviderFailure::ResponseTooLarge {
                    size: response_text.len(),
                    limit: self.max_response_size,
                },
            ));
        }

        // DELETE and some PUT endpoints answer 204 with nothing
        if response_text.trim().is_empty() {
            return Ok(ApiResponse {
                status: status.as_u16(),
                body: Value::Null,
                next_page,
            });
        }

        content_type_checked?;

        let body: Value = serde_json::from_str(&response_text).map_err(|e| {
            error!(
                "Failed to parse response from {} [request_id: {}]: {}",
                request.url, request_id, e
            );
            HosterError::malformed(request.context, "body")
        })?;

        info!(
            "Request completed with status {} [request_id: {}]",
            status, request_id
        );

        Ok(ApiResponse {
            status: status.as_u16(),
            body,
            next_page,
        })
    }
}
