//! Shared transport handle for one hoster account
//!
//! A `HosterClient` is cheap to clone; clones share the HTTP executor and the
//! per-resource write locks. Entities hold a clone plus a shared credential.

use super::{HosterKind, LabelStrategy};
use crate::auth::Token;
use crate::config::{ConnectionConfig, HosterConfig};
use crate::error::{HosterError, HosterResult};
use crate::http::client::{HttpClient, USER_AGENT};
use crate::http::{ApiRequest, ApiResponse, HttpExecutor, HttpRequest, RequestOptions};
use crate::normalize::expect_array;
use crate::sync::ResourceLocks;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, warn};
use url::Url;

/// Upper bound on pages fetched by one `get_all` call
const MAX_PAGES: usize = 1000;

/// Transport, settings and write locks for one hoster
#[derive(Clone)]
pub struct HosterClient {
    kind: HosterKind,
    base_url: Url,
    executor: Arc<dyn HttpExecutor>,
    locks: Arc<ResourceLocks>,
    label_strategy: LabelStrategy,
    per_page: u32,
    timeout: Duration,
}

impl fmt::Debug for HosterClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HosterClient")
            .field("kind", &self.kind)
            .field("base_url", &self.base_url.as_str())
            .field("label_strategy", &self.label_strategy)
            .field("per_page", &self.per_page)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HosterClient {
    /// Client for the public instance of `kind` with default settings
    pub fn new(kind: HosterKind) -> HosterResult<Self> {
        Self::with_base_url(kind, kind.default_base_url())
    }

    /// Client for a self-hosted instance
    pub fn with_base_url(kind: HosterKind, base_url: &str) -> HosterResult<Self> {
        let executor = HttpClient::new()?;
        Self::with_executor(kind, base_url, Arc::new(executor))
    }

    /// Client over a caller-supplied executor
    pub fn with_executor(
        kind: HosterKind,
        base_url: &str,
        executor: Arc<dyn HttpExecutor>,
    ) -> HosterResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            HosterError::configuration(format!("Invalid base URL '{}': {}", base_url, e))
        })?;

        if base_url.cannot_be_a_base() {
            return Err(HosterError::configuration(format!(
                "Base URL '{}' cannot have path segments",
                base_url
            )));
        }

        Ok(Self {
            kind,
            base_url,
            executor,
            locks: Arc::new(ResourceLocks::new()),
            label_strategy: kind.capabilities().label_strategy,
            per_page: kind.capabilities().max_per_page,
            timeout: Duration::from_secs(30),
        })
    }

    /// Client for a configured hoster account
    pub fn from_config(hoster: &HosterConfig, connection: &ConnectionConfig) -> HosterResult<Self> {
        let executor = HttpClient::with_config(
            connection.connect_timeout(),
            connection.request_timeout(),
            connection.max_idle_per_host,
            connection.user_agent.as_deref().unwrap_or(USER_AGENT),
        )?
        .with_max_response_size(connection.max_response_bytes);

        debug!(
            "Building {} client '{}' for {}",
            hoster.hoster_type,
            hoster.name,
            hoster.base_url()
        );

        Ok(
            Self::with_executor(hoster.hoster_type, hoster.base_url(), Arc::new(executor))?
                .with_label_strategy(hoster.label_strategy())
                .with_per_page(connection.per_page)
                .with_timeout(connection.request_timeout()),
        )
    }

    pub fn with_label_strategy(mut self, strategy: LabelStrategy) -> Self {
        self.label_strategy = strategy;
        self
    }

    /// Page size for list endpoints, clamped to what the hoster accepts
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.clamp(1, self.kind.capabilities().max_per_page);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn kind(&self) -> HosterKind {
        self.kind
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn label_strategy(&self) -> LabelStrategy {
        self.label_strategy
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Ensure a credential belongs to this client's hoster
    pub fn check_token(&self, token: &dyn Token) -> HosterResult<()> {
        if token.hoster() != self.kind {
            return Err(HosterError::configuration(format!(
                "A {} credential cannot be used with a {} client",
                token.hoster(),
                self.kind
            )));
        }
        Ok(())
    }

    /// Absolute URL of an API request
    ///
    /// Each segment is percent-encoded on its own, so a `/` inside a segment
    /// (GitLab project paths, label names) never splits the path.
    pub fn url(&self, request: &ApiRequest) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(&request.segments);
        }

        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }

        url
    }

    /// Exclusive write access to a remote resource
    pub async fn lock(&self, resource: &str) -> OwnedMutexGuard<()> {
        self.locks.acquire(resource).await
    }

    /// Send one request
    pub async fn send(&self, token: &dyn Token, request: &ApiRequest) -> HosterResult<ApiResponse> {
        let url = self.url(request);
        self.execute(token, request, url).await
    }

    /// Send one request and return its body
    pub async fn call(&self, token: &dyn Token, request: &ApiRequest) -> HosterResult<Value> {
        Ok(self.send(token, request).await?.body)
    }

    /// Fetch every page of a list endpoint, following `Link: rel="next"`
    pub async fn get_all(&self, token: &dyn Token, request: ApiRequest) -> HosterResult<Vec<Value>> {
        let request = request.with_query("per_page", self.per_page.to_string());
        let context = request.context();

        let mut items = Vec::new();
        let mut url = self.url(&request);
        let mut visited = HashSet::new();
        let mut pages = 0;

        loop {
            visited.insert(url.to_string());
            let response = self.execute(token, &request, url).await?;
            pages += 1;
            items.extend(expect_array(&response.body, &context, "list")?.iter().cloned());

            let Some(next) = response.next_page else {
                break;
            };

            // the credential only ever goes to the configured API origin
            if next.origin() != self.base_url.origin() {
                warn!(
                    "Refusing to follow next page outside {}: {} [{}]",
                    self.base_url.origin().ascii_serialization(),
                    next.origin().ascii_serialization(),
                    context
                );
                return Err(HosterError::malformed(&context, "link"));
            }

            if visited.contains(next.as_str()) || pages >= MAX_PAGES {
                warn!("Pagination of {} does not terminate after {} pages", context.resource, pages);
                return Err(HosterError::malformed(&context, "link"));
            }

            url = next;
        }

        debug!(
            "Fetched {} items in {} pages from {}",
            items.len(),
            pages,
            context.resource
        );

        Ok(items)
    }

    async fn execute(&self, token: &dyn Token, request: &ApiRequest, url: Url) -> HosterResult<ApiResponse> {
        self.check_token(token)?;

        let context = request.context();
        let http_request = HttpRequest {
            method: request.method,
            url,
            body: request.body.as_ref(),
            auth: token.scheme(),
            context: &context,
            options: RequestOptions::new(self.timeout),
        };

        self.executor.execute(http_request).await
    }
}
