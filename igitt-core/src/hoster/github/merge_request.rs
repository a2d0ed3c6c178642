//! GitHub pull requests

use super::{issue_path, labels, parse_repository, repo_path};
use crate::auth::GitHubToken;
use crate::entity::{CommentData, LabelSet, MergeRequest, MergeRequestData, RepositoryRef};
use crate::error::HosterResult;
use crate::hoster::{HosterClient, HosterKind, LabelStrategy};
use crate::http::ApiRequest;
use crate::normalize::github as normalize;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

/// A pull request on GitHub
#[derive(Debug, Clone)]
pub struct GitHubMergeRequest {
    client: HosterClient,
    token: Arc<GitHubToken>,
    repository: RepositoryRef,
    number: u64,
    data: Option<MergeRequestData>,
}

impl GitHubMergeRequest {
    pub fn new(
        client: HosterClient,
        token: Arc<GitHubToken>,
        repository: &str,
        number: u64,
    ) -> HosterResult<Self> {
        client.check_token(token.as_ref())?;
        let repository = parse_repository(repository)?;
        Ok(Self::lazy(client, token, repository, number))
    }

    pub fn from_data(
        client: HosterClient,
        token: Arc<GitHubToken>,
        repository: RepositoryRef,
        data: MergeRequestData,
    ) -> Self {
        Self {
            number: data.number,
            data: Some(data),
            ..Self::lazy(client, token, repository, 0)
        }
    }

    pub(crate) fn lazy(
        client: HosterClient,
        token: Arc<GitHubToken>,
        repository: RepositoryRef,
        number: u64,
    ) -> Self {
        Self {
            client,
            token,
            repository,
            number,
            data: None,
        }
    }

    fn pull_path(&self, tail: &[&str]) -> Vec<String> {
        let number = self.number.to_string();
        let mut segments = repo_path(&self.repository, &["pulls", number.as_str()]);
        segments.extend(tail.iter().map(|s| s.to_string()));
        segments
    }

    /// Writes to the pull request and to its issue are serialized together
    fn lock_key(&self) -> String {
        issue_path(&self.repository, self.number, &[]).join("/")
    }

    async fn fetch(&self) -> HosterResult<MergeRequestData> {
        let request = ApiRequest::get("get_merge_request", self.pull_path(&[]));
        let raw = self.client.call(self.token.as_ref(), &request).await?;
        normalize::pull_request(&raw, &request.context())
    }

    async fn update(&mut self, operation: &'static str, changes: Value) -> HosterResult<()> {
        let request = ApiRequest::patch(operation, self.pull_path(&[]), changes);
        let _guard = self.client.lock(&self.lock_key()).await;

        let raw = self.client.call(self.token.as_ref(), &request).await?;
        self.data = Some(normalize::pull_request(&raw, &request.context())?);
        Ok(())
    }
}

#[async_trait]
impl MergeRequest for GitHubMergeRequest {
    fn hoster(&self) -> HosterKind {
        HosterKind::GitHub
    }

    fn number(&self) -> u64 {
        self.number
    }

    fn repository(&self) -> &RepositoryRef {
        &self.repository
    }

    async fn data(&mut self) -> HosterResult<&MergeRequestData> {
        let data = match self.data.take() {
            Some(data) => data,
            None => self.fetch().await?,
        };
        Ok(self.data.insert(data))
    }

    async fn refresh(&mut self) -> HosterResult<()> {
        debug!("Refreshing pull request #{} of {}", self.number, self.repository);
        self.data = Some(self.fetch().await?);
        Ok(())
    }

    async fn set_title(&mut self, title: &str) -> HosterResult<()> {
        self.update("set_title", json!({ "title": title })).await
    }

    async fn set_body(&mut self, body: &str) -> HosterResult<()> {
        self.update("set_body", json!({ "body": body })).await
    }

    async fn set_labels(&mut self, desired: &LabelSet) -> HosterResult<()> {
        let _guard = self.client.lock(&self.lock_key()).await;

        match self.client.label_strategy() {
            LabelStrategy::Replace => {
                let applied =
                    labels::replace(&self.client, &self.token, &self.repository, self.number, desired).await?;
                if let Some(data) = self.data.as_mut() {
                    data.labels = applied;
                }
                Ok(())
            }
            LabelStrategy::Delta => {
                let mut data = self.fetch().await?;
                let result = labels::apply(
                    &self.client,
                    &self.token,
                    &self.repository,
                    self.number,
                    &mut data.labels,
                    desired,
                )
                .await;
                self.data = Some(data);
                result
            }
        }
    }

    async fn close(&mut self) -> HosterResult<()> {
        self.update("close", json!({ "state": "closed" })).await
    }

    async fn reopen(&mut self) -> HosterResult<()> {
        self.update("reopen", json!({ "state": "open" })).await
    }

    async fn merge(&mut self, message: Option<&str>) -> HosterResult<()> {
        let mut options = Map::new();
        if let Some(message) = message {
            options.insert("commit_message".to_string(), json!(message));
        }

        let request = ApiRequest::put("merge", self.pull_path(&["merge"]), Value::Object(options));
        let _guard = self.client.lock(&self.lock_key()).await;

        // the merge endpoint answers with a merge result, not the pull request
        self.client.call(self.token.as_ref(), &request).await?;
        info!("Merged pull request #{} of {}", self.number, self.repository);

        self.data = Some(self.fetch().await?);
        Ok(())
    }

    async fn add_comment(&mut self, body: &str) -> HosterResult<CommentData> {
        let request = ApiRequest::post(
            "add_comment",
            issue_path(&self.repository, self.number, &["comments"]),
            json!({ "body": body }),
        );
        let raw = self.client.call(self.token.as_ref(), &request).await?;
        normalize::comment(&raw, &request.context())
    }

    async fn comments(&mut self) -> HosterResult<Vec<CommentData>> {
        let request = ApiRequest::get(
            "get_comments",
            issue_path(&self.repository, self.number, &["comments"]),
        );
        let context = request.context();
        self.client
            .get_all(self.token.as_ref(), request)
            .await?
            .iter()
            .map(|raw| normalize::comment(raw, &context))
            .collect()
    }
}
