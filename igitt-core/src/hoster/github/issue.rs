//! GitHub issues

use super::comment::GitHubComment;
use super::{issue_path, labels, parse_repository, repo_path};
use crate::auth::GitHubToken;
use crate::entity::{CommentData, Issue, IssueData, LabelSet, RepositoryRef};
use crate::error::HosterResult;
use crate::hoster::{HosterClient, HosterKind, LabelStrategy};
use crate::http::ApiRequest;
use crate::normalize::{github as normalize, label_names};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

/// An issue on GitHub
#[derive(Debug, Clone)]
pub struct GitHubIssue {
    client: HosterClient,
    token: Arc<GitHubToken>,
    repository: RepositoryRef,
    number: u64,
    data: Option<IssueData>,
}

impl GitHubIssue {
    /// Handle to issue `number` of `owner/name`; nothing is fetched yet
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

    /// Issue with an already known view; no request is made
    pub fn from_data(
        client: HosterClient,
        token: Arc<GitHubToken>,
        repository: RepositoryRef,
        data: IssueData,
    ) -> Self {
        Self {
            number: data.number,
            data: Some(data),
            ..Self::lazy(client, token, repository, 0)
        }
    }

    /// Open a new issue on `owner/name`
    pub async fn create(
        client: HosterClient,
        token: Arc<GitHubToken>,
        repository: &str,
        title: &str,
        body: &str,
    ) -> HosterResult<Self> {
        client.check_token(token.as_ref())?;
        let repository = parse_repository(repository)?;

        let request = ApiRequest::post(
            "create_issue",
            repo_path(&repository, &["issues"]),
            json!({ "title": title, "body": body }),
        );
        let raw = client.call(token.as_ref(), &request).await?;
        let data = normalize::issue(&raw, &request.context())?;

        info!("Created issue #{} on {}", data.number, repository);
        Ok(Self::from_data(client, token, repository, data))
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

    /// Handle to a comment of this issue
    pub fn comment(&self, id: u64) -> GitHubComment {
        GitHubComment::lazy(self.client.clone(), self.token.clone(), self.repository.clone(), id)
    }

    fn path(&self, tail: &[&str]) -> Vec<String> {
        issue_path(&self.repository, self.number, tail)
    }

    async fn fetch(&self) -> HosterResult<IssueData> {
        let request = ApiRequest::get("get_issue", self.path(&[]));
        let raw = self.client.call(self.token.as_ref(), &request).await?;
        normalize::issue(&raw, &request.context())
    }

    /// PATCH the issue and take the response as the new view
    async fn update(&mut self, operation: &'static str, changes: Value) -> HosterResult<()> {
        let request = ApiRequest::patch(operation, self.path(&[]), changes);
        let _guard = self.client.lock(&request.resource()).await;

        let raw = self.client.call(self.token.as_ref(), &request).await?;
        self.data = Some(normalize::issue(&raw, &request.context())?);
        Ok(())
    }
}

#[async_trait]
impl Issue for GitHubIssue {
    fn hoster(&self) -> HosterKind {
        HosterKind::GitHub
    }

    fn number(&self) -> u64 {
        self.number
    }

    fn repository(&self) -> &RepositoryRef {
        &self.repository
    }

    async fn data(&mut self) -> HosterResult<&IssueData> {
        let data = match self.data.take() {
            Some(data) => data,
            None => self.fetch().await?,
        };
        Ok(self.data.insert(data))
    }

    async fn refresh(&mut self) -> HosterResult<()> {
        debug!("Refreshing issue #{} of {}", self.number, self.repository);
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
        let _guard = self.client.lock(&self.path(&[]).join("/")).await;

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
                // the delta is computed against the remote state, not the cache
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

    async fn add_comment(&mut self, body: &str) -> HosterResult<CommentData> {
        let request = ApiRequest::post("add_comment", self.path(&["comments"]), json!({ "body": body }));
        let raw = self.client.call(self.token.as_ref(), &request).await?;
        normalize::comment(&raw, &request.context())
    }

    async fn comments(&mut self) -> HosterResult<Vec<CommentData>> {
        let request = ApiRequest::get("get_comments", self.path(&["comments"]));
        let context = request.context();
        self.client
            .get_all(self.token.as_ref(), request)
            .await?
            .iter()
            .map(|raw| normalize::comment(raw, &context))
            .collect()
    }

    async fn available_labels(&mut self) -> HosterResult<LabelSet> {
        let request = ApiRequest::get("get_labels", repo_path(&self.repository, &["labels"]));
        let context = request.context();
        let items = self.client.get_all(self.token.as_ref(), request).await?;
        label_names(&items, &context, "labels")
    }
}
