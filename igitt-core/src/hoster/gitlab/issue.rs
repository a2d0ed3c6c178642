//! GitLab issues

use super::comment::GitLabComment;
use super::{labels, parse_repository, project_path, Noteable};
use crate::auth::GitLabToken;
use crate::entity::{CommentData, Issue, IssueData, LabelSet, RepositoryRef};
use crate::error::HosterResult;
use crate::hoster::{HosterClient, HosterKind, LabelStrategy};
use crate::http::ApiRequest;
use crate::normalize::{gitlab as normalize, label_names};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

/// An issue on GitLab, addressed by its project-local `iid`
#[derive(Debug, Clone)]
pub struct GitLabIssue {
    client: HosterClient,
    token: Arc<GitLabToken>,
    repository: RepositoryRef,
    iid: u64,
    data: Option<IssueData>,
}

impl GitLabIssue {
    /// Handle to issue `iid` of `group/project`; nothing is fetched yet
    pub fn new(
        client: HosterClient,
        token: Arc<GitLabToken>,
        repository: &str,
        iid: u64,
    ) -> HosterResult<Self> {
        client.check_token(token.as_ref())?;
        let repository = parse_repository(repository)?;
        Ok(Self::lazy(client, token, repository, iid))
    }

    /// Issue with an already known view; no request is made
    pub fn from_data(
        client: HosterClient,
        token: Arc<GitLabToken>,
        repository: RepositoryRef,
        data: IssueData,
    ) -> Self {
        Self {
            iid: data.number,
            data: Some(data),
            ..Self::lazy(client, token, repository, 0)
        }
    }

    /// Open a new issue on `group/project`
    pub async fn create(
        client: HosterClient,
        token: Arc<GitLabToken>,
        repository: &str,
        title: &str,
        body: &str,
    ) -> HosterResult<Self> {
        client.check_token(token.as_ref())?;
        let repository = parse_repository(repository)?;

        let request = ApiRequest::post(
            "create_issue",
            project_path(&repository, &["issues"]),
            json!({ "title": title, "description": body }),
        );
        let raw = client.call(token.as_ref(), &request).await?;
        let data = normalize::issue(&raw, &request.context())?;

        info!("Created issue #{} on {}", data.number, repository);
        Ok(Self::from_data(client, token, repository, data))
    }

    pub(crate) fn lazy(
        client: HosterClient,
        token: Arc<GitLabToken>,
        repository: RepositoryRef,
        iid: u64,
    ) -> Self {
        Self {
            client,
            token,
            repository,
            iid,
            data: None,
        }
    }

    /// Handle to a note of this issue
    pub fn comment(&self, id: u64) -> GitLabComment {
        GitLabComment::lazy(
            self.client.clone(),
            self.token.clone(),
            self.repository.clone(),
            Noteable::Issue,
            self.iid,
            id,
        )
    }

    fn path(&self, tail: &[&str]) -> Vec<String> {
        Noteable::Issue.path(&self.repository, self.iid, tail)
    }

    async fn fetch(&self) -> HosterResult<IssueData> {
        let request = ApiRequest::get("get_issue", self.path(&[]));
        let raw = self.client.call(self.token.as_ref(), &request).await?;
        normalize::issue(&raw, &request.context())
    }

    /// PUT the issue and take the response as the new view
    async fn update(&mut self, operation: &'static str, changes: Value) -> HosterResult<()> {
        let request = ApiRequest::put(operation, self.path(&[]), changes);
        let _guard = self.client.lock(&request.resource()).await;

        let raw = self.client.call(self.token.as_ref(), &request).await?;
        self.data = Some(normalize::issue(&raw, &request.context())?);
        Ok(())
    }
}

#[async_trait]
impl Issue for GitLabIssue {
    fn hoster(&self) -> HosterKind {
        HosterKind::GitLab
    }

    fn number(&self) -> u64 {
        self.iid
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
        debug!("Refreshing issue #{} of {}", self.iid, self.repository);
        self.data = Some(self.fetch().await?);
        Ok(())
    }

    async fn set_title(&mut self, title: &str) -> HosterResult<()> {
        self.update("set_title", json!({ "title": title })).await
    }

    async fn set_body(&mut self, body: &str) -> HosterResult<()> {
        self.update("set_body", json!({ "description": body })).await
    }

    async fn set_labels(&mut self, desired: &LabelSet) -> HosterResult<()> {
        let _guard = self.client.lock(&self.path(&[]).join("/")).await;

        match self.client.label_strategy() {
            LabelStrategy::Replace => {
                let (raw, context) = labels::replace(
                    &self.client,
                    &self.token,
                    &self.repository,
                    Noteable::Issue,
                    self.iid,
                    desired,
                )
                .await?;
                self.data = Some(normalize::issue(&raw, &context)?);
                Ok(())
            }
            LabelStrategy::Delta => {
                let mut data = self.fetch().await?;
                let result = labels::apply(
                    &self.client,
                    &self.token,
                    &self.repository,
                    Noteable::Issue,
                    self.iid,
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
        self.update("close", json!({ "state_event": "close" })).await
    }

    async fn reopen(&mut self) -> HosterResult<()> {
        self.update("reopen", json!({ "state_event": "reopen" })).await
    }

    async fn add_comment(&mut self, body: &str) -> HosterResult<CommentData> {
        let request = ApiRequest::post("add_comment", self.path(&["notes"]), json!({ "body": body }));
        let raw = self.client.call(self.token.as_ref(), &request).await?;
        normalize::note(&raw, &request.context())
    }

    async fn comments(&mut self) -> HosterResult<Vec<CommentData>> {
        let request = ApiRequest::get("get_comments", self.path(&["notes"]))
            .with_query("order_by", "created_at")
            .with_query("sort", "asc");
        let context = request.context();
        self.client
            .get_all(self.token.as_ref(), request)
            .await?
            .iter()
            .map(|raw| normalize::note(raw, &context))
            .collect()
    }

    async fn available_labels(&mut self) -> HosterResult<LabelSet> {
        let request = ApiRequest::get("get_labels", project_path(&self.repository, &["labels"]));
        let context = request.context();
        let items = self.client.get_all(self.token.as_ref(), request).await?;
        label_names(&items, &context, "labels")
    }
}
