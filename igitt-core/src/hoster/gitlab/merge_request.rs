//! GitLab merge requests

use super::{labels, parse_repository, Noteable};
use crate::auth::GitLabToken;
use crate::entity::{CommentData, LabelSet, MergeRequest, MergeRequestData, RepositoryRef};
use crate::error::HosterResult;
use crate::hoster::{HosterClient, HosterKind, LabelStrategy};
use crate::http::ApiRequest;
use crate::normalize::gitlab as normalize;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct GitLabMergeRequest {
    client: HosterClient,
    token: Arc<GitLabToken>,
    repository: RepositoryRef,
    iid: u64,
    data: Option<MergeRequestData>,
}

impl GitLabMergeRequest {
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

    pub fn from_data(
        client: HosterClient,
        token: Arc<GitLabToken>,
        repository: RepositoryRef,
        data: MergeRequestData,
    ) -> Self {
        Self {
            iid: data.number,
            data: Some(data),
            ..Self::lazy(client, token, repository, 0)
        }
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

    fn path(&self, tail: &[&str]) -> Vec<String> {
        Noteable::MergeRequest.path(&self.repository, self.iid, tail)
    }

    async fn fetch(&self) -> HosterResult<MergeRequestData> {
        let request = ApiRequest::get("get_merge_request", self.path(&[]));
        let raw = self.client.call(self.token.as_ref(), &request).await?;
        normalize::merge_request(&raw, &request.context())
    }

    /// PUT to the merge request (or a sub-resource) and take the response as the new view
    async fn update(&mut self, operation: &'static str, tail: &[&str], changes: Value) -> HosterResult<()> {
        let request = ApiRequest::put(operation, self.path(tail), changes);
        let _guard = self.client.lock(&self.path(&[]).join("/")).await;

        let raw = self.client.call(self.token.as_ref(), &request).await?;
        self.data = Some(normalize::merge_request(&raw, &request.context())?);
        Ok(())
    }
}

#[async_trait]
impl MergeRequest for GitLabMergeRequest {
    fn hoster(&self) -> HosterKind {
        HosterKind::GitLab
    }

    fn number(&self) -> u64 {
        self.iid
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
        debug!("Refreshing merge request !{} of {}", self.iid, self.repository);
        self.data = Some(self.fetch().await?);
        Ok(())
    }

    async fn set_title(&mut self, title: &str) -> HosterResult<()> {
        self.update("set_title", &[], json!({ "title": title })).await
    }

    async fn set_body(&mut self, body: &str) -> HosterResult<()> {
        self.update("set_body", &[], json!({ "description": body })).await
    }

    async fn set_labels(&mut self, desired: &LabelSet) -> HosterResult<()> {
        let _guard = self.client.lock(&self.path(&[]).join("/")).await;

        match self.client.label_strategy() {
            LabelStrategy::Replace => {
                let (raw, context) = labels::replace(
                    &self.client,
                    &self.token,
                    &self.repository,
                    Noteable::MergeRequest,
                    self.iid,
                    desired,
                )
                .await?;
                self.data = Some(normalize::merge_request(&raw, &context)?);
                Ok(())
            }
            LabelStrategy::Delta => {
                let mut data = self.fetch().await?;
                let result = labels::apply(
                    &self.client,
                    &self.token,
                    &self.repository,
                    Noteable::MergeRequest,
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
        self.update("close", &[], json!({ "state_event": "close" })).await
    }

    async fn reopen(&mut self) -> HosterResult<()> {
        self.update("reopen", &[], json!({ "state_event": "reopen" })).await
    }

    async fn merge(&mut self, message: Option<&str>) -> HosterResult<()> {
        let mut options = Map::new();
        if let Some(message) = message {
            options.insert("merge_commit_message".to_string(), json!(message));
        }

        self.update("merge", &["merge"], Value::Object(options)).await?;
        info!("Merged merge request !{} of {}", self.iid, self.repository);
        Ok(())
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
}
