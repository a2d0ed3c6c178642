//! GitLab notes on issues and merge requests

use super::{parse_repository, Noteable};
use crate::auth::GitLabToken;
use crate::entity::{Comment, CommentData, RepositoryRef};
use crate::error::HosterResult;
use crate::hoster::HosterClient;
use crate::http::ApiRequest;
use crate::normalize::gitlab as normalize;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// A note; GitLab addresses notes through their parent object
#[derive(Debug, Clone)]
pub struct GitLabComment {
    client: HosterClient,
    token: Arc<GitLabToken>,
    repository: RepositoryRef,
    parent: Noteable,
    parent_iid: u64,
    id: u64,
    data: Option<CommentData>,
}

impl GitLabComment {
    /// Note `id` on issue `issue_iid` of `group/project`
    pub fn on_issue(
        client: HosterClient,
        token: Arc<GitLabToken>,
        repository: &str,
        issue_iid: u64,
        id: u64,
    ) -> HosterResult<Self> {
        client.check_token(token.as_ref())?;
        let repository = parse_repository(repository)?;
        Ok(Self::lazy(client, token, repository, Noteable::Issue, issue_iid, id))
    }

    /// Note `id` on merge request `mr_iid` of `group/project`
    pub fn on_merge_request(
        client: HosterClient,
        token: Arc<GitLabToken>,
        repository: &str,
        mr_iid: u64,
        id: u64,
    ) -> HosterResult<Self> {
        client.check_token(token.as_ref())?;
        let repository = parse_repository(repository)?;
        Ok(Self::lazy(client, token, repository, Noteable::MergeRequest, mr_iid, id))
    }

    pub(crate) fn lazy(
        client: HosterClient,
        token: Arc<GitLabToken>,
        repository: RepositoryRef,
        parent: Noteable,
        parent_iid: u64,
        id: u64,
    ) -> Self {
        Self {
            client,
            token,
            repository,
            parent,
            parent_iid,
            id,
            data: None,
        }
    }

    fn path(&self) -> Vec<String> {
        let id = self.id.to_string();
        self.parent
            .path(&self.repository, self.parent_iid, &["notes", id.as_str()])
    }
}

#[async_trait]
impl Comment for GitLabComment {
    fn id(&self) -> u64 {
        self.id
    }

    async fn data(&mut self) -> HosterResult<&CommentData> {
        let data = match self.data.take() {
            Some(data) => data,
            None => {
                let request = ApiRequest::get("get_comment", self.path());
                let raw = self.client.call(self.token.as_ref(), &request).await?;
                normalize::note(&raw, &request.context())?
            }
        };
        Ok(self.data.insert(data))
    }

    async fn set_body(&mut self, body: &str) -> HosterResult<()> {
        let request = ApiRequest::put("set_body", self.path(), json!({ "body": body }));
        let _guard = self.client.lock(&request.resource()).await;

        let raw = self.client.call(self.token.as_ref(), &request).await?;
        self.data = Some(normalize::note(&raw, &request.context())?);
        Ok(())
    }

    async fn delete(self) -> HosterResult<()> {
        let request = ApiRequest::delete("delete_comment", self.path());
        let _guard = self.client.lock(&request.resource()).await;

        self.client.send(self.token.as_ref(), &request).await?;
        info!("Deleted note {} on {}", self.id, self.repository);
        Ok(())
    }
}
