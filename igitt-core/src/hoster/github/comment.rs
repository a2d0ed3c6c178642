//! GitHub issue and pull request comments

use super::{parse_repository, repo_path};
use crate::auth::GitHubToken;
use crate::entity::{Comment, CommentData, RepositoryRef};
use crate::error::HosterResult;
use crate::hoster::HosterClient;
use crate::http::ApiRequest;
use crate::normalize::github as normalize;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// A comment on a GitHub issue or pull request
#[derive(Debug, Clone)]
pub struct GitHubComment {
    client: HosterClient,
    token: Arc<GitHubToken>,
    repository: RepositoryRef,
    id: u64,
    data: Option<CommentData>,
}

impl GitHubComment {
    pub fn new(
        client: HosterClient,
        token: Arc<GitHubToken>,
        repository: &str,
        id: u64,
    ) -> HosterResult<Self> {
        client.check_token(token.as_ref())?;
        let repository = parse_repository(repository)?;
        Ok(Self::lazy(client, token, repository, id))
    }

    pub fn from_data(
        client: HosterClient,
        token: Arc<GitHubToken>,
        repository: RepositoryRef,
        data: CommentData,
    ) -> Self {
        Self {
            id: data.id,
            data: Some(data),
            ..Self::lazy(client, token, repository, 0)
        }
    }

    pub(crate) fn lazy(
        client: HosterClient,
        token: Arc<GitHubToken>,
        repository: RepositoryRef,
        id: u64,
    ) -> Self {
        Self {
            client,
            token,
            repository,
            id,
            data: None,
        }
    }

    fn path(&self) -> Vec<String> {
        let id = self.id.to_string();
        repo_path(&self.repository, &["issues", "comments", id.as_str()])
    }
}

#[async_trait]
impl Comment for GitHubComment {
    fn id(&self) -> u64 {
        self.id
    }

    async fn data(&mut self) -> HosterResult<&CommentData> {
        let data = match self.data.take() {
            Some(data) => data,
            None => {
                let request = ApiRequest::get("get_comment", self.path());
                let raw = self.client.call(self.token.as_ref(), &request).await?;
                normalize::comment(&raw, &request.context())?
            }
        };
        Ok(self.data.insert(data))
    }

    async fn set_body(&mut self, body: &str) -> HosterResult<()> {
        let request = ApiRequest::patch("set_body", self.path(), json!({ "body": body }));
        let _guard = self.client.lock(&request.resource()).await;

        let raw = self.client.call(self.token.as_ref(), &request).await?;
        self.data = Some(normalize::comment(&raw, &request.context())?);
        Ok(())
    }

    async fn delete(self) -> HosterResult<()> {
        let request = ApiRequest::delete("delete_comment", self.path());
        let _guard = self.client.lock(&request.resource()).await;

        self.client.send(self.token.as_ref(), &request).await?;
        info!("Deleted comment {} on {}", self.id, self.repository);
        Ok(())
    }
}
