//! GitLab commits and their pipeline statuses

use super::{parse_repository, project_path};
use crate::auth::GitLabToken;
use crate::entity::{Commit, CommitData, CommitStatus, RepositoryRef};
use crate::error::HosterResult;
use crate::hoster::{is_full_sha, HosterClient, HosterKind};
use crate::http::ApiRequest;
use crate::normalize::{current_statuses, gitlab as normalize};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone)]
pub struct GitLabCommit {
    client: HosterClient,
    token: Arc<GitLabToken>,
    repository: RepositoryRef,
    sha: String,
    data: Option<CommitData>,
}

impl GitLabCommit {
    pub fn new(client: HosterClient, token: Arc<GitLabToken>, repository: &str, sha: &str) -> HosterResult<Self> {
        client.check_token(token.as_ref())?;
        let repository = parse_repository(repository)?;
        Ok(Self::lazy(client, token, repository, sha.to_string()))
    }

    pub(crate) fn lazy(client: HosterClient, token: Arc<GitLabToken>, repository: RepositoryRef, sha: String) -> Self {
        Self {
            client,
            token,
            repository,
            sha,
            data: None,
        }
    }

    fn commit_path(&self, sha: &str, tail: &[&str]) -> Vec<String> {
        let mut segments = project_path(&self.repository, &["repository", "commits", sha]);
        segments.extend(tail.iter().map(|s| s.to_string()));
        segments
    }

    // statuses are filed under the full SHA only
    async fn full_sha(&mut self) -> HosterResult<String> {
        if is_full_sha(&self.sha) {
            return Ok(self.sha.clone());
        }
        Ok(self.data().await?.sha.clone())
    }
}

#[async_trait]
impl Commit for GitLabCommit {
    fn hoster(&self) -> HosterKind {
        HosterKind::GitLab
    }

    fn sha(&self) -> &str {
        &self.sha
    }

    fn repository(&self) -> &RepositoryRef {
        &self.repository
    }

    async fn data(&mut self) -> HosterResult<&CommitData> {
        let data = match self.data.take() {
            Some(data) => data,
            None => {
                let request = ApiRequest::get("get_commit", self.commit_path(&self.sha, &[]));
                let raw = self.client.call(self.token.as_ref(), &request).await?;
                normalize::commit(&raw, &request.context())?
            }
        };
        Ok(self.data.insert(data))
    }

    async fn statuses(&mut self) -> HosterResult<Vec<CommitStatus>> {
        let sha = self.full_sha().await?;
        let request = ApiRequest::get("get_statuses", self.commit_path(&sha, &["statuses"]));
        let context = request.context();

        let statuses = self
            .client
            .get_all(self.token.as_ref(), request)
            .await?
            .iter()
            .map(|raw| normalize::status(raw, &context))
            .collect::<HosterResult<Vec<_>>>()?;
        Ok(current_statuses(statuses))
    }

    async fn set_status(&mut self, status: &CommitStatus) -> HosterResult<()> {
        let sha = self.full_sha().await?;

        let mut body = Map::new();
        body.insert("state".to_string(), json!(normalize::status_state(status.state)));
        body.insert("name".to_string(), json!(status.context));
        body.insert("description".to_string(), json!(status.description));
        if let Some(url) = &status.url {
            body.insert("target_url".to_string(), json!(url));
        }

        let request = ApiRequest::post(
            "set_status",
            project_path(&self.repository, &["statuses", sha.as_str()]),
            Value::Object(body),
        );
        let _guard = self.client.lock(&request.resource()).await;

        self.client.send(self.token.as_ref(), &request).await?;
        info!(
            "Set status '{}' to {} on {} of {}",
            status.context, status.state, sha, self.repository
        );
        Ok(())
    }
}
