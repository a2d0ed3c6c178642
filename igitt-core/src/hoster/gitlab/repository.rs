//! GitLab projects

use super::{normalize_color, parse_repository, project_path, project_segments, GitLabCommit, GitLabIssue, GitLabMergeRequest};
use crate::auth::GitLabToken;
use crate::entity::{IssueState, LabelSet, Repository, RepositoryData, RepositoryRef};
use crate::error::HosterResult;
use crate::hoster::HosterClient;
use crate::http::ApiRequest;
use crate::normalize::{gitlab as normalize, label_names};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// A project on GitLab
#[derive(Debug, Clone)]
pub struct GitLabRepository {
    client: HosterClient,
    token: Arc<GitLabToken>,
    reference: RepositoryRef,
    data: Option<RepositoryData>,
}

impl GitLabRepository {
    /// Handle to `group/project` (groups may nest) or a numeric project id
    pub fn new(client: HosterClient, token: Arc<GitLabToken>, repository: &str) -> HosterResult<Self> {
        client.check_token(token.as_ref())?;
        Ok(Self {
            reference: parse_repository(repository)?,
            client,
            token,
            data: None,
        })
    }
}

#[async_trait]
impl Repository for GitLabRepository {
    type Issue = GitLabIssue;
    type MergeRequest = GitLabMergeRequest;
    type Commit = GitLabCommit;

    fn reference(&self) -> &RepositoryRef {
        &self.reference
    }

    async fn data(&mut self) -> HosterResult<&RepositoryData> {
        let data = match self.data.take() {
            Some(data) => data,
            None => {
                let request = ApiRequest::get("get_repository", project_segments(&self.reference));
                let raw = self.client.call(self.token.as_ref(), &request).await?;
                normalize::project(&raw, &request.context())?
            }
        };
        Ok(self.data.insert(data))
    }

    async fn labels(&mut self) -> HosterResult<LabelSet> {
        let request = ApiRequest::get("get_labels", project_path(&self.reference, &["labels"]));
        let context = request.context();
        let items = self.client.get_all(self.token.as_ref(), request).await?;
        label_names(&items, &context, "labels")
    }

    async fn create_label(&mut self, name: &str, color: &str) -> HosterResult<()> {
        let request = ApiRequest::post(
            "create_label",
            project_path(&self.reference, &["labels"]),
            json!({ "name": name, "color": normalize_color(color) }),
        );
        self.client.send(self.token.as_ref(), &request).await?;
        info!("Created label '{}' on {}", name, self.reference);
        Ok(())
    }

    async fn delete_label(&mut self, name: &str) -> HosterResult<()> {
        let request = ApiRequest::delete("delete_label", project_path(&self.reference, &["labels", name]));
        self.client.send(self.token.as_ref(), &request).await?;
        info!("Deleted label '{}' on {}", name, self.reference);
        Ok(())
    }

    async fn create_issue(&mut self, title: &str, body: &str) -> HosterResult<GitLabIssue> {
        GitLabIssue::create(
            self.client.clone(),
            self.token.clone(),
            &self.reference.full_name(),
            title,
            body,
        )
        .await
    }

    fn issue(&self, iid: u64) -> GitLabIssue {
        GitLabIssue::lazy(self.client.clone(), self.token.clone(), self.reference.clone(), iid)
    }

    fn merge_request(&self, iid: u64) -> GitLabMergeRequest {
        GitLabMergeRequest::lazy(self.client.clone(), self.token.clone(), self.reference.clone(), iid)
    }

    fn commit(&self, sha: &str) -> GitLabCommit {
        GitLabCommit::lazy(self.client.clone(), self.token.clone(), self.reference.clone(), sha.to_string())
    }

    async fn issues(&mut self, state: Option<IssueState>) -> HosterResult<Vec<GitLabIssue>> {
        let mut request = ApiRequest::get("get_issues", project_path(&self.reference, &["issues"]));
        if let Some(state) = state {
            request = request.with_query("state", normalize::state_filter(state));
        }
        let context = request.context();

        self.client
            .get_all(self.token.as_ref(), request)
            .await?
            .iter()
            .map(|raw| {
                let data = normalize::issue(raw, &context)?;
                Ok(GitLabIssue::from_data(
                    self.client.clone(),
                    self.token.clone(),
                    self.reference.clone(),
                    data,
                ))
            })
            .collect()
    }
}
