//! GitHub repositories

use super::{parse_repository, repo_path, repo_segments, GitHubCommit, GitHubIssue, GitHubMergeRequest};
use crate::auth::GitHubToken;
use crate::entity::{IssueState, LabelSet, Repository, RepositoryData, RepositoryRef};
use crate::error::HosterResult;
use crate::hoster::HosterClient;
use crate::http::ApiRequest;
use crate::normalize::{github as normalize, label_names};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// A repository on GitHub
#[derive(Debug, Clone)]
pub struct GitHubRepository {
    client: HosterClient,
    token: Arc<GitHubToken>,
    reference: RepositoryRef,
    data: Option<RepositoryData>,
}

impl GitHubRepository {
    /// Handle to `owner/name` (or a numeric repository id); nothing is fetched yet
    pub fn new(client: HosterClient, token: Arc<GitHubToken>, repository: &str) -> HosterResult<Self> {
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
impl Repository for GitHubRepository {
    type Issue = GitHubIssue;
    type MergeRequest = GitHubMergeRequest;
    type Commit = GitHubCommit;

    fn reference(&self) -> &RepositoryRef {
        &self.reference
    }

    async fn data(&mut self) -> HosterResult<&RepositoryData> {
        let data = match self.data.take() {
            Some(data) => data,
            None => {
                let request = ApiRequest::get("get_repository", repo_segments(&self.reference));
                let raw = self.client.call(self.token.as_ref(), &request).await?;
                normalize::repository(&raw, &request.context())?
            }
        };
        Ok(self.data.insert(data))
    }

    async fn labels(&mut self) -> HosterResult<LabelSet> {
        let request = ApiRequest::get("get_labels", repo_path(&self.reference, &["labels"]));
        let context = request.context();
        let items = self.client.get_all(self.token.as_ref(), request).await?;
        label_names(&items, &context, "labels")
    }

    async fn create_label(&mut self, name: &str, color: &str) -> HosterResult<()> {
        let request = ApiRequest::post(
            "create_label",
            repo_path(&self.reference, &["labels"]),
            json!({ "name": name, "color": color.trim_start_matches('#') }),
        );
        self.client.send(self.token.as_ref(), &request).await?;
        info!("Created label '{}' on {}", name, self.reference);
        Ok(())
    }

    async fn delete_label(&mut self, name: &str) -> HosterResult<()> {
        let request = ApiRequest::delete("delete_label", repo_path(&self.reference, &["labels", name]));
        self.client.send(self.token.as_ref(), &request).await?;
        info!("Deleted label '{}' on {}", name, self.reference);
        Ok(())
    }

    async fn create_issue(&mut self, title: &str, body: &str) -> HosterResult<GitHubIssue> {
        GitHubIssue::create(
            self.client.clone(),
            self.token.clone(),
            &self.reference.full_name(),
            title,
            body,
        )
        .await
    }

    fn issue(&self, number: u64) -> GitHubIssue {
        GitHubIssue::lazy(self.client.clone(), self.token.clone(), self.reference.clone(), number)
    }

    fn merge_request(&self, number: u64) -> GitHubMergeRequest {
        GitHubMergeRequest::lazy(self.client.clone(), self.token.clone(), self.reference.clone(), number)
    }

    fn commit(&self, sha: &str) -> GitHubCommit {
        GitHubCommit::lazy(self.client.clone(), self.token.clone(), self.reference.clone(), sha.to_string())
    }

    async fn issues(&mut self, state: Option<IssueState>) -> HosterResult<Vec<GitHubIssue>> {
        let filter = state.map(|s| s.to_string()).unwrap_or_else(|| "all".to_string());
        let request = ApiRequest::get("get_issues", repo_path(&self.reference, &["issues"]))
            .with_query("state", filter);
        let context = request.context();

        self.client
            .get_all(self.token.as_ref(), request)
            .await?
            .iter()
            // the issues endpoint lists pull requests too
            .filter(|raw| !normalize::is_pull_request(raw))
            .map(|raw| {
                let data = normalize::issue(raw, &context)?;
                Ok(GitHubIssue::from_data(
                    self.client.clone(),
                    self.token.clone(),
                    self.reference.clone(),
                    data,
                ))
            })
            .collect()
    }
}
