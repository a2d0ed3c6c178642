//! Repository capability contract

use super::commit::Commit;
use super::issue::Issue;
use super::merge_request::MergeRequest;
use super::types::{IssueState, LabelSet, RepositoryData, RepositoryRef};
use crate::error::HosterResult;
use async_trait::async_trait;

/// A repository (GitLab: project); the parent scope of issues and merge requests
#[async_trait]
pub trait Repository: Send {
    /// Concrete issue type of this hoster
    type Issue: Issue;

    /// Concrete merge request type of this hoster
    type MergeRequest: MergeRequest;

    type Commit: Commit;

    fn reference(&self) -> &RepositoryRef;

    async fn data(&mut self) -> HosterResult<&RepositoryData>;

    /// Labels defined on this repository
    async fn labels(&mut self) -> HosterResult<LabelSet>;

    /// Define a new label; `color` is a hex code with or without leading `#`
    async fn create_label(&mut self, name: &str, color: &str) -> HosterResult<()>;

    async fn delete_label(&mut self, name: &str) -> HosterResult<()>;

    /// Open a new issue
    async fn create_issue(&mut self, title: &str, body: &str) -> HosterResult<Self::Issue>;

    /// Handle to an existing issue; no request is made until it is read
    fn issue(&self, number: u64) -> Self::Issue;

    /// Handle to an existing merge request; no request is made until it is read
    fn merge_request(&self, number: u64) -> Self::MergeRequest;

    /// Handle to a commit by SHA; no request is made until it is read
    fn commit(&self, sha: &str) -> Self::Commit;

    /// Issues filtered by state, `None` for all; merge requests are excluded
    async fn issues(&mut self, state: Option<IssueState>) -> HosterResult<Vec<Self::Issue>>;

    /// Fetch an existing issue; `NotFound` if there is none with that number
    async fn get_issue(&mut self, number: u64) -> HosterResult<Self::Issue> {
        let mut issue = self.issue(number);
        issue.refresh().await?;
        Ok(issue)
    }

    async fn full_name(&mut self) -> HosterResult<String> {
        Ok(self.data().await?.full_name.clone())
    }
}
