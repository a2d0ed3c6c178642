//! Issue capability contract

use super::types::{CommentData, IssueData, IssueState, LabelSet, MilestoneData, RepositoryRef, User};
use crate::error::HosterResult;
use crate::hoster::HosterKind;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// An issue (or bug report) on a hoster
#[async_trait]
pub trait Issue: Send {
    /// Hoster this issue lives on
    fn hoster(&self) -> HosterKind;

    /// Provider-assigned issue number (GitLab: `iid`)
    fn number(&self) -> u64;

    /// Parent repository
    fn repository(&self) -> &RepositoryRef;

    /// Cached attributes, fetched from the hoster on first access
    ///
    /// Fails with `NotFound` if the issue does not exist or is invisible to
    /// the credential.
    async fn data(&mut self) -> HosterResult<&IssueData>;

    /// Drop the cached view and fetch it again
    async fn refresh(&mut self) -> HosterResult<()>;

    async fn set_title(&mut self, title: &str) -> HosterResult<()>;

    async fn set_body(&mut self, body: &str) -> HosterResult<()>;

    /// Replace the remote label set with exactly `labels`
    ///
    /// Never merges with the existing labels. Fails with `Permission` when
    /// the credential cannot write and `PartialUpdate` when a multi-request
    /// update breaks part way through.
    async fn set_labels(&mut self, labels: &LabelSet) -> HosterResult<()>;

    async fn close(&mut self) -> HosterResult<()>;

    async fn reopen(&mut self) -> HosterResult<()>;

    /// Post a new comment authored by the credential's user
    async fn add_comment(&mut self, body: &str) -> HosterResult<CommentData>;

    /// All comments, oldest first as the hoster returns them
    async fn comments(&mut self) -> HosterResult<Vec<CommentData>>;

    /// Labels defined on the parent repository
    async fn available_labels(&mut self) -> HosterResult<LabelSet>;

    async fn title(&mut self) -> HosterResult<String> {
        Ok(self.data().await?.title.clone())
    }

    async fn body(&mut self) -> HosterResult<String> {
        Ok(self.data().await?.body.clone())
    }

    async fn labels(&mut self) -> HosterResult<LabelSet> {
        Ok(self.data().await?.labels.clone())
    }

    async fn state(&mut self) -> HosterResult<IssueState> {
        Ok(self.data().await?.state)
    }

    async fn author(&mut self) -> HosterResult<User> {
        Ok(self.data().await?.author.clone())
    }

    async fn assignees(&mut self) -> HosterResult<Vec<User>> {
        Ok(self.data().await?.assignees.clone())
    }

    async fn created(&mut self) -> HosterResult<DateTime<Utc>> {
        Ok(self.data().await?.created)
    }

    async fn updated(&mut self) -> HosterResult<DateTime<Utc>> {
        Ok(self.data().await?.updated)
    }

    /// Milestone the issue is scheduled for, if any
    async fn milestone(&mut self) -> HosterResult<Option<MilestoneData>> {
        Ok(self.data().await?.milestone.clone())
    }
}
