//! Merge request capability contract

use super::types::{
    CommentData, LabelSet, MergeRequestData, MergeRequestState, MilestoneData, RepositoryRef, User,
};
use crate::error::HosterResult;
use crate::hoster::HosterKind;
use async_trait::async_trait;

/// A merge request (GitHub: pull request)
///
/// Attribute contracts match [`Issue`](super::Issue); the state additionally
/// distinguishes `Merged`.
#[async_trait]
pub trait MergeRequest: Send {
    fn hoster(&self) -> HosterKind;

    fn number(&self) -> u64;

    fn repository(&self) -> &RepositoryRef;

    async fn data(&mut self) -> HosterResult<&MergeRequestData>;

    async fn refresh(&mut self) -> HosterResult<()>;

    async fn set_title(&mut self, title: &str) -> HosterResult<()>;

    async fn set_body(&mut self, body: &str) -> HosterResult<()>;

    /// Replace the remote label set with exactly `labels`
    async fn set_labels(&mut self, labels: &LabelSet) -> HosterResult<()>;

    async fn close(&mut self) -> HosterResult<()>;

    async fn reopen(&mut self) -> HosterResult<()>;

    /// Merge into the target branch, optionally with a commit message
    async fn merge(&mut self, message: Option<&str>) -> HosterResult<()>;

    async fn add_comment(&mut self, body: &str) -> HosterResult<CommentData>;

    async fn comments(&mut self) -> HosterResult<Vec<CommentData>>;

    async fn title(&mut self) -> HosterResult<String> {
        Ok(self.data().await?.title.clone())
    }

    async fn body(&mut self) -> HosterResult<String> {
        Ok(self.data().await?.body.clone())
    }

    async fn labels(&mut self) -> HosterResult<LabelSet> {
        Ok(self.data().await?.labels.clone())
    }

    async fn state(&mut self) -> HosterResult<MergeRequestState> {
        Ok(self.data().await?.state)
    }

    async fn author(&mut self) -> HosterResult<User> {
        Ok(self.data().await?.author.clone())
    }

    /// Branch the changes come from
    async fn source_branch(&mut self) -> HosterResult<String> {
        Ok(self.data().await?.source_branch.clone())
    }

    /// Branch the changes are merged into
    async fn target_branch(&mut self) -> HosterResult<String> {
        Ok(self.data().await?.target_branch.clone())
    }

    async fn milestone(&mut self) -> HosterResult<Option<MilestoneData>> {
        Ok(self.data().await?.milestone.clone())
    }
}
