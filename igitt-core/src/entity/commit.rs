//! Commit capability contract

use super::types::{CommitData, CommitState, CommitStatus, RepositoryRef};
use crate::error::HosterResult;
use crate::hoster::HosterKind;
use async_trait::async_trait;

/// Status context used by the manual review helpers
pub const MANUAL_REVIEW_CONTEXT: &str = "review/gitmate/manual";

/// A commit in a repository, addressed by SHA
///
/// Status checks are keyed by context: setting a status whose context
/// already exists replaces it.
#[async_trait]
pub trait Commit: Send {
    fn hoster(&self) -> HosterKind;

    /// The SHA (or unambiguous prefix) this handle was created with
    fn sha(&self) -> &str;

    fn repository(&self) -> &RepositoryRef;

    /// Cached attributes, fetched on first access; `data().sha` is always the full SHA
    async fn data(&mut self) -> HosterResult<&CommitData>;

    /// Current status per context, newest first
    async fn statuses(&mut self) -> HosterResult<Vec<CommitStatus>>;

    async fn set_status(&mut self, status: &CommitStatus) -> HosterResult<()>;

    async fn message(&mut self) -> HosterResult<String> {
        Ok(self.data().await?.message.clone())
    }

    /// SHA of the first parent; `None` for a root commit
    async fn parent_sha(&mut self) -> HosterResult<Option<String>> {
        Ok(self.data().await?.parents.first().cloned())
    }

    async fn combined_status(&mut self) -> HosterResult<CommitState> {
        let statuses = self.statuses().await?;
        Ok(CommitState::combine(statuses.iter().map(|s| s.state)))
    }

    /// Mark the commit as reviewed
    async fn ack(&mut self) -> HosterResult<()> {
        let status = CommitStatus::new(CommitState::Success, MANUAL_REVIEW_CONTEXT)
            .with_description("This commit was acknowledged.");
        self.set_status(&status).await
    }

    /// Mark the commit as needing work
    async fn unack(&mut self) -> HosterResult<()> {
        let status = CommitStatus::new(CommitState::Failed, MANUAL_REVIEW_CONTEXT)
            .with_description("This commit needs work.");
        self.set_status(&status).await
    }

    /// Ask for review unless a manual review status already exists
    async fn pending(&mut self) -> HosterResult<()> {
        let reviewed = self
            .statuses()
            .await?
            .iter()
            .any(|status| status.context == MANUAL_REVIEW_CONTEXT);
        if reviewed {
            return Ok(());
        }

        let status = CommitStatus::new(CommitState::Pending, MANUAL_REVIEW_CONTEXT)
            .with_description("This commit needs review.");
        self.set_status(&status).await
    }
}
