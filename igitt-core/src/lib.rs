//! IGitt
//!
//! One object model for issues, merge requests, comments, labels and
//! repositories on GitHub and GitLab. Code written against the traits in
//! [`entity`] works unchanged against either hoster.

pub mod auth;
pub mod config;
pub mod entity;
pub mod error;
pub mod hoster;
pub mod http;
pub mod labels;
pub mod normalize;
pub mod sync;

pub use auth::{GitHubToken, GitLabToken, Token};
pub use entity::{
    Comment, CommentData, Commit, CommitData, CommitState, CommitStatus, Issue, IssueData,
    IssueState, LabelSet, MergeRequest, MergeRequestData, MergeRequestState, MilestoneData,
    MilestoneState, Repository, RepositoryData, RepositoryRef, User,
};
pub use error::{ErrorContext, HosterError, HosterResult, ProviderFailure};
pub use hoster::{HosterClient, HosterKind, LabelStrategy};

/// Returns the version of the IGitt library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
