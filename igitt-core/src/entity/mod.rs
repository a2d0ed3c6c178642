//! Entity interface set
//!
//! Provider-independent capability contracts for the objects a hoster
//! exposes. Each backend implements these traits with one concrete type per
//! entity, so callers can write code generic over `I: Issue` and have it work
//! against any hoster with the dispatch resolved at compile time.
//!
//! Every entity exclusively owns its cached view of the remote object. Reads
//! fetch lazily on first use; mutations replace the cache with what the
//! provider returned. Credentials are shared, never owned.

mod comment;
mod commit;
mod issue;
mod merge_request;
mod repository;
pub mod types;

pub use comment::Comment;
pub use commit::{Commit, MANUAL_REVIEW_CONTEXT};
pub use issue::Issue;
pub use merge_request::MergeRequest;
pub use repository::Repository;
pub use types::{
    CommentData, CommitData, CommitState, CommitStatus, IssueData, IssueState, LabelSet,
    MergeRequestData, MergeRequestState, MilestoneData, MilestoneState, RepositoryData,
    RepositoryId, RepositoryRef, User,
};
