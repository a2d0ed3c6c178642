//! GitHub backend (REST v3)
//!
//! Pull requests share their number, labels and comments with the issue of
//! the same number, so label and comment traffic for both goes through the
//! issues endpoints.

mod comment;
mod commit;
mod issue;
mod labels;
mod merge_request;
mod repository;

pub use comment::GitHubComment;
pub use commit::GitHubCommit;
pub use issue::GitHubIssue;
pub use merge_request::GitHubMergeRequest;
pub use repository::GitHubRepository;

use crate::entity::{RepositoryId, RepositoryRef};
use crate::hoster::HosterKind;

/// API path of a repository, e.g. `repos/org/repo`
pub(crate) fn repo_segments(repository: &RepositoryRef) -> Vec<String> {
    match &repository.id {
        RepositoryId::Path { namespace, name } => {
            vec!["repos".to_string(), namespace.clone(), name.clone()]
        }
        RepositoryId::Numeric(id) => vec!["repositories".to_string(), id.to_string()],
    }
}

/// Repository path extended by `tail`
pub(crate) fn repo_path(repository: &RepositoryRef, tail: &[&str]) -> Vec<String> {
    let mut segments = repo_segments(repository);
    segments.extend(tail.iter().map(|s| s.to_string()));
    segments
}

/// Issue path, shared by the pull request of the same number
pub(crate) fn issue_path(repository: &RepositoryRef, number: u64, tail: &[&str]) -> Vec<String> {
    let number = number.to_string();
    let mut segments = repo_path(repository, &["issues", number.as_str()]);
    segments.extend(tail.iter().map(|s| s.to_string()));
    segments
}

pub(crate) fn parse_repository(repository: &str) -> crate::error::HosterResult<RepositoryRef> {
    RepositoryRef::parse(HosterKind::GitHub, repository)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let repo = parse_repository("org/repo").unwrap();
        assert_eq!(repo_segments(&repo).join("/"), "repos/org/repo");
        assert_eq!(issue_path(&repo, 10, &["labels"]).join("/"), "repos/org/repo/issues/10/labels");
    }

    #[test]
    fn test_numeric_repository_path() {
        let repo = parse_repository("1296269").unwrap();
        assert_eq!(repo_path(&repo, &["labels"]).join("/"), "repositories/1296269/labels");
    }
}
