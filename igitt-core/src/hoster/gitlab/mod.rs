//! GitLab backend (REST v4)
//!
//! Projects are addressed by numeric id or by their URL-encoded full path,
//! which travels as a single path segment (`group%2Fsub%2Fproject`). Issues
//! and merge requests are addressed by their project-local `iid`.

mod comment;
mod commit;
mod issue;
mod labels;
mod merge_request;
mod repository;

pub use comment::GitLabComment;
pub use commit::GitLabCommit;
pub use issue::GitLabIssue;
pub use merge_request::GitLabMergeRequest;
pub use repository::GitLabRepository;

use crate::entity::{RepositoryId, RepositoryRef};
use crate::error::HosterResult;
use crate::hoster::HosterKind;

/// API path of a project, e.g. `projects/group%2Fproject` once encoded
pub(crate) fn project_segments(repository: &RepositoryRef) -> Vec<String> {
    let id = match &repository.id {
        RepositoryId::Path { .. } => repository.full_name(),
        RepositoryId::Numeric(id) => id.to_string(),
    };
    vec!["projects".to_string(), id]
}

pub(crate) fn project_path(repository: &RepositoryRef, tail: &[&str]) -> Vec<String> {
    let mut segments = project_segments(repository);
    segments.extend(tail.iter().map(|s| s.to_string()));
    segments
}

/// Kind of object notes and labels hang off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Noteable {
    Issue,
    MergeRequest,
}

impl Noteable {
    fn collection(&self) -> &'static str {
        match self {
            Self::Issue => "issues",
            Self::MergeRequest => "merge_requests",
        }
    }

    /// Path of object `iid` of this kind, extended by `tail`
    pub(crate) fn path(&self, repository: &RepositoryRef, iid: u64, tail: &[&str]) -> Vec<String> {
        let iid = iid.to_string();
        let mut segments = project_path(repository, &[self.collection(), iid.as_str()]);
        segments.extend(tail.iter().map(|s| s.to_string()));
        segments
    }
}

/// GitLab wants label colors as `#RRGGBB`
pub(crate) fn normalize_color(color: &str) -> String {
    format!("#{}", color.trim_start_matches('#'))
}

pub(crate) fn parse_repository(repository: &str) -> HosterResult<RepositoryRef> {
    RepositoryRef::parse(HosterKind::GitLab, repository)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_path_is_one_segment() {
        let repo = parse_repository("group/sub/project").unwrap();
        assert_eq!(
            project_segments(&repo),
            vec!["projects".to_string(), "group/sub/project".to_string()]
        );
    }

    #[test]
    fn test_noteable_paths() {
        let repo = parse_repository("1234").unwrap();
        assert_eq!(
            Noteable::MergeRequest.path(&repo, 3, &["notes"]).join("/"),
            "projects/1234/merge_requests/3/notes"
        );
        assert_eq!(
            Noteable::Issue.path(&repo, 10, &[]).join("/"),
            "projects/1234/issues/10"
        );
    }

    #[test]
    fn test_label_color_gets_hash() {
        assert_eq!(normalize_color("ff0000"), "#ff0000");
        assert_eq!(normalize_color("#ff0000"), "#ff0000");
    }
}
