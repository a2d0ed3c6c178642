//! Common attribute model shared by every hoster
//!
//! Provider payloads are normalized into these shapes before any entity hands
//! them to a caller. Nothing in here knows about a specific provider's field
//! names.

use crate::error::{HosterError, HosterResult};
use crate::hoster::HosterKind;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::btree_set;
use std::collections::BTreeSet;
use std::fmt;

/// A set of label captions; never holds duplicates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet(BTreeSet<String>);

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a label, returns false if it was already present
    pub fn insert(&mut self, label: impl Into<String>) -> bool {
        self.0.insert(label.into())
    }

    pub fn remove(&mut self, label: &str) -> bool {
        self.0.remove(label)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.contains(label)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Labels in sorted order
    pub fn iter(&self) -> btree_set::Iter<'_, String> {
        self.0.iter()
    }

    /// Labels present here but not in `other`
    pub fn difference<'a>(&'a self, other: &'a LabelSet) -> btree_set::Difference<'a, String> {
        self.0.difference(&other.0)
    }

    /// Sorted labels as an owned vector
    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }

    /// Labels joined by `separator`, in sorted order
    pub fn join(&self, separator: &str) -> String {
        self.to_vec().join(separator)
    }
}

impl<S: Into<String>> FromIterator<S> for LabelSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for LabelSet {
    fn from(labels: [S; N]) -> Self {
        labels.into_iter().collect()
    }
}

impl IntoIterator for LabelSet {
    type Item = String;
    type IntoIter = btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a LabelSet {
    type Item = &'a String;
    type IntoIter = btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// State of an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

impl fmt::Display for IssueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// State of a merge request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeRequestState {
    Open,
    Closed,
    Merged,
}

impl fmt::Display for MergeRequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Merged => write!(f, "merged"),
        }
    }
}

/// How a repository is addressed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RepositoryId {
    /// `namespace/name`; GitLab namespaces may nest (`group/sub`)
    Path { namespace: String, name: String },
    /// Provider-assigned numeric id
    Numeric(u64),
}

/// A repository on a specific hoster; the parent scope of issues and merge requests
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub hoster: HosterKind,
    pub id: RepositoryId,
}

impl RepositoryRef {
    /// Parse `owner/name` (or a numeric id) for the given hoster
    ///
    /// GitHub repositories have exactly one owner segment; GitLab projects
    /// may live in nested groups.
    pub fn parse(hoster: HosterKind, reference: &str) -> HosterResult<Self> {
        let reference = reference.trim().trim_matches('/');

        if let Ok(id) = reference.parse::<u64>() {
            return Ok(Self {
                hoster,
                id: RepositoryId::Numeric(id),
            });
        }

        let (namespace, name) = reference.rsplit_once('/').ok_or_else(|| {
            HosterError::configuration(format!(
                "Invalid repository reference '{}'. Expected: owner/name",
                reference
            ))
        })?;

        let segments_ok = namespace.split('/').chain([name]).all(|s| !s.is_empty());
        if !segments_ok {
            return Err(HosterError::configuration(format!(
                "Invalid repository reference '{}': empty path segment",
                reference
            )));
        }

        if hoster == HosterKind::GitHub && namespace.contains('/') {
            return Err(HosterError::configuration(format!(
                "Invalid GitHub repository '{}'. Expected: owner/name",
                reference
            )));
        }

        Ok(Self {
            hoster,
            id: RepositoryId::Path {
                namespace: namespace.to_string(),
                name: name.to_string(),
            },
        })
    }

    /// `namespace/name`, or the numeric id as a string
    pub fn full_name(&self) -> String {
        match &self.id {
            RepositoryId::Path { namespace, name } => format!("{}/{}", namespace, name),
            RepositoryId::Numeric(id) => id.to_string(),
        }
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.hoster, self.full_name())
    }
}

/// An account on a hoster
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
}

/// Normalized issue attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueData {
    pub number: u64,
    pub title: String,
    pub body: String,
    pub state: IssueState,
    pub labels: LabelSet,
    pub author: User,
    pub assignees: Vec<User>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub web_url: String,
    pub milestone: Option<MilestoneData>,
}

/// Normalized merge request (pull request) attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeRequestData {
    pub number: u64,
    pub title: String,
    pub body: String,
    pub state: MergeRequestState,
    pub labels: LabelSet,
    pub author: User,
    pub assignees: Vec<User>,
    pub source_branch: String,
    pub target_branch: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub web_url: String,
    pub milestone: Option<MilestoneData>,
}

/// Normalized comment attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentData {
    pub id: u64,
    pub body: String,
    pub author: User,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// State of a milestone (GitLab: `active` is open)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MilestoneState {
    Open,
    Closed,
}

/// Milestone an issue or merge request is scheduled for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneData {
    /// Provider-wide id
    pub id: u64,
    /// Number shown in the web UI (GitLab: `iid`)
    pub number: u64,
    pub title: String,
    pub state: MilestoneState,
    pub due_date: Option<NaiveDate>,
}

/// Outcome a status check reports on a commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitState {
    Success,
    Pending,
    /// The check ran and found a problem
    Failed,
    /// The check itself could not run
    Error,
}

impl CommitState {
    /// Fold per-context states into one verdict
    ///
    /// Any failure or error wins. Otherwise no states at all, or any pending
    /// one, is `Pending`.
    pub fn combine<I: IntoIterator<Item = CommitState>>(states: I) -> CommitState {
        let mut combined = None;
        for state in states {
            combined = match (combined, state) {
                (_, Self::Failed | Self::Error) => return Self::Failed,
                (Some(Self::Pending), _) | (_, Self::Pending) => Some(Self::Pending),
                _ => Some(Self::Success),
            };
        }
        combined.unwrap_or(Self::Pending)
    }
}

impl fmt::Display for CommitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Pending => write!(f, "pending"),
            Self::Failed => write!(f, "failed"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A status check on a commit; a hoster keeps one current status per context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStatus {
    pub state: CommitState,
    /// Name of the check, e.g. `ci/build`
    pub context: String,
    pub description: String,
    /// Link to details
    pub url: Option<String>,
}

impl CommitStatus {
    pub fn new(state: CommitState, context: impl Into<String>) -> Self {
        Self {
            state,
            context: context.into(),
            description: String::new(),
            url: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Normalized commit attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitData {
    /// Full 40-character SHA
    pub sha: String,
    pub message: String,
    /// Parent SHAs; the first is the mainline parent of a merge
    pub parents: Vec<String>,
}

/// Normalized repository attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryData {
    pub id: u64,
    pub full_name: String,
    pub web_url: String,
    pub default_branch: Option<String>,
}
