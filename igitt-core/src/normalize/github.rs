//! GitHub REST v3 payload mapping

use super::{FieldMapping, FieldRule, Normalized};
use crate::entity::{
    CommentData, CommitData, CommitState, CommitStatus, IssueData, IssueState, MergeRequestData,
    MergeRequestState, MilestoneData, MilestoneState, RepositoryData,
};
use crate::error::{ErrorContext, HosterError, HosterResult};
use serde_json::Value;

pub const ISSUE: FieldMapping = FieldMapping {
    entity: "issue",
    rules: &[
        FieldRule::required("number", "/number"),
        FieldRule::required("title", "/title"),
        FieldRule::nullable("body", "/body"),
        FieldRule::required("state", "/state"),
        FieldRule::required("labels", "/labels"),
        FieldRule::required("author_id", "/user/id"),
        FieldRule::required("author", "/user/login"),
        FieldRule::optional("assignees", "/assignees"),
        FieldRule::required("created", "/created_at"),
        FieldRule::required("updated", "/updated_at"),
        FieldRule::required("web_url", "/html_url"),
        FieldRule::optional("milestone", "/milestone"),
    ],
};

pub const PULL_REQUEST: FieldMapping = FieldMapping {
    entity: "pull_request",
    rules: &[
        FieldRule::required("number", "/number"),
        FieldRule::required("title", "/title"),
        FieldRule::nullable("body", "/body"),
        FieldRule::required("state", "/state"),
        // only the single-PR endpoint reports `merged`
        FieldRule::optional("merged", "/merged"),
        FieldRule::optional("merged_at", "/merged_at"),
        FieldRule::required("labels", "/labels"),
        FieldRule::required("author_id", "/user/id"),
        FieldRule::required("author", "/user/login"),
        FieldRule::optional("assignees", "/assignees"),
        FieldRule::required("source_branch", "/head/ref"),
        FieldRule::required("target_branch", "/base/ref"),
        FieldRule::required("created", "/created_at"),
        FieldRule::required("updated", "/updated_at"),
        FieldRule::required("web_url", "/html_url"),
        FieldRule::optional("milestone", "/milestone"),
    ],
};

pub const COMMENT: FieldMapping = FieldMapping {
    entity: "comment",
    rules: &[
        FieldRule::required("id", "/id"),
        FieldRule::nullable("body", "/body"),
        FieldRule::required("author_id", "/user/id"),
        FieldRule::required("author", "/user/login"),
        FieldRule::required("created", "/created_at"),
        FieldRule::required("updated", "/updated_at"),
    ],
};

pub const REPOSITORY: FieldMapping = FieldMapping {
    entity: "repository",
    rules: &[
        FieldRule::required("id", "/id"),
        FieldRule::required("full_name", "/full_name"),
        FieldRule::required("web_url", "/html_url"),
        FieldRule::optional("default_branch", "/default_branch"),
    ],
};

pub const MILESTONE: FieldMapping = FieldMapping {
    entity: "milestone",
    rules: &[
        FieldRule::required("id", "/id"),
        FieldRule::required("number", "/number"),
        FieldRule::required("title", "/title"),
        FieldRule::required("state", "/state"),
        FieldRule::optional("due_date", "/due_on"),
    ],
};

pub const STATUS: FieldMapping = FieldMapping {
    entity: "status",
    rules: &[
        FieldRule::required("state", "/state"),
        FieldRule::required("context", "/context"),
        FieldRule::nullable("description", "/description"),
        FieldRule::nullable("url", "/target_url"),
    ],
};

pub const COMMIT: FieldMapping = FieldMapping {
    entity: "commit",
    rules: &[
        FieldRule::required("sha", "/sha"),
        FieldRule::required("message", "/commit/message"),
        FieldRule::required("parents", "/parents"),
    ],
};

/// Normalize an issue payload
pub fn issue(raw: &Value, context: &ErrorContext) -> HosterResult<IssueData> {
    let n = ISSUE.apply(raw, context)?;

    Ok(IssueData {
        number: n.u64("number")?,
        title: n.string("title")?,
        body: n.opt_string("body")?.unwrap_or_default(),
        state: issue_state(&n)?,
        labels: n.label_objects("labels")?,
        author: n.user("author_id", "author")?,
        assignees: n.users("assignees", "login")?,
        created: n.timestamp("created")?,
        updated: n.timestamp("updated")?,
        web_url: n.string("web_url")?,
        milestone: n.value("milestone").map(|raw| milestone(raw, context)).transpose()?,
    })
}

/// Normalize a pull request payload
pub fn pull_request(raw: &Value, context: &ErrorContext) -> HosterResult<MergeRequestData> {
    let n = PULL_REQUEST.apply(raw, context)?;

    Ok(MergeRequestData {
        number: n.u64("number")?,
        title: n.string("title")?,
        body: n.opt_string("body")?.unwrap_or_default(),
        state: pull_request_state(&n)?,
        labels: n.label_objects("labels")?,
        author: n.user("author_id", "author")?,
        assignees: n.users("assignees", "login")?,
        source_branch: n.string("source_branch")?,
        target_branch: n.string("target_branch")?,
        created: n.timestamp("created")?,
        updated: n.timestamp("updated")?,
        web_url: n.string("web_url")?,
        milestone: n.value("milestone").map(|raw| milestone(raw, context)).transpose()?,
    })
}

pub fn comment(raw: &Value, context: &ErrorContext) -> HosterResult<CommentData> {
    let n = COMMENT.apply(raw, context)?;

    Ok(CommentData {
        id: n.u64("id")?,
        body: n.opt_string("body")?.unwrap_or_default(),
        author: n.user("author_id", "author")?,
        created: n.timestamp("created")?,
        updated: n.timestamp("updated")?,
    })
}

pub fn repository(raw: &Value, context: &ErrorContext) -> HosterResult<RepositoryData> {
    let n = REPOSITORY.apply(raw, context)?;

    Ok(RepositoryData {
        id: n.u64("id")?,
        full_name: n.string("full_name")?,
        web_url: n.string("web_url")?,
        default_branch: n.opt_string("default_branch")?,
    })
}

pub fn milestone(raw: &Value, context: &ErrorContext) -> HosterResult<MilestoneData> {
    let n = MILESTONE.apply(raw, context)?;

    let state = match n.string("state")?.as_str() {
        "open" => MilestoneState::Open,
        "closed" => MilestoneState::Closed,
        _ => return Err(HosterError::malformed(context, "state")),
    };

    Ok(MilestoneData {
        id: n.u64("id")?,
        number: n.u64("number")?,
        title: n.string("title")?,
        state,
        due_date: n.opt_date("due_date")?,
    })
}

/// Normalize one entry of a commit's status list
pub fn status(raw: &Value, context: &ErrorContext) -> HosterResult<CommitStatus> {
    let n = STATUS.apply(raw, context)?;

    let state = match n.string("state")?.as_str() {
        "success" => CommitState::Success,
        "pending" => CommitState::Pending,
        "failure" => CommitState::Failed,
        "error" => CommitState::Error,
        _ => return Err(HosterError::malformed(context, "state")),
    };

    Ok(CommitStatus {
        state,
        context: n.string("context")?,
        description: n.opt_string("description")?.unwrap_or_default(),
        url: n.opt_string("url")?,
    })
}

/// GitHub's name for a commit state
pub fn status_state(state: CommitState) -> &'static str {
    match state {
        CommitState::Success => "success",
        CommitState::Pending => "pending",
        CommitState::Failed => "failure",
        CommitState::Error => "error",
    }
}

pub fn commit(raw: &Value, context: &ErrorContext) -> HosterResult<CommitData> {
    let n = COMMIT.apply(raw, context)?;

    let parents = n
        .array("parents")?
        .iter()
        .map(|parent| {
            parent
                .get("sha")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| HosterError::malformed(context, "parents"))
        })
        .collect::<HosterResult<_>>()?;

    Ok(CommitData {
        sha: n.string("sha")?,
        message: n.string("message")?,
        parents,
    })
}

/// Whether an issues-endpoint item is really a pull request
pub fn is_pull_request(raw: &Value) -> bool {
    raw.get("pull_request").is_some_and(|pr| !pr.is_null())
}

fn issue_state(n: &Normalized<'_>) -> HosterResult<IssueState> {
    match n.string("state")?.as_str() {
        "open" => Ok(IssueState::Open),
        "closed" => Ok(IssueState::Closed),
        _ => Err(HosterError::malformed(n.context(), "state")),
    }
}

fn pull_request_state(n: &Normalized<'_>) -> HosterResult<MergeRequestState> {
    let merged = n.opt_bool("merged")?.unwrap_or(false) || n.value("merged_at").is_some();

    match n.string("state")?.as_str() {
        "open" => Ok(MergeRequestState::Open),
        "closed" if merged => Ok(MergeRequestState::Merged),
        "closed" => Ok(MergeRequestState::Closed),
        _ => Err(HosterError::malformed(n.context(), "state")),
    }
}
