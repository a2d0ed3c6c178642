//! GitLab REST v4 payload mapping

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
        FieldRule::required("number", "/iid"),
        FieldRule::required("title", "/title"),
        FieldRule::nullable("body", "/description"),
        FieldRule::required("state", "/state"),
        FieldRule::required("labels", "/labels"),
        FieldRule::required("author_id", "/author/id"),
        FieldRule::required("author", "/author/username"),
        FieldRule::optional("assignees", "/assignees"),
        FieldRule::required("created", "/created_at"),
        FieldRule::required("updated", "/updated_at"),
        FieldRule::required("web_url", "/web_url"),
        FieldRule::optional("milestone", "/milestone"),
    ],
};

pub const MERGE_REQUEST: FieldMapping = FieldMapping {
    entity: "merge_request",
    rules: &[
        FieldRule::required("number", "/iid"),
        FieldRule::required("title", "/title"),
        FieldRule::nullable("body", "/description"),
        FieldRule::required("state", "/state"),
        FieldRule::required("labels", "/labels"),
        FieldRule::required("author_id", "/author/id"),
        FieldRule::required("author", "/author/username"),
        FieldRule::optional("assignees", "/assignees"),
        FieldRule::required("source_branch", "/source_branch"),
        FieldRule::required("target_branch", "/target_branch"),
        FieldRule::required("created", "/created_at"),
        FieldRule::required("updated", "/updated_at"),
        FieldRule::required("web_url", "/web_url"),
        FieldRule::optional("milestone", "/milestone"),
    ],
};

pub const NOTE: FieldMapping = FieldMapping {
    entity: "note",
    rules: &[
        FieldRule::required("id", "/id"),
        FieldRule::nullable("body", "/body"),
        FieldRule::required("author_id", "/author/id"),
        FieldRule::required("author", "/author/username"),
        FieldRule::required("created", "/created_at"),
        FieldRule::required("updated", "/updated_at"),
    ],
};

pub const PROJECT: FieldMapping = FieldMapping {
    entity: "project",
    rules: &[
        FieldRule::required("id", "/id"),
        FieldRule::required("full_name", "/path_with_namespace"),
        FieldRule::required("web_url", "/web_url"),
        // empty projects have no default branch
        FieldRule::optional("default_branch", "/default_branch"),
    ],
};

pub const MILESTONE: FieldMapping = FieldMapping {
    entity: "milestone",
    rules: &[
        FieldRule::required("id", "/id"),
        FieldRule::required("number", "/iid"),
        FieldRule::required("title", "/title"),
        FieldRule::required("state", "/state"),
        FieldRule::optional("due_date", "/due_date"),
    ],
};

pub const STATUS: FieldMapping = FieldMapping {
    entity: "status",
    rules: &[
        FieldRule::required("state", "/status"),
        FieldRule::required("context", "/name"),
        FieldRule::optional("description", "/description"),
        FieldRule::optional("url", "/target_url"),
    ],
};

pub const COMMIT: FieldMapping = FieldMapping {
    entity: "commit",
    rules: &[
        FieldRule::required("sha", "/id"),
        FieldRule::required("message", "/message"),
        FieldRule::required("parents", "/parent_ids"),
    ],
};

pub fn issue(raw: &Value, context: &ErrorContext) -> HosterResult<IssueData> {
    let n = ISSUE.apply(raw, context)?;

    Ok(IssueData {
        number: n.u64("number")?,
        title: n.string("title")?,
        body: n.opt_string("body")?.unwrap_or_default(),
        state: issue_state(&n)?,
        labels: n.label_strings("labels")?,
        author: n.user("author_id", "author")?,
        assignees: n.users("assignees", "username")?,
        created: n.timestamp("created")?,
        updated: n.timestamp("updated")?,
        web_url: n.string("web_url")?,
        milestone: n.value("milestone").map(|raw| milestone(raw, context)).transpose()?,
    })
}

pub fn merge_request(raw: &Value, context: &ErrorContext) -> HosterResult<MergeRequestData> {
    let n = MERGE_REQUEST.apply(raw, context)?;

    Ok(MergeRequestData {
        number: n.u64("number")?,
        title: n.string("title")?,
        body: n.opt_string("body")?.unwrap_or_default(),
        state: merge_request_state(&n)?,
        labels: n.label_strings("labels")?,
        author: n.user("author_id", "author")?,
        assignees: n.users("assignees", "username")?,
        source_branch: n.string("source_branch")?,
        target_branch: n.string("target_branch")?,
        created: n.timestamp("created")?,
        updated: n.timestamp("updated")?,
        web_url: n.string("web_url")?,
        milestone: n.value("milestone").map(|raw| milestone(raw, context)).transpose()?,
    })
}

pub fn note(raw: &Value, context: &ErrorContext) -> HosterResult<CommentData> {
    let n = NOTE.apply(raw, context)?;

    Ok(CommentData {
        id: n.u64("id")?,
        body: n.opt_string("body")?.unwrap_or_default(),
        author: n.user("author_id", "author")?,
        created: n.timestamp("created")?,
        updated: n.timestamp("updated")?,
    })
}

pub fn project(raw: &Value, context: &ErrorContext) -> HosterResult<RepositoryData> {
    let n = PROJECT.apply(raw, context)?;

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
        "active" => MilestoneState::Open,
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
///
/// GitLab reports pipeline job states; they collapse onto the four common
/// states, with `canceled` counting as a failure.
pub fn status(raw: &Value, context: &ErrorContext) -> HosterResult<CommitStatus> {
    let n = STATUS.apply(raw, context)?;

    let state = match n.string("state")?.as_str() {
        "success" | "manual" | "skipped" => CommitState::Success,
        "pending" | "running" | "created" | "preparing" | "scheduled" | "waiting_for_resource" => {
            CommitState::Pending
        }
        "failed" | "canceled" => CommitState::Failed,
        _ => return Err(HosterError::malformed(context, "state")),
    };

    Ok(CommitStatus {
        state,
        context: n.string("context")?,
        description: n.opt_string("description")?.unwrap_or_default(),
        url: n.opt_string("url")?,
    })
}

/// GitLab's name for a commit state; GitLab has no separate error state
pub fn status_state(state: CommitState) -> &'static str {
    match state {
        CommitState::Success => "success",
        CommitState::Pending => "pending",
        CommitState::Failed | CommitState::Error => "failed",
    }
}

pub fn commit(raw: &Value, context: &ErrorContext) -> HosterResult<CommitData> {
    let n = COMMIT.apply(raw, context)?;

    Ok(CommitData {
        sha: n.string("sha")?,
        message: n.string("message")?,
        parents: n.strings("parents")?,
    })
}

/// GitLab state filter value for a common issue state
pub fn state_filter(state: IssueState) -> &'static str {
    match state {
        IssueState::Open => "opened",
        IssueState::Closed => "closed",
    }
}

fn issue_state(n: &Normalized<'_>) -> HosterResult<IssueState> {
    match n.string("state")?.as_str() {
        "opened" | "reopened" => Ok(IssueState::Open),
        "closed" | "locked" => Ok(IssueState::Closed),
        _ => Err(HosterError::malformed(n.context(), "state")),
    }
}

fn merge_request_state(n: &Normalized<'_>) -> HosterResult<MergeRequestState> {
    match n.string("state")?.as_str() {
        "opened" | "reopened" => Ok(MergeRequestState::Open),
        "closed" | "locked" => Ok(MergeRequestState::Closed),
        "merged" => Ok(MergeRequestState::Merged),
        _ => Err(HosterError::malformed(n.context(), "state")),
    }
}
