//! Shared fixtures for the hoster integration tests

#![allow(dead_code)]

use igitt::{GitHubToken, GitLabToken, HosterClient, HosterKind};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::MockServer;

/// Route library logs to the test output; honours `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub const GITHUB_SECRET: &str = "ghp_testtoken1234";
pub const GITLAB_SECRET: &str = "glpat-testtoken1234";

pub fn github_client(server: &MockServer) -> HosterClient {
    init_tracing();
    HosterClient::with_base_url(HosterKind::GitHub, &server.uri()).unwrap()
}

pub fn gitlab_client(server: &MockServer) -> HosterClient {
    init_tracing();
    HosterClient::with_base_url(HosterKind::GitLab, &format!("{}/api/v4", server.uri())).unwrap()
}

pub fn github_token() -> Arc<GitHubToken> {
    Arc::new(GitHubToken::personal(GITHUB_SECRET))
}

pub fn gitlab_token() -> Arc<GitLabToken> {
    Arc::new(GitLabToken::private(GITLAB_SECRET))
}

pub fn github_issue(number: u64, labels: &[&str]) -> Value {
    json!({
        "number": number,
        "title": "Crash on startup",
        "body": "It crashes.",
        "state": "open",
        "labels": labels.iter().map(|name| json!({ "name": name, "color": "ededed" })).collect::<Vec<_>>(),
        "user": { "id": 1, "login": "alice" },
        "assignees": [{ "id": 2, "login": "bob" }],
        "created_at": "2024-01-01T10:00:00Z",
        "updated_at": "2024-01-02T10:00:00Z",
        "html_url": format!("https://github.com/org/repo/issues/{}", number),
    })
}

pub fn github_pull(number: u64, state: &str, merged: bool) -> Value {
    json!({
        "number": number,
        "title": "Fix crash",
        "body": null,
        "state": state,
        "merged": merged,
        "merged_at": if merged { json!("2024-01-03T10:00:00Z") } else { Value::Null },
        "labels": [{ "name": "bug" }],
        "user": { "id": 1, "login": "alice" },
        "head": { "ref": "fix-crash" },
        "base": { "ref": "main" },
        "created_at": "2024-01-01T10:00:00Z",
        "updated_at": "2024-01-02T10:00:00Z",
        "html_url": format!("https://github.com/org/repo/pull/{}", number),
    })
}

pub fn github_comment(id: u64, body: &str) -> Value {
    json!({
        "id": id,
        "body": body,
        "user": { "id": 2, "login": "bob" },
        "created_at": "2024-01-01T11:00:00Z",
        "updated_at": "2024-01-01T11:00:00Z",
    })
}

pub fn gitlab_issue(iid: u64, labels: &[&str]) -> Value {
    json!({
        "id": 9000 + iid,
        "iid": iid,
        "title": "Crash on startup",
        "description": "It crashes.",
        "state": "opened",
        "labels": labels,
        "author": { "id": 1, "username": "alice" },
        "assignees": [],
        "created_at": "2024-01-01T10:00:00.000Z",
        "updated_at": "2024-01-02T10:00:00.000Z",
        "web_url": format!("https://gitlab.com/org/repo/-/issues/{}", iid),
    })
}

pub fn gitlab_merge_request(iid: u64, state: &str) -> Value {
    json!({
        "id": 7000 + iid,
        "iid": iid,
        "title": "Fix crash",
        "description": null,
        "state": state,
        "labels": ["bug"],
        "author": { "id": 1, "username": "alice" },
        "source_branch": "fix-crash",
        "target_branch": "main",
        "created_at": "2024-01-01T10:00:00.000Z",
        "updated_at": "2024-01-02T10:00:00.000Z",
        "web_url": format!("https://gitlab.com/org/repo/-/merge_requests/{}", iid),
    })
}

pub fn gitlab_note(id: u64, body: &str) -> Value {
    json!({
        "id": id,
        "body": body,
        "author": { "id": 2, "username": "bob" },
        "created_at": "2024-01-01T11:00:00.000Z",
        "updated_at": "2024-01-01T11:00:00.000Z",
    })
}

pub const COMMIT_SHA: &str = "6dcb09b5b57875f334f61aebed695e2e4193db5e";

pub fn github_status(state: &str, context: &str, description: &str) -> Value {
    json!({
        "id": 1,
        "state": state,
        "context": context,
        "description": description,
        "target_url": null,
        "created_at": "2024-01-01T12:00:00Z",
        "updated_at": "2024-01-01T12:00:00Z",
    })
}

pub fn gitlab_status(status: &str, name: &str) -> Value {
    json!({
        "id": 93,
        "sha": COMMIT_SHA,
        "ref": "main",
        "status": status,
        "name": name,
        "description": null,
        "target_url": "https://gitlab.com/org/repo/-/jobs/93",
        "created_at": "2024-01-01T12:00:00.000Z",
    })
}
