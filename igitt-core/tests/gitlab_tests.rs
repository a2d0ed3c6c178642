//! GitLab backend against a mock API

mod common;

use common::*;
use igitt::hoster::gitlab::{GitLabComment, GitLabCommit, GitLabIssue, GitLabMergeRequest, GitLabRepository};
use igitt::labels::LabelChange;
use igitt::{
    Comment, Commit, CommitState, CommitStatus, HosterError, Issue, IssueState, LabelSet, LabelStrategy,
    MergeRequest, MergeRequestState, MilestoneState, Repository,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_nested_project_path_is_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/group%2Fsub%2Frepo/issues/3"))
        .and(header("PRIVATE-TOKEN", GITLAB_SECRET))
        .respond_with(ResponseTemplate::new(200).set_body_json(gitlab_issue(3, &["bug"])))
        .expect(1)
        .mount(&server)
        .await;

    let mut issue = GitLabIssue::new(gitlab_client(&server), gitlab_token(), "group/sub/repo", 3).unwrap();
    assert_eq!(issue.number(), 3);
    assert_eq!(issue.labels().await.unwrap(), LabelSet::from(["bug"]));
    assert_eq!(issue.state().await.unwrap(), IssueState::Open);
}

#[tokio::test]
async fn test_replace_labels_single_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/123/issues/10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gitlab_issue(10, &["bug", "core"])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v4/projects/123/issues/10"))
        .and(body_json(json!({ "labels": "core" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(gitlab_issue(10, &["core"])))
        .expect(1)
        .mount(&server)
        .await;

    let mut issue = GitLabIssue::new(gitlab_client(&server), gitlab_token(), "123", 10).unwrap();
    assert_eq!(issue.labels().await.unwrap(), LabelSet::from(["bug", "core"]));

    issue.set_labels(&LabelSet::from(["core"])).await.unwrap();
    assert_eq!(issue.labels().await.unwrap(), LabelSet::from(["core"]));
}

#[tokio::test]
async fn test_delta_labels_removes_only_difference() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/123/issues/10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gitlab_issue(10, &["bug", "core"])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v4/projects/123/issues/10"))
        .and(body_json(json!({ "remove_labels": "bug" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(gitlab_issue(10, &["core"])))
        .expect(1)
        .mount(&server)
        .await;

    let client = gitlab_client(&server).with_label_strategy(LabelStrategy::Delta);
    let mut issue = GitLabIssue::new(client, gitlab_token(), "123", 10).unwrap();

    issue.set_labels(&LabelSet::from(["core"])).await.unwrap();
    assert_eq!(issue.labels().await.unwrap(), LabelSet::from(["core"]));
}

#[tokio::test]
async fn test_delta_first_change_failure_is_plain_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/123/issues/10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gitlab_issue(10, &["bug"])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v4/projects/123/issues/10"))
        .and(body_json(json!({ "add_labels": "core" })))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({ "message": "403 Forbidden" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v4/projects/123/issues/10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gitlab_issue(10, &[])))
        .expect(0)
        .mount(&server)
        .await;

    let client = gitlab_client(&server).with_label_strategy(LabelStrategy::Delta);
    let mut issue = GitLabIssue::new(client, gitlab_token(), "123", 10).unwrap();

    // +core then -bug; the very first write is refused
    let err = issue.set_labels(&LabelSet::from(["core"])).await.unwrap_err();
    assert!(err.is_permission(), "got {:?}", err);
    assert!(!matches!(err, HosterError::PartialUpdate { .. }));
    assert_eq!(err.context().unwrap().operation, "add_label");
    assert_eq!(issue.labels().await.unwrap(), LabelSet::from(["bug"]));
}

#[tokio::test]
async fn test_replace_forbidden_leaves_cache_unchanged() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/123/issues/10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gitlab_issue(10, &["bug", "core"])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v4/projects/123/issues/10"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({ "message": "403 Forbidden" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut issue = GitLabIssue::new(gitlab_client(&server), gitlab_token(), "123", 10).unwrap();
    issue.data().await.unwrap();

    let err = issue.set_labels(&LabelSet::from(["core"])).await.unwrap_err();
    assert!(err.is_permission(), "got {:?}", err);
    assert_eq!(err.context().unwrap().operation, "set_labels");
    assert_eq!(issue.labels().await.unwrap(), LabelSet::from(["bug", "core"]));
}

#[tokio::test]
async fn test_replace_labels_twice_is_stable() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/v4/projects/123/issues/10"))
        .and(body_json(json!({ "labels": "core,ui" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(gitlab_issue(10, &["core", "ui"])))
        .expect(2)
        .mount(&server)
        .await;

    let mut issue = GitLabIssue::new(gitlab_client(&server), gitlab_token(), "123", 10).unwrap();
    let desired = LabelSet::from(["core", "ui"]);

    issue.set_labels(&desired).await.unwrap();
    assert_eq!(issue.labels().await.unwrap(), desired);
    issue.set_labels(&desired).await.unwrap();
    assert_eq!(issue.labels().await.unwrap(), desired);
}

#[tokio::test]
async fn test_delta_labels_twice_writes_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/123/issues/10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gitlab_issue(10, &["bug", "core"])))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/123/issues/10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gitlab_issue(10, &["core"])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v4/projects/123/issues/10"))
        .and(body_json(json!({ "remove_labels": "bug" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(gitlab_issue(10, &["core"])))
        .expect(1)
        .mount(&server)
        .await;

    let client = gitlab_client(&server).with_label_strategy(LabelStrategy::Delta);
    let mut issue = GitLabIssue::new(client, gitlab_token(), "123", 10).unwrap();
    let desired = LabelSet::from(["core"]);

    issue.set_labels(&desired).await.unwrap();
    assert_eq!(issue.labels().await.unwrap(), desired);
    issue.set_labels(&desired).await.unwrap();
    assert_eq!(issue.labels().await.unwrap(), desired);
}

#[tokio::test]
async fn test_delta_partial_failure_after_adds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/123/issues/10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gitlab_issue(10, &["old"])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v4/projects/123/issues/10"))
        .and(body_json(json!({ "add_labels": "new" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(gitlab_issue(10, &["new", "old"])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v4/projects/123/issues/10"))
        .and(body_json(json!({ "remove_labels": "old" })))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
        .expect(1)
        .mount(&server)
        .await;

    let client = gitlab_client(&server).with_label_strategy(LabelStrategy::Delta);
    let mut issue = GitLabIssue::new(client, gitlab_token(), "123", 10).unwrap();

    let err = issue.set_labels(&LabelSet::from(["new"])).await.unwrap_err();
    match &err {
        HosterError::PartialUpdate {
            applied,
            failed,
            not_applied,
            source,
            ..
        } => {
            assert_eq!(applied, &vec![LabelChange::Add("new".into())]);
            assert_eq!(failed, &LabelChange::Remove("old".into()));
            assert!(not_applied.is_empty());
            assert_eq!(source.retry_after(), Some(std::time::Duration::from_secs(30)));
        }
        other => panic!("expected PartialUpdate, got {:?}", other),
    }
    assert_eq!(issue.labels().await.unwrap(), LabelSet::from(["new", "old"]));
}

#[tokio::test]
async fn test_comma_label_rejected_before_sending() {
    let server = MockServer::start().await;

    let mut issue = GitLabIssue::new(gitlab_client(&server), gitlab_token(), "123", 10).unwrap();
    let err = issue.set_labels(&LabelSet::from(["a,b"])).await.unwrap_err();

    assert!(matches!(err, HosterError::InvalidRequest { status: 0, .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_close_uses_state_event() {
    let server = MockServer::start().await;
    let mut closed = gitlab_issue(10, &[]);
    closed["state"] = json!("closed");

    Mock::given(method("PUT"))
        .and(path("/api/v4/projects/123/issues/10"))
        .and(body_json(json!({ "state_event": "close" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(closed))
        .expect(1)
        .mount(&server)
        .await;

    let mut issue = GitLabIssue::new(gitlab_client(&server), gitlab_token(), "123", 10).unwrap();
    issue.close().await.unwrap();
    assert_eq!(issue.state().await.unwrap(), IssueState::Closed);
}

#[tokio::test]
async fn test_set_body_sends_description() {
    let server = MockServer::start().await;
    let mut updated = gitlab_issue(10, &[]);
    updated["description"] = json!("Details");

    Mock::given(method("PUT"))
        .and(path("/api/v4/projects/123/issues/10"))
        .and(body_json(json!({ "description": "Details" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(updated))
        .expect(1)
        .mount(&server)
        .await;

    let mut issue = GitLabIssue::new(gitlab_client(&server), gitlab_token(), "123", 10).unwrap();
    issue.set_body("Details").await.unwrap();
    assert_eq!(issue.body().await.unwrap(), "Details");
}

#[tokio::test]
async fn test_notes_listed_oldest_first() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/123/issues/10/notes"))
        .and(query_param("sort", "asc"))
        .and(query_param("order_by", "created_at"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([gitlab_note(1, "first"), gitlab_note(2, "second")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut issue = GitLabIssue::new(gitlab_client(&server), gitlab_token(), "123", 10).unwrap();
    let notes = issue.comments().await.unwrap();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].id, 1);
    assert_eq!(notes[1].author.username, "bob");
}

#[tokio::test]
async fn test_note_edit_and_delete() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/v4/projects/123/merge_requests/5/notes/8"))
        .and(body_json(json!({ "body": "edited" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(gitlab_note(8, "edited")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v4/projects/123/merge_requests/5/notes/8"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut note = GitLabComment::on_merge_request(gitlab_client(&server), gitlab_token(), "123", 5, 8).unwrap();
    note.set_body("edited").await.unwrap();
    assert_eq!(note.body().await.unwrap(), "edited");
    note.delete().await.unwrap();
}

#[tokio::test]
async fn test_merge_request_merge() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/v4/projects/123/merge_requests/5/merge"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200).set_body_json(gitlab_merge_request(5, "merged")))
        .expect(1)
        .mount(&server)
        .await;

    let mut mr = GitLabMergeRequest::new(gitlab_client(&server), gitlab_token(), "123", 5).unwrap();
    mr.merge(None).await.unwrap();
    assert_eq!(mr.state().await.unwrap(), MergeRequestState::Merged);
    assert_eq!(mr.target_branch().await.unwrap(), "main");
}

#[tokio::test]
async fn test_merge_conflict_is_invalid_request() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/v4/projects/123/merge_requests/5/merge"))
        .respond_with(ResponseTemplate::new(405).set_body_json(json!({ "message": "Method Not Allowed" })))
        .mount(&server)
        .await;

    let mut mr = GitLabMergeRequest::new(gitlab_client(&server), gitlab_token(), "123", 5).unwrap();
    let err = mr.merge(Some("msg")).await.unwrap_err();
    assert!(matches!(err, HosterError::InvalidRequest { status: 405, .. }));
}

#[tokio::test]
async fn test_repository_issue_listing_and_state_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/org%2Frepo/issues"))
        .and(query_param("state", "opened"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([gitlab_issue(1, &[]), gitlab_issue(2, &["x"])])))
        .expect(1)
        .mount(&server)
        .await;

    let mut repo = GitLabRepository::new(gitlab_client(&server), gitlab_token(), "org/repo").unwrap();
    let issues = repo.issues(Some(IssueState::Open)).await.unwrap();
    let numbers: Vec<_> = issues.iter().map(|i| i.number()).collect();
    assert_eq!(numbers, vec![1, 2]);
}

#[tokio::test]
async fn test_repository_data_and_labels() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 123,
            "path_with_namespace": "org/repo",
            "web_url": "https://gitlab.com/org/repo",
            "default_branch": "main",
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/123/labels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "name": "bug" }, { "name": "ui" }])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v4/projects/123/labels"))
        .and(body_json(json!({ "name": "urgent", "color": "#ff0000" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "name": "urgent" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut repo = GitLabRepository::new(gitlab_client(&server), gitlab_token(), "123").unwrap();
    assert_eq!(repo.full_name().await.unwrap(), "org/repo");
    assert_eq!(repo.labels().await.unwrap(), LabelSet::from(["bug", "ui"]));
    repo.create_label("urgent", "ff0000").await.unwrap();
}

#[tokio::test]
async fn test_missing_project_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/org%2Fmissing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "404 Project Not Found" })))
        .mount(&server)
        .await;

    let mut repo = GitLabRepository::new(gitlab_client(&server), gitlab_token(), "org/missing").unwrap();
    assert!(repo.data().await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_commit_statuses_resolve_short_sha() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/123/repository/commits/6dcb09b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": COMMIT_SHA,
            "short_id": "6dcb09b5",
            "message": "Fix crash",
            "parent_ids": [],
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/api/v4/projects/123/repository/commits/{}/statuses", COMMIT_SHA)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            gitlab_status("running", "build"),
            gitlab_status("success", "lint"),
            gitlab_status("failed", "build"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let repo = GitLabRepository::new(gitlab_client(&server), gitlab_token(), "123").unwrap();
    let mut commit = repo.commit("6dcb09b");

    let statuses = commit.statuses().await.unwrap();
    let states: Vec<_> = statuses.iter().map(|s| (s.context.as_str(), s.state)).collect();
    assert_eq!(states, vec![("build", CommitState::Pending), ("lint", CommitState::Success)]);
    assert_eq!(statuses[0].url.as_deref(), Some("https://gitlab.com/org/repo/-/jobs/93"));
    assert_eq!(commit.parent_sha().await.unwrap(), None);
}

#[tokio::test]
async fn test_set_status_uses_name_and_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/api/v4/projects/123/statuses/{}", COMMIT_SHA)))
        .and(body_json(json!({
            "state": "failed",
            "name": "ci/deploy",
            "description": "Deploy could not start",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(gitlab_status("failed", "ci/deploy")))
        .expect(1)
        .mount(&server)
        .await;

    let mut commit = GitLabCommit::new(gitlab_client(&server), gitlab_token(), "123", COMMIT_SHA).unwrap();
    let status = CommitStatus::new(CommitState::Error, "ci/deploy").with_description("Deploy could not start");
    commit.set_status(&status).await.unwrap();
}

#[tokio::test]
async fn test_pending_adds_review_status_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/api/v4/projects/123/repository/commits/{}/statuses", COMMIT_SHA)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([gitlab_status("success", "build")])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/api/v4/projects/123/statuses/{}", COMMIT_SHA)))
        .and(body_json(json!({
            "state": "pending",
            "name": "review/gitmate/manual",
            "description": "This commit needs review.",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(gitlab_status("pending", "review/gitmate/manual")))
        .expect(1)
        .mount(&server)
        .await;

    let mut commit = GitLabCommit::new(gitlab_client(&server), gitlab_token(), "123", COMMIT_SHA).unwrap();
    commit.pending().await.unwrap();
}

#[tokio::test]
async fn test_merge_request_milestone() {
    let server = MockServer::start().await;
    let mut raw = gitlab_merge_request(3, "opened");
    raw["milestone"] = json!({
        "id": 12,
        "iid": 2,
        "project_id": 123,
        "title": "Sprint 2",
        "state": "active",
        "due_date": "2024-03-15",
    });
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/123/merge_requests/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(raw))
        .expect(1)
        .mount(&server)
        .await;

    let mut mr = GitLabMergeRequest::new(gitlab_client(&server), gitlab_token(), "123", 3).unwrap();
    let milestone = mr.milestone().await.unwrap().unwrap();
    assert_eq!(milestone.id, 12);
    assert_eq!(milestone.number, 2);
    assert_eq!(milestone.title, "Sprint 2");
    assert_eq!(milestone.state, MilestoneState::Open);
    assert_eq!(milestone.due_date.map(|d| d.to_string()).as_deref(), Some("2024-03-15"));
}
