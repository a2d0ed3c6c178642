//! Label assignment on GitHub issues and pull requests

use super::issue_path;
use crate::auth::GitHubToken;
use crate::entity::{LabelSet, RepositoryRef};
use crate::error::{ErrorContext, HosterResult};
use crate::hoster::HosterClient;
use crate::http::ApiRequest;
use crate::labels::{apply_delta, LabelChange, LabelWriter};
use crate::normalize::{expect_array, label_names};
use async_trait::async_trait;
use serde_json::json;
use tracing::info;

/// One request per label on `repos/{o}/{r}/issues/{n}/labels`
struct IssueLabelWriter<'a> {
    client: &'a HosterClient,
    token: &'a GitHubToken,
    repository: &'a RepositoryRef,
    number: u64,
}

#[async_trait]
impl LabelWriter for IssueLabelWriter<'_> {
    async fn apply(&self, change: &LabelChange) -> HosterResult<()> {
        let request = match change {
            LabelChange::Add(label) => ApiRequest::post(
                "add_label",
                issue_path(self.repository, self.number, &["labels"]),
                json!({ "labels": [label] }),
            ),
            LabelChange::Remove(label) => ApiRequest::delete(
                "remove_label",
                issue_path(self.repository, self.number, &["labels", label.as_str()]),
            ),
        };

        self.client.send(self.token, &request).await.map(|_| ())
    }

    // GitHub resolves `Bug` and `bug` to the same label
    fn case_sensitive(&self) -> bool {
        false
    }
}

/// Replace the labels of issue `number` in a single request
///
/// Returns the label set the hoster reports afterwards.
pub(super) async fn replace(
    client: &HosterClient,
    token: &GitHubToken,
    repository: &RepositoryRef,
    number: u64,
    desired: &LabelSet,
) -> HosterResult<LabelSet> {
    let request = ApiRequest::put(
        "set_labels",
        issue_path(repository, number, &["labels"]),
        json!({ "labels": desired.to_vec() }),
    );
    let context = request.context();
    info!("Replacing labels with [{}] [{}]", desired.join(", "), context);

    let body = client.call(token, &request).await?;
    label_names(expect_array(&body, &context, "labels")?, &context, "labels")
}

/// Move `current` (the remote labels) to `desired` one label at a time
pub(super) async fn apply(
    client: &HosterClient,
    token: &GitHubToken,
    repository: &RepositoryRef,
    number: u64,
    current: &mut LabelSet,
    desired: &LabelSet,
) -> HosterResult<()> {
    let context = ErrorContext::new(issue_path(repository, number, &["labels"]).join("/"), "set_labels");
    let writer = IssueLabelWriter {
        client,
        token,
        repository,
        number,
    };
    apply_delta(&writer, &context, current, desired).await
}
