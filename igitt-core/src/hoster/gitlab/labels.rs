//! Label assignment on GitLab issues and merge requests
//!
//! GitLab takes labels as one comma-separated string, so a caption
//! containing `,` cannot be expressed and is rejected before sending.

use super::Noteable;
use crate::auth::GitLabToken;
use crate::entity::{LabelSet, RepositoryRef};
use crate::error::{ErrorContext, HosterError, HosterResult};
use crate::hoster::HosterClient;
use crate::http::ApiRequest;
use crate::labels::{apply_delta, LabelChange, LabelWriter};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

/// One `add_labels` / `remove_labels` update per label
struct NoteableLabelWriter<'a> {
    client: &'a HosterClient,
    token: &'a GitLabToken,
    repository: &'a RepositoryRef,
    kind: Noteable,
    iid: u64,
}

#[async_trait]
impl LabelWriter for NoteableLabelWriter<'_> {
    async fn apply(&self, change: &LabelChange) -> HosterResult<()> {
        let (operation, body) = match change {
            LabelChange::Add(label) => ("add_label", json!({ "add_labels": label })),
            LabelChange::Remove(label) => ("remove_label", json!({ "remove_labels": label })),
        };

        let request = ApiRequest::put(operation, self.kind.path(self.repository, self.iid, &[]), body);
        self.client.send(self.token, &request).await.map(|_| ())
    }
}

/// Reject captions GitLab's comma-joined label field cannot carry
pub(super) fn check_labels(context: &ErrorContext, labels: &LabelSet) -> HosterResult<()> {
    match labels.iter().find(|label| label.contains(',')) {
        Some(label) => Err(HosterError::InvalidRequest {
            context: context.clone(),
            status: 0,
            message: format!("GitLab labels cannot contain ',': '{}'", label),
        }),
        None => Ok(()),
    }
}

/// Replace all labels in a single update; returns the raw updated object
pub(super) async fn replace(
    client: &HosterClient,
    token: &GitLabToken,
    repository: &RepositoryRef,
    kind: Noteable,
    iid: u64,
    desired: &LabelSet,
) -> HosterResult<(Value, ErrorContext)> {
    let request = ApiRequest::put(
        "set_labels",
        kind.path(repository, iid, &[]),
        json!({ "labels": desired.join(",") }),
    );
    let context = request.context();
    check_labels(&context, desired)?;

    info!("Replacing labels with [{}] [{}]", desired.join(", "), context);
    let raw = client.call(token, &request).await?;
    Ok((raw, context))
}

/// Move `current` (the remote labels) to `desired` one label at a time
pub(super) async fn apply(
    client: &HosterClient,
    token: &GitLabToken,
    repository: &RepositoryRef,
    kind: Noteable,
    iid: u64,
    current: &mut LabelSet,
    desired: &LabelSet,
) -> HosterResult<()> {
    let context = ErrorContext::new(kind.path(repository, iid, &[]).join("/"), "set_labels");
    check_labels(&context, desired)?;

    let writer = NoteableLabelWriter {
        client,
        token,
        repository,
        kind,
        iid,
    };
    apply_delta(&writer, &context, current, desired).await
}
