//! Label replacement planning
//!
//! Assigning a label set always means "replace the remote set". Hosters that
//! expose an atomic replace endpoint get one request. Otherwise the change is
//! planned as a [`LabelDelta`] and applied one label at a time through a
//! [`LabelWriter`]; when that sequence breaks part way through the caller gets
//! a `PartialUpdate` error listing exactly what was committed.

use crate::entity::LabelSet;
use crate::error::{ErrorContext, HosterError, HosterResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, warn};

/// A single label addition or removal
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "op", content = "label", rename_all = "lowercase")]
pub enum LabelChange {
    Add(String),
    Remove(String),
}

impl LabelChange {
    /// The label this change touches
    pub fn label(&self) -> &str {
        match self {
            Self::Add(label) | Self::Remove(label) => label,
        }
    }

    /// Apply the change to a local label set
    pub fn apply_to(&self, labels: &mut LabelSet) {
        match self {
            Self::Add(label) => {
                labels.insert(label.clone());
            }
            Self::Remove(label) => {
                labels.remove(label);
            }
        }
    }
}

impl fmt::Display for LabelChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add(label) => write!(f, "+{}", label),
            Self::Remove(label) => write!(f, "-{}", label),
        }
    }
}

/// Difference between the current and the desired label set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelDelta {
    pub add: BTreeSet<String>,
    pub remove: BTreeSet<String>,
}

impl LabelDelta {
    /// Compute the minimal set of changes turning `current` into `desired`
    pub fn between(current: &LabelSet, desired: &LabelSet) -> Self {
        Self {
            add: desired.difference(current).cloned().collect(),
            remove: current.difference(desired).cloned().collect(),
        }
    }

    /// Like [`LabelDelta::between`] for hosters whose label names ignore ASCII case
    ///
    /// A desired label matching a current one up to case is kept under the
    /// hoster's spelling, so `{bug}` to `{Bug}` plans no changes. Desired
    /// labels differing only in case are added once.
    pub fn between_ignore_case(current: &LabelSet, desired: &LabelSet) -> Self {
        let current_keys: BTreeSet<String> = current.iter().map(|l| l.to_ascii_lowercase()).collect();
        let desired_keys: BTreeSet<String> = desired.iter().map(|l| l.to_ascii_lowercase()).collect();

        let mut seen = BTreeSet::new();
        let add = desired
            .iter()
            .filter(|label| {
                let key = label.to_ascii_lowercase();
                !current_keys.contains(&key) && seen.insert(key)
            })
            .cloned()
            .collect();
        let remove = current
            .iter()
            .filter(|label| !desired_keys.contains(&label.to_ascii_lowercase()))
            .cloned()
            .collect();

        Self { add, remove }
    }

    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }

    pub fn len(&self) -> usize {
        self.add.len() + self.remove.len()
    }

    /// Ordered list of changes: additions first, then removals, each sorted
    pub fn changes(&self) -> Vec<LabelChange> {
        self.add
            .iter()
            .cloned()
            .map(LabelChange::Add)
            .chain(self.remove.iter().cloned().map(LabelChange::Remove))
            .collect()
    }
}

/// Issues one request per label change
#[async_trait]
pub trait LabelWriter: Send + Sync {
    async fn apply(&self, change: &LabelChange) -> HosterResult<()>;

    /// Whether the hoster tells labels apart by case
    fn case_sensitive(&self) -> bool {
        true
    }
}

/// Apply `changes` in order, stopping at the first failure
///
/// Returns the applied changes on success. A failure on the very first change
/// is returned unchanged since nothing was committed; a later failure becomes
/// [`HosterError::PartialUpdate`].
pub async fn apply_changes(
    writer: &dyn LabelWriter,
    context: &ErrorContext,
    changes: Vec<LabelChange>,
) -> HosterResult<Vec<LabelChange>> {
    debug!("Applying {} label changes [{}]", changes.len(), context);

    for (index, change) in changes.iter().enumerate() {
        if let Err(err) = writer.apply(change).await {
            if index == 0 {
                return Err(err);
            }

            warn!(
                "Label update stopped after {} of {} changes [{}]: {}",
                index,
                changes.len(),
                context,
                err
            );

            let mut rest = changes[index..].to_vec();
            let failed = rest.remove(0);
            return Err(HosterError::PartialUpdate {
                context: context.clone(),
                applied: changes[..index].to_vec(),
                failed,
                not_applied: rest,
                source: Box::new(err),
            });
        }
    }

    Ok(changes)
}

/// Turn `current` into `desired` one change at a time
///
/// `current` is updated to mirror the remote state: on success it equals
/// `desired`, on a partial failure it holds exactly the applied changes.
pub async fn apply_delta(
    writer: &dyn LabelWriter,
    context: &ErrorContext,
    current: &mut LabelSet,
    desired: &LabelSet,
) -> HosterResult<()> {
    let delta = if writer.case_sensitive() {
        LabelDelta::between(current, desired)
    } else {
        LabelDelta::between_ignore_case(current, desired)
    };
    if delta.is_empty() {
        debug!("Labels already up to date [{}]", context);
        return Ok(());
    }

    match apply_changes(writer, context, delta.changes()).await {
        Ok(applied) => {
            applied.iter().for_each(|change| change.apply_to(current));
            Ok(())
        }
        Err(err) => {
            if let HosterError::PartialUpdate { applied, .. } = &err {
                applied.iter().for_each(|change| change.apply_to(current));
            }
            Err(err)
        }
    }
}
