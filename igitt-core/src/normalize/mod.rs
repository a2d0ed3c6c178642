//! Result normalizer
//!
//! Converts raw provider payloads into the common attribute model through
//! fixed mapping tables (common field name -> provider JSON pointer). A
//! required field that is absent, or has the wrong type, is a
//! `MalformedResponse`; it is never replaced by a default, so provider API
//! changes surface immediately instead of as empty strings.

pub mod github;
pub mod gitlab;

use crate::entity::{CommitStatus, LabelSet, User};
use crate::error::{ErrorContext, HosterError, HosterResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

/// Whether and how a field must appear in a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Must be present and non-null
    Required,
    /// Must be present, `null` means "no value" (e.g. an empty issue body)
    Nullable,
    /// May be absent entirely (older API versions, list endpoints)
    Optional,
}

/// One row of a mapping table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    /// Field name in the common model
    pub common: &'static str,
    /// JSON pointer into the provider payload
    pub pointer: &'static str,
    pub presence: Presence,
}

impl FieldRule {
    pub const fn required(common: &'static str, pointer: &'static str) -> Self {
        Self {
            common,
            pointer,
            presence: Presence::Required,
        }
    }

    pub const fn nullable(common: &'static str, pointer: &'static str) -> Self {
        Self {
            common,
            pointer,
            presence: Presence::Nullable,
        }
    }

    pub const fn optional(common: &'static str, pointer: &'static str) -> Self {
        Self {
            common,
            pointer,
            presence: Presence::Optional,
        }
    }
}

/// A mapping table for one entity of one hoster
#[derive(Debug, Clone, Copy)]
pub struct FieldMapping {
    pub entity: &'static str,
    pub rules: &'static [FieldRule],
}

impl FieldMapping {
    /// Look up the provider pointer for a common field
    pub fn pointer(&self, common: &str) -> Option<&'static str> {
        self.rules.iter().find(|r| r.common == common).map(|r| r.pointer)
    }

    /// Extract every mapped field from `raw`, enforcing presence rules
    pub fn apply<'a>(&self, raw: &'a Value, context: &ErrorContext) -> HosterResult<Normalized<'a>> {
        if !raw.is_object() {
            return Err(HosterError::malformed(context, self.entity));
        }

        let mut values = BTreeMap::new();
        for rule in self.rules {
            match (raw.pointer(rule.pointer), rule.presence) {
                (None, Presence::Optional) => {}
                (None, _) | (Some(Value::Null), Presence::Required) => {
                    return Err(HosterError::malformed(context, rule.common));
                }
                (Some(Value::Null), _) => {}
                (Some(value), _) => {
                    values.insert(rule.common, value);
                }
            }
        }

        Ok(Normalized {
            context: context.clone(),
            values,
        })
    }
}

/// Fields extracted by a [`FieldMapping`], keyed by common name
///
/// Absent and `null` fields are simply missing; typed accessors decide
/// whether that is acceptable.
#[derive(Debug)]
pub struct Normalized<'a> {
    context: ErrorContext,
    values: BTreeMap<&'static str, &'a Value>,
}

impl<'a> Normalized<'a> {
    fn malformed(&self, field: &str) -> HosterError {
        HosterError::malformed(&self.context, field)
    }

    pub fn context(&self) -> &ErrorContext {
        &self.context
    }

    /// Raw value of a field
    pub fn value(&self, field: &str) -> Option<&'a Value> {
        self.values.get(field).copied()
    }

    pub fn string(&self, field: &str) -> HosterResult<String> {
        self.opt_string(field)?.ok_or_else(|| self.malformed(field))
    }

    /// Absent or null is `None`; a non-string value is malformed
    pub fn opt_string(&self, field: &str) -> HosterResult<Option<String>> {
        match self.value(field) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(self.malformed(field)),
        }
    }

    pub fn u64(&self, field: &str) -> HosterResult<u64> {
        self.value(field)
            .and_then(Value::as_u64)
            .ok_or_else(|| self.malformed(field))
    }

    pub fn opt_bool(&self, field: &str) -> HosterResult<Option<bool>> {
        match self.value(field) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(self.malformed(field)),
        }
    }

    /// RFC 3339 timestamp, as both GitHub and GitLab send them
    pub fn timestamp(&self, field: &str) -> HosterResult<DateTime<Utc>> {
        let raw = self.string(field)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|_| self.malformed(field))
    }

    /// Calendar date, either `YYYY-MM-DD` (GitLab) or an RFC 3339 timestamp (GitHub)
    pub fn opt_date(&self, field: &str) -> HosterResult<Option<NaiveDate>> {
        let Some(raw) = self.opt_string(field)? else {
            return Ok(None);
        };

        NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .or_else(|_| DateTime::parse_from_rfc3339(&raw).map(|t| t.with_timezone(&Utc).date_naive()))
            .map(Some)
            .map_err(|_| self.malformed(field))
    }

    /// Array field; absent or null is empty
    pub fn array(&self, field: &str) -> HosterResult<&'a [Value]> {
        match self.value(field) {
            None => Ok(&[]),
            Some(Value::Array(items)) => Ok(items.as_slice()),
            Some(_) => Err(self.malformed(field)),
        }
    }

    /// Array of strings, e.g. GitLab parent ids
    pub fn strings(&self, field: &str) -> HosterResult<Vec<String>> {
        self.array(field)?
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| self.malformed(field))
            })
            .collect()
    }

    /// Label captions from an array of strings (GitLab)
    pub fn label_strings(&self, field: &str) -> HosterResult<LabelSet> {
        self.array(field)?
            .iter()
            .map(|label| {
                label
                    .as_str()
                    .map(str::to_string)
                    .ok_or_else(|| self.malformed(field))
            })
            .collect()
    }

    /// Label captions from an array of `{ "name": ... }` objects (GitHub)
    pub fn label_objects(&self, field: &str) -> HosterResult<LabelSet> {
        label_names(self.array(field)?, &self.context, field)
    }

    /// A user object, read through `id_key` and `name_key`
    pub fn user(&self, id_field: &str, name_field: &str) -> HosterResult<User> {
        Ok(User {
            id: self.u64(id_field)?,
            username: self.string(name_field)?,
        })
    }

    /// Users from an array of objects
    pub fn users(&self, field: &str, name_key: &str) -> HosterResult<Vec<User>> {
        self.array(field)?
            .iter()
            .map(|user| {
                let id = user.get("id").and_then(Value::as_u64);
                let username = user.get(name_key).and_then(Value::as_str);
                match (id, username) {
                    (Some(id), Some(username)) => Ok(User {
                        id,
                        username: username.to_string(),
                    }),
                    _ => Err(self.malformed(field)),
                }
            })
            .collect()
    }
}

/// Label captions from a list of label objects, e.g. a labels endpoint response
pub fn label_names(items: &[Value], context: &ErrorContext, field: &str) -> HosterResult<LabelSet> {
    items
        .iter()
        .map(|label| {
            label
                .get("name")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| HosterError::malformed(context, field))
        })
        .collect()
}

/// Keep the first status seen for each context
///
/// Both hosters list statuses newest first and keep older entries of a
/// context around, so the first one is the current one.
pub fn current_statuses(statuses: Vec<CommitStatus>) -> Vec<CommitStatus> {
    let mut seen = HashSet::new();
    statuses
        .into_iter()
        .filter(|status| seen.insert(status.context.clone()))
        .collect()
}

/// Expect an array payload, e.g. from a list endpoint
pub fn expect_array<'a>(raw: &'a Value, context: &ErrorContext, entity: &str) -> HosterResult<&'a [Value]> {
    raw.as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| HosterError::malformed(context, entity))
}
