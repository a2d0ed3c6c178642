//! Hoster identity and capabilities
//!
//! Capabilities are fixed per hoster kind. The label strategy is the one knob
//! callers may override, per client.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported hosting platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HosterKind {
    GitHub,
    GitLab,
}

impl HosterKind {
    /// Lowercase name used in logs and config files
    pub fn name(&self) -> &'static str {
        match self {
            Self::GitHub => "github",
            Self::GitLab => "gitlab",
        }
    }

    /// Public API root
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::GitHub => "https://api.github.com",
            Self::GitLab => "https://gitlab.com/api/v4",
        }
    }

    /// Capabilities of this hoster's REST API
    pub fn capabilities(&self) -> HosterCapabilities {
        match self {
            Self::GitHub => HosterCapabilities {
                label_strategy: LabelStrategy::Replace,
                labels_may_contain_comma: true,
                max_per_page: 100,
            },
            Self::GitLab => HosterCapabilities {
                label_strategy: LabelStrategy::Replace,
                // labels travel comma-joined in a single form field
                labels_may_contain_comma: false,
                max_per_page: 100,
            },
        }
    }
}

impl fmt::Display for HosterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a label set assignment reaches the hoster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelStrategy {
    /// One request replacing the whole set
    #[default]
    Replace,
    /// One request per added or removed label
    Delta,
}

/// What a hoster's API can do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HosterCapabilities {
    /// Default strategy for label assignment
    pub label_strategy: LabelStrategy,

    /// Whether a label caption may contain `,`
    pub labels_may_contain_comma: bool,

    /// Largest page size the list endpoints accept
    pub max_per_page: u32,
}
