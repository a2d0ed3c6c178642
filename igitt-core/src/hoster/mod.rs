//! Provider entity implementations
//!
//! One backend per hoster. Each implements the entity traits from
//! [`crate::entity`] over a shared [`HosterClient`] and a shared credential.

mod adapter;
mod client;
pub mod github;
pub mod gitlab;

pub use adapter::{HosterCapabilities, HosterKind, LabelStrategy};
pub use client::HosterClient;

/// Whether `sha` is a complete object id rather than an abbreviation
pub(crate) fn is_full_sha(sha: &str) -> bool {
    matches!(sha.len(), 40 | 64) && sha.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_full_sha() {
        assert!(is_full_sha("6dcb09b5b57875f334f61aebed695e2e4193db5e"));
        assert!(!is_full_sha("6dcb09b"));
        assert!(!is_full_sha("master"));
        assert!(!is_full_sha("zzcb09b5b57875f334f61aebed695e2e4193db5e"));
    }
}
