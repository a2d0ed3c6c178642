//! Per-resource write serialization
//!
//! Two handles to the same remote issue must never write concurrently or one
//! update silently overwrites the other. Every mutating entity operation
//! holds the lock for its resource path for the duration of its requests.
//! Reads never lock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

/// Keyed async mutexes, one per remote resource
#[derive(Debug, Default)]
pub struct ResourceLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl ResourceLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive write access to `resource`
    ///
    /// The returned guard releases the resource when dropped.
    pub async fn acquire(&self, resource: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            // entries only referenced by the map are idle
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(resource.to_string()).or_default().clone()
        };

        if lock.try_lock().is_err() {
            debug!("Waiting for concurrent write on '{}' to finish", resource);
        }

        lock.lock_owned().await
    }

    /// Number of resources currently locked or waited on
    pub fn active(&self) -> usize {
        let locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.values().filter(|lock| Arc::strong_count(lock) > 1).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_same_resource_is_exclusive() {
        let locks = Arc::new(ResourceLocks::new());
        let guard = locks.acquire("repos/org/repo/issues/10").await;

        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.acquire("repos/org/repo/issues/10").await;
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should acquire after release")
            .unwrap();
    }

    #[tokio::test]
    async fn test_different_resources_do_not_block() {
        let locks = ResourceLocks::new();
        let _first = locks.acquire("repos/org/repo/issues/10").await;
        let second = timeout(Duration::from_millis(200), locks.acquire("repos/org/repo/issues/11")).await;
        assert!(second.is_ok());
        assert_eq!(locks.active(), 2);
    }

    #[tokio::test]
    async fn test_idle_entries_are_pruned() {
        let locks = ResourceLocks::new();
        drop(locks.acquire("a").await);
        drop(locks.acquire("b").await);
        assert_eq!(locks.active(), 0);
        let _c = locks.acquire("c").await;
        assert_eq!(locks.locks.lock().unwrap().len(), 1);
    }
}
