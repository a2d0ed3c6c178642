//! Comment capability contract

use super::types::{CommentData, User};
use crate::error::HosterResult;
use async_trait::async_trait;

/// A comment on an issue or merge request
#[async_trait]
pub trait Comment: Send {
    fn id(&self) -> u64;

    async fn data(&mut self) -> HosterResult<&CommentData>;

    async fn set_body(&mut self, body: &str) -> HosterResult<()>;

    /// Delete the comment on the hoster; the handle is consumed
    async fn delete(self) -> HosterResult<()>
    where
        Self: Sized;

    async fn body(&mut self) -> HosterResult<String> {
        Ok(self.data().await?.body.clone())
    }

    async fn author(&mut self) -> HosterResult<User> {
        Ok(self.data().await?.author.clone())
    }
}
