//! TaskQueue port - deferred work の配送キュー
//!
//! # 設計原則
//! - `UserActionRequest` をそのまま流す（順序は FIFO）
//! - blocking pop（timeout 付き）

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::UserActionRequest;

#[derive(Debug, thiserror::Error)]
pub enum TaskQueueError {
    #[error("queue is closed")]
    Closed,
}

#[async_trait]
pub trait TaskQueue: Send + Sync {
    async fn push(&self, request: UserActionRequest) -> Result<(), TaskQueueError>;

    /// Waits up to `timeout` for an item; `Ok(None)` on timeout.
    async fn pop(&self, timeout: Duration) -> Result<Option<UserActionRequest>, TaskQueueError>;

    async fn len(&self) -> usize;

    /// Stops accepting pushes; pops drain what is left, then fail with `Closed`.
    async fn close(&self);
}
