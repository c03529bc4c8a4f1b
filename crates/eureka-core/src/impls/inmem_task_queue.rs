//! InMemoryTaskQueue - 開発用の遅延タスクキュー
//!
//! # 実装
//! - tokio::sync::Mutex + Notify による async な blocking pop（タイムアウト付き）
//! - close() 後の push はエラー、pop は残りを取り出し切ってからエラー
//!
//! `QueueTaskHandler` はコントローラから渡されたタスクをこのキューに積む
//! TaskHandler 実装です。

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;
use tracing::debug;

use crate::domain::{TaskHandlerError, UserActionRequest};
use crate::ports::{TaskHandler, TaskQueue, TaskQueueError};

#[derive(Default)]
struct State {
    items: VecDeque<UserActionRequest>,
    closed: bool,
}

#[derive(Default)]
pub struct InMemoryTaskQueue {
    state: Mutex<State>,
    notify: Notify,
}

impl InMemoryTaskQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskQueue for InMemoryTaskQueue {
    async fn push(&self, request: UserActionRequest) -> Result<(), TaskQueueError> {
        {
            let mut state = self.state.lock().await;
            if state.closed {
                return Err(TaskQueueError::Closed);
            }
            state.items.push_back(request);
        }
        self.notify.notify_one();
        Ok(())
    }

    async fn pop(&self, timeout: Duration) -> Result<Option<UserActionRequest>, TaskQueueError> {
        let deadline = Instant::now() + timeout;
        loop {
            // registered before the check so a push in between is not missed
            let notified = self.notify.notified();
            {
                let mut state = self.state.lock().await;
                if let Some(item) = state.items.pop_front() {
                    return Ok(Some(item));
                }
                if state.closed {
                    return Err(TaskQueueError::Closed);
                }
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return Ok(None);
            }
        }
    }

    async fn len(&self) -> usize {
        self.state.lock().await.items.len()
    }

    async fn close(&self) {
        self.state.lock().await.closed = true;
        self.notify.notify_waiters();
    }
}

/// Hands deferred work to a [`TaskQueue`].
pub struct QueueTaskHandler {
    queue: Arc<dyn TaskQueue>,
}

impl QueueTaskHandler {
    pub fn new(queue: Arc<dyn TaskQueue>) -> Self {
        Self { queue }
    }
}

#[async_trait]
impl TaskHandler for QueueTaskHandler {
    async fn handle_task(&self, request: UserActionRequest) -> Result<(), TaskHandlerError> {
        let key = request.action_key().clone();
        self.queue
            .push(request)
            .await
            .map_err(|err| TaskHandlerError(format!("could not queue '{key}': {err}")))?;
        debug!(task = %key, "deferred task queued");
        Ok(())
    }
}
