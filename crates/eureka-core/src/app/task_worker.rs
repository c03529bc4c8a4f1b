use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::app::controller::AsyncActionController;
use crate::app::registry::ActionRegistry;
use crate::domain::{ActionError, AsyncActionContext, UserActionRequest};
use crate::ports::{TaskQueue, TaskQueueError};

/// Runs deferred work items through the async controller.
pub struct DeferredTaskRunner {
    registry: Arc<ActionRegistry<AsyncActionContext>>,
    controller: AsyncActionController,
}

impl DeferredTaskRunner {
    pub fn new(registry: Arc<ActionRegistry<AsyncActionContext>>, controller: AsyncActionController) -> Self {
        Self { registry, controller }
    }

    pub async fn run(&self, task: UserActionRequest) -> Result<Value, ActionError> {
        let key = task.action_key().clone();
        let action = self
            .registry
            .get(&key)
            .ok_or_else(|| ActionError::general(format!("'{key}' is not an executable async action")))?;
        let context = task.into_context();
        self.controller.execute(&context, action).await
    }
}

/// Counters of finished deferred tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerCounts {
    pub succeeded: usize,
    pub failed: usize,
}

#[derive(Default)]
struct Counters {
    succeeded: AtomicUsize,
    failed: AtomicUsize,
}

/// Worker group handle.
/// - `request_shutdown` でワーカー全体が新しいタスクを取らなくなる
/// - `shutdown_and_join()` で全ワーカーの終了を待てる
pub struct TaskWorkerGroup {
    shutdown_tx: watch::Sender<bool>,
    joins: Vec<JoinHandle<()>>,
    counters: Arc<Counters>,
}

impl TaskWorkerGroup {
    /// Spawn `n` workers polling `queue` every `poll` at most.
    pub fn spawn(n: usize, queue: Arc<dyn TaskQueue>, runner: Arc<DeferredTaskRunner>, poll: Duration) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let counters = Arc::new(Counters::default());

        let mut joins = Vec::with_capacity(n);
        for worker_id in 0..n {
            let q = Arc::clone(&queue);
            let r = Arc::clone(&runner);
            let c = Arc::clone(&counters);
            let mut rx = shutdown_rx.clone();

            let join = tokio::spawn(async move {
                worker_loop(worker_id, q, r, c, poll, &mut rx).await;
            });
            joins.push(join);
        }
        info!(workers = n, "task workers started");

        Self {
            shutdown_tx,
            joins,
            counters,
        }
    }

    pub fn counts(&self) -> WorkerCounts {
        WorkerCounts {
            succeeded: self.counters.succeeded.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }

    /// In-flight tasks are allowed to finish.
    pub fn request_shutdown(&self) {
        // receivers may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        for j in self.joins {
            let _ = j.await;
        }
        info!("task workers stopped");
    }
}

async fn worker_loop(
    worker_id: usize,
    queue: Arc<dyn TaskQueue>,
    runner: Arc<DeferredTaskRunner>,
    counters: Arc<Counters>,
    poll: Duration,
    shutdown_rx: &mut watch::Receiver<bool>,
) {
    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        let popped = tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                continue;
            }
            popped = queue.pop(poll) => popped,
        };

        let task = match popped {
            Ok(Some(task)) => task,
            Ok(None) => continue,
            Err(TaskQueueError::Closed) => {
                debug!(worker_id, "task queue closed");
                break;
            }
        };

        let key = task.action_key().clone();
        match runner.run(task).await {
            Ok(_) => {
                counters.succeeded.fetch_add(1, Ordering::Relaxed);
                debug!(worker_id, task = %key, "deferred task completed");
            }
            Err(err) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                error!(worker_id, task = %key, error = %err, "deferred task failed");
            }
        }
    }
}
