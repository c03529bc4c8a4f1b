//! InMemoryTransactionManager - 開発用のトランザクションマネージャ
//!
//! 実際の永続化は行わず、begin / commit / rollback の履歴（journal）を
//! 記録します。テストではこの履歴でトランザクション境界を検証します。

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::TransactionError;
use crate::ports::{TransactionDefinition, TransactionManager, TransactionStatus};

/// One journal entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxEvent {
    Begin { name: String, read_only: bool },
    Commit,
    Rollback,
}

#[derive(Default)]
pub struct InMemoryTransactionManager {
    next_id: AtomicU64,
    journal: Mutex<Vec<TxEvent>>,
    fail_next_commit: Mutex<bool>,
}

impl InMemoryTransactionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn journal(&self) -> Vec<TxEvent> {
        self.journal.lock().await.clone()
    }

    /// The next commit fails and leaves the transaction open.
    pub async fn fail_next_commit(&self) {
        *self.fail_next_commit.lock().await = true;
    }
}

#[async_trait]
impl TransactionManager for InMemoryTransactionManager {
    async fn begin(&self, definition: &TransactionDefinition) -> Result<TransactionStatus, TransactionError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.journal.lock().await.push(TxEvent::Begin {
            name: definition.name.clone(),
            read_only: definition.read_only,
        });
        Ok(TransactionStatus::new(id, definition.read_only))
    }

    async fn commit(&self, status: &mut TransactionStatus) -> Result<(), TransactionError> {
        if status.is_completed() {
            return Err(TransactionError::Commit(format!("transaction {} already completed", status.id())));
        }
        {
            let mut fail = self.fail_next_commit.lock().await;
            if *fail {
                *fail = false;
                return Err(TransactionError::Commit(format!("commit of transaction {} refused", status.id())));
            }
        }
        self.journal.lock().await.push(TxEvent::Commit);
        status.mark_completed();
        Ok(())
    }

    async fn rollback(&self, status: &mut TransactionStatus) -> Result<(), TransactionError> {
        if status.is_completed() {
            return Err(TransactionError::Rollback(format!("transaction {} already completed", status.id())));
        }
        self.journal.lock().await.push(TxEvent::Rollback);
        status.mark_completed();
        Ok(())
    }
}
