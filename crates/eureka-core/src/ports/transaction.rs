//! TransactionManager port - unit-of-work の抽象化
//!
//! コントローラはトランザクションを「消費」するだけで、実装しません。
//! 本番では RDB のトランザクション、テストでは `impls::InMemoryTransactionManager`。

use async_trait::async_trait;

use crate::domain::TransactionError;

/// What the controller asks for when opening a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDefinition {
    pub name: String,
    pub read_only: bool,
}

impl TransactionDefinition {
    pub fn new(name: impl Into<String>, read_only: bool) -> Self {
        Self {
            name: name.into(),
            read_only,
        }
    }
}

/// Handle of one open transaction.
///
/// `completed` is set by the manager once the transaction has been committed
/// or rolled back, even when that commit/rollback reported an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionStatus {
    id: u64,
    read_only: bool,
    completed: bool,
}

impl TransactionStatus {
    pub fn new(id: u64, read_only: bool) -> Self {
        Self {
            id,
            read_only,
            completed: false,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn mark_completed(&mut self) {
        self.completed = true;
    }
}

/// Begins, commits and rolls back units of work.
///
/// # 設計原則
/// - commit / rollback は完了済みの status に対して呼んではいけない
/// - 呼び出し側は rollback 前に `is_completed()` を確認する
#[async_trait]
pub trait TransactionManager: Send + Sync {
    async fn begin(&self, definition: &TransactionDefinition) -> Result<TransactionStatus, TransactionError>;

    async fn commit(&self, status: &mut TransactionStatus) -> Result<(), TransactionError>;

    async fn rollback(&self, status: &mut TransactionStatus) -> Result<(), TransactionError>;
}
