//! ServerBuilder - サーバ側の構築とワイヤリング
//!
//! # 設計原則
//! - Builder パターン（アクション登録と協調者の注入）
//! - 起動時検証（Fail-fast 設計）: expect_actions() の期待集合 ⊆ 登録済み集合
//! - 必須の協調者（TransactionManager / SessionStore / PrincipalPopulator）が
//!   欠けていれば build() が失敗する

use std::sync::Arc;
use std::time::Duration;

use crate::app::action::{AsyncAction, ServiceAction};
use crate::app::controller::{AsyncActionController, ServiceActionController};
use crate::app::executor::ActionExecutor;
use crate::app::registry::{ActionRegistry, RegistryError};
use crate::app::rpc_service::ActionRpcService;
use crate::app::task_worker::{DeferredTaskRunner, TaskWorkerGroup};
use crate::config::ServerConfig;
use crate::domain::{ActionKey, AsyncActionContext, ServiceActionContext};
use crate::ports::{PrincipalPopulator, SessionStore, TaskQueue, TransactionManager};

/// ServerBuilder はサーバを構築
///
/// # 使用例
/// ```ignore
/// let server = ServerBuilder::new()
///     .register("getFoo", get_foo)?
///     .register_async("notifyFollowers", notify)?
///     .expect_actions(&["getFoo", "notifyFollowers"])
///     .transactions(Arc::new(InMemoryTransactionManager::new()))
///     .sessions(sessions)
///     .principals(principals)
///     .build()?;
/// ```
pub struct ServerBuilder {
    actions: ActionRegistry<ServiceActionContext>,
    async_actions: ActionRegistry<AsyncActionContext>,
    expected_actions: Option<Vec<String>>,
    transactions: Option<Arc<dyn TransactionManager>>,
    sessions: Option<Arc<dyn SessionStore>>,
    principals: Option<Arc<dyn PrincipalPopulator>>,
}

/// BuildError はサーバ構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing actions: {0:?}. These actions were expected but not registered.")]
    MissingActions(Vec<String>),

    #[error("no {0} configured")]
    MissingCollaborator(&'static str),
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            actions: ActionRegistry::new(),
            async_actions: ActionRegistry::new(),
            expected_actions: None,
            transactions: None,
            sessions: None,
            principals: None,
        }
    }

    /// クライアントから呼べるアクションを登録
    pub fn register(mut self, key: impl Into<ActionKey>, action: ServiceAction) -> Result<Self, RegistryError> {
        self.actions.register(key, action)?;
        Ok(self)
    }

    /// 遅延タスクとして実行されるアクションを登録
    pub fn register_async(mut self, key: impl Into<ActionKey>, action: AsyncAction) -> Result<Self, RegistryError> {
        self.async_actions.register(key, action)?;
        Ok(self)
    }

    /// 期待されるアクションキーのリストを設定
    pub fn expect_actions(mut self, keys: &[&str]) -> Self {
        self.expected_actions = Some(keys.iter().map(|k| k.to_string()).collect());
        self
    }

    pub fn transactions(mut self, transactions: Arc<dyn TransactionManager>) -> Self {
        self.transactions = Some(transactions);
        self
    }

    pub fn sessions(mut self, sessions: Arc<dyn SessionStore>) -> Self {
        self.sessions = Some(sessions);
        self
    }

    pub fn principals(mut self, principals: Arc<dyn PrincipalPopulator>) -> Self {
        self.principals = Some(principals);
        self
    }

    /// # 検証
    /// - expect_actions() のキーが同期・非同期いずれかに登録されているか
    /// - 必須の協調者が揃っているか
    pub fn build(self) -> Result<Server, BuildError> {
        if let Some(expected) = &self.expected_actions {
            let missing: Vec<String> = expected
                .iter()
                .filter(|key| {
                    let key = ActionKey::new(key.as_str());
                    !self.actions.contains(&key) && !self.async_actions.contains(&key)
                })
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(BuildError::MissingActions(missing));
            }
        }

        let transactions = self
            .transactions
            .ok_or(BuildError::MissingCollaborator("transaction manager"))?;
        let sessions = self.sessions.ok_or(BuildError::MissingCollaborator("session store"))?;
        let principals = self
            .principals
            .ok_or(BuildError::MissingCollaborator("principal populator"))?;

        let executor = ActionExecutor::new(
            Arc::new(self.actions),
            ServiceActionController::new(Arc::clone(&transactions)),
            principals,
        );
        let deferred = DeferredTaskRunner::new(
            Arc::new(self.async_actions),
            AsyncActionController::new(transactions),
        );

        Ok(Server {
            rpc: Arc::new(ActionRpcService::new(Arc::new(executor), sessions)),
            deferred: Arc::new(deferred),
        })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Server は構築済みのサーバ側コンポーネント
pub struct Server {
    rpc: Arc<ActionRpcService>,
    deferred: Arc<DeferredTaskRunner>,
}

impl Server {
    pub fn rpc(&self) -> Arc<ActionRpcService> {
        Arc::clone(&self.rpc)
    }

    pub fn deferred(&self) -> Arc<DeferredTaskRunner> {
        Arc::clone(&self.deferred)
    }

    /// Starts the deferred-task workers described by `config` on `queue`.
    pub fn spawn_workers(&self, queue: Arc<dyn TaskQueue>, config: &ServerConfig) -> TaskWorkerGroup {
        TaskWorkerGroup::spawn(
            config.task_workers,
            queue,
            self.deferred(),
            Duration::from_millis(config.task_poll_ms),
        )
    }
}
