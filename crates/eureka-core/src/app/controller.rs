//! Controllers - トランザクション境界でアクションを実行する
//!
//! `ServiceActionController` は validate → authorize → execute、
//! `AsyncActionController` は validate → execute（ユーザー不在のため認可なし）。
//! どちらも同じパイプラインを共有します。
//!
//! # 設計原則
//!
//! - 設定不備（戦略の欠落など）はトランザクション開始前に検出する
//! - どのフェーズで失敗しても、未完了ならロールバックしてから呼び出し側へ返す
//! - 遅延タスクはコミット後に、発行順に 1 件ずつタスクハンドラへ渡す
//! - タスクハンドラの失敗は General。コミット済みのトランザクションは戻さない

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, warn};

use crate::app::action::{ActionDefinition, AsyncAction, Execution, ServiceAction};
use crate::domain::{
    ActionError, AsyncActionContext, ServiceActionContext, UserActionRequest,
};
use crate::ports::{
    AuthorizationStrategy, ExecutionOutput, TaskHandler, TransactionDefinition, TransactionManager,
    TransactionStatus, ValidationStrategy,
};

const TASK_POST_FAILED: &str = "Error occurred posting UserActionRequests to the queue";

/// Runs user-initiated actions.
#[derive(Clone)]
pub struct ServiceActionController {
    transactions: Arc<dyn TransactionManager>,
}

impl ServiceActionController {
    pub fn new(transactions: Arc<dyn TransactionManager>) -> Self {
        Self { transactions }
    }

    pub async fn execute(&self, context: &ServiceActionContext, action: &ServiceAction) -> Result<Value, ActionError> {
        let plan = Plan::resolve(action, Phases::Authorized)?;
        plan.run(self.transactions.as_ref(), context).await
    }
}

/// Runs deferred actions with no user present. Authorization is skipped.
#[derive(Clone)]
pub struct AsyncActionController {
    transactions: Arc<dyn TransactionManager>,
}

impl AsyncActionController {
    pub fn new(transactions: Arc<dyn TransactionManager>) -> Self {
        Self { transactions }
    }

    pub async fn execute(&self, context: &AsyncActionContext, action: &AsyncAction) -> Result<Value, ActionError> {
        let plan = Plan::resolve(action, Phases::Unauthorized)?;
        plan.run(self.transactions.as_ref(), context).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phases {
    Authorized,
    Unauthorized,
}

/// An action whose strategies have all been checked to be present.
struct Plan<'a, C: Send + Sync> {
    name: &'a str,
    read_only: bool,
    validation: &'a Arc<dyn ValidationStrategy<C>>,
    authorization: Option<&'a Arc<dyn AuthorizationStrategy<C>>>,
    execution: &'a Execution<C>,
    task_handler: Option<&'a Arc<dyn TaskHandler>>,
}

impl<'a, C: Send + Sync> Plan<'a, C> {
    fn resolve(action: &'a ActionDefinition<C>, phases: Phases) -> Result<Self, ActionError> {
        let missing = |what: &str| {
            let message = format!("action '{}' has no {what}", action.name());
            error!(action = action.name(), "{message}");
            ActionError::Configuration(message)
        };

        let validation = action.validation().ok_or_else(|| missing("validation strategy"))?;
        let authorization = match phases {
            Phases::Authorized => Some(action.authorization().ok_or_else(|| missing("authorization strategy"))?),
            Phases::Unauthorized => None,
        };
        let execution = action.execution().ok_or_else(|| missing("execution strategy"))?;
        let task_handler = action.task_handler();
        if matches!(execution, Execution::Deferring(_)) && task_handler.is_none() {
            return Err(missing("task handler"));
        }

        Ok(Self {
            name: action.name(),
            read_only: action.is_read_only(),
            validation,
            authorization,
            execution,
            task_handler,
        })
    }

    async fn run(&self, transactions: &dyn TransactionManager, context: &C) -> Result<Value, ActionError> {
        let definition = TransactionDefinition::new(self.name, self.read_only);
        let mut status = transactions.begin(&definition).await.map_err(|err| {
            error!(action = self.name, error = %err, "could not begin transaction");
            ActionError::general_with("could not begin transaction", err)
        })?;

        let output = match self.phases(context).await {
            Ok(output) => output,
            Err(err) => return Err(self.abort(transactions, &mut status, err).await),
        };

        if let Err(err) = transactions.commit(&mut status).await {
            let err = ActionError::general_with("Error occurred performing transaction", err);
            return Err(self.abort(transactions, &mut status, err).await);
        }

        if !output.tasks.is_empty() {
            self.post_tasks(output.tasks).await?;
        }
        Ok(output.result)
    }

    async fn phases(&self, context: &C) -> Result<ExecutionOutput, ActionError> {
        self.validation.validate(context).await?;
        if let Some(authorization) = self.authorization {
            authorization.authorize(context).await?;
        }
        let output = match self.execution {
            Execution::Plain(strategy) => ExecutionOutput::new(strategy.execute(context).await?),
            Execution::Deferring(strategy) => strategy.execute(context).await?,
        };
        Ok(output)
    }

    /// Logs the failure and rolls back if the transaction is still open.
    async fn abort(
        &self,
        transactions: &dyn TransactionManager,
        status: &mut TransactionStatus,
        err: ActionError,
    ) -> ActionError {
        match &err {
            ActionError::Validation(v) => {
                warn!(action = self.name, error = %v, "Validation failed for the current action");
                for (key, value) in v.errors() {
                    warn!(action = self.name, key = %key, value = %value, "validation error");
                }
            }
            ActionError::Authorization(a) => {
                warn!(action = self.name, error = %a, "Authorization failed for the current action");
            }
            ActionError::Execution(e) => {
                error!(action = self.name, error = %e, "Error occurred during execution");
            }
            other => {
                error!(action = self.name, error = %other, "Error occurred performing transaction");
            }
        }

        if status.is_completed() {
            return err;
        }
        match transactions.rollback(status).await {
            Ok(()) => {
                debug!(action = self.name, tx = status.id(), "rolled back");
                err
            }
            Err(rollback) => {
                error!(action = self.name, error = %rollback, "rollback failed");
                ActionError::general_with("rollback failed", rollback)
            }
        }
    }

    async fn post_tasks(&self, tasks: Vec<UserActionRequest>) -> Result<(), ActionError> {
        let Some(handler) = self.task_handler else {
            // resolve() guarantees a handler for deferring executions
            return Err(ActionError::general(TASK_POST_FAILED));
        };
        for task in tasks {
            let key = task.action_key().clone();
            if let Err(err) = handler.handle_task(task).await {
                error!(action = self.name, task = %key, error = %err, "{TASK_POST_FAILED}");
                return Err(ActionError::general_with(TASK_POST_FAILED, err));
            }
        }
        Ok(())
    }
}
