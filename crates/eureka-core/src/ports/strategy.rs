//! Strategy ports - アクションを構成する 3 つのフェーズ
//!
//! validate → authorize → execute の順でコントローラが呼び出します。
//! 各 trait はコンテキスト型 `C` でジェネリック（service / async の両方で使う）。

use async_trait::async_trait;

use crate::domain::{AuthorizationError, ExecutionError, UserActionRequest, ValidationError};

#[async_trait]
pub trait ValidationStrategy<C: Send + Sync>: Send + Sync {
    async fn validate(&self, context: &C) -> Result<(), ValidationError>;
}

#[async_trait]
pub trait AuthorizationStrategy<C: Send + Sync>: Send + Sync {
    async fn authorize(&self, context: &C) -> Result<(), AuthorizationError>;
}

/// Plain execution: produces the action's result.
#[async_trait]
pub trait ExecutionStrategy<C: Send + Sync>: Send + Sync {
    async fn execute(&self, context: &C) -> Result<serde_json::Value, ExecutionError>;
}

/// Execution that also emits deferred work, handed off after commit.
#[async_trait]
pub trait TaskHandlerExecutionStrategy<C: Send + Sync>: Send + Sync {
    async fn execute(&self, context: &C) -> Result<ExecutionOutput, ExecutionError>;
}

/// Two-phase return of a task-handler-aware execution: the result for the
/// caller plus the deferred work items.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionOutput {
    pub result: serde_json::Value,
    pub tasks: Vec<UserActionRequest>,
}

impl ExecutionOutput {
    pub fn new(result: serde_json::Value) -> Self {
        Self {
            result,
            tasks: Vec::new(),
        }
    }

    pub fn with_task(mut self, task: UserActionRequest) -> Self {
        self.tasks.push(task);
        self
    }
}

/// Validation that accepts everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoValidation;

#[async_trait]
impl<C: Send + Sync> ValidationStrategy<C> for NoValidation {
    async fn validate(&self, _context: &C) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// Authorization that lets every principal through.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

#[async_trait]
impl<C: Send + Sync> AuthorizationStrategy<C> for AllowAll {
    async fn authorize(&self, _context: &C) -> Result<(), AuthorizationError> {
        Ok(())
    }
}
