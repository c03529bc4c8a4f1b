//! Server-side action definitions.
//!
//! An action bundles the strategies the controllers run. Every strategy is
//! optional at construction so that a misconfigured action is reported by
//! the controller as a configuration error instead of failing to build.

use std::fmt;
use std::sync::Arc;

use crate::domain::{AsyncActionContext, ServiceActionContext};
use crate::ports::{
    AuthorizationStrategy, ExecutionStrategy, TaskHandler, TaskHandlerExecutionStrategy,
    ValidationStrategy,
};

/// How an action executes.
pub enum Execution<C: Send + Sync> {
    /// Returns only a result.
    Plain(Arc<dyn ExecutionStrategy<C>>),
    /// Returns a result plus deferred work for the task handler.
    Deferring(Arc<dyn TaskHandlerExecutionStrategy<C>>),
}

impl<C: Send + Sync> Clone for Execution<C> {
    fn clone(&self) -> Self {
        match self {
            Execution::Plain(s) => Execution::Plain(Arc::clone(s)),
            Execution::Deferring(s) => Execution::Deferring(Arc::clone(s)),
        }
    }
}

pub struct ActionDefinition<C: Send + Sync> {
    name: String,
    read_only: bool,
    validation: Option<Arc<dyn ValidationStrategy<C>>>,
    authorization: Option<Arc<dyn AuthorizationStrategy<C>>>,
    execution: Option<Execution<C>>,
    task_handler: Option<Arc<dyn TaskHandler>>,
}

/// Action run on behalf of a user.
pub type ServiceAction = ActionDefinition<ServiceActionContext>;

/// Action run with no user present. The authorization slot is ignored.
pub type AsyncAction = ActionDefinition<AsyncActionContext>;

impl<C: Send + Sync> ActionDefinition<C> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            read_only: false,
            validation: None,
            authorization: None,
            execution: None,
            task_handler: None,
        }
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn with_validation(mut self, strategy: Arc<dyn ValidationStrategy<C>>) -> Self {
        self.validation = Some(strategy);
        self
    }

    pub fn with_authorization(mut self, strategy: Arc<dyn AuthorizationStrategy<C>>) -> Self {
        self.authorization = Some(strategy);
        self
    }

    pub fn with_execution(mut self, strategy: Arc<dyn ExecutionStrategy<C>>) -> Self {
        self.execution = Some(Execution::Plain(strategy));
        self
    }

    pub fn with_deferring_execution(mut self, strategy: Arc<dyn TaskHandlerExecutionStrategy<C>>) -> Self {
        self.execution = Some(Execution::Deferring(strategy));
        self
    }

    pub fn with_task_handler(mut self, handler: Arc<dyn TaskHandler>) -> Self {
        self.task_handler = Some(handler);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn validation(&self) -> Option<&Arc<dyn ValidationStrategy<C>>> {
        self.validation.as_ref()
    }

    pub fn authorization(&self) -> Option<&Arc<dyn AuthorizationStrategy<C>>> {
        self.authorization.as_ref()
    }

    pub fn execution(&self) -> Option<&Execution<C>> {
        self.execution.as_ref()
    }

    pub fn task_handler(&self) -> Option<&Arc<dyn TaskHandler>> {
        self.task_handler.as_ref()
    }

    pub fn is_deferring(&self) -> bool {
        matches!(self.execution, Some(Execution::Deferring(_)))
    }
}

impl<C: Send + Sync> fmt::Debug for ActionDefinition<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDefinition")
            .field("name", &self.name)
            .field("read_only", &self.read_only)
            .field("validation", &self.validation.is_some())
            .field("authorization", &self.authorization.is_some())
            .field("deferring", &self.is_deferring())
            .field("task_handler", &self.task_handler.is_some())
            .finish()
    }
}
