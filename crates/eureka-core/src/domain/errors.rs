//! Errors - エラー型と分類
//!
//! # 分類
//! - Configuration: アクションの構成ミス（strategy 欠落）。即時失敗、リトライしない
//! - Validation / Authorization / Execution: 各フェーズの失敗。呼び出し元へそのまま返す
//! - General: インフラ障害（トランザクション、タスク投入など）をまとめたもの
//! - Transport / Session: クライアント側の通信障害とセッション喪失

use std::collections::BTreeMap;

use thiserror::Error;

use super::response::ActionFault;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Input rejected by a validation strategy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed: {message}")]
pub struct ValidationError {
    message: String,
    errors: BTreeMap<String, String>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: BTreeMap::new(),
        }
    }

    /// Adds a per-field error.
    pub fn with_error(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.errors.insert(key.into(), value.into());
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }
}

/// The principal may not perform the action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("authorization failed: {message}")]
pub struct AuthorizationError {
    message: String,
}

impl AuthorizationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// The execution strategy failed; may wrap a domain-specific cause.
#[derive(Debug, Error)]
#[error("execution failed: {message}")]
pub struct ExecutionError {
    message: String,
    #[source]
    cause: Option<BoxError>,
}

impl ExecutionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_cause(message: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            cause: Some(cause.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Failure reported by the transaction manager.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    #[error("could not begin transaction: {0}")]
    Begin(String),
    #[error("commit failed: {0}")]
    Commit(String),
    #[error("rollback failed: {0}")]
    Rollback(String),
}

/// A task handler could not accept a deferred work item.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("task handler failed: {0}")]
pub struct TaskHandlerError(pub String);

/// Outcome of running an action through a controller.
#[derive(Debug, Error)]
pub enum ActionError {
    /// The action is missing a strategy (or a task handler); never retried.
    #[error("action misconfigured: {0}")]
    Configuration(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// Infrastructure failure (transaction manager, task handoff, ...).
    #[error("{message}")]
    General {
        message: String,
        #[source]
        cause: Option<BoxError>,
    },
}

impl ActionError {
    pub fn general(message: impl Into<String>) -> Self {
        ActionError::General {
            message: message.into(),
            cause: None,
        }
    }

    pub fn general_with(message: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        ActionError::General {
            message: message.into(),
            cause: Some(cause.into()),
        }
    }
}

/// Wire form of an action error. Only the message and the validation map
/// cross the wire; nested causes stay on the server.
impl From<&ActionError> for ActionFault {
    fn from(err: &ActionError) -> Self {
        match err {
            ActionError::Validation(v) => ActionFault::validation(v.message(), v.errors().clone()),
            ActionError::Authorization(a) => ActionFault::authorization(a.message()),
            ActionError::Execution(e) => ActionFault::execution(e.message()),
            ActionError::Configuration(msg) => ActionFault::general(msg.clone()),
            ActionError::General { message, .. } => ActionFault::general(message.clone()),
        }
    }
}

/// Batch-level failure of the client transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The server rejected the session token for the whole call.
    #[error("session is no longer valid")]
    SessionExpired,

    /// The call never went out.
    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

impl TransportError {
    pub fn is_session(&self) -> bool {
        matches!(self, TransportError::SessionExpired)
    }
}

/// What a request callback receives on its failure path.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestFailure {
    /// The server ran the action and it failed.
    #[error(transparent)]
    Fault(#[from] ActionFault),

    /// The batch carrying the request failed as a whole.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response did not decode into the expected type.
    #[error("could not decode response: {0}")]
    Decode(String),
}
