//! Per-invocation contexts handed to the strategies of an action.
//!
//! A context is created for exactly one invocation and never shared across
//! invocations.

use serde::{Deserialize, Serialize};

use super::ActionKey;

/// The authenticated user an action runs on behalf of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    account_id: String,
    id: i64,
}

impl Principal {
    pub fn new(account_id: impl Into<String>, id: i64) -> Self {
        Self {
            account_id: account_id.into(),
            id,
        }
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn id(&self) -> i64 {
        self.id
    }
}

/// Context of a user-initiated (service) action.
#[derive(Debug, Clone)]
pub struct ServiceActionContext {
    action_id: ActionKey,
    param: Option<serde_json::Value>,
    principal: Principal,
}

impl ServiceActionContext {
    pub fn new(action_id: ActionKey, param: Option<serde_json::Value>, principal: Principal) -> Self {
        Self {
            action_id,
            param,
            principal,
        }
    }

    pub fn action_id(&self) -> &ActionKey {
        &self.action_id
    }

    pub fn param(&self) -> Option<&serde_json::Value> {
        self.param.as_ref()
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }
}

/// Context of a deferred (async) action; there is no principal.
#[derive(Debug, Clone)]
pub struct AsyncActionContext {
    action_id: ActionKey,
    param: Option<serde_json::Value>,
}

impl AsyncActionContext {
    pub fn new(action_id: ActionKey, param: Option<serde_json::Value>) -> Self {
        Self { action_id, param }
    }

    pub fn action_id(&self) -> &ActionKey {
        &self.action_id
    }

    pub fn param(&self) -> Option<&serde_json::Value> {
        self.param.as_ref()
    }
}

/// A deferred work item emitted by a task-handler-aware execution strategy.
///
/// It is handed to the action's task handler only after the originating
/// transaction has committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserActionRequest {
    action_key: ActionKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    params: Option<serde_json::Value>,
}

impl UserActionRequest {
    pub fn new(action_key: impl Into<ActionKey>, user: Option<String>, params: Option<serde_json::Value>) -> Self {
        Self {
            action_key: action_key.into(),
            user,
            params,
        }
    }

    pub fn action_key(&self) -> &ActionKey {
        &self.action_key
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn params(&self) -> Option<&serde_json::Value> {
        self.params.as_ref()
    }

    /// Turns the item into the context its async action runs with.
    pub fn into_context(self) -> AsyncActionContext {
        AsyncActionContext::new(self.action_key, self.params)
    }
}
