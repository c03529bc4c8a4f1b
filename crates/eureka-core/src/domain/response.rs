//! Wire-level response values carried back inside an `ActionRequest`.
//!
//! The server never sends nested causes to the client: an `ActionFault` holds
//! only a classification, a message and (for validation) a field → error map.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification of a failed action, as seen by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FaultKind {
    Validation,
    Authorization,
    Execution,
    General,
    /// The server no longer recognizes the client's session token.
    Session,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FaultKind::Validation => "validation",
            FaultKind::Authorization => "authorization",
            FaultKind::Execution => "execution",
            FaultKind::General => "general",
            FaultKind::Session => "session",
        };
        f.write_str(s)
    }
}

/// An error value returned in place of a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{kind} fault: {message}")]
pub struct ActionFault {
    kind: FaultKind,
    message: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    errors: BTreeMap<String, String>,
}

impl ActionFault {
    pub fn new(kind: FaultKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            errors: BTreeMap::new(),
        }
    }

    pub fn validation(message: impl Into<String>, errors: BTreeMap<String, String>) -> Self {
        Self {
            kind: FaultKind::Validation,
            message: message.into(),
            errors,
        }
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Authorization, message)
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Execution, message)
    }

    pub fn general(message: impl Into<String>) -> Self {
        Self::new(FaultKind::General, message)
    }

    pub fn session() -> Self {
        Self::new(FaultKind::Session, "session is no longer valid")
    }

    pub fn kind(&self) -> FaultKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Per-field validation errors (empty for other kinds).
    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn is_session(&self) -> bool {
        self.kind == FaultKind::Session
    }
}

/// Result of one action as it travels back over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "body", rename_all = "snake_case")]
pub enum ActionResponse {
    Success(serde_json::Value),
    Fault(ActionFault),
}

impl ActionResponse {
    pub fn is_fault(&self) -> bool {
        matches!(self, ActionResponse::Fault(_))
    }
}

impl From<ActionFault> for ActionResponse {
    fn from(fault: ActionFault) -> Self {
        ActionResponse::Fault(fault)
    }
}
