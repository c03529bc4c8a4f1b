//! ActionTransport port - クライアントとサーバをつなぐ RPC
//!
//! クライアントはシングルスレッドのイベント駆動環境を想定しているため、
//! この trait は `Send` を要求せず、完了はコールバックで通知されます。
//!
//! 生の完了値は `BatchOutcome` / `ItemOutcome` にここで一度だけ変換し、
//! セッション喪失の判定を呼び出し側に散らばらせません。

use crate::domain::{ActionFault, ActionRequest, ActionResponse, SessionId, TransportError};

pub type BatchCompletion = Box<dyn FnOnce(Result<Vec<ActionRequest>, TransportError>)>;

pub type SessionCompletion = Box<dyn FnOnce(Result<SessionId, TransportError>)>;

/// Opaque network call carrying batches of envelopes.
///
/// Returning `Err` from either method means the call never went out (for
/// example the batch did not serialize); the completion is then dropped
/// without being called.
pub trait ActionTransport {
    fn execute(&self, batch: Vec<ActionRequest>, done: BatchCompletion) -> Result<(), TransportError>;

    fn establish_session(&self, done: SessionCompletion) -> Result<(), TransportError>;
}

/// A batch completion, resolved once at the transport boundary.
#[derive(Debug)]
pub enum BatchOutcome {
    Delivered(Vec<ActionRequest>),
    SessionFault,
    Failed(TransportError),
}

impl From<Result<Vec<ActionRequest>, TransportError>> for BatchOutcome {
    fn from(result: Result<Vec<ActionRequest>, TransportError>) -> Self {
        match result {
            Ok(items) => BatchOutcome::Delivered(items),
            Err(err) if err.is_session() => BatchOutcome::SessionFault,
            Err(err) => BatchOutcome::Failed(err),
        }
    }
}

/// The response of one delivered envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    Success(serde_json::Value),
    Failure(ActionFault),
    SessionFault,
}

impl From<Option<ActionResponse>> for ItemOutcome {
    fn from(response: Option<ActionResponse>) -> Self {
        match response {
            // the server answered with nothing: a successful null result
            None => ItemOutcome::Success(serde_json::Value::Null),
            Some(ActionResponse::Success(value)) => ItemOutcome::Success(value),
            Some(ActionResponse::Fault(fault)) if fault.is_session() => ItemOutcome::SessionFault,
            Some(ActionResponse::Fault(fault)) => ItemOutcome::Failure(fault),
        }
    }
}
