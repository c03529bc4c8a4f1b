//! Server entry point for batches sent by the client processor.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::app::executor::ActionExecutor;
use crate::domain::{ActionFault, ActionRequest, ActionResponse, SessionId};
use crate::ports::{SessionStore, SessionStoreError};

pub struct ActionRpcService {
    executor: Arc<ActionExecutor>,
    sessions: Arc<dyn SessionStore>,
}

impl ActionRpcService {
    pub fn new(executor: Arc<ActionExecutor>, sessions: Arc<dyn SessionStore>) -> Self {
        Self { executor, sessions }
    }

    /// Opens a session for `user`, replacing any previous one.
    pub async fn establish_session(&self, user: &str) -> Result<SessionId, SessionStoreError> {
        let session = self.sessions.create(user).await?;
        info!(user, %session, "session established");
        Ok(session)
    }

    /// Runs a batch in order and returns the envelopes in the same order.
    ///
    /// Each envelope is checked against the session store on its own. One
    /// that fails the check comes back with a session fault and is not run.
    pub async fn execute(&self, user: &str, batch: Vec<ActionRequest>) -> Vec<ActionRequest> {
        debug!(user, batch_size = batch.len(), "executing batch");
        let mut out = Vec::with_capacity(batch.len());
        for request in batch {
            out.push(self.execute_one(user, request).await);
        }
        out
    }

    pub async fn execute_one(&self, user: &str, request: ActionRequest) -> ActionRequest {
        if !self.sessions.validate(user, request.session_id()).await {
            warn!(user, request_id = %request.id(), action = %request.action_key(), "rejecting request with invalid session");
            return request.respond(ActionResponse::Fault(ActionFault::session()));
        }
        self.executor.execute(user, request).await
    }

    /// Drops the session of `user`; its next batch receives session faults.
    pub async fn expire_session(&self, user: &str) {
        self.sessions.invalidate(user).await;
        info!(user, "session expired");
    }
}
