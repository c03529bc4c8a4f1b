use serde::{Deserialize, Serialize};

use super::{ActionKey, ActionResponse, RequestId, SessionId};

/// One unit of work exchanged between client and server.
///
/// The client creates it with a fresh id, stamps the session right before
/// sending, and the server fills in `response` (discarding `param`, which the
/// client already has).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    id: RequestId,
    action_key: ActionKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    param: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    response: Option<ActionResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    session_id: Option<SessionId>,
}

impl ActionRequest {
    pub fn new(id: RequestId, action_key: ActionKey, param: Option<serde_json::Value>) -> Self {
        Self {
            id,
            action_key,
            param,
            response: None,
            session_id: None,
        }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn action_key(&self) -> &ActionKey {
        &self.action_key
    }

    pub fn param(&self) -> Option<&serde_json::Value> {
        self.param.as_ref()
    }

    pub fn response(&self) -> Option<&ActionResponse> {
        self.response.as_ref()
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    /// Copy of this envelope stamped with `session`, ready to go on the wire.
    pub fn stamped(&self, session: SessionId) -> Self {
        Self {
            session_id: Some(session),
            ..self.clone()
        }
    }

    /// Server side: attach the result and drop the param.
    pub fn respond(mut self, response: ActionResponse) -> Self {
        self.param = None;
        self.response = Some(response);
        self
    }

    pub fn take_param(&mut self) -> Option<serde_json::Value> {
        self.param.take()
    }

    pub fn into_response(self) -> Option<ActionResponse> {
        self.response
    }
}
