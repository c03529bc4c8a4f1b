//! Domain model (IDs, envelopes, responses, contexts, errors).

pub mod context;
pub mod errors;
pub mod ids;
pub mod request;
pub mod response;

pub use self::context::{AsyncActionContext, Principal, ServiceActionContext, UserActionRequest};
pub use self::errors::{
    ActionError, AuthorizationError, ExecutionError, RequestFailure, TaskHandlerError,
    TransactionError, TransportError, ValidationError,
};
pub use self::ids::{ActionKey, Id, IdMarker, RequestId, SessionId};
pub use self::request::ActionRequest;
pub use self::response::{ActionFault, ActionResponse, FaultKind};
