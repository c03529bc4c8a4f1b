use crate::app::processor::ActionProcessor;
use crate::domain::{RequestFailure, RequestId, TransportError};

use super::action::Action;

impl ActionProcessor {
    /// Typed form of [`make_request`](ActionProcessor::make_request).
    ///
    /// If the param does not serialize, nothing is queued and `callback` is
    /// dropped uncalled.
    pub fn request<A: Action>(
        &self,
        param: &A::Param,
        callback: impl FnOnce(Result<A::Response, RequestFailure>) + 'static,
    ) -> Result<RequestId, RequestFailure> {
        let param = serde_json::to_value(param)
            .map_err(|e| RequestFailure::Transport(TransportError::Serialization(e.to_string())))?;

        Ok(self.make_request(
            A::KEY,
            Some(param),
            Some(Box::new(move |result| {
                let decoded = result.and_then(|value| {
                    serde_json::from_value::<A::Response>(value).map_err(|e| RequestFailure::Decode(e.to_string()))
                });
                callback(decoded);
            })),
        ))
    }
}
