//! Test doubles shared by the unit tests.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use crate::app::processor::ActionCallback;
use crate::domain::{ActionRequest, ActionResponse, RequestFailure, SessionId, TransportError};
use crate::ports::{ActionTransport, BatchCompletion, SessionCompletion};

/// Transport that records every call and lets the test complete it later,
/// in any order.
#[derive(Default)]
pub(crate) struct RecordingTransport {
    batches: RefCell<Vec<(Vec<ActionRequest>, Option<BatchCompletion>)>>,
    sessions: RefCell<Vec<Option<SessionCompletion>>>,
    reject_next_execute: RefCell<Option<TransportError>>,
    reject_next_establish: RefCell<Option<TransportError>>,
}

impl RecordingTransport {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub(crate) fn batch_count(&self) -> usize {
        self.batches.borrow().len()
    }

    pub(crate) fn session_requests(&self) -> usize {
        self.sessions.borrow().len()
    }

    pub(crate) fn batch(&self, n: usize) -> Vec<ActionRequest> {
        self.batches.borrow()[n].0.clone()
    }

    /// The next `execute` call fails synchronously with `err`.
    pub(crate) fn reject_next_execute(&self, err: TransportError) {
        *self.reject_next_execute.borrow_mut() = Some(err);
    }

    /// The next `establish_session` call fails synchronously with `err`.
    pub(crate) fn reject_next_establish(&self, err: TransportError) {
        *self.reject_next_establish.borrow_mut() = Some(err);
    }

    pub(crate) fn complete_batch(&self, n: usize, result: Result<Vec<ActionRequest>, TransportError>) {
        // take the completion out first: it may call back into this transport
        let done = self.batches.borrow_mut()[n].1.take();
        let done = done.unwrap_or_else(|| panic!("batch {n} already completed"));
        done(result);
    }

    /// Completes batch `n`, answering each envelope with `reply`.
    pub(crate) fn reply(&self, n: usize, reply: impl Fn(&ActionRequest) -> ActionResponse) {
        let responses = self
            .batch(n)
            .into_iter()
            .map(|req| {
                let response = reply(&req);
                req.respond(response)
            })
            .collect();
        self.complete_batch(n, Ok(responses));
    }

    pub(crate) fn complete_session(&self, n: usize, result: Result<SessionId, TransportError>) {
        let done = self.sessions.borrow_mut()[n].take();
        let done = done.unwrap_or_else(|| panic!("session request {n} already completed"));
        done(result);
    }
}

impl ActionTransport for RecordingTransport {
    fn execute(&self, batch: Vec<ActionRequest>, done: BatchCompletion) -> Result<(), TransportError> {
        if let Some(err) = self.reject_next_execute.borrow_mut().take() {
            return Err(err);
        }
        self.batches.borrow_mut().push((batch, Some(done)));
        Ok(())
    }

    fn establish_session(&self, done: SessionCompletion) -> Result<(), TransportError> {
        if let Some(err) = self.reject_next_establish.borrow_mut().take() {
            return Err(err);
        }
        self.sessions.borrow_mut().push(Some(done));
        Ok(())
    }
}

pub(crate) type Outcomes = Rc<RefCell<Vec<(&'static str, Result<Value, RequestFailure>)>>>;

/// Collects callback invocations under a label.
#[derive(Clone, Default)]
pub(crate) struct CallbackLog {
    outcomes: Outcomes,
}

impl CallbackLog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn callback(&self, label: &'static str) -> Option<ActionCallback> {
        let outcomes = Rc::clone(&self.outcomes);
        Some(Box::new(move |result| outcomes.borrow_mut().push((label, result))))
    }

    /// A callback that records its invocation and then panics.
    pub(crate) fn naughty(&self, label: &'static str) -> Option<ActionCallback> {
        let outcomes = Rc::clone(&self.outcomes);
        Some(Box::new(move |result| {
            outcomes.borrow_mut().push((label, result));
            panic!("Naughty callback");
        }))
    }

    pub(crate) fn outcomes(&self) -> Vec<(&'static str, Result<Value, RequestFailure>)> {
        self.outcomes.borrow().clone()
    }

    pub(crate) fn count(&self, label: &str) -> usize {
        self.outcomes.borrow().iter().filter(|(l, _)| *l == label).count()
    }

    pub(crate) fn len(&self) -> usize {
        self.outcomes.borrow().len()
    }
}
