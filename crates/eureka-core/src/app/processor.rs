//! Action Processor - クライアント側のリクエストバッチングとセッション回復
//!
//! 呼び出し側は `make_request` でアクションを投入し、結果はコールバックで
//! 受け取ります。プロセッサはリクエストをバッチにまとめて送信し、
//! セッションが失われた場合は透過的に再確立して保留中のリクエストを
//! 再送します。
//!
//! # 設計原則
//!
//! - シングルスレッド前提: 状態は `Rc<RefCell<..>>` で共有し、ロックは使わない
//! - 完了コールバックの中から再入されても壊れないよう、`RefCell` の借用を
//!   保持したままユーザーコールバックを呼ばない
//! - セッション確立は同時に高々 1 つ。送信済みバッチが残っている間は確立しない
//! - 保留インデックス（pending）はリクエスト ID 順 = 投入順
//!
//! # 実装
//!
//! - pending: `BTreeMap<RequestId, RequestInfo>`（再送用）
//! - queue: 次のフラッシュで送る ID のリスト
//! - session: `SessionMachine`（状態 + 送信中バッチ数）

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::app::callback;
use crate::app::session::{SessionMachine, SessionState};
use crate::config::ClientConfig;
use crate::domain::{ActionKey, ActionRequest, RequestFailure, RequestId, SessionId, TransportError};
use crate::ports::{ActionTransport, BatchCompletion, BatchOutcome, ItemOutcome, SessionCompletion};

/// Completion of one request. Invoked at most once.
pub type ActionCallback = Box<dyn FnOnce(Result<Value, RequestFailure>)>;

/// Notified on every session establishment success or failure.
pub type SessionCallback = Box<dyn FnMut(Result<SessionId, TransportError>)>;

struct RequestInfo {
    request: ActionRequest,
    callback: Option<ActionCallback>,
}

impl RequestInfo {
    fn complete(self, result: Result<Value, RequestFailure>) {
        let id = self.request.id();
        match self.callback {
            Some(cb) => {
                callback::isolate("action", move || cb(result));
            }
            None => debug!(request_id = %id, "request completed without callback"),
        }
    }
}

struct ProcessorState {
    next_id: RequestId,
    pending: BTreeMap<RequestId, RequestInfo>,
    queue: Vec<RequestId>,
    hold: bool,
    session: SessionMachine,
}

impl ProcessorState {
    fn allocate_id(&mut self) -> RequestId {
        let id = self.next_id;
        self.next_id = id.next();
        id
    }

    /// Copies of the pending envelopes for `ids`, stamped with `session`.
    fn stamp(&self, ids: impl IntoIterator<Item = RequestId>, session: SessionId) -> Vec<ActionRequest> {
        ids.into_iter()
            .filter_map(|id| self.pending.get(&id))
            .map(|info| info.request.stamped(session))
            .collect()
    }
}

struct Shared {
    transport: Rc<dyn ActionTransport>,
    session_callback: RefCell<Option<SessionCallback>>,
    state: RefCell<ProcessorState>,
}

/// Client-side batching processor.
///
/// Cloning is cheap and yields a handle to the same processor. Completions
/// hold only a weak reference, so dropping every handle abandons the
/// requests still in flight without calling their callbacks.
#[derive(Clone)]
pub struct ActionProcessor {
    shared: Rc<Shared>,
}

impl ActionProcessor {
    pub fn new(transport: Rc<dyn ActionTransport>, session_callback: Option<SessionCallback>) -> Self {
        Self {
            shared: Rc::new(Shared {
                transport,
                session_callback: RefCell::new(session_callback),
                state: RefCell::new(ProcessorState {
                    next_id: RequestId::FIRST,
                    pending: BTreeMap::new(),
                    queue: Vec::new(),
                    hold: false,
                    session: SessionMachine::new(),
                }),
            }),
        }
    }

    /// Without `hold_requests`, session establishment starts right away.
    pub fn from_config(
        transport: Rc<dyn ActionTransport>,
        session_callback: Option<SessionCallback>,
        config: &ClientConfig,
    ) -> Self {
        let processor = Self::new(transport, session_callback);
        processor.set_queue_requests(config.hold_requests);
        processor
    }

    /// While `hold` is set, new requests accumulate until
    /// [`fire_queued_requests`](Self::fire_queued_requests) is called.
    /// Releasing the hold flushes the queue.
    pub fn set_queue_requests(&self, hold: bool) {
        self.shared.state.borrow_mut().hold = hold;
        if !hold {
            self.shared.fire();
        }
    }

    /// Queues an action and returns the id allocated for it.
    ///
    /// Unless requests are held, the queue is flushed right away.
    pub fn make_request(
        &self,
        action_key: impl Into<ActionKey>,
        param: Option<Value>,
        callback: Option<ActionCallback>,
    ) -> RequestId {
        let (id, hold) = {
            let mut state = self.shared.state.borrow_mut();
            let id = state.allocate_id();
            let request = ActionRequest::new(id, action_key.into(), param);
            debug!(request_id = %id, action = %request.action_key(), "request queued");
            state.pending.insert(id, RequestInfo { request, callback });
            state.queue.push(id);
            (id, state.hold)
        };
        if !hold {
            self.shared.fire();
        }
        id
    }

    /// Sends everything queued as one batch, or starts session
    /// establishment when there is no session.
    pub fn fire_queued_requests(&self) {
        self.shared.fire();
    }

    pub fn session_state(&self) -> SessionState {
        self.shared.state.borrow().session.state().clone()
    }

    /// Requests sent or queued that have not completed yet.
    pub fn pending_count(&self) -> usize {
        self.shared.state.borrow().pending.len()
    }

    pub fn queued_count(&self) -> usize {
        self.shared.state.borrow().queue.len()
    }

    pub fn outstanding_batches(&self) -> usize {
        self.shared.state.borrow().session.outstanding()
    }

    pub fn is_holding(&self) -> bool {
        self.shared.state.borrow().hold
    }
}

impl Shared {
    fn fire(self: &Rc<Self>) {
        let batch = {
            let mut state = self.state.borrow_mut();
            let session = state.session.active().copied();
            let Some(session) = session else {
                drop(state);
                self.establish_session();
                return;
            };
            let ids = std::mem::take(&mut state.queue);
            state.stamp(ids, session)
        };
        if !batch.is_empty() {
            self.send(batch);
        }
    }

    fn send(self: &Rc<Self>, batch: Vec<ActionRequest>) {
        let sent: Vec<RequestId> = batch.iter().map(ActionRequest::id).collect();
        let outstanding = {
            let mut state = self.state.borrow_mut();
            state.session.batch_sent();
            state.session.outstanding()
        };
        debug!(batch_size = sent.len(), outstanding, "sending batch");

        let weak = Rc::downgrade(self);
        let ids = sent.clone();
        let done: BatchCompletion = Box::new(move |result| {
            if let Some(shared) = weak.upgrade() {
                shared.on_batch_complete(&ids, result);
            }
        });
        if let Err(err) = self.transport.execute(batch, done) {
            warn!(error = %err, batch_size = sent.len(), "batch could not be sent");
            self.on_batch_complete(&sent, Err(err));
        }
    }

    fn on_batch_complete(self: &Rc<Self>, sent: &[RequestId], result: Result<Vec<ActionRequest>, TransportError>) {
        self.state.borrow_mut().session.batch_returned();

        match BatchOutcome::from(result) {
            BatchOutcome::Delivered(items) => {
                debug!(batch_size = items.len(), "batch returned");
                for (info, result) in self.reconcile(items) {
                    info.complete(result);
                }
            }
            BatchOutcome::SessionFault => {
                // the requests stay pending and are replayed on the next session
                if self.state.borrow_mut().session.invalidate() {
                    info!(batch_size = sent.len(), "session invalidated by batch failure");
                }
            }
            BatchOutcome::Failed(err) => {
                let failed: Vec<RequestInfo> = {
                    let mut state = self.state.borrow_mut();
                    sent.iter().filter_map(|id| state.pending.remove(id)).collect()
                };
                warn!(error = %err, requests = failed.len(), "batch failed");
                for info in failed {
                    info.complete(Err(RequestFailure::Transport(err.clone())));
                }
            }
        }

        let no_session = self.state.borrow().session.active().is_none();
        if no_session {
            self.establish_session();
        }
    }

    /// Removes the answered requests from the pending index and pairs each
    /// with its result. Callbacks are run by the caller after the borrow ends.
    fn reconcile(&self, items: Vec<ActionRequest>) -> Vec<(RequestInfo, Result<Value, RequestFailure>)> {
        let mut state = self.state.borrow_mut();
        let mut completions = Vec::with_capacity(items.len());

        for item in items {
            let id = item.id();
            let result = match ItemOutcome::from(item.into_response()) {
                ItemOutcome::SessionFault => {
                    // not looked up: the request stays pending for replay
                    if state.session.invalidate() {
                        info!(request_id = %id, "session invalidated by item response");
                    }
                    continue;
                }
                ItemOutcome::Success(value) => Ok(value),
                ItemOutcome::Failure(fault) => Err(RequestFailure::Fault(fault)),
            };
            match state.pending.remove(&id) {
                Some(info) => completions.push((info, result)),
                None => debug!(request_id = %id, "dropping response for unknown request"),
            }
        }
        completions
    }

    fn establish_session(self: &Rc<Self>) {
        {
            let mut state = self.state.borrow_mut();
            if let Err(reason) = state.session.begin_establishing() {
                debug!(%reason, "session establishment deferred");
                return;
            }
            // everything pending is replayed once the session is up
            state.queue.clear();
        }
        info!("establishing session");

        let weak = Rc::downgrade(self);
        let done: SessionCompletion = Box::new(move |result| {
            if let Some(shared) = weak.upgrade() {
                shared.on_session_result(result);
            }
        });
        if let Err(err) = self.transport.establish_session(done) {
            self.on_session_result(Err(err));
        }
    }

    fn on_session_result(self: &Rc<Self>, result: Result<SessionId, TransportError>) {
        match result {
            Ok(session) => {
                let replay = {
                    let mut state = self.state.borrow_mut();
                    if let Err(err) = state.session.established(session) {
                        warn!(%session, error = %err, "ignoring unexpected session");
                        return;
                    }
                    state.queue.clear();
                    let ids: Vec<RequestId> = state.pending.keys().copied().collect();
                    state.stamp(ids, session)
                };
                info!(%session, replay = replay.len(), "session established");
                self.notify_session(Ok(session));
                if !replay.is_empty() {
                    self.send(replay);
                }
            }
            Err(err) => {
                if let Err(reason) = self.state.borrow_mut().session.establishment_failed() {
                    warn!(%reason, "establishment failure out of sequence");
                }
                warn!(error = %err, "session establishment failed");
                self.notify_session(Err(err));
            }
        }
    }

    fn notify_session(&self, result: Result<SessionId, TransportError>) {
        // taken out so the listener may re-enter the processor
        let taken = self.session_callback.borrow_mut().take();
        if let Some(mut cb) = taken {
            callback::isolate("session", || cb(result));
            let mut slot = self.session_callback.borrow_mut();
            if slot.is_none() {
                *slot = Some(cb);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ActionFault, ActionResponse};
    use crate::testing::{CallbackLog, RecordingTransport};
    use serde_json::json;
    use std::cell::Cell;
    use ulid::Ulid;

    fn sid() -> SessionId {
        SessionId::from_ulid(Ulid::new())
    }

    fn processor(transport: &Rc<RecordingTransport>) -> ActionProcessor {
        ActionProcessor::new(transport.clone(), None)
    }

    fn session_log() -> (Rc<RefCell<Vec<Result<SessionId, TransportError>>>>, SessionCallback) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        (log, Box::new(move |r| sink.borrow_mut().push(r)))
    }

    fn ids(batch: &[ActionRequest]) -> Vec<u64> {
        batch.iter().map(|r| r.id().get()).collect()
    }

    fn ok(value: Value) -> impl Fn(&ActionRequest) -> ActionResponse {
        move |_| ActionResponse::Success(value.clone())
    }

    #[test]
    fn held_requests_go_out_in_one_batch_after_establishment() {
        let transport = RecordingTransport::new();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let listener: SessionCallback = Box::new(move |_| {
            counter.set(counter.get() + 1);
            panic!("Naughty session callback");
        });
        let p = ActionProcessor::new(transport.clone(), Some(listener));
        let log = CallbackLog::new();

        p.set_queue_requests(true);
        p.make_request("a1", None, log.naughty("a1"));
        p.make_request("a2", Some(json!({"n": 2})), log.naughty("a2"));
        assert_eq!(transport.session_requests(), 0);

        p.fire_queued_requests();
        assert_eq!(transport.session_requests(), 1);
        assert_eq!(p.session_state(), SessionState::Establishing);

        let session = sid();
        transport.complete_session(0, Ok(session));
        assert_eq!(calls.get(), 1);

        let batch = transport.batch(0);
        assert_eq!(ids(&batch), vec![1, 2]);
        assert!(batch.iter().all(|r| r.session_id() == Some(&session)));

        // panicking callbacks do not keep siblings from running
        transport.reply(0, ok(json!("done")));
        assert_eq!(log.count("a1"), 1);
        assert_eq!(log.count("a2"), 1);
        assert_eq!(p.pending_count(), 0);
        assert_eq!(p.outstanding_batches(), 0);
    }

    #[test]
    fn responses_are_matched_by_id_not_position() {
        let transport = RecordingTransport::new();
        let p = processor(&transport);
        let log = CallbackLog::new();

        p.set_queue_requests(true);
        p.make_request("first", None, log.callback("first"));
        p.make_request("second", None, log.callback("second"));
        p.fire_queued_requests();
        transport.complete_session(0, Ok(sid()));

        let mut reversed = transport.batch(0);
        reversed.reverse();
        let answered = reversed
            .into_iter()
            .map(|r| {
                let value = json!(r.action_key().as_str());
                r.respond(ActionResponse::Success(value))
            })
            .collect();
        transport.complete_batch(0, Ok(answered));

        let outcomes = log.outcomes();
        assert_eq!(outcomes.len(), 2);
        for (label, result) in outcomes {
            assert_eq!(result, Ok(json!(label)));
        }
    }

    #[test]
    fn item_session_fault_replays_after_reestablishment() {
        let transport = RecordingTransport::new();
        let (sessions, listener) = session_log();
        let p = ActionProcessor::new(transport.clone(), Some(listener));
        let log = CallbackLog::new();

        p.make_request("a", None, log.callback("a"));
        transport.complete_session(0, Ok(sid()));
        assert_eq!(transport.batch_count(), 1);

        transport.reply(0, |_| ActionResponse::Fault(ActionFault::session()));
        assert_eq!(log.len(), 0);
        assert_eq!(p.pending_count(), 1);
        assert_eq!(transport.session_requests(), 2);

        // the first attempt fails; nothing is retried until the next flush
        transport.complete_session(1, Err(TransportError::Unavailable("down".into())));
        assert!(matches!(sessions.borrow().last(), Some(Err(_))));
        assert_eq!(p.session_state(), SessionState::NoSession);
        assert_eq!(transport.session_requests(), 2);

        p.fire_queued_requests();
        assert_eq!(transport.session_requests(), 3);
        let fresh = sid();
        transport.complete_session(2, Ok(fresh));

        let replay = transport.batch(1);
        assert_eq!(ids(&replay), vec![1]);
        assert_eq!(replay[0].session_id(), Some(&fresh));

        transport.reply(1, ok(json!(1)));
        assert_eq!(log.outcomes(), vec![("a", Ok(json!(1)))]);
    }

    #[test]
    fn reestablishment_waits_for_the_last_outstanding_batch() {
        let transport = RecordingTransport::new();
        let p = processor(&transport);
        let log = CallbackLog::new();

        p.set_queue_requests(true);
        p.fire_queued_requests();
        transport.complete_session(0, Ok(sid()));

        for label in ["r1", "r2", "r3", "r4"] {
            p.make_request(label, None, log.callback(label));
            p.fire_queued_requests();
        }
        assert_eq!(transport.batch_count(), 4);
        assert_eq!(p.outstanding_batches(), 4);

        let expired = |_: &ActionRequest| ActionResponse::Fault(ActionFault::session());
        transport.reply(0, expired);
        transport.reply(3, expired);
        assert_eq!(transport.session_requests(), 1);

        transport.reply(2, ok(json!("r3")));
        assert_eq!(log.outcomes(), vec![("r3", Ok(json!("r3")))]);
        assert_eq!(transport.session_requests(), 1);

        transport.reply(1, expired);
        assert_eq!(transport.session_requests(), 2);
        assert_eq!(p.outstanding_batches(), 0);

        transport.complete_session(1, Ok(sid()));
        assert_eq!(ids(&transport.batch(4)), vec![1, 2, 4]);
    }

    #[test]
    fn batch_session_failure_keeps_requests_pending() {
        let transport = RecordingTransport::new();
        let p = processor(&transport);
        let log = CallbackLog::new();

        p.make_request("a", None, log.callback("a"));
        p.make_request("b", None, log.callback("b"));
        transport.complete_session(0, Ok(sid()));
        assert_eq!(ids(&transport.batch(0)), vec![1, 2]);

        transport.complete_batch(0, Err(TransportError::SessionExpired));
        assert_eq!(log.len(), 0);
        assert_eq!(p.pending_count(), 2);
        assert_eq!(transport.session_requests(), 2);

        transport.complete_session(1, Ok(sid()));
        assert_eq!(ids(&transport.batch(1)), vec![1, 2]);
    }

    #[test]
    fn transport_failure_reaches_every_request_of_the_batch() {
        let transport = RecordingTransport::new();
        let p = processor(&transport);
        let log = CallbackLog::new();

        p.set_queue_requests(true);
        p.make_request("a", None, log.callback("a"));
        p.make_request("b", None, log.callback("b"));
        p.fire_queued_requests();
        transport.complete_session(0, Ok(sid()));

        let err = TransportError::Unavailable("connection reset".into());
        transport.complete_batch(0, Err(err.clone()));

        assert_eq!(
            log.outcomes(),
            vec![
                ("a", Err(RequestFailure::Transport(err.clone()))),
                ("b", Err(RequestFailure::Transport(err))),
            ]
        );
        assert_eq!(p.pending_count(), 0);
        // the session survives an ordinary failure
        assert_eq!(transport.session_requests(), 1);
    }

    #[test]
    fn synchronous_send_failure_completes_the_batch() {
        let transport = RecordingTransport::new();
        let p = processor(&transport);
        let log = CallbackLog::new();

        p.make_request("a", None, log.callback("a"));
        transport.reject_next_execute(TransportError::Serialization("bad param".into()));
        transport.complete_session(0, Ok(sid()));

        assert_eq!(
            log.outcomes(),
            vec![("a", Err(RequestFailure::Transport(TransportError::Serialization("bad param".into()))))]
        );
        assert_eq!(p.outstanding_batches(), 0);
        assert_eq!(p.pending_count(), 0);
    }

    #[test]
    fn faults_reach_the_failure_path() {
        let transport = RecordingTransport::new();
        let p = processor(&transport);
        let log = CallbackLog::new();

        p.make_request("a", None, log.callback("a"));
        transport.complete_session(0, Ok(sid()));
        transport.reply(0, |_| ActionResponse::Fault(ActionFault::execution("boom")));

        assert_eq!(
            log.outcomes(),
            vec![("a", Err(RequestFailure::Fault(ActionFault::execution("boom"))))]
        );
    }

    #[test]
    fn requests_without_callbacks_complete_quietly() {
        let transport = RecordingTransport::new();
        let p = processor(&transport);

        p.make_request("a", None, None);
        transport.complete_session(0, Ok(sid()));
        transport.reply(0, ok(json!(null)));
        assert_eq!(p.pending_count(), 0);

        p.make_request("b", None, None);
        transport.complete_batch(1, Err(TransportError::Unavailable("down".into())));
        assert_eq!(p.pending_count(), 0);
    }

    #[test]
    fn synchronous_establishment_failure_notifies_listener() {
        let transport = RecordingTransport::new();
        let (sessions, listener) = session_log();
        let p = ActionProcessor::new(transport.clone(), Some(listener));
        let log = CallbackLog::new();

        transport.reject_next_establish(TransportError::Unavailable("offline".into()));
        p.make_request("a", None, log.callback("a"));
        assert_eq!(
            sessions.borrow().as_slice(),
            &[Err(TransportError::Unavailable("offline".into()))]
        );
        assert_eq!(p.session_state(), SessionState::NoSession);

        p.fire_queued_requests();
        assert_eq!(transport.session_requests(), 1);
        // impatient flushes while establishing do nothing
        p.fire_queued_requests();
        p.fire_queued_requests();
        assert_eq!(transport.session_requests(), 1);

        transport.complete_session(0, Ok(sid()));
        assert_eq!(ids(&transport.batch(0)), vec![1]);

        // a response for an id nobody is waiting on is dropped
        let stray = ActionRequest::new(RequestId::new(99), ActionKey::new("a"), None)
            .respond(ActionResponse::Success(json!(0)));
        transport.complete_batch(0, Ok(vec![stray]));
        assert_eq!(log.len(), 0);
        assert_eq!(p.pending_count(), 1);
    }

    #[test]
    fn flush_without_session_establishes_even_when_queue_is_empty() {
        let transport = RecordingTransport::new();
        let p = processor(&transport);

        p.fire_queued_requests();
        assert_eq!(transport.session_requests(), 1);
        transport.complete_session(0, Ok(sid()));
        assert_eq!(transport.batch_count(), 0);

        // with a session and nothing queued, a flush sends nothing
        p.fire_queued_requests();
        assert_eq!(transport.batch_count(), 0);
    }

    #[test]
    fn replay_ignores_the_hold_flag() {
        let transport = RecordingTransport::new();
        let p = processor(&transport);

        p.set_queue_requests(true);
        p.make_request("a", None, None);
        p.fire_queued_requests();
        transport.complete_session(0, Ok(sid()));
        assert_eq!(transport.batch_count(), 1);
        assert!(p.is_holding());
    }

    #[test]
    fn callbacks_may_reenter_the_processor() {
        let transport = RecordingTransport::new();
        let p = processor(&transport);
        let log = CallbackLog::new();

        let inner = p.clone();
        let follow_up = log.callback("follow-up");
        p.make_request(
            "a",
            None,
            Some(Box::new(move |_| {
                inner.make_request("b", None, follow_up);
            })),
        );
        transport.complete_session(0, Ok(sid()));
        transport.reply(0, ok(json!(1)));

        assert_eq!(transport.batch_count(), 2);
        assert_eq!(ids(&transport.batch(1)), vec![2]);
        transport.reply(1, ok(json!(2)));
        assert_eq!(log.outcomes(), vec![("follow-up", Ok(json!(2)))]);
    }

    #[test]
    fn missing_item_response_is_a_null_success() {
        let transport = RecordingTransport::new();
        let p = processor(&transport);
        let log = CallbackLog::new();

        p.make_request("a", None, log.callback("a"));
        transport.complete_session(0, Ok(sid()));
        let unanswered = transport.batch(0);
        transport.complete_batch(0, Ok(unanswered));
        assert_eq!(log.outcomes(), vec![("a", Ok(Value::Null))]);
    }

    #[test]
    fn releasing_the_hold_flushes_the_queue() {
        let transport = RecordingTransport::new();
        let p = processor(&transport);
        let log = CallbackLog::new();

        p.set_queue_requests(true);
        p.make_request("getFoo", None, log.callback("g1"));
        p.make_request("getFoo", None, log.callback("g2"));
        assert_eq!(transport.session_requests(), 0);

        p.set_queue_requests(false);
        assert_eq!(transport.session_requests(), 1);
        transport.complete_session(0, Ok(sid()));

        assert_eq!(transport.batch_count(), 1);
        assert_eq!(ids(&transport.batch(0)), vec![1, 2]);
        transport.reply(0, |r| ActionResponse::Success(json!(r.id().get())));
        assert_eq!(log.outcomes(), vec![("g1", Ok(json!(1))), ("g2", Ok(json!(2)))]);
    }

    #[test]
    fn releasing_the_hold_with_an_active_session_sends_one_batch() {
        let transport = RecordingTransport::new();
        let p = processor(&transport);
        p.fire_queued_requests();
        transport.complete_session(0, Ok(sid()));
        assert_eq!(transport.batch_count(), 0);

        p.set_queue_requests(true);
        p.make_request("getFoo", None, None);
        p.make_request("getFoo", None, None);
        assert_eq!(transport.batch_count(), 0);

        p.set_queue_requests(false);
        assert_eq!(transport.batch_count(), 1);
        assert_eq!(ids(&transport.batch(0)), vec![1, 2]);
        assert_eq!(p.queued_count(), 0);
    }

    #[test]
    fn from_config_without_hold_starts_establishing() {
        let transport = RecordingTransport::new();
        let config = ClientConfig { hold_requests: false };
        let p = ActionProcessor::from_config(transport.clone(), None, &config);
        assert_eq!(transport.session_requests(), 1);
        assert_eq!(p.session_state(), SessionState::Establishing);

        let held = ActionProcessor::from_config(transport.clone(), None, &ClientConfig { hold_requests: true });
        assert!(held.is_holding());
        assert_eq!(transport.session_requests(), 1);
    }

    #[test]
    fn ids_increase_per_request() {
        let transport = RecordingTransport::new();
        let p = processor(&transport);
        p.set_queue_requests(true);
        let a = p.make_request("a", None, None);
        let b = p.make_request("b", None, None);
        assert!(a < b);
        assert_eq!(p.queued_count(), 2);
    }
}
