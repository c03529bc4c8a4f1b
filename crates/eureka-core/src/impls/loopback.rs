//! LoopbackTransport - 同一プロセス内のサーバにつなぐ開発用トランスポート
//!
//! # 実装
//! - バッチは serde_json で一度エンコード／デコードし、ワイヤ形式を通す
//! - 完了は `tokio::task::spawn_local` で非同期に通知する
//!   （`LocalSet` の中で使うこと。外で呼ぶと spawn_local が panic する）

use std::cell::Cell;
use std::sync::Arc;

use tracing::debug;

use crate::app::rpc_service::ActionRpcService;
use crate::domain::{ActionRequest, TransportError};
use crate::ports::{ActionTransport, BatchCompletion, SessionCompletion};

pub struct LoopbackTransport {
    service: Arc<ActionRpcService>,
    user: String,
    offline: Cell<bool>,
}

impl LoopbackTransport {
    pub fn new(service: Arc<ActionRpcService>, user: impl Into<String>) -> Self {
        Self {
            service,
            user: user.into(),
            offline: Cell::new(false),
        }
    }

    /// While offline, every call completes with `Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.set(offline);
    }
}

fn encode(batch: &[ActionRequest]) -> Result<Vec<u8>, TransportError> {
    serde_json::to_vec(batch).map_err(|e| TransportError::Serialization(e.to_string()))
}

fn decode(bytes: &[u8]) -> Result<Vec<ActionRequest>, TransportError> {
    serde_json::from_slice(bytes).map_err(|e| TransportError::Serialization(e.to_string()))
}

async fn round_trip(service: &ActionRpcService, user: &str, wire: &[u8]) -> Result<Vec<ActionRequest>, TransportError> {
    let batch = decode(wire)?;
    let answered = service.execute(user, batch).await;
    decode(&encode(&answered)?)
}

impl ActionTransport for LoopbackTransport {
    fn execute(&self, batch: Vec<ActionRequest>, done: BatchCompletion) -> Result<(), TransportError> {
        let wire = encode(&batch)?;
        debug!(bytes = wire.len(), batch_size = batch.len(), "loopback execute");

        let offline = self.offline.get();
        let service = Arc::clone(&self.service);
        let user = self.user.clone();
        tokio::task::spawn_local(async move {
            let result = if offline {
                Err(TransportError::Unavailable("loopback is offline".into()))
            } else {
                round_trip(&service, &user, &wire).await
            };
            done(result);
        });
        Ok(())
    }

    fn establish_session(&self, done: SessionCompletion) -> Result<(), TransportError> {
        let offline = self.offline.get();
        let service = Arc::clone(&self.service);
        let user = self.user.clone();
        tokio::task::spawn_local(async move {
            let result = if offline {
                Err(TransportError::Unavailable("loopback is offline".into()))
            } else {
                service
                    .establish_session(&user)
                    .await
                    .map_err(|e| TransportError::Unavailable(e.to_string()))
            };
            done(result);
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::action::ServiceAction;
    use crate::app::builder::{Server, ServerBuilder};
    use crate::app::processor::ActionProcessor;
    use crate::app::session::SessionState;
    use crate::domain::{ExecutionError, FaultKind, Principal, RequestFailure, ServiceActionContext};
    use crate::impls::{InMemorySessionStore, InMemoryTransactionManager, StaticPrincipals};
    use crate::ports::{AllowAll, ExecutionStrategy, NoValidation, SystemClock, UlidGenerator};
    use crate::testing::CallbackLog;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::rc::Rc;
    use std::time::Duration;
    use tokio::task::LocalSet;

    struct Echo;

    #[async_trait]
    impl ExecutionStrategy<ServiceActionContext> for Echo {
        async fn execute(&self, context: &ServiceActionContext) -> Result<Value, ExecutionError> {
            Ok(context.param().cloned().unwrap_or(Value::Null))
        }
    }

    struct Fail;

    #[async_trait]
    impl ExecutionStrategy<ServiceActionContext> for Fail {
        async fn execute(&self, _context: &ServiceActionContext) -> Result<Value, ExecutionError> {
            Err(ExecutionError::new("nope"))
        }
    }

    fn server() -> Server {
        let action = |name: &str, exec: Arc<dyn ExecutionStrategy<ServiceActionContext>>| {
            ServiceAction::new(name)
                .with_validation(Arc::new(NoValidation))
                .with_authorization(Arc::new(AllowAll))
                .with_execution(exec)
        };
        ServerBuilder::new()
            .register("echo", action("echo", Arc::new(Echo)))
            .unwrap()
            .register("fail", action("fail", Arc::new(Fail)))
            .unwrap()
            .transactions(Arc::new(InMemoryTransactionManager::new()))
            .sessions(Arc::new(InMemorySessionStore::new(
                Arc::new(SystemClock),
                Arc::new(UlidGenerator::new(SystemClock)),
                0,
            )))
            .principals(Arc::new(StaticPrincipals::new().with_user(Principal::new("jdoe", 1))))
            .build()
            .unwrap()
    }

    /// Yields to the local tasks until nothing is pending.
    async fn settle(p: &ActionProcessor) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while (p.pending_count() > 0 || p.outstanding_batches() > 0 || p.session_state() == SessionState::Establishing)
            && tokio::time::Instant::now() < deadline
        {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    #[tokio::test]
    async fn requests_round_trip_through_the_server() {
        let server = server();
        LocalSet::new()
            .run_until(async move {
                let transport = Rc::new(LoopbackTransport::new(server.rpc(), "jdoe"));
                let p = ActionProcessor::new(transport, None);
                let log = CallbackLog::new();

                p.set_queue_requests(true);
                p.make_request("echo", Some(json!({"a": 1})), log.callback("echo"));
                p.make_request("fail", None, log.callback("fail"));
                p.fire_queued_requests();
                settle(&p).await;

                let outcomes = log.outcomes();
                assert_eq!(outcomes[0], ("echo", Ok(json!({"a": 1}))));
                assert!(matches!(&outcomes[1], ("fail", Err(RequestFailure::Fault(f))) if f.kind() == FaultKind::Execution));
            })
            .await;
    }

    #[tokio::test]
    async fn expired_session_is_recovered_transparently() {
        let server = server();
        let rpc = server.rpc();
        LocalSet::new()
            .run_until(async move {
                let transport = Rc::new(LoopbackTransport::new(Arc::clone(&rpc), "jdoe"));
                let p = ActionProcessor::new(transport, None);
                let log = CallbackLog::new();

                p.make_request("echo", Some(json!(1)), log.callback("first"));
                settle(&p).await;
                let SessionState::Active(first_session) = p.session_state() else {
                    panic!("expected an active session");
                };

                rpc.expire_session("jdoe").await;
                p.make_request("echo", Some(json!(2)), log.callback("second"));
                settle(&p).await;

                assert_eq!(log.outcomes(), vec![("first", Ok(json!(1))), ("second", Ok(json!(2)))]);
                assert!(matches!(p.session_state(), SessionState::Active(s) if s != first_session));
            })
            .await;
    }

    #[tokio::test]
    async fn offline_transport_fails_the_requests() {
        let server = server();
        LocalSet::new()
            .run_until(async move {
                let transport = Rc::new(LoopbackTransport::new(server.rpc(), "jdoe"));
                let p = ActionProcessor::new(transport.clone(), None);
                let log = CallbackLog::new();

                p.fire_queued_requests();
                settle(&p).await;
                transport.set_offline(true);
                p.make_request("echo", Some(json!(1)), log.callback("lost"));
                settle(&p).await;

                assert!(matches!(
                    log.outcomes().as_slice(),
                    [("lost", Err(RequestFailure::Transport(TransportError::Unavailable(_))))]
                ));
            })
            .await;
    }
}
