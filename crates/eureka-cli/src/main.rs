use std::cell::RefCell;
use std::error::Error;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::task::LocalSet;
use tokio::time::{Duration, Instant, sleep};
use tracing::info;

use eureka_core::app::{
    ActionCallback, ActionProcessor, AsyncAction, Server, ServerBuilder, ServiceAction, SessionCallback, WorkerCounts,
};
use eureka_core::config::EurekaConfig;
use eureka_core::domain::{
    AsyncActionContext, ExecutionError, Principal, RequestFailure, ServiceActionContext, SessionId, TransportError,
    UserActionRequest, ValidationError,
};
use eureka_core::impls::{
    InMemorySessionStore, InMemoryTaskQueue, InMemoryTransactionManager, LoopbackTransport, QueueTaskHandler,
    StaticPrincipals,
};
use eureka_core::logging::init_logging;
use eureka_core::ports::{
    AllowAll, ExecutionOutput, ExecutionStrategy, NoValidation, SystemClock, TaskHandlerExecutionStrategy,
    TaskQueue, UlidGenerator, ValidationStrategy,
};
use eureka_core::typed::{Action, Execute, service_action};

const USER: &str = "demo";

#[derive(Debug, Serialize, Deserialize)]
struct GetFoo {
    name: String,
}

impl Action for GetFoo {
    const KEY: &'static str = "getFoo";
    type Param = GetFoo;
    type Response = String;
}

struct GetFooExecution;

#[async_trait]
impl Execute<GetFoo> for GetFooExecution {
    async fn execute(&self, param: GetFoo, context: &ServiceActionContext) -> Result<String, ExecutionError> {
        Ok(format!("foo for {} (asked by {})", param.name, context.principal().account_id()))
    }
}

/// Posts an activity; followers are notified later.
struct PostActivity;

#[async_trait]
impl TaskHandlerExecutionStrategy<ServiceActionContext> for PostActivity {
    async fn execute(&self, context: &ServiceActionContext) -> Result<ExecutionOutput, ExecutionError> {
        let body = context.param().cloned().unwrap_or(Value::Null);
        let notify = UserActionRequest::new(
            "notifyFollowers",
            Some(context.principal().account_id().to_string()),
            Some(body.clone()),
        );
        Ok(ExecutionOutput::new(json!({ "posted": body })).with_task(notify))
    }
}

struct NotifyFollowers {
    sent: Arc<AtomicU32>,
}

#[async_trait]
impl ExecutionStrategy<AsyncActionContext> for NotifyFollowers {
    async fn execute(&self, context: &AsyncActionContext) -> Result<Value, ExecutionError> {
        self.sent.fetch_add(1, Ordering::Relaxed);
        info!(activity = ?context.param(), "followers notified");
        Ok(Value::Null)
    }
}

struct RequireTitle;

#[async_trait]
impl ValidationStrategy<ServiceActionContext> for RequireTitle {
    async fn validate(&self, context: &ServiceActionContext) -> Result<(), ValidationError> {
        match context.param().and_then(|p| p.get("title")) {
            Some(_) => Ok(()),
            None => Err(ValidationError::new("activity is incomplete").with_error("title", "required")),
        }
    }
}

fn build_server(config: &EurekaConfig, queue: Arc<InMemoryTaskQueue>, sent: Arc<AtomicU32>) -> Result<Server, Box<dyn Error>> {
    let sessions = InMemorySessionStore::new(
        Arc::new(SystemClock),
        Arc::new(UlidGenerator::new(SystemClock)),
        config.server.session_ttl_secs,
    );

    let server = ServerBuilder::new()
        .register_typed::<GetFoo>(service_action::<GetFoo, _>(GetFooExecution).with_authorization(Arc::new(AllowAll)))?
        .register(
            "postActivity",
            ServiceAction::new("postActivity")
                .with_validation(Arc::new(NoValidation))
                .with_authorization(Arc::new(AllowAll))
                .with_deferring_execution(Arc::new(PostActivity))
                .with_task_handler(Arc::new(QueueTaskHandler::new(queue))),
        )?
        .register(
            "failValidation",
            ServiceAction::new("failValidation")
                .with_validation(Arc::new(RequireTitle))
                .with_authorization(Arc::new(AllowAll))
                .with_deferring_execution(Arc::new(PostActivity)),
        )?
        .register_async(
            "notifyFollowers",
            AsyncAction::new("notifyFollowers")
                .with_validation(Arc::new(NoValidation))
                .with_execution(Arc::new(NotifyFollowers { sent })),
        )?
        .expect_actions(&[GetFoo::KEY, "postActivity", "failValidation", "notifyFollowers"])
        .transactions(Arc::new(InMemoryTransactionManager::new()))
        .sessions(Arc::new(sessions))
        .principals(Arc::new(StaticPrincipals::new().with_user(Principal::new(USER, 1))))
        .build()?;
    Ok(server)
}

#[derive(Debug, Serialize)]
struct Outcome {
    request: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct Report {
    outcomes: Vec<Outcome>,
    sessions: Vec<String>,
    followers_notified: u32,
    workers: WorkerCounts,
}

type Outcomes = Rc<RefCell<Vec<Outcome>>>;

fn record(outcomes: &Outcomes, request: &'static str, result: Result<Value, RequestFailure>) {
    let outcome = match result {
        Ok(value) => Outcome { request, result: Some(value), error: None },
        Err(err) => Outcome { request, result: None, error: Some(err.to_string()) },
    };
    outcomes.borrow_mut().push(outcome);
}

fn callback(outcomes: &Outcomes, request: &'static str) -> Option<ActionCallback> {
    let outcomes = Rc::clone(outcomes);
    Some(Box::new(move |result| record(&outcomes, request, result)))
}

/// Waits until every request has completed.
async fn settle(processor: &ActionProcessor) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while processor.pending_count() > 0 && Instant::now() < deadline {
        sleep(Duration::from_millis(5)).await;
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = EurekaConfig::from_env()?;
    init_logging(&config.log);
    info!(environment = %config.environment, "starting eureka demo");

    let queue = Arc::new(InMemoryTaskQueue::new());
    let sent = Arc::new(AtomicU32::new(0));
    let server = build_server(&config, queue.clone(), sent.clone())?;
    let workers = server.spawn_workers(queue.clone(), &config.server);
    let rpc = server.rpc();

    let outcomes: Outcomes = Rc::new(RefCell::new(Vec::new()));
    let sessions = Rc::new(RefCell::new(Vec::new()));

    LocalSet::new()
        .run_until({
            let outcomes = Rc::clone(&outcomes);
            let sessions = Rc::clone(&sessions);
            async move {
                let transport = Rc::new(LoopbackTransport::new(Arc::clone(&rpc), USER));
                let listener: SessionCallback = {
                    let sessions = Rc::clone(&sessions);
                    Box::new(move |result: Result<SessionId, TransportError>| {
                        let entry = match result {
                            Ok(session) => format!("established {session}"),
                            Err(err) => format!("failed: {err}"),
                        };
                        sessions.borrow_mut().push(entry);
                    })
                };
                let processor = ActionProcessor::from_config(transport, Some(listener), &config.client);

                // one batch once the session is up
                processor.set_queue_requests(true);
                let foo = Rc::clone(&outcomes);
                processor.request::<GetFoo>(&GetFoo { name: "eureka".into() }, move |r| {
                    record(&foo, "getFoo", r.map(Value::from))
                })?;
                processor.make_request("postActivity", Some(json!({"title": "hello"})), callback(&outcomes, "postActivity"));
                processor.make_request("failValidation", Some(json!({})), callback(&outcomes, "failValidation"));
                processor.set_queue_requests(false);
                settle(&processor).await;

                // the server forgets the session; the next request recovers on its own
                rpc.expire_session(USER).await;
                processor.make_request(GetFoo::KEY, Some(json!({"name": "again"})), callback(&outcomes, "getFoo (after expiry)"));
                settle(&processor).await;
                Ok::<_, Box<dyn Error>>(())
            }
        })
        .await?;

    // deferred work runs on the worker pool
    let deadline = Instant::now() + Duration::from_secs(5);
    while workers.counts().succeeded < 1 && Instant::now() < deadline {
        sleep(Duration::from_millis(10)).await;
    }
    let counts = workers.counts();
    queue.close().await;
    workers.shutdown_and_join().await;

    let report = Report {
        outcomes: outcomes.take(),
        sessions: sessions.take(),
        followers_notified: sent.load(Ordering::Relaxed),
        workers: counts,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
