//! Execute trait - 型付きアクションの実行
//!
//! # Type erasure
//! - `Execute<A>` は `A::Param` を受け取り `A::Response` を返す
//! - `TypedExecution<A, E>` でラップして `ExecutionStrategy` (JSON) に変換
//! - param のデコード失敗は `DecodeParam<A>` が検証フェーズで ValidationError にする

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::action::Action;
use crate::app::action::ServiceAction;
use crate::app::builder::ServerBuilder;
use crate::app::registry::RegistryError;
use crate::domain::{ExecutionError, ServiceActionContext, ValidationError};
use crate::ports::{ExecutionStrategy, ValidationStrategy};

#[async_trait]
pub trait Execute<A: Action>: Send + Sync {
    async fn execute(&self, param: A::Param, context: &ServiceActionContext) -> Result<A::Response, ExecutionError>;
}

fn decode<A: Action>(context: &ServiceActionContext) -> Result<A::Param, serde_json::Error> {
    serde_json::from_value(context.param().cloned().unwrap_or(Value::Null))
}

/// Validation that the param decodes into `A::Param`.
pub struct DecodeParam<A> {
    _marker: PhantomData<fn() -> A>,
}

impl<A: Action> DecodeParam<A> {
    pub fn new() -> Self {
        Self { _marker: PhantomData }
    }
}

impl<A: Action> Default for DecodeParam<A> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<A: Action> ValidationStrategy<ServiceActionContext> for DecodeParam<A> {
    async fn validate(&self, context: &ServiceActionContext) -> Result<(), ValidationError> {
        decode::<A>(context)
            .map(|_| ())
            .map_err(|e| ValidationError::new(format!("invalid parameters for {}", A::KEY)).with_error("param", e.to_string()))
    }
}

pub struct TypedExecution<A, E> {
    inner: E,
    _marker: PhantomData<fn() -> A>,
}

impl<A: Action, E: Execute<A>> TypedExecution<A, E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<A: Action, E: Execute<A>> ExecutionStrategy<ServiceActionContext> for TypedExecution<A, E> {
    async fn execute(&self, context: &ServiceActionContext) -> Result<Value, ExecutionError> {
        let param = decode::<A>(context).map_err(|e| ExecutionError::with_cause("param decode", e))?;
        let response = self.inner.execute(param, context).await?;
        serde_json::to_value(response).map_err(|e| ExecutionError::with_cause("response encode", e))
    }
}

/// A service action named after `A::KEY` that decodes its param during
/// validation. Authorization still has to be configured.
pub fn service_action<A: Action, E: Execute<A> + 'static>(execute: E) -> ServiceAction {
    ServiceAction::new(A::KEY)
        .with_validation(Arc::new(DecodeParam::<A>::new()))
        .with_execution(Arc::new(TypedExecution::<A, E>::new(execute)))
}

impl ServerBuilder {
    /// Registers `action` under `A::KEY`.
    pub fn register_typed<A: Action>(self, action: ServiceAction) -> Result<Self, RegistryError> {
        self.register(A::KEY, action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::controller::ServiceActionController;
    use crate::domain::{ActionError, ActionKey, Principal};
    use crate::impls::InMemoryTransactionManager;
    use crate::ports::AllowAll;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize)]
    struct Greet {
        name: String,
    }

    impl Action for Greet {
        const KEY: &'static str = "greet";
        type Param = Greet;
        type Response = String;
    }

    struct Greeter;

    #[async_trait]
    impl Execute<Greet> for Greeter {
        async fn execute(&self, param: Greet, context: &ServiceActionContext) -> Result<String, ExecutionError> {
            Ok(format!("hello {} from {}", param.name, context.principal().account_id()))
        }
    }

    fn context(param: Value) -> ServiceActionContext {
        ServiceActionContext::new(ActionKey::new(Greet::KEY), Some(param), Principal::new("jdoe", 1))
    }

    #[tokio::test]
    async fn typed_execution_round_trips_json() {
        let strategy = TypedExecution::<Greet, _>::new(Greeter);
        let out = strategy.execute(&context(json!({"name": "ann"}))).await.unwrap();
        assert_eq!(out, json!("hello ann from jdoe"));
    }

    #[tokio::test]
    async fn bad_param_is_a_validation_error() {
        let action = service_action::<Greet, _>(Greeter).with_authorization(Arc::new(AllowAll));
        let controller = ServiceActionController::new(Arc::new(InMemoryTransactionManager::new()));

        let err = controller.execute(&context(json!({"nom": 1})), &action).await.unwrap_err();
        match err {
            ActionError::Validation(v) => assert!(v.errors().contains_key("param")),
            other => panic!("unexpected {other}"),
        }
    }
}
