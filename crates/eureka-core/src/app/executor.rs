//! ActionExecutor - 1 件の envelope を実行する
//!
//! アクションキーをレジストリで解決し、PrincipalPopulator から取得した
//! principal でコンテキストを組み立て、`ServiceActionController` で実行します。
//! 結果（またはエラー）は envelope の response に書き戻します。
//!
//! # 実装
//! - エラーは `ActionFault` に変換（message と検証エラーのみ、原因の連鎖は送らない）
//! - 返す envelope から param は取り除く（クライアントが既に持っている）
//! - 未登録のキーは General

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error};

use crate::app::controller::ServiceActionController;
use crate::app::registry::ActionRegistry;
use crate::domain::{
    ActionError, ActionFault, ActionKey, ActionRequest, ActionResponse, ServiceActionContext,
};
use crate::ports::PrincipalPopulator;

pub struct ActionExecutor {
    registry: Arc<ActionRegistry<ServiceActionContext>>,
    controller: ServiceActionController,
    principals: Arc<dyn PrincipalPopulator>,
}

impl ActionExecutor {
    pub fn new(
        registry: Arc<ActionRegistry<ServiceActionContext>>,
        controller: ServiceActionController,
        principals: Arc<dyn PrincipalPopulator>,
    ) -> Self {
        Self {
            registry,
            controller,
            principals,
        }
    }

    /// Runs one envelope for `user` and returns it with its response set.
    pub async fn execute(&self, user: &str, mut request: ActionRequest) -> ActionRequest {
        let key = request.action_key().clone();
        debug!(action = %key, request_id = %request.id(), "starting action");

        let param = request.take_param();
        let response = match self.run(user, &key, param.clone()).await {
            Ok(value) => ActionResponse::Success(value),
            Err(err) => {
                let params = param.as_ref().map_or_else(|| "null parameters".to_string(), Value::to_string);
                error!(action = %key, user, params = %params, error = %err, "caught error while running action");
                ActionResponse::Fault(ActionFault::from(&err))
            }
        };

        debug!(action = %key, "finished action");
        request.respond(response)
    }

    async fn run(&self, user: &str, key: &ActionKey, param: Option<Value>) -> Result<Value, ActionError> {
        let action = self
            .registry
            .get(key)
            .ok_or_else(|| ActionError::general(format!("'{key}' is not an executable action")))?;
        let principal = self
            .principals
            .principal(user)
            .await
            .map_err(|err| ActionError::general_with(err.to_string(), err))?;

        let context = ServiceActionContext::new(key.clone(), param, principal);
        self.controller.execute(&context, action).await
    }
}
