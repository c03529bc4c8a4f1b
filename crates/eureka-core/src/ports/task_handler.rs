//! TaskHandler port - コミット後の後続処理（deferred work）の受け口
//!
//! # 設計原則
//! - コントローラはトランザクションのコミット確認後にのみ呼び出す
//! - ハンドラの失敗が元のトランザクションを巻き戻すことはない

use async_trait::async_trait;

use crate::domain::{TaskHandlerError, UserActionRequest};

#[async_trait]
pub trait TaskHandler: Send + Sync {
    async fn handle_task(&self, request: UserActionRequest) -> Result<(), TaskHandlerError>;
}
