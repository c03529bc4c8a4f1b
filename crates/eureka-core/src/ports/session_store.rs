//! SessionStore port - サーバ側のセッション管理
//!
//! ユーザごとに有効なセッションは 1 つ。新しく発行すると古いものは無効になる。

use async_trait::async_trait;

use crate::domain::SessionId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionStoreError {
    #[error("user '{0}' may not open a session")]
    Rejected(String),
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Mints a new session for `user`, replacing any previous one.
    async fn create(&self, user: &str) -> Result<SessionId, SessionStoreError>;

    /// Is `session` the live session of `user`? A missing token never is.
    async fn validate(&self, user: &str, session: Option<&SessionId>) -> bool;

    async fn invalidate(&self, user: &str);
}
