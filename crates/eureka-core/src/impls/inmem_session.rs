//! InMemorySessionStore - 開発用のセッションストア
//!
//! ユーザーごとに最新のセッションを 1 つだけ保持します。
//! 新しいセッションを作ると古いものは無効になります。
//! 有効期限は Clock で判定します（ttl_secs = 0 は無期限）。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use crate::domain::SessionId;
use crate::ports::{Clock, IdGenerator, SessionStore, SessionStoreError};

struct Entry {
    session: SessionId,
    expires_at: Option<DateTime<Utc>>,
}

pub struct InMemorySessionStore {
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    ttl: Option<Duration>,
    sessions: Mutex<HashMap<String, Entry>>,
}

impl InMemorySessionStore {
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>, ttl_secs: u64) -> Self {
        let ttl = (ttl_secs > 0).then(|| Duration::seconds(i64::try_from(ttl_secs).unwrap_or(i64::MAX)));
        Self {
            clock,
            ids,
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, user: &str) -> Result<SessionId, SessionStoreError> {
        if user.is_empty() {
            return Err(SessionStoreError::Rejected(user.to_string()));
        }
        let session = self.ids.generate_session_id();
        let expires_at = self.ttl.map(|ttl| self.clock.now() + ttl);
        self.sessions
            .lock()
            .await
            .insert(user.to_string(), Entry { session, expires_at });
        Ok(session)
    }

    async fn validate(&self, user: &str, session: Option<&SessionId>) -> bool {
        let Some(session) = session else {
            return false;
        };
        let now = self.clock.now();
        let sessions = self.sessions.lock().await;
        match sessions.get(user) {
            Some(entry) => &entry.session == session && entry.expires_at.is_none_or(|at| now < at),
            None => false,
        }
    }

    async fn invalidate(&self, user: &str) {
        self.sessions.lock().await.remove(user);
    }
}
