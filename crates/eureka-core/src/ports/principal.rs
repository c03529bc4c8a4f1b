//! PrincipalPopulator port - ユーザ名から Principal を組み立てる

use async_trait::async_trait;

use crate::domain::Principal;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown user '{0}'")]
pub struct UnknownUser(pub String);

#[async_trait]
pub trait PrincipalPopulator: Send + Sync {
    async fn principal(&self, user: &str) -> Result<Principal, UnknownUser>;
}
