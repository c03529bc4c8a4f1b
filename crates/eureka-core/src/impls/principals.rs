use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::Principal;
use crate::ports::{PrincipalPopulator, UnknownUser};

/// Fixed user directory, keyed by account id.
#[derive(Debug, Clone, Default)]
pub struct StaticPrincipals {
    users: HashMap<String, Principal>,
}

impl StaticPrincipals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, principal: Principal) -> Self {
        self.users.insert(principal.account_id().to_string(), principal);
        self
    }
}

#[async_trait]
impl PrincipalPopulator for StaticPrincipals {
    async fn principal(&self, user: &str) -> Result<Principal, UnknownUser> {
        self.users
            .get(user)
            .cloned()
            .ok_or_else(|| UnknownUser(user.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn looks_up_by_account_id() {
        let principals = StaticPrincipals::new().with_user(Principal::new("jdoe", 3));

        assert_eq!(principals.principal("jdoe").await.unwrap().id(), 3);
        assert_eq!(principals.principal("nobody").await, Err(UnknownUser("nobody".into())));
    }
}
