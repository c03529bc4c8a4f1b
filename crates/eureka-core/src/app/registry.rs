use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::app::action::ActionDefinition;
use crate::domain::ActionKey;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("action already registered: {0}")]
    Duplicate(ActionKey),
}

/// Registry of actions (action key -> definition).
///
/// Design:
/// - Built during initialization (mutable).
/// - Shared behind an `Arc` afterwards (immutable, no locks).
pub struct ActionRegistry<C: Send + Sync> {
    actions: HashMap<ActionKey, Arc<ActionDefinition<C>>>,
}

impl<C: Send + Sync> ActionRegistry<C> {
    pub fn new() -> Self {
        Self {
            actions: HashMap::new(),
        }
    }

    /// Register an action under `key`. A key can be registered once.
    pub fn register(
        &mut self,
        key: impl Into<ActionKey>,
        action: ActionDefinition<C>,
    ) -> Result<(), RegistryError> {
        let key = key.into();
        if self.actions.contains_key(&key) {
            return Err(RegistryError::Duplicate(key));
        }
        self.actions.insert(key, Arc::new(action));
        Ok(())
    }

    pub fn get(&self, key: &ActionKey) -> Option<&Arc<ActionDefinition<C>>> {
        self.actions.get(key)
    }

    pub fn contains(&self, key: &ActionKey) -> bool {
        self.actions.contains_key(key)
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<&ActionKey> {
        let mut keys: Vec<_> = self.actions.keys().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl<C: Send + Sync> Default for ActionRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}
