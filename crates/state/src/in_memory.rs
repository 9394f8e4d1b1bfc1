//! In-memory state store — useful for testing and dry runs.

use async_trait::async_trait;
use graphhook_core::error::StateError;
use graphhook_core::state::StateStore;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A state store that keeps values in a HashMap.
/// Nothing survives the process.
pub struct InMemoryStateStore {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self {
            values: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Pre-populate the store.
    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            values: Arc::new(RwLock::new(map)),
        }
    }
}

impl Default for InMemoryStateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StateError> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StateError> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, StateError> {
        Ok(self.values.write().await.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphhook_core::state::keys;

    #[tokio::test]
    async fn set_and_get() {
        let store = InMemoryStateStore::new();
        assert!(store.get(keys::ANCHOR).await.unwrap().is_none());

        store.set(keys::ANCHOR, "how do traits work").await.unwrap();
        assert_eq!(
            store.get(keys::ANCHOR).await.unwrap().as_deref(),
            Some("how do traits work")
        );
    }

    #[tokio::test]
    async fn set_overwrites() {
        let store = InMemoryStateStore::with_values([(keys::MESSAGE_COUNT, "3")]);
        store.set(keys::MESSAGE_COUNT, "4").await.unwrap();
        assert_eq!(store.get(keys::MESSAGE_COUNT).await.unwrap().as_deref(), Some("4"));
    }

    #[tokio::test]
    async fn remove_reports_existence() {
        let store = InMemoryStateStore::with_values([(keys::PRECOMPACT_RAN, "1700000000")]);
        assert!(store.remove(keys::PRECOMPACT_RAN).await.unwrap());
        assert!(!store.remove(keys::PRECOMPACT_RAN).await.unwrap());
    }
}
