use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::KeyValueStore;
use crate::models::{InboxMessage, RepositoryResult};
use crate::observability::{Metrics, StorageTracingMiddleware};

/// Trait defining the interface for the admin inbox
#[async_trait]
pub trait InboxRepository: Send + Sync {
    /// Stored messages, oldest first. Unreadable data yields an empty list.
    async fn read_messages(&self) -> RepositoryResult<Vec<InboxMessage>>;

    /// Drop every message by removing the inbox key. Returns whether it existed.
    async fn clear(&self) -> RepositoryResult<bool>;
}

/// Inbox kept as a JSON array under one key of a key-value store
pub struct KeyValueInboxRepository {
    store: Arc<dyn KeyValueStore>,
    key: String,
    tracing: StorageTracingMiddleware,
}

impl KeyValueInboxRepository {
    pub fn new(store: Arc<dyn KeyValueStore>, key: String, metrics: Arc<Metrics>) -> Self {
        Self {
            store,
            key,
            tracing: StorageTracingMiddleware::new(metrics),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

#[async_trait]
impl InboxRepository for KeyValueInboxRepository {
    #[instrument(skip(self), fields(key = %self.key))]
    async fn read_messages(&self) -> RepositoryResult<Vec<InboxMessage>> {
        let raw = self
            .tracing
            .trace_operation("get", self.store.backend(), self.store.get(&self.key))
            .await?;

        let Some(raw) = raw else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<InboxMessage>>(&raw) {
            Ok(messages) => Ok(messages),
            Err(e) => {
                warn!(error = %e, "Stored inbox data is unreadable, treating it as empty");
                Ok(Vec::new())
            }
        }
    }

    #[instrument(skip(self), fields(key = %self.key))]
    async fn clear(&self) -> RepositoryResult<bool> {
        let removed = self
            .tracing
            .trace_operation("remove", self.store.backend(), self.store.remove(&self.key))
            .await?;

        info!(removed = removed, "Inbox cleared");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{FileKeyValueStore, InMemoryKeyValueStore, STORE_FILE_NAME};

    const KEY: &str = "LUMINOUS_ADMIN_INBOX";

    fn repository(store: Arc<InMemoryKeyValueStore>) -> KeyValueInboxRepository {
        KeyValueInboxRepository::new(store, KEY.to_string(), Arc::new(Metrics::new().unwrap()))
    }

    #[tokio::test]
    async fn test_read_two_messages_then_clear() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        store
            .set(
                KEY,
                r#"[{"id":"1","date":"01/02/2026","text":"Olá"},{"id":"2","date":"02/02/2026","text":"Tem vela de lavanda?"}]"#
                    .to_string(),
            )
            .await
            .unwrap();
        let repo = repository(store.clone());

        assert_eq!(repo.read_messages().await.unwrap().len(), 2);

        assert!(repo.clear().await.unwrap());
        assert!(repo.read_messages().await.unwrap().is_empty());
        assert!(store.get(KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_store_file_reads_empty_and_clears() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(STORE_FILE_NAME), "{garbage").unwrap();
        let store = Arc::new(FileKeyValueStore::new(temp_dir.path()));
        let repo =
            KeyValueInboxRepository::new(store.clone(), KEY.to_string(), Arc::new(Metrics::new().unwrap()));

        assert!(repo.read_messages().await.unwrap().is_empty());
        assert!(!repo.clear().await.unwrap());

        store.set(KEY, "[]".to_string()).await.unwrap();
        assert!(repo.read_messages().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_key_reads_empty() {
        let repo = repository(Arc::new(InMemoryKeyValueStore::new()));
        assert!(repo.read_messages().await.unwrap().is_empty());
        assert!(!repo.clear().await.unwrap());
    }

    #[tokio::test]
    async fn test_unparseable_value_reads_empty() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        store.set(KEY, "{not an array".to_string()).await.unwrap();
        let repo = repository(store);

        assert!(repo.read_messages().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_wrong_schema_reads_empty() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        store.set(KEY, r#"[{"id":1}]"#.to_string()).await.unwrap();
        let repo = repository(store);

        assert!(repo.read_messages().await.unwrap().is_empty());
    }
}
