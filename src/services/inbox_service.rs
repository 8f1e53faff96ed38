use std::sync::Arc;
use tracing::instrument;

use crate::models::{InboxResponse, ServiceError, ServiceResult};
use crate::observability::{BusinessTracingMiddleware, Metrics};
use crate::repositories::InboxRepository;

/// Admin view over messages left through the chat widget
pub struct InboxService {
    inbox_repository: Arc<dyn InboxRepository>,
    tracing: BusinessTracingMiddleware,
}

impl InboxService {
    pub fn new(inbox_repository: Arc<dyn InboxRepository>, metrics: Arc<Metrics>) -> Self {
        Self {
            inbox_repository,
            tracing: BusinessTracingMiddleware::new(metrics),
        }
    }

    #[instrument(skip(self))]
    pub async fn list_messages(&self) -> ServiceResult<InboxResponse> {
        self.tracing
            .trace_inbox_operation("list", async {
                let messages = self.inbox_repository.read_messages().await?;
                Ok::<_, ServiceError>(InboxResponse::new(messages))
            })
            .await
    }

    /// Delete every stored message. Clearing an empty inbox succeeds.
    #[instrument(skip(self))]
    pub async fn clear_messages(&self) -> ServiceResult<()> {
        self.tracing
            .trace_inbox_operation("clear", async {
                self.inbox_repository.clear().await?;
                Ok::<_, ServiceError>(())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InboxMessage, RepositoryError};
    use async_trait::async_trait;
    use mockall::mock;

    mock! {
        TestInboxRepository {}

        #[async_trait]
        impl InboxRepository for TestInboxRepository {
            async fn read_messages(&self) -> Result<Vec<InboxMessage>, RepositoryError>;
            async fn clear(&self) -> Result<bool, RepositoryError>;
        }
    }

    fn message(id: &str) -> InboxMessage {
        InboxMessage {
            id: id.to_string(),
            date: "19/10/2026".to_string(),
            text: "Olá".to_string(),
        }
    }

    #[tokio::test]
    async fn test_list_messages() {
        let mut repo = MockTestInboxRepository::new();
        repo.expect_read_messages()
            .returning(|| Ok(vec![message("1"), message("2")]));
        let service = InboxService::new(Arc::new(repo), Arc::new(Metrics::new().unwrap()));

        let response = service.list_messages().await.unwrap();
        assert_eq!(response.total_count, 2);
    }

    #[tokio::test]
    async fn test_clear_empty_inbox_succeeds() {
        let mut repo = MockTestInboxRepository::new();
        repo.expect_clear().times(1).returning(|| Ok(false));
        let service = InboxService::new(Arc::new(repo), Arc::new(Metrics::new().unwrap()));

        assert!(service.clear_messages().await.is_ok());
    }

    #[tokio::test]
    async fn test_clear_storage_failure() {
        let mut repo = MockTestInboxRepository::new();
        repo.expect_clear().returning(|| {
            Err(RepositoryError::Io {
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        });
        let metrics = Arc::new(Metrics::new().unwrap());
        let service = InboxService::new(Arc::new(repo), metrics.clone());

        let result = service.clear_messages().await;
        assert!(matches!(result, Err(ServiceError::Repository { .. })));
        assert!(metrics.encode().unwrap().contains("inbox_operations_total"));
    }
}
