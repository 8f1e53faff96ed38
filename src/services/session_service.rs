use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OwnedMutexGuard;
use tracing::{info, instrument};

use crate::models::{
    validate_product_id, validate_session_id, AddressConfirmation, CategoryFilter,
    CheckoutReceipt, CheckoutRequest, Page, ProductListResponse, ServiceError, ServiceResult,
    SessionResponse, StorefrontSession, UpdateAddressRequest, Validate,
};
use crate::observability::{BusinessTracingMiddleware, Metrics};
use crate::repositories::{CatalogRepository, SessionRepository};

/// Load a session or fail with `SessionNotFound`
pub(crate) async fn load_session(
    repository: &dyn SessionRepository,
    session_id: &str,
) -> ServiceResult<StorefrontSession> {
    validate_session_id(session_id)?;
    repository
        .find_session(session_id)
        .await?
        .ok_or_else(|| ServiceError::SessionNotFound {
            session_id: session_id.to_string(),
        })
}

/// Take a session's write lock and load it.
///
/// Transitions keep the guard until their save returns, so two requests on
/// one session never both start from the same snapshot.
pub(crate) async fn lock_session(
    repository: &dyn SessionRepository,
    session_id: &str,
) -> ServiceResult<(OwnedMutexGuard<()>, StorefrontSession)> {
    validate_session_id(session_id)?;
    let not_found = || ServiceError::SessionNotFound {
        session_id: session_id.to_string(),
    };

    let guard = repository
        .lock_session(session_id)
        .await?
        .ok_or_else(not_found)?;
    let session = repository
        .find_session(session_id)
        .await?
        .ok_or_else(not_found)?;
    Ok((guard, session))
}

/// Service driving navigation, address and checkout transitions
pub struct SessionService {
    session_repository: Arc<dyn SessionRepository>,
    catalog_repository: Arc<dyn CatalogRepository>,
    tracing: BusinessTracingMiddleware,
}

impl SessionService {
    pub fn new(
        session_repository: Arc<dyn SessionRepository>,
        catalog_repository: Arc<dyn CatalogRepository>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            session_repository,
            catalog_repository,
            tracing: BusinessTracingMiddleware::new(metrics),
        }
    }

    #[instrument(skip(self))]
    pub async fn create_session(&self) -> ServiceResult<SessionResponse> {
        let session = self
            .session_repository
            .save_session(StorefrontSession::new())
            .await?;

        info!(session_id = %session.id, "Session created");
        Ok(session.to_response())
    }

    #[instrument(skip(self))]
    pub async fn get_session(&self, session_id: &str) -> ServiceResult<SessionResponse> {
        let session = load_session(self.session_repository.as_ref(), session_id).await?;
        Ok(session.to_response())
    }

    #[instrument(skip(self))]
    pub async fn delete_session(&self, session_id: &str) -> ServiceResult<()> {
        let (_guard, _) = lock_session(self.session_repository.as_ref(), session_id).await?;
        if !self.session_repository.delete_session(session_id).await? {
            return Err(ServiceError::SessionNotFound {
                session_id: session_id.to_string(),
            });
        }

        info!("Session deleted");
        Ok(())
    }

    /// Drop sessions nobody has touched for `max_idle`
    #[instrument(skip(self))]
    pub async fn purge_idle_sessions(&self, max_idle: Duration) -> ServiceResult<usize> {
        let max_idle = chrono::Duration::from_std(max_idle).map_err(|e| {
            ServiceError::ValidationError {
                message: format!("Idle timeout out of range: {}", e),
            }
        })?;
        let removed = self
            .session_repository
            .purge_idle(Utc::now() - max_idle)
            .await?;

        if removed > 0 {
            let remaining = self.session_repository.count_sessions().await?;
            info!(removed = removed, remaining = remaining, "Idle sessions purged");
        }
        Ok(removed)
    }

    #[instrument(skip(self))]
    pub async fn navigate(&self, session_id: &str, page: Page) -> ServiceResult<SessionResponse> {
        let (_guard, mut session) =
            lock_session(self.session_repository.as_ref(), session_id).await?;
        session.navigate(page);
        let session = self.session_repository.save_session(session).await?;
        Ok(session.to_response())
    }

    #[instrument(skip(self))]
    pub async fn set_category(
        &self,
        session_id: &str,
        category: CategoryFilter,
    ) -> ServiceResult<SessionResponse> {
        let (_guard, mut session) =
            lock_session(self.session_repository.as_ref(), session_id).await?;
        session.set_category(category);
        let session = self.session_repository.save_session(session).await?;
        Ok(session.to_response())
    }

    /// Products visible under the session's active category filter
    #[instrument(skip(self))]
    pub async fn visible_products(&self, session_id: &str) -> ServiceResult<ProductListResponse> {
        let session = load_session(self.session_repository.as_ref(), session_id).await?;
        let category = session.category.to_string();

        self.tracing
            .trace_catalog_operation("session_products", Some(&category), async {
                let catalog = self.catalog_repository.find_all().await?;
                let products = session.visible_products(&catalog);
                Ok::<_, ServiceError>(ProductListResponse::new(products, session.category))
            })
            .await
    }

    #[instrument(skip(self))]
    pub async fn open_product(
        &self,
        session_id: &str,
        product_id: &str,
    ) -> ServiceResult<SessionResponse> {
        validate_product_id(product_id)?;
        let (_guard, mut session) =
            lock_session(self.session_repository.as_ref(), session_id).await?;

        let product = self
            .catalog_repository
            .find_by_id(product_id)
            .await?
            .ok_or_else(|| ServiceError::ProductNotFound {
                id: product_id.to_string(),
            })?;

        session.open_product(product);
        let session = self.session_repository.save_session(session).await?;
        Ok(session.to_response())
    }

    #[instrument(skip(self, request))]
    pub async fn update_address(
        &self,
        session_id: &str,
        request: UpdateAddressRequest,
    ) -> ServiceResult<SessionResponse> {
        request.validate()?;
        let (_guard, mut session) =
            lock_session(self.session_repository.as_ref(), session_id).await?;
        session.update_address(request);
        let session = self.session_repository.save_session(session).await?;
        Ok(session.to_response())
    }

    #[instrument(skip(self))]
    pub async fn confirm_address(&self, session_id: &str) -> ServiceResult<AddressConfirmation> {
        let session = load_session(self.session_repository.as_ref(), session_id).await?;
        let confirmation = session.confirm_address()?;

        info!("Delivery address confirmed");
        Ok(confirmation)
    }

    #[instrument(skip(self))]
    pub async fn start_checkout(&self, session_id: &str) -> ServiceResult<SessionResponse> {
        let (_guard, mut session) =
            lock_session(self.session_repository.as_ref(), session_id).await?;
        session.go_to_checkout()?;
        let session = self.session_repository.save_session(session).await?;
        Ok(session.to_response())
    }

    #[instrument(skip(self, request))]
    pub async fn checkout(
        &self,
        session_id: &str,
        request: CheckoutRequest,
    ) -> ServiceResult<CheckoutReceipt> {
        self.tracing
            .trace_cart_operation("checkout", Some(session_id), async {
                let (_guard, mut session) =
                    lock_session(self.session_repository.as_ref(), session_id).await?;
                let receipt = session.checkout(request.message)?;
                self.session_repository.save_session(session).await?;

                info!(
                    order_id = %receipt.order_id,
                    total = %receipt.total,
                    "Order placed"
                );
                Ok::<_, ServiceError>(receipt)
            })
            .await
    }
}
