use std::sync::Arc;
use tracing::{info, instrument};

use crate::models::{
    validate_product_id, AddCartItemRequest, CartResponse, ServiceError, ServiceResult,
    StorefrontSession, Validate,
};
use crate::observability::{BusinessTracingMiddleware, Metrics};
use crate::repositories::{CatalogRepository, SessionRepository};
use crate::services::session_service::{load_session, lock_session};

/// Service for the shopping cart held in each visitor session
pub struct CartService {
    session_repository: Arc<dyn SessionRepository>,
    catalog_repository: Arc<dyn CatalogRepository>,
    tracing: BusinessTracingMiddleware,
}

impl CartService {
    /// Create a new CartService
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

    /// Get a session's cart with derived totals
    #[instrument(skip(self))]
    pub async fn get_cart(&self, session_id: &str) -> ServiceResult<CartResponse> {
        let session = load_session(self.session_repository.as_ref(), session_id).await?;
        Ok(Self::cart_to_response(&session))
    }

    /// Add one unit of a product and open the drawer
    #[instrument(skip(self, request), fields(product_id = %request.product_id))]
    pub async fn add_item(
        &self,
        session_id: &str,
        request: AddCartItemRequest,
    ) -> ServiceResult<CartResponse> {
        request.validate()?;

        self.tracing
            .trace_cart_operation("add_item", Some(session_id), async {
                let (_guard, mut session) =
                    lock_session(self.session_repository.as_ref(), session_id).await?;

                let product = self
                    .catalog_repository
                    .find_by_id(&request.product_id)
                    .await?
                    .ok_or_else(|| ServiceError::ProductNotFound {
                        id: request.product_id.clone(),
                    })?;

                session.add_to_cart(&product);
                let session = self.session_repository.save_session(session).await?;

                info!(
                    quantity = session.cart.quantity_of(&product.id),
                    "Item added to cart"
                );
                Ok::<_, ServiceError>(Self::cart_to_response(&session))
            })
            .await
    }

    /// Remove a product's line. Removing an absent product changes nothing.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, session_id: &str, product_id: &str) -> ServiceResult<CartResponse> {
        validate_product_id(product_id)?;

        self.tracing
            .trace_cart_operation("remove_item", Some(session_id), async {
                let (_guard, mut session) =
                    lock_session(self.session_repository.as_ref(), session_id).await?;

                let removed = session.remove_from_cart(product_id);
                let session = self.session_repository.save_session(session).await?;

                info!(removed = removed, "Cart line removal processed");
                Ok::<_, ServiceError>(Self::cart_to_response(&session))
            })
            .await
    }

    /// Open or close the cart drawer
    #[instrument(skip(self))]
    pub async fn set_drawer(&self, session_id: &str, open: bool) -> ServiceResult<CartResponse> {
        let (_guard, mut session) =
            lock_session(self.session_repository.as_ref(), session_id).await?;
        if open {
            session.open_cart();
        } else {
            session.close_cart();
        }
        let session = self.session_repository.save_session(session).await?;
        Ok(Self::cart_to_response(&session))
    }

    fn cart_to_response(session: &StorefrontSession) -> CartResponse {
        CartResponse {
            session_id: session.id.clone(),
            items: session
                .cart
                .lines()
                .iter()
                .map(|line| line.to_response())
                .collect(),
            total_items: session.cart.count(),
            total_price: session.cart.total(),
            is_open: session.cart_open,
        }
    }
}
