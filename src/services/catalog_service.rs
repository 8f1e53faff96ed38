use std::sync::Arc;
use tracing::{info, instrument};

use crate::models::{
    validate_product_id, CategoryFilter, Product, ProductListResponse, ServiceError,
    ServiceResult,
};
use crate::observability::{BusinessTracingMiddleware, Metrics};
use crate::repositories::CatalogRepository;

/// Read-only access to the product catalog
pub struct CatalogService {
    catalog_repository: Arc<dyn CatalogRepository>,
    tracing: BusinessTracingMiddleware,
}

impl CatalogService {
    pub fn new(catalog_repository: Arc<dyn CatalogRepository>, metrics: Arc<Metrics>) -> Self {
        Self {
            catalog_repository,
            tracing: BusinessTracingMiddleware::new(metrics),
        }
    }

    /// Filter labels shown above the shop grid, "Todos" first
    pub fn list_categories(&self) -> Vec<String> {
        CategoryFilter::labels()
    }

    #[instrument(skip(self), fields(category = %filter))]
    pub async fn list_products(&self, filter: CategoryFilter) -> ServiceResult<ProductListResponse> {
        let label = filter.to_string();
        self.tracing
            .trace_catalog_operation("list_products", Some(&label), async {
                let products = self.catalog_repository.find_by_category(filter).await?;
                info!(count = products.len(), "Products listed");
                Ok::<_, ServiceError>(ProductListResponse::new(products, filter))
            })
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, product_id: &str) -> ServiceResult<Product> {
        validate_product_id(product_id)?;
        self.tracing
            .trace_catalog_operation("get_product", None, async {
                self.catalog_repository
                    .find_by_id(product_id)
                    .await?
                    .ok_or_else(|| ServiceError::ProductNotFound {
                        id: product_id.to_string(),
                    })
            })
            .await
    }

    #[instrument(skip(self))]
    pub async fn best_sellers(&self) -> ServiceResult<ProductListResponse> {
        self.tracing
            .trace_catalog_operation("best_sellers", None, async {
                let products = self.catalog_repository.find_best_sellers().await?;
                Ok::<_, ServiceError>(ProductListResponse::new(products, CategoryFilter::All))
            })
            .await
    }
}
