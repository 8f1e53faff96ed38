use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::models::{default_catalog, CategoryFilter, Product, RepositoryResult};

/// Trait defining the interface for catalog data access operations
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// All products in display order
    async fn find_all(&self) -> RepositoryResult<Vec<Product>>;

    /// Find a product by its ID
    async fn find_by_id(&self, product_id: &str) -> RepositoryResult<Option<Product>>;

    /// Products passing a category filter
    async fn find_by_category(&self, filter: CategoryFilter) -> RepositoryResult<Vec<Product>>;

    /// Products flagged as best sellers
    async fn find_best_sellers(&self) -> RepositoryResult<Vec<Product>>;
}

/// Catalog compiled into the binary
pub struct StaticCatalogRepository {
    products: Vec<Product>,
}

impl StaticCatalogRepository {
    pub fn new() -> Self {
        Self::with_products(default_catalog())
    }

    pub fn with_products(products: Vec<Product>) -> Self {
        Self { products }
    }
}

impl Default for StaticCatalogRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogRepository for StaticCatalogRepository {
    async fn find_all(&self) -> RepositoryResult<Vec<Product>> {
        Ok(self.products.clone())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, product_id: &str) -> RepositoryResult<Option<Product>> {
        let product = self.products.iter().find(|p| p.id == product_id).cloned();
        debug!(found = product.is_some(), "Catalog lookup");
        Ok(product)
    }

    async fn find_by_category(&self, filter: CategoryFilter) -> RepositoryResult<Vec<Product>> {
        Ok(self
            .products
            .iter()
            .filter(|p| p.matches_filter(&filter))
            .cloned()
            .collect())
    }

    async fn find_best_sellers(&self) -> RepositoryResult<Vec<Product>> {
        Ok(self
            .products
            .iter()
            .filter(|p| p.best_seller())
            .cloned()
            .collect())
    }
}
