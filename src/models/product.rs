use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CandleSize, Category, CategoryFilter};

/// Catalog product. Defined once in the static catalog and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub description: String,
    pub category: Category,
    pub images: Vec<String>,
    pub aroma: String,
    pub size: CandleSize,
    pub weight: String,
    pub burn_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_best_seller: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_new: Option<bool>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

/// Customer review attached to a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub user: String,
    pub rating: u8,
    pub comment: String,
    pub date: String,
}

/// Response model for product listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductListResponse {
    pub products: Vec<Product>,
    pub total_count: usize,
    pub category: CategoryFilter,
}

impl Product {
    pub fn best_seller(&self) -> bool {
        self.is_best_seller.unwrap_or(false)
    }

    pub fn is_new_arrival(&self) -> bool {
        self.is_new.unwrap_or(false)
    }

    /// Size a new cart line starts with
    pub fn default_size(&self) -> CandleSize {
        self.size
    }

    /// First image, used for listing thumbnails
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    pub fn matches_filter(&self, filter: &CategoryFilter) -> bool {
        filter.matches(self.category)
    }
}

impl ProductListResponse {
    pub fn new(products: Vec<Product>, category: CategoryFilter) -> Self {
        Self {
            total_count: products.len(),
            products,
            category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn create_test_product() -> Product {
        Product {
            id: "T1".to_string(),
            name: "Test Candle".to_string(),
            price: dec!(50.0),
            description: "A candle for tests".to_string(),
            category: Category::Doce,
            images: vec!["https://example.com/a.jpg".to_string()],
            aroma: "Baunilha".to_string(),
            size: CandleSize::Pequena,
            weight: "100g".to_string(),
            burn_time: "20 horas".to_string(),
            is_best_seller: None,
            is_new: Some(true),
            reviews: vec![],
        }
    }

    #[test]
    fn test_optional_flags_default_to_false() {
        let product = create_test_product();
        assert!(!product.best_seller());
        assert!(product.is_new_arrival());
        assert_eq!(product.default_size(), CandleSize::Pequena);
        assert_eq!(product.primary_image(), Some("https://example.com/a.jpg"));
    }

    #[test]
    fn test_matches_filter() {
        let product = create_test_product();
        assert!(product.matches_filter(&CategoryFilter::All));
        assert!(product.matches_filter(&CategoryFilter::Only(Category::Doce)));
        assert!(!product.matches_filter(&CategoryFilter::Only(Category::Fresco)));
    }

    #[test]
    fn test_missing_optional_fields_deserialize() {
        let json = r#"{
            "id": "9",
            "name": "Sem Flags",
            "price": "10.50",
            "description": "d",
            "category": "Fresco",
            "images": [],
            "aroma": "a",
            "size": "Grande",
            "weight": "1g",
            "burn_time": "1 hora"
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.price, dec!(10.50));
        assert!(product.reviews.is_empty());
        assert!(product.primary_image().is_none());
        assert!(!product.best_seller());
    }

    #[test]
    fn test_list_response_counts_products() {
        let response =
            ProductListResponse::new(vec![create_test_product()], CategoryFilter::All);
        assert_eq!(response.total_count, 1);
    }
}
