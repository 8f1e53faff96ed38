use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CandleSize, Product};

/// Shopping cart: one line per distinct product id, in insertion order.
///
/// Totals are derived from the lines on every call and never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

/// One product in the cart with its quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
    pub selected_size: CandleSize,
}

/// Request model for adding one unit of a product to the cart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddCartItemRequest {
    pub product_id: String,
}

/// Request model for opening or closing the cart drawer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartDrawerRequest {
    pub open: bool,
}

/// Response model for cart operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartResponse {
    pub session_id: String,
    pub items: Vec<CartLineResponse>,
    pub total_items: u32,
    pub total_price: Decimal,
    pub is_open: bool,
}

/// Cart line as shown in the drawer and on the checkout page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLineResponse {
    pub product_id: String,
    pub product_name: String,
    pub product_image: Option<String>,
    pub selected_size: CandleSize,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of a product.
    ///
    /// Merges into the existing line for the same product id (its selected
    /// size is left as is); otherwise appends a line at the product's size.
    pub fn add(&mut self, product: &Product) {
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.product.id == product.id)
        {
            line.quantity += 1;
        } else {
            self.lines.push(CartLine::new(product.clone()));
        }
    }

    /// Remove the line for a product. Returns whether a line was dropped.
    pub fn remove(&mut self, product_id: &str) -> bool {
        let original_len = self.lines.len();
        self.lines.retain(|line| line.product.id != product_id);
        self.lines.len() != original_len
    }

    /// Sum of price times quantity over all lines
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Number of units in the cart
    pub fn count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, product_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product.id == product_id)
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.line(product_id).is_some()
    }

    pub fn quantity_of(&self, product_id: &str) -> u32 {
        self.line(product_id).map(|line| line.quantity).unwrap_or(0)
    }
}

impl CartLine {
    pub fn new(product: Product) -> Self {
        let selected_size = product.default_size();
        Self {
            product,
            quantity: 1,
            selected_size,
        }
    }

    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }

    pub fn to_response(&self) -> CartLineResponse {
        CartLineResponse {
            product_id: self.product.id.clone(),
            product_name: self.product.name.clone(),
            product_image: self.product.primary_image().map(str::to_string),
            selected_size: self.selected_size,
            quantity: self.quantity,
            unit_price: self.product.price,
            line_total: self.line_total(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{default_catalog, Category};
    use rust_decimal_macros::dec;

    fn product(id: &str) -> Product {
        default_catalog()
            .into_iter()
            .find(|p| p.id == id)
            .expect("catalog product")
    }

    #[test]
    fn test_cart_creation() {
        let cart = Cart::new();

        assert!(cart.is_empty());
        assert_eq!(cart.count(), 0);
        assert_eq!(cart.total(), dec!(0));
    }

    #[test]
    fn test_add_new_line_uses_product_size() {
        let mut cart = Cart::new();
        let rosa = product("6");

        cart.add(&rosa);

        assert_eq!(cart.lines().len(), 1);
        let line = cart.line("6").unwrap();
        assert_eq!(line.quantity, 1);
        assert_eq!(line.selected_size, CandleSize::Pequena);
    }

    #[test]
    fn test_add_same_product_twice_merges() {
        let mut cart = Cart::new();
        let gold = product("1");

        cart.add(&gold);
        cart.add(&gold);

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.quantity_of("1"), 2);
    }

    #[test]
    fn test_merge_ignores_size_of_later_record() {
        let mut cart = Cart::new();
        let gold = product("1");
        let mut resized = gold.clone();
        resized.size = CandleSize::Grande;

        cart.add(&gold);
        cart.add(&resized);

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.line("1").unwrap().selected_size, CandleSize::Media);
    }

    #[test]
    fn test_totals_scenario() {
        let mut cart = Cart::new();
        let gold = product("1");
        let champagne = product("3");

        cart.add(&gold);
        cart.add(&gold);
        cart.add(&champagne);

        assert_eq!(cart.count(), 3);
        assert_eq!(cart.total(), dec!(288.00));
    }

    #[test]
    fn test_remove_line() {
        let mut cart = Cart::new();
        cart.add(&product("1"));
        cart.add(&product("2"));

        assert!(cart.remove("1"));
        assert!(!cart.contains("1"));
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut cart = Cart::new();
        cart.add(&product("2"));
        let before = cart.clone();

        assert!(!cart.remove("999"));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let mut cart = Cart::new();
        cart.add(&product("5"));
        cart.add(&product("2"));
        cart.add(&product("5"));

        let ids: Vec<_> = cart.lines().iter().map(|l| l.product.id.as_str()).collect();
        assert_eq!(ids, vec!["5", "2"]);
    }

    #[test]
    fn test_clear_cart() {
        let mut cart = Cart::new();
        cart.add(&product("4"));
        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(cart.total(), dec!(0));
    }

    #[test]
    fn test_line_response() {
        let mut cart = Cart::new();
        let capri = product("7");
        cart.add(&capri);
        cart.add(&capri);

        let response = cart.line("7").unwrap().to_response();
        assert_eq!(response.product_name, "Pôr do Sol em Capri");
        assert_eq!(response.line_total, dec!(210.0));
        assert_eq!(capri.category, Category::Citrico);
    }

    #[test]
    fn test_serde_serialization() {
        let mut cart = Cart::new();
        cart.add(&product("1"));

        let json = serde_json::to_string(&cart).unwrap();
        let deserialized: Cart = serde_json::from_str(&json).unwrap();

        assert_eq!(cart, deserialized);
    }
}
