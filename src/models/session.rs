use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    AddressField, AddressForm, AddressHint, Cart, CartLineResponse, CategoryFilter,
    DeliveryQuote, Page, PostalCode, Product, ServiceError, ServiceResult,
    UpdateAddressRequest, Validate, ValidationResult,
};

pub const ORDER_PLACED_MESSAGE: &str = "Pedido realizado!";
pub const ADDRESS_SAVED_MESSAGE: &str = "Endereço salvo com sucesso!";

/// Navigation, cart and checkout state of one visitor.
///
/// Every change goes through a named transition so that the rules about
/// which flags move together live in one place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorefrontSession {
    pub id: String,
    pub page: Page,
    pub selected_product: Option<Product>,
    pub cart: Cart,
    pub cart_open: bool,
    pub category: CategoryFilter,
    pub address: AddressForm,
    pub searching: bool,
    pub quote: Option<DeliveryQuote>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// How an in-flight postal lookup ended
#[derive(Debug, Clone, PartialEq)]
pub enum LookupResolution {
    Found {
        hint: AddressHint,
        quote: DeliveryQuote,
    },
    NotFound,
    Failed,
}

/// Summary of a placed order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutReceipt {
    pub order_id: String,
    pub session_id: String,
    pub items: Vec<CartLineResponse>,
    pub subtotal: Decimal,
    pub delivery_fee: Option<Decimal>,
    pub total: Decimal,
    pub message: String,
    pub placed_at: DateTime<Utc>,
}

/// Request model for moving to another page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigateRequest {
    pub page: Page,
}

/// Request model for the shop category filter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRequest {
    pub category: CategoryFilter,
}

/// Request model for placing an order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub message: Option<String>,
}

/// Confirmation returned after the address form is accepted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressConfirmation {
    pub address: AddressForm,
    pub message: String,
}

/// Response model for session state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub page: Page,
    pub selected_product_id: Option<String>,
    pub category: CategoryFilter,
    pub cart_open: bool,
    pub cart_count: u32,
    pub cart_total: Decimal,
    pub address: AddressForm,
    pub searching: bool,
    pub quote: Option<DeliveryQuote>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StorefrontSession {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    pub fn with_id(id: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            page: Page::Home,
            selected_product: None,
            cart: Cart::new(),
            cart_open: false,
            category: CategoryFilter::All,
            address: AddressForm::default(),
            searching: false,
            quote: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn navigate(&mut self, page: Page) {
        self.page = page;
        self.selected_product = None;
        self.touch();
    }

    pub fn open_product(&mut self, product: Product) {
        self.selected_product = Some(product);
        self.page = Page::ProductDetail;
        self.touch();
    }

    /// Add one unit and reveal the cart drawer
    pub fn add_to_cart(&mut self, product: &Product) {
        self.cart.add(product);
        self.cart_open = true;
        self.touch();
    }

    pub fn remove_from_cart(&mut self, product_id: &str) -> bool {
        let removed = self.cart.remove(product_id);
        self.touch();
        removed
    }

    pub fn open_cart(&mut self) {
        self.cart_open = true;
        self.touch();
    }

    pub fn close_cart(&mut self) {
        self.cart_open = false;
        self.touch();
    }

    pub fn set_category(&mut self, filter: CategoryFilter) {
        self.category = filter;
        self.touch();
    }

    /// Catalog products that pass the active category filter, in catalog order
    pub fn visible_products(&self, catalog: &[Product]) -> Vec<Product> {
        catalog
            .iter()
            .filter(|product| product.matches_filter(&self.category))
            .cloned()
            .collect()
    }

    pub fn set_address_field(&mut self, field: AddressField, value: String) {
        self.address.set(field, value);
        self.touch();
    }

    pub fn update_address(&mut self, patch: UpdateAddressRequest) {
        self.address.apply(patch);
        self.touch();
    }

    /// Mark a lookup as in flight.
    ///
    /// The stored postal code must hold exactly eight digits; otherwise
    /// nothing changes. Any previous quote is dropped.
    pub fn begin_postal_lookup(&mut self) -> ValidationResult<PostalCode> {
        let postal_code = PostalCode::parse(&self.address.postal_code)?;
        self.searching = true;
        self.quote = None;
        self.touch();
        Ok(postal_code)
    }

    /// Settle a lookup. `searching` is cleared whatever the outcome.
    pub fn complete_postal_lookup(&mut self, resolution: LookupResolution) {
        if let LookupResolution::Found { hint, quote } = resolution {
            self.address.fill_from_hint(&hint);
            self.quote = Some(quote);
        }
        self.searching = false;
        self.touch();
    }

    pub fn confirm_address(&self) -> ValidationResult<AddressConfirmation> {
        self.address.validate()?;
        Ok(AddressConfirmation {
            address: self.address.clone(),
            message: ADDRESS_SAVED_MESSAGE.to_string(),
        })
    }

    /// Close the drawer and move to the checkout page
    pub fn go_to_checkout(&mut self) -> ServiceResult<()> {
        if self.cart.is_empty() {
            return Err(ServiceError::EmptyCart);
        }
        self.cart_open = false;
        self.navigate(Page::Checkout);
        Ok(())
    }

    /// Place the order: the receipt charges the cart total plus the quoted
    /// fee, then the cart is emptied and the visitor lands on the home page.
    pub fn checkout(&mut self, message: Option<String>) -> ServiceResult<CheckoutReceipt> {
        if self.cart.is_empty() {
            return Err(ServiceError::EmptyCart);
        }

        let subtotal = self.cart.total();
        let delivery_fee = self.quote.map(|quote| quote.fee);
        let receipt = CheckoutReceipt {
            order_id: Uuid::new_v4().to_string(),
            session_id: self.id.clone(),
            items: self.cart.lines().iter().map(|line| line.to_response()).collect(),
            subtotal,
            delivery_fee,
            total: subtotal + delivery_fee.unwrap_or(Decimal::ZERO),
            message: message.unwrap_or_else(|| ORDER_PLACED_MESSAGE.to_string()),
            placed_at: Utc::now(),
        };

        self.cart.clear();
        self.cart_open = false;
        self.navigate(Page::Home);
        Ok(receipt)
    }

    pub fn to_response(&self) -> SessionResponse {
        SessionResponse {
            session_id: self.id.clone(),
            page: self.page,
            selected_product_id: self.selected_product.as_ref().map(|p| p.id.clone()),
            category: self.category,
            cart_open: self.cart_open,
            cart_count: self.cart.count(),
            cart_total: self.cart.total(),
            address: self.address.clone(),
            searching: self.searching,
            quote: self.quote,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl Default for StorefrontSession {
    fn default() -> Self {
        Self::new()
    }
}
