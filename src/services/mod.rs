// Services module - business logic layer

pub mod cart_service;
pub mod catalog_service;
pub mod distance;
pub mod inbox_service;
pub mod postal_lookup;
pub mod session_service;
pub mod shipping_service;

pub use cart_service::CartService;
pub use catalog_service::CatalogService;
pub use distance::{DistanceEstimator, FixedDistance, SimulatedDistance};
pub use inbox_service::InboxService;
pub use postal_lookup::{LookupError, PostalCodeLookup, ViaCepClient};
pub use session_service::SessionService;
pub use shipping_service::ShippingService;
