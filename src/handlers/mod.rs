pub mod admin;
pub mod api;
pub mod cart;
pub mod health;
pub mod metrics;
pub mod middleware;
pub mod shipping;

pub use admin::*;
pub use api::*;
pub use cart::*;
pub use health::*;
pub use metrics::*;
pub use middleware::*;
pub use shipping::*;
