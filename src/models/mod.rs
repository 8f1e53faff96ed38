// Re-export all model types
pub use self::cart::*;
pub use self::catalog::*;
pub use self::delivery::*;
pub use self::enums::*;
pub use self::errors::*;
pub use self::inbox::*;
pub use self::product::*;
pub use self::session::*;
pub use self::validation::*;

mod cart;
mod catalog;
mod delivery;
mod enums;
mod errors;
mod inbox;
mod product;
mod session;
mod validation;
