//! Domain models for the storefront.
//!
//! These are validated domain types, separate from the row types the
//! repositories decode.

pub mod order;
pub mod product;
pub mod profile;
pub mod session;
pub mod user;
pub mod validation;

pub use order::{
    CustomerRef, NewOrder, NewOrderItem, Order, OrderItem, OrderItemDetail, OrderSummary,
};
pub use product::{ListInput, NewProduct, Product, ProductForm};
pub use profile::{Profile, ProfileForm, ProfileUpdate};
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
pub use validation::{FieldError, ValidationErrors};
