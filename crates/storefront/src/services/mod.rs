//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Email/password registration and login
//! - `checkout` - Turning a cart into an order
//! - `session` - Per-request identity and admin resolution

pub mod auth;
pub mod checkout;
pub mod session;

pub use auth::{AuthError, AuthService};
pub use checkout::{CheckoutError, CheckoutOrchestrator, Confirmation, OrderWriter};
pub use session::{
    AuthEvent, ProfileFetchError, ProfileLookup, SessionProvider, SessionSnapshot, SessionState,
};
