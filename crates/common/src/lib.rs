//! Shared types for the storefront workspace.
//!
//! Identifiers, the [`Money`] value object and the caller [`Identity`]
//! handed to the core by the external identity provider.

pub mod identity;
pub mod money;
pub mod types;

pub use identity::{Identity, NotAdmin};
pub use money::Money;
pub use types::{AggregateId, CartLineId, ProductId, UserId};
