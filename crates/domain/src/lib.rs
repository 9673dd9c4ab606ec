//! Storefront core: cart rules, the order lifecycle and the client
//! synchronization contract.
//!
//! - [`CartService`]: quantity-bounded cart lines with atomic upsert
//! - [`OrderService`]: checkout into an event-sourced [`Order`] and admin status changes
//! - [`OrderStatus`]: the single status enum with its transition table
//! - [`sync`]: which cached collections each mutation invalidates
//! - [`DomainError`]: the error taxonomy callers react to

pub mod aggregate;
pub mod cart;
pub mod catalog;
pub mod command;
pub mod error;
pub mod order;
pub mod sync;
pub mod wishlist;

pub use aggregate::{Aggregate, DomainEvent};
pub use cart::{CartItem, CartService, CartSummary, Quantity};
pub use catalog::{CatalogService, CategorySummary, validate_draft};
pub use command::{CommandHandler, CommandResult};
pub use error::{DomainError, ErrorKind, ValidationError};
pub use order::{
    CheckoutRequest, Order, OrderError, OrderEvent, OrderLine, OrderPlacedData, OrderService,
    OrderStatus, OrderStatusChangedData, PaymentMethod, ShippingDetails, TrackingStep,
};
pub use sync::{CachedEntry, Collection, Committed, Mutation, QueryCache, Recovery};
pub use wishlist::{WishlistItem, WishlistService};
