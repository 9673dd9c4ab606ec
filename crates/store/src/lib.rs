//! Persistence for the storefront.
//!
//! Four ports, each with an in-memory and a PostgreSQL adapter:
//! - [`EventStore`]: append-only log the order aggregate is sourced from
//! - [`CartStore`]: cart lines keyed by (user, product) with atomic upsert
//! - [`WishlistStore`]: wishlist entries keyed by (user, product)
//! - [`CatalogStore`]: the product catalog snapshot provider

pub mod cart;
pub mod catalog;
pub mod error;
pub mod event;
pub mod events;
pub mod memory;
pub mod postgres;
pub mod wishlist;

pub use cart::{CartLineRecord, CartStore};
pub use catalog::{CatalogStore, Product, ProductBadge, ProductDraft, ProductFilter};
pub use common::{AggregateId, CartLineId, Money, ProductId, UserId};
pub use error::{Result, StoreError};
pub use event::{EventEnvelope, EventId, Version};
pub use events::{EventStore, EventStream};
pub use memory::{
    InMemoryCartStore, InMemoryCatalogStore, InMemoryEventStore, InMemoryWishlistStore,
};
pub use postgres::{
    PostgresCartStore, PostgresCatalogStore, PostgresEventStore, PostgresWishlistStore,
    run_migrations,
};
pub use wishlist::{WishlistEntry, WishlistStore};
