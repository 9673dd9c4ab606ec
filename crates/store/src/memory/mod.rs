//! In-memory adapters, used by tests and by the server when no database is configured.

mod cart;
mod catalog;
mod events;
mod wishlist;

pub use cart::InMemoryCartStore;
pub use catalog::InMemoryCatalogStore;
pub use events::InMemoryEventStore;
pub use wishlist::InMemoryWishlistStore;
