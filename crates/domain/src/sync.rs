//! Client synchronization contract.
//!
//! Every successful mutation names the cached collections it can affect via
//! [`Mutation::invalidates`]. Services return a [`Committed`] value carrying
//! that list; errors carry none, so a failed mutation never invalidates.
//! [`QueryCache`] is the client side of the contract.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, ErrorKind};

/// A cached, independently refetchable collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Cart,
    Orders,
    Wishlist,
    Products,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Cart,
        Collection::Orders,
        Collection::Wishlist,
        Collection::Products,
    ];

    /// Query key clients cache the collection under.
    pub fn query_key(&self) -> &'static str {
        match self {
            Collection::Cart => "/api/cart",
            Collection::Orders => "/api/orders",
            Collection::Wishlist => "/api/wishlist",
            Collection::Products => "/api/products",
        }
    }

    pub fn from_query_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.query_key() == key)
    }
}

/// Every mutating operation of the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mutation {
    AddToCart,
    UpdateCartLine,
    RemoveCartLine,
    ClearCart,
    PlaceOrder,
    ChangeOrderStatus,
    AddToWishlist,
    RemoveFromWishlist,
    CreateProduct,
    UpdateProduct,
    DeleteProduct,
}

impl Mutation {
    /// The collections a successful mutation makes stale.
    pub fn invalidates(&self) -> &'static [Collection] {
        match self {
            Mutation::AddToCart
            | Mutation::UpdateCartLine
            | Mutation::RemoveCartLine
            | Mutation::ClearCart => &[Collection::Cart],
            Mutation::PlaceOrder => &[Collection::Cart, Collection::Orders],
            Mutation::ChangeOrderStatus => &[Collection::Orders],
            Mutation::AddToWishlist | Mutation::RemoveFromWishlist => &[Collection::Wishlist],
            Mutation::CreateProduct | Mutation::UpdateProduct | Mutation::DeleteProduct => {
                &[Collection::Products]
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mutation::AddToCart => "add_to_cart",
            Mutation::UpdateCartLine => "update_cart_line",
            Mutation::RemoveCartLine => "remove_cart_line",
            Mutation::ClearCart => "clear_cart",
            Mutation::PlaceOrder => "place_order",
            Mutation::ChangeOrderStatus => "change_order_status",
            Mutation::AddToWishlist => "add_to_wishlist",
            Mutation::RemoveFromWishlist => "remove_from_wishlist",
            Mutation::CreateProduct => "create_product",
            Mutation::UpdateProduct => "update_product",
            Mutation::DeleteProduct => "delete_product",
        }
    }
}

/// The result of a mutation that has been durably applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Committed<T> {
    pub value: T,
    pub mutation: Mutation,
}

impl<T> Committed<T> {
    pub fn new(value: T, mutation: Mutation) -> Self {
        Self { value, mutation }
    }

    pub fn invalidates(&self) -> &'static [Collection] {
        self.mutation.invalidates()
    }

    /// Comma-separated query keys, as sent in the `x-invalidate` header.
    pub fn invalidation_header(&self) -> String {
        self.invalidates()
            .iter()
            .map(Collection::query_key)
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Committed<U> {
        Committed {
            value: f(self.value),
            mutation: self.mutation,
        }
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// A cached read with the revision it was stored at.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedEntry<V> {
    pub revision: u64,
    pub value: V,
}

/// Client-side cache of collection reads.
///
/// Entries live until a committed mutation names their collection. A miss
/// means the caller must refetch before use.
#[derive(Debug, Clone)]
pub struct QueryCache<V = serde_json::Value> {
    entries: HashMap<Collection, CachedEntry<V>>,
    revision: u64,
}

impl<V> Default for QueryCache<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            revision: 0,
        }
    }
}

impl<V> QueryCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, collection: Collection) -> Option<&CachedEntry<V>> {
        self.entries.get(&collection)
    }

    /// Stores a fresh read, returning its revision.
    pub fn store(&mut self, collection: Collection, value: V) -> u64 {
        self.revision += 1;
        self.entries.insert(
            collection,
            CachedEntry {
                revision: self.revision,
                value,
            },
        );
        self.revision
    }

    /// True while the entry read at `revision` has been neither replaced nor invalidated.
    pub fn is_current(&self, collection: Collection, revision: u64) -> bool {
        self.entries
            .get(&collection)
            .is_some_and(|entry| entry.revision == revision)
    }

    pub fn invalidate(&mut self, collection: Collection) -> bool {
        self.entries.remove(&collection).is_some()
    }

    /// Drops every entry the committed mutation names. Returns the dropped collections.
    pub fn apply<T>(&mut self, committed: &Committed<T>) -> Vec<Collection> {
        committed
            .invalidates()
            .iter()
            .copied()
            .filter(|collection| self.invalidate(*collection))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// How a caller should react to a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recovery {
    /// Send the user through the identity provider again.
    Reauthenticate,
    CorrectInput,
    ReturnToCatalog,
    NotFound,
    RetryLater,
}

impl Recovery {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recovery::Reauthenticate => "reauthenticate",
            Recovery::CorrectInput => "correct_input",
            Recovery::ReturnToCatalog => "return_to_catalog",
            Recovery::NotFound => "not_found",
            Recovery::RetryLater => "retry_later",
        }
    }
}

impl From<ErrorKind> for Recovery {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Unauthorized => Recovery::Reauthenticate,
            ErrorKind::Validation => Recovery::CorrectInput,
            ErrorKind::EmptyCart => Recovery::ReturnToCatalog,
            ErrorKind::NotFound => Recovery::NotFound,
            ErrorKind::Transient => Recovery::RetryLater,
        }
    }
}

impl DomainError {
    pub fn recovery(&self) -> Recovery {
        self.kind().into()
    }
}
