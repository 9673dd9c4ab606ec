//! Shared application state.

use std::sync::Arc;

use common::Money;
use domain::{CartService, CatalogService, OrderService, WishlistService};
use projections::{OrderSummariesView, ProjectionProcessor, SalesDashboardView};
use sqlx::PgPool;
use store::{
    CartStore, CatalogStore, EventStore, InMemoryCartStore, InMemoryCatalogStore,
    InMemoryWishlistStore, PostgresCartStore, PostgresCatalogStore, PostgresWishlistStore,
    WishlistStore,
};

use crate::error::ApiError;

/// Cart, wishlist and catalog adapters.
#[derive(Clone)]
pub struct Stores {
    pub carts: Arc<dyn CartStore>,
    pub wishlist: Arc<dyn WishlistStore>,
    pub catalog: Arc<dyn CatalogStore>,
}

impl Stores {
    pub fn in_memory(catalog: InMemoryCatalogStore) -> Self {
        Self {
            carts: Arc::new(InMemoryCartStore::new()),
            wishlist: Arc::new(InMemoryWishlistStore::new()),
            catalog: Arc::new(catalog),
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            carts: Arc::new(PostgresCartStore::new(pool.clone())),
            wishlist: Arc::new(PostgresWishlistStore::new(pool.clone())),
            catalog: Arc::new(PostgresCatalogStore::new(pool)),
        }
    }
}

/// Shared application state accessible from all handlers.
pub struct AppState<S: EventStore> {
    pub carts: CartService,
    pub orders: OrderService<S>,
    pub wishlist: WishlistService,
    pub catalog: CatalogService,
    pub order_summaries: OrderSummariesView,
    pub dashboard: SalesDashboardView,
    pub projection_processor: Arc<ProjectionProcessor<S>>,
}

impl<S: EventStore + Clone + 'static> AppState<S> {
    pub fn new(event_store: S, stores: Stores, shipping_fee: Money) -> Arc<Self> {
        let order_summaries = OrderSummariesView::new();
        let dashboard = SalesDashboardView::new();

        let mut processor = ProjectionProcessor::new(event_store.clone());
        processor.register(Box::new(order_summaries.clone()));
        processor.register(Box::new(dashboard.clone()));

        Arc::new(Self {
            carts: CartService::new(stores.carts.clone(), stores.catalog.clone()),
            orders: OrderService::new(
                event_store,
                stores.carts,
                stores.catalog.clone(),
                shipping_fee,
            ),
            wishlist: WishlistService::new(stores.wishlist, stores.catalog.clone()),
            catalog: CatalogService::new(stores.catalog),
            order_summaries,
            dashboard,
            projection_processor: Arc::new(processor),
        })
    }

    /// Brings the read models up to date with the order log.
    pub async fn refresh_views(&self) -> Result<(), ApiError> {
        self.projection_processor.run_catch_up().await?;
        Ok(())
    }
}
