//! HTTP API for the storefront.
//!
//! REST endpoints for the cart, checkout, order tracking, the wishlist and
//! catalog administration, with structured logging (tracing) and Prometheus
//! metrics. Successful mutations name the client caches they invalidate in
//! the `x-invalidate` response header.

pub mod config;
pub mod error;
pub mod extract;
pub mod identity;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{delete, get, put};
use metrics_exporter_prometheus::PrometheusHandle;
use store::EventStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::{Config, LogFormat};
pub use error::ApiError;
pub use state::{AppState, Stores};

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: EventStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
    login_url: &str,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    let api = Router::new()
        .route(
            "/api/cart",
            get(routes::cart::list::<S>)
                .post(routes::cart::add::<S>)
                .delete(routes::cart::clear::<S>),
        )
        .route(
            "/api/cart/{id}",
            put(routes::cart::update::<S>).delete(routes::cart::remove::<S>),
        )
        .route(
            "/api/orders",
            get(routes::orders::list::<S>).post(routes::orders::create::<S>),
        )
        .route("/api/orders/{id}", get(routes::orders::get::<S>))
        .route(
            "/api/orders/{id}/status",
            put(routes::orders::update_status::<S>),
        )
        .route(
            "/api/wishlist",
            get(routes::wishlist::list::<S>).post(routes::wishlist::add::<S>),
        )
        .route(
            "/api/wishlist/{product_id}",
            delete(routes::wishlist::remove::<S>),
        )
        .route(
            "/api/products",
            get(routes::products::list::<S>).post(routes::products::create::<S>),
        )
        .route(
            "/api/products/{id}",
            get(routes::products::get::<S>)
                .put(routes::products::update::<S>)
                .delete(routes::products::delete::<S>),
        )
        .route("/api/categories", get(routes::products::categories::<S>))
        .route("/api/admin/stats", get(routes::admin::stats::<S>))
        .route("/api/admin/products", get(routes::admin::products::<S>))
        .with_state(state)
        .layer(middleware::map_response_with_state(
            Arc::<str>::from(login_url),
            error::attach_login_url,
        ));

    Router::new()
        .route("/health", get(routes::health::check))
        .merge(api)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers([axum::http::HeaderName::from_static(
                    routes::INVALIDATE_HEADER,
                )]),
        )
        .layer(TraceLayer::new_for_http())
}
