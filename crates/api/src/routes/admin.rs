//! Admin console endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use domain::DomainError;
use projections::DashboardStats;
use serde::Serialize;
use store::{EventStore, ProductFilter};

use super::products::ProductResponse;
use crate::error::ApiError;
use crate::identity::Caller;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    #[serde(flatten)]
    pub orders: DashboardStats,
    pub active_products: usize,
}

/// GET /api/admin/stats
#[tracing::instrument(skip(state, identity), fields(admin = %identity.user_id))]
pub async fn stats<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(identity): Caller,
) -> Result<Json<StatsResponse>, ApiError> {
    identity.require_admin().map_err(DomainError::from)?;

    state.refresh_views().await?;
    Ok(Json(StatsResponse {
        orders: state.dashboard.stats().await,
        active_products: state.catalog.active_count().await?,
    }))
}

/// GET /api/admin/products: every product, including inactive ones.
#[tracing::instrument(skip(state, identity), fields(admin = %identity.user_id))]
pub async fn products<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(identity): Caller,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    identity.require_admin().map_err(DomainError::from)?;

    let products = state.catalog.list(ProductFilter::default()).await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}
