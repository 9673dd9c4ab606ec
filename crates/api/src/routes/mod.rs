//! HTTP route handlers.

pub mod admin;
pub mod cart;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod products;
pub mod wishlist;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::Committed;
use serde::Serialize;

/// Response header listing the query keys a successful mutation invalidated.
pub const INVALIDATE_HEADER: &str = "x-invalidate";

/// Renders a committed mutation as JSON plus its invalidation header.
pub(crate) fn committed<T: Serialize>(status: StatusCode, committed: Committed<T>) -> Response {
    let invalidate = committed.invalidation_header();
    (
        status,
        [(INVALIDATE_HEADER, invalidate)],
        Json(committed.into_value()),
    )
        .into_response()
}

/// Renders a committed mutation with no body as `204 No Content`.
pub(crate) fn committed_empty<T>(committed: Committed<T>) -> Response {
    (
        StatusCode::NO_CONTENT,
        [(INVALIDATE_HEADER, committed.invalidation_header())],
    )
        .into_response()
}
