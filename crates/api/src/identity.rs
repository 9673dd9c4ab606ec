//! Caller identity asserted by the upstream identity provider.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use common::{Identity, UserId};

use crate::error::ApiError;

/// Subject of the authenticated user.
pub const USER_ID_HEADER: &str = "x-user-id";

/// `true` or `1` when the user holds the admin role.
pub const ADMIN_HEADER: &str = "x-user-admin";

/// Extracts the caller's [`Identity`]; requests without one are rejected with 401.
#[derive(Debug, Clone)]
pub struct Caller(pub Identity);

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(ApiError::Unauthenticated)?;

        let is_admin = parts
            .headers
            .get(ADMIN_HEADER)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| matches!(value.trim(), "true" | "1"));

        Ok(Caller(Identity {
            user_id: UserId::new(user_id),
            is_admin,
        }))
    }
}
