//! API error types with HTTP response mapping.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{DomainError, ErrorKind, Recovery};
use projections::ProjectionError;
use serde::Serialize;
use store::StoreError;
use thiserror::Error;

/// API-level error type that maps to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No identity was supplied with the request.
    #[error("authentication required")]
    Unauthenticated,

    /// Malformed path or query input.
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Projection(#[from] ProjectionError),
}

/// JSON error body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    pub kind: &'static str,
    pub recovery: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_url: Option<String>,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Unauthenticated => ErrorKind::Unauthorized,
            ApiError::BadRequest(_) => ErrorKind::Validation,
            ApiError::Domain(err) => err.kind(),
            ApiError::Projection(_) => ErrorKind::Transient,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Domain(DomainError::Store(StoreError::ConcurrencyConflict { .. })) => {
                StatusCode::CONFLICT
            }
            other => match other.kind() {
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::EmptyCart => StatusCode::CONFLICT,
                ErrorKind::Unauthorized => StatusCode::FORBIDDEN,
                ErrorKind::Transient => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = ErrorBody {
            error: self.to_string(),
            kind: kind.as_str(),
            recovery: Recovery::from(kind).as_str(),
            login_url: None,
        };
        let mut response = (status, Json(body.clone())).into_response();
        response.extensions_mut().insert(body);
        response
    }
}

/// Adds the configured login URL to responses whose recovery is re-authentication.
pub async fn attach_login_url(
    State(login_url): State<Arc<str>>,
    mut response: Response,
) -> Response {
    match response.extensions_mut().remove::<ErrorBody>() {
        Some(mut body) if body.recovery == Recovery::Reauthenticate.as_str() => {
            body.login_url = Some(login_url.to_string());
            (response.status(), Json(body)).into_response()
        }
        _ => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{AggregateId, NotAdmin, UserId};
    use domain::ValidationError;
    use store::Version;

    #[test]
    fn status_mapping() {
        let cases: Vec<(ApiError, StatusCode)> = vec![
            (ApiError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (
                DomainError::from(NotAdmin {
                    user_id: UserId::new("alice"),
                })
                .into(),
                StatusCode::FORBIDDEN,
            ),
            (
                DomainError::from(ValidationError::QuantityOutOfRange { quantity: 100 }).into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                DomainError::not_found("cart line", 3).into(),
                StatusCode::NOT_FOUND,
            ),
            (DomainError::EmptyCart.into(), StatusCode::CONFLICT),
            (
                DomainError::from(StoreError::ConcurrencyConflict {
                    aggregate_id: AggregateId::new(),
                    expected: Version::first(),
                    actual: Version::new(2),
                })
                .into(),
                StatusCode::CONFLICT,
            ),
            (
                DomainError::from(StoreError::CorruptRecord("x".to_string())).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.status(), status, "{err}");
        }
    }

    #[test]
    fn body_carries_kind_and_recovery() {
        let response = ApiError::from(DomainError::EmptyCart).into_response();
        let body = response.extensions().get::<ErrorBody>().unwrap();
        assert_eq!(body.kind, "empty_cart");
        assert_eq!(body.recovery, Recovery::ReturnToCatalog.as_str());
        assert!(body.login_url.is_none());
    }
}
