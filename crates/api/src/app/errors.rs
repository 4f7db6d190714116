use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use farmxchain_auth::{AccessError, PasswordError, TokenError};
use farmxchain_core::DomainError;
use farmxchain_infra::{ImageHostError, StoreError};

/// Every failure a handler or middleware can surface to a client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing credential, wrong role or not the owner. One body for all three.
    #[error("forbidden")]
    Forbidden,

    #[error("not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    InvalidId(String),

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("{0}")]
    Conflict(String),

    #[error("request body too large")]
    PayloadTooLarge,

    /// Details are logged, never returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal(context: &str, err: impl core::fmt::Display) -> Self {
        ApiError::Internal(format!("{context}: {err}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Forbidden => json_error(StatusCode::FORBIDDEN, "forbidden", "forbidden"),
            ApiError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
            ApiError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
            ApiError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
            ApiError::InvalidCredentials => json_error(
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                "invalid email or password",
            ),
            ApiError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
            ApiError::PayloadTooLarge => json_error(
                StatusCode::PAYLOAD_TOO_LARGE,
                "payload_too_large",
                "request body too large",
            ),
            ApiError::Internal(detail) => {
                tracing::error!(%detail, "request failed");
                json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal server error",
                )
            }
        }
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Unauthenticated | AccessError::Forbidden => ApiError::Forbidden,
            AccessError::NotFound => ApiError::NotFound,
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => ApiError::Validation(msg),
            DomainError::InvalidId(msg) => ApiError::InvalidId(msg),
            DomainError::NotFound => ApiError::NotFound,
            DomainError::Conflict(msg) => ApiError::Conflict(msg),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => ApiError::Conflict(msg),
            StoreError::NotFound(_) => ApiError::NotFound,
            StoreError::Backend(msg) => ApiError::internal("store", msg),
        }
    }
}

impl From<ImageHostError> for ApiError {
    fn from(err: ImageHostError) -> Self {
        match err {
            ImageHostError::Empty => ApiError::Validation("image must not be empty".to_string()),
            ImageHostError::Unavailable(msg) => ApiError::internal("image host", msg),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        ApiError::internal("token", err)
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::internal("password hashing", err)
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ApiError::Validation(err.body_text())
        }
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn unauthenticated_and_forbidden_share_one_response() {
        let a = ApiError::from(AccessError::Unauthenticated).into_response();
        let b = ApiError::from(AccessError::Forbidden).into_response();
        assert_eq!(a.status(), StatusCode::FORBIDDEN);
        assert_eq!(b.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(a).await, body_json(b).await);
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let response = ApiError::from(StoreError::Backend("password=hunter2".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert!(!body.to_string().contains("hunter2"));
    }

    #[test]
    fn domain_errors_map_to_client_errors() {
        assert!(matches!(
            ApiError::from(DomainError::invalid_id("ProductId: abc")),
            ApiError::InvalidId(_)
        ));
        assert!(matches!(
            ApiError::from(StoreError::Conflict("dup".to_string())),
            ApiError::Conflict(_)
        ));
        assert!(matches!(ApiError::from(AccessError::NotFound), ApiError::NotFound));
    }
}
