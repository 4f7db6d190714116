use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use farmxchain_auth::SecurityContext;

use crate::app::errors::ApiError;

/// The caller's security context, as installed by the authentication gate.
///
/// Rejects with the uniform 403 when the request is anonymous, so a handler
/// taking this argument never runs without an identity.
#[derive(Debug, Clone)]
pub struct Authenticated(pub SecurityContext);

#[async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SecurityContext>()
            .cloned()
            .map(Authenticated)
            .ok_or(ApiError::Forbidden)
    }
}
