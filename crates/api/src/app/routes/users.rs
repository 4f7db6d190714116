use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use farmxchain_auth::{Registration, hash_password, normalize_email, verify_password};

use crate::app::dto::{LoginRequest, LoginResponse, MeResponse, RegisterRequest, RegisterResponse, UserView};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::Authenticated;

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<RegisterRequest>,
) -> Result<Response, ApiError> {
    let valid = Registration::from(body).validate()?;

    let password = valid.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::internal("hashing task", e))??;

    let account = services
        .accounts
        .insert(valid.into_new_account(password_hash))
        .await?;

    let token = services.codec.issue(account.id, &account.email, &account.role)?;
    tracing::info!(account_id = %account.id, role = %account.role.as_str(), "account registered");

    let response = RegisterResponse {
        token,
        role: account.role.as_str().to_string(),
        user: UserView::from(&account),
    };
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = normalize_email(&body.email).map_err(|_| ApiError::InvalidCredentials)?;

    let Some(account) = services.accounts.find_by_email(&email).await? else {
        return Err(ApiError::InvalidCredentials);
    };

    let hash = account.password_hash.clone();
    let password = body.password;
    let verified = tokio::task::spawn_blocking(move || verify_password(&hash, &password))
        .await
        .map_err(|e| ApiError::internal("verification task", e))?;
    if !verified {
        return Err(ApiError::InvalidCredentials);
    }

    let token = services.codec.issue(account.id, &account.email, &account.role)?;
    tracing::info!(account_id = %account.id, "login succeeded");

    Ok(Json(LoginResponse {
        token,
        role: account.role.as_str().to_string(),
        email: account.email,
    }))
}

pub async fn me(Authenticated(ctx): Authenticated) -> Json<MeResponse> {
    Json(MeResponse::from(&ctx))
}
