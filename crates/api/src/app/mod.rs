//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: collaborator wiring (stores, image host, token codec)
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and multipart form parsing
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, extract::DefaultBodyLimit, http::Method, http::header};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use farmxchain_auth::TokenCodec;
use farmxchain_infra::StoreError;

use crate::authz::{PUBLIC_PATHS, default_route_policy};
use crate::config::ApiConfig;
use crate::middleware::{self, GateConfig};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Picks Postgres stores when the config asks for them and the `postgres`
/// feature is compiled in; otherwise everything is in memory.
pub async fn build_app(config: &ApiConfig) -> Result<Router, StoreError> {
    let codec = Arc::new(TokenCodec::new(config.signing_key.clone()));
    let services = build_services(codec, config).await?;
    Ok(build_router(services, config))
}

#[cfg(feature = "postgres")]
async fn build_services(codec: Arc<TokenCodec>, config: &ApiConfig) -> Result<AppServices, StoreError> {
    match config.database_url.as_deref() {
        Some(url) => {
            tracing::info!("using postgres stores");
            AppServices::postgres(codec, url).await
        }
        None => Ok(AppServices::in_memory(codec)),
    }
}

#[cfg(not(feature = "postgres"))]
async fn build_services(codec: Arc<TokenCodec>, config: &ApiConfig) -> Result<AppServices, StoreError> {
    if config.database_url.is_some() {
        tracing::warn!("persistent stores requested but the postgres feature is not compiled in; using in-memory stores");
    }
    Ok(AppServices::in_memory(codec))
}

/// Assemble routes and layers around already-built services.
///
/// Request flow (outermost first): tracing, CORS, body limit, authentication
/// gate, role gate, handler. `Cors` must stay inside `Trace`: it requires a
/// response body that implements `Default`.
pub fn build_router(services: AppServices, config: &ApiConfig) -> Router {
    let gate = Arc::new(GateConfig::new(services.codec.clone(), PUBLIC_PATHS.iter().copied()));
    let policy = Arc::new(default_route_policy());

    let cors = CorsLayer::new()
        .allow_origin(config.cors_origin.clone())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true);

    routes::router()
        .layer(Extension(Arc::new(services)))
        .layer(axum::middleware::from_fn_with_state(policy, middleware::authorize_route))
        .layer(axum::middleware::from_fn_with_state(gate, middleware::authentication_gate))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(config.max_upload_bytes)),
        )
}
