use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Multipart, Path},
    http::StatusCode,
};
use chrono::Utc;

use farmxchain_auth::{SecurityContext, ensure_owner};
use farmxchain_core::{AccountId, ProductId};
use farmxchain_products::{NewProduct, Product, ProductUpdate};

use crate::app::dto::ProductForm;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::Authenticated;

/// Fetch a listing and run the ownership gate against the caller.
async fn load_owned(
    services: &AppServices,
    ctx: &SecurityContext,
    id: ProductId,
) -> Result<Product, ApiError> {
    let product = services.products.get(id).await?;
    ensure_owner(ctx, product.as_ref().map(|p| p.owner_id))?;
    product.ok_or(ApiError::NotFound)
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Authenticated(ctx): Authenticated,
    multipart: Multipart,
) -> Result<Json<Product>, ApiError> {
    let form = ProductForm::read(multipart).await?;
    let details = form.listing.validate()?;
    let location = form.location()?;
    let image = form
        .image
        .ok_or_else(|| ApiError::Validation("image is required".to_string()))?;

    let image_url = services.images.upload(image).await?;
    let product = services
        .products
        .insert(NewProduct {
            owner_id: ctx.account_id(),
            details,
            location,
            image_url,
        })
        .await?;

    tracing::info!(product_id = %product.id, owner_id = %product.owner_id, "product listed");
    Ok(Json(product))
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Authenticated(ctx): Authenticated,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<Product>, ApiError> {
    let id: ProductId = id.parse()?;
    let mut product = load_owned(&services, &ctx, id).await?;

    let form = ProductForm::read(multipart).await?;
    let details = form.listing.validate()?;
    let image_url = match form.image {
        Some(image) => Some(services.images.upload(image).await?),
        None => None,
    };

    product.apply_update(ProductUpdate { details, image_url }, Utc::now());
    let product = services.products.update(product).await?;
    Ok(Json(product))
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Authenticated(ctx): Authenticated,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let id: ProductId = id.parse()?;
    Ok(Json(load_owned(&services, &ctx, id).await?))
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Authenticated(ctx): Authenticated,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: ProductId = id.parse()?;
    load_owned(&services, &ctx, id).await?;

    if !services.products.delete(id).await? {
        return Err(ApiError::NotFound);
    }
    tracing::info!(product_id = %id, "product deleted");
    Ok(StatusCode::OK)
}

pub async fn list_my_products(
    Extension(services): Extension<Arc<AppServices>>,
    Authenticated(ctx): Authenticated,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(services.products.list_by_owner(ctx.account_id()).await?))
}

pub async fn list_all_products(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(services.products.list_all().await?))
}

pub async fn list_farmer_products(
    Extension(services): Extension<Arc<AppServices>>,
    Path(farmer_id): Path<String>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let farmer_id: AccountId = farmer_id.parse()?;
    Ok(Json(services.products.list_by_owner(farmer_id).await?))
}
