use axum::extract::Multipart;
use serde::{Deserialize, Serialize};

use farmxchain_auth::{Account, Registration, SecurityContext};
use farmxchain_core::AccountId;
use farmxchain_infra::ImageUpload;
use farmxchain_products::{GeoPoint, ListingInput};

use crate::app::errors::ApiError;

// -------------------------
// Accounts
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

impl From<RegisterRequest> for Registration {
    fn from(req: RegisterRequest) -> Self {
        Registration {
            name: req.name,
            email: req.email,
            password: req.password,
            role: req.role,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: AccountId,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl From<&Account> for UserView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            name: account.name.clone(),
            email: account.email.clone(),
            role: account.role.as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub token: String,
    pub role: String,
    pub user: UserView,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub subject: String,
    pub authority: String,
    pub account_id: AccountId,
}

impl From<&SecurityContext> for MeResponse {
    fn from(ctx: &SecurityContext) -> Self {
        Self {
            subject: ctx.subject().to_string(),
            authority: ctx.authority().as_str().to_string(),
            account_id: ctx.account_id(),
        }
    }
}

// -------------------------
// Product multipart form
// -------------------------

/// Fields of the create/edit product form, as sent by the web client.
#[derive(Debug, Default)]
pub struct ProductForm {
    pub listing: ListingInput,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    /// `None` when no file (or an empty one) was attached.
    pub image: Option<ImageUpload>,
}

impl ProductForm {
    /// Unknown fields are ignored; missing text fields stay empty and fail validation later.
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = ProductForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "image" => {
                    let file_name = field.file_name().unwrap_or("image").to_string();
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await?;
                    if !bytes.is_empty() {
                        form.image = Some(ImageUpload {
                            file_name,
                            content_type,
                            bytes: bytes.to_vec(),
                        });
                    }
                }
                "cropType" => form.listing.crop_type = field.text().await?,
                "soilType" => form.listing.soil_type = field.text().await?,
                "pesticides" => form.listing.pesticides = field.text().await?,
                "harvestDate" => form.listing.harvest_date = field.text().await?,
                "latitude" => form.latitude = Some(field.text().await?),
                "longitude" => form.longitude = Some(field.text().await?),
                other => tracing::debug!(field = other, "ignoring unknown form field"),
            }
        }

        Ok(form)
    }

    /// Location is only accepted on create.
    pub fn location(&self) -> Result<GeoPoint, ApiError> {
        let latitude = self
            .latitude
            .as_deref()
            .ok_or_else(|| ApiError::Validation("latitude is required".to_string()))?;
        let longitude = self
            .longitude
            .as_deref()
            .ok_or_else(|| ApiError::Validation("longitude is required".to_string()))?;
        Ok(GeoPoint::parse(latitude, longitude)?)
    }
}
