use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use farmxchain_core::{AccountId, DomainError, DomainResult, Entity, ProductId, ValueObject};

pub const MAX_TEXT_LEN: usize = 200;
pub const HARVEST_DATE_FORMAT: &str = "%Y-%m-%d";

// ─────────────────────────────────────────────────────────────────────────────
// Geolocation
// ─────────────────────────────────────────────────────────────────────────────

/// Where the produce was grown (WGS84 degrees).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl ValueObject for GeoPoint {}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> DomainResult<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(DomainError::validation("latitude must be between -90 and 90"));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(DomainError::validation("longitude must be between -180 and 180"));
        }
        Ok(Self { latitude, longitude })
    }

    /// Parse coordinates submitted as form text.
    pub fn parse(latitude: &str, longitude: &str) -> DomainResult<Self> {
        let lat = latitude
            .trim()
            .parse::<f64>()
            .map_err(|_| DomainError::validation("latitude must be a number"))?;
        let lon = longitude
            .trim()
            .parse::<f64>()
            .map_err(|_| DomainError::validation("longitude must be a number"))?;
        Self::new(lat, lon)
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Listing details
// ─────────────────────────────────────────────────────────────────────────────

/// Raw listing text as submitted by a farmer (create and edit share it).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingInput {
    pub crop_type: String,
    pub soil_type: String,
    pub pesticides: String,
    pub harvest_date: String,
}

/// Validated, normalized listing details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDetails {
    pub crop_type: String,
    pub soil_type: String,
    pub pesticides: String,
    pub harvest_date: NaiveDate,
}

impl ListingInput {
    pub fn validate(&self) -> DomainResult<ProductDetails> {
        Ok(ProductDetails {
            crop_type: required_text("cropType", &self.crop_type)?,
            soil_type: required_text("soilType", &self.soil_type)?,
            pesticides: optional_text("pesticides", &self.pesticides)?,
            harvest_date: parse_harvest_date(&self.harvest_date)?,
        })
    }
}

fn required_text(field: &str, value: &str) -> DomainResult<String> {
    let value = optional_text(field, value)?;
    if value.is_empty() {
        return Err(DomainError::validation(format!("{field} must not be empty")));
    }
    Ok(value)
}

fn optional_text(field: &str, value: &str) -> DomainResult<String> {
    let value = value.trim();
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(DomainError::validation(format!(
            "{field} must be at most {MAX_TEXT_LEN} characters"
        )));
    }
    Ok(value.to_string())
}

pub fn parse_harvest_date(raw: &str) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), HARVEST_DATE_FORMAT)
        .map_err(|_| DomainError::validation("harvestDate must be formatted YYYY-MM-DD"))
}

// ─────────────────────────────────────────────────────────────────────────────
// Product
// ─────────────────────────────────────────────────────────────────────────────

/// A listing ready to be persisted; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub owner_id: AccountId,
    pub details: ProductDetails,
    pub location: GeoPoint,
    pub image_url: String,
}

/// Changes a farmer may make to an existing listing.
///
/// Owner and location are fixed at creation. The image is replaced only when a
/// new one was uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductUpdate {
    pub details: ProductDetails,
    pub image_url: Option<String>,
}

/// A produce listing.
///
/// # Invariants
/// - `owner_id` never changes; only that account may read it by id, edit or delete it.
/// - `updated_at >= created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    #[serde(rename = "farmerId")]
    pub owner_id: AccountId,
    pub crop_type: String,
    pub soil_type: String,
    pub pesticides: String,
    pub harvest_date: NaiveDate,
    #[serde(flatten)]
    pub location: GeoPoint,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}

impl Product {
    pub fn from_new(id: ProductId, new: NewProduct, now: DateTime<Utc>) -> Self {
        Self {
            id,
            owner_id: new.owner_id,
            crop_type: new.details.crop_type,
            soil_type: new.details.soil_type,
            pesticides: new.details.pesticides,
            harvest_date: new.details.harvest_date,
            location: new.location,
            image_url: new.image_url,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, update: ProductUpdate, now: DateTime<Utc>) {
        self.crop_type = update.details.crop_type;
        self.soil_type = update.details.soil_type;
        self.pesticides = update.details.pesticides;
        self.harvest_date = update.details.harvest_date;
        if let Some(url) = update.image_url {
            self.image_url = url;
        }
        self.updated_at = now.max(self.created_at);
    }
}
