//! Postgres-backed stores (feature `postgres`).
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (other) | Any other | `Backend` |
//! | PoolClosed / other | N/A | `Backend` |

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::instrument;

use farmxchain_auth::{Account, NewAccount, Role};
use farmxchain_core::{AccountId, ProductId};
use farmxchain_products::{GeoPoint, NewProduct, Product};

use crate::store::{AccountStore, ProductStore, StoreError, StoreResult};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS accounts (
        id            BIGSERIAL PRIMARY KEY,
        name          TEXT NOT NULL,
        email         TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role          TEXT NOT NULL,
        created_at    TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id           BIGSERIAL PRIMARY KEY,
        owner_id     BIGINT NOT NULL,
        crop_type    TEXT NOT NULL,
        soil_type    TEXT NOT NULL,
        pesticides   TEXT NOT NULL,
        harvest_date DATE NOT NULL,
        latitude     DOUBLE PRECISION NOT NULL,
        longitude    DOUBLE PRECISION NOT NULL,
        image_url    TEXT NOT NULL,
        created_at   TIMESTAMPTZ NOT NULL,
        updated_at   TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS products_owner_idx ON products (owner_id)",
];

/// Open a connection pool.
pub async fn connect(database_url: &str) -> StoreResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .map_err(|e| map_sqlx_error("connect", e))
}

/// Create the `accounts` and `products` tables if they are missing.
#[instrument(skip(pool), err)]
pub async fn ensure_schema(pool: &PgPool) -> StoreResult<()> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
    }
    Ok(())
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Products
// ─────────────────────────────────────────────────────────────────────────────

const PRODUCT_COLUMNS: &str = "id, owner_id, crop_type, soil_type, pesticides, harvest_date, \
                               latitude, longitude, image_url, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PostgresProductStore {
    pool: Arc<PgPool>,
}

impl PostgresProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

fn product_from_row(row: &PgRow) -> StoreResult<Product> {
    let read = |e: sqlx::Error| StoreError::Backend(format!("failed to read product row: {e}"));

    let location = GeoPoint::new(
        row.try_get::<f64, _>("latitude").map_err(read)?,
        row.try_get::<f64, _>("longitude").map_err(read)?,
    )
    .map_err(|e| StoreError::Backend(format!("stored location is invalid: {e}")))?;

    Ok(Product {
        id: ProductId::new(row.try_get("id").map_err(read)?),
        owner_id: AccountId::new(row.try_get("owner_id").map_err(read)?),
        crop_type: row.try_get("crop_type").map_err(read)?,
        soil_type: row.try_get("soil_type").map_err(read)?,
        pesticides: row.try_get("pesticides").map_err(read)?,
        harvest_date: row.try_get::<NaiveDate, _>("harvest_date").map_err(read)?,
        location,
        image_url: row.try_get("image_url").map_err(read)?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at").map_err(read)?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at").map_err(read)?,
    })
}

#[async_trait]
impl ProductStore for PostgresProductStore {
    #[instrument(skip(self, new), fields(owner_id = %new.owner_id), err)]
    async fn insert(&self, new: NewProduct) -> StoreResult<Product> {
        let now = Utc::now();
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO products
                (owner_id, crop_type, soil_type, pesticides, harvest_date,
                 latitude, longitude, image_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(new.owner_id.get())
        .bind(&new.details.crop_type)
        .bind(&new.details.soil_type)
        .bind(&new.details.pesticides)
        .bind(new.details.harvest_date)
        .bind(new.location.latitude())
        .bind(new.location.longitude())
        .bind(&new.image_url)
        .bind(now)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_product", e))?;

        product_from_row(&row)
    }

    #[instrument(skip(self), err)]
    async fn get(&self, id: ProductId) -> StoreResult<Option<Product>> {
        let row = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_product", e))?;

        row.as_ref().map(product_from_row).transpose()
    }

    #[instrument(skip(self, product), fields(id = %product.id), err)]
    async fn update(&self, product: Product) -> StoreResult<Product> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE products
            SET crop_type = $2, soil_type = $3, pesticides = $4, harvest_date = $5,
                image_url = $6, updated_at = $7
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(product.id.get())
        .bind(&product.crop_type)
        .bind(&product.soil_type)
        .bind(&product.pesticides)
        .bind(product.harvest_date)
        .bind(&product.image_url)
        .bind(product.updated_at)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_product", e))?;

        match row {
            Some(row) => product_from_row(&row),
            None => Err(StoreError::NotFound(format!("product {}", product.id))),
        }
    }

    #[instrument(skip(self), err)]
    async fn delete(&self, id: ProductId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_product", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    async fn list_all(&self) -> StoreResult<Vec<Product>> {
        let rows = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id ASC"))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_products", e))?;
        rows.iter().map(product_from_row).collect()
    }

    #[instrument(skip(self), err)]
    async fn list_by_owner(&self, owner_id: AccountId) -> StoreResult<Vec<Product>> {
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE owner_id = $1 ORDER BY id ASC"
        ))
        .bind(owner_id.get())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_products_by_owner", e))?;
        rows.iter().map(product_from_row).collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Accounts
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PostgresAccountStore {
    pool: Arc<PgPool>,
}

impl PostgresAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

fn account_from_row(row: &PgRow) -> StoreResult<Account> {
    let read = |e: sqlx::Error| StoreError::Backend(format!("failed to read account row: {e}"));
    let role: String = row.try_get("role").map_err(read)?;

    Ok(Account {
        id: AccountId::new(row.try_get("id").map_err(read)?),
        name: row.try_get("name").map_err(read)?,
        email: row.try_get("email").map_err(read)?,
        password_hash: row.try_get("password_hash").map_err(read)?,
        role: Role::parse(&role)
            .map_err(|e| StoreError::Backend(format!("stored role is invalid: {e}")))?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at").map_err(read)?,
    })
}

#[async_trait]
impl AccountStore for PostgresAccountStore {
    #[instrument(skip(self, new), err)]
    async fn insert(&self, new: NewAccount) -> StoreResult<Account> {
        let row = sqlx::query(
            r#"
            INSERT INTO accounts (name, email, password_hash, role, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, password_hash, role, created_at
            "#,
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(new.role.as_str())
        .bind(Utc::now())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_account", e))?;

        account_from_row(&row)
    }

    #[instrument(skip(self, email), err)]
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let row = sqlx::query(
            "SELECT id, name, email, password_hash, role, created_at FROM accounts WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_account_by_email", e))?;

        row.as_ref().map(account_from_row).transpose()
    }
}
