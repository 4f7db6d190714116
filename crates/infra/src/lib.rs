//! Infrastructure layer: persistence and external service adapters.
//!
//! Handlers only see the traits ([`ProductStore`], [`AccountStore`],
//! [`ImageHost`]); in-memory adapters back dev and tests, Postgres adapters
//! are compiled in with the `postgres` feature.

pub mod images;
pub mod store;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use images::{ImageHost, ImageHostError, ImageUpload, InMemoryImageHost};
pub use store::{
    AccountStore, InMemoryAccountStore, InMemoryProductStore, ProductStore, StoreError, StoreResult,
};

#[cfg(feature = "postgres")]
pub use postgres::{PostgresAccountStore, PostgresProductStore, connect, ensure_schema};
