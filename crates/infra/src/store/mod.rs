//! Storage boundaries for accounts and product listings.

pub mod accounts;
pub mod products;

use thiserror::Error;

pub use accounts::{AccountStore, InMemoryAccountStore};
pub use products::{InMemoryProductStore, ProductStore};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness rule was violated (e.g. duplicate email).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The record was removed between read and write.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backing storage failed.
    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub(crate) fn poisoned() -> StoreError {
    StoreError::Backend("in-memory store lock poisoned".to_string())
}
