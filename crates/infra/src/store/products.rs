use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;

use farmxchain_core::{AccountId, ProductId};
use farmxchain_products::{NewProduct, Product};

use super::{StoreError, StoreResult, poisoned};

/// Persistence for produce listings.
///
/// The store assigns ids on insert and never interprets ownership; the caller
/// runs the ownership gate against the `owner_id` it reads back.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn insert(&self, new: NewProduct) -> StoreResult<Product>;
    async fn get(&self, id: ProductId) -> StoreResult<Option<Product>>;
    /// Replace a stored listing; `NotFound` if it no longer exists.
    async fn update(&self, product: Product) -> StoreResult<Product>;
    /// Returns whether a listing was removed.
    async fn delete(&self, id: ProductId) -> StoreResult<bool>;
    async fn list_all(&self) -> StoreResult<Vec<Product>>;
    async fn list_by_owner(&self, owner_id: AccountId) -> StoreResult<Vec<Product>>;
}

#[async_trait]
impl<S> ProductStore for Arc<S>
where
    S: ProductStore + ?Sized,
{
    async fn insert(&self, new: NewProduct) -> StoreResult<Product> {
        (**self).insert(new).await
    }

    async fn get(&self, id: ProductId) -> StoreResult<Option<Product>> {
        (**self).get(id).await
    }

    async fn update(&self, product: Product) -> StoreResult<Product> {
        (**self).update(product).await
    }

    async fn delete(&self, id: ProductId) -> StoreResult<bool> {
        (**self).delete(id).await
    }

    async fn list_all(&self) -> StoreResult<Vec<Product>> {
        (**self).list_all().await
    }

    async fn list_by_owner(&self, owner_id: AccountId) -> StoreResult<Vec<Product>> {
        (**self).list_by_owner(owner_id).await
    }
}

/// In-memory product store for tests/dev. Listings come back in id order.
#[derive(Debug)]
pub struct InMemoryProductStore {
    inner: RwLock<BTreeMap<ProductId, Product>>,
    next_id: AtomicI64,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Seed with existing listings, keeping their ids.
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let map: BTreeMap<ProductId, Product> = products.into_iter().map(|p| (p.id, p)).collect();
        let next = map.keys().next_back().map_or(1, |id| id.get() + 1);
        Self {
            inner: RwLock::new(map),
            next_id: AtomicI64::new(next),
        }
    }
}

impl Default for InMemoryProductStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn insert(&self, new: NewProduct) -> StoreResult<Product> {
        let id = ProductId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let product = Product::from_new(id, new, Utc::now());
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.insert(id, product.clone());
        Ok(product)
    }

    async fn get(&self, id: ProductId) -> StoreResult<Option<Product>> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn update(&self, product: Product) -> StoreResult<Product> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        match map.get_mut(&product.id) {
            Some(slot) => {
                *slot = product.clone();
                Ok(product)
            }
            None => Err(StoreError::NotFound(format!("product {}", product.id))),
        }
    }

    async fn delete(&self, id: ProductId) -> StoreResult<bool> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        Ok(map.remove(&id).is_some())
    }

    async fn list_all(&self) -> StoreResult<Vec<Product>> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.values().cloned().collect())
    }

    async fn list_by_owner(&self, owner_id: AccountId) -> StoreResult<Vec<Product>> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.values().filter(|p| p.owner_id == owner_id).cloned().collect())
    }
}
