use std::sync::Arc;

use farmxchain_auth::TokenCodec;
use farmxchain_infra::{
    AccountStore, ImageHost, InMemoryAccountStore, InMemoryImageHost, InMemoryProductStore,
    ProductStore,
};

#[cfg(feature = "postgres")]
use farmxchain_infra::{PostgresAccountStore, PostgresProductStore, StoreError};

/// Shared collaborators handed to every handler (via `Extension`).
#[derive(Clone)]
pub struct AppServices {
    pub codec: Arc<TokenCodec>,
    pub products: Arc<dyn ProductStore>,
    pub accounts: Arc<dyn AccountStore>,
    pub images: Arc<dyn ImageHost>,
}

impl AppServices {
    pub fn new(
        codec: Arc<TokenCodec>,
        products: Arc<dyn ProductStore>,
        accounts: Arc<dyn AccountStore>,
        images: Arc<dyn ImageHost>,
    ) -> Self {
        Self {
            codec,
            products,
            accounts,
            images,
        }
    }

    /// Dev/test wiring: everything lives in process memory.
    pub fn in_memory(codec: Arc<TokenCodec>) -> Self {
        Self::new(
            codec,
            Arc::new(InMemoryProductStore::new()),
            Arc::new(InMemoryAccountStore::new()),
            Arc::new(InMemoryImageHost::new()),
        )
    }

    /// Postgres-backed accounts and products; images stay in memory.
    #[cfg(feature = "postgres")]
    pub async fn postgres(codec: Arc<TokenCodec>, database_url: &str) -> Result<Self, StoreError> {
        let pool = farmxchain_infra::connect(database_url).await?;
        farmxchain_infra::ensure_schema(&pool).await?;

        Ok(Self::new(
            codec,
            Arc::new(PostgresProductStore::new(pool.clone())),
            Arc::new(PostgresAccountStore::new(pool)),
            Arc::new(InMemoryImageHost::new()),
        ))
    }
}

impl core::fmt::Debug for AppServices {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppServices")
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}
