use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;

use farmxchain_auth::{Account, NewAccount};
use farmxchain_core::AccountId;

use super::{StoreError, StoreResult, poisoned};

/// Persistence for registered accounts. Emails are unique.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// `Conflict` when the email is already registered.
    async fn insert(&self, new: NewAccount) -> StoreResult<Account>;
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>>;
}

#[async_trait]
impl<S> AccountStore for Arc<S>
where
    S: AccountStore + ?Sized,
{
    async fn insert(&self, new: NewAccount) -> StoreResult<Account> {
        (**self).insert(new).await
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        (**self).find_by_email(email).await
    }
}

/// In-memory account store for tests/dev, keyed by normalized email.
#[derive(Debug)]
pub struct InMemoryAccountStore {
    by_email: RwLock<HashMap<String, Account>>,
    next_id: AtomicI64,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self {
            by_email: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn insert(&self, new: NewAccount) -> StoreResult<Account> {
        let mut map = self.by_email.write().map_err(|_| poisoned())?;
        if map.contains_key(&new.email) {
            return Err(StoreError::Conflict(format!("email {} already registered", new.email)));
        }

        let account = Account {
            id: AccountId::new(self.next_id.fetch_add(1, Ordering::Relaxed)),
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            role: new.role,
            created_at: Utc::now(),
        };
        map.insert(account.email.clone(), account.clone());
        Ok(account)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let map = self.by_email.read().map_err(|_| poisoned())?;
        Ok(map.get(email).cloned())
    }
}

#[cfg(test)]
mod tests {
    use farmxchain_auth::Role;

    use super::*;

    fn new_account(email: &str) -> NewAccount {
        NewAccount {
            name: "Asha".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$v=19$stub".to_string(),
            role: Role::FARMER,
        }
    }

    #[tokio::test]
    async fn insert_then_find() {
        let store = InMemoryAccountStore::new();
        let account = store.insert(new_account("a@b.com")).await.unwrap();

        let found = store.find_by_email("a@b.com").await.unwrap().unwrap();
        assert_eq!(found.id, account.id);
        assert_eq!(found.role, Role::FARMER);
        assert!(store.find_by_email("nobody@b.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = InMemoryAccountStore::new();
        store.insert(new_account("a@b.com")).await.unwrap();
        let err = store.insert(new_account("a@b.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn ids_are_distinct() {
        let store = InMemoryAccountStore::new();
        let a = store.insert(new_account("a@b.com")).await.unwrap();
        let b = store.insert(new_account("c@d.com")).await.unwrap();
        assert_ne!(a.id, b.id);
    }
}
