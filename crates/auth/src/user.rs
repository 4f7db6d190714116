//! Registered accounts and registration input validation.

use chrono::{DateTime, Utc};

use farmxchain_core::{AccountId, DomainError, DomainResult, Entity};

use crate::Role;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_NAME_LEN: usize = 100;

// ─────────────────────────────────────────────────────────────────────────────
// Account
// ─────────────────────────────────────────────────────────────────────────────

/// A registered account.
///
/// # Invariants
/// - `email` is trimmed, lower-cased and unique across accounts.
/// - `password_hash` is a PHC string; the plain password is never stored.
/// - `id` never changes once assigned by the store.
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Entity for Account {
    type Id = AccountId;

    fn id(&self) -> AccountId {
        self.id
    }
}

impl core::fmt::Debug for Account {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// Account data ready to be persisted (id assigned by the store).
#[derive(Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

impl core::fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NewAccount")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Registration
// ─────────────────────────────────────────────────────────────────────────────

/// Raw registration input as received from a client.
#[derive(Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

/// Registration input that passed validation. The password is still plain text
/// and must be hashed before building a [`NewAccount`].
#[derive(Clone)]
pub struct ValidRegistration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl Registration {
    /// Validate and normalize; role defaults to [`Role::FARMER`].
    pub fn validate(self) -> DomainResult<ValidRegistration> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("name must not be empty"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(DomainError::validation(format!(
                "name must be at most {MAX_NAME_LEN} characters"
            )));
        }

        let email = normalize_email(&self.email)?;

        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let role = match self.role.as_deref() {
            None => Role::FARMER,
            Some(raw) if raw.trim().is_empty() => Role::FARMER,
            Some(raw) => Role::parse(raw)?,
        };

        Ok(ValidRegistration {
            name,
            email,
            password: self.password,
            role,
        })
    }
}

impl ValidRegistration {
    pub fn into_new_account(self, password_hash: String) -> NewAccount {
        NewAccount {
            name: self.name,
            email: self.email,
            password_hash,
            role: self.role,
        }
    }
}

/// Trim and lower-case an email; require a local part and a domain.
pub fn normalize_email(raw: &str) -> DomainResult<String> {
    let email = raw.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(email)
        }
        _ => Err(DomainError::validation("email must look like name@domain")),
    }
}
