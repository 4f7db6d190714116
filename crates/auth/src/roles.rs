use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use farmxchain_core::DomainError;

/// Prefix that marks a role string as a canonical authority.
pub const AUTHORITY_PREFIX: &str = "ROLE_";

/// Role identifier carried in session tokens.
///
/// Roles are bare upper-case names (`FARMER`). Routes declare the role they
/// require; requests are checked against the caller's [`Authority`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    /// The role that owns and manages produce listings.
    pub const FARMER: Role = Role(Cow::Borrowed("FARMER"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Parse user-supplied role input into its bare canonical name.
    ///
    /// Input is trimmed and upper-cased; a leading `ROLE_` is stripped. Only
    /// `A-Z` and `_` are accepted.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let upper = raw.trim().to_uppercase();
        let bare = upper.strip_prefix(AUTHORITY_PREFIX).unwrap_or(&upper);

        if bare.is_empty() {
            return Err(DomainError::validation("role must not be empty"));
        }
        if !bare.chars().all(|c| c.is_ascii_uppercase() || c == '_') {
            return Err(DomainError::validation(format!("invalid role '{}'", raw.trim())));
        }

        Ok(Self(Cow::Owned(bare.to_string())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical authority granted by this role.
    pub fn authority(&self) -> Authority {
        Authority::from_role_str(self.as_str())
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical, `ROLE_`-prefixed authority string (e.g. `ROLE_FARMER`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Authority(String);

impl Authority {
    /// Normalize a raw role claim into authority form.
    ///
    /// Values already carrying the prefix pass through unchanged; bare values are
    /// upper-cased and prefixed.
    pub fn from_role_str(raw: &str) -> Self {
        if raw.starts_with(AUTHORITY_PREFIX) {
            Self(raw.to_string())
        } else {
            Self(format!("{AUTHORITY_PREFIX}{}", raw.to_uppercase()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this authority is the one granted by `role`.
    pub fn grants(&self, role: &Role) -> bool {
        *self == role.authority()
    }
}

impl core::fmt::Display for Authority {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_role_gets_prefixed() {
        assert_eq!(Authority::from_role_str("FARMER").as_str(), "ROLE_FARMER");
        assert_eq!(Authority::from_role_str("farmer").as_str(), "ROLE_FARMER");
    }

    #[test]
    fn prefixed_role_passes_through_unchanged() {
        assert_eq!(Authority::from_role_str("ROLE_FARMER").as_str(), "ROLE_FARMER");
        assert_eq!(Authority::from_role_str("ROLE_custom").as_str(), "ROLE_custom");
    }

    #[test]
    fn farmer_authority_grants_farmer_role_only() {
        let authority = Role::FARMER.authority();
        assert!(authority.grants(&Role::FARMER));
        assert!(!authority.grants(&Role::new("BUYER")));
    }

    #[test]
    fn parse_normalizes_user_input() {
        assert_eq!(Role::parse(" farmer ").unwrap(), Role::FARMER);
        assert_eq!(Role::parse("ROLE_FARMER").unwrap(), Role::FARMER);
        assert_eq!(Role::parse("supply_chain").unwrap().as_str(), "SUPPLY_CHAIN");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Role::parse("").is_err());
        assert!(Role::parse("ROLE_").is_err());
        assert!(Role::parse("farmer1").is_err());
        assert!(Role::parse("far mer").is_err());
    }
}
