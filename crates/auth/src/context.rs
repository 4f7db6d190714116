use farmxchain_core::AccountId;

use crate::{Authority, Role, SessionClaims};

/// Request-scoped identity resolved from a verified session token.
///
/// Created once per request by the authentication gate and dropped with the
/// request. Its absence means the request is anonymous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityContext {
    subject: String,
    authority: Authority,
    account_id: AccountId,
}

impl SecurityContext {
    pub fn new(subject: impl Into<String>, authority: Authority, account_id: AccountId) -> Self {
        Self {
            subject: subject.into(),
            authority,
            account_id,
        }
    }

    /// Build from verified claims, normalizing the role to authority form.
    pub fn from_claims(claims: &SessionClaims) -> Self {
        Self::new(
            claims.sub.clone(),
            Authority::from_role_str(&claims.role),
            claims.account_id,
        )
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn has_role(&self, role: &Role) -> bool {
        self.authority.grants(role)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn from_claims_canonicalizes_role() {
        let claims = SessionClaims::new(AccountId::new(42), "a@b.com", &Role::FARMER, Utc::now());
        let ctx = SecurityContext::from_claims(&claims);

        assert_eq!(ctx.subject(), "a@b.com");
        assert_eq!(ctx.authority().as_str(), "ROLE_FARMER");
        assert_eq!(ctx.account_id(), AccountId::new(42));
        assert!(ctx.has_role(&Role::FARMER));
    }
}
