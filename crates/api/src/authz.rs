//! Route table for the role gate.
//!
//! Literal paths are listed before overlapping placeholder paths because the
//! first matching rule wins.

use farmxchain_auth::{Access, Role, RoutePolicy};

/// Paths the authentication gate skips entirely (exact match).
pub const PUBLIC_PATHS: &[&str] = &["/api/users/login", "/api/users/register"];

pub fn default_route_policy() -> RoutePolicy {
    RoutePolicy::new()
        .rule("GET", "/health", Access::Anyone)
        .rule("POST", "/api/users/register", Access::Anyone)
        .rule("POST", "/api/users/login", Access::Anyone)
        .rule("GET", "/api/users/me", Access::Authenticated)
        .rule("GET", "/api/products/all", Access::Anyone)
        .rule("GET", "/api/products/farmer/:farmer_id", Access::Anyone)
        .rule("GET", "/api/products", Access::Role(Role::FARMER))
        .rule("POST", "/api/products/add", Access::Role(Role::FARMER))
        .rule("PUT", "/api/products/edit/:id", Access::Role(Role::FARMER))
        .rule("GET", "/api/products/:id", Access::Role(Role::FARMER))
        .rule("DELETE", "/api/products/:id", Access::Role(Role::FARMER))
}

#[cfg(test)]
mod tests {
    use farmxchain_auth::{AccessError, Authority, SecurityContext};
    use farmxchain_core::AccountId;

    use super::*;

    fn ctx(role: &str) -> SecurityContext {
        SecurityContext::new("a@b.com", Authority::from_role_str(role), AccountId::new(42))
    }

    #[test]
    fn public_paths_are_open_in_the_table() {
        let policy = default_route_policy();
        for path in PUBLIC_PATHS {
            assert_eq!(policy.evaluate("POST", path, None), Ok(()), "{path}");
        }
    }

    #[test]
    fn listing_catalogue_is_public_but_by_id_is_farmer_only() {
        let policy = default_route_policy();
        assert_eq!(policy.evaluate("GET", "/api/products/all", None), Ok(()));
        assert_eq!(policy.evaluate("GET", "/api/products/farmer/9", None), Ok(()));
        assert_eq!(
            policy.evaluate("GET", "/api/products/all", Some(&ctx("BUYER"))),
            Ok(())
        );
        assert_eq!(
            policy.evaluate("GET", "/api/products/7", None),
            Err(AccessError::Unauthenticated)
        );
        assert_eq!(
            policy.evaluate("GET", "/api/products/7", Some(&ctx("BUYER"))),
            Err(AccessError::Forbidden)
        );
        assert_eq!(policy.evaluate("GET", "/api/products/7", Some(&ctx("FARMER"))), Ok(()));
    }

    #[test]
    fn mutations_require_farmer() {
        let policy = default_route_policy();
        let farmer = ctx("ROLE_FARMER");
        let buyer = ctx("BUYER");
        for (method, path) in [
            ("POST", "/api/products/add"),
            ("PUT", "/api/products/edit/3"),
            ("DELETE", "/api/products/3"),
            ("GET", "/api/products"),
        ] {
            assert_eq!(policy.evaluate(method, path, Some(&farmer)), Ok(()), "{method} {path}");
            assert_eq!(
                policy.evaluate(method, path, Some(&buyer)),
                Err(AccessError::Forbidden),
                "{method} {path}"
            );
        }
    }

    #[test]
    fn head_requests_follow_get_rows() {
        let policy = default_route_policy();
        assert_eq!(policy.evaluate("HEAD", "/health", None), Ok(()));
        assert_eq!(policy.evaluate("HEAD", "/api/products/all", None), Ok(()));
        assert_eq!(
            policy.evaluate("HEAD", "/api/products", Some(&ctx("BUYER"))),
            Err(AccessError::Forbidden)
        );
    }

    #[test]
    fn unlisted_routes_are_denied() {
        let policy = default_route_policy();
        assert!(policy.evaluate("PATCH", "/api/products/3", Some(&ctx("FARMER"))).is_err());
        assert!(policy.evaluate("GET", "/api/admin", None).is_err());
    }
}
