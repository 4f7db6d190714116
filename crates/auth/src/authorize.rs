//! Authorization policy: declarative route gating and resource ownership.
//!
//! - No IO
//! - No panics
//! - No business logic (pure policy checks)

use thiserror::Error;

use farmxchain_core::AccountId;

use crate::{Role, SecurityContext};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    /// No usable credential on a route that needs one.
    #[error("authentication required")]
    Unauthenticated,

    /// Authenticated, but wrong role or not the resource owner.
    #[error("forbidden")]
    Forbidden,

    /// The addressed resource does not exist.
    #[error("not found")]
    NotFound,
}

/// What a route demands of its caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// No identity required.
    Anyone,
    /// Any valid session, regardless of role.
    Authenticated,
    /// A valid session whose authority is granted by this role.
    Role(Role),
}

impl Access {
    pub fn check(&self, ctx: Option<&SecurityContext>) -> Result<(), AccessError> {
        match self {
            Access::Anyone => Ok(()),
            Access::Authenticated => ctx.map(|_| ()).ok_or(AccessError::Unauthenticated),
            Access::Role(role) => require_role(ctx, role),
        }
    }
}

/// Role gate: the caller must be authenticated and hold `role`.
pub fn require_role(ctx: Option<&SecurityContext>, role: &Role) -> Result<(), AccessError> {
    match ctx {
        None => Err(AccessError::Unauthenticated),
        Some(ctx) if ctx.has_role(role) => Ok(()),
        Some(_) => Err(AccessError::Forbidden),
    }
}

/// Ownership gate for a resource addressed by id.
///
/// `owner` is the owner recorded by the persistence layer, `None` when the
/// resource does not exist. Existence is checked before ownership.
pub fn ensure_owner(ctx: &SecurityContext, owner: Option<AccountId>) -> Result<(), AccessError> {
    match owner {
        None => Err(AccessError::NotFound),
        Some(owner) if owner == ctx.account_id() => Ok(()),
        Some(_) => Err(AccessError::Forbidden),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// Path pattern with `:name` placeholders, e.g. `/api/products/:id`.
///
/// A placeholder matches exactly one non-empty segment. A trailing slash on the
/// request path is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    segments: Vec<Segment>,
}

impl RoutePattern {
    pub fn parse(pattern: &str) -> Self {
        let segments = split_path(pattern)
            .map(|s| match s.strip_prefix(':') {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Literal(s.to_string()),
            })
            .collect();

        Self { segments }
    }

    pub fn matches(&self, path: &str) -> bool {
        let mut parts = split_path(path);
        for segment in &self.segments {
            let Some(part) = parts.next() else {
                return false;
            };
            match segment {
                Segment::Literal(lit) if lit != part => return false,
                Segment::Param(_) if part.is_empty() => return false,
                _ => {}
            }
        }
        parts.next().is_none()
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    let trimmed = path.trim_start_matches('/').trim_end_matches('/');
    trimmed.split('/').filter(move |_| !trimmed.is_empty())
}

/// One row of the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    pub method: String,
    pub pattern: RoutePattern,
    pub access: Access,
}

/// Ordered table mapping (method, path pattern) to the access it requires.
///
/// First matching rule wins, so list literal paths before overlapping
/// placeholder paths. Requests matching no rule are denied.
#[derive(Debug, Clone, Default)]
pub struct RoutePolicy {
    rules: Vec<RouteRule>,
}

impl RoutePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, method: &str, pattern: &str, access: Access) -> Self {
        self.rules.push(RouteRule {
            method: method.to_ascii_uppercase(),
            pattern: RoutePattern::parse(pattern),
            access,
        });
        self
    }

    /// `HEAD` is looked up as `GET`, matching how the router serves it.
    pub fn find(&self, method: &str, path: &str) -> Option<&RouteRule> {
        let method = if method.eq_ignore_ascii_case("HEAD") { "GET" } else { method };
        self.rules
            .iter()
            .find(|r| r.method.eq_ignore_ascii_case(method) && r.pattern.matches(path))
    }

    /// Role gate for a request, evaluated before any handler I/O.
    pub fn evaluate(
        &self,
        method: &str,
        path: &str,
        ctx: Option<&SecurityContext>,
    ) -> Result<(), AccessError> {
        match self.find(method, path) {
            Some(rule) => rule.access.check(ctx),
            None if ctx.is_some() => Err(AccessError::Forbidden),
            None => Err(AccessError::Unauthenticated),
        }
    }
}
