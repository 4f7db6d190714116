//! `farmxchain-auth`: session tokens, identity and access policy.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod authorize;
pub mod claims;
pub mod codec;
pub mod context;
pub mod password;
pub mod roles;
pub mod user;

pub use authorize::{Access, AccessError, RoutePattern, RoutePolicy, RouteRule, ensure_owner, require_role};
pub use claims::{SESSION_TTL_SECS, SessionClaims, TokenError, check_expiry};
pub use codec::{MIN_KEY_BYTES, SigningKey, TokenCodec};
pub use context::SecurityContext;
pub use password::{PasswordError, hash_password, verify_password};
pub use roles::{AUTHORITY_PREFIX, Authority, Role};
pub use user::{Account, NewAccount, Registration, ValidRegistration, normalize_email};
