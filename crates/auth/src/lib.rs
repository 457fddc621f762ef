//! `stockroom-auth`: token claims, permissions and the authorization gate.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod authorize;
pub mod cache;
pub mod claims;
pub mod permissions;
pub mod roles;
pub mod verification;

pub use authorize::{AuthzError, RequiresPermission, authorize};
pub use cache::{CacheError, DEFAULT_PERMISSION_CACHE_TTL, PermissionCache};
pub use claims::{Claims, SubjectId, TokenError, decode_bearer_token};
pub use permissions::{Permission, PermissionSet};
pub use roles::Role;
pub use verification::TokenVerification;
