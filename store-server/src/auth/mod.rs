//! Authentication and authorization
//!
//! - [`JwtService`] - token issuing / validation
//! - [`CurrentUser`] - authenticated caller
//! - [`require_auth`] - global auth middleware
//! - [`require_superuser`] - superuser-only routes
//! - [`access`] - per-store access rules for managers

pub mod access;
pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use access::{accessible_store_ids, default_store_for, ensure_store_access};
pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{CurrentUserExt, require_auth, require_superuser};
pub use password::{hash_password, verify_password};
