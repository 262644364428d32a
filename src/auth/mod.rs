//! # Auth Module
//!
//! Bearer-token authentication for privileged operations. Account and
//! session management live outside this service; it only verifies tokens
//! signed with the shared secret.

pub mod errors;
pub mod identity;
pub mod jwt;

pub use errors::{AuthError, AuthResult};
pub use identity::{authenticate, authenticate_admin, Identity};
pub use jwt::{JwtClaims, JwtConfig, JwtManager, Role};
