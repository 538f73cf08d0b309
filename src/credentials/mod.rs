//! Password hashing and bearer token issuance.
//!
//! Passwords are stored as Argon2id PHC strings. Access tokens are compact
//! HS256 JWTs carrying the username as `sub`.

pub mod password;
pub mod token;

pub use password::{hash_password, verify_password};
pub use token::{TokenClaims, TokenError, TokenSigner, DEFAULT_TOKEN_TTL_SECONDS};
