//! Cryptographic helpers: JWT, password hashing, payload signatures

pub mod jwt;
pub mod password;
pub mod signature;

pub use jwt::{create_token, verify_token, JwtConfig, TokenClaims};
pub use password::{hash_password, verify_password};
