//! auth-adapters/src/lib.rs
//!
//! Credential hashing (always compiled) and bearer tokens (feature `auth-jwt`).

pub mod password;

#[cfg(feature = "auth-jwt")]
pub mod jwt;

pub use password::Argon2Hasher;

#[cfg(feature = "auth-jwt")]
pub use jwt::JwtTokenService;
