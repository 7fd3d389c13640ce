//! `puntoventa-auth` — authentication boundary: JWT claims and HS256 codec.
//!
//! This crate is intentionally decoupled from HTTP and storage. Token
//! issuance stays with the external auth provider; this service only
//! validates bearer tokens and derives the request identity from them.

pub mod claims;
pub mod jwt;

pub use claims::{validate_claims, JwtClaims, TokenValidationError};
pub use jwt::{Hs256Jwt, JwtValidator, TokenError};
