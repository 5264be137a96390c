//! Token verification and introspection.
//!
//! This module provides:
//!
//! - JWT verification against the launcher secret and the issuer key
//! - Identity resolution from nested OpenID Connect identity tokens
//! - Token introspection responses (RFC 7662)

pub mod identity;
pub mod introspection;
pub mod jwt;
pub mod keys;
pub mod service;

pub use identity::{IdentityClaims, IdentityError, IdentityResolver};
pub use introspection::{
    InactiveReason, IntrospectionResponse, IntrospectionResponseBuilder, REDACTED_CLAIMS,
};
pub use jwt::{ClaimVerifier, Claims, JwtError, JwtVerifier};
pub use keys::{IssuerKey, Jwk, Jwks};
pub use service::{IntrospectionService, bearer_credential};
