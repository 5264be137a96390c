//! Token introspection and OpenID discovery for the SMART launcher.
//!
//! The launcher issues access tokens signed with a shared secret. Resource
//! servers holding a credential signed with the same secret can ask the
//! launcher whether a token is active and what it grants:
//!
//! - [`token`] - JWT verification, identity resolution and response
//!   sanitization
//! - [`smart`] - OpenID Connect discovery document
//! - [`http`] - Axum handlers and router
//! - [`config`] - key configuration
//!
//! # Example
//!
//! ```ignore
//! use smartlaunch_auth::config::AuthConfig;
//! use smartlaunch_auth::token::IntrospectionService;
//!
//! let (service, issuer_key) = IntrospectionService::from_config(&config)?;
//! let response = service.handle(Some("Bearer <caller>"), Some("<token>"))?;
//! assert!(response.active);
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod smart;
pub mod token;

#[cfg(test)]
mod test_support;

pub use config::{AuthConfig, ConfigError, OidcConfig};
pub use error::IntrospectError;
pub use http::{SmartAuthState, smart_auth_routes};
pub use token::{IntrospectionResponse, IntrospectionService, IssuerKey};
