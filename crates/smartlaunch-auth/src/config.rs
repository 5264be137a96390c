//! Introspection key configuration.
//!
//! Both keys are read once at startup and never change afterwards.
//!
//! # Example (TOML)
//!
//! ```toml
//! [auth]
//! jwt_secret = "change-me"
//! leeway_seconds = 0
//!
//! [auth.oidc]
//! public_key_file = "keys/issuer.pem"
//! ```

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::token::jwt::JwtError;
use crate::token::keys::IssuerKey;

/// Errors raised while validating auth configuration or loading keys.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `auth.jwt_secret` is empty.
    #[error("auth.jwt_secret must not be empty")]
    MissingSecret,

    /// Neither `auth.oidc.public_key` nor `auth.oidc.public_key_file` is set.
    #[error("auth.oidc.public_key or auth.oidc.public_key_file is required")]
    MissingIssuerKey,

    /// The issuer key file could not be read.
    #[error("failed to read issuer key file {path}: {source}")]
    KeyFile {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The issuer key could not be parsed.
    #[error("invalid issuer key: {0}")]
    InvalidIssuerKey(#[source] JwtError),
}

/// Root auth configuration.
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Shared secret that signs access tokens and caller credentials.
    #[serde(skip_serializing)]
    pub jwt_secret: String,

    /// Clock tolerance applied to `exp`/`nbf`, in seconds.
    pub leeway_seconds: u64,

    /// OpenID Connect issuer settings.
    pub oidc: OidcConfig,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("leeway_seconds", &self.leeway_seconds)
            .field("oidc", &self.oidc)
            .finish()
    }
}

/// OpenID Connect issuer configuration.
///
/// The inline `public_key` takes precedence over `public_key_file`. Either
/// may hold the issuer's private key; only the public half is retained.
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct OidcConfig {
    /// Issuer key as PEM text.
    #[serde(skip_serializing)]
    pub public_key: Option<String>,

    /// Path to a PEM file holding the issuer key.
    pub public_key_file: Option<PathBuf>,
}

impl fmt::Debug for OidcConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OidcConfig")
            .field("public_key", &self.public_key.as_ref().map(|_| "<pem>"))
            .field("public_key_file", &self.public_key_file)
            .finish()
    }
}

impl AuthConfig {
    /// Validates the configuration without touching the filesystem.
    ///
    /// # Errors
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        if !self.oidc.has_key_source() {
            return Err(ConfigError::MissingIssuerKey);
        }
        Ok(())
    }

    /// Loads and parses the issuer key.
    ///
    /// # Errors
    /// Returns an error if no key source is configured, the file cannot be
    /// read, or the PEM is not a supported key.
    pub fn load_issuer_key(&self) -> Result<IssuerKey, ConfigError> {
        let pem = match (&self.oidc.public_key, &self.oidc.public_key_file) {
            (Some(pem), _) if !pem.trim().is_empty() => pem.clone(),
            (_, Some(path)) => std::fs::read_to_string(path).map_err(|source| {
                ConfigError::KeyFile {
                    path: path.clone(),
                    source,
                }
            })?,
            _ => return Err(ConfigError::MissingIssuerKey),
        };

        IssuerKey::from_pem(&pem).map_err(ConfigError::InvalidIssuerKey)
    }
}

impl OidcConfig {
    fn has_key_source(&self) -> bool {
        self.public_key
            .as_deref()
            .is_some_and(|pem| !pem.trim().is_empty())
            || self.public_key_file.is_some()
    }
}
