//! Introspection service.
//!
//! Wires the three trust domains together for a single request:
//!
//! ```text
//! Authorization header ──▶ caller verifier (shared secret) ──▶ 401 on failure
//! token field          ──▶ token verifier  (shared secret) ──▶ inactive on failure
//! claims.id_token      ──▶ identity resolver (issuer key)  ──▶ empty on failure
//!                      ──▶ IntrospectionResponse::sanitized
//! ```
//!
//! The service holds no mutable state; one instance is built at startup and
//! shared behind an `Arc`.

use std::sync::Arc;

use serde_json::Value;

use crate::config::{AuthConfig, ConfigError};
use crate::error::IntrospectError;

use super::identity::IdentityResolver;
use super::introspection::IntrospectionResponse;
use super::jwt::{ClaimVerifier, JwtError, JwtVerifier};
use super::keys::IssuerKey;

/// Extracts the credential following the scheme token of an
/// `Authorization` header value.
#[must_use]
pub fn bearer_credential(authorization: &str) -> Option<&str> {
    authorization.split_whitespace().nth(1)
}

/// Token introspection service.
#[derive(Clone)]
pub struct IntrospectionService {
    caller_verifier: Arc<dyn ClaimVerifier>,
    token_verifier: Arc<dyn ClaimVerifier>,
    identity: IdentityResolver,
}

impl IntrospectionService {
    /// Creates a service from explicit verifiers.
    pub fn new(
        caller_verifier: Arc<dyn ClaimVerifier>,
        token_verifier: Arc<dyn ClaimVerifier>,
        identity_verifier: Arc<dyn ClaimVerifier>,
    ) -> Self {
        Self {
            caller_verifier,
            token_verifier,
            identity: IdentityResolver::new(identity_verifier),
        }
    }

    /// Creates a service from the launcher secret and the issuer key.
    ///
    /// Caller credentials and access tokens are both verified with `secret`.
    pub fn from_keys(secret: &[u8], issuer_key: &IssuerKey, leeway_seconds: u64) -> Self {
        let secret_verifier: Arc<dyn ClaimVerifier> =
            Arc::new(JwtVerifier::hmac(secret, leeway_seconds));
        let issuer_verifier = Arc::new(JwtVerifier::for_issuer(issuer_key, leeway_seconds));

        Self::new(secret_verifier.clone(), secret_verifier, issuer_verifier)
    }

    /// Creates a service from validated configuration, loading the issuer
    /// key once.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] if the configuration is invalid or the
    /// issuer key cannot be loaded.
    pub fn from_config(config: &AuthConfig) -> Result<(Self, Arc<IssuerKey>), ConfigError> {
        config.validate()?;
        let issuer_key = Arc::new(config.load_issuer_key()?);
        let service = Self::from_keys(
            config.jwt_secret.as_bytes(),
            &issuer_key,
            config.leeway_seconds,
        );
        Ok((service, issuer_key))
    }

    /// Verifies the caller's own bearer credential.
    ///
    /// # Errors
    /// - [`IntrospectError::MissingAuthorization`] if there is no header or
    ///   it is blank
    /// - [`IntrospectError::CallerUnauthenticated`] if the credential is
    ///   absent from the header or fails verification
    pub fn authenticate_caller(&self, authorization: Option<&str>) -> Result<(), IntrospectError> {
        let authorization = authorization
            .filter(|h| !h.trim().is_empty())
            .ok_or(IntrospectError::MissingAuthorization)?;
        let credential = bearer_credential(authorization).unwrap_or_default();

        self.caller_verifier
            .verify(credential)
            .map(|_| ())
            .map_err(IntrospectError::CallerUnauthenticated)
    }

    /// Introspects a token. Never fails: verification errors yield an
    /// inactive response.
    pub fn introspect(&self, token: &str) -> IntrospectionResponse {
        let claims = match self.token_verifier.verify(token) {
            Ok(claims) => claims,
            Err(err) => {
                tracing::debug!(kind = err.kind(), error = %err, "Introspected token is inactive");
                return IntrospectionResponse::inactive(&err);
            }
        };

        let identity = self.identity.resolve_or_empty(&claims);
        IntrospectionResponse::sanitized(&claims, &identity)
    }

    /// Handles a complete introspection request.
    ///
    /// The caller is authenticated before the token is looked at.
    ///
    /// # Errors
    /// Returns an [`IntrospectError`] for caller authentication failures or a
    /// missing `token`.
    pub fn handle(
        &self,
        authorization: Option<&str>,
        token: Option<&str>,
    ) -> Result<IntrospectionResponse, IntrospectError> {
        if let Err(err) = self.authenticate_caller(authorization) {
            tracing::debug!(error = %err, "Introspection: caller authentication failed");
            return Err(err);
        }

        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(IntrospectError::MalformedRequest)?;

        let response = self.introspect(token);
        tracing::debug!(active = response.active, "Token introspection completed");
        Ok(response)
    }

    /// Handles a request whose `token` field may hold any JSON value.
    ///
    /// Absent, `null`, `false`, `0` and `""` count as no token. Any other
    /// non-string value is reported inactive with
    /// [`JwtError::NotAString`].
    ///
    /// # Errors
    /// Same as [`handle`](Self::handle).
    pub fn handle_value(
        &self,
        authorization: Option<&str>,
        token: Option<&Value>,
    ) -> Result<IntrospectionResponse, IntrospectError> {
        match token {
            Some(Value::String(token)) => self.handle(authorization, Some(token)),
            Some(value) if !is_blank(value) => {
                self.authenticate_caller(authorization)?;
                tracing::debug!("Introspected token is not a string");
                Ok(IntrospectionResponse::inactive(&JwtError::NotAString))
            }
            _ => self.handle(authorization, None),
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
