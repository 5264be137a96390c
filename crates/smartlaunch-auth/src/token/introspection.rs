//! Token introspection response (RFC 7662).
//!
//! An introspection response has exactly two shapes:
//!
//! ```text
//! {"active": false, "error": {"name": "TokenExpiredError", "message": "jwt expired"}}
//! {"active": true, "sub": "...", "patient": "123", ...}
//! ```
//!
//! Active responses are assembled by [`IntrospectionResponseBuilder`], which
//! starts from an empty claim set and only ever adds fields. Layers are
//! applied in this order, later layers overwriting earlier ones:
//!
//! 1. verified access token claims, minus [`REDACTED_CLAIMS`] and the
//!    identity claims `iss`/`sub`
//! 2. `iss`/`sub` from the verified identity token, when resolved
//! 3. entries of the access token's launch `context` object, minus
//!    [`REDACTED_CLAIMS`]
//!
//! `active` is owned by the response itself and never taken from claims.
//!
//! # References
//!
//! - [RFC 7662 - OAuth 2.0 Token Introspection](https://tools.ietf.org/html/rfc7662)

use serde::Serialize;
use serde_json::Value;

use super::identity::IdentityClaims;
use super::jwt::{Claims, JwtError};

/// Claims that must never appear in an introspection response.
pub const REDACTED_CLAIMS: [&str; 6] = [
    "refresh_token",
    "id_token",
    "code_challenge",
    "code_challenge_method",
    "context",
    "iat",
];

/// Claim holding the launch context inside an access token.
pub const CONTEXT_CLAIM: &str = "context";

const ACTIVE: &str = "active";
const IDENTITY_CLAIMS: [&str; 2] = ["iss", "sub"];

fn is_redacted(key: &str) -> bool {
    key == ACTIVE || REDACTED_CLAIMS.contains(&key)
}

// =============================================================================
// Response Types
// =============================================================================

/// Why a token was reported inactive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InactiveReason {
    /// Error kind, e.g. `TokenExpiredError`.
    pub name: String,
    /// Human-readable message, e.g. `jwt expired`.
    pub message: String,
}

impl From<&JwtError> for InactiveReason {
    fn from(err: &JwtError) -> Self {
        Self {
            name: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

/// Token introspection response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntrospectionResponse {
    /// Whether the token is currently active.
    pub active: bool,

    /// Why the token is inactive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<InactiveReason>,

    #[serde(flatten)]
    claims: Claims,
}

impl IntrospectionResponse {
    /// Creates an inactive response for a token that failed verification.
    #[must_use]
    pub fn inactive(err: &JwtError) -> Self {
        Self {
            active: false,
            error: Some(InactiveReason::from(err)),
            claims: Claims::new(),
        }
    }

    /// Starts building an active response.
    #[must_use]
    pub fn builder() -> IntrospectionResponseBuilder {
        IntrospectionResponseBuilder::default()
    }

    /// Builds the active response for a verified access token.
    #[must_use]
    pub fn sanitized(token_claims: &Claims, identity: &IdentityClaims) -> Self {
        Self::builder()
            .token_claims(token_claims)
            .identity(identity)
            .launch_context(token_claims.get(CONTEXT_CLAIM))
            .build()
    }

    /// Claims published alongside `active`.
    #[must_use]
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// Returns a published claim by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for active introspection responses.
#[derive(Debug, Default)]
pub struct IntrospectionResponseBuilder {
    claims: Claims,
}

impl IntrospectionResponseBuilder {
    /// Adds the verified access token claims.
    ///
    /// Redacted claims and the token's own `iss`/`sub` are skipped; identity
    /// comes from [`identity`](Self::identity) only.
    #[must_use]
    pub fn token_claims(mut self, token_claims: &Claims) -> Self {
        for (key, value) in token_claims {
            if is_redacted(key) || IDENTITY_CLAIMS.contains(&key.as_str()) {
                continue;
            }
            self.claims.insert(key.clone(), value.clone());
        }
        self
    }

    /// Sets `iss` and `sub` from a resolved identity.
    #[must_use]
    pub fn identity(mut self, identity: &IdentityClaims) -> Self {
        if let Some(iss) = &identity.iss {
            self.claims.insert("iss".to_string(), Value::String(iss.clone()));
        }
        if let Some(sub) = &identity.sub {
            self.claims.insert("sub".to_string(), Value::String(sub.clone()));
        }
        self
    }

    /// Hoists the entries of the launch context object.
    ///
    /// Anything other than a JSON object is ignored.
    #[must_use]
    pub fn launch_context(mut self, context: Option<&Value>) -> Self {
        let Some(Value::Object(context)) = context else {
            return self;
        };

        for (key, value) in context {
            if is_redacted(key) {
                tracing::debug!(claim = %key, "Dropping redacted claim from launch context");
                continue;
            }
            self.claims.insert(key.clone(), value.clone());
        }
        self
    }

    /// Builds the active response.
    #[must_use]
    pub fn build(self) -> IntrospectionResponse {
        IntrospectionResponse {
            active: true,
            error: None,
            claims: self.claims,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
