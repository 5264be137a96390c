//! Identity claim resolution.
//!
//! Access tokens issued with the `openid` scope carry the OpenID Connect
//! identity token in their `id_token` claim. That nested token is signed by
//! the issuer key, not the launcher secret, and it is the only trusted
//! source for `iss` and `sub` in introspection responses.
//!
//! Resolution is best effort: [`IdentityResolver::resolve`] reports exactly
//! why an identity could not be recovered, and
//! [`IdentityResolver::resolve_or_empty`] is the single place where those
//! failures are turned into an empty identity.

use std::sync::Arc;

use serde_json::Value;

use super::jwt::{ClaimVerifier, Claims, JwtError};

/// Claim in the access token that holds the nested identity token.
pub const ID_TOKEN_CLAIM: &str = "id_token";

/// Identity recovered from a verified identity token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityClaims {
    /// Issuer of the identity token.
    pub iss: Option<String>,
    /// Subject of the identity token.
    pub sub: Option<String>,
}

impl IdentityClaims {
    /// Returns `true` if neither claim was recovered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iss.is_none() && self.sub.is_none()
    }

    fn from_verified(claims: &Claims) -> Self {
        let text = |name: &str| claims.get(name).and_then(Value::as_str).map(str::to_owned);
        Self {
            iss: text("iss"),
            sub: text("sub"),
        }
    }
}

/// Reasons an identity could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    /// The access token has no `id_token` claim.
    #[error("access token has no id_token claim")]
    Missing,

    /// The `id_token` claim is not a string.
    #[error("id_token claim is not a string")]
    NotAString,

    /// The identity token failed verification.
    #[error("id_token verification failed: {0}")]
    Verification(#[from] JwtError),
}

/// Verifies nested identity tokens against the issuer key.
#[derive(Clone)]
pub struct IdentityResolver {
    verifier: Arc<dyn ClaimVerifier>,
}

impl IdentityResolver {
    /// Creates a resolver backed by the issuer's verifier.
    pub fn new(verifier: Arc<dyn ClaimVerifier>) -> Self {
        Self { verifier }
    }

    /// Resolves `iss` and `sub` from the `id_token` claim of a verified
    /// access token.
    ///
    /// # Errors
    /// Returns an [`IdentityError`] if the claim is absent, has the wrong
    /// type, or fails verification.
    pub fn resolve(&self, access_claims: &Claims) -> Result<IdentityClaims, IdentityError> {
        let id_token = match access_claims.get(ID_TOKEN_CLAIM) {
            None | Some(Value::Null) => return Err(IdentityError::Missing),
            Some(Value::String(token)) => token,
            Some(_) => return Err(IdentityError::NotAString),
        };

        let verified = self.verifier.verify(id_token)?;
        Ok(IdentityClaims::from_verified(&verified))
    }

    /// Like [`resolve`](Self::resolve), but any [`IdentityError`] yields an
    /// empty identity.
    pub fn resolve_or_empty(&self, access_claims: &Claims) -> IdentityClaims {
        self.resolve(access_claims).unwrap_or_else(|error| {
            tracing::debug!(%error, "Identity token not resolved");
            IdentityClaims::default()
        })
    }
}
