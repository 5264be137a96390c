//! JWT verification.
//!
//! The launcher deals with two kinds of signing keys:
//!
//! - **Shared secret** (HS256/HS384/HS512): signs access tokens and the
//!   bearer credentials presented by callers of the introspection endpoint.
//! - **Issuer key** (RSA or EC): signs the OpenID Connect identity tokens
//!   nested inside access tokens.
//!
//! Both are wrapped by [`JwtVerifier`], which checks the signature, `exp`
//! and `nbf` and hands back the raw claim set. Callers depend on the
//! [`ClaimVerifier`] trait rather than the concrete verifier.
//!
//! ## Example
//!
//! ```ignore
//! use smartlaunch_auth::token::jwt::{ClaimVerifier, JwtVerifier};
//!
//! let verifier = JwtVerifier::hmac(b"launcher-secret", 0);
//! let claims = verifier.verify(&token)?;
//! ```

use std::fmt;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde_json::{Map, Value};

use super::keys::IssuerKey;

/// Decoded JWT payload.
pub type Claims = Map<String, Value>;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while verifying a JWT.
///
/// The `Display` output and [`JwtError::kind`] form the wire text used in
/// `401` bodies and in the `error` member of inactive introspection
/// responses, so they stay stable across library upgrades.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JwtError {
    /// No token was supplied.
    #[error("jwt must be provided")]
    Missing,

    /// The value supplied as a token is not a string.
    #[error("jwt must be a string")]
    NotAString,

    /// The token is not a well-formed JWS compact serialization.
    #[error("jwt malformed")]
    Malformed,

    /// The token has expired.
    #[error("jwt expired")]
    Expired,

    /// The token's `nbf` is in the future.
    #[error("jwt not active")]
    NotYetValid,

    /// The token signature is invalid.
    #[error("invalid signature")]
    InvalidSignature,

    /// The token's `alg` is not accepted for this key.
    #[error("invalid algorithm")]
    InvalidAlgorithm,

    /// The token claims are invalid.
    #[error("{message}")]
    InvalidClaims {
        /// Description of why claims are invalid.
        message: String,
    },

    /// Invalid key format or data.
    #[error("invalid key: {message}")]
    InvalidKey {
        /// Description of why the key is invalid.
        message: String,
    },
}

impl JwtError {
    /// Creates a new `InvalidClaims` error.
    #[must_use]
    pub fn invalid_claims(message: impl Into<String>) -> Self {
        Self::InvalidClaims {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidKey` error.
    #[must_use]
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::InvalidKey {
            message: message.into(),
        }
    }

    /// Error kind name reported alongside the message.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Expired => "TokenExpiredError",
            Self::NotYetValid => "NotBeforeError",
            _ => "JsonWebTokenError",
        }
    }

    /// Returns `true` if the token was well formed and correctly signed but
    /// outside its validity window.
    #[must_use]
    pub fn is_time_error(&self) -> bool {
        matches!(self, Self::Expired | Self::NotYetValid)
    }
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::ImmatureSignature => Self::NotYetValid,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingAlgorithm => Self::InvalidAlgorithm,
            ErrorKind::InvalidToken => Self::Malformed,
            ErrorKind::InvalidAudience
            | ErrorKind::InvalidIssuer
            | ErrorKind::InvalidSubject
            | ErrorKind::MissingRequiredClaim(_) => Self::invalid_claims(err.to_string()),
            ErrorKind::InvalidRsaKey(_)
            | ErrorKind::InvalidEcdsaKey
            | ErrorKind::InvalidKeyFormat => Self::invalid_key(err.to_string()),
            _ => Self::Malformed,
        }
    }
}

// ============================================================================
// Verification
// ============================================================================

/// Something that can turn a compact JWT into a verified claim set.
///
/// Implemented by [`JwtVerifier`]; the introspection service holds verifiers
/// behind this trait so each trust domain can be substituted independently.
pub trait ClaimVerifier: Send + Sync {
    /// Verifies `token` and returns its claims.
    ///
    /// # Errors
    /// Returns a [`JwtError`] describing why the token was rejected.
    fn verify(&self, token: &str) -> Result<Claims, JwtError>;
}

/// Algorithms accepted for shared-secret tokens.
pub const HMAC_ALGORITHMS: &[Algorithm] = &[Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Verifies JWTs against a single key.
///
/// This type is immutable after construction and is `Send + Sync`, so a
/// single instance is shared across all requests.
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    /// Creates a verifier for tokens signed with a shared HMAC secret.
    #[must_use]
    pub fn hmac(secret: &[u8], leeway_seconds: u64) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation: validation(HMAC_ALGORITHMS, leeway_seconds),
        }
    }

    /// Creates a verifier for tokens signed by the OpenID Connect issuer.
    #[must_use]
    pub fn for_issuer(key: &IssuerKey, leeway_seconds: u64) -> Self {
        Self {
            decoding_key: key.decoding_key().clone(),
            validation: validation(key.algorithms(), leeway_seconds),
        }
    }

    /// Returns the accepted signing algorithms.
    #[must_use]
    pub fn algorithms(&self) -> &[Algorithm] {
        &self.validation.algorithms
    }
}

impl ClaimVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        if token.is_empty() {
            return Err(JwtError::Missing);
        }

        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(JwtError::from)
    }
}

impl fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtVerifier")
            .field("algorithms", &self.validation.algorithms)
            .field("leeway", &self.validation.leeway)
            .finish_non_exhaustive()
    }
}

/// Builds the validation rules shared by every verifier.
///
/// `exp` and `nbf` are checked when present but not required, and the
/// audience is left to the resource server.
fn validation(algorithms: &[Algorithm], leeway_seconds: u64) -> Validation {
    let mut validation = Validation::new(algorithms[0]);
    validation.algorithms = algorithms.to_vec();
    validation.required_spec_claims.clear();
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.validate_aud = false;
    validation.leeway = leeway_seconds;
    validation
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::json;
    use time::OffsetDateTime;

    const SECRET: &[u8] = b"test-secret";

    fn now() -> i64 {
        OffsetDateTime::now_utc().unix_timestamp()
    }

    fn sign(claims: &Value, secret: &[u8]) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret),
        )
        .unwrap()
    }

    #[test]
    fn test_hmac_verify_valid_token() {
        let verifier = JwtVerifier::hmac(SECRET, 0);
        let token = sign(&json!({"sub": "user123", "exp": now() + 60}), SECRET);

        let claims = verifier.verify(&token).unwrap();
        assert_eq!(claims["sub"], "user123");
    }

    #[test]
    fn test_hmac_verify_without_exp() {
        let verifier = JwtVerifier::hmac(SECRET, 0);
        let token = sign(&json!({"sub": "user123"}), SECRET);

        assert!(verifier.verify(&token).is_ok());
    }

    #[test]
    fn test_hmac_verify_accepts_hs512() {
        let verifier = JwtVerifier::hmac(SECRET, 0);
        let token = encode(
            &Header::new(Algorithm::HS512),
            &json!({"sub": "user123"}),
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert!(verifier.verify(&token).is_ok());
    }

    #[test]
    fn test_hmac_verify_wrong_secret() {
        let verifier = JwtVerifier::hmac(SECRET, 0);
        let token = sign(&json!({"sub": "user123"}), b"other-secret");

        let err = verifier.verify(&token).unwrap_err();
        assert_eq!(err, JwtError::InvalidSignature);
        assert_eq!(err.kind(), "JsonWebTokenError");
        assert_eq!(err.to_string(), "invalid signature");
    }

    #[test]
    fn test_hmac_verify_expired() {
        let verifier = JwtVerifier::hmac(SECRET, 0);
        let token = sign(&json!({"sub": "user123", "exp": now() - 120}), SECRET);

        let err = verifier.verify(&token).unwrap_err();
        assert_eq!(err, JwtError::Expired);
        assert_eq!(err.kind(), "TokenExpiredError");
        assert!(err.is_time_error());
    }

    #[test]
    fn test_leeway_tolerates_recent_expiry() {
        let verifier = JwtVerifier::hmac(SECRET, 300);
        let token = sign(&json!({"sub": "user123", "exp": now() - 120}), SECRET);

        assert!(verifier.verify(&token).is_ok());
    }

    #[test]
    fn test_hmac_verify_not_yet_valid() {
        let verifier = JwtVerifier::hmac(SECRET, 0);
        let token = sign(&json!({"sub": "user123", "nbf": now() + 600}), SECRET);

        let err = verifier.verify(&token).unwrap_err();
        assert_eq!(err, JwtError::NotYetValid);
        assert_eq!(err.kind(), "NotBeforeError");
    }

    #[test]
    fn test_verify_empty_and_garbage() {
        let verifier = JwtVerifier::hmac(SECRET, 0);

        assert_eq!(verifier.verify("").unwrap_err(), JwtError::Missing);
        assert_eq!(verifier.verify("not-a-jwt").unwrap_err(), JwtError::Malformed);
    }

    #[test]
    fn test_error_display_and_kind() {
        assert_eq!(JwtError::Missing.to_string(), "jwt must be provided");
        assert_eq!(JwtError::Expired.to_string(), "jwt expired");
        assert_eq!(JwtError::NotAString.to_string(), "jwt must be a string");
        assert_eq!(JwtError::NotAString.kind(), "JsonWebTokenError");
        assert_eq!(JwtError::invalid_claims("bad iss").to_string(), "bad iss");
        assert_eq!(JwtError::Malformed.kind(), "JsonWebTokenError");
        assert!(!JwtError::InvalidSignature.is_time_error());
    }
}
