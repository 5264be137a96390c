//! Issuer key HTTP handlers.
//!
//! - `GET /keys`: JWK Set advertised as `jwks_uri` in the discovery document
//! - `GET /public_key`: the issuer public key as PEM
//!
//! # References
//!
//! - [RFC 7517 - JSON Web Key](https://tools.ietf.org/html/rfc7517)

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;

use crate::token::keys::IssuerKey;

/// State for the key endpoints.
#[derive(Clone)]
pub struct JwksState {
    /// The issuer key loaded at startup.
    pub issuer_key: Arc<IssuerKey>,
}

impl JwksState {
    /// Creates a new JWKS state.
    pub fn new(issuer_key: Arc<IssuerKey>) -> Self {
        Self { issuer_key }
    }
}

/// Handler for `GET /keys`.
///
/// Returns 200 OK with the JWK Set and a `Cache-Control` header allowing
/// caching for 1 hour.
pub async fn jwks_handler(State(state): State<JwksState>) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        Json(state.issuer_key.jwks()),
    )
}

/// Handler for `GET /public_key`.
pub async fn public_key_handler(State(state): State<JwksState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        state.issuer_key.public_key_pem().to_string(),
    )
}
