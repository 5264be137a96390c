//! Token introspection endpoint handler (RFC 7662).
//!
//! # Request Format
//!
//! ```text
//! POST /v/{fhir_release}/auth/introspect
//! Content-Type: application/x-www-form-urlencoded
//! Authorization: Bearer <caller_credential>
//!
//! token=<token_to_introspect>
//! ```
//!
//! A JSON body (`{"token": "..."}`) is accepted as well.
//!
//! A `token` that is present but not a string (a JSON number, a repeated
//! form field) is reported inactive with `jwt must be a string`.
//!
//! # Response
//!
//! - 401 with a plain-text reason when the caller is not authenticated
//! - 400 `No token provided` when the body has no token
//! - 200 with `{"active": false, "error": {...}}` for an invalid token
//! - 200 with `{"active": true, ...}` and the sanitized claims otherwise
//!
//! The caller credential is always checked before the body is looked at, so
//! a malformed body never reaches the client ahead of a 401.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    Form, Json,
    extract::{FromRequest, Request, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::Value;

use crate::token::service::IntrospectionService;

// =============================================================================
// State Types
// =============================================================================

/// State required for the introspection endpoint.
#[derive(Clone)]
pub struct IntrospectionState {
    /// Service performing caller authentication and introspection.
    pub service: Arc<IntrospectionService>,
}

impl IntrospectionState {
    /// Creates a new introspection state.
    pub fn new(service: Arc<IntrospectionService>) -> Self {
        Self { service }
    }
}

// =============================================================================
// Request Types
// =============================================================================

/// Body parameters for the introspection endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntrospectionForm {
    /// The token to introspect, as submitted.
    #[serde(default)]
    pub token: Option<Value>,
}

impl IntrospectionForm {
    /// Builds the form from URL-encoded pairs. A repeated `token` field
    /// becomes an array.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut tokens: Vec<Value> = pairs
            .into_iter()
            .filter(|(key, _)| key == "token")
            .map(|(_, value)| Value::String(value))
            .collect();

        let token = match tokens.len() {
            0 => None,
            1 => tokens.pop(),
            _ => Some(Value::Array(tokens)),
        };
        Self { token }
    }
}

/// Introspection body extractor.
///
/// Parses a JSON body when the content type says so and a URL-encoded form
/// otherwise. It never rejects: an unreadable body is treated as empty and
/// surfaces later as `No token provided`, after the caller is authenticated.
#[derive(Debug, Default)]
pub struct IntrospectionBody(pub IntrospectionForm);

impl<S> FromRequest<S> for IntrospectionBody
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.trim_start().starts_with("application/json"));

        let parsed = if is_json {
            Json::<IntrospectionForm>::from_request(req, state)
                .await
                .map(|Json(form)| form)
                .map_err(|rejection| rejection.body_text())
        } else {
            Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map(|Form(pairs)| IntrospectionForm::from_pairs(pairs))
                .map_err(|rejection| rejection.body_text())
        };

        Ok(Self(parsed.unwrap_or_else(|error| {
            tracing::debug!(%error, "Unreadable introspection body");
            IntrospectionForm::default()
        })))
    }
}

// =============================================================================
// Handler
// =============================================================================

/// Handler for `POST /v/{fhir_release}/auth/introspect`.
pub async fn introspect_handler(
    State(state): State<IntrospectionState>,
    headers: HeaderMap,
    IntrospectionBody(form): IntrospectionBody,
) -> Response {
    // Non-UTF-8 bytes are replaced rather than treated as a missing header.
    let authorization = headers
        .get(header::AUTHORIZATION)
        .map(|v| String::from_utf8_lossy(v.as_bytes()));

    match state
        .service
        .handle_value(authorization.as_deref(), form.token.as_ref())
    {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => err.into_response(),
    }
}
