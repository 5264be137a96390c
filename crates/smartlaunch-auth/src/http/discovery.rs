//! OpenID configuration discovery HTTP handler.
//!
//! Provides `GET /v/{fhir_release}/.well-known/openid-configuration`.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, header};
use axum::response::IntoResponse;

use crate::smart::discovery::OpenIdConfiguration;

use super::base_url::request_base_url;

/// State for the discovery endpoint.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryState {
    /// Fixed public base URL. When unset, it is derived per request from
    /// forwarding headers.
    pub base_url: Option<String>,
}

impl DiscoveryState {
    /// Creates a new discovery state.
    pub fn new(base_url: Option<String>) -> Self {
        Self { base_url }
    }
}

/// Handler for `GET /v/{fhir_release}/.well-known/openid-configuration`.
pub async fn openid_configuration_handler(
    State(state): State<DiscoveryState>,
    Path(fhir_release): Path<String>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let base_url = request_base_url(&headers, state.base_url.as_deref());
    let doc = OpenIdConfiguration::build(&base_url, &fhir_release);

    ([(header::CONTENT_TYPE, "application/json")], Json(doc))
}
