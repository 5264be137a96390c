//! HTTP handlers for the SMART launcher auth endpoints.
//!
//! # Available Handlers
//!
//! - [`introspect_handler`] - `POST /v/{fhir_release}/auth/introspect`
//! - [`openid_configuration_handler`] - `GET /v/{fhir_release}/.well-known/openid-configuration`
//! - [`jwks_handler`] - `GET /keys`
//! - [`public_key_handler`] - `GET /public_key`
//!
//! [`smart_auth_routes`] mounts all of them on one router.

pub mod base_url;
pub mod discovery;
pub mod introspect;
pub mod jwks;

use axum::{
    Router,
    extract::FromRef,
    routing::{get, post},
};

pub use base_url::request_base_url;
pub use discovery::{DiscoveryState, openid_configuration_handler};
pub use introspect::{IntrospectionBody, IntrospectionForm, IntrospectionState, introspect_handler};
pub use jwks::{JwksState, jwks_handler, public_key_handler};

/// Combined state for the auth routes.
#[derive(Clone)]
pub struct SmartAuthState {
    /// State for the introspection endpoint.
    pub introspection: IntrospectionState,
    /// State for the discovery document.
    pub discovery: DiscoveryState,
    /// State for the key endpoints.
    pub jwks: JwksState,
}

impl FromRef<SmartAuthState> for IntrospectionState {
    fn from_ref(state: &SmartAuthState) -> Self {
        state.introspection.clone()
    }
}

impl FromRef<SmartAuthState> for DiscoveryState {
    fn from_ref(state: &SmartAuthState) -> Self {
        state.discovery.clone()
    }
}

impl FromRef<SmartAuthState> for JwksState {
    fn from_ref(state: &SmartAuthState) -> Self {
        state.jwks.clone()
    }
}

/// Builds the router for all auth endpoints.
pub fn smart_auth_routes(state: SmartAuthState) -> Router {
    Router::new()
        .route("/v/{fhir_release}/auth/introspect", post(introspect_handler))
        .route(
            "/v/{fhir_release}/.well-known/openid-configuration",
            get(openid_configuration_handler),
        )
        .route("/keys", get(jwks_handler))
        .route("/public_key", get(public_key_handler))
        .with_state(state)
}
