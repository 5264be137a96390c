//! OpenID Connect discovery document.
//!
//! Every FHIR release exposed by the launcher (`/v/{release}/fhir`) is its
//! own issuer, so the document is parameterized by the externally visible
//! base URL and the release segment.
//!
//! # References
//!
//! - [OpenID Connect Discovery 1.0](https://openid.net/specs/openid-connect-discovery-1_0.html)

use serde::{Deserialize, Serialize};

/// OpenID Connect provider metadata.
///
/// # Example Response
///
/// ```json
/// {
///   "issuer": "https://launch.example.com/v/r4/fhir",
///   "jwks_uri": "https://launch.example.com/keys",
///   "authorization_endpoint": "https://launch.example.com/v/r4/auth/authorize",
///   "token_endpoint": "https://launch.example.com/v/r4/auth/token",
///   "introspection_endpoint": "https://launch.example.com/v/r4/auth/introspect",
///   "subject_types_supported": ["public"]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenIdConfiguration {
    /// Issuer identifier; matches the `iss` claim of identity tokens.
    pub issuer: String,

    /// URL of the issuer's JSON Web Key Set.
    pub jwks_uri: String,

    /// OAuth 2.0 authorization endpoint.
    pub authorization_endpoint: String,

    /// OAuth 2.0 token endpoint.
    pub token_endpoint: String,

    /// Token introspection endpoint (RFC 7662).
    pub introspection_endpoint: String,

    /// Supported subject identifier types.
    pub subject_types_supported: Vec<String>,
}

impl OpenIdConfiguration {
    /// Builds the document for one FHIR release.
    ///
    /// `base_url` is the externally visible origin plus any mount prefix;
    /// a trailing slash is ignored.
    pub fn build(base_url: &str, fhir_release: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        let prefix = format!("{base}/v/{fhir_release}");

        Self {
            issuer: format!("{prefix}/fhir"),
            jwks_uri: format!("{base}/keys"),
            authorization_endpoint: format!("{prefix}/auth/authorize"),
            token_endpoint: format!("{prefix}/auth/token"),
            introspection_endpoint: format!("{prefix}/auth/introspect"),
            subject_types_supported: vec!["public".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_with_path_prefix() {
        let doc = OpenIdConfiguration::build("https://host/base", "r4");

        assert_eq!(doc.issuer, "https://host/base/v/r4/fhir");
        assert_eq!(doc.jwks_uri, "https://host/base/keys");
        assert_eq!(doc.authorization_endpoint, "https://host/base/v/r4/auth/authorize");
        assert_eq!(doc.token_endpoint, "https://host/base/v/r4/auth/token");
        assert_eq!(
            doc.introspection_endpoint,
            "https://host/base/v/r4/auth/introspect"
        );
        assert_eq!(doc.subject_types_supported, vec!["public"]);
    }

    #[test]
    fn test_build_trims_trailing_slash() {
        let doc = OpenIdConfiguration::build("http://localhost:8445/", "r5");
        assert_eq!(doc.issuer, "http://localhost:8445/v/r5/fhir");
    }

    #[test]
    fn test_serialized_keys() {
        let json = serde_json::to_value(OpenIdConfiguration::build("https://a", "r4")).unwrap();
        let object = json.as_object().unwrap();

        let mut keys: Vec<_> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "authorization_endpoint",
                "introspection_endpoint",
                "issuer",
                "jwks_uri",
                "subject_types_supported",
                "token_endpoint",
            ]
        );
    }
}
