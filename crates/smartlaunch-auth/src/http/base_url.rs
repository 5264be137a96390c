//! Externally visible base URL of a request.
//!
//! The launcher usually runs behind a reverse proxy, so the URL a client
//! used is reconstructed from forwarding headers unless a fixed base URL is
//! configured.

use axum::http::HeaderMap;

/// Returns the base URL (scheme, authority and mount prefix, without a
/// trailing slash) that the client used to reach this server.
///
/// Precedence:
/// 1. `configured`, when set
/// 2. `X-Forwarded-Proto` (default `http`), `X-Forwarded-Host` or `Host`,
///    and `X-Forwarded-Prefix`
pub fn request_base_url(headers: &HeaderMap, configured: Option<&str>) -> String {
    if let Some(base) = configured.map(str::trim).filter(|b| !b.is_empty()) {
        return base.trim_end_matches('/').to_string();
    }

    let proto = first_value(headers, "x-forwarded-proto").unwrap_or("http");
    let host = first_value(headers, "x-forwarded-host")
        .or_else(|| first_value(headers, "host"))
        .unwrap_or("localhost");
    let prefix = first_value(headers, "x-forwarded-prefix")
        .map(|p| p.trim_matches('/'))
        .filter(|p| !p.is_empty());

    match prefix {
        Some(prefix) => format!("{proto}://{host}/{prefix}"),
        None => format!("{proto}://{host}"),
    }
}

/// First entry of a possibly comma-separated header set by a proxy chain.
fn first_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_configured_base_url_wins() {
        let map = headers(&[("host", "internal:8445")]);
        assert_eq!(
            request_base_url(&map, Some("https://host/base/")),
            "https://host/base"
        );
    }

    #[test]
    fn test_host_header() {
        let map = headers(&[("host", "localhost:8445")]);
        assert_eq!(request_base_url(&map, None), "http://localhost:8445");
        assert_eq!(request_base_url(&map, Some("  ")), "http://localhost:8445");
    }

    #[test]
    fn test_forwarded_headers() {
        let map = headers(&[
            ("host", "internal:8445"),
            ("x-forwarded-proto", "https, http"),
            ("x-forwarded-host", "host"),
            ("x-forwarded-prefix", "/base/"),
        ]);
        assert_eq!(request_base_url(&map, None), "https://host/base");
    }

    #[test]
    fn test_no_headers() {
        assert_eq!(request_base_url(&HeaderMap::new(), None), "http://localhost");
    }
}
