//! Introspection endpoint errors.
//!
//! Only caller-facing failures live here. An access token that fails
//! verification is not an error; it becomes an inactive
//! [`IntrospectionResponse`](crate::token::IntrospectionResponse).

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::token::jwt::JwtError;

/// Errors that terminate an introspection request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntrospectError {
    /// The request carries no `Authorization` header.
    #[error("Authorization is required")]
    MissingAuthorization,

    /// The caller's bearer credential is missing, malformed, or invalid.
    #[error("{}: {}", .0.kind(), .0)]
    CallerUnauthenticated(JwtError),

    /// The request has no `token` to introspect.
    #[error("No token provided")]
    MalformedRequest,
}

impl IntrospectError {
    /// HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingAuthorization | Self::CallerUnauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::MalformedRequest => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for IntrospectError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            IntrospectError::MissingAuthorization.to_string(),
            "Authorization is required"
        );
        assert_eq!(
            IntrospectError::CallerUnauthenticated(JwtError::Expired).to_string(),
            "TokenExpiredError: jwt expired"
        );
        assert_eq!(
            IntrospectError::CallerUnauthenticated(JwtError::InvalidSignature).to_string(),
            "JsonWebTokenError: invalid signature"
        );
        assert_eq!(
            IntrospectError::MalformedRequest.to_string(),
            "No token provided"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            IntrospectError::MissingAuthorization.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            IntrospectError::CallerUnauthenticated(JwtError::Malformed).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            IntrospectError::MalformedRequest.status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_into_response_is_plain_text() {
        let response = IntrospectError::MalformedRequest.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
    }
}
