//! Response mapping.
//!
//! # Responsibilities
//! - Turn a finished `Context` into an HTTP response
//! - Map handler errors to status codes with a short plain-text body
//!
//! # Design Decisions
//! - Client errors (bad body, no route) echo the error message
//! - Server errors never leak internals; details go to the log only

use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::http::context::BodyError;
use crate::http::Context;
use crate::routing::router::NotFound;

/// Error returned by middleware and endpoints.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    NotFound(#[from] NotFound),

    #[error(transparent)]
    Body(#[from] BodyError),

    /// Response value could not be encoded.
    #[error("failed to serialize response: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl HandlerError {
    pub fn status(&self) -> StatusCode {
        match self {
            HandlerError::NotFound(_) => StatusCode::NOT_FOUND,
            HandlerError::Body(BodyError::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            HandlerError::Body(_) => StatusCode::BAD_REQUEST,
            HandlerError::Serialize(_) | HandlerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
            return (status, "Internal Server Error").into_response();
        }
        (status, self.to_string()).into_response()
    }
}

impl IntoResponse for Context {
    fn into_response(self) -> Response {
        let (status, headers, body) = self.into_parts();
        let mut response = Response::new(Body::from(body));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, Method};

    #[test]
    fn test_error_status_mapping() {
        let not_found = HandlerError::from(NotFound {
            method: Method::GET,
            path: "/nope".into(),
        });
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let too_large = HandlerError::from(BodyError::TooLarge { limit: 8 });
        assert_eq!(too_large.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let bad_json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(
            HandlerError::from(BodyError::Json(bad_json)).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            HandlerError::Internal("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_server_error_body_is_generic() {
        let response = HandlerError::Internal("db password".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"Internal Server Error");
    }

    #[tokio::test]
    async fn test_context_into_response() {
        let mut ctx = Context::new(Method::POST, "/A");
        ctx.set_status(StatusCode::CREATED);
        ctx.write_json(&serde_json::json!({"FirstName": "X"})).unwrap();

        let response = ctx.into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], br#"{"FirstName":"X"}"#);
    }
}
