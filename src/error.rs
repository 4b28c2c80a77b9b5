//! Gateway error taxonomy and the JSON error envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::AuthError;

/// Body of every error the gateway produces itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub message: String,
}

/// Failures detected by the gateway before or while forwarding.
///
/// Upstream non-200 responses are not errors here; they are relayed as-is.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("missing parameter {0}")]
    MissingParam(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    UnprocessableBody(String),

    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("no route for {0}")]
    NotFound(String),

    #[error("method {0} not allowed")]
    MethodNotAllowed(String),

    #[error("upstream unreachable: {0}")]
    UpstreamUnreachable(String),

    #[error("{0}")]
    Internal(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Auth(_) => StatusCode::UNAUTHORIZED,
            GatewayError::MissingParam(_) | GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::UnprocessableBody(_) => StatusCode::UNPROCESSABLE_ENTITY,
            GatewayError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::Forbidden(_) => StatusCode::FORBIDDEN,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            GatewayError::UpstreamUnreachable(_) => StatusCode::BAD_GATEWAY,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            message: self.to_string(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.envelope())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::CONTENT_TYPE;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (GatewayError::Auth(AuthError::InvalidFormat), 401),
            (GatewayError::MissingParam("id"), 400),
            (GatewayError::BadRequest("bad".into()), 400),
            (GatewayError::UnprocessableBody("bad".into()), 422),
            (GatewayError::PayloadTooLarge { limit: 1 }, 413),
            (GatewayError::Forbidden("admin-only"), 403),
            (GatewayError::NotFound("/x".into()), 404),
            (GatewayError::MethodNotAllowed("PUT".into()), 405),
            (GatewayError::UpstreamUnreachable("refused".into()), 502),
            (GatewayError::Internal("encode".into()), 500),
        ];
        for (error, code) in cases {
            assert_eq!(error.status_code().as_u16(), code, "{:?}", error);
        }
    }

    #[tokio::test]
    async fn test_into_response_writes_json_envelope() {
        let response = GatewayError::Auth(AuthError::Unauthenticated).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let envelope: ErrorEnvelope = serde_json::from_slice(&body).unwrap();
        assert_eq!(envelope.message, "unauthenticated");
    }
}
