//! Relaying backend responses to the client.
//!
//! # Responsibilities
//! - Pass the backend status and body through unchanged
//! - Stream the body instead of buffering it
//! - Label every response as JSON
//!
//! # Design Decisions
//! - Backend headers other than the content type are not copied
//! - Non-200 statuses are relayed, never rewritten

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, HeaderValue, StatusCode},
    response::Response,
};
use hyper::body::Incoming;

pub const APPLICATION_JSON: HeaderValue = HeaderValue::from_static("application/json");

/// Turn a backend response into the client response.
pub fn relay(upstream: hyper::Response<Incoming>) -> Response {
    let status = upstream.status();
    if status != StatusCode::OK {
        tracing::info!(status = %status, "Relaying non-200 backend response");
    }

    let mut response = Response::new(Body::new(upstream.into_body()));
    *response.status_mut() = status;
    response.headers_mut().insert(CONTENT_TYPE, APPLICATION_JSON);
    response
}

/// Force the JSON content type on a locally produced response.
pub fn ensure_json(mut response: Response) -> Response {
    response.headers_mut().insert(CONTENT_TYPE, APPLICATION_JSON);
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_json_overrides_content_type() {
        let mut response = Response::new(Body::from("x"));
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        let response = ensure_json(response);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
    }
}
