//! HTTP forwarding to the backends.

use std::time::Duration;

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, HeaderValue, Method, Request, Uri},
};
use bytes::Bytes;
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;

use crate::http::request::X_REQUEST_ID;

#[derive(Debug, Error)]
pub enum ForwardError {
    /// The request could not be assembled.
    #[error("failed building upstream request: {0}")]
    Build(#[from] axum::http::Error),

    /// The backend could not be reached or dropped the connection.
    #[error("{0}")]
    Connect(#[from] hyper_util::client::legacy::Error),
}

/// Issues upstream calls over a pooled HTTP/1.1 client.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
}

impl Forwarder {
    pub fn new(connect_timeout: Duration) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(connect_timeout));

        let client = Client::builder(TokioExecutor::new()).build(connector);
        Self { client }
    }

    /// Send one request. A JSON body gets `Content-Type: application/json`.
    pub async fn forward(
        &self,
        method: Method,
        uri: Uri,
        body: Option<Bytes>,
        request_id: Option<HeaderValue>,
    ) -> Result<hyper::Response<Incoming>, ForwardError> {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        if let Some(id) = request_id {
            builder = builder.header(X_REQUEST_ID, id);
        }

        let request = builder.body(body.map(Body::from).unwrap_or_else(Body::empty))?;
        Ok(self.client.request(request).await?)
    }
}
