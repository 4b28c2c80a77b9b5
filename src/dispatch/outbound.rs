//! Outbound request construction.

use axum::http::{Method, Uri};
use bytes::Bytes;
use serde::Serialize;
use url::form_urlencoded;

use crate::auth::Identity;
use crate::config::UpstreamConfig;
use crate::error::{GatewayError, GatewayResult};

/// Which backend a request goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    Users,
    Mehms,
}

impl Upstream {
    pub fn as_str(self) -> &'static str {
        match self {
            Upstream::Users => "users",
            Upstream::Mehms => "mehms",
        }
    }
}

/// Base URLs of both backends, without trailing slash.
#[derive(Debug, Clone)]
pub struct Upstreams {
    users: String,
    mehms: String,
}

impl Upstreams {
    pub fn new(config: &UpstreamConfig) -> Self {
        Self {
            users: config.users_url.trim_end_matches('/').to_string(),
            mehms: config.mehms_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self, upstream: Upstream) -> &str {
        match upstream {
            Upstream::Users => &self.users,
            Upstream::Mehms => &self.mehms,
        }
    }
}

/// A client input re-encoded with the caller's identity.
///
/// Whatever the client sent as `userId`/`isAdmin` never reaches the
/// backend: the typed input drops unknown fields and these two are set
/// from the verified token.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stamped<'a, T> {
    #[serde(flatten)]
    pub input: &'a T,
    pub user_id: &'a str,
    pub is_admin: bool,
}

impl<'a, T: Serialize> Stamped<'a, T> {
    pub fn new(input: &'a T, identity: &'a Identity) -> Self {
        Self {
            input,
            user_id: &identity.id,
            is_admin: identity.is_admin,
        }
    }
}

/// Everything needed to issue the single upstream call of a request.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub upstream: Upstream,
    pub method: Method,
    pub path: String,
    pub query: Vec<(&'static str, String)>,
    pub body: Option<Bytes>,
}

impl OutboundRequest {
    pub fn new(upstream: Upstream, method: Method, path: impl Into<String>) -> Self {
        Self {
            upstream,
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn query(mut self, key: &'static str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    pub fn queries(mut self, pairs: impl IntoIterator<Item = (&'static str, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    /// Append `userId` and `isAdmin` from the identity.
    pub fn caller(self, identity: &Identity) -> Self {
        self.query("userId", &identity.id)
            .query("isAdmin", identity.admin_flag())
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> GatewayResult<Self> {
        let encoded = serde_json::to_vec(body)
            .map_err(|e| GatewayError::Internal(format!("failed repeating request: {}", e)))?;
        self.body = Some(Bytes::from(encoded));
        Ok(self)
    }

    /// Path plus percent-encoded query string.
    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter().map(|(k, v)| (*k, v.as_str())))
            .finish();
        format!("{}?{}", self.path, query)
    }

    pub fn uri(&self, upstreams: &Upstreams) -> GatewayResult<Uri> {
        let target = format!("{}{}", upstreams.base(self.upstream), self.path_and_query());
        target
            .parse()
            .map_err(|e| GatewayError::Internal(format!("invalid upstream uri {}: {}", target, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::inputs::NewComment;

    fn identity() -> Identity {
        Identity {
            id: "a b&c".into(),
            username: "u".into(),
            email: "u@example.com".into(),
            is_admin: false,
        }
    }

    fn upstreams() -> Upstreams {
        Upstreams::new(&UpstreamConfig {
            users_url: "http://users:8080/".into(),
            mehms_url: "http://mehms:9000/v1".into(),
        })
    }

    #[test]
    fn test_uri_joins_base_path_and_encoded_query() {
        let request = OutboundRequest::new(Upstream::Mehms, Method::POST, "/mehms/3/remove")
            .caller(&identity());
        let uri = request.uri(&upstreams()).unwrap();
        assert_eq!(
            uri.to_string(),
            "http://mehms:9000/v1/mehms/3/remove?userId=a+b%26c&isAdmin=false"
        );

        let request = OutboundRequest::new(Upstream::Users, Method::GET, "/all");
        assert_eq!(request.uri(&upstreams()).unwrap().to_string(), "http://users:8080/all");
    }

    #[test]
    fn test_stamped_body_overrides_identity_fields() {
        let input = NewComment {
            mehm_id: 2,
            comment: "hi".into(),
        };
        let identity = Identity {
            id: "9".into(),
            is_admin: true,
            ..identity()
        };
        let request = OutboundRequest::new(Upstream::Mehms, Method::POST, "/comments/new")
            .json(&Stamped::new(&input, &identity))
            .unwrap();

        let body: serde_json::Value = serde_json::from_slice(request.body.as_ref().unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"mehmId": 2, "comment": "hi", "userId": "9", "isAdmin": true})
        );
    }
}
