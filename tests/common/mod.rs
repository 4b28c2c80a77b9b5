//! Shared utilities for integration testing.
//!
//! Stub backends are real axum servers on ephemeral ports that record every
//! request they receive; the gateway under test runs on its own listener.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{Request, StatusCode},
    response::IntoResponse,
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use tokio::net::TcpListener;

use mehm_gateway::auth::Claims;
use mehm_gateway::config::GatewayConfig;
use mehm_gateway::{HttpServer, Shutdown};

pub const SECRET: &str = "integration-secret";

/// One request as seen by a stub backend.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    /// Path plus query string, exactly as received.
    pub uri: String,
    pub body: String,
    pub content_type: Option<String>,
    pub request_id: Option<String>,
}

impl Recorded {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

#[derive(Clone)]
struct StubState {
    status: StatusCode,
    body: &'static str,
    calls: Arc<Mutex<Vec<Recorded>>>,
}

/// A backend that answers every request with a fixed status and body.
pub struct StubUpstream {
    pub addr: SocketAddr,
    calls: Arc<Mutex<Vec<Recorded>>>,
}

impl StubUpstream {
    pub async fn start(status: u16, body: &'static str) -> Self {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            status: StatusCode::from_u16(status).unwrap(),
            body,
            calls: calls.clone(),
        };

        let app = Router::new().fallback(record).with_state(state);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, calls }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn calls(&self) -> Vec<Recorded> {
        self.calls.lock().unwrap().clone()
    }

    pub fn only_call(&self) -> Recorded {
        let calls = self.calls();
        assert_eq!(calls.len(), 1, "expected exactly one upstream call: {:?}", calls);
        calls.into_iter().next().unwrap()
    }
}

async fn record(State(state): State<StubState>, request: Request<Body>) -> impl IntoResponse {
    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.unwrap_or_default();
    let uri = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_default();

    let header = |name: &str| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    };

    state.calls.lock().unwrap().push(Recorded {
        method: parts.method.to_string(),
        uri,
        body: String::from_utf8_lossy(&bytes).into_owned(),
        content_type: header("content-type"),
        request_id: header("x-request-id"),
    });

    (state.status, state.body)
}

/// Address that refuses connections.
pub async fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// A running gateway plus a client pointed at it.
pub struct Gateway {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    shutdown: Shutdown,
}

impl Gateway {
    pub async fn start(users_url: &str, mehms_url: &str) -> Self {
        let mut config = GatewayConfig::default();
        config.upstreams.users_url = users_url.to_string();
        config.upstreams.mehms_url = mehms_url.to_string();
        config.auth.secret = SECRET.to_string();
        config.auth.leeway_secs = 0;
        Self::with_config(config).await
    }

    pub async fn with_config(config: GatewayConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let shutdown = Shutdown::new();
        let server = HttpServer::new(config);
        let stop = shutdown.subscribe();
        tokio::spawn(async move {
            let _ = server.run(listener, stop).await;
        });

        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .no_proxy()
            .build()
            .unwrap();

        Self {
            addr,
            client,
            shutdown,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn get(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .get(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    pub fn post(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }
}

impl Drop for Gateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

fn now() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs()
}

/// Sign a valid token for the given account.
pub fn token(id: &str, admin: bool) -> String {
    let claims = Claims {
        id: id.to_string(),
        username: format!("user{}", id),
        email: format!("user{}@example.com", id),
        admin,
        exp: Some(now() + 3600),
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
}

pub fn expired_token(id: &str) -> String {
    let claims = Claims {
        id: id.to_string(),
        username: String::new(),
        email: String::new(),
        admin: false,
        exp: Some(now() - 120),
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
}

/// Error envelope message of a gateway response.
pub async fn message(response: reqwest::Response) -> String {
    let body: serde_json::Value = response.json().await.unwrap();
    body["message"].as_str().unwrap().to_string()
}
