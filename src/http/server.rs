//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all dispatch handler
//! - Wire up middleware (tracing, request ID, CORS)
//! - Bind server to listener
//! - Look up the route and hand the request to the dispatcher
//! - Turn every failure into the JSON error envelope
//! - Observability (metrics, correlation IDs)

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE, COOKIE},
        HeaderName, Method, Request,
    },
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::dispatch::Dispatcher;
use crate::error::GatewayError;
use crate::http::request::{UuidRequestId, X_REQUEST_ID};
use crate::http::response::ensure_json;
use crate::lifecycle::signals::shutdown_signal;
use crate::observability::metrics;
use crate::routing::{RouteLookup, RouteTable, ROUTES};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub dispatcher: Arc<Dispatcher>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Self {
        let state = AppState {
            routes: Arc::new(RouteTable::new(ROUTES)),
            dispatcher: Arc::new(Dispatcher::new(&config)),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/{*path}", any(dispatch_handler))
            .route("/", any(dispatch_handler))
            .with_state(state)
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId));

        if config.cors.enabled {
            router = router.layer(cors_layer());
        }
        router
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until Ctrl+C, SIGTERM or the shutdown broadcast.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            users = %self.config.upstreams.users_url,
            mehms = %self.config.upstreams.mehms_url,
            "HTTP server starting"
        );

        let stop = async move {
            tokio::select! {
                _ = shutdown_signal() => {}
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown requested");
                }
            }
        };

        axum::serve(listener, self.router)
            .with_graceful_shutdown(stop)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Browser clients send the token as a header or cookie along with credentials.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            AUTHORIZATION,
            COOKIE,
            CONTENT_TYPE,
            HeaderName::from_static("credentials"),
        ])
        .allow_credentials(true)
}

/// Catch-all handler.
/// Looks up the route and runs the dispatch pipeline.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let (route, result) = match state.routes.lookup(&method, &path) {
        RouteLookup::Matched(matched) => {
            let name = matched.route.name;
            (name, state.dispatcher.dispatch(matched, request).await)
        }
        RouteLookup::MethodNotAllowed => {
            ("none", Err(GatewayError::MethodNotAllowed(method.to_string())))
        }
        RouteLookup::NotFound => ("none", Err(GatewayError::NotFound(path.clone()))),
    };

    let response = match result {
        Ok(response) => ensure_json(response),
        Err(e) => {
            if e.status_code().is_server_error() {
                tracing::error!(route, method = %method, path = %path, error = %e, "Request failed");
            } else {
                tracing::debug!(route, method = %method, path = %path, error = %e, "Request rejected");
            }
            e.into_response()
        }
    };

    let status = response.status().as_u16();
    metrics::record_request(route, status, start_time);
    tracing::info!(
        route,
        method = %method,
        path = %path,
        status,
        latency_ms = start_time.elapsed().as_millis() as u64,
        "Request completed"
    );

    response
}
