//! mehm-gateway
//!
//! ```text
//!     Client ──▶ http server ──▶ routing table ──▶ dispatch
//!                                                   │ authenticate
//!                                                   │ authorize
//!                                                   │ validate
//!                                                   ▼
//!     Client ◀── relay ◀──────────── forwarder ──▶ users / mehms
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio::net::TcpListener;

use mehm_gateway::config::{load_config, ObservabilityConfig};
use mehm_gateway::observability::{logging, metrics};
use mehm_gateway::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "mehm-gateway")]
#[command(about = "Authenticated API gateway for the mehm services", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            logging::init_logging(&ObservabilityConfig::default());
            tracing::error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    logging::init_logging(&config.observability);
    tracing::info!("mehm-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        users = %config.upstreams.users_url,
        mehms = %config.upstreams.mehms_url,
        max_body_size = config.security.max_body_size,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Address syntax was checked during validation.
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                    return ExitCode::FAILURE;
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to parse metrics address");
                return ExitCode::FAILURE;
            }
        }
    }

    let listener = match TcpListener::bind(&config.listener.bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(
                bind_address = %config.listener.bind_address,
                error = %e,
                "Failed to bind listener"
            );
            return ExitCode::FAILURE;
        }
    };

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    if let Err(e) = server.run(listener, shutdown.subscribe()).await {
        tracing::error!(error = %e, "Server error");
        return ExitCode::FAILURE;
    }

    tracing::info!("Shutdown complete");
    ExitCode::SUCCESS
}
