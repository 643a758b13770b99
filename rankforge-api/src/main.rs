//! rankforge-api - SEO planning engine HTTP server
//!
//! Serves projects, keyword intake/clustering and mock plan generation over
//! JSON. All records live in memory and are lost on restart.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rankforge_api::{build_router, AppState};
use rankforge_common::config::{CliOverrides, ServerConfig};
use rankforge_common::ClusterPolicy;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for rankforge-api
#[derive(Parser, Debug)]
#[command(name = "rankforge-api")]
#[command(about = "RankForge Engine API server")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(short, long, env = "RANKFORGE_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:8000
    #[arg(short, long, env = "RANKFORGE_BIND")]
    bind: Option<String>,

    /// Deployment name reported by /healthz
    #[arg(long, env = "ENV")]
    env: Option<String>,

    /// Keyword clustering policy: fixed_chunk, first_token or tiered
    #[arg(long, env = "RANKFORGE_CLUSTER_POLICY")]
    cluster_policy: Option<ClusterPolicy>,

    /// Skip the simulated processing pauses
    #[arg(long)]
    no_delays: bool,
}

impl Args {
    fn overrides(self) -> CliOverrides {
        CliOverrides {
            config_path: self.config,
            bind_addr: self.bind,
            env: self.env,
            cluster_policy: self.cluster_policy,
            no_delays: self.no_delays,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rankforge_api=info,rankforge_common=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting RankForge Engine API v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let config = ServerConfig::resolve(&args.overrides()).context("Failed to load configuration")?;
    let addr = config.socket_addr()?;

    info!("Environment: {}", config.env);
    info!("Cluster policy: {}", config.clustering.policy);
    info!("CORS origins: {}", config.cors.allowed_origins.join(", "));
    info!(
        "Simulated delays: cluster {}ms, generate {}ms, create {}ms",
        config.delays.cluster_ms, config.delays.generate_ms, config.delays.create_ms
    );

    let state = AppState::new(&config).context("Failed to initialize application state")?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/healthz", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
