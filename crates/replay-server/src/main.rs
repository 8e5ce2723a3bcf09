//! Binary entrypoint for the trace replay server.
//!
//! Configuration comes from flags or `REPLAY_*` environment variables (see
//! [`ServerConfig`]). Log filtering follows `RUST_LOG` (default `info`).

use clap::Parser;
use tracing_subscriber::EnvFilter;

use replay_server::config::ServerConfig;
use replay_server::router::build_router;
use replay_server::state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::parse();

    if !config.simulator.exists() {
        tracing::warn!(
            "simulator not found at {}; loads will fail until it is available",
            config.simulator.display()
        );
    }

    let state = AppState::new(&config);
    let app = build_router(state);

    let addr = config.bind_addr();
    tracing::info!(
        "replay server starting on {} (simulator: {})",
        addr,
        config.simulator.display()
    );

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
