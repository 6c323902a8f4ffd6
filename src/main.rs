use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

use realip_gate::config::Config;
use realip_gate::middleware::RealIpLayer;
use realip_gate::proxy::forward::proxy_handler;
use realip_gate::state::AppState;

#[derive(Parser, Debug)]
#[command(name = "realip-gate", version, about = "Trusted client IP gateway")]
struct Args {
    #[arg(long, default_value = "config.toml")]
    config: String,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config = Config::load(&args.config)?;
    config.print_config();
    let real_ip = RealIpLayer::from_config(&config.real_ip)?;
    let state = Arc::new(AppState::new(config)?);

    let addr: SocketAddr = state
        .config
        .server
        .listen
        .parse()
        .map_err(|err| anyhow::anyhow!("invalid listen address: {err}"))?;

    if args.check {
        tracing::info!("config ok");
        return Ok(());
    }

    let app = Router::new()
        .fallback(proxy_handler)
        .layer(real_ip)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::warn!(listen = %addr, "realip-gate starting");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
