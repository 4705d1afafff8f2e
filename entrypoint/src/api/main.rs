use std::sync::Arc;

use clap::Parser;
use common::config::Config;
use launcher::{ServerState, args::Args, build_router, errors::StartupError};
use mimalloc::MiMalloc;
use tokio::{net::TcpListener, signal};
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", err);
    }

    info!("Shutting down");
}

async fn run(args: Args) -> Result<(), StartupError> {
    let config = Config::load(args.config_filepath.as_deref())?;
    let state = ServerState::new(config, &args.cache_dir).await?;

    let listener = TcpListener::bind(args.listen_address.as_str())
        .await
        .map_err(|err| StartupError::Bind(args.listen_address.clone(), err))?;

    info!("Starting server at {}", args.listen_address);

    axum::serve(listener, build_router(Arc::new(state)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(StartupError::Serve)
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let env_log = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env()
        .expect("Failed to create tracing filter");

    let subscriber = FmtSubscriber::builder()
        .compact()
        .with_file(false)
        .with_env_filter(env_log);

    tracing::subscriber::set_global_default(subscriber.finish())
        .expect("Failed to create log subscription");

    let args = Args::parse();

    if let Err(err) = run(args).await {
        error!("Critical error: {}", err);
        return Err(err);
    }

    Ok(())
}
