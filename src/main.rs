//! propfolio-server - backend for the Propfolio investment calculator

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use propfolio_server::api::{create_router, AppState};
use propfolio_server::background::BackgroundJobRunner;
use propfolio_server::billing::StripeGateway;
use propfolio_server::config::Config;
use propfolio_server::notify::NotifierChain;
use propfolio_server::store::JsonStore;

#[derive(Parser, Debug)]
#[command(name = "propfolio-server")]
#[command(about = "Backend for the Propfolio real-estate investment calculator")]
struct Args {
    /// Host to bind to
    #[arg(long, env = "PROPFOLIO_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to bind to
    #[arg(long, env = "PROPFOLIO_PORT", default_value = "3001")]
    port: u16,

    /// Path to the JSON data file
    #[arg(long, env = "PROPFOLIO_DATA_PATH", default_value = "./db.json")]
    data_path: String,

    /// Log level
    #[arg(long, env = "PROPFOLIO_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&args.log_level))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting propfolio-server v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    tracing::info!(
        environment = ?config.environment,
        billing_configured = config.billing.secret_key.is_some(),
        webhook_verification = config.billing.webhook_secret.is_some(),
        "configuration loaded"
    );

    // a corrupt or unreadable data file is fatal at startup
    let store = Arc::new(JsonStore::open(&args.data_path).await?);
    tracing::info!(path = %args.data_path, "record store opened");

    let billing = Arc::new(StripeGateway::new(
        config.billing.secret_key.clone().unwrap_or_default(),
    ));
    let notifiers = Arc::new(NotifierChain::from_config(&config)?);

    let runner = BackgroundJobRunner::new(
        Arc::clone(&store),
        notifiers,
        config.sweep.clone(),
    );
    let job_handles = runner.start()?;

    let state = Arc::new(AppState::new(store, billing, config));
    let router = create_router(state);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
        })
        .await?;

    runner.shutdown();
    for handle in job_handles {
        let _ = handle.await;
    }

    Ok(())
}
