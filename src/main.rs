use anyhow::{Context, Result};
use clap::Parser;
use listings_api::{
    api, config, logging,
    store::{StoreGateway, StoreSettings},
};
use std::net::Ipv4Addr;
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(
    name = "listings-api",
    about = "JSON CRUD service for startup listings"
)]
struct Cli {
    /// Port to listen on; overrides `SERVER_PORT`.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::init_config().context("failed to load configuration")?;
    logging::init_tracing();
    config.log_summary();

    let settings = StoreSettings::from(config);
    let store = StoreGateway::connect(&settings)
        .await
        .context("failed to connect to the document store")?;
    let app = api::create_router(Arc::new(store));

    let port = cli.port.unwrap_or(config.server_port);
    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
        .await
        .with_context(|| format!("failed to bind port {port}"))?;
    tracing::info!("Listening on http://0.0.0.0:{}", port);
    axum::serve(listener, app)
        .await
        .context("HTTP server terminated unexpectedly")?;
    Ok(())
}
