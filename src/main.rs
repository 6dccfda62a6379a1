use clap::Parser;
use miette::{IntoDiagnostic, Result};
use morabeza::application::checkout::CheckoutService;
use morabeza::config::Settings;
use morabeza::domain::menu::MenuItem;
use morabeza::domain::ports::{DynMenuCatalog, DynOrderStore};
use morabeza::infrastructure::in_memory::{InMemoryMenuCatalog, InMemoryOrderStore};
use morabeza::infrastructure::rest::RestStore;
use morabeza::infrastructure::stripe::StripeGateway;
use morabeza::interfaces::http;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address to serve the ordering API on
    #[arg(long, default_value = "0.0.0.0:8080")]
    bind: SocketAddr,

    /// JSON file of menu items for the in-memory catalog. Only used when
    /// no hosted store is configured via STORE_URL.
    #[arg(long)]
    menu: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env().into_diagnostic()?;

    let (catalog, orders): (DynMenuCatalog, DynOrderStore) = match &settings.store {
        Some(store_config) => {
            let store = RestStore::new(store_config.clone());
            (Arc::new(store.clone()), Arc::new(store))
        }
        None => {
            warn!("STORE_URL not set, orders will not survive a restart");
            let items = match &cli.menu {
                Some(path) => {
                    let raw = std::fs::read_to_string(path).into_diagnostic()?;
                    serde_json::from_str::<Vec<MenuItem>>(&raw).into_diagnostic()?
                }
                None => Vec::new(),
            };
            (
                Arc::new(InMemoryMenuCatalog::with_items(items)),
                Arc::new(InMemoryOrderStore::new()),
            )
        }
    };

    let gateway = Arc::new(StripeGateway::new(settings.stripe.clone()));
    let service = CheckoutService::new(catalog, orders, gateway, settings.checkout.clone());

    let listener = tokio::net::TcpListener::bind(cli.bind)
        .await
        .into_diagnostic()?;
    info!(addr = %cli.bind, "serving ordering API");
    axum::serve(listener, http::router(service))
        .await
        .into_diagnostic()?;

    Ok(())
}
