use std::net::SocketAddr;
use std::process::ExitCode;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use enhancer_server::cache::{CacheConfig, CachedRouter};
use enhancer_server::enhance::{EnhancerConfig, TripTransformer};
use enhancer_server::routing::{GraphHopperClient, GraphHopperConfig};
use enhancer_server::stops::{StopsStore, read_stop_sources};
use enhancer_server::web::{AppState, create_router};

/// Stop source list used when `STOP_SOURCES` is not set.
const DEFAULT_STOP_SOURCES: &str = "data/stop_sources.json";

/// Port used when `PORT` is not set.
const DEFAULT_PORT: u16 = 3000;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Routing client
    let mut routing_config = match std::env::var("GRAPHHOPPER_URL") {
        Ok(url) => GraphHopperConfig::new(url),
        Err(_) => {
            let config = GraphHopperConfig::default();
            warn!(url = %config.base_url, "GRAPHHOPPER_URL not set, using default");
            config
        }
    };
    if let Ok(key) = std::env::var("GRAPHHOPPER_API_KEY") {
        routing_config = routing_config.with_api_key(key);
    }
    let client = GraphHopperClient::new(routing_config)?;
    let router = CachedRouter::new(client, &CacheConfig::default());

    // Known stops (fail fast if unavailable)
    let sources_path = std::env::var("STOP_SOURCES").unwrap_or_else(|_| {
        warn!("STOP_SOURCES not set, using {DEFAULT_STOP_SOURCES}");
        DEFAULT_STOP_SOURCES.to_string()
    });
    let sources = read_stop_sources(&sources_path).await?;
    info!(sources = sources.len(), "loading stops");
    let stops = StopsStore::load(&sources).await?;
    info!(stops = stops.len(), "loaded stops");

    let transformer = TripTransformer::new(stops, router, EnhancerConfig::default());
    let app = create_router(AppState::new(transformer));

    let port = match std::env::var("PORT") {
        Ok(port) => port.parse()?,
        Err(_) => DEFAULT_PORT,
    };
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Carpool enhancer listening on http://{addr}");
    info!("  POST /        - Enhance a carpool");
    info!("  GET  /health  - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
