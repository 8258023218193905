//! Unicam Server - unified camera inventory for mixed VMS/NVR fleets
//!
//! Main entry point for the inventory server.

use std::sync::Arc;
use std::time::Duration;

use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use unicam_server::{
    db,
    mapping::{MappingRuleRepository, MappingRuleService},
    raw::RawSnapshotRepository,
    state::{AppConfig, AppState},
    sync::SyncOrchestrator,
    unified::UnifiedCameraRepository,
    vendor::{VendorEndpointRepository, VendorEndpointService, VendorHttpClient},
    web_api,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "unicam_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Unicam Server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = AppConfig::default();
    tracing::info!(
        database_url = %config.database_url,
        host = %config.host,
        port = config.port,
        vendor_timeout_secs = config.vendor_timeout_secs,
        periodic_sync_enabled = config.periodic_sync_enabled,
        "Configuration loaded"
    );

    // Create database pool and ensure schema
    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database connected");

    db::init_schema(&pool).await?;

    // Initialize components
    let endpoint_repository = VendorEndpointRepository::new(pool.clone());
    let raw_snapshots = RawSnapshotRepository::new(pool.clone());
    let mapping_repository = MappingRuleRepository::new(pool.clone());
    let unified_cameras = UnifiedCameraRepository::new(pool.clone());

    let vendor_endpoints = VendorEndpointService::new(endpoint_repository.clone());
    let mappings = MappingRuleService::new(mapping_repository);

    let http_client = VendorHttpClient::new(Duration::from_secs(config.vendor_timeout_secs));

    let orchestrator = Arc::new(SyncOrchestrator::new(
        endpoint_repository,
        raw_snapshots.clone(),
        mappings.clone(),
        unified_cameras.clone(),
        http_client,
    ));
    tracing::info!("SyncOrchestrator initialized");

    // Start periodic full-sync loop
    if config.periodic_sync_enabled {
        let periodic = orchestrator.clone();
        let interval_secs = config.sync_interval_secs;
        tokio::spawn(async move {
            periodic.start_periodic_sync(interval_secs).await;
        });
    } else {
        tracing::info!("Periodic sync disabled (PERIODIC_SYNC_ENABLED=false)");
    }

    // Create application state
    let state = AppState {
        pool,
        config,
        vendor_endpoints,
        mappings,
        raw_snapshots,
        unified_cameras,
        orchestrator,
    };

    // Create router
    let app = web_api::create_router(state.clone())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = format!("{}:{}", state.config.host, state.config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
