use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{error, info};

use luminous_storefront::{
    create_app,
    handlers::RequestLimits,
    init_observability,
    services::SimulatedDistance,
    shutdown_observability, spawn_session_sweeper, AppServices, Config, Metrics,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration first (basic logging only)
    let config = Config::from_environment()?;
    println!("Configuration loaded successfully");

    init_observability(
        &config.observability.service_name,
        &config.observability.service_version,
        config.observability.otlp_endpoint.as_deref(),
        &config.observability.log_level,
        config.observability.enable_json_logging,
    )?;

    info!("Starting luminous-storefront service");
    info!(
        "Service: {} v{}",
        config.observability.service_name, config.observability.service_version
    );
    info!(
        "Storage: backend={:?}, data_dir={}, inbox_key={}",
        config.storage.storage_backend,
        config.storage.data_dir.display(),
        config.storage.inbox_key
    );
    info!(
        "Postal lookup: {} (timeout {}s)",
        config.lookup.postal_lookup_base_url, config.lookup.postal_lookup_timeout_seconds
    );

    let metrics = Arc::new(Metrics::new()?);
    info!("Metrics initialized successfully");

    let distance = Arc::new(SimulatedDistance::new(
        config.shipping.min_distance_km,
        config.shipping.distance_span_km,
    ));
    let services = AppServices::from_config(&config, metrics.clone(), distance)?;
    info!("Services initialized successfully");

    let _sweeper = spawn_session_sweeper(
        services.session_service.clone(),
        config.sessions.idle_timeout(),
        config.sessions.sweep_interval(),
    );
    info!(
        "Sessions: max={}, idle timeout {}s",
        config.sessions.max_sessions, config.sessions.session_idle_timeout_seconds
    );

    let limits = RequestLimits {
        max_body_bytes: config.server.max_request_size as u64,
        request_timeout: config.server.request_timeout(),
    };
    let app = create_app(services, metrics, limits);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    info!("Server listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received");
        shutdown_observability().await;
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
