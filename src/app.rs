use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::{Config, ConfigError, StorageBackend};
use crate::handlers::{
    admin, api, cart, health_check, metrics_handler, request_validation_middleware,
    security_headers_middleware, shipping, RequestLimits,
};
use crate::observability::{observability_middleware, Metrics};
use crate::repositories::{
    CatalogRepository, FileKeyValueStore, InMemoryKeyValueStore, InMemorySessionRepository,
    KeyValueInboxRepository, KeyValueStore, SessionRepository, StaticCatalogRepository,
};
use crate::services::{
    CartService, CatalogService, DistanceEstimator, InboxService, PostalCodeLookup,
    SessionService, ShippingService, ViaCepClient,
};

/// Every service the router dispatches to
#[derive(Clone)]
pub struct AppServices {
    pub catalog_service: Arc<CatalogService>,
    pub session_service: Arc<SessionService>,
    pub cart_service: Arc<CartService>,
    pub shipping_service: Arc<ShippingService>,
    pub inbox_service: Arc<InboxService>,
}

impl AppServices {
    /// Wire repositories and services from configuration.
    ///
    /// The distance estimator is passed in so callers can pick a simulated
    /// or a fixed distance.
    pub fn from_config(
        config: &Config,
        metrics: Arc<Metrics>,
        distance_estimator: Arc<dyn DistanceEstimator>,
    ) -> Result<Self, ConfigError> {
        let postal_lookup = ViaCepClient::new(
            &config.lookup.postal_lookup_base_url,
            config.lookup.postal_lookup_timeout_seconds,
        )
        .map_err(|e| ConfigError::ValidationError {
            message: format!("Failed to build postal lookup client: {}", e),
        })?;

        let store: Arc<dyn KeyValueStore> = match config.storage.storage_backend {
            StorageBackend::File => Arc::new(FileKeyValueStore::new(&config.storage.data_dir)),
            StorageBackend::Memory => Arc::new(InMemoryKeyValueStore::new()),
        };

        Ok(Self::new(
            Arc::new(StaticCatalogRepository::new()),
            Arc::new(InMemorySessionRepository::with_capacity(
                config.sessions.max_sessions,
            )),
            store,
            config.storage.inbox_key.clone(),
            Arc::new(postal_lookup),
            distance_estimator,
            config.shipping.origin_address.clone(),
            metrics,
        ))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        catalog_repository: Arc<dyn CatalogRepository>,
        session_repository: Arc<dyn SessionRepository>,
        store: Arc<dyn KeyValueStore>,
        inbox_key: String,
        postal_lookup: Arc<dyn PostalCodeLookup>,
        distance_estimator: Arc<dyn DistanceEstimator>,
        origin_address: String,
        metrics: Arc<Metrics>,
    ) -> Self {
        let inbox_repository = Arc::new(KeyValueInboxRepository::new(
            store,
            inbox_key,
            metrics.clone(),
        ));

        Self {
            catalog_service: Arc::new(CatalogService::new(
                catalog_repository.clone(),
                metrics.clone(),
            )),
            session_service: Arc::new(SessionService::new(
                session_repository.clone(),
                catalog_repository.clone(),
                metrics.clone(),
            )),
            cart_service: Arc::new(CartService::new(
                session_repository.clone(),
                catalog_repository,
                metrics.clone(),
            )),
            shipping_service: Arc::new(ShippingService::new(
                session_repository,
                postal_lookup,
                distance_estimator,
                origin_address,
                metrics.clone(),
            )),
            inbox_service: Arc::new(InboxService::new(inbox_repository, metrics)),
        }
    }
}

/// Build the application router
pub fn create_app(services: AppServices, metrics: Arc<Metrics>, limits: RequestLimits) -> Router {
    let metrics_for_middleware = metrics.clone();

    let api_state = api::ApiState {
        catalog_service: services.catalog_service,
        session_service: services.session_service,
    };
    let cart_state = cart::CartState {
        cart_service: services.cart_service,
    };
    let shipping_state = shipping::ShippingState {
        shipping_service: services.shipping_service,
    };
    let admin_state = admin::AdminState {
        inbox_service: services.inbox_service,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(86400));

    info!("Building application router");

    Router::new()
        // Health and metrics endpoints (with metrics state)
        .route("/health/status", get(health_check))
        .route("/metrics", get(metrics_handler))
        .with_state(metrics)
        // Catalog and session endpoints
        .route("/api/categories", get(api::list_categories))
        .route("/api/products", get(api::list_products))
        .route("/api/products/best-sellers", get(api::best_sellers))
        .route("/api/products/:product_id", get(api::get_product))
        .route("/api/sessions", post(api::create_session))
        .route(
            "/api/sessions/:session_id",
            get(api::get_session).delete(api::delete_session),
        )
        .route("/api/sessions/:session_id/navigate", post(api::navigate))
        .route("/api/sessions/:session_id/category", put(api::set_category))
        .route(
            "/api/sessions/:session_id/products",
            get(api::session_products),
        )
        .route(
            "/api/sessions/:session_id/products/:product_id/open",
            post(api::open_product),
        )
        .route(
            "/api/sessions/:session_id/checkout/start",
            post(api::start_checkout),
        )
        .route("/api/sessions/:session_id/checkout", post(api::checkout))
        .route(
            "/api/sessions/:session_id/address",
            put(api::update_address),
        )
        .route(
            "/api/sessions/:session_id/address/confirm",
            post(api::confirm_address),
        )
        .with_state(api_state)
        // Cart endpoints
        .route("/api/sessions/:session_id/cart", get(cart::get_cart))
        .route("/api/sessions/:session_id/cart/items", post(cart::add_item))
        .route(
            "/api/sessions/:session_id/cart/items/:product_id",
            delete(cart::remove_item),
        )
        .route("/api/sessions/:session_id/cart/drawer", put(cart::set_drawer))
        .with_state(cart_state)
        // Shipping endpoints
        .route("/api/shipping/fees", get(shipping::shipping_fees))
        .route(
            "/api/sessions/:session_id/address/lookup",
            post(shipping::lookup_postal_code),
        )
        .with_state(shipping_state)
        // Admin endpoints
        .route(
            "/api/admin/inbox",
            get(admin::list_inbox).delete(admin::clear_inbox),
        )
        .with_state(admin_state)
        // Add middleware layers (order matters - outer to inner)
        .layer(DefaultBodyLimit::max(limits.max_body_bytes as usize))
        .layer(TimeoutLayer::new(limits.request_timeout))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(move |req, next| {
            request_validation_middleware(limits, req, next)
        }))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(move |req, next| {
            observability_middleware(metrics_for_middleware.clone(), req, next)
        }))
}

/// Periodically drop sessions idle for longer than `max_idle`
pub fn spawn_session_sweeper(
    session_service: Arc<SessionService>,
    max_idle: Duration,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(e) = session_service.purge_idle_sessions(max_idle).await {
                error!("Idle session sweep failed: {}", e);
            }
        }
    })
}
