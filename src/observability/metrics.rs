use prometheus::{
    CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Failed to register metric: {0}")]
    Registration(#[from] prometheus::Error),
    #[error("Failed to encode metrics: {0}")]
    Encoding(String),
}

/// Prometheus metrics for the storefront service
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,

    // HTTP metrics
    pub http_requests_total: CounterVec,
    pub http_request_duration_seconds: HistogramVec,
    pub http_requests_in_flight: GaugeVec,

    // Storage metrics
    pub storage_operations_total: CounterVec,
    pub storage_operation_duration_seconds: HistogramVec,

    // Business logic metrics
    pub catalog_operations_total: CounterVec,
    pub cart_operations_total: CounterVec,
    pub postal_lookups_total: CounterVec,
    pub postal_lookup_duration_seconds: HistogramVec,
    pub delivery_quotes_total: CounterVec,
    pub inbox_operations_total: CounterVec,
}

impl Metrics {
    /// Create a new metrics instance with all required metrics registered
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        info!("Initializing Prometheus metrics");

        // HTTP metrics
        let http_requests_total = CounterVec::new(
            Opts::new(
                "http_requests_total",
                "Total number of HTTP requests processed",
            ),
            &["method", "endpoint", "status_code"],
        )?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request duration in seconds",
            )
            .buckets(vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ]),
            &["method", "endpoint"],
        )?;

        let http_requests_in_flight = GaugeVec::new(
            Opts::new(
                "http_requests_in_flight",
                "Number of HTTP requests currently being processed",
            ),
            &["method", "endpoint"],
        )?;

        // Storage metrics
        let storage_operations_total = CounterVec::new(
            Opts::new(
                "storage_operations_total",
                "Total number of storage operations",
            ),
            &["operation", "store", "status"],
        )?;

        let storage_operation_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "storage_operation_duration_seconds",
                "Storage operation duration in seconds",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
            &["operation", "store"],
        )?;

        // Business logic metrics
        let catalog_operations_total = CounterVec::new(
            Opts::new(
                "catalog_operations_total",
                "Total number of catalog operations",
            ),
            &["operation", "category", "status"],
        )?;

        let cart_operations_total = CounterVec::new(
            Opts::new("cart_operations_total", "Total number of cart operations"),
            &["operation", "status"],
        )?;

        let postal_lookups_total = CounterVec::new(
            Opts::new(
                "postal_lookups_total",
                "Total number of postal code lookups by outcome",
            ),
            &["outcome"],
        )?;

        let postal_lookup_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "postal_lookup_duration_seconds",
                "Postal code lookup duration in seconds",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
            &["outcome"],
        )?;

        let delivery_quotes_total = CounterVec::new(
            Opts::new(
                "delivery_quotes_total",
                "Total number of delivery quotes by fee band",
            ),
            &["band"],
        )?;

        let inbox_operations_total = CounterVec::new(
            Opts::new(
                "inbox_operations_total",
                "Total number of admin inbox operations",
            ),
            &["operation", "status"],
        )?;

        // Register all metrics
        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(storage_operations_total.clone()))?;
        registry.register(Box::new(storage_operation_duration_seconds.clone()))?;
        registry.register(Box::new(catalog_operations_total.clone()))?;
        registry.register(Box::new(cart_operations_total.clone()))?;
        registry.register(Box::new(postal_lookups_total.clone()))?;
        registry.register(Box::new(postal_lookup_duration_seconds.clone()))?;
        registry.register(Box::new(delivery_quotes_total.clone()))?;
        registry.register(Box::new(inbox_operations_total.clone()))?;

        info!("Prometheus metrics initialized successfully");

        Ok(Metrics {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            http_requests_in_flight,
            storage_operations_total,
            storage_operation_duration_seconds,
            catalog_operations_total,
            cart_operations_total,
            postal_lookups_total,
            postal_lookup_duration_seconds,
            delivery_quotes_total,
            inbox_operations_total,
        })
    }

    /// Get the metrics registry for exposing metrics endpoint
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encode all metrics in Prometheus text format
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();

        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| MetricsError::Encoding(e.to_string()))?;

        String::from_utf8(buffer).map_err(|e| MetricsError::Encoding(e.to_string()))
    }

    /// Record HTTP request metrics
    pub fn record_http_request(
        &self,
        method: &str,
        endpoint: &str,
        status_code: u16,
        duration_seconds: f64,
    ) {
        let status_str = status_code.to_string();

        self.http_requests_total
            .with_label_values(&[method, endpoint, &status_str])
            .inc();

        self.http_request_duration_seconds
            .with_label_values(&[method, endpoint])
            .observe(duration_seconds);
    }

    /// Record storage operation metrics
    pub fn record_storage_operation(
        &self,
        operation: &str,
        store: &str,
        success: bool,
        duration_seconds: f64,
    ) {
        let status = if success { "success" } else { "error" };

        self.storage_operations_total
            .with_label_values(&[operation, store, status])
            .inc();

        self.storage_operation_duration_seconds
            .with_label_values(&[operation, store])
            .observe(duration_seconds);
    }

    /// Record catalog operation metrics
    pub fn record_catalog_operation(&self, operation: &str, category: Option<&str>, success: bool) {
        let category_str = category.unwrap_or("Todos");
        let status = if success { "success" } else { "error" };

        self.catalog_operations_total
            .with_label_values(&[operation, category_str, status])
            .inc();
    }

    /// Record cart operation metrics
    pub fn record_cart_operation(&self, operation: &str, success: bool) {
        let status = if success { "success" } else { "error" };

        self.cart_operations_total
            .with_label_values(&[operation, status])
            .inc();
    }

    /// Record a postal lookup; outcome is one of found, not_found, invalid, failed
    pub fn record_postal_lookup(&self, outcome: &str, duration_seconds: f64) {
        self.postal_lookups_total.with_label_values(&[outcome]).inc();

        self.postal_lookup_duration_seconds
            .with_label_values(&[outcome])
            .observe(duration_seconds);
    }

    /// Record a delivery quote under its fee band label
    pub fn record_delivery_quote(&self, band: &str) {
        self.delivery_quotes_total.with_label_values(&[band]).inc();
    }

    /// Record admin inbox operation metrics
    pub fn record_inbox_operation(&self, operation: &str, success: bool) {
        let status = if success { "success" } else { "error" };

        self.inbox_operations_total
            .with_label_values(&[operation, status])
            .inc();
    }

    /// Increment in-flight requests
    pub fn increment_in_flight(&self, method: &str, endpoint: &str) {
        self.http_requests_in_flight
            .with_label_values(&[method, endpoint])
            .inc();
    }

    /// Decrement in-flight requests
    pub fn decrement_in_flight(&self, method: &str, endpoint: &str) {
        self.http_requests_in_flight
            .with_label_values(&[method, endpoint])
            .dec();
    }
}
