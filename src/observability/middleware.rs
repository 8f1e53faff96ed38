use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use opentelemetry::trace::TraceContextExt;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn, Instrument};
use tracing_opentelemetry::OpenTelemetrySpanExt;

use super::Metrics;

/// Opens one server span per request and records HTTP metrics.
///
/// Requests are grouped by their matched route so `/api/sessions/:session_id`
/// stays a single series regardless of the id.
pub async fn observability_middleware(
    metrics: Arc<Metrics>,
    request: Request,
    next: Next,
) -> Response {
    let start_time = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched_path| matched_path.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let user_agent = request
        .headers()
        .get("user-agent")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let span_name = format!("{} {}", method, route);
    let span = tracing::info_span!(
        target: "luminous_storefront::http",
        "{}", span_name,
        otel.name = %span_name,
        otel.kind = "server",
        http.method = %method,
        http.route = %route,
        http.user_agent = %user_agent,
        http.response.status_code = tracing::field::Empty,
        http.response_time_ms = tracing::field::Empty,
    );

    async {
        metrics.increment_in_flight(&method, &route);

        let current_span = tracing::Span::current();
        let trace_id = current_span
            .context()
            .span()
            .span_context()
            .trace_id()
            .to_string();
        debug!(trace_id = %trace_id, "Processing request");

        let response = next.run(request).await;

        let elapsed = start_time.elapsed();
        let status_code = response.status().as_u16();
        current_span.record("http.response.status_code", status_code);
        current_span.record("http.response_time_ms", elapsed.as_millis());

        let otel_status = if status_code >= 500 {
            opentelemetry::trace::Status::error("HTTP server error")
        } else {
            opentelemetry::trace::Status::Ok
        };
        current_span.context().span().set_status(otel_status);

        metrics.record_http_request(&method, &route, status_code, elapsed.as_secs_f64());
        metrics.decrement_in_flight(&method, &route);

        match status_code {
            500.. => error!(
                trace_id = %trace_id,
                status_code,
                duration_ms = elapsed.as_millis(),
                "Request failed"
            ),
            400..=499 => warn!(
                trace_id = %trace_id,
                status_code,
                duration_ms = elapsed.as_millis(),
                "Request rejected"
            ),
            _ => info!(
                trace_id = %trace_id,
                status_code,
                duration_ms = elapsed.as_millis(),
                "Request completed"
            ),
        }

        response
    }
    .instrument(span)
    .await
}

/// Await `future` and report how long it took
async fn timed<F, T, E>(future: F) -> (Result<T, E>, Duration)
where
    F: Future<Output = Result<T, E>>,
{
    let start_time = Instant::now();
    let result = future.await;
    (result, start_time.elapsed())
}

/// Wraps key-value store calls with a span, timing and storage metrics
pub struct StorageTracingMiddleware {
    metrics: Arc<Metrics>,
}

impl StorageTracingMiddleware {
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self { metrics }
    }

    #[instrument(skip_all, fields(operation = %operation, store = %store))]
    pub async fn trace_operation<F, T, E>(
        &self,
        operation: &str,
        store: &str,
        future: F,
    ) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: Display,
    {
        let (result, elapsed) = timed(future).await;
        self.metrics
            .record_storage_operation(operation, store, result.is_ok(), elapsed.as_secs_f64());

        match &result {
            Ok(_) => debug!(duration_ms = elapsed.as_millis(), "Storage call done"),
            Err(e) => error!(error = %e, duration_ms = elapsed.as_millis(), "Storage call failed"),
        }
        result
    }
}

/// Counts catalog, cart and inbox operations by outcome
pub struct BusinessTracingMiddleware {
    metrics: Arc<Metrics>,
}

impl BusinessTracingMiddleware {
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self { metrics }
    }

    #[instrument(skip_all, fields(operation = %operation, category = category))]
    pub async fn trace_catalog_operation<F, T, E>(
        &self,
        operation: &str,
        category: Option<&str>,
        future: F,
    ) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: Display,
    {
        let (result, elapsed) = timed(future).await;
        self.metrics
            .record_catalog_operation(operation, category, result.is_ok());

        // Catalog misses are client mistakes, not faults
        if let Err(e) = &result {
            warn!(error = %e, duration_ms = elapsed.as_millis(), "Catalog operation failed");
        }
        result
    }

    #[instrument(skip_all, fields(operation = %operation, session_id = session_id))]
    pub async fn trace_cart_operation<F, T, E>(
        &self,
        operation: &str,
        session_id: Option<&str>,
        future: F,
    ) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: Display,
    {
        let (result, elapsed) = timed(future).await;
        self.metrics.record_cart_operation(operation, result.is_ok());

        match &result {
            Ok(_) => info!(duration_ms = elapsed.as_millis(), "Cart updated"),
            Err(e) => warn!(error = %e, duration_ms = elapsed.as_millis(), "Cart update refused"),
        }
        result
    }

    #[instrument(skip_all, fields(operation = %operation))]
    pub async fn trace_inbox_operation<F, T, E>(&self, operation: &str, future: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: Display,
    {
        let (result, elapsed) = timed(future).await;
        self.metrics.record_inbox_operation(operation, result.is_ok());

        if let Err(e) = &result {
            error!(error = %e, duration_ms = elapsed.as_millis(), "Inbox operation failed");
        }
        result
    }
}
