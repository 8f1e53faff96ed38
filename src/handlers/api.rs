use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, JsonRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::models::{
    AddressConfirmation, CategoryFilter, CategoryRequest, CheckoutReceipt, CheckoutRequest,
    NavigateRequest, Product, ProductListResponse, RepositoryError, ServiceError,
    SessionResponse, UpdateAddressRequest,
};
use crate::services::{CatalogService, SessionService};

pub type ApiError = (StatusCode, Json<Value>);

/// Shared state for catalog and session endpoints
#[derive(Clone)]
pub struct ApiState {
    pub catalog_service: Arc<CatalogService>,
    pub session_service: Arc<SessionService>,
}

/// Query parameters for listing products
#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<String>,
}

// =============================================================================
// CATALOG ENDPOINTS
// =============================================================================

/// Category filter labels, "Todos" first
#[instrument(name = "list_categories", skip(state))]
pub async fn list_categories(State(state): State<ApiState>) -> Json<CategoriesResponse> {
    Json(CategoriesResponse {
        categories: state.catalog_service.list_categories(),
    })
}

/// List products, optionally filtered by category label
#[instrument(name = "list_products", skip(state), fields(category = query.category.as_deref()))]
pub async fn list_products(
    State(state): State<ApiState>,
    Query(query): Query<ListProductsQuery>,
) -> Result<Json<ProductListResponse>, ApiError> {
    let filter = match query.category.as_deref() {
        None | Some("") => CategoryFilter::All,
        Some(label) => label.parse::<CategoryFilter>().map_err(|err| {
            warn!("Invalid category filter: {}", err);
            bad_request("Invalid query parameters", err)
        })?,
    };

    match state.catalog_service.list_products(filter).await {
        Ok(response) => {
            info!("Successfully listed {} products", response.total_count);
            Ok(Json(response))
        }
        Err(err) => {
            error!("Failed to list products: {}", err);
            Err(service_error_to_response(err))
        }
    }
}

#[instrument(name = "best_sellers", skip(state))]
pub async fn best_sellers(
    State(state): State<ApiState>,
) -> Result<Json<ProductListResponse>, ApiError> {
    state
        .catalog_service
        .best_sellers()
        .await
        .map(Json)
        .map_err(service_error_to_response)
}

/// Get a specific product by ID
#[instrument(name = "get_product", skip(state), fields(product_id = %product_id))]
pub async fn get_product(
    State(state): State<ApiState>,
    Path(product_id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    match state.catalog_service.get_product(&product_id).await {
        Ok(product) => Ok(Json(product)),
        Err(err) => {
            error!("Failed to get product {}: {}", product_id, err);
            Err(service_error_to_response(err))
        }
    }
}

// =============================================================================
// SESSION ENDPOINTS
// =============================================================================

#[instrument(name = "create_session", skip(state))]
pub async fn create_session(
    State(state): State<ApiState>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    match state.session_service.create_session().await {
        Ok(session) => {
            info!(session_id = %session.session_id, "Session created");
            Ok((StatusCode::CREATED, Json(session)))
        }
        Err(err) => {
            error!("Failed to create session: {}", err);
            Err(service_error_to_response(err))
        }
    }
}

#[instrument(name = "get_session", skip(state))]
pub async fn get_session(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    state
        .session_service
        .get_session(&session_id)
        .await
        .map(Json)
        .map_err(service_error_to_response)
}

#[instrument(name = "delete_session", skip(state))]
pub async fn delete_session(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    match state.session_service.delete_session(&session_id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(err) => {
            error!("Failed to delete session {}: {}", session_id, err);
            Err(service_error_to_response(err))
        }
    }
}

#[instrument(name = "navigate", skip(state, payload))]
pub async fn navigate(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
    payload: Result<Json<NavigateRequest>, JsonRejection>,
) -> Result<Json<SessionResponse>, ApiError> {
    let request = json_body(payload)?;
    state
        .session_service
        .navigate(&session_id, request.page)
        .await
        .map(Json)
        .map_err(service_error_to_response)
}

#[instrument(name = "set_category", skip(state, payload))]
pub async fn set_category(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
    payload: Result<Json<CategoryRequest>, JsonRejection>,
) -> Result<Json<SessionResponse>, ApiError> {
    let request = json_body(payload)?;
    state
        .session_service
        .set_category(&session_id, request.category)
        .await
        .map(Json)
        .map_err(service_error_to_response)
}

/// Products under the session's active filter
#[instrument(name = "session_products", skip(state))]
pub async fn session_products(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
) -> Result<Json<ProductListResponse>, ApiError> {
    state
        .session_service
        .visible_products(&session_id)
        .await
        .map(Json)
        .map_err(service_error_to_response)
}

#[instrument(name = "open_product", skip(state))]
pub async fn open_product(
    State(state): State<ApiState>,
    Path((session_id, product_id)): Path<(String, String)>,
) -> Result<Json<SessionResponse>, ApiError> {
    state
        .session_service
        .open_product(&session_id, &product_id)
        .await
        .map(Json)
        .map_err(service_error_to_response)
}

#[instrument(name = "update_address", skip(state, payload))]
pub async fn update_address(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
    payload: Result<Json<UpdateAddressRequest>, JsonRejection>,
) -> Result<Json<SessionResponse>, ApiError> {
    let request = json_body(payload)?;
    state
        .session_service
        .update_address(&session_id, request)
        .await
        .map(Json)
        .map_err(service_error_to_response)
}

#[instrument(name = "confirm_address", skip(state))]
pub async fn confirm_address(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
) -> Result<Json<AddressConfirmation>, ApiError> {
    match state.session_service.confirm_address(&session_id).await {
        Ok(confirmation) => Ok(Json(confirmation)),
        Err(err) => {
            warn!("Address not confirmed: {}", err);
            Err(service_error_to_response(err))
        }
    }
}

#[instrument(name = "start_checkout", skip(state))]
pub async fn start_checkout(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    state
        .session_service
        .start_checkout(&session_id)
        .await
        .map(Json)
        .map_err(service_error_to_response)
}

/// Place the order. The body is optional.
#[instrument(name = "checkout", skip(state, body))]
pub async fn checkout(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<CheckoutReceipt>, ApiError> {
    let request: CheckoutRequest = optional_json_body(body)?;

    match state.session_service.checkout(&session_id, request).await {
        Ok(receipt) => {
            info!(order_id = %receipt.order_id, "Checkout completed");
            Ok(Json(receipt))
        }
        Err(err) => {
            error!("Checkout failed for session {}: {}", session_id, err);
            Err(service_error_to_response(err))
        }
    }
}

// =============================================================================
// ERROR MAPPING
// =============================================================================

/// Unwrap a JSON body, answering 400 for malformed or mistyped payloads
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| body_rejection(rejection.status(), rejection.body_text()))
}

/// Decode a body that may be left out. An empty body means the default
/// request; anything else must be valid JSON for `T`.
pub fn optional_json_body<T>(body: Result<Bytes, BytesRejection>) -> Result<T, ApiError>
where
    T: DeserializeOwned + Default,
{
    let bytes = body.map_err(|rejection| body_rejection(rejection.status(), rejection.body_text()))?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    serde_json::from_slice(&bytes).map_err(|err| {
        warn!("Malformed request body: {}", err);
        bad_request("Invalid request body", err.to_string())
    })
}

fn body_rejection(status: StatusCode, message: String) -> ApiError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        return (
            status,
            Json(json!({
                "error": "Request too large",
                "message": message,
                "timestamp": chrono::Utc::now().to_rfc3339(),
            })),
        );
    }
    bad_request("Invalid request body", message)
}

fn bad_request(error: &str, message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": error,
            "message": message.into(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })),
    )
}

/// Convert service errors to HTTP responses
pub fn service_error_to_response(err: ServiceError) -> ApiError {
    let (status, error, message) = match &err {
        ServiceError::ProductNotFound { .. } | ServiceError::SessionNotFound { .. } => {
            (StatusCode::NOT_FOUND, "Not found", err.to_string())
        }
        ServiceError::PostalCodeNotFound { .. } => (
            StatusCode::NOT_FOUND,
            "Postal code not found",
            "CEP não encontrado. Por favor, verifique o número digitado.".to_string(),
        ),
        ServiceError::ValidationError { .. } => {
            (StatusCode::BAD_REQUEST, "Validation error", err.to_string())
        }
        ServiceError::EmptyCart => (StatusCode::BAD_REQUEST, "Empty cart", err.to_string()),
        ServiceError::LookupFailed { .. } => (
            StatusCode::BAD_GATEWAY,
            "Postal code lookup failed",
            "Ocorreu um erro ao buscar o CEP. Tente novamente mais tarde.".to_string(),
        ),
        ServiceError::Repository { source } => match source {
            RepositoryError::StorageUnavailable { .. } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Storage unavailable",
                "Service temporarily unavailable".to_string(),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Storage error",
                "Internal server error".to_string(),
            ),
        },
    };

    (
        status,
        Json(json!({
            "error": error,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })),
    )
}
