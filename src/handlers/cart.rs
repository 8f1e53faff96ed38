use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
};
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::handlers::api::{json_body, service_error_to_response, ApiError};
use crate::models::{AddCartItemRequest, CartDrawerRequest, CartResponse};
use crate::services::CartService;

/// Application state for cart handlers
#[derive(Clone)]
pub struct CartState {
    pub cart_service: Arc<CartService>,
}

/// Get the cart for a session
#[instrument(name = "get_cart", skip(state), fields(session_id = %session_id))]
pub async fn get_cart(
    State(state): State<CartState>,
    Path(session_id): Path<String>,
) -> Result<Json<CartResponse>, ApiError> {
    match state.cart_service.get_cart(&session_id).await {
        Ok(cart) => {
            info!(
                "Retrieved cart for session {} with {} items",
                session_id, cart.total_items
            );
            Ok(Json(cart))
        }
        Err(err) => {
            error!("Failed to get cart for session {}: {}", session_id, err);
            Err(service_error_to_response(err))
        }
    }
}

/// Add one unit of a product to the cart
#[instrument(name = "add_cart_item", skip(state, payload), fields(session_id = %session_id))]
pub async fn add_item(
    State(state): State<CartState>,
    Path(session_id): Path<String>,
    payload: Result<Json<AddCartItemRequest>, JsonRejection>,
) -> Result<Json<CartResponse>, ApiError> {
    let request = json_body(payload)?;
    let product_id = request.product_id.clone();

    match state.cart_service.add_item(&session_id, request).await {
        Ok(cart) => {
            info!("Added product {} to cart for session {}", product_id, session_id);
            Ok(Json(cart))
        }
        Err(err) => {
            error!(
                "Failed to add product {} to cart for session {}: {}",
                product_id, session_id, err
            );
            Err(service_error_to_response(err))
        }
    }
}

/// Remove a product's line from the cart
#[instrument(name = "remove_cart_item", skip(state), fields(session_id = %session_id, product_id = %product_id))]
pub async fn remove_item(
    State(state): State<CartState>,
    Path((session_id, product_id)): Path<(String, String)>,
) -> Result<Json<CartResponse>, ApiError> {
    match state.cart_service.remove_item(&session_id, &product_id).await {
        Ok(cart) => Ok(Json(cart)),
        Err(err) => {
            error!(
                "Failed to remove product {} from cart for session {}: {}",
                product_id, session_id, err
            );
            Err(service_error_to_response(err))
        }
    }
}

/// Open or close the cart drawer
#[instrument(name = "set_cart_drawer", skip(state, payload), fields(session_id = %session_id))]
pub async fn set_drawer(
    State(state): State<CartState>,
    Path(session_id): Path<String>,
    payload: Result<Json<CartDrawerRequest>, JsonRejection>,
) -> Result<Json<CartResponse>, ApiError> {
    let request = json_body(payload)?;
    state
        .cart_service
        .set_drawer(&session_id, request.open)
        .await
        .map(Json)
        .map_err(service_error_to_response)
}
