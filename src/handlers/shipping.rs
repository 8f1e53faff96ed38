use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, State},
    response::Json,
};
use std::sync::Arc;
use tracing::instrument;

use crate::handlers::api::{optional_json_body, service_error_to_response, ApiError};
use crate::models::{PostalLookupRequest, PostalLookupResponse, ShippingFeesResponse};
use crate::services::ShippingService;
use crate::{info_with_trace, warn_with_trace};

#[derive(Clone)]
pub struct ShippingState {
    pub shipping_service: Arc<ShippingService>,
}

/// Published delivery fee bands and the store's origin address
#[instrument(name = "shipping_fees", skip(state))]
pub async fn shipping_fees(State(state): State<ShippingState>) -> Json<ShippingFeesResponse> {
    Json(state.shipping_service.fee_table())
}

/// Look up the session's postal code and quote a delivery fee.
///
/// The body may carry a new postal code; without one the code already typed
/// into the session's address form is used.
#[instrument(name = "lookup_postal_code", skip(state, body), fields(session_id = %session_id))]
pub async fn lookup_postal_code(
    State(state): State<ShippingState>,
    Path(session_id): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<PostalLookupResponse>, ApiError> {
    let request: PostalLookupRequest = optional_json_body(body)?;

    match state
        .shipping_service
        .lookup_postal_code(&session_id, request)
        .await
    {
        Ok(response) => {
            info_with_trace!(
                postal_code = %response.postal_code,
                fee = %response.quote.fee,
                "Postal code resolved"
            );
            Ok(Json(response))
        }
        Err(err) => {
            warn_with_trace!("Postal code lookup for session {} ended with: {}", session_id, err);
            Err(service_error_to_response(err))
        }
    }
}
