use axum::{extract::State, http::StatusCode, response::Json};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::handlers::api::{service_error_to_response, ApiError};
use crate::models::InboxResponse;
use crate::services::InboxService;
use crate::error_with_trace;

/// Admin state containing services
#[derive(Clone)]
pub struct AdminState {
    pub inbox_service: Arc<InboxService>,
}

/// Response for inbox cleanup
#[derive(Debug, Serialize)]
pub struct ClearInboxResponse {
    pub message: String,
    pub timestamp: String,
}

/// Messages left by visitors, oldest first
#[instrument(name = "list_inbox", skip(state))]
pub async fn list_inbox(State(state): State<AdminState>) -> Result<Json<InboxResponse>, ApiError> {
    match state.inbox_service.list_messages().await {
        Ok(inbox) => {
            info!("Listed {} inbox messages", inbox.total_count);
            Ok(Json(inbox))
        }
        Err(err) => {
            error_with_trace!("Failed to read inbox: {}", err);
            Err(service_error_to_response(err))
        }
    }
}

/// Delete all stored messages
#[instrument(name = "clear_inbox", skip(state))]
pub async fn clear_inbox(
    State(state): State<AdminState>,
) -> Result<(StatusCode, Json<ClearInboxResponse>), ApiError> {
    match state.inbox_service.clear_messages().await {
        Ok(()) => {
            info!("Inbox cleared");
            Ok((
                StatusCode::OK,
                Json(ClearInboxResponse {
                    message: "Inbox cleared".to_string(),
                    timestamp: chrono::Utc::now().to_rfc3339(),
                }),
            ))
        }
        Err(err) => {
            error_with_trace!("Failed to clear inbox: {}", err);
            Err(service_error_to_response(err))
        }
    }
}
