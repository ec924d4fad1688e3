use crate::error::AppError;
use crate::middleware::error::get_request_id_from_headers;
use crate::payments::client::CheckoutClient;
use crate::payments::types::{CheckoutRequest, CheckoutSession};
use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct CheckoutState {
    pub client: Arc<CheckoutClient>,
}

/// `POST /api/checkout`: forwards the cart to the backend and hands back the
/// payment provider URL the browser should be sent to.
pub async fn create_checkout(
    State(state): State<CheckoutState>,
    headers: HeaderMap,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutSession>), AppError> {
    let request_id = get_request_id_from_headers(&headers);
    info!(
        order_lines = request.order_lines.len(),
        currency = %request.currency,
        "checkout requested"
    );

    let session = state.client.create_checkout(&request).await.map_err(|e| {
        let err = AppError::from(e);
        match request_id {
            Some(id) => err.with_request_id(id),
            None => err,
        }
    })?;

    Ok((StatusCode::CREATED, Json(session)))
}
