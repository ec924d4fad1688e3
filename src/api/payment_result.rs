//! Landing page after the payment provider redirect.
//!
//! The customer arrives at `/betaling/resultat?reference=...`. The handler
//! polls the order until the payment outcome is known (or the deadline
//! passes) and answers with a redirect to the matching outcome page. If the
//! client goes away the handler future is dropped, and the poller with it.

use crate::config::RouteConfig;
use crate::error::AppError;
use crate::payments::provider::StatusFetcher;
use crate::services::result_router::{ResultRouter, RouteDecision};
use crate::workers::status_poller::{PollerConfig, StatusPoller};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub struct PaymentResultState {
    pub fetcher: Arc<dyn StatusFetcher>,
    pub poller: PollerConfig,
    pub routes: RouteConfig,
}

#[derive(Debug, Deserialize)]
pub struct ResultQuery {
    pub reference: Option<String>,
}

pub async fn payment_result(
    State(state): State<PaymentResultState>,
    Query(query): Query<ResultQuery>,
) -> Response {
    let reference = query
        .reference
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());

    let mut poller = StatusPoller::new(state.fetcher.clone(), state.poller.clone());
    let updates = poller.subscribe();
    poller.start(reference.as_deref());

    let decision = ResultRouter::new(reference).follow(updates).await;
    poller.dispose();

    match decision {
        Some(RouteDecision::Navigate(navigation)) => {
            Redirect::to(&navigation.location(&state.routes)).into_response()
        }
        Some(RouteDecision::InlineError { message }) => {
            warn!(error = %message, "payment result page opened without a reference");
            (StatusCode::BAD_REQUEST, Html(missing_reference_page())).into_response()
        }
        None => AppError::internal("status poller stopped without a decision").into_response(),
    }
}

fn missing_reference_page() -> String {
    r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Payment</title></head>
<body>
  <main>
    <h1>Error</h1>
    <p>Invalid payment link: the order reference is missing.</p>
    <p><a href="/">Go to the homepage</a></p>
  </main>
</body>
</html>
"#
    .to_string()
}
