//! HTTP surface of the storefront

pub mod checkout;
pub mod payment_result;

use crate::config::RouteConfig;
use crate::health::{health_handler, HealthChecker};
use crate::middleware::logging::{request_logging_middleware, UuidRequestId};
use crate::payments::client::CheckoutClient;
use crate::payments::provider::StatusFetcher;
use crate::workers::status_poller::PollerConfig;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};

use checkout::CheckoutState;
use payment_result::PaymentResultState;

/// Everything the routes need; each route group gets its own slice.
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<CheckoutClient>,
    pub fetcher: Arc<dyn StatusFetcher>,
    pub poller: PollerConfig,
    pub routes: RouteConfig,
}

impl AppState {
    /// Production wiring: the checkout client also serves as the status fetcher.
    pub fn new(client: CheckoutClient, poller: PollerConfig, routes: RouteConfig) -> Self {
        let client = Arc::new(client);
        Self {
            fetcher: client.clone(),
            client,
            poller,
            routes,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let result_routes: Router = Router::new()
        .route("/betaling/resultat", get(payment_result::payment_result))
        .with_state(PaymentResultState {
            fetcher: state.fetcher.clone(),
            poller: state.poller.clone(),
            routes: state.routes.clone(),
        });

    let checkout_routes: Router = Router::new()
        .route("/api/checkout", post(checkout::create_checkout))
        .with_state(CheckoutState {
            client: state.client.clone(),
        });

    let health_routes: Router = Router::new()
        .route("/health", get(health_handler))
        .with_state(HealthChecker::new(state.client.clone()));

    Router::new()
        .merge(health_routes)
        .merge(result_routes)
        .merge(checkout_routes)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                .layer(axum::middleware::from_fn(request_logging_middleware))
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
}
