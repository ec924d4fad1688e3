//! Health check module
//! Provides health status for the storefront and the checkout backend it depends on

use crate::payments::client::CheckoutClient;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info};

/// Health status response
#[derive(Debug, Serialize, Clone)]
pub struct HealthStatus {
    pub status: HealthState,
    pub checks: HashMap<String, ComponentHealth>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Overall health state
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub enum HealthState {
    Healthy,
    Degraded,
}

/// Individual component health status
#[derive(Debug, Serialize, Clone)]
pub struct ComponentHealth {
    pub status: ComponentState,
    pub response_time_ms: Option<u128>,
    pub details: Option<String>,
}

/// Component state
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub enum ComponentState {
    Up,
    Down,
}

impl HealthStatus {
    pub fn new() -> Self {
        Self {
            status: HealthState::Healthy,
            checks: HashMap::new(),
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self.status, HealthState::Healthy)
    }
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentHealth {
    pub fn up(response_time_ms: Option<u128>) -> Self {
        Self {
            status: ComponentState::Up,
            response_time_ms,
            details: None,
        }
    }

    pub fn down(details: Option<String>) -> Self {
        Self {
            status: ComponentState::Down,
            response_time_ms: None,
            details,
        }
    }
}

/// Health checker for the application
#[derive(Clone)]
pub struct HealthChecker {
    client: Arc<CheckoutClient>,
}

impl HealthChecker {
    pub fn new(client: Arc<CheckoutClient>) -> Self {
        Self { client }
    }

    /// The storefront itself stays up when the backend is down, so a failed
    /// backend check degrades rather than fails the service.
    pub async fn check_health(&self) -> HealthStatus {
        let mut health_status = HealthStatus::new();

        match timeout(Duration::from_secs(5), self.client.health_check()).await {
            Ok(backend) if backend.is_healthy => {
                health_status.checks.insert(
                    "checkout_backend".to_string(),
                    ComponentHealth::up(Some(backend.response_time_ms)),
                );
                info!(
                    "Checkout backend health check: OK ({}ms)",
                    backend.response_time_ms
                );
            }
            Ok(backend) => {
                health_status.status = HealthState::Degraded;
                health_status.checks.insert(
                    "checkout_backend".to_string(),
                    ComponentHealth::down(backend.error_message.clone()),
                );
                error!(
                    error = backend.error_message.as_deref().unwrap_or("unknown error"),
                    "Checkout backend health check failed"
                );
            }
            Err(_) => {
                health_status.status = HealthState::Degraded;
                health_status.checks.insert(
                    "checkout_backend".to_string(),
                    ComponentHealth::down(Some("Timeout".to_string())),
                );
                error!("Checkout backend health check timed out");
            }
        }

        health_status
    }
}

/// `GET /health`
pub async fn health_handler(
    State(checker): State<HealthChecker>,
) -> (StatusCode, Json<HealthStatus>) {
    let status = checker.check_health().await;
    let code = if status.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(status))
}
