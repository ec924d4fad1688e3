use crate::payments::error::{PaymentError, PaymentResult};
use crate::payments::provider::StatusFetcher;
use crate::payments::types::{CheckoutRequest, CheckoutSession, OrderStatusSnapshot};
use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// HTTP client for the checkout backend.
///
/// Every call is a single attempt. Callers decide whether a failure is worth
/// repeating; the status poller deliberately does not.
#[derive(Clone)]
pub struct CheckoutClient {
    client: Client,
    base_url: Url,
}

/// Result of a backend health probe.
#[derive(Debug, Clone)]
pub struct BackendHealth {
    pub is_healthy: bool,
    pub response_time_ms: u128,
    pub error_message: Option<String>,
}

impl CheckoutClient {
    pub fn new(base_url: &str, timeout: Duration) -> PaymentResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| PaymentError::Validation {
            message: format!("invalid backend URL {}: {}", base_url, e),
            field: Some("BACKEND_API_URL".to_string()),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(PaymentError::Validation {
                message: format!("backend URL {} cannot carry a path", base_url),
                field: Some("BACKEND_API_URL".to_string()),
            });
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PaymentError::Network {
                message: format!("failed to initialize HTTP client: {}", e),
            })?;

        Ok(Self { client, base_url })
    }

    /// Builds `{base}/{segments...}`, escaping each segment on its own so a
    /// reference can never add path components.
    pub fn endpoint(&self, segments: &[&str]) -> PaymentResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| PaymentError::Validation {
                message: format!("backend URL {} cannot carry a path", self.base_url),
                field: Some("BACKEND_API_URL".to_string()),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `GET /api/checkout/{reference}`
    pub async fn get_checkout_status(&self, reference: &str) -> PaymentResult<OrderStatusSnapshot> {
        let url = self.endpoint(&["api", "checkout", reference])?;
        let snapshot: OrderStatusSnapshot =
            self.request_json::<(), _>(Method::GET, url, None).await?;
        debug!(
            reference = %reference,
            payment_status = %snapshot.payment_status,
            order_status = %snapshot.status,
            "checkout status fetched"
        );
        Ok(snapshot)
    }

    /// `POST /api/checkout`
    pub async fn create_checkout(&self, request: &CheckoutRequest) -> PaymentResult<CheckoutSession> {
        request.validate()?;
        let url = self.endpoint(&["api", "checkout"])?;
        let session: CheckoutSession = self.request_json(Method::POST, url, Some(request)).await?;
        info!(
            reference = %session.reference,
            order_id = session.order_id,
            total_amount = request.total_amount(),
            currency = %request.currency,
            "checkout session created"
        );
        Ok(session)
    }

    /// `GET /health`
    pub async fn health_check(&self) -> BackendHealth {
        let started = Instant::now();
        let outcome = match self.endpoint(&["health"]) {
            Ok(url) => self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| e.to_string())
                .and_then(|resp| {
                    if resp.status().is_success() {
                        Ok(())
                    } else {
                        Err(format!("HTTP {}", resp.status()))
                    }
                }),
            Err(e) => Err(e.to_string()),
        };
        let response_time_ms = started.elapsed().as_millis();

        match outcome {
            Ok(()) => BackendHealth {
                is_healthy: true,
                response_time_ms,
                error_message: None,
            },
            Err(message) => {
                warn!(error = %message, "checkout backend health check failed");
                BackendHealth {
                    is_healthy: false,
                    response_time_ms,
                    error_message: Some(message),
                }
            }
        }
    }

    async fn request_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> PaymentResult<T> {
        let mut request = self.client.request(method, url);
        if let Some(payload) = body {
            request = request.json(payload);
        }

        let resp = request.send().await.map_err(|e| PaymentError::Network {
            message: format!("backend request failed: {}", e),
        })?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| PaymentError::Network {
            message: format!("failed to read backend response: {}", e),
        })?;

        if !status.is_success() {
            return Err(PaymentError::Status {
                status: status.as_u16(),
                message: error_detail(&text).unwrap_or_else(|| format!("HTTP {}", status)),
            });
        }

        serde_json::from_str::<T>(&text).map_err(|e| PaymentError::Decode {
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl StatusFetcher for CheckoutClient {
    async fn fetch_status(&self, reference: &str) -> PaymentResult<OrderStatusSnapshot> {
        self.get_checkout_status(reference).await
    }
}

/// Pulls the `detail` message out of a FastAPI-style error body.
fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("detail")
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}
