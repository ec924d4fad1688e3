use crate::payments::error::PaymentResult;
use crate::payments::types::OrderStatusSnapshot;
use async_trait::async_trait;

/// Source of order status snapshots for the status poller.
///
/// Implementations must not retry internally: a failed fetch ends the
/// polling session.
#[async_trait]
pub trait StatusFetcher: Send + Sync {
    async fn fetch_status(&self, reference: &str) -> PaymentResult<OrderStatusSnapshot>;
}
