use crate::payments::error::PaymentError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CURRENCY: &str = "NOK";

/// Payment lifecycle as reported by the checkout backend.
///
/// Only `Pending` keeps the status poller running; every other value is a
/// final business outcome.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Cancelled,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Cancelled => "cancelled",
            PaymentStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One answer from `GET /api/checkout/{reference}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderStatusSnapshot {
    pub order_id: i64,
    pub order_number: String,
    /// Order lifecycle (`new`, `pending_payment`, `paid`, ...). Opaque here.
    pub status: String,
    pub payment_status: PaymentStatus,
    /// Minor units (øre).
    pub total_amount: Option<i64>,
    pub currency: Option<String>,
}

/// A purchasable line. Bundle products carry their components as `children`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckoutOrderLine {
    pub product_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    /// Minor units (øre).
    pub unit_price: i64,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<CheckoutOrderLine>,
}

impl CheckoutOrderLine {
    /// Line total including nested children, `None` on overflow.
    pub fn total(&self) -> Option<i64> {
        let own = self.unit_price.checked_mul(i64::from(self.quantity))?;
        self.children
            .iter()
            .try_fold(own, |acc, child| acc.checked_add(child.total()?))
    }

    fn has_negative_price(&self) -> bool {
        self.unit_price < 0 || self.children.iter().any(CheckoutOrderLine::has_negative_price)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub order_lines: Vec<CheckoutOrderLine>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl CheckoutRequest {
    /// Cart total in minor units, `None` on overflow.
    pub fn total_amount(&self) -> Option<i64> {
        self.order_lines
            .iter()
            .try_fold(0i64, |acc, line| acc.checked_add(line.total()?))
    }

    pub fn validate(&self) -> Result<(), PaymentError> {
        if self.order_lines.is_empty() {
            return Err(PaymentError::Validation {
                message: "at least one order line is required".to_string(),
                field: Some("order_lines".to_string()),
            });
        }
        if self.currency.trim().is_empty() {
            return Err(PaymentError::Validation {
                message: "currency is required".to_string(),
                field: Some("currency".to_string()),
            });
        }
        if let Some(line) = self.order_lines.iter().find(|line| line.quantity == 0) {
            return Err(PaymentError::Validation {
                message: format!("quantity for {} must be at least 1", line.product_id),
                field: Some("order_lines.quantity".to_string()),
            });
        }
        if let Some(line) = self.order_lines.iter().find(|line| line.has_negative_price()) {
            return Err(PaymentError::Validation {
                message: format!("unit price for {} cannot be negative", line.product_id),
                field: Some("order_lines.unit_price".to_string()),
            });
        }
        if self.total_amount().is_none() {
            return Err(PaymentError::Validation {
                message: "order total is out of range".to_string(),
                field: Some("order_lines".to_string()),
            });
        }
        Ok(())
    }
}

/// Answer from `POST /api/checkout`. The customer is sent to `checkout_url`
/// and comes back to the result page with `?reference=...`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckoutSession {
    pub checkout_url: String,
    pub reference: String,
    pub order_id: i64,
    pub order_number: String,
}
