//! Boundary to the checkout backend: wire types, errors and the HTTP client.

pub mod client;
pub mod error;
pub mod provider;
pub mod types;

pub use client::CheckoutClient;
pub use error::{PaymentError, PaymentResult};
pub use provider::StatusFetcher;
pub use types::{
    CheckoutOrderLine, CheckoutRequest, CheckoutSession, OrderStatusSnapshot, PaymentStatus,
};
