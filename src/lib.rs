//! Storefront service for the bead-pattern shop.
//!
//! After checkout the payment provider sends the customer back to the result
//! page. From there [`workers::status_poller::StatusPoller`] reconciles the
//! order status with the checkout backend and
//! [`services::result_router::ResultRouter`] picks the outcome page exactly once.

pub mod api;
pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod middleware;
pub mod payments;
pub mod services;
pub mod workers;
