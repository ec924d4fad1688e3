//! Services module for payment result handling

pub mod result_router;

pub use result_router::{CancelReason, Navigation, ResultRouter, RouteDecision};
