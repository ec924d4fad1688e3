//! One-shot redirect decision on top of the status poller's output.

use crate::config::RouteConfig;
use crate::payments::types::PaymentStatus;
use crate::workers::status_poller::PollerState;
use tokio::sync::watch;
use tracing::info;
use url::form_urlencoded;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    Failed,
    Timeout,
}

impl CancelReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            CancelReason::Failed => "failed",
            CancelReason::Timeout => "timeout",
        }
    }
}

/// Terminal page the customer is sent to, always carrying the order reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Success {
        reference: String,
    },
    Cancelled {
        reference: String,
        reason: Option<CancelReason>,
    },
    Error {
        reference: String,
    },
}

impl Navigation {
    pub fn reference(&self) -> &str {
        match self {
            Navigation::Success { reference }
            | Navigation::Cancelled { reference, .. }
            | Navigation::Error { reference } => reference,
        }
    }

    /// Target path with an encoded query, e.g.
    /// `/betaling/avbrutt?reference=ORD-1&reason=timeout`.
    pub fn location(&self, routes: &RouteConfig) -> String {
        let (path, reason) = match self {
            Navigation::Success { .. } => (&routes.success_path, None),
            Navigation::Cancelled { reason, .. } => (&routes.cancelled_path, *reason),
            Navigation::Error { .. } => (&routes.error_path, None),
        };

        let mut query = form_urlencoded::Serializer::new(String::new());
        query.append_pair("reference", self.reference());
        if let Some(reason) = reason {
            query.append_pair("reason", reason.as_str());
        }
        format!("{}?{}", path, query.finish())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Navigate(Navigation),
    /// No reference, so there is no page to send the customer to.
    InlineError { message: String },
}

/// Turns poller states into at most one [`RouteDecision`].
#[derive(Debug)]
pub struct ResultRouter {
    reference: Option<String>,
    decided: bool,
}

impl ResultRouter {
    pub fn new(reference: Option<String>) -> Self {
        Self {
            reference: reference
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
            decided: false,
        }
    }

    /// Returns a decision the first time `state` is terminal and never again.
    pub fn observe(&mut self, state: &PollerState) -> Option<RouteDecision> {
        if self.decided {
            return None;
        }

        let decision = self.decide(state)?;
        self.decided = true;

        match &decision {
            RouteDecision::Navigate(navigation) => info!(
                reference = %navigation.reference(),
                navigation = ?navigation,
                "payment result routed"
            ),
            RouteDecision::InlineError { message } => {
                info!(error = %message, "payment result has no reference; rendering inline error")
            }
        }
        Some(decision)
    }

    fn decide(&self, state: &PollerState) -> Option<RouteDecision> {
        let Some(reference) = self.reference.clone() else {
            return state
                .error
                .as_ref()
                .map(|message| RouteDecision::InlineError {
                    message: message.clone(),
                });
        };

        if !state.loading {
            if let Some(snapshot) = &state.order_status {
                let navigation = match snapshot.payment_status {
                    PaymentStatus::Paid => Some(Navigation::Success {
                        reference: reference.clone(),
                    }),
                    PaymentStatus::Cancelled => Some(Navigation::Cancelled {
                        reference: reference.clone(),
                        reason: None,
                    }),
                    PaymentStatus::Failed => Some(Navigation::Cancelled {
                        reference: reference.clone(),
                        reason: Some(CancelReason::Failed),
                    }),
                    PaymentStatus::Pending => None,
                };
                if let Some(navigation) = navigation {
                    return Some(RouteDecision::Navigate(navigation));
                }
            }
        }

        if state.timed_out {
            return Some(RouteDecision::Navigate(Navigation::Cancelled {
                reference,
                reason: Some(CancelReason::Timeout),
            }));
        }

        if !state.loading && state.error.is_some() {
            return Some(RouteDecision::Navigate(Navigation::Error { reference }));
        }

        None
    }

    /// Follows the poller until a decision is made. Returns `None` if the
    /// poller goes away first.
    pub async fn follow(mut self, mut rx: watch::Receiver<PollerState>) -> Option<RouteDecision> {
        loop {
            let state = rx.borrow_and_update().clone();
            if let Some(decision) = self.observe(&state) {
                return Some(decision);
            }
            if rx.changed().await.is_err() {
                let state = rx.borrow().clone();
                return self.observe(&state);
            }
        }
    }
}
