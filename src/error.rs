//! Error handling for the storefront HTTP surface
//!
//! Maps failures to HTTP status codes, user-facing messages and stable error
//! codes. The status poller never produces these; it reports failures through
//! its published state instead.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error codes for programmatic handling
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorCode {
    #[serde(rename = "VALIDATION_ERROR")]
    ValidationError,
    #[serde(rename = "ORDER_NOT_FOUND")]
    OrderNotFound,
    #[serde(rename = "BACKEND_ERROR")]
    BackendError,
    #[serde(rename = "BACKEND_UNAVAILABLE")]
    BackendUnavailable,
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppErrorKind {
    /// Request rejected before reaching the backend
    Validation {
        message: String,
        field: Option<String>,
    },
    /// Checkout backend failed or answered with an error
    Backend { status: u16, message: String },
    /// Anything that is our own fault
    Internal { message: String },
}

/// Unified application error type
#[derive(Debug, Clone)]
pub struct AppError {
    pub kind: AppErrorKind,
    pub request_id: Option<String>,
    pub context: Option<String>,
}

impl AppError {
    pub fn new(kind: AppErrorKind) -> Self {
        Self {
            kind,
            request_id: None,
            context: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(AppErrorKind::Internal {
            message: message.into(),
        })
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Map error to HTTP status code
    pub fn status_code(&self) -> u16 {
        match &self.kind {
            AppErrorKind::Validation { .. } => 400,
            AppErrorKind::Backend { status, .. } => *status,
            AppErrorKind::Internal { .. } => 500,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> ErrorCode {
        match &self.kind {
            AppErrorKind::Validation { .. } => ErrorCode::ValidationError,
            AppErrorKind::Backend { status: 404, .. } => ErrorCode::OrderNotFound,
            AppErrorKind::Backend { status: 503, .. } => ErrorCode::BackendUnavailable,
            AppErrorKind::Backend { .. } => ErrorCode::BackendError,
            AppErrorKind::Internal { .. } => ErrorCode::InternalError,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match &self.kind {
            AppErrorKind::Validation { message, .. } => message.clone(),
            AppErrorKind::Backend { message, .. } => message.clone(),
            AppErrorKind::Internal { .. } => {
                "An internal server error occurred. Please try again later.".to_string()
            }
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self.kind, AppErrorKind::Backend { status: 503, .. })
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.error_code(), self.user_message())?;
        if let Some(context) = &self.context {
            write!(f, " ({})", context)?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}
