use thiserror::Error;

pub type PaymentResult<T> = Result<T, PaymentError>;

/// Failures at the checkout-backend boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PaymentError {
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Backend returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid backend response: {message}")]
    Decode { message: String },
}

impl PaymentError {
    pub fn http_status_code(&self) -> u16 {
        match self {
            PaymentError::Validation { .. } => 400,
            PaymentError::Status { status, .. } if *status == 404 => 404,
            PaymentError::Status { .. } => 502,
            PaymentError::Network { .. } => 503,
            PaymentError::Decode { .. } => 502,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            PaymentError::Validation { message, .. } => message.clone(),
            PaymentError::Status { status, .. } if *status == 404 => {
                "Order not found".to_string()
            }
            PaymentError::Status { message, .. } => message.clone(),
            PaymentError::Network { .. } => "Checkout service is temporarily unavailable".to_string(),
            PaymentError::Decode { .. } => "Could not read the order status".to_string(),
        }
    }
}

impl From<PaymentError> for crate::error::AppError {
    fn from(err: PaymentError) -> Self {
        use crate::error::{AppError, AppErrorKind};

        match err {
            PaymentError::Validation { message, field } => {
                AppError::new(AppErrorKind::Validation { message, field })
            }
            other => AppError::new(AppErrorKind::Backend {
                status: other.http_status_code(),
                message: other.user_message(),
            })
            .with_context(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_http_status_mapping_is_correct() {
        assert_eq!(
            PaymentError::Validation {
                message: "bad".to_string(),
                field: None
            }
            .http_status_code(),
            400
        );
        assert_eq!(
            PaymentError::Status {
                status: 404,
                message: "Ordre ikke funnet".to_string()
            }
            .http_status_code(),
            404
        );
        assert_eq!(
            PaymentError::Status {
                status: 500,
                message: "boom".to_string()
            }
            .http_status_code(),
            502
        );
        assert_eq!(
            PaymentError::Network {
                message: "refused".to_string()
            }
            .http_status_code(),
            503
        );
    }

    #[test]
    fn display_includes_status_code() {
        let err = PaymentError::Status {
            status: 500,
            message: "internal".to_string(),
        };
        assert_eq!(err.to_string(), "Backend returned HTTP 500: internal");
    }
}
