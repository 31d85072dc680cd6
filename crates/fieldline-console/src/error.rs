//! # Service Error Type
//!
//! Unified error type for console operations.
//!
//! Screens receive a machine-readable `code` for programmatic handling
//! (switching on which inline message or banner to show) and a
//! human-readable `message` for display. Core errors map onto codes here,
//! in one place.

use serde::Serialize;
use thiserror::Error;

use fieldline_core::CoreError;

/// Error returned from console operations.
///
/// ## Serialization
/// What a screen receives when an operation fails:
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Insufficient stock for itm-42: available 3, requested 5"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Error)]
#[error("{message}")]
#[serde(rename_all = "camelCase")]
pub struct ServiceError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for console responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (unknown customer, line not in cart)
    NotFound,

    /// Input validation failed; correct the field and resubmit
    ValidationError,

    /// Operation not allowed in the current checkout/tender state
    BusinessLogic,

    /// Cart operation failed (size bounds)
    CartError,

    /// Requested quantity exceeds the sellable stock
    InsufficientStock,

    /// Tendered payment does not cover the amount due
    PaymentError,

    /// The external payment gateway declined or failed
    GatewayError,

    /// Unexpected internal condition
    Internal,
}

impl ServiceError {
    /// Creates a new service error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ServiceError {
            code,
            message: message.into(),
        }
    }

    /// Not-found error for an entity/id pair.
    pub fn not_found(entity: &str, id: &str) -> Self {
        Self::new(ErrorCode::NotFound, format!("{} not found: {}", entity, id))
    }

    /// Validation error with a field-level message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    /// Business-logic error (wrong state for the operation).
    pub fn business(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BusinessLogic, message)
    }
}

/// Maps core errors onto screen-facing codes.
impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::LineNotInCart(_) => ErrorCode::NotFound,
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::InsufficientPayment { .. } => ErrorCode::PaymentError,
            CoreError::CartTooLarge { .. } | CoreError::QuantityTooLarge { .. } => {
                ErrorCode::CartError
            }
            CoreError::Gateway { .. } => ErrorCode::GatewayError,
            CoreError::InvalidTransition { .. } => ErrorCode::BusinessLogic,
            CoreError::Validation(_) => ErrorCode::ValidationError,
        };

        ServiceError::new(code, err.to_string())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_mapping() {
        let err: ServiceError = CoreError::InsufficientStock {
            item_id: "itm-42".to_string(),
            requested: 5,
            available: 3,
        }
        .into();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert!(err.message.contains("itm-42"));

        let err: ServiceError = CoreError::Gateway {
            code: "card_declined".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::GatewayError);
    }

    #[test]
    fn test_serializes_with_code_and_message() {
        let err = ServiceError::not_found("Customer", "cust-9");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Customer not found: cust-9");
    }
}
