//! # Validation Module
//!
//! Field-level validation rules for the checkout core.
//!
//! These are the small, reusable checks the tender validators compose.
//! Each returns a typed [`ValidationError`] the screens can render inline
//! next to the offending field without leaving the current screen.

use crate::error::ValidationError;
use crate::MAX_LINE_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates that a free-text field is present.
///
/// ## Example
/// ```rust
/// use fieldline_core::validation::validate_required;
///
/// assert!(validate_required("nameOnCheck", "A. Smith").is_ok());
/// assert!(validate_required("nameOnCheck", "   ").is_err());
/// ```
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a bank routing number.
///
/// ## Rules
/// - Exactly 9 characters
/// - ASCII digits only
pub fn validate_routing_number(routing: &str) -> ValidationResult<()> {
    let routing = routing.trim();

    if routing.is_empty() {
        return Err(ValidationError::Required {
            field: "routingNumber".to_string(),
        });
    }

    if routing.len() != 9 || !routing.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "routingNumber".to_string(),
            reason: "must be exactly 9 digits".to_string(),
        });
    }

    Ok(())
}

/// Validates a customer or item identifier string.
///
/// ## Rules
/// - Must be a valid UUID v4 format
///
/// ## Example
/// ```rust
/// use fieldline_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a requested line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY (999)
///
/// A per-item stock limit, when present, is enforced by the cart itself;
/// this check only guards the global bound.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a unit price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (no-charge items)
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "unitPrice".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates an amount tendered in cents.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Whether it covers the amount due is the cash validator's concern
pub fn validate_tendered_amount(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amountTendered".to_string(),
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points.
///
/// ## Rules
/// - Must be between 0 and 10000 (0% to 100%)
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "taxRate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
