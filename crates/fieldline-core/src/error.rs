//! # Error Types
//!
//! Domain-specific error types for fieldline-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  fieldline-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - User-correctable input failures                │
//! │                                                                         │
//! │  fieldline-console errors (shell crate)                                │
//! │  └── ServiceError     - What screens see (serialized, coded)           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → Screens            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (item id, amounts, etc.)
//! 3. Errors are enum variants, never String
//! 4. Routing guards (empty cart, missing customer) are states in the
//!    checkout flow, NOT errors - see [`crate::checkout`]

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. None of them is fatal:
/// the worst outcome anywhere in the checkout core is a return to the
/// review screen with the cart intact.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The referenced line is not in the cart.
    #[error("Line not in cart: {0}")]
    LineNotInCart(String),

    /// A quantity change would exceed the item's stock limit.
    ///
    /// Raised by `set_quantity` when the caller asks for more than
    /// inventory allows, so the screen can distinguish "applied exactly"
    /// from "would have been clamped".
    #[error("Insufficient stock for {item_id}: available {available}, requested {requested}")]
    InsufficientStock {
        item_id: String,
        requested: i64,
        available: i64,
    },

    /// Cash tendered does not cover the amount due.
    #[error("Insufficient payment: due {due_cents} cents, tendered {tendered_cents} cents")]
    InsufficientPayment { due_cents: i64, tendered_cents: i64 },

    /// Cart has exceeded maximum allowed unique lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds the global maximum.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// The external payment gateway declined or failed the attempt.
    #[error("Payment gateway error: {code}")]
    Gateway { code: String },

    /// An event arrived that the current machine state cannot accept.
    ///
    /// Protocol misuse by the caller, e.g. submitting before a method is
    /// selected or starting a second attempt while one is in flight.
    #[error("Cannot apply {event} in state {state}")]
    InvalidTransition { state: String, event: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when collected input doesn't meet requirements. They are
/// recovered locally: surfaced as an inline message next to the field,
/// never changing controller state.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed routing number, invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// The payer has not granted authorization.
    ///
    /// Checked before any other ACH field so the operator sees one clear
    /// message instead of a list of field complaints.
    #[error("{field}: payment must be authorized before submitting")]
    AuthorizationRequired { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
