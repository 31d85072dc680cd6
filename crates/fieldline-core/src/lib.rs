//! # fieldline-core: Pure Business Logic for the Fieldline Checkout Core
//!
//! This crate is the **heart** of the Fieldline console. It contains the
//! cart, pricing, checkout flow, and tender state machine as pure logic
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Fieldline Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Console Screens (out of scope)                     │   │
//! │  │    Catalog UI ──► Cart UI ──► Checkout UI ──► Tender UI        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  fieldline-console (shell)                      │   │
//! │  │    session ownership, collaborator ports, async gateway         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ fieldline-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌────────┐ ┌────────┐ ┌─────────┐ ┌──────────┐ ┌─────────┐  │   │
//! │  │   │ money  │ │  cart  │ │ pricing │ │ checkout │ │ tender  │  │   │
//! │  │   │ Money  │ │  Cart  │ │ Totals  │ │   Flow   │ │ Machine │  │   │
//! │  │   └────────┘ └────────┘ └─────────┘ └──────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`types`] - Domain types (CatalogItem, TaxRate, TenderMethod, OrderCreated)
//! - [`error`] - Domain error types
//! - [`validation`] - Field-level validation rules
//! - [`cart`] - The cart store (lines, quantities, selected customer)
//! - [`pricing`] - Subtotal/tax/total derivation with an injected tax rate
//! - [`checkout`] - The checkout flow controller state machine
//! - [`tender`] - The tender (payment method) state machine
//! - [`validators`] - Per-method tender validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every transition is deterministic and synchronous
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64)
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use fieldline_core::money::Money;
//! use fieldline_core::types::TaxRate;
//!
//! // Create money from cents (never from floats!)
//! let price = Money::from_cents(20599); // $205.99
//!
//! // 8% sales tax, half-up rounding
//! let rate = TaxRate::from_bps(800);
//! let tax = price.calculate_tax(rate);
//! assert_eq!(tax.cents(), 1648); // $16.48
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod error;
pub mod money;
pub mod pricing;
pub mod tender;
pub mod types;
pub mod validation;
pub mod validators;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use fieldline_core::Money` instead of
// `use fieldline_core::money::Money`

pub use cart::{Cart, CartLine, CartSnapshot, CartTotals};
pub use checkout::{CheckoutEvent, CheckoutFlow, CheckoutSession, CheckoutState};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{PricingEngine, Totals};
pub use tender::{
    GatewayOutcome, GatewayRequest, TenderDetails, TenderEvent, TenderMachine, TenderReceipt,
    TenderSignal, TenderState,
};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default tax rate in basis points (800 = 8%).
///
/// The engine never reads this on its own: callers inject a [`types::TaxRate`]
/// into [`pricing::PricingEngine`], and this constant is the single place the
/// default value lives.
pub const DEFAULT_TAX_RATE_BPS: u32 = 800;

/// Maximum unique lines allowed in a single cart
///
/// ## Business Reason
/// Prevents runaway carts and ensures reasonable transaction sizes.
/// Can be made configurable per-company in future versions.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single line in the cart
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
/// A per-item stock limit, when present, applies on top of this cap.
pub const MAX_LINE_QUANTITY: i64 = 999;
