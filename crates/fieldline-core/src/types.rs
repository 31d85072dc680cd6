//! # Domain Types
//!
//! Core domain types used throughout the Fieldline checkout core.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  CatalogItem    │   │  OrderCreated   │   │   OrderLine     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  order_id       │   │  item_id        │       │
//! │  │  sku (business) │   │  customer_id    │   │  quantity       │       │
//! │  │  name           │   │  totals, method │   │  unit_price     │       │
//! │  │  unit_price     │   │  change?        │   │                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │    TaxRate      │   │  TenderMethod   │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  bps (u32)      │   │  Cash           │                             │
//! │  │  800 = 8%       │   │  CardManual     │                             │
//! │  └─────────────────┘   │  Ach, TapToPay  │                             │
//! │                        └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 800 bps = 8% (the console default; see [`crate::DEFAULT_TAX_RATE_BPS`])
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Catalog Item
// =============================================================================

/// An item offered for sale, as handed to the cart by the catalog screens.
///
/// Stock limits are deliberately NOT part of this type: availability is
/// resolved through the inventory collaborator when the item is added to
/// the cart, so a stale catalog row can never oversell.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Display name shown in the cart and on the order.
    pub name: String,

    /// Unit price in cents (smallest currency unit). Never negative.
    pub unit_price_cents: i64,

    /// Optional reference to a product image for the cart display.
    pub image_ref: Option<String>,
}

impl CatalogItem {
    /// Returns the unit price as a Money type.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }
}

// =============================================================================
// Tender Method
// =============================================================================

/// The payment instrument chosen for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TenderMethod {
    /// Physical cash payment; change is computed locally.
    Cash,
    /// Card details keyed in by the operator.
    CardManual,
    /// Bank transfer authorized by a signed check.
    Ach,
    /// Contactless card or wallet tap on the terminal.
    TapToPay,
}

impl TenderMethod {
    /// Whether completion of this method goes through the external
    /// payment gateway (the one asynchronous step per attempt).
    ///
    /// Cash settles at the drawer; tap-to-pay settles in the same
    /// synchronous terminal interaction that captured it.
    #[inline]
    pub const fn requires_gateway(&self) -> bool {
        matches!(self, TenderMethod::CardManual | TenderMethod::Ach)
    }
}

// =============================================================================
// Order Created Event
// =============================================================================

/// One line of a finalized order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub item_id: String,
    pub quantity: i64,
    /// Unit price in cents at the time the cart line was created (frozen).
    pub unit_price_cents: i64,
}

/// The event emitted exactly once when a checkout completes.
///
/// Downstream collaborators react to it: order/invoice persistence records
/// it, inventory decrements stock. This core only produces it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreated {
    pub order_id: String,
    pub lines: Vec<OrderLine>,
    pub customer_id: String,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub method: TenderMethod,
    /// For cash: change returned to the customer.
    pub change_cents: Option<i64>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl OrderCreated {
    /// Returns the grand total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(800);
        assert_eq!(rate.bps(), 800);
        assert!((rate.percentage() - 8.0).abs() < 0.001);
    }

    #[test]
    fn test_tax_rate_from_percentage() {
        let rate = TaxRate::from_percentage(8.0);
        assert_eq!(rate.bps(), 800);
    }

    #[test]
    fn test_requires_gateway() {
        assert!(!TenderMethod::Cash.requires_gateway());
        assert!(!TenderMethod::TapToPay.requires_gateway());
        assert!(TenderMethod::CardManual.requires_gateway());
        assert!(TenderMethod::Ach.requires_gateway());
    }
}
