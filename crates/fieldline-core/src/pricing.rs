//! # Pricing Engine
//!
//! Derives subtotal, tax, and total from cart contents.
//!
//! The tax rate is injected at construction and lives nowhere else: one
//! engine per checkout context, and contexts with different rates share
//! nothing but the code. All arithmetic is exact integer cents; the single
//! rounding step is the half-up tax rounding in [`Money::calculate_tax`].

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::{Cart, CartSnapshot, CartTotals};
use crate::money::Money;
use crate::types::TaxRate;
use crate::DEFAULT_TAX_RATE_BPS;

// =============================================================================
// Totals
// =============================================================================

/// The derived money amounts for a cart.
///
/// `subtotal = Σ(unit_price × quantity)`, `tax = round_half_up(subtotal × rate)`,
/// `total = subtotal + tax`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
}

impl Totals {
    /// Returns the subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    /// Returns the tax as Money.
    #[inline]
    pub fn tax(&self) -> Money {
        Money::from_cents(self.tax_cents)
    }

    /// Returns the grand total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Pricing Engine
// =============================================================================

/// Computes totals for carts and snapshots with one injected tax rate.
#[derive(Debug, Clone, Copy)]
pub struct PricingEngine {
    tax_rate: TaxRate,
}

impl PricingEngine {
    /// Creates an engine with the given tax rate.
    pub const fn new(tax_rate: TaxRate) -> Self {
        PricingEngine { tax_rate }
    }

    /// Returns the injected tax rate.
    #[inline]
    pub const fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    /// Computes totals over the live cart.
    pub fn totals(&self, cart: &Cart) -> Totals {
        self.totals_over(cart.lines.iter().map(|l| l.line_total_cents()))
    }

    /// Computes totals over a frozen snapshot.
    ///
    /// Called exactly once per checkout session, at the instant the
    /// snapshot is taken; the result is stored in the session and never
    /// recomputed.
    pub fn snapshot_totals(&self, snapshot: &CartSnapshot) -> Totals {
        self.totals_over(snapshot.lines.iter().map(|l| l.line_total_cents()))
    }

    /// Builds the cart summary handed back to screens.
    pub fn cart_totals(&self, cart: &Cart) -> CartTotals {
        let totals = self.totals(cart);
        CartTotals {
            line_count: cart.line_count(),
            total_quantity: cart.total_item_count(),
            subtotal_cents: totals.subtotal_cents,
            tax_cents: totals.tax_cents,
            total_cents: totals.total_cents,
        }
    }

    fn totals_over(&self, line_totals: impl Iterator<Item = i64>) -> Totals {
        let subtotal = Money::from_cents(line_totals.sum());
        let tax = subtotal.calculate_tax(self.tax_rate);
        let total = subtotal + tax;

        Totals {
            subtotal_cents: subtotal.cents(),
            tax_cents: tax.cents(),
            total_cents: total.cents(),
        }
    }
}

/// Default engine uses the console-wide default rate (8%).
impl Default for PricingEngine {
    fn default() -> Self {
        PricingEngine::new(TaxRate::from_bps(DEFAULT_TAX_RATE_BPS))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CatalogItem;

    fn test_item(id: &str, price_cents: i64) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            sku: format!("SKU-{}", id),
            name: format!("Item {}", id),
            unit_price_cents: price_cents,
            image_ref: None,
        }
    }

    #[test]
    fn test_empty_cart_totals() {
        let engine = PricingEngine::default();
        let totals = engine.totals(&Cart::new());

        assert_eq!(totals.subtotal_cents, 0);
        assert_eq!(totals.tax_cents, 0);
        assert_eq!(totals.total_cents, 0);
    }

    #[test]
    fn test_worked_example_at_eight_percent() {
        // 2 × $80.00 + 1 × $45.99 at 8%:
        // subtotal $205.99, tax $16.48, total $222.47
        let mut cart = Cart::new();
        cart.add_item(&test_item("1", 8000), 2, None).unwrap();
        cart.add_item(&test_item("2", 4599), 1, None).unwrap();

        let engine = PricingEngine::new(TaxRate::from_bps(800));
        let totals = engine.totals(&cart);

        assert_eq!(totals.subtotal_cents, 20599);
        assert_eq!(totals.tax_cents, 1648);
        assert_eq!(totals.total_cents, 22247);
    }

    #[test]
    fn test_total_is_subtotal_plus_tax_exactly() {
        let mut cart = Cart::new();
        cart.add_item(&test_item("1", 333), 3, None).unwrap();
        cart.add_item(&test_item("2", 1), 7, None).unwrap();

        let engine = PricingEngine::new(TaxRate::from_bps(825));
        let totals = engine.totals(&cart);

        assert_eq!(totals.subtotal_cents, 333 * 3 + 7);
        assert_eq!(
            totals.total_cents,
            totals.subtotal_cents + totals.tax_cents
        );
    }

    #[test]
    fn test_injected_rate_not_shared() {
        let mut cart = Cart::new();
        cart.add_item(&test_item("1", 10000), 1, None).unwrap();

        let at_zero = PricingEngine::new(TaxRate::zero()).totals(&cart);
        let at_ten = PricingEngine::new(TaxRate::from_bps(1000)).totals(&cart);

        assert_eq!(at_zero.tax_cents, 0);
        assert_eq!(at_ten.tax_cents, 1000);
    }

    #[test]
    fn test_snapshot_totals_match_cart_totals() {
        let mut cart = Cart::new();
        cart.add_item(&test_item("1", 8000), 2, None).unwrap();
        cart.select_customer("cust-1");

        let engine = PricingEngine::new(TaxRate::from_bps(800));
        let snapshot = cart.snapshot().unwrap();

        assert_eq!(engine.totals(&cart), engine.snapshot_totals(&snapshot));
    }

    #[test]
    fn test_cart_totals_view() {
        let mut cart = Cart::new();
        cart.add_item(&test_item("1", 8000), 2, None).unwrap();
        cart.add_item(&test_item("2", 4599), 1, None).unwrap();

        let view = PricingEngine::new(TaxRate::from_bps(800)).cart_totals(&cart);
        assert_eq!(view.line_count, 2);
        assert_eq!(view.total_quantity, 3);
        assert_eq!(view.total_cents, 22247);
    }
}
