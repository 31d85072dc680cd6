//! # Cart Store
//!
//! The in-memory shopping cart: line items, quantities, and the selected
//! customer.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cart Operations                                   │
//! │                                                                         │
//! │  Screen Action            Operation               Cart Change           │
//! │  ─────────────            ─────────               ───────────           │
//! │                                                                         │
//! │  Tap catalog item ───────► add_item() ──────────► merge or insert line │
//! │                                                                         │
//! │  Change quantity ────────► set_quantity() ──────► line.quantity = n    │
//! │                                                                         │
//! │  Tap remove ─────────────► remove_item() ───────► line removed         │
//! │                                                                         │
//! │  Pick customer ──────────► select_customer() ───► customer id stored   │
//! │                                                                         │
//! │  Complete / cancel sale ─► clear() ─────────────► lines emptied        │
//! │                                                                         │
//! │  Nav badge ──────────────► total_item_count() ──► (read only)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Lines are unique by `item_id`; insertion order is preserved
//! - `1 <= quantity <= stock_limit` whenever a stock limit is present
//! - `quantity <= MAX_LINE_QUANTITY` always; at most `MAX_CART_LINES` lines
//! - A line is never created or left with quantity 0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::{CatalogItem, OrderLine};
use crate::validation::validate_price_cents;
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY};

// =============================================================================
// Cart Line
// =============================================================================

/// A line item in the cart.
///
/// ## Design Notes
/// - `sku`, `name`, and `unit_price_cents` are frozen copies taken when the
///   item was added, so a catalog edit mid-sale cannot change what the
///   customer is charged.
/// - `stock_limit` is the sellable maximum resolved from inventory at add
///   time; `None` means the item is not inventory-tracked.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Catalog item ID (UUID)
    pub item_id: String,

    /// SKU at time of adding (frozen)
    pub sku: String,

    /// Item name at time of adding (frozen)
    pub name: String,

    /// Price in cents at time of adding (frozen)
    pub unit_price_cents: i64,

    /// Sellable maximum from inventory; None when not tracked
    pub stock_limit: Option<i64>,

    /// Optional image reference for the cart display
    pub image_ref: Option<String>,

    /// Quantity in cart
    pub quantity: i64,

    /// When this line was added to the cart
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// Creates a new cart line from a catalog item and quantity.
    ///
    /// The caller is responsible for clamping `quantity` first; see
    /// [`Cart::add_item`].
    pub fn from_item(item: &CatalogItem, quantity: i64, stock_limit: Option<i64>) -> Self {
        CartLine {
            item_id: item.id.clone(),
            sku: item.sku.clone(),
            name: item.name.clone(),
            unit_price_cents: item.unit_price_cents,
            stock_limit,
            image_ref: item.image_ref.clone(),
            quantity,
            added_at: Utc::now(),
        }
    }

    /// Calculates the line total (unit price × quantity).
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents * self.quantity
    }

    /// The largest quantity this line may hold: the stock limit when
    /// present, capped by the global maximum.
    fn max_quantity(&self) -> i64 {
        self.stock_limit
            .map_or(MAX_LINE_QUANTITY, |limit| limit.min(MAX_LINE_QUANTITY))
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// Created empty when a console session begins, mutated only by the
/// explicit operations below, and cleared on checkout completion or an
/// explicit clear. Checkout cancellation leaves it untouched.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Lines in the cart, in insertion order, unique by item id
    pub lines: Vec<CartLine>,

    /// The customer this sale is for, once one has been picked
    pub selected_customer_id: Option<String>,

    /// When the cart was created/last cleared
    pub created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            selected_customer_id: None,
            created_at: Utc::now(),
        }
    }

    /// Adds a catalog item to the cart or increases quantity if already
    /// present.
    ///
    /// ## Behavior
    /// - Existing line: quantity becomes `clamp(existing + qty, 1, max)`
    /// - New line: quantity becomes `clamp(qty, 1, max)`
    /// - `max` is the stock limit (when present) capped by the global
    ///   maximum, so a line can never exceed either bound
    ///
    /// Clamping is silent here: tapping "+" past the stock limit pins the
    /// quantity at the limit. [`Cart::set_quantity`] is the operation that
    /// reports the overrun instead.
    pub fn add_item(
        &mut self,
        item: &CatalogItem,
        qty: i64,
        stock_limit: Option<i64>,
    ) -> CoreResult<()> {
        validate_price_cents(item.unit_price_cents)?;

        // A limit below 1 means the item cannot be sold at all; there is
        // no quantity to clamp to.
        if let Some(limit) = stock_limit {
            if limit < 1 {
                return Err(CoreError::InsufficientStock {
                    item_id: item.id.clone(),
                    requested: qty.max(1),
                    available: limit.max(0),
                });
            }
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.item_id == item.id) {
            // Refresh the limit: the inventory lookup at add time is newer
            // than whatever the line was created with.
            line.stock_limit = stock_limit;
            line.quantity = (line.quantity + qty).clamp(1, line.max_quantity());
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }

        let mut line = CartLine::from_item(item, 1, stock_limit);
        line.quantity = qty.clamp(1, line.max_quantity());
        self.lines.push(line);
        Ok(())
    }

    /// Sets the quantity of a line already in the cart.
    ///
    /// ## Behavior
    /// - Above the stock limit: rejected with `InsufficientStock`, line
    ///   unchanged (reject-and-report, so the screen can tell "applied
    ///   exactly" from "would have been clamped")
    /// - Above the global maximum: rejected with `QuantityTooLarge`
    /// - Below 1: clamped to 1 (a line never holds quantity 0)
    pub fn set_quantity(&mut self, item_id: &str, qty: i64) -> CoreResult<()> {
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.item_id == item_id)
            .ok_or_else(|| CoreError::LineNotInCart(item_id.to_string()))?;

        if qty > MAX_LINE_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: qty,
                max: MAX_LINE_QUANTITY,
            });
        }

        if let Some(limit) = line.stock_limit {
            if qty > limit {
                return Err(CoreError::InsufficientStock {
                    item_id: item_id.to_string(),
                    requested: qty,
                    available: limit,
                });
            }
        }

        line.quantity = qty.max(1);
        Ok(())
    }

    /// Removes a line from the cart by item ID.
    pub fn remove_item(&mut self, item_id: &str) -> CoreResult<()> {
        let initial_len = self.lines.len();
        self.lines.retain(|l| l.item_id != item_id);

        if self.lines.len() == initial_len {
            Err(CoreError::LineNotInCart(item_id.to_string()))
        } else {
            Ok(())
        }
    }

    /// Records the customer this sale is for.
    pub fn select_customer(&mut self, customer_id: impl Into<String>) {
        self.selected_customer_id = Some(customer_id.into());
    }

    /// Clears all lines and the selected customer.
    ///
    /// The next transaction starts from a clean slate.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.selected_customer_id = None;
        self.created_at = Utc::now();
    }

    /// Returns the number of unique lines in the cart.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the total quantity across all lines.
    ///
    /// Polled by navigation chrome for the cart-count badge; there is no
    /// contract beyond this integer.
    pub fn total_item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Takes an immutable copy of the cart contents for a checkout session.
    ///
    /// Returns `None` unless the cart has lines and a selected customer,
    /// the same guards the checkout flow routes on.
    pub fn snapshot(&self) -> Option<CartSnapshot> {
        let customer_id = self.selected_customer_id.clone()?;
        if self.lines.is_empty() {
            return None;
        }

        Some(CartSnapshot {
            lines: self.lines.clone(),
            customer_id,
            taken_at: Utc::now(),
        })
    }
}

// =============================================================================
// Cart Snapshot
// =============================================================================

/// An immutable copy of cart contents taken when payment collection begins.
///
/// Freezes the pricing inputs for the rest of the checkout session: a stray
/// cart mutation after this point cannot change the amount being collected.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    pub lines: Vec<CartLine>,
    pub customer_id: String,
    #[ts(as = "String")]
    pub taken_at: DateTime<Utc>,
}

impl CartSnapshot {
    /// Converts the frozen lines into order lines for the
    /// [`crate::types::OrderCreated`] event.
    pub fn order_lines(&self) -> Vec<OrderLine> {
        self.lines
            .iter()
            .map(|l| OrderLine {
                item_id: l.item_id.clone(),
                quantity: l.quantity,
                unit_price_cents: l.unit_price_cents,
            })
            .collect()
    }
}

// =============================================================================
// Cart Totals View
// =============================================================================

/// Cart summary for screen responses.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub line_count: usize,
    pub total_quantity: i64,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
