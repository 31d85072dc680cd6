//! # Checkout Flow Controller
//!
//! Drives the step sequence from browsing through payment completion.
//!
//! ## Flow States
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Checkout Flow States                               │
//! │                                                                         │
//! │             BeginCheckout (guards re-routed, never errors)              │
//! │  Browsing ────────► CustomerRequired ────────► ReviewSummary            │
//! │     ▲   (no items:   (items, no customer)          │                    │
//! │     │    stay here)                    ConfirmOrder│ snapshot taken     │
//! │     │                                              ▼                    │
//! │     │                                      CollectingPayment            │
//! │     │          TenderCancelled ◄───────────────────┤                    │
//! │     │          (back to ReviewSummary,             │ TenderSettled      │
//! │     │           cart + totals intact)              ▼                    │
//! │     │                                         Completed (terminal,      │
//! │     │                                         cart cleared,             │
//! │     │                                         OrderCreated emitted)     │
//! │     │                                                                   │
//! │     └── Abandon from any non-terminal state ──► Cancelled               │
//! │         (cart NOT cleared; checkout can resume from Browsing)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Guard violations (empty cart, missing customer) are routing decisions,
//! not errors: `BeginCheckout` lands on whichever of {add items, select
//! customer} is missing and the controller is never left in an invalid
//! state.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::cart::{Cart, CartSnapshot};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing::{PricingEngine, Totals};
use crate::tender::TenderReceipt;
use crate::types::OrderCreated;

// =============================================================================
// Checkout Session
// =============================================================================

/// The frozen context for one payment-collection episode.
///
/// Created at the instant the operator confirms the order: the cart
/// snapshot and computed totals are fixed here, so later cart mutation
/// (e.g. from a stray event) cannot change the amount being collected.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    /// Session identifier (UUID v4).
    pub id: String,

    /// Immutable copy of the cart at confirmation time.
    pub snapshot: CartSnapshot,

    /// Tax rate in effect when the totals were computed.
    pub tax_rate_bps: u32,

    /// Totals computed once, at snapshot time.
    pub totals: Totals,
}

impl CheckoutSession {
    /// The amount the tender machine must collect.
    #[inline]
    pub fn amount_due(&self) -> Money {
        self.totals.total()
    }
}

// =============================================================================
// States and Events
// =============================================================================

/// The tagged-union state of the checkout flow.
#[derive(Debug, Clone)]
pub enum CheckoutState {
    /// Default state; the operator is building the cart.
    Browsing,
    /// Cart has items but no customer is selected yet.
    CustomerRequired,
    /// Cart and customer are in place; totals are on screen.
    ReviewSummary,
    /// Payment collection is underway against the frozen session.
    CollectingPayment { session: CheckoutSession },
    /// Terminal: payment settled, order emitted, cart cleared.
    Completed { order: OrderCreated },
    /// Terminal for this pass; the cart survives and checkout can resume.
    Cancelled,
}

/// A fresh flow starts in `Browsing`.
impl Default for CheckoutState {
    fn default() -> Self {
        CheckoutState::Browsing
    }
}

impl CheckoutState {
    /// Short state name for errors and logging.
    pub fn name(&self) -> &'static str {
        match self {
            CheckoutState::Browsing => "Browsing",
            CheckoutState::CustomerRequired => "CustomerRequired",
            CheckoutState::ReviewSummary => "ReviewSummary",
            CheckoutState::CollectingPayment { .. } => "CollectingPayment",
            CheckoutState::Completed { .. } => "Completed",
            CheckoutState::Cancelled => "Cancelled",
        }
    }
}

/// Everything that can happen to the checkout flow.
#[derive(Debug, Clone)]
pub enum CheckoutEvent {
    /// Enter (or re-enter) checkout; guards route to the missing step.
    BeginCheckout,
    /// The explicit "collect payment" action on the review screen.
    ConfirmOrder,
    /// The tender machine settled; finalize the order.
    TenderSettled(TenderReceipt),
    /// The tender attempt was cancelled; back to review.
    TenderCancelled,
    /// Explicit abandonment from anywhere.
    Abandon,
}

impl CheckoutEvent {
    fn name(&self) -> &'static str {
        match self {
            CheckoutEvent::BeginCheckout => "BeginCheckout",
            CheckoutEvent::ConfirmOrder => "ConfirmOrder",
            CheckoutEvent::TenderSettled(_) => "TenderSettled",
            CheckoutEvent::TenderCancelled => "TenderCancelled",
            CheckoutEvent::Abandon => "Abandon",
        }
    }
}

// =============================================================================
// Checkout Flow
// =============================================================================

/// The checkout flow controller.
///
/// Owns no cart: the session object passes its cart in by reference on
/// every transition, keeping ownership in one place.
#[derive(Debug, Default)]
pub struct CheckoutFlow {
    state: CheckoutState,
}

impl CheckoutFlow {
    /// Creates a flow in `Browsing`.
    pub fn new() -> Self {
        CheckoutFlow {
            state: CheckoutState::Browsing,
        }
    }

    /// The current flow state.
    #[inline]
    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    /// The active payment session, when collection is underway.
    pub fn session(&self) -> Option<&CheckoutSession> {
        match &self.state {
            CheckoutState::CollectingPayment { session } => Some(session),
            _ => None,
        }
    }

    /// The finalized order, once completed.
    pub fn completed_order(&self) -> Option<&OrderCreated> {
        match &self.state {
            CheckoutState::Completed { order } => Some(order),
            _ => None,
        }
    }

    /// Applies one event and returns the `OrderCreated` event when (and
    /// only when) this transition finalized the checkout.
    ///
    /// The single transition function for the flow. Re-applying
    /// `TenderSettled` after completion returns `Ok(None)`: finalization
    /// is idempotent and emits exactly one order per session.
    pub fn apply(
        &mut self,
        event: CheckoutEvent,
        cart: &mut Cart,
        pricing: &PricingEngine,
    ) -> CoreResult<Option<OrderCreated>> {
        use CheckoutEvent as E;
        use CheckoutState as S;

        // Completed absorbs everything, including a duplicate settlement:
        // the order was already emitted and must not be emitted again.
        if matches!(self.state, S::Completed { .. }) {
            return Ok(None);
        }

        let state = std::mem::replace(&mut self.state, S::Browsing);
        match (state, event) {
            // Abandonment never clears the cart; the sale can resume later.
            (_, E::Abandon) => {
                self.state = S::Cancelled;
                Ok(None)
            }

            // Entering checkout routes on the two guards. Re-entry from
            // ReviewSummary re-evaluates them (the cart may have changed),
            // and entry from Cancelled resumes an abandoned checkout.
            (S::Browsing, E::BeginCheckout)
            | (S::CustomerRequired, E::BeginCheckout)
            | (S::ReviewSummary, E::BeginCheckout)
            | (S::Cancelled, E::BeginCheckout) => {
                self.state = Self::route(cart);
                Ok(None)
            }

            (S::ReviewSummary, E::ConfirmOrder) => match cart.snapshot() {
                // A guard broke since the review screen rendered (stray
                // mutation); route instead of failing.
                None => {
                    self.state = Self::route(cart);
                    Ok(None)
                }
                Some(snapshot) => {
                    let totals = pricing.snapshot_totals(&snapshot);
                    self.state = S::CollectingPayment {
                        session: CheckoutSession {
                            id: Uuid::new_v4().to_string(),
                            snapshot,
                            tax_rate_bps: pricing.tax_rate().bps(),
                            totals,
                        },
                    };
                    Ok(None)
                }
            },

            (S::CollectingPayment { session }, E::TenderSettled(receipt)) => {
                let order = Self::finalize(&session, &receipt);
                cart.clear();
                self.state = S::Completed {
                    order: order.clone(),
                };
                Ok(Some(order))
            }

            (S::CollectingPayment { .. }, E::TenderCancelled) => {
                // Cart and totals are untouched; the review screen shows
                // the same numbers and a different method can be chosen.
                self.state = S::ReviewSummary;
                Ok(None)
            }

            (state, event) => {
                let err = CoreError::InvalidTransition {
                    state: state.name().to_string(),
                    event: event.name().to_string(),
                };
                self.state = state;
                Err(err)
            }
        }
    }

    /// Evaluates the entry guards: both must hold to reach review.
    fn route(cart: &Cart) -> CheckoutState {
        if cart.is_empty() {
            CheckoutState::Browsing
        } else if cart.selected_customer_id.is_none() {
            CheckoutState::CustomerRequired
        } else {
            CheckoutState::ReviewSummary
        }
    }

    /// Builds the one `OrderCreated` event for a settled session.
    fn finalize(session: &CheckoutSession, receipt: &TenderReceipt) -> OrderCreated {
        OrderCreated {
            order_id: Uuid::new_v4().to_string(),
            lines: session.snapshot.order_lines(),
            customer_id: session.snapshot.customer_id.clone(),
            subtotal_cents: session.totals.subtotal_cents,
            tax_cents: session.totals.tax_cents,
            total_cents: session.totals.total_cents,
            method: receipt.method,
            change_cents: receipt.change_cents,
            created_at: Utc::now(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CatalogItem, TaxRate, TenderMethod};

    fn test_item(id: &str, price_cents: i64) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            sku: format!("SKU-{}", id),
            name: format!("Item {}", id),
            unit_price_cents: price_cents,
            image_ref: None,
        }
    }

    fn engine() -> PricingEngine {
        PricingEngine::new(TaxRate::from_bps(800))
    }

    /// Cart from the worked example: 2 × $80.00 + 1 × $45.99.
    fn loaded_cart() -> Cart {
        let mut cart = Cart::new();
        cart.add_item(&test_item("1", 8000), 2, None).unwrap();
        cart.add_item(&test_item("2", 4599), 1, None).unwrap();
        cart.select_customer("cust-1");
        cart
    }

    fn receipt() -> TenderReceipt {
        TenderReceipt {
            method: TenderMethod::Cash,
            amount_due_cents: 22247,
            change_cents: Some(2753),
        }
    }

    #[test]
    fn test_empty_cart_never_reaches_review() {
        let mut flow = CheckoutFlow::new();
        let mut cart = Cart::new();

        flow.apply(CheckoutEvent::BeginCheckout, &mut cart, &engine())
            .unwrap();
        assert!(matches!(flow.state(), CheckoutState::Browsing));

        // Even with a customer picked, no items means no review
        cart.select_customer("cust-1");
        flow.apply(CheckoutEvent::BeginCheckout, &mut cart, &engine())
            .unwrap();
        assert!(matches!(flow.state(), CheckoutState::Browsing));
    }

    #[test]
    fn test_missing_customer_routes_to_customer_required() {
        let mut flow = CheckoutFlow::new();
        let mut cart = Cart::new();
        cart.add_item(&test_item("1", 8000), 1, None).unwrap();

        flow.apply(CheckoutEvent::BeginCheckout, &mut cart, &engine())
            .unwrap();
        assert!(matches!(flow.state(), CheckoutState::CustomerRequired));

        cart.select_customer("cust-1");
        flow.apply(CheckoutEvent::BeginCheckout, &mut cart, &engine())
            .unwrap();
        assert!(matches!(flow.state(), CheckoutState::ReviewSummary));
    }

    #[test]
    fn test_confirm_freezes_snapshot_and_totals() {
        let mut flow = CheckoutFlow::new();
        let mut cart = loaded_cart();

        flow.apply(CheckoutEvent::BeginCheckout, &mut cart, &engine())
            .unwrap();
        flow.apply(CheckoutEvent::ConfirmOrder, &mut cart, &engine())
            .unwrap();

        let session = flow.session().expect("collecting payment");
        assert_eq!(session.totals.subtotal_cents, 20599);
        assert_eq!(session.totals.tax_cents, 1648);
        assert_eq!(session.totals.total_cents, 22247);
        assert_eq!(session.amount_due(), Money::from_cents(22247));

        // A stray cart mutation cannot change the amount being collected
        cart.set_quantity("1", 9).unwrap();
        let session = flow.session().unwrap();
        assert_eq!(session.totals.total_cents, 22247);
        assert_eq!(session.snapshot.lines[0].quantity, 2);
    }

    #[test]
    fn test_tender_cancel_returns_to_review_with_cart_intact() {
        let mut flow = CheckoutFlow::new();
        let mut cart = loaded_cart();
        flow.apply(CheckoutEvent::BeginCheckout, &mut cart, &engine())
            .unwrap();
        flow.apply(CheckoutEvent::ConfirmOrder, &mut cart, &engine())
            .unwrap();
        let before = engine().totals(&cart);

        flow.apply(CheckoutEvent::TenderCancelled, &mut cart, &engine())
            .unwrap();

        assert!(matches!(flow.state(), CheckoutState::ReviewSummary));
        assert_eq!(cart.line_count(), 2);
        assert_eq!(engine().totals(&cart), before);

        // Re-confirming yields the same frozen numbers for the retry
        flow.apply(CheckoutEvent::ConfirmOrder, &mut cart, &engine())
            .unwrap();
        assert_eq!(flow.session().unwrap().totals, before);
    }

    #[test]
    fn test_settlement_completes_clears_cart_and_emits_order() {
        let mut flow = CheckoutFlow::new();
        let mut cart = loaded_cart();
        flow.apply(CheckoutEvent::BeginCheckout, &mut cart, &engine())
            .unwrap();
        flow.apply(CheckoutEvent::ConfirmOrder, &mut cart, &engine())
            .unwrap();

        let order = flow
            .apply(
                CheckoutEvent::TenderSettled(receipt()),
                &mut cart,
                &engine(),
            )
            .unwrap()
            .expect("order emitted");

        assert!(matches!(flow.state(), CheckoutState::Completed { .. }));
        assert!(cart.is_empty());
        assert_eq!(order.customer_id, "cust-1");
        assert_eq!(order.lines.len(), 2);
        assert_eq!(order.total_cents, 22247);
        assert_eq!(order.method, TenderMethod::Cash);
        assert_eq!(order.change_cents, Some(2753));
    }

    #[test]
    fn test_duplicate_settlement_emits_exactly_one_order() {
        let mut flow = CheckoutFlow::new();
        let mut cart = loaded_cart();
        flow.apply(CheckoutEvent::BeginCheckout, &mut cart, &engine())
            .unwrap();
        flow.apply(CheckoutEvent::ConfirmOrder, &mut cart, &engine())
            .unwrap();

        let first = flow
            .apply(
                CheckoutEvent::TenderSettled(receipt()),
                &mut cart,
                &engine(),
            )
            .unwrap();
        assert!(first.is_some());

        // Rapid duplicate confirmation: silently absorbed
        let second = flow
            .apply(
                CheckoutEvent::TenderSettled(receipt()),
                &mut cart,
                &engine(),
            )
            .unwrap();
        assert!(second.is_none());
    }

    #[test]
    fn test_abandon_preserves_cart_and_allows_resume() {
        let mut flow = CheckoutFlow::new();
        let mut cart = loaded_cart();
        flow.apply(CheckoutEvent::BeginCheckout, &mut cart, &engine())
            .unwrap();

        flow.apply(CheckoutEvent::Abandon, &mut cart, &engine())
            .unwrap();
        assert!(matches!(flow.state(), CheckoutState::Cancelled));
        assert_eq!(cart.line_count(), 2);

        // Checkout resumes from where the cart left off
        flow.apply(CheckoutEvent::BeginCheckout, &mut cart, &engine())
            .unwrap();
        assert!(matches!(flow.state(), CheckoutState::ReviewSummary));
    }

    #[test]
    fn test_confirm_without_review_is_rejected() {
        let mut flow = CheckoutFlow::new();
        let mut cart = loaded_cart();

        let err = flow
            .apply(CheckoutEvent::ConfirmOrder, &mut cart, &engine())
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));
        assert!(matches!(flow.state(), CheckoutState::Browsing));
    }

    #[test]
    fn test_confirm_reroutes_if_guard_broke_after_review() {
        let mut flow = CheckoutFlow::new();
        let mut cart = loaded_cart();
        flow.apply(CheckoutEvent::BeginCheckout, &mut cart, &engine())
            .unwrap();

        // The cart empties while the review screen is up
        cart.clear();
        flow.apply(CheckoutEvent::ConfirmOrder, &mut cart, &engine())
            .unwrap();
        assert!(matches!(flow.state(), CheckoutState::Browsing));
    }
}
