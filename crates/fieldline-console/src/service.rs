//! # Console Service
//!
//! The operations screens invoke, in the order an operator works:
//! build the cart, pick the customer, review, collect payment.
//!
//! Every operation locks the session only for the synchronous core
//! transition inside it. The single exception to "everything is
//! synchronous" is [`Console::submit_tender`], which releases the lock,
//! awaits the payment gateway, and feeds the outcome back in.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use fieldline_core::cart::{CartLine, CartTotals};
use fieldline_core::checkout::{CheckoutEvent, CheckoutFlow};
use fieldline_core::pricing::{PricingEngine, Totals};
use fieldline_core::tender::{
    GatewayOutcome, TenderDetails, TenderEvent, TenderMachine, TenderReceipt, TenderSignal,
};
use fieldline_core::types::{CatalogItem, TenderMethod};

use crate::config::ConsoleConfig;
use crate::error::ServiceError;
use crate::ports::{CustomerDirectory, CustomerRecord, OrderSink, PaymentGateway, StockService};
use crate::state::{Session, SessionState};

// =============================================================================
// View Types
// =============================================================================

/// Cart response including lines and totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub totals: CartTotals,
}

/// Where the checkout flow stands after an operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutView {
    /// Flow state name: Browsing, CustomerRequired, ReviewSummary,
    /// CollectingPayment, Completed, Cancelled.
    pub stage: String,
    pub session_id: Option<String>,
    pub totals: Option<Totals>,
}

/// The result of a tender submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderView {
    /// Whether this submission settled the payment. False when the event
    /// was absorbed (e.g. a duplicate against a finished attempt).
    pub settled: bool,
    pub order_id: Option<String>,
    pub change_cents: Option<i64>,
}

impl TenderView {
    fn not_settled() -> Self {
        TenderView {
            settled: false,
            order_id: None,
            change_cents: None,
        }
    }
}

// =============================================================================
// Console
// =============================================================================

/// The console service: one live session plus the injected collaborators.
pub struct Console<D, S, G, O>
where
    D: CustomerDirectory,
    S: StockService,
    G: PaymentGateway,
    O: OrderSink,
{
    config: ConsoleConfig,
    pricing: PricingEngine,
    session: SessionState,
    directory: D,
    stock: S,
    gateway: G,
    orders: O,
}

impl<D, S, G, O> Console<D, S, G, O>
where
    D: CustomerDirectory,
    S: StockService,
    G: PaymentGateway,
    O: OrderSink,
{
    /// Creates a console with a fresh session.
    ///
    /// The pricing engine is built here, from the configured tax rate;
    /// nothing downstream ever sees a rate literal.
    pub fn new(config: ConsoleConfig, directory: D, stock: S, gateway: G, orders: O) -> Self {
        let pricing = PricingEngine::new(config.tax_rate());
        Console {
            config,
            pricing,
            session: SessionState::new(),
            directory,
            stock,
            gateway,
            orders,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    // -------------------------------------------------------------------------
    // Cart operations
    // -------------------------------------------------------------------------

    /// Gets the current cart contents and totals.
    pub fn cart(&self) -> CartView {
        debug!("cart view");
        self.session.with_session(|s| self.cart_view(s))
    }

    /// Total quantity across all lines, for the navigation badge.
    pub fn badge_count(&self) -> i64 {
        self.session.with_session(|s| s.cart.total_item_count())
    }

    /// Adds a catalog item to the cart.
    ///
    /// Resolves the item's sellable maximum through the stock service
    /// first; the cart clamps against it.
    pub fn add_to_cart(
        &self,
        item: &CatalogItem,
        quantity: Option<i64>,
    ) -> Result<CartView, ServiceError> {
        let quantity = quantity.unwrap_or(1);
        debug!(item_id = %item.id, quantity, "add_to_cart");

        let stock_limit = self.stock.stock_limit(&item.id);

        self.session.with_session_mut(|s| {
            s.cart.add_item(item, quantity, stock_limit)?;
            Ok(self.cart_view(s))
        })
    }

    /// Sets the quantity of a line in the cart.
    ///
    /// Requests above the stock limit are rejected with
    /// `INSUFFICIENT_STOCK` rather than silently clamped.
    pub fn set_quantity(&self, item_id: &str, quantity: i64) -> Result<CartView, ServiceError> {
        debug!(item_id = %item_id, quantity, "set_quantity");

        self.session.with_session_mut(|s| {
            s.cart.set_quantity(item_id, quantity)?;
            Ok(self.cart_view(s))
        })
    }

    /// Removes a line from the cart.
    pub fn remove_from_cart(&self, item_id: &str) -> Result<CartView, ServiceError> {
        debug!(item_id = %item_id, "remove_from_cart");

        self.session.with_session_mut(|s| {
            s.cart.remove_item(item_id)?;
            Ok(self.cart_view(s))
        })
    }

    /// Clears the cart (lines and selected customer).
    pub fn clear_cart(&self) -> CartView {
        debug!("clear_cart");

        self.session.with_session_mut(|s| {
            s.cart.clear();
            self.cart_view(s)
        })
    }

    /// Looks the customer up in the directory and attaches them to the
    /// sale.
    pub fn select_customer(&self, customer_id: &str) -> Result<CustomerRecord, ServiceError> {
        debug!(customer_id = %customer_id, "select_customer");

        let record = self
            .directory
            .lookup(customer_id)
            .ok_or_else(|| ServiceError::not_found("Customer", customer_id))?;

        self.session
            .with_session_mut(|s| s.cart.select_customer(record.id.clone()));
        Ok(record)
    }

    // -------------------------------------------------------------------------
    // Checkout flow operations
    // -------------------------------------------------------------------------

    /// Enters checkout; routes to whichever prerequisite is missing.
    pub fn begin_checkout(&self) -> Result<CheckoutView, ServiceError> {
        debug!("begin_checkout");

        self.session.with_session_mut(|s| {
            s.flow
                .apply(CheckoutEvent::BeginCheckout, &mut s.cart, &self.pricing)?;
            Ok(Self::checkout_view(&s.flow))
        })
    }

    /// The explicit "collect payment" action: freezes the snapshot and
    /// totals, and opens the tender attempt for the amount due.
    pub fn confirm_order(&self) -> Result<CheckoutView, ServiceError> {
        debug!("confirm_order");

        self.session.with_session_mut(|s| {
            if s.tender.is_some() {
                return Err(ServiceError::business(
                    "A tender attempt is already in progress",
                ));
            }

            s.flow
                .apply(CheckoutEvent::ConfirmOrder, &mut s.cart, &self.pricing)?;

            if let Some(checkout) = s.flow.session() {
                let amount_due = checkout.amount_due();
                let session_id = checkout.id.clone();
                s.tender = Some(TenderMachine::new(amount_due));
                info!(session_id = %session_id, total = %amount_due, "Payment collection started");
            }

            Ok(Self::checkout_view(&s.flow))
        })
    }

    /// Abandons the checkout. The cart survives; checkout can resume.
    pub fn abandon_checkout(&self) -> Result<CheckoutView, ServiceError> {
        debug!("abandon_checkout");

        self.session.with_session_mut(|s| {
            if let Some(machine) = s.tender.as_mut() {
                let _ = machine.apply(TenderEvent::Cancel);
            }
            s.tender = None;
            s.flow
                .apply(CheckoutEvent::Abandon, &mut s.cart, &self.pricing)?;
            info!("Checkout abandoned; cart preserved");
            Ok(Self::checkout_view(&s.flow))
        })
    }

    // -------------------------------------------------------------------------
    // Tender operations
    // -------------------------------------------------------------------------

    /// Chooses (or switches to) a payment method.
    pub fn select_tender(&self, method: TenderMethod) -> Result<(), ServiceError> {
        debug!(?method, "select_tender");

        self.session.with_session_mut(|s| {
            let machine = s.tender.as_mut().ok_or_else(Self::no_active_tender)?;
            machine.apply(TenderEvent::SelectMethod(method))?;
            Ok(())
        })
    }

    /// Replaces the collected fields for the active method (form binding).
    pub fn update_tender_details(&self, details: TenderDetails) -> Result<(), ServiceError> {
        debug!(method = ?details.method(), "update_tender_details");

        self.session.with_session_mut(|s| {
            let machine = s.tender.as_mut().ok_or_else(Self::no_active_tender)?;
            machine.apply(TenderEvent::UpdateDetails(details))?;
            Ok(())
        })
    }

    /// Submits the active tender attempt.
    ///
    /// Cash and tap-to-pay settle inline. Card and ACH submit to the
    /// gateway; the session lock is released for the await and the
    /// outcome is fed back through the machine, which absorbs anything
    /// stale.
    pub async fn submit_tender(&self) -> Result<TenderView, ServiceError> {
        debug!("submit_tender");

        let signal = self.session.with_session_mut(|s| {
            let machine = s.tender.as_mut().ok_or_else(Self::no_active_tender)?;
            machine
                .apply(TenderEvent::Submit)
                .map_err(ServiceError::from)
        })?;

        match signal {
            TenderSignal::Settled(receipt) => self.finalize(receipt),
            TenderSignal::AwaitGateway(request) => {
                // The one suspension point. No lock is held here: the
                // session stays responsive while the call is outstanding.
                let outcome = self.gateway.submit(&request).await;
                self.resolve_gateway(outcome)
            }
            _ => Ok(TenderView::not_settled()),
        }
    }

    /// Returns a failed attempt to detail collection, fields preserved.
    pub fn retry_tender(&self) -> Result<(), ServiceError> {
        debug!("retry_tender");

        self.session.with_session_mut(|s| {
            let machine = s.tender.as_mut().ok_or_else(Self::no_active_tender)?;
            machine.apply(TenderEvent::Retry)?;
            Ok(())
        })
    }

    /// Abandons the current method's fields and returns to selection.
    pub fn switch_tender_method(&self) -> Result<(), ServiceError> {
        debug!("switch_tender_method");

        self.session.with_session_mut(|s| {
            let machine = s.tender.as_mut().ok_or_else(Self::no_active_tender)?;
            machine.apply(TenderEvent::SwitchMethod)?;
            Ok(())
        })
    }

    /// Cancels payment collection and returns the flow to review.
    ///
    /// Cart and totals are untouched; a different method can be chosen.
    pub fn cancel_tender(&self) -> Result<CheckoutView, ServiceError> {
        debug!("cancel_tender");

        self.session.with_session_mut(|s| {
            if let Some(machine) = s.tender.as_mut() {
                let _ = machine.apply(TenderEvent::Cancel);
            }
            s.tender = None;

            if s.flow.session().is_some() {
                s.flow
                    .apply(CheckoutEvent::TenderCancelled, &mut s.cart, &self.pricing)?;
            }
            Ok(Self::checkout_view(&s.flow))
        })
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    /// Feeds a gateway outcome back into the machine.
    fn resolve_gateway(&self, outcome: GatewayOutcome) -> Result<TenderView, ServiceError> {
        let signal = self.session.with_session_mut(|s| match s.tender.as_mut() {
            // The attempt was cancelled while the call was outstanding;
            // the late result must not apply.
            None => {
                debug!("late gateway result with no active attempt; ignored");
                Ok(TenderSignal::None)
            }
            Some(machine) => machine
                .apply(TenderEvent::GatewayResolved(outcome))
                .map_err(ServiceError::from),
        })?;

        match signal {
            TenderSignal::Settled(receipt) => self.finalize(receipt),
            _ => Ok(TenderView::not_settled()),
        }
    }

    /// Finalizes a settled attempt: exactly one order leaves through the
    /// sink per checkout session.
    fn finalize(&self, receipt: TenderReceipt) -> Result<TenderView, ServiceError> {
        let change_cents = receipt.change_cents;

        let order = self.session.with_session_mut(|s| {
            let emitted =
                s.flow
                    .apply(CheckoutEvent::TenderSettled(receipt), &mut s.cart, &self.pricing)?;
            s.tender = None;
            Ok::<_, ServiceError>(emitted)
        })?;

        match order {
            Some(order) => {
                self.orders.record(&order);
                info!(
                    order_id = %order.order_id,
                    total = order.total_cents,
                    method = ?order.method,
                    "Order created"
                );
                Ok(TenderView {
                    settled: true,
                    order_id: Some(order.order_id),
                    change_cents,
                })
            }
            None => {
                // The flow already finalized this session; the duplicate
                // is suppressed and nothing is re-emitted.
                debug!("duplicate settlement suppressed");
                Ok(TenderView::not_settled())
            }
        }
    }

    fn cart_view(&self, session: &Session) -> CartView {
        CartView {
            lines: session.cart.lines.clone(),
            totals: self.pricing.cart_totals(&session.cart),
        }
    }

    fn checkout_view(flow: &CheckoutFlow) -> CheckoutView {
        let (session_id, totals) = match flow.session() {
            Some(checkout) => (Some(checkout.id.clone()), Some(checkout.totals)),
            None => (None, None),
        };

        CheckoutView {
            stage: flow.state().name().to_string(),
            session_id,
            totals,
        }
    }

    fn no_active_tender() -> ServiceError {
        ServiceError::business("No active tender attempt")
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
