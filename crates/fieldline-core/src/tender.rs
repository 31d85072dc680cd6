//! # Tender State Machine
//!
//! Manages payment-method selection, per-method detail collection, and
//! completion for a single checkout session.
//!
//! ## Attempt Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Tender Attempt States                               │
//! │                                                                         │
//! │  MethodSelection ──SelectMethod──► DetailCollection ──Submit──┐         │
//! │        ▲                              ▲      ▲                │         │
//! │        │ SwitchMethod                 │      │ (validation    │         │
//! │        │ (fields discarded)     Retry │      │  error: stay)  ▼         │
//! │        │                              │      │          Validating      │
//! │  ┌───────────┐                  ┌──────────┐ │               │          │
//! │  │  Failed   │◄──Declined/Error─┤ gateway  │◄┘   Approved    │          │
//! │  │ (fields   │                  └──────────┘        │        │          │
//! │  │  kept)    │                                      ▼        │          │
//! │  └───────────┘                                 Completed ◄───┘          │
//! │                                                (terminal)   cash/tap    │
//! │                                                             settle here │
//! │  Cancel (any non-terminal state) ──► Cancelled (terminal)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Core Invariants
//! - One machine drives at most one non-terminal attempt at a time; a
//!   second `Submit` while the gateway is outstanding is rejected.
//! - Completion is idempotent: once `Completed`, every further event is a
//!   silent no-op. A late gateway approval arriving after `Cancel` is
//!   absorbed the same way and can never double-apply.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::TenderMethod;
use crate::validators;

// =============================================================================
// Collected Detail Fields
// =============================================================================

/// Fields collected for a cash payment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CashDetails {
    /// Amount the customer handed over, in cents.
    pub amount_tendered_cents: Option<i64>,
}

/// Fields keyed in for a manual card payment.
///
/// Opaque to this core: presence is checked here, everything deeper
/// (Luhn, expiry, AVS) is the gateway's concern.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CardDetails {
    pub card_number: String,
    pub expiry: String,
    pub cvc: String,
    pub name_on_card: String,
}

/// Fields collected for an ACH (check) payment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AchDetails {
    pub routing_number: String,
    pub account_number: String,
    pub name_on_check: String,
    pub zip_code: String,
    /// The payer's explicit authorization; checked before any other field.
    pub authorized: bool,
}

/// The collected fields for whichever method is active.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", tag = "method")]
pub enum TenderDetails {
    Cash(CashDetails),
    CardManual(CardDetails),
    Ach(AchDetails),
    /// Tap-to-pay collects nothing; the terminal interaction is opaque.
    TapToPay,
}

impl TenderDetails {
    /// An empty form for the given method.
    pub fn empty_for(method: TenderMethod) -> Self {
        match method {
            TenderMethod::Cash => TenderDetails::Cash(CashDetails::default()),
            TenderMethod::CardManual => TenderDetails::CardManual(CardDetails::default()),
            TenderMethod::Ach => TenderDetails::Ach(AchDetails::default()),
            TenderMethod::TapToPay => TenderDetails::TapToPay,
        }
    }

    /// The method these fields belong to.
    pub fn method(&self) -> TenderMethod {
        match self {
            TenderDetails::Cash(_) => TenderMethod::Cash,
            TenderDetails::CardManual(_) => TenderMethod::CardManual,
            TenderDetails::Ach(_) => TenderMethod::Ach,
            TenderDetails::TapToPay => TenderMethod::TapToPay,
        }
    }
}

// =============================================================================
// Gateway Boundary Types
// =============================================================================

/// What the shell passes to the external payment gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayRequest {
    pub method: TenderMethod,
    pub amount_due_cents: i64,
    pub details: TenderDetails,
}

/// What the external payment gateway reports back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum GatewayOutcome {
    Approved,
    Declined { code: String },
    Error { code: String },
}

// =============================================================================
// Receipt
// =============================================================================

/// The completion record handed back to the checkout flow.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TenderReceipt {
    pub method: TenderMethod,
    pub amount_due_cents: i64,
    /// For cash: change returned to the customer.
    pub change_cents: Option<i64>,
}

// =============================================================================
// States, Events, Signals
// =============================================================================

/// The tagged-union state of a tender attempt.
#[derive(Debug, Clone)]
pub enum TenderState {
    /// No method chosen yet.
    MethodSelection,
    /// Collecting the chosen method's fields.
    DetailCollection { details: TenderDetails },
    /// Local validation passed; the gateway call is outstanding.
    Validating { details: TenderDetails },
    /// Terminal: the payment settled.
    Completed { receipt: TenderReceipt },
    /// The gateway declined or errored; fields are kept for correction.
    Failed { details: TenderDetails, reason: String },
    /// Terminal: the operator backed out of payment collection.
    Cancelled,
}

impl TenderState {
    /// Short state name for errors and logging.
    pub fn name(&self) -> &'static str {
        match self {
            TenderState::MethodSelection => "MethodSelection",
            TenderState::DetailCollection { .. } => "DetailCollection",
            TenderState::Validating { .. } => "Validating",
            TenderState::Completed { .. } => "Completed",
            TenderState::Failed { .. } => "Failed",
            TenderState::Cancelled => "Cancelled",
        }
    }

    /// Whether the attempt can still change.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TenderState::Completed { .. } | TenderState::Cancelled
        )
    }
}

/// Everything that can happen to a tender attempt.
#[derive(Debug, Clone)]
pub enum TenderEvent {
    SelectMethod(TenderMethod),
    /// Replace the collected fields wholesale (form binding).
    UpdateDetails(TenderDetails),
    Submit,
    GatewayResolved(GatewayOutcome),
    /// Back to detail collection after a failure, fields preserved.
    Retry,
    /// Back to method selection, collected fields discarded.
    SwitchMethod,
    Cancel,
}

impl TenderEvent {
    fn name(&self) -> &'static str {
        match self {
            TenderEvent::SelectMethod(_) => "SelectMethod",
            TenderEvent::UpdateDetails(_) => "UpdateDetails",
            TenderEvent::Submit => "Submit",
            TenderEvent::GatewayResolved(_) => "GatewayResolved",
            TenderEvent::Retry => "Retry",
            TenderEvent::SwitchMethod => "SwitchMethod",
            TenderEvent::Cancel => "Cancel",
        }
    }
}

/// What the shell must do after a transition.
#[derive(Debug, Clone)]
pub enum TenderSignal {
    /// Nothing; the state moved (or an event was absorbed).
    None,
    /// Submit this request to the payment gateway and feed the outcome
    /// back via [`TenderEvent::GatewayResolved`].
    AwaitGateway(GatewayRequest),
    /// The payment settled; finalize the checkout with this receipt.
    Settled(TenderReceipt),
    /// The attempt was cancelled; return the flow to the review screen.
    Cancelled,
}

// =============================================================================
// Tender Machine
// =============================================================================

/// The tender state machine for one checkout session.
///
/// Created when the flow enters payment collection (with the frozen amount
/// due), dropped when the flow leaves it. All transitions go through
/// [`TenderMachine::apply`].
#[derive(Debug)]
pub struct TenderMachine {
    amount_due: Money,
    state: TenderState,
}

impl TenderMachine {
    /// Creates a machine for the given amount due, ready for method
    /// selection.
    pub fn new(amount_due: Money) -> Self {
        TenderMachine {
            amount_due,
            state: TenderState::MethodSelection,
        }
    }

    /// The frozen amount this attempt is collecting.
    #[inline]
    pub fn amount_due(&self) -> Money {
        self.amount_due
    }

    /// The current attempt state.
    #[inline]
    pub fn state(&self) -> &TenderState {
        &self.state
    }

    /// Applies one event and returns the signal the shell must act on.
    ///
    /// The single transition function: every state change goes through the
    /// match below, so the whole protocol is auditable in one place.
    pub fn apply(&mut self, event: TenderEvent) -> CoreResult<TenderSignal> {
        use TenderEvent as E;
        use TenderState as S;

        // Terminal states absorb every further event. This is the
        // idempotent-completion guard: a duplicate submit, or a late
        // gateway approval arriving after Cancel, lands here and does
        // nothing.
        if self.state.is_terminal() {
            return Ok(TenderSignal::None);
        }

        let state = std::mem::replace(&mut self.state, S::MethodSelection);
        match (state, event) {
            // Cancellation wins from any non-terminal state.
            (_, E::Cancel) => {
                self.state = S::Cancelled;
                Ok(TenderSignal::Cancelled)
            }

            // Choosing (or re-choosing) a method opens an empty form.
            // Re-choosing from DetailCollection or Failed discards
            // whatever was collected for the abandoned method.
            (S::MethodSelection, E::SelectMethod(method))
            | (S::DetailCollection { .. }, E::SelectMethod(method))
            | (S::Failed { .. }, E::SelectMethod(method)) => {
                self.state = S::DetailCollection {
                    details: TenderDetails::empty_for(method),
                };
                Ok(TenderSignal::None)
            }

            (S::DetailCollection { details }, E::UpdateDetails(new))
                if new.method() == details.method() =>
            {
                self.state = S::DetailCollection { details: new };
                Ok(TenderSignal::None)
            }

            (S::DetailCollection { details }, E::Submit) => {
                match validators::validate(&details, self.amount_due) {
                    Err(err) => {
                        // Validation failures are corrected in place: the
                        // attempt stays in DetailCollection, fields kept.
                        self.state = S::DetailCollection { details };
                        Err(err)
                    }
                    Ok(outputs) => {
                        let method = details.method();
                        if method.requires_gateway() {
                            let request = GatewayRequest {
                                method,
                                amount_due_cents: self.amount_due.cents(),
                                details: details.clone(),
                            };
                            self.state = S::Validating { details };
                            Ok(TenderSignal::AwaitGateway(request))
                        } else {
                            // Cash and tap-to-pay settle synchronously.
                            let receipt = TenderReceipt {
                                method,
                                amount_due_cents: self.amount_due.cents(),
                                change_cents: outputs.change_cents,
                            };
                            self.state = S::Completed {
                                receipt: receipt.clone(),
                            };
                            Ok(TenderSignal::Settled(receipt))
                        }
                    }
                }
            }

            (S::Validating { details }, E::GatewayResolved(outcome)) => match outcome {
                GatewayOutcome::Approved => {
                    let receipt = TenderReceipt {
                        method: details.method(),
                        amount_due_cents: self.amount_due.cents(),
                        change_cents: None,
                    };
                    self.state = S::Completed {
                        receipt: receipt.clone(),
                    };
                    Ok(TenderSignal::Settled(receipt))
                }
                GatewayOutcome::Declined { code } | GatewayOutcome::Error { code } => {
                    self.state = S::Failed {
                        details,
                        reason: code.clone(),
                    };
                    Err(CoreError::Gateway { code })
                }
            },

            // A gateway result in any other state is stale (the operator
            // already moved on); absorb it.
            (state, E::GatewayResolved(_)) => {
                self.state = state;
                Ok(TenderSignal::None)
            }

            (S::Failed { details, .. }, E::Retry) => {
                self.state = S::DetailCollection { details };
                Ok(TenderSignal::None)
            }

            (S::DetailCollection { .. }, E::SwitchMethod)
            | (S::Failed { .. }, E::SwitchMethod) => {
                self.state = S::MethodSelection;
                Ok(TenderSignal::None)
            }

            // Everything else is protocol misuse: submitting before a
            // method is chosen, a second Submit while the gateway call is
            // outstanding, retrying without a failure, and so on.
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
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    fn machine() -> TenderMachine {
        // The worked checkout example: $222.47 due
        TenderMachine::new(Money::from_cents(22247))
    }

    fn cash_details(cents: i64) -> TenderDetails {
        TenderDetails::Cash(CashDetails {
            amount_tendered_cents: Some(cents),
        })
    }

    fn ach_details() -> TenderDetails {
        TenderDetails::Ach(AchDetails {
            routing_number: "123456789".to_string(),
            account_number: "1".to_string(),
            name_on_check: "A".to_string(),
            zip_code: "00000".to_string(),
            authorized: true,
        })
    }

    #[test]
    fn test_cash_settles_with_change() {
        let mut m = machine();
        m.apply(TenderEvent::SelectMethod(TenderMethod::Cash)).unwrap();
        m.apply(TenderEvent::UpdateDetails(cash_details(25000))).unwrap();

        let signal = m.apply(TenderEvent::Submit).unwrap();
        match signal {
            TenderSignal::Settled(receipt) => {
                assert_eq!(receipt.method, TenderMethod::Cash);
                assert_eq!(receipt.amount_due_cents, 22247);
                assert_eq!(receipt.change_cents, Some(2753));
            }
            other => panic!("expected Settled, got {:?}", other),
        }
        assert!(m.state().is_terminal());
    }

    #[test]
    fn test_cash_insufficient_stays_in_detail_collection() {
        let mut m = machine();
        m.apply(TenderEvent::SelectMethod(TenderMethod::Cash)).unwrap();
        m.apply(TenderEvent::UpdateDetails(cash_details(10000))).unwrap();

        let err = m.apply(TenderEvent::Submit).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientPayment {
                due_cents: 22247,
                tendered_cents: 10000,
            }
        ));

        // Attempt remains in DetailCollection with the fields kept
        match m.state() {
            TenderState::DetailCollection {
                details: TenderDetails::Cash(cash),
            } => assert_eq!(cash.amount_tendered_cents, Some(10000)),
            other => panic!("expected DetailCollection, got {:?}", other),
        }
    }

    #[test]
    fn test_tap_to_pay_settles_immediately() {
        let mut m = machine();
        m.apply(TenderEvent::SelectMethod(TenderMethod::TapToPay)).unwrap();

        let signal = m.apply(TenderEvent::Submit).unwrap();
        assert!(matches!(signal, TenderSignal::Settled(_)));
        assert!(matches!(m.state(), TenderState::Completed { .. }));
    }

    #[test]
    fn test_card_awaits_gateway_then_settles() {
        let mut m = machine();
        m.apply(TenderEvent::SelectMethod(TenderMethod::CardManual)).unwrap();
        m.apply(TenderEvent::UpdateDetails(TenderDetails::CardManual(CardDetails {
            card_number: "4111111111111111".to_string(),
            expiry: "12/30".to_string(),
            cvc: "123".to_string(),
            name_on_card: "A. Smith".to_string(),
        })))
        .unwrap();

        let signal = m.apply(TenderEvent::Submit).unwrap();
        match signal {
            TenderSignal::AwaitGateway(request) => {
                assert_eq!(request.method, TenderMethod::CardManual);
                assert_eq!(request.amount_due_cents, 22247);
            }
            other => panic!("expected AwaitGateway, got {:?}", other),
        }
        assert!(matches!(m.state(), TenderState::Validating { .. }));

        let signal = m
            .apply(TenderEvent::GatewayResolved(GatewayOutcome::Approved))
            .unwrap();
        assert!(matches!(signal, TenderSignal::Settled(_)));
    }

    #[test]
    fn test_second_submit_while_gateway_outstanding_is_rejected() {
        let mut m = machine();
        m.apply(TenderEvent::SelectMethod(TenderMethod::Ach)).unwrap();
        m.apply(TenderEvent::UpdateDetails(ach_details())).unwrap();
        m.apply(TenderEvent::Submit).unwrap();

        let err = m.apply(TenderEvent::Submit).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));
        assert!(matches!(m.state(), TenderState::Validating { .. }));
    }

    #[test]
    fn test_gateway_decline_then_retry_keeps_fields() {
        let mut m = machine();
        m.apply(TenderEvent::SelectMethod(TenderMethod::Ach)).unwrap();
        m.apply(TenderEvent::UpdateDetails(ach_details())).unwrap();
        m.apply(TenderEvent::Submit).unwrap();

        let err = m
            .apply(TenderEvent::GatewayResolved(GatewayOutcome::Declined {
                code: "insufficient_funds".to_string(),
            }))
            .unwrap_err();
        assert!(matches!(err, CoreError::Gateway { .. }));
        assert!(matches!(m.state(), TenderState::Failed { .. }));

        m.apply(TenderEvent::Retry).unwrap();
        match m.state() {
            TenderState::DetailCollection {
                details: TenderDetails::Ach(ach),
            } => assert_eq!(ach.routing_number, "123456789"),
            other => panic!("expected DetailCollection, got {:?}", other),
        }
    }

    #[test]
    fn test_switch_method_discards_fields() {
        let mut m = machine();
        m.apply(TenderEvent::SelectMethod(TenderMethod::Ach)).unwrap();
        m.apply(TenderEvent::UpdateDetails(ach_details())).unwrap();

        m.apply(TenderEvent::SwitchMethod).unwrap();
        assert!(matches!(m.state(), TenderState::MethodSelection));

        // Coming back to ACH starts from an empty form
        m.apply(TenderEvent::SelectMethod(TenderMethod::Ach)).unwrap();
        match m.state() {
            TenderState::DetailCollection {
                details: TenderDetails::Ach(ach),
            } => {
                assert!(ach.routing_number.is_empty());
                assert!(!ach.authorized);
            }
            other => panic!("expected DetailCollection, got {:?}", other),
        }
    }

    #[test]
    fn test_completion_is_idempotent() {
        let mut m = machine();
        m.apply(TenderEvent::SelectMethod(TenderMethod::Cash)).unwrap();
        m.apply(TenderEvent::UpdateDetails(cash_details(25000))).unwrap();
        assert!(matches!(
            m.apply(TenderEvent::Submit).unwrap(),
            TenderSignal::Settled(_)
        ));

        // Every further event is absorbed without a second settlement
        assert!(matches!(
            m.apply(TenderEvent::Submit).unwrap(),
            TenderSignal::None
        ));
        assert!(matches!(
            m.apply(TenderEvent::GatewayResolved(GatewayOutcome::Approved))
                .unwrap(),
            TenderSignal::None
        ));
        assert!(matches!(m.state(), TenderState::Completed { .. }));
    }

    #[test]
    fn test_late_gateway_approval_after_cancel_is_absorbed() {
        let mut m = machine();
        m.apply(TenderEvent::SelectMethod(TenderMethod::CardManual)).unwrap();
        m.apply(TenderEvent::UpdateDetails(TenderDetails::CardManual(CardDetails {
            card_number: "4111111111111111".to_string(),
            expiry: "12/30".to_string(),
            cvc: "123".to_string(),
            name_on_card: "A. Smith".to_string(),
        })))
        .unwrap();
        m.apply(TenderEvent::Submit).unwrap();

        // Operator backs out while the gateway call is outstanding
        assert!(matches!(
            m.apply(TenderEvent::Cancel).unwrap(),
            TenderSignal::Cancelled
        ));

        // The underlying call still completes; the result must not apply
        assert!(matches!(
            m.apply(TenderEvent::GatewayResolved(GatewayOutcome::Approved))
                .unwrap(),
            TenderSignal::None
        ));
        assert!(matches!(m.state(), TenderState::Cancelled));
    }

    #[test]
    fn test_stale_gateway_result_after_switch_is_absorbed() {
        let mut m = machine();
        m.apply(TenderEvent::SelectMethod(TenderMethod::Ach)).unwrap();
        m.apply(TenderEvent::UpdateDetails(ach_details())).unwrap();
        m.apply(TenderEvent::Submit).unwrap();
        let _ = m.apply(TenderEvent::GatewayResolved(GatewayOutcome::Error {
            code: "timeout".to_string(),
        }));
        m.apply(TenderEvent::SwitchMethod).unwrap();

        // A duplicate resolution for the abandoned attempt arrives late
        assert!(matches!(
            m.apply(TenderEvent::GatewayResolved(GatewayOutcome::Approved))
                .unwrap(),
            TenderSignal::None
        ));
        assert!(matches!(m.state(), TenderState::MethodSelection));
    }

    #[test]
    fn test_submit_before_method_selection_is_rejected() {
        let mut m = machine();
        let err = m.apply(TenderEvent::Submit).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));
        assert!(matches!(m.state(), TenderState::MethodSelection));
    }

    #[test]
    fn test_validation_error_surfaces_field() {
        let mut m = machine();
        m.apply(TenderEvent::SelectMethod(TenderMethod::Cash)).unwrap();

        // No amount entered yet
        let err = m.apply(TenderEvent::Submit).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::Required { .. })
        ));
    }
}
