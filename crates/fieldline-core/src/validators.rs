//! # Tender Validators
//!
//! Per-method validation rules, invoked by the tender machine during
//! `Submit`.
//!
//! Each rule either passes (possibly computing an output, like change due
//! for cash) or returns the typed error the screen renders inline. No rule
//! here performs I/O; anything that needs the outside world (card networks,
//! bank verification) is the gateway's job after these pass.

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::tender::{AchDetails, CardDetails, CashDetails, TenderDetails};
use crate::validation::{validate_required, validate_routing_number, validate_tendered_amount};

/// Outputs computed during validation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TenderOutputs {
    /// For cash: change owed back to the customer.
    pub change_cents: Option<i64>,
}

/// Dispatches to the rule set for the active method.
pub fn validate(details: &TenderDetails, amount_due: Money) -> CoreResult<TenderOutputs> {
    match details {
        TenderDetails::Cash(cash) => validate_cash(cash, amount_due),
        TenderDetails::CardManual(card) => {
            validate_card_manual(card)?;
            Ok(TenderOutputs::default())
        }
        TenderDetails::Ach(ach) => {
            validate_ach(ach)?;
            Ok(TenderOutputs::default())
        }
        // Tap-to-pay has nothing to check; the terminal interaction
        // already captured everything.
        TenderDetails::TapToPay => Ok(TenderOutputs::default()),
    }
}

/// Cash: the tendered amount must be present, positive, and cover the
/// amount due. Change is computed only when it does.
fn validate_cash(cash: &CashDetails, amount_due: Money) -> CoreResult<TenderOutputs> {
    let tendered_cents = cash.amount_tendered_cents.ok_or(ValidationError::Required {
        field: "amountTendered".to_string(),
    })?;
    validate_tendered_amount(tendered_cents)?;

    let tendered = Money::from_cents(tendered_cents);
    match tendered.change_against(amount_due) {
        Some(change) => Ok(TenderOutputs {
            change_cents: Some(change.cents()),
        }),
        None => Err(CoreError::InsufficientPayment {
            due_cents: amount_due.cents(),
            tendered_cents,
        }),
    }
}

/// Manual card entry: every field present. Deep card validation is
/// delegated to the gateway.
fn validate_card_manual(card: &CardDetails) -> CoreResult<()> {
    validate_required("cardNumber", &card.card_number)?;
    validate_required("expiry", &card.expiry)?;
    validate_required("cvc", &card.cvc)?;
    validate_required("nameOnCard", &card.name_on_card)?;
    Ok(())
}

/// ACH: authorization first (one clear message), then the routing number
/// format, then the remaining fields.
fn validate_ach(ach: &AchDetails) -> CoreResult<()> {
    if !ach.authorized {
        return Err(ValidationError::AuthorizationRequired {
            field: "authorized".to_string(),
        }
        .into());
    }

    validate_routing_number(&ach.routing_number)?;
    validate_required("accountNumber", &ach.account_number)?;
    validate_required("nameOnCheck", &ach.name_on_check)?;
    validate_required("zipCode", &ach.zip_code)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn due() -> Money {
        Money::from_cents(22247) // $222.47
    }

    #[test]
    fn test_cash_exact_and_over() {
        let outputs = validate(
            &TenderDetails::Cash(CashDetails {
                amount_tendered_cents: Some(25000),
            }),
            due(),
        )
        .unwrap();
        assert_eq!(outputs.change_cents, Some(2753));

        let exact = validate(
            &TenderDetails::Cash(CashDetails {
                amount_tendered_cents: Some(22247),
            }),
            due(),
        )
        .unwrap();
        assert_eq!(exact.change_cents, Some(0));
    }

    #[test]
    fn test_cash_insufficient() {
        let err = validate(
            &TenderDetails::Cash(CashDetails {
                amount_tendered_cents: Some(10000),
            }),
            due(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientPayment {
                due_cents: 22247,
                tendered_cents: 10000,
            }
        ));
    }

    #[test]
    fn test_cash_missing_or_nonpositive() {
        let missing = validate(&TenderDetails::Cash(CashDetails::default()), due());
        assert!(matches!(
            missing,
            Err(CoreError::Validation(ValidationError::Required { .. }))
        ));

        let zero = validate(
            &TenderDetails::Cash(CashDetails {
                amount_tendered_cents: Some(0),
            }),
            due(),
        );
        assert!(matches!(
            zero,
            Err(CoreError::Validation(ValidationError::MustBePositive { .. }))
        ));
    }

    #[test]
    fn test_card_requires_every_field() {
        let mut card = CardDetails {
            card_number: "4111111111111111".to_string(),
            expiry: "12/30".to_string(),
            cvc: "123".to_string(),
            name_on_card: "A. Smith".to_string(),
        };
        assert!(validate(&TenderDetails::CardManual(card.clone()), due()).is_ok());

        card.cvc = String::new();
        let err = validate(&TenderDetails::CardManual(card), due()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_ach_authorization_checked_first() {
        // Every other field is wrong too; authorization must win
        let ach = AchDetails {
            routing_number: "12345".to_string(),
            account_number: String::new(),
            name_on_check: String::new(),
            zip_code: String::new(),
            authorized: false,
        };
        let err = validate(&TenderDetails::Ach(ach), due()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::AuthorizationRequired { .. })
        ));
    }

    #[test]
    fn test_ach_routing_number_must_be_nine_digits() {
        let ach = AchDetails {
            routing_number: "12345".to_string(),
            account_number: "1".to_string(),
            name_on_check: "A".to_string(),
            zip_code: "00000".to_string(),
            authorized: true,
        };
        let err = validate(&TenderDetails::Ach(ach), due()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_ach_happy_path() {
        let ach = AchDetails {
            routing_number: "123456789".to_string(),
            account_number: "1".to_string(),
            name_on_check: "A".to_string(),
            zip_code: "00000".to_string(),
            authorized: true,
        };
        assert!(validate(&TenderDetails::Ach(ach), due()).is_ok());
    }

    #[test]
    fn test_tap_to_pay_always_passes() {
        assert!(validate(&TenderDetails::TapToPay, due()).is_ok());
    }
}
