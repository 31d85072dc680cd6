//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In binary floating point:                                              │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A checkout that sums line totals as floats will eventually collect    │
//! │  a cent more or less than the receipt shows.                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Every amount is an i64 count of the smallest currency unit.         │
//! │    Rounding happens exactly once, in tax calculation, and is explicit. │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use fieldline_core::money::Money;
//!
//! // Create from cents (preferred)
//! let price = Money::from_cents(8000); // $80.00
//!
//! // Arithmetic operations
//! let line = price * 2;                        // $160.00
//! let total = line + Money::from_cents(4599);  // $205.99
//!
//! // NEVER do this:
//! // let bad = Money::from_float(80.00); // NO SUCH METHOD EXISTS!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents for USD).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for refunds and adjustments
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// Every amount in the checkout core flows through this type: unit prices,
/// line totals, the collected amount due, tendered cash, and change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use fieldline_core::money::Money;
    ///
    /// let price = Money::from_cents(4599); // Represents $45.99
    /// assert_eq!(price.cents(), 4599);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (dollars and cents).
    ///
    /// For negative amounts, only the major unit should be negative:
    /// `from_major_minor(-5, 50)` = -$5.50, not -$4.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Calculates tax using half-up rounding to whole cents.
    ///
    /// ## Implementation
    /// Integer math only: `(amount_cents * bps + 5000) / 10000`.
    /// The `+5000` term rounds the half case up (5000/10000 = 0.5), which is
    /// the standard retail rounding rule for a tax line.
    ///
    /// ## Example
    /// ```rust
    /// use fieldline_core::money::Money;
    /// use fieldline_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_cents(20599); // $205.99
    /// let rate = TaxRate::from_bps(800);       // 8%
    ///
    /// let tax = subtotal.calculate_tax(rate);
    /// // $205.99 × 8% = $16.4792 → rounds to $16.48
    /// assert_eq!(tax.cents(), 1648);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        // i128 intermediate prevents overflow on large amounts
        let tax_cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(tax_cents as i64)
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use fieldline_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(8000); // $80.00
    /// let line_total = unit_price.multiply_quantity(2);
    /// assert_eq!(line_total.cents(), 16000); // $160.00
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Returns the change due when this amount is tendered against `due`,
    /// or `None` when the tendered amount does not cover it.
    ///
    /// ## Example
    /// ```rust
    /// use fieldline_core::money::Money;
    ///
    /// let due = Money::from_cents(22247);      // $222.47
    /// let tendered = Money::from_cents(25000); // $250.00
    /// assert_eq!(tendered.change_against(due), Some(Money::from_cents(2753)));
    ///
    /// let short = Money::from_cents(10000);
    /// assert_eq!(short.change_against(due), None);
    /// ```
    #[inline]
    pub fn change_against(&self, due: Money) -> Option<Money> {
        if self.0 >= due.0 {
            Some(Money(self.0 - due.0))
        } else {
            None
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for debugging. Actual UI display goes through the console's
/// currency formatting so localization stays at the boundary.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

/// Multiplication by i64.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
