//! # Money Module
//!
//! Provides the `Money` type for handling rupee amounts safely.
//!
//! ## Why Integer Paise?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A GST invoice must show every figure to exactly 2 decimals, and       │
//! │  CGST + SGST + round-off must add up to the printed grand total.        │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Paise                                            │
//! │    ₹262.50 is stored as 26250                                           │
//! │    Every rate application rounds half-up back to whole paise            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use khata_core::money::Money;
//! use khata_core::types::Rate;
//!
//! let subtotal = Money::from_paise(25000); // ₹250.00
//! let cgst = subtotal.percent_of(Rate::from_bps(250)); // 2.5%
//! assert_eq!(cgst.paise(), 625); // ₹6.25
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::Rate;

/// Basis points in 100%.
const BPS_SCALE: i128 = 10_000;

/// Paise in one rupee.
const PAISE_PER_RUPEE: i64 = 100;

// =============================================================================
// Rounding
// =============================================================================

/// Divides `numerator / denominator`, rounding half-up on the absolute value.
///
/// `-2.5` rounds to `-3`, `2.5` rounds to `3`. This is the convention the
/// invoice figures follow: the sign is applied after rounding the magnitude.
///
/// `denominator` must be positive.
pub fn round_half_up(numerator: i128, denominator: i128) -> i64 {
    debug_assert!(denominator > 0, "denominator must be positive");
    let magnitude = (numerator.abs() * 2 + denominator) / (denominator * 2);
    (numerator.signum() * magnitude) as i64
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in paise (1/100 of a rupee).
///
/// ## Design Decisions
/// - **i64 (signed)**: round-off can be negative
/// - **Single field tuple struct**: serializes as a plain integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise.
    ///
    /// ## Example
    /// ```rust
    /// use khata_core::money::Money;
    ///
    /// let price = Money::from_paise(10050); // ₹100.50
    /// assert_eq!(price.paise(), 10050);
    /// ```
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from whole rupees.
    #[inline]
    pub const fn from_rupees(rupees: i64) -> Self {
        Money(rupees * PAISE_PER_RUPEE)
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion (truncated toward zero).
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / PAISE_PER_RUPEE
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % PAISE_PER_RUPEE).abs()
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

    /// Clamps negative values to zero.
    #[inline]
    pub fn non_negative(self) -> Self {
        Money(self.0.max(0))
    }

    /// Absolute difference between two amounts.
    #[inline]
    pub fn abs_diff(self, other: Money) -> Money {
        Money((self.0 - other.0).abs())
    }

    /// Addition that returns `None` instead of overflowing.
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(paise) => Some(Money(paise)),
            None => None,
        }
    }

    /// Sums the amounts, or `None` if the total does not fit in an `i64`.
    ///
    /// ## Example
    /// ```rust
    /// use khata_core::money::Money;
    ///
    /// let parts = [Money::from_paise(13000), Money::from_paise(13299)];
    /// assert_eq!(Money::checked_sum(parts), Some(Money::from_paise(26299)));
    /// assert_eq!(Money::checked_sum([Money::from_paise(i64::MAX), Money::from_paise(1)]), None);
    /// ```
    pub fn checked_sum(amounts: impl IntoIterator<Item = Money>) -> Option<Money> {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |total, amount| total.checked_add(amount))
    }

    /// Multiplies the unit price by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use khata_core::money::Money;
    ///
    /// let unit_price = Money::from_rupees(100);
    /// assert_eq!(unit_price.multiply_quantity(2), Money::from_rupees(200));
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Applies a rate to this amount, rounding half-up to whole paise.
    ///
    /// ## Example
    /// ```rust
    /// use khata_core::money::Money;
    /// use khata_core::types::Rate;
    ///
    /// // ₹10.10 × 2.5% = ₹0.2525 → ₹0.25
    /// let tax = Money::from_paise(1010).percent_of(Rate::from_bps(250));
    /// assert_eq!(tax.paise(), 25);
    ///
    /// // ₹0.30 × 5% = ₹0.015 → ₹0.02 (half rounds up)
    /// let tax = Money::from_paise(30).percent_of(Rate::from_bps(500));
    /// assert_eq!(tax.paise(), 2);
    /// ```
    pub fn percent_of(&self, rate: Rate) -> Money {
        Money(round_half_up(self.0 as i128 * rate.bps() as i128, BPS_SCALE))
    }

    /// Rounds to the nearest whole rupee, half-up on the absolute value.
    ///
    /// ## Example
    /// ```rust
    /// use khata_core::money::Money;
    ///
    /// assert_eq!(Money::from_paise(26250).round_to_rupee().paise(), 26300);
    /// assert_eq!(Money::from_paise(26249).round_to_rupee().paise(), 26200);
    /// ```
    pub fn round_to_rupee(&self) -> Money {
        let rupees = round_half_up(self.0 as i128, PAISE_PER_RUPEE as i128);
        Money(rupees * PAISE_PER_RUPEE)
    }

    /// Parses a decimal rupee string such as `"262.50"`.
    ///
    /// Digits beyond the second decimal place are rounded half-up on the
    /// absolute value, so parsing the display form of an amount always
    /// yields the same amount.
    ///
    /// ## Example
    /// ```rust
    /// use khata_core::money::Money;
    ///
    /// assert_eq!(Money::parse("262.50").unwrap().paise(), 26250);
    /// assert_eq!(Money::parse("0.125").unwrap().paise(), 13);
    /// assert_eq!(Money::parse("-0.5").unwrap().paise(), -50);
    /// assert!(Money::parse("12.3.4").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Money, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: reason.to_string(),
        };

        let trimmed = input.trim();
        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (whole, fraction) = match body.split_once('.') {
            Some((w, f)) => (w, f),
            None => (body, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid("must contain digits"));
        }
        if !whole.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid("must be a decimal number"));
        }
        if whole.len() > 15 || fraction.len() > 18 {
            return Err(invalid("too many digits"));
        }

        let whole_value: i128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("must be a decimal number"))?
        };
        let fraction_value: i128 = if fraction.is_empty() {
            0
        } else {
            fraction.parse().map_err(|_| invalid("must be a decimal number"))?
        };

        let scale = 10_i128.pow(fraction.len() as u32);
        let mut scaled = (whole_value * scale + fraction_value) * PAISE_PER_RUPEE as i128;
        if negative {
            scaled = -scaled;
        }

        Ok(Money(round_half_up(scaled, scale)))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Renders the amount with two decimals and no currency symbol (`262.50`).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.rupees().abs(), self.paise_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Saturates at the `i64` bounds. Use [`Money::checked_sum`] where the
/// amounts come straight from a request.
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |total, amount| Money(total.0.saturating_add(amount.0)))
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
