//! # Money Module
//!
//! Provides the `Money` type for rounded monetary values.
//!
//! ## Two Representations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  WHERE EACH NUMBER LIVES                                                │
//! │                                                                         │
//! │  Inputs & intermediates          Outputs                                │
//! │  ──────────────────────          ───────                                │
//! │  cost, taxes, margins            net price, final price                 │
//! │  ratios, VAT factors             list prices, sale totals               │
//! │        │                                ▲                               │
//! │        │  Decimal (exact base-10)       │  Money (i64 cents)            │
//! │        └──────► apply_rounding ─────────┘                               │
//! │                                                                         │
//! │  Floating point is never involved:                                      │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌                                  │
//! │    ceil(159.72 * 100) = 15973       ❌ (float drift breaks UP mode)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use precio_core::money::Money;
//! use precio_core::rounding::RoundingMode;
//! use rust_decimal_macros::dec;
//!
//! let price = Money::from_decimal(dec!(159.715), RoundingMode::HalfUp);
//! assert_eq!(price.cents(), 15972);
//! assert_eq!(price.to_decimal(), dec!(159.72));
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::rounding::{apply_rounding, RoundingMode, MONEY_DECIMALS};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: negative margins can produce negative prices
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Serialized as cents**: the UI formats for display
/// - **Saturating operators**: `+`, `-` and negation clamp at the i64
///   bounds; use [`Money::checked_add`] where an overflow must surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// ## Example
    /// ```rust
    /// use precio_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(159, 72).cents(), 15972);
    /// assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    /// ```
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        let major_cents = major.saturating_mul(100);
        if major < 0 {
            Money(major_cents.saturating_sub(minor))
        } else {
            Money(major_cents.saturating_add(minor))
        }
    }

    /// Rounds a decimal amount to cents under `mode` and wraps it.
    ///
    /// Amounts outside the i64 cent range saturate at the bounds.
    pub fn from_decimal(amount: Decimal, mode: RoundingMode) -> Self {
        match Self::checked_from_decimal(amount, mode) {
            Some(money) => money,
            None if amount.is_sign_negative() => Money(i64::MIN),
            None => Money(i64::MAX),
        }
    }

    /// Like [`Money::from_decimal`], returning `None` outside the i64 cent
    /// range.
    pub fn checked_from_decimal(amount: Decimal, mode: RoundingMode) -> Option<Self> {
        apply_rounding(amount, mode)
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.to_i64())
            .map(Money)
    }

    #[inline]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Returns the value as an exact decimal with two places.
    #[inline]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, MONEY_DECIMALS)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly rendering. The UI owns localized formatting.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.units().abs(), self.cents_part())
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
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(self.0.saturating_neg())
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
