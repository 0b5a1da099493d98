//! # Pricing Module
//!
//! Direct (margin → price) and inverse (price → margin) pricing.
//!
//! ## Calculation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       DIRECT  (margin → price)                          │
//! │                                                                         │
//! │  cost ──► + internal tax ──► net base ──► × (1 + margin%) ──► round    │
//! │                                                                  │      │
//! │                                                                 net     │
//! │                                                                  │      │
//! │                                           × (1 + VAT%) ──► round ▼      │
//! │                                                                final    │
//! │                                                                         │
//! │                       INVERSE (price → margin)                          │
//! │                                                                         │
//! │  final ──► ÷ (1 + VAT%) ──► net price ──► ÷ net base − 1 ──► × 100     │
//! │                                                            ──► round    │
//! │                                                               margin    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Direct pricing rounds twice: once for the net price and once for the
//! gross price computed from the already-rounded net. Both stages are kept
//! so that stored net and gross figures always agree with each other.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::rounding::{apply_rounding, RoundingMode};
use crate::types::{CostBasis, Percent};

// =============================================================================
// Internal Tax
// =============================================================================

/// Absolute internal tax: `flat_amount + cost × percent / 100`.
///
/// No validation; negative inputs simply propagate.
///
/// ## Errors
/// [`CoreError::Overflow`] if the amount leaves the decimal range.
///
/// ## Example
/// ```rust
/// use precio_core::pricing::internal_tax_amount;
/// use precio_core::Percent;
/// use rust_decimal_macros::dec;
///
/// let tax = internal_tax_amount(dec!(200), dec!(10), Percent::new(dec!(5))).unwrap();
/// assert_eq!(tax, dec!(20));
/// ```
pub fn internal_tax_amount(cost: Decimal, flat_amount: Decimal, percent: Percent) -> CoreResult<Decimal> {
    percent
        .checked_of(cost)
        .and_then(|share| flat_amount.checked_add(share))
        .ok_or(CoreError::Overflow { operation: "internal tax" })
}

// =============================================================================
// Direct Pricing
// =============================================================================

/// Net and gross unit price produced by direct pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DirectPrice {
    /// Price before VAT.
    pub net: Money,
    /// Price including VAT.
    #[serde(rename = "final")]
    pub final_price: Money,
}

/// Computes net and final price from a margin.
///
/// ## Errors
/// [`CoreError::Overflow`] if an intermediate amount leaves the decimal
/// range or a price does not fit in i64 cents.
///
/// ## Example
/// ```rust
/// use precio_core::pricing::direct_pricing;
/// use precio_core::{CostBasis, Percent, RoundingMode};
/// use rust_decimal_macros::dec;
///
/// let basis = CostBasis::with_internal_tax(dec!(100), dec!(10), Percent::zero());
/// let price = direct_pricing(
///     &basis,
///     Percent::new(dec!(20)),
///     Percent::new(dec!(21)),
///     RoundingMode::HalfUp,
/// )
/// .unwrap();
/// assert_eq!(price.net.to_decimal(), dec!(132.00));
/// assert_eq!(price.final_price.to_decimal(), dec!(159.72));
/// ```
pub fn direct_pricing(
    basis: &CostBasis,
    margin: Percent,
    vat: Percent,
    mode: RoundingMode,
) -> CoreResult<DirectPrice> {
    let net = basis
        .net_base()?
        .checked_mul(margin.factor())
        .map(|amount| apply_rounding(amount, mode))
        .ok_or(CoreError::Overflow { operation: "net price" })?;
    let final_price = net
        .checked_mul(vat.factor())
        .ok_or(CoreError::Overflow { operation: "final price" })?;

    Ok(DirectPrice {
        net: to_money(net, mode, "net price")?,
        final_price: to_money(final_price, mode, "final price")?,
    })
}

// =============================================================================
// Inverse Pricing
// =============================================================================

/// Margin and net price implied by a target final price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InversePrice {
    /// Derived margin, rounded to two decimals.
    pub margin: Percent,
    /// Target price with VAT removed, rounded to cents.
    pub net: Money,
}

/// Derives the margin percentage that `final_price` represents.
///
/// The target is taken as [`Money`]: it is a price the user stores on a
/// row, so it is already whole cents. Callers holding a finer-grained
/// amount round it first.
///
/// ## Errors
/// - [`CoreError::NonPositiveBase`] when cost plus internal tax is zero or
///   negative: the ratio would be infinite or meaningless.
/// - [`CoreError::NonPositiveVatFactor`] when VAT is -100% or lower.
/// - [`CoreError::Overflow`] when the ratio leaves the decimal range (a
///   huge price over a microscopic base).
///
/// ## Example
/// ```rust
/// use precio_core::pricing::inverse_margin;
/// use precio_core::{CostBasis, Money, Percent, RoundingMode};
/// use rust_decimal_macros::dec;
///
/// let basis = CostBasis::with_internal_tax(dec!(100), dec!(10), Percent::zero());
/// let margin = inverse_margin(
///     &basis,
///     Money::from_cents(15972),
///     Percent::new(dec!(21)),
///     RoundingMode::HalfUp,
/// )
/// .unwrap();
/// assert_eq!(margin.value(), dec!(20.00));
/// ```
pub fn inverse_margin(
    basis: &CostBasis,
    final_price: Money,
    vat: Percent,
    mode: RoundingMode,
) -> CoreResult<Percent> {
    let base = basis.net_base()?;
    if base <= Decimal::ZERO {
        return Err(CoreError::NonPositiveBase { base });
    }

    let margin = net_of_vat(final_price, vat)?
        .checked_div(base)
        .and_then(|ratio| ratio.checked_sub(Decimal::ONE))
        .and_then(|markup| markup.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or(CoreError::Overflow { operation: "margin" })?;

    Ok(Percent::new(apply_rounding(margin, mode)))
}

/// Like [`inverse_margin`], also returning the net price for display.
pub fn inverse_pricing(
    basis: &CostBasis,
    final_price: Money,
    vat: Percent,
    mode: RoundingMode,
) -> CoreResult<InversePrice> {
    let margin = inverse_margin(basis, final_price, vat, mode)?;
    let net = to_money(net_of_vat(final_price, vat)?, mode, "net price")?;

    Ok(InversePrice { margin, net })
}

/// `final_price / (1 + VAT%)`.
fn net_of_vat(final_price: Money, vat: Percent) -> CoreResult<Decimal> {
    let factor = vat.factor();
    if factor <= Decimal::ZERO {
        return Err(CoreError::NonPositiveVatFactor { vat: vat.value() });
    }
    final_price
        .to_decimal()
        .checked_div(factor)
        .ok_or(CoreError::Overflow { operation: "net price" })
}

fn to_money(amount: Decimal, mode: RoundingMode, operation: &'static str) -> CoreResult<Money> {
    Money::checked_from_decimal(amount, mode).ok_or(CoreError::Overflow { operation })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn pct(value: Decimal) -> Percent {
        Percent::new(value)
    }

    #[test]
    fn test_internal_tax_flat_plus_percent() {
        assert_eq!(internal_tax_amount(dec!(200), dec!(10), pct(dec!(5))), Ok(dec!(20)));
        assert_eq!(internal_tax_amount(dec!(200), Decimal::ZERO, Percent::zero()), Ok(Decimal::ZERO));
    }

    #[test]
    fn test_internal_tax_negative_inputs_propagate() {
        assert_eq!(internal_tax_amount(dec!(100), dec!(-5), pct(dec!(-10))), Ok(dec!(-15)));
    }

    #[test]
    fn test_direct_pricing_with_flat_internal_tax() {
        let basis = CostBasis::with_internal_tax(dec!(100), dec!(10), Percent::zero());
        let price = direct_pricing(&basis, pct(dec!(20)), pct(dec!(21)), RoundingMode::HalfUp).unwrap();
        assert_eq!(price.net, Money::from_cents(13200));
        assert_eq!(price.final_price, Money::from_cents(15972));
    }

    #[test]
    fn test_direct_pricing_rounds_net_before_vat() {
        // Single rounding: 10.004 × 1.21 = 12.10484 → 12.11.
        // Two stages: net 10.004 → 10.01, then 10.01 × 1.21 = 12.1121 → 12.12.
        let basis = CostBasis::new(dec!(10.004));
        let price = direct_pricing(&basis, Percent::zero(), pct(dec!(21)), RoundingMode::Up).unwrap();
        assert_eq!(price.net, Money::from_cents(1001));
        assert_eq!(price.final_price, Money::from_cents(1212));
    }

    #[test]
    fn test_direct_pricing_modes() {
        let basis = CostBasis::new(dec!(33.333));
        let margin = pct(dec!(10));
        let vat = pct(dec!(10.5));

        let down = direct_pricing(&basis, margin, vat, RoundingMode::Down).unwrap();
        let half = direct_pricing(&basis, margin, vat, RoundingMode::HalfUp).unwrap();
        let up = direct_pricing(&basis, margin, vat, RoundingMode::Up).unwrap();

        // 33.333 × 1.1 = 36.6663
        assert_eq!(down.net, Money::from_cents(3666));
        assert_eq!(half.net, Money::from_cents(3667));
        assert_eq!(up.net, Money::from_cents(3667));
        assert!(down.final_price <= half.final_price);
        assert!(half.final_price <= up.final_price);
    }

    #[test]
    fn test_direct_pricing_negative_margin_is_accepted() {
        let basis = CostBasis::new(dec!(100));
        let at_minus_100 = direct_pricing(&basis, pct(dec!(-100)), pct(dec!(21)), RoundingMode::HalfUp).unwrap();
        assert!(at_minus_100.final_price.is_zero());

        let below = direct_pricing(&basis, pct(dec!(-150)), pct(dec!(21)), RoundingMode::HalfUp).unwrap();
        assert!(below.net.is_negative());
    }

    #[test]
    fn test_direct_pricing_zero_cost() {
        let price =
            direct_pricing(&CostBasis::default(), pct(dec!(50)), pct(dec!(21)), RoundingMode::HalfUp).unwrap();
        assert!(price.net.is_zero());
        assert!(price.final_price.is_zero());
    }

    #[test]
    fn test_inverse_margin_recovers_margin() {
        let basis = CostBasis::with_internal_tax(dec!(100), dec!(10), Percent::zero());
        let margin = inverse_margin(&basis, Money::from_cents(15972), pct(dec!(21)), RoundingMode::HalfUp).unwrap();
        assert_eq!(margin.value(), dec!(20));
    }

    #[test]
    fn test_inverse_margin_below_cost_is_negative() {
        let basis = CostBasis::new(dec!(100));
        let margin = inverse_margin(&basis, Money::from_cents(9000), Percent::zero(), RoundingMode::HalfUp).unwrap();
        assert_eq!(margin.value(), dec!(-10));
    }

    #[test]
    fn test_inverse_margin_rejects_zero_base() {
        let err = inverse_margin(&CostBasis::default(), Money::from_cents(12100), pct(dec!(21)), RoundingMode::HalfUp)
            .unwrap_err();
        assert_eq!(err, CoreError::NonPositiveBase { base: Decimal::ZERO });
    }

    #[test]
    fn test_inverse_margin_rejects_negative_base() {
        let basis = CostBasis::with_internal_tax(dec!(10), dec!(-20), Percent::zero());
        let err = inverse_margin(&basis, Money::from_cents(100), Percent::zero(), RoundingMode::HalfUp).unwrap_err();
        assert!(matches!(err, CoreError::NonPositiveBase { .. }));
    }

    #[test]
    fn test_inverse_margin_rounds_with_mode() {
        // 100 / 1.21 = 82.6446... → margin -17.355...%
        let basis = CostBasis::new(dec!(100));
        let vat = pct(dec!(21));
        let price = Money::from_cents(10000);
        let down = inverse_margin(&basis, price, vat, RoundingMode::Down).unwrap();
        let half = inverse_margin(&basis, price, vat, RoundingMode::HalfUp).unwrap();
        let up = inverse_margin(&basis, price, vat, RoundingMode::Up).unwrap();
        assert_eq!(down.value(), dec!(-17.36));
        assert_eq!(half.value(), dec!(-17.36));
        assert_eq!(up.value(), dec!(-17.35));
    }

    #[test]
    fn test_inverse_pricing_returns_net() {
        let basis = CostBasis::new(dec!(100));
        let result = inverse_pricing(&basis, Money::from_cents(14520), pct(dec!(21)), RoundingMode::HalfUp).unwrap();
        assert_eq!(result.net, Money::from_cents(12000));
        assert_eq!(result.margin.value(), dec!(20));
    }

    #[test]
    fn test_vat_at_minus_100_is_an_error_not_a_panic() {
        let basis = CostBasis::new(dec!(100));
        let err = inverse_margin(&basis, Money::from_cents(100), pct(dec!(-100)), RoundingMode::HalfUp).unwrap_err();
        assert_eq!(err, CoreError::NonPositiveVatFactor { vat: dec!(-100) });

        let err = inverse_pricing(&basis, Money::from_cents(100), pct(dec!(-150)), RoundingMode::HalfUp).unwrap_err();
        assert!(matches!(err, CoreError::NonPositiveVatFactor { .. }));
    }

    #[test]
    fn test_direct_pricing_overflow_is_an_error() {
        let huge = CostBasis::new(Decimal::MAX);
        let err = direct_pricing(&huge, pct(dec!(20)), pct(dec!(21)), RoundingMode::HalfUp).unwrap_err();
        assert_eq!(err, CoreError::Overflow { operation: "net price" });

        // Fits in a decimal but not in i64 cents.
        let large = CostBasis::new(Decimal::from(i64::MAX));
        let err = direct_pricing(&large, Percent::zero(), Percent::zero(), RoundingMode::HalfUp).unwrap_err();
        assert!(matches!(err, CoreError::Overflow { .. }));
    }

    #[test]
    fn test_inverse_pricing_overflow_is_an_error() {
        let tiny = CostBasis::new(Decimal::new(1, 28));
        let err = inverse_pricing(&tiny, Money::from_cents(i64::MAX), Percent::zero(), RoundingMode::HalfUp)
            .unwrap_err();
        assert_eq!(err, CoreError::Overflow { operation: "margin" });
    }

    #[test]
    fn test_direct_price_json_shape() {
        let price = DirectPrice {
            net: Money::from_cents(13200),
            final_price: Money::from_cents(15972),
        };
        let json = serde_json::to_value(price).unwrap();
        assert_eq!(json["net"], 13200);
        assert_eq!(json["final"], 15972);
    }

    proptest! {
        /// Direct then inverse returns the original margin, within what the
        /// two cent roundings can move it.
        #[test]
        fn direct_then_inverse_round_trips(
            cost_cents in 100i64..10_000_000,
            margin_bps in 0i64..30_000,
            vat_bps in 0i64..5_000,
            mode_index in 0usize..3,
        ) {
            let mode = RoundingMode::ALL[mode_index];
            let basis = CostBasis::new(Decimal::new(cost_cents, 2));
            let margin = Percent::from_bps(margin_bps);
            let vat = Percent::from_bps(vat_bps);

            let price = direct_pricing(&basis, margin, vat, mode).unwrap();
            let derived = inverse_margin(&basis, price.final_price, vat, mode).unwrap();

            // One cent of drift on net plus one on final, relative to the
            // smallest base (1.00), bounds the error at 2 percentage points.
            let tolerance = dec!(2.01);
            prop_assert!((derived.value() - margin.value()).abs() <= tolerance,
                "margin {} came back as {}", margin, derived);
        }
    }
}
