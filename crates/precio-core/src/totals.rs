//! # Sales Totals
//!
//! Subtotal, discount, tax and grand total of a sales document.
//!
//! Lines are computed exactly in decimal; the sums are rounded once,
//! half-up, at the end.
//!
//! ```text
//! line:   gross    = quantity × unit price
//!         discount = gross × discount%
//!         net      = gross − discount
//!         tax      = net × tax rate%
//!
//! totals: subtotal = Σ net          (after discount)
//!         discount = Σ discount
//!         tax      = Σ tax
//!         total    = subtotal + tax (of the rounded figures)
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::rounding::RoundingMode;
use crate::types::Percent;

/// One line of a sales document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleLine {
    #[ts(type = "string")]
    pub quantity: Decimal,
    /// Unit price before tax.
    #[ts(type = "string")]
    pub unit_price: Decimal,
    #[serde(default)]
    pub tax_rate: Percent,
    /// Percentage discount on the line.
    #[serde(default)]
    pub discount: Percent,
}

impl SaleLine {
    pub fn new(quantity: Decimal, unit_price: Decimal, tax_rate: Percent, discount: Percent) -> Self {
        SaleLine {
            quantity,
            unit_price,
            tax_rate,
            discount,
        }
    }

    /// Exact discount, net and tax of this line; `None` on overflow.
    fn amounts(&self) -> Option<LineAmounts> {
        let gross = self.quantity.checked_mul(self.unit_price)?;
        let discount = self.discount.checked_of(gross)?;
        let net = gross.checked_sub(discount)?;
        let tax = self.tax_rate.checked_of(net)?;
        Some(LineAmounts { discount, net, tax })
    }
}

#[derive(Debug, Default)]
struct LineAmounts {
    discount: Decimal,
    net: Decimal,
    tax: Decimal,
}

impl LineAmounts {
    fn checked_add(self, other: LineAmounts) -> Option<LineAmounts> {
        Some(LineAmounts {
            discount: self.discount.checked_add(other.discount)?,
            net: self.net.checked_add(other.net)?,
            tax: self.tax.checked_add(other.tax)?,
        })
    }
}

/// Document totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleTotals {
    /// Sum of line amounts after discount, before tax.
    pub subtotal: Money,
    pub tax_amount: Money,
    pub discount_amount: Money,
    pub total: Money,
}

/// Computes document totals.
///
/// ## Errors
/// [`CoreError::Overflow`] if a line or a sum leaves the decimal range, or
/// a total does not fit in i64 cents.
///
/// ## Example
/// ```rust
/// use precio_core::totals::{calculate_totals, SaleLine};
/// use precio_core::{Money, Percent};
/// use rust_decimal_macros::dec;
///
/// let lines = [
///     SaleLine::new(dec!(2), dec!(100), Percent::new(dec!(21)), Percent::new(dec!(10))),
///     SaleLine::new(dec!(1), dec!(50), Percent::new(dec!(21)), Percent::zero()),
/// ];
/// let totals = calculate_totals(&lines).unwrap();
/// assert_eq!(totals.subtotal, Money::from_cents(23000));
/// assert_eq!(totals.total, Money::from_cents(27830));
/// ```
pub fn calculate_totals(lines: &[SaleLine]) -> CoreResult<SaleTotals> {
    let sums = lines
        .iter()
        .try_fold(LineAmounts::default(), |acc, line| acc.checked_add(line.amounts()?))
        .ok_or(CoreError::Overflow { operation: "sale totals" })?;

    let subtotal = to_money(sums.net)?;
    let tax_amount = to_money(sums.tax)?;
    let total = subtotal
        .checked_add(tax_amount)
        .ok_or(CoreError::Overflow { operation: "sale totals" })?;

    Ok(SaleTotals {
        subtotal,
        tax_amount,
        discount_amount: to_money(sums.discount)?,
        total,
    })
}

fn to_money(amount: Decimal) -> CoreResult<Money> {
    Money::checked_from_decimal(amount, RoundingMode::HalfUp)
        .ok_or(CoreError::Overflow { operation: "sale totals" })
}
