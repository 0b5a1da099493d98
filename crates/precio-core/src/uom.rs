//! # Units of Measure
//!
//! Prices and quantities for alternate selling units (a box of 12, a
//! 500 g pack) derived from the product's base unit.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::rounding::RoundingMode;

/// How many base units one `unit` contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UnitConversion {
    /// Unit code, e.g. `"BOX12"`.
    pub unit: String,
    #[ts(type = "string")]
    pub factor: Decimal,
}

impl UnitConversion {
    /// Builds a conversion, rejecting a zero or negative factor.
    pub fn new(unit: impl Into<String>, factor: Decimal) -> CoreResult<Self> {
        let conversion = UnitConversion {
            unit: unit.into(),
            factor,
        };
        conversion.check()?;
        Ok(conversion)
    }

    fn check(&self) -> CoreResult<()> {
        if self.factor <= Decimal::ZERO {
            return Err(CoreError::InvalidConversionFactor { factor: self.factor });
        }
        Ok(())
    }
}

/// Price of one alternate unit: base unit price × factor, rounded.
///
/// ## Example
/// ```rust
/// use precio_core::uom::{unit_price_for, UnitConversion};
/// use precio_core::{Money, RoundingMode};
/// use rust_decimal_macros::dec;
///
/// let box12 = UnitConversion::new("BOX12", dec!(12)).unwrap();
/// let price = unit_price_for(Money::from_cents(159), &box12, RoundingMode::HalfUp).unwrap();
/// assert_eq!(price.cents(), 1908);
/// ```
pub fn unit_price_for(base_unit_price: Money, conversion: &UnitConversion, mode: RoundingMode) -> CoreResult<Money> {
    conversion.check()?;
    base_unit_price
        .to_decimal()
        .checked_mul(conversion.factor)
        .and_then(|price| Money::checked_from_decimal(price, mode))
        .ok_or(CoreError::Overflow { operation: "unit price" })
}

/// Quantity expressed in base units (for stock movements).
pub fn to_base_quantity(quantity: Decimal, conversion: &UnitConversion) -> CoreResult<Decimal> {
    conversion.check()?;
    quantity
        .checked_mul(conversion.factor)
        .ok_or(CoreError::Overflow { operation: "base quantity" })
}
