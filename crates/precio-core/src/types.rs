//! # Domain Types
//!
//! Shared value types used throughout Precio.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    CostBasis    │   │     Percent     │   │   PriceMode     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  cost           │   │  21 = 21%       │   │  Direct         │       │
//! │  │  internal tax $ │   │  VAT, margins,  │   │  Inverse        │       │
//! │  │  internal tax % │   │  discounts      │   │                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │   PriceListId   │   │   TierMargins   │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  L1 L2 L3       │   │  L1 20%         │                             │
//! │  │  L4 (promo)     │   │  L2 15%         │                             │
//! │  │  PUBLIC         │   │  L3 10%         │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::pricing::internal_tax_amount;

// =============================================================================
// Percent
// =============================================================================

/// A percentage stored as an exact decimal (`21` = 21%).
///
/// Margins may be negative. VAT and internal-tax percentages are
/// expected to be non-negative but the engine does not enforce it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Percent(#[ts(type = "string")] Decimal);

impl Percent {
    #[inline]
    pub const fn new(value: Decimal) -> Self {
        Percent(value)
    }

    /// Creates a percentage from basis points (2100 = 21%).
    #[inline]
    pub fn from_bps(bps: i64) -> Self {
        Percent(Decimal::new(bps, 2))
    }

    #[inline]
    pub const fn zero() -> Self {
        Percent(Decimal::ZERO)
    }

    /// Returns the percentage value (21 for 21%).
    #[inline]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    /// Multiplier that applies this percentage on top of an amount.
    ///
    /// ## Example
    /// ```rust
    /// use precio_core::Percent;
    /// use rust_decimal_macros::dec;
    ///
    /// assert_eq!(Percent::new(dec!(21)).factor(), dec!(1.21));
    /// assert_eq!(Percent::new(dec!(-5)).factor(), dec!(0.95));
    /// ```
    #[inline]
    pub fn factor(&self) -> Decimal {
        Decimal::ONE + self.0 / Decimal::ONE_HUNDRED
    }

    /// Returns this percentage of `amount`, or `None` on overflow.
    #[inline]
    pub fn checked_of(&self, amount: Decimal) -> Option<Decimal> {
        amount
            .checked_mul(self.0)
            .map(|scaled| scaled / Decimal::ONE_HUNDRED)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<Decimal> for Percent {
    fn from(value: Decimal) -> Self {
        Percent(value)
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0.normalize())
    }
}

/// VAT rate applied once, after margin and internal tax.
pub type VatRate = Percent;

// =============================================================================
// Cost Basis
// =============================================================================

/// What a unit costs before margin and VAT.
///
/// The flat and percentage internal taxes are additive: a product can carry
/// both at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CostBasis {
    /// Purchase cost per unit.
    #[ts(type = "string")]
    pub cost: Decimal,

    /// Flat internal tax per unit.
    #[serde(default)]
    #[ts(type = "string")]
    pub internal_tax_amount: Decimal,

    /// Internal tax as a percentage of cost.
    #[serde(default)]
    pub internal_tax_percent: Percent,
}

impl CostBasis {
    /// Cost basis without internal taxes.
    pub fn new(cost: Decimal) -> Self {
        CostBasis {
            cost,
            ..CostBasis::default()
        }
    }

    pub fn with_internal_tax(cost: Decimal, flat_amount: Decimal, percent: Percent) -> Self {
        CostBasis {
            cost,
            internal_tax_amount: flat_amount,
            internal_tax_percent: percent,
        }
    }

    /// Absolute internal tax for one unit.
    #[inline]
    pub fn internal_tax(&self) -> CoreResult<Decimal> {
        internal_tax_amount(self.cost, self.internal_tax_amount, self.internal_tax_percent)
    }

    /// Cost plus internal tax: the base margins are applied to.
    pub fn net_base(&self) -> CoreResult<Decimal> {
        self.cost
            .checked_add(self.internal_tax()?)
            .ok_or(CoreError::Overflow { operation: "net base" })
    }
}

// =============================================================================
// Price Mode
// =============================================================================

/// Which field of a price row is authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PriceMode {
    /// Margin drives the price.
    #[default]
    Direct,
    /// Final price drives the margin.
    Inverse,
}

// =============================================================================
// Price List Id
// =============================================================================

/// Identifier of a sale price list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum PriceListId {
    L1,
    L2,
    L3,
    /// Quantity promotion.
    L4,
    /// Plain public price.
    Public,
}

impl PriceListId {
    /// True for the quantity-promotion list.
    #[inline]
    pub fn is_promo(&self) -> bool {
        matches!(self, PriceListId::L4)
    }
}

impl fmt::Display for PriceListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceListId::L1 => write!(f, "L1"),
            PriceListId::L2 => write!(f, "L2"),
            PriceListId::L3 => write!(f, "L3"),
            PriceListId::L4 => write!(f, "L4"),
            PriceListId::Public => write!(f, "PUBLIC"),
        }
    }
}

impl FromStr for PriceListId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "L1" => Ok(PriceListId::L1),
            "L2" => Ok(PriceListId::L2),
            "L3" => Ok(PriceListId::L3),
            "L4" => Ok(PriceListId::L4),
            "PUBLIC" | "" => Ok(PriceListId::Public),
            other => Err(ValidationError::InvalidFormat {
                field: "price_list".to_string(),
                reason: format!("unknown price list '{}'", other),
            }),
        }
    }
}

// =============================================================================
// Tier Margins
// =============================================================================

/// Margins used to compute L1-L3 prices when no precomputed price exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TierMargins {
    #[serde(default = "default_l1")]
    pub l1: Percent,
    #[serde(default = "default_l2")]
    pub l2: Percent,
    #[serde(default = "default_l3")]
    pub l3: Percent,
}

fn default_l1() -> Percent {
    Percent::from_bps(2000)
}

fn default_l2() -> Percent {
    Percent::from_bps(1500)
}

fn default_l3() -> Percent {
    Percent::from_bps(1000)
}

impl Default for TierMargins {
    /// L1 20%, L2 15%, L3 10%.
    fn default() -> Self {
        TierMargins {
            l1: default_l1(),
            l2: default_l2(),
            l3: default_l3(),
        }
    }
}

impl TierMargins {
    /// Fallback margin for a list; `None` for L4 and PUBLIC.
    pub fn margin_for(&self, list: PriceListId) -> Option<Percent> {
        match list {
            PriceListId::L1 => Some(self.l1),
            PriceListId::L2 => Some(self.l2),
            PriceListId::L3 => Some(self.l3),
            PriceListId::L4 | PriceListId::Public => None,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_percent_from_bps() {
        assert_eq!(Percent::from_bps(2100).value(), dec!(21));
        assert_eq!(Percent::from_bps(1050).value(), dec!(10.5));
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(Percent::new(dec!(5)).checked_of(dec!(200)), Some(dec!(10)));
        assert_eq!(Percent::new(dec!(200)).checked_of(Decimal::MAX), None);
        assert_eq!(Percent::new(dec!(21)).to_string(), "21%");
    }

    #[test]
    fn test_percent_deserializes_from_number_or_string() {
        let p: Percent = serde_json::from_str("21").unwrap();
        assert_eq!(p.value(), dec!(21));
        let p: Percent = serde_json::from_str("\"10.5\"").unwrap();
        assert_eq!(p.value(), dec!(10.5));
    }

    #[test]
    fn test_cost_basis_tax_defaults_to_zero() {
        let basis: CostBasis = serde_json::from_str(r#"{"cost": 100}"#).unwrap();
        assert_eq!(basis.internal_tax(), Ok(Decimal::ZERO));
        assert_eq!(basis.net_base(), Ok(dec!(100)));
    }

    #[test]
    fn test_cost_basis_taxes_are_additive() {
        let basis = CostBasis::with_internal_tax(dec!(200), dec!(10), Percent::new(dec!(5)));
        assert_eq!(basis.internal_tax(), Ok(dec!(20)));
        assert_eq!(basis.net_base(), Ok(dec!(220)));
    }

    #[test]
    fn test_cost_basis_overflow_is_an_error() {
        let basis = CostBasis::with_internal_tax(Decimal::MAX, dec!(1), Percent::zero());
        assert_eq!(basis.net_base(), Err(CoreError::Overflow { operation: "net base" }));

        let basis = CostBasis::with_internal_tax(Decimal::MAX, Decimal::ZERO, Percent::new(dec!(150)));
        assert!(basis.internal_tax().is_err());
    }

    #[test]
    fn test_price_list_parsing() {
        assert_eq!("l2".parse::<PriceListId>().unwrap(), PriceListId::L2);
        assert_eq!(" L4 ".parse::<PriceListId>().unwrap(), PriceListId::L4);
        assert_eq!("public".parse::<PriceListId>().unwrap(), PriceListId::Public);
        assert!("l9".parse::<PriceListId>().is_err());
        assert!(PriceListId::L4.is_promo());
    }

    #[test]
    fn test_tier_margins_default() {
        let margins = TierMargins::default();
        assert_eq!(margins.margin_for(PriceListId::L1), Some(Percent::new(dec!(20))));
        assert_eq!(margins.margin_for(PriceListId::L2), Some(Percent::new(dec!(15))));
        assert_eq!(margins.margin_for(PriceListId::L3), Some(Percent::new(dec!(10))));
        assert_eq!(margins.margin_for(PriceListId::L4), None);
    }

    #[test]
    fn test_price_mode_default() {
        assert_eq!(PriceMode::default(), PriceMode::Direct);
    }
}
