//! # Price List Resolution
//!
//! Picks the unit price of a sale line from a product's price lists.
//!
//! ## Resolution Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  requested L1 / L2 / L3                                                 │
//! │     │                                                                   │
//! │     ├── precomputed price?  ──yes──► use it          (used = Ln)        │
//! │     │                                                                   │
//! │     ├── direct price from cost with tier margin > 0?                    │
//! │     │                       ──yes──► use it          (used = Ln)        │
//! │     │                                                                   │
//! │     └── public price                 (used = PUBLIC, fallbackOf = Ln)   │
//! │                                                                         │
//! │  requested L4 (quantity promo)                                          │
//! │     │                                                                   │
//! │     ├── promo tier and quantity >= minQty?                              │
//! │     │                       ──yes──► promo price     (used = L4)        │
//! │     │                                                                   │
//! │     └── resolve as the last non-promo list instead                      │
//! │                                                                         │
//! │  requested PUBLIC, or no price lists at all ──► public price            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::money::Money;
use crate::pricing::direct_pricing;
use crate::rounding::RoundingMode;
use crate::types::{CostBasis, Percent, PriceListId, TierMargins};

// =============================================================================
// Price Data
// =============================================================================

/// Quantity promotion: `price` applies from `min_qty` units upwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PromoTier {
    pub price: Money,
    #[ts(type = "string")]
    pub min_qty: Decimal,
}

/// Precomputed list prices of a product. Missing lists are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceLists {
    #[serde(rename = "L1", default, skip_serializing_if = "Option::is_none")]
    pub l1: Option<Money>,
    #[serde(rename = "L2", default, skip_serializing_if = "Option::is_none")]
    pub l2: Option<Money>,
    #[serde(rename = "L3", default, skip_serializing_if = "Option::is_none")]
    pub l3: Option<Money>,
    #[serde(rename = "L4", default, skip_serializing_if = "Option::is_none")]
    pub l4: Option<PromoTier>,
}

impl PriceLists {
    /// Precomputed price of L1-L3; `None` for L4 and PUBLIC.
    pub fn list_price(&self, list: PriceListId) -> Option<Money> {
        match list {
            PriceListId::L1 => self.l1,
            PriceListId::L2 => self.l2,
            PriceListId::L3 => self.l3,
            PriceListId::L4 | PriceListId::Public => None,
        }
    }
}

/// Pricing snapshot of a product as the point of sale sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceData {
    pub price_public: Money,
    #[serde(default)]
    pub price_lists: Option<PriceLists>,
    /// Needed only to compute missing L1-L3 prices.
    #[serde(default)]
    pub cost_basis: Option<CostBasis>,
    #[serde(default)]
    pub vat_percent: Percent,
}

impl PriceData {
    /// Product with a public price only.
    pub fn public_only(price_public: Money) -> Self {
        PriceData {
            price_public,
            ..PriceData::default()
        }
    }
}

/// The price chosen for a sale line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPrice {
    pub price: Money,
    /// List the price came from.
    pub used: PriceListId,
    /// The list that was requested when the public price had to stand in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_of: Option<PriceListId>,
}

impl ResolvedPrice {
    fn from_list(price: Money, used: PriceListId) -> Self {
        ResolvedPrice {
            price,
            used,
            fallback_of: None,
        }
    }

    fn public(data: &PriceData, fallback_of: Option<PriceListId>) -> Self {
        ResolvedPrice {
            price: data.price_public,
            used: PriceListId::Public,
            fallback_of,
        }
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Resolves list prices with a configurable margin table and rounding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PriceListResolver {
    tier_margins: TierMargins,
    rounding: RoundingMode,
}

impl PriceListResolver {
    pub fn new(tier_margins: TierMargins, rounding: RoundingMode) -> Self {
        PriceListResolver {
            tier_margins,
            rounding,
        }
    }

    /// Unit price for `quantity` units on the `requested` list.
    ///
    /// `last_non_promo` is the list the sale was on before switching to the
    /// quantity promotion; it is used when L4 does not apply.
    pub fn resolve(
        &self,
        data: &PriceData,
        quantity: Decimal,
        requested: PriceListId,
        last_non_promo: PriceListId,
    ) -> ResolvedPrice {
        let Some(lists) = data.price_lists else {
            return ResolvedPrice::public(data, None);
        };

        match requested {
            PriceListId::Public => ResolvedPrice::public(data, None),
            PriceListId::L4 => match lists.l4 {
                Some(promo) if quantity >= promo.min_qty => {
                    ResolvedPrice::from_list(promo.price, PriceListId::L4)
                }
                _ => {
                    debug!(%quantity, %last_non_promo, "Quantity promo not applicable");
                    if last_non_promo.is_promo() {
                        ResolvedPrice::public(data, None)
                    } else {
                        self.resolve(data, quantity, last_non_promo, last_non_promo)
                    }
                }
            },
            tier => self.resolve_tier(data, &lists, tier),
        }
    }

    fn resolve_tier(&self, data: &PriceData, lists: &PriceLists, tier: PriceListId) -> ResolvedPrice {
        if let Some(price) = lists.list_price(tier) {
            return ResolvedPrice::from_list(price, tier);
        }

        if let Some(price) = self.computed_price(data, tier).filter(Money::is_positive) {
            debug!(list = %tier, %price, "Computed missing list price from cost");
            return ResolvedPrice::from_list(price, tier);
        }

        debug!(list = %tier, "No list price available, using public price");
        ResolvedPrice::public(data, Some(tier))
    }

    fn computed_price(&self, data: &PriceData, tier: PriceListId) -> Option<Money> {
        let basis = data.cost_basis?;
        let margin = self.tier_margins.margin_for(tier)?;
        match direct_pricing(&basis, margin, data.vat_percent, self.rounding) {
            Ok(price) => Some(price.final_price),
            Err(e) => {
                debug!(list = %tier, error = %e, "Could not compute list price");
                None
            }
        }
    }
}

/// [`PriceListResolver::resolve`] with the default margin table
/// (L1 20%, L2 15%, L3 10%) and half-up rounding.
///
/// ## Example
/// ```rust
/// use precio_core::price_list::{resolve_price, PriceData};
/// use precio_core::PriceListId;
/// use rust_decimal_macros::dec;
///
/// let data: PriceData = serde_json::from_str(r#"{
///     "pricePublic": 220000,
///     "priceLists": { "L2": 278300, "L4": { "price": 220000, "minQty": 3 } }
/// }"#).unwrap();
///
/// let line = resolve_price(&data, dec!(3), PriceListId::L4, PriceListId::L1);
/// assert_eq!(line.used, PriceListId::L4);
///
/// let line = resolve_price(&data, dec!(2), PriceListId::L4, PriceListId::L1);
/// assert_ne!(line.used, PriceListId::L4);
/// ```
pub fn resolve_price(
    data: &PriceData,
    quantity: Decimal,
    requested: PriceListId,
    last_non_promo: PriceListId,
) -> ResolvedPrice {
    PriceListResolver::default().resolve(data, quantity, requested, last_non_promo)
}

// =============================================================================
// Unit Tests
// =============================================================================
