//! # precio-core: Pure Pricing Logic for Precio
//!
//! This crate is the **heart** of Precio. It holds the one pricing engine
//! every screen and service uses: price editors, the point of sale and the
//! sales-document totals. Zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Precio Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │        Callers (price editor UI, POS, sales service, CLI)       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ plain function calls                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ precio-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌────────────┐        │   │
//! │  │   │ rounding │ │ pricing  │ │   rows   │ │ price_list │        │   │
//! │  │   │ HALF_UP  │ │ direct   │ │ locking  │ │ L1-L4 +    │        │   │
//! │  │   │ UP, DOWN │ │ inverse  │ │ sheets   │ │ fallback   │        │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └────────────┘        │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌────────────┐        │   │
//! │  │   │  money   │ │  totals  │ │   uom    │ │ validation │        │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └────────────┘        │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO SETTINGS LOOKUP • PURE FUNCTIONS    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                ▲                                        │
//! │  ┌─────────────────────────────┴───────────────────────────────────┐   │
//! │  │       precio-config: rounding mode, tier margins, defaults      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = same output; row recalculation only
//!    mutates the rows it is handed
//! 2. **Exact Arithmetic**: `Decimal` for every intermediate, integer cents
//!    for rounded money
//! 3. **Explicit Configuration**: rounding mode, VAT and margins are
//!    parameters, never ambient state
//! 4. **Loud Only Where Undefined**: a non-positive cost base or VAT factor
//!    in inverse pricing, and amounts out of range, are errors; no
//!    arithmetic panics
//!
//! ## Example Usage
//!
//! ```rust
//! use precio_core::pricing::{direct_pricing, inverse_margin};
//! use precio_core::{CostBasis, Percent, RoundingMode};
//! use rust_decimal_macros::dec;
//!
//! let basis = CostBasis::with_internal_tax(dec!(100), dec!(10), Percent::zero());
//! let vat = Percent::new(dec!(21));
//!
//! let price = direct_pricing(&basis, Percent::new(dec!(20)), vat, RoundingMode::HalfUp).unwrap();
//! assert_eq!(price.final_price.to_decimal(), dec!(159.72));
//!
//! let margin = inverse_margin(&basis, price.final_price, vat, RoundingMode::HalfUp).unwrap();
//! assert_eq!(margin.value(), dec!(20));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod price_list;
pub mod pricing;
pub mod rounding;
pub mod rows;
pub mod totals;
pub mod types;
pub mod uom;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use price_list::{resolve_price, PriceData, PriceListResolver, ResolvedPrice};
pub use pricing::{direct_pricing, internal_tax_amount, inverse_margin, DirectPrice};
pub use rounding::{apply_rounding, RoundingMode};
pub use rows::{force_recalc, recalculate_all, PriceRow, PriceSheet};
pub use totals::{calculate_totals, SaleLine, SaleTotals};
pub use types::*;

/// Re-exported so callers build inputs without a direct dependency.
pub use rust_decimal::Decimal;
