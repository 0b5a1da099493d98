//! # Validation Module
//!
//! Input checks for callers that sit in front of the engine.
//!
//! ## Where Validation Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Price editor UI                                              │
//! │  ├── Basic format checks (empty, not a number)                         │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Service / command handler                                    │
//! │  └── THIS MODULE: domain rules (cost >= 0, VAT 0-100, qty > 0)         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Pricing engine                                               │
//! │  └── Accepts any number; only fails where math is undefined            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use precio_core::validation::{validate_cost, validate_vat_rate};
//! use precio_core::Percent;
//! use rust_decimal_macros::dec;
//!
//! validate_cost(dec!(100)).unwrap();
//! assert!(validate_vat_rate(Percent::new(dec!(121))).is_err());
//! ```

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::price_list::PriceData;
use crate::rounding::MONEY_DECIMALS;
use crate::totals::SaleLine;
use crate::types::{CostBasis, Percent};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted price-row label.
pub const MAX_LABEL_LEN: usize = 50;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a price-row label.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 50 characters
pub fn validate_label(label: &str) -> ValidationResult<()> {
    let label = label.trim();

    if label.is_empty() {
        return Err(ValidationError::Required {
            field: "label".to_string(),
        });
    }

    if label.chars().count() > MAX_LABEL_LEN {
        return Err(ValidationError::TooLong {
            field: "label".to_string(),
            max: MAX_LABEL_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a unit cost. Zero is allowed (free samples, gifts).
pub fn validate_cost(cost: Decimal) -> ValidationResult<()> {
    not_negative("cost", cost)
}

/// Validates every component of a cost basis.
pub fn validate_cost_basis(basis: &CostBasis) -> ValidationResult<()> {
    not_negative("cost", basis.cost)?;
    not_negative("internal_tax_amount", basis.internal_tax_amount)?;
    not_negative("internal_tax_percent", basis.internal_tax_percent.value())
}

/// Validates a VAT rate.
///
/// ## Rules
/// - Between 0% and 100% inclusive
pub fn validate_vat_rate(vat: Percent) -> ValidationResult<()> {
    percent_in_range("vat", vat)
}

/// Validates a target final price typed by the user.
///
/// ## Rules
/// - Not negative
/// - Whole cents: `159.725` is rejected rather than silently rounded
pub fn validate_target_price(price: Decimal) -> ValidationResult<()> {
    not_negative("price", price)?;

    if price.normalize().scale() > MONEY_DECIMALS {
        return Err(ValidationError::InvalidFormat {
            field: "price".to_string(),
            reason: format!("at most {} decimal places", MONEY_DECIMALS),
        });
    }

    Ok(())
}

/// Validates a sale-line quantity.
///
/// ## User Workflow
/// ```text
/// User enters quantity: 0
///      │
///      ▼
/// validate_quantity(0) ← THIS FUNCTION
///      │
///      ├── qty <= 0? → Error: "quantity must be positive"
///      │
///      └── OK → resolve_price(...)
/// ```
pub fn validate_quantity(quantity: Decimal) -> ValidationResult<()> {
    positive("quantity", quantity)
}

/// Validates the threshold of a quantity promotion.
pub fn validate_min_qty(min_qty: Decimal) -> ValidationResult<()> {
    positive("min_qty", min_qty)
}

/// Validates a sales-document line.
pub fn validate_sale_line(line: &SaleLine) -> ValidationResult<()> {
    validate_quantity(line.quantity)?;
    not_negative("unit_price", line.unit_price)?;
    percent_in_range("tax_rate", line.tax_rate)?;
    percent_in_range("discount", line.discount)
}

/// Validates a price-list snapshot before resolution.
pub fn validate_price_data(data: &PriceData) -> ValidationResult<()> {
    validate_vat_rate(data.vat_percent)?;

    if let Some(basis) = &data.cost_basis {
        validate_cost_basis(basis)?;
    }

    if let Some(promo) = data.price_lists.and_then(|lists| lists.l4) {
        validate_min_qty(promo.min_qty)?;
    }

    Ok(())
}

fn percent_in_range(field: &str, value: Percent) -> ValidationResult<()> {
    if value.value() < Decimal::ZERO || value.value() > Decimal::ONE_HUNDRED {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: Decimal::ZERO,
            max: Decimal::ONE_HUNDRED,
        });
    }
    Ok(())
}

fn positive(field: &str, value: Decimal) -> ValidationResult<()> {
    if value <= Decimal::ZERO {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn not_negative(field: &str, value: Decimal) -> ValidationResult<()> {
    if value < Decimal::ZERO {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
