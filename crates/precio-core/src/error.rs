//! # Error Types
//!
//! Domain-specific error types for precio-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  precio-core errors (this file)                                        │
//! │  ├── CoreError        - Pricing failures that must be surfaced         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  precio-config errors (separate crate)                                 │
//! │  └── ConfigError      - Settings load/save failures                    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → caller (UI / sales layer)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## What Is NOT an Error
//! The engine trusts its caller for domain validation. Negative margins,
//! zero cost in direct mode and margins below -100% all produce a number.
//! Only operations whose arithmetic is undefined or out of range fail.

use rust_decimal::Decimal;
use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Pricing engine errors.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    /// Cost plus internal tax is zero or negative, so no margin can be
    /// derived from a target price.
    ///
    /// ## When This Occurs
    /// ```text
    /// Row in inverse mode, final price 121.00
    ///      │
    ///      ▼
    /// cost = 0, internal tax = 0  →  base = 0
    ///      │
    ///      ▼
    /// NonPositiveBase { base: 0 }
    ///      │
    ///      ▼
    /// UI shows: "Enter a cost before setting a target price"
    /// ```
    #[error("Cannot derive a margin from a non-positive cost base ({base})")]
    NonPositiveBase { base: Decimal },

    /// VAT at or below -100% leaves nothing to divide a gross price by.
    #[error("VAT rate {vat}% leaves no net price to derive")]
    NonPositiveVatFactor { vat: Decimal },

    /// An intermediate amount left the representable range.
    ///
    /// Decimal arithmetic is checked throughout the engine; money amounts
    /// must also fit in i64 cents.
    #[error("Arithmetic overflow computing {operation}")]
    Overflow { operation: &'static str },

    /// A unit-of-measure conversion factor is zero or negative.
    #[error("Conversion factor must be positive, got {factor}")]
    InvalidConversionFactor { factor: Decimal },

    /// A price row index is out of bounds.
    #[error("Price row {index} not found")]
    RowNotFound { index: usize },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Produced by the validators in [`crate::validation`], which callers run at
/// their own boundary before handing values to the engine.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: String,
        min: Decimal,
        max: Decimal,
    },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or positive.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g. unparseable number or unknown list id).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
