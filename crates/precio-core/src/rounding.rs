//! # Rounding Module
//!
//! Normalizes amounts to cent precision under a selectable policy.
//!
//! ## Rounding Policies
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  amount      HALF_UP        UP (ceil)      DOWN (floor)                 │
//! │  ──────      ───────        ─────────      ────────────                 │
//! │  10.004      10.00          10.01          10.00                        │
//! │  10.005      10.01          10.01          10.00                        │
//! │  -10.005     -10.01         -10.00         -10.01                       │
//! │                                                                         │
//! │  Always: DOWN <= HALF_UP <= UP                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The granularity is fixed at two decimals. A company setting for
//! "rounding decimals" exists in precio-config but is not applied here.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

/// Decimal places every rounding policy works at (cents).
pub const MONEY_DECIMALS: u32 = 2;

// =============================================================================
// Rounding Mode
// =============================================================================

/// How an amount is brought to cent precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Nearest cent, ties away from zero.
    #[default]
    HalfUp,
    /// Toward positive infinity.
    Up,
    /// Toward negative infinity.
    Down,
}

impl RoundingMode {
    /// All modes, in `DOWN <= HALF_UP <= UP` order of their results.
    pub const ALL: [RoundingMode; 3] = [RoundingMode::Down, RoundingMode::HalfUp, RoundingMode::Up];

    fn strategy(self) -> RoundingStrategy {
        match self {
            RoundingMode::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            RoundingMode::Up => RoundingStrategy::ToPositiveInfinity,
            RoundingMode::Down => RoundingStrategy::ToNegativeInfinity,
        }
    }
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundingMode::HalfUp => write!(f, "half_up"),
            RoundingMode::Up => write!(f, "up"),
            RoundingMode::Down => write!(f, "down"),
        }
    }
}

impl FromStr for RoundingMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "half_up" | "half-up" | "halfup" => Ok(RoundingMode::HalfUp),
            "up" | "ceil" => Ok(RoundingMode::Up),
            "down" | "floor" | "truncate" => Ok(RoundingMode::Down),
            other => Err(ValidationError::InvalidFormat {
                field: "rounding_mode".to_string(),
                reason: format!("unknown mode '{}', expected half_up, up or down", other),
            }),
        }
    }
}

// =============================================================================
// Rounding Function
// =============================================================================

/// Rounds `amount` to two decimals using `mode`.
///
/// Used for prices and, in inverse pricing, for the derived margin
/// percentage as well.
///
/// ## Example
/// ```rust
/// use precio_core::rounding::{apply_rounding, RoundingMode};
/// use rust_decimal_macros::dec;
///
/// assert_eq!(apply_rounding(dec!(159.715), RoundingMode::HalfUp), dec!(159.72));
/// assert_eq!(apply_rounding(dec!(159.711), RoundingMode::Up), dec!(159.72));
/// assert_eq!(apply_rounding(dec!(159.719), RoundingMode::Down), dec!(159.71));
/// ```
#[inline]
pub fn apply_rounding(amount: Decimal, mode: RoundingMode) -> Decimal {
    amount.round_dp_with_strategy(MONEY_DECIMALS, mode.strategy())
}

// =============================================================================
// Unit Tests
// =============================================================================
