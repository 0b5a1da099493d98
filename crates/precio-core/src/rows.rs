//! # Price Rows
//!
//! Keeps several price tiers consistent with a shared cost basis and VAT
//! rate, honoring per-row locks.
//!
//! ## Lock Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Who May Change a Row                                 │
//! │                                                                         │
//! │  Trigger                         Unlocked row       Locked row          │
//! │  ───────                         ────────────       ──────────          │
//! │  Cost / internal tax edited      recalculated       untouched           │
//! │  VAT rate edited                 recalculated       untouched           │
//! │  Rounding mode changed           recalculated       untouched           │
//! │  User edits the row's margin     recalculated       recalculated        │
//! │  User edits the row's price      recalculated       recalculated        │
//! │  unlock_and_resync               recalculated       unlocked + resynced │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Shared-input changes are all-or-nothing: if any unlocked row cannot be
//! recalculated, no row is modified.

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing::{direct_pricing, inverse_pricing};
use crate::rounding::RoundingMode;
use crate::types::{CostBasis, Percent, PriceMode};

// =============================================================================
// Price Row
// =============================================================================

/// One priced tier (e.g. "List 1").
///
/// In [`PriceMode::Direct`] the margin is authoritative and the prices are
/// derived; in [`PriceMode::Inverse`] the final price is authoritative and
/// the margin is derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceRow {
    /// Display name of the tier.
    pub label: String,
    pub mode: PriceMode,
    pub margin_percent: Percent,
    /// Price including VAT.
    pub final_price: Money,
    /// Price before VAT.
    #[serde(default)]
    pub net_price: Money,
    /// Locked rows ignore shared-input changes.
    #[serde(default)]
    pub locked: bool,
}

impl PriceRow {
    /// A margin-driven row. Prices stay zero until recalculated.
    pub fn direct(label: impl Into<String>, margin: Percent) -> Self {
        PriceRow {
            label: label.into(),
            mode: PriceMode::Direct,
            margin_percent: margin,
            final_price: Money::zero(),
            net_price: Money::zero(),
            locked: false,
        }
    }

    /// A price-driven row. Margin stays zero until recalculated.
    pub fn inverse(label: impl Into<String>, final_price: Money) -> Self {
        PriceRow {
            label: label.into(),
            mode: PriceMode::Inverse,
            margin_percent: Percent::zero(),
            final_price,
            net_price: Money::zero(),
            locked: false,
        }
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    /// Clears the lock without recalculating; see [`PriceSheet::unlock_and_resync`].
    pub fn unlock(&mut self) {
        self.locked = false;
    }

    /// User edit of the margin: switches to direct mode and recomputes,
    /// even when the row is locked.
    ///
    /// On error the row is left exactly as it was.
    pub fn set_margin(
        &mut self,
        margin: Percent,
        basis: &CostBasis,
        vat: Percent,
        mode: RoundingMode,
    ) -> CoreResult<()> {
        let price = direct_pricing(basis, margin, vat, mode)?;
        self.mode = PriceMode::Direct;
        self.margin_percent = margin;
        self.net_price = price.net;
        self.final_price = price.final_price;
        Ok(())
    }

    /// User edit of the final price: switches to inverse mode and recomputes,
    /// even when the row is locked.
    ///
    /// On error the row is left exactly as it was.
    pub fn set_final_price(
        &mut self,
        final_price: Money,
        basis: &CostBasis,
        vat: Percent,
        mode: RoundingMode,
    ) -> CoreResult<()> {
        let derived = inverse_pricing(basis, final_price, vat, mode)?;
        self.mode = PriceMode::Inverse;
        self.final_price = final_price;
        self.margin_percent = derived.margin;
        self.net_price = derived.net;
        Ok(())
    }

    fn apply_direct(&mut self, basis: &CostBasis, vat: Percent, mode: RoundingMode) -> CoreResult<()> {
        let price = direct_pricing(basis, self.margin_percent, vat, mode)?;
        self.net_price = price.net;
        self.final_price = price.final_price;
        Ok(())
    }

    fn apply_inverse(&mut self, basis: &CostBasis, vat: Percent, mode: RoundingMode) -> CoreResult<()> {
        let derived = inverse_pricing(basis, self.final_price, vat, mode)?;
        self.margin_percent = derived.margin;
        self.net_price = derived.net;
        Ok(())
    }
}

// =============================================================================
// Recalculation
// =============================================================================

/// Recomputes one row from its authoritative field, ignoring its lock.
///
/// ## Errors
/// [`CoreError::NonPositiveBase`] for an inverse row over a non-positive
/// base, or any pricing error; the row is not modified in that case.
pub fn force_recalc(row: &mut PriceRow, basis: &CostBasis, vat: Percent, mode: RoundingMode) -> CoreResult<()> {
    match row.mode {
        PriceMode::Direct => row.apply_direct(basis, vat, mode),
        PriceMode::Inverse => row.apply_inverse(basis, vat, mode),
    }
}

/// Recomputes every unlocked row after a shared-input change.
///
/// Locked rows are skipped entirely. Returns how many rows were
/// recalculated.
///
/// ## Errors
/// [`CoreError::NonPositiveBase`] if an unlocked inverse row exists and the
/// base is not positive, or the first pricing error of any unlocked row.
/// Rows are computed before any is written, so no row changes on error.
///
/// ## Example
/// ```rust
/// use precio_core::rows::{recalculate_all, PriceRow};
/// use precio_core::{CostBasis, Percent, RoundingMode};
/// use rust_decimal_macros::dec;
///
/// let mut rows = vec![
///     PriceRow::direct("List 1", Percent::new(dec!(20))),
///     PriceRow::direct("List 2", Percent::new(dec!(15))),
/// ];
/// let vat = Percent::new(dec!(21));
/// recalculate_all(&mut rows, &CostBasis::new(dec!(100)), vat, RoundingMode::HalfUp).unwrap();
///
/// rows[1].lock();
/// let before = rows[1].clone();
/// let changed = recalculate_all(&mut rows, &CostBasis::new(dec!(120)), vat, RoundingMode::HalfUp).unwrap();
///
/// assert_eq!(changed, 1);
/// assert_eq!(rows[1], before);
/// ```
pub fn recalculate_all(
    rows: &mut [PriceRow],
    basis: &CostBasis,
    vat: Percent,
    mode: RoundingMode,
) -> CoreResult<usize> {
    let mut staged = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate().filter(|(_, row)| !row.locked) {
        let mut next = row.clone();
        force_recalc(&mut next, basis, vat, mode)?;
        staged.push((index, next));
    }

    let recalculated = staged.len();
    for (index, row) in staged {
        rows[index] = row;
    }

    debug!(
        recalculated,
        locked = rows.len() - recalculated,
        cost = %basis.cost,
        %vat,
        %mode,
        "Recalculated price rows"
    );
    Ok(recalculated)
}

// =============================================================================
// Price Sheet
// =============================================================================

/// A cost basis, VAT rate and rounding mode together with the rows priced
/// from them.
///
/// Every mutator keeps the sheet consistent: shared-input setters run
/// [`recalculate_all`] and only commit the new input if it succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceSheet {
    cost_basis: CostBasis,
    vat: Percent,
    #[serde(default)]
    rounding: RoundingMode,
    #[serde(default)]
    rows: Vec<PriceRow>,
}

impl PriceSheet {
    pub fn new(cost_basis: CostBasis, vat: Percent, rounding: RoundingMode) -> Self {
        PriceSheet {
            cost_basis,
            vat,
            rounding,
            rows: Vec::new(),
        }
    }

    pub fn cost_basis(&self) -> &CostBasis {
        &self.cost_basis
    }

    pub fn vat(&self) -> Percent {
        self.vat
    }

    pub fn rounding(&self) -> RoundingMode {
        self.rounding
    }

    pub fn rows(&self) -> &[PriceRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&PriceRow> {
        self.rows.get(index)
    }

    /// Appends a row, computing its derived fields. Returns its index.
    pub fn add_row(&mut self, mut row: PriceRow) -> CoreResult<usize> {
        force_recalc(&mut row, &self.cost_basis, self.vat, self.rounding)?;
        self.rows.push(row);
        Ok(self.rows.len() - 1)
    }

    /// Recalculates unlocked rows against the current inputs.
    pub fn recalculate(&mut self) -> CoreResult<usize> {
        recalculate_all(&mut self.rows, &self.cost_basis, self.vat, self.rounding)
    }

    pub fn set_cost_basis(&mut self, cost_basis: CostBasis) -> CoreResult<usize> {
        let count = recalculate_all(&mut self.rows, &cost_basis, self.vat, self.rounding)?;
        self.cost_basis = cost_basis;
        Ok(count)
    }

    pub fn set_vat(&mut self, vat: Percent) -> CoreResult<usize> {
        let count = recalculate_all(&mut self.rows, &self.cost_basis, vat, self.rounding)?;
        self.vat = vat;
        Ok(count)
    }

    pub fn set_rounding(&mut self, rounding: RoundingMode) -> CoreResult<usize> {
        let count = recalculate_all(&mut self.rows, &self.cost_basis, self.vat, rounding)?;
        self.rounding = rounding;
        Ok(count)
    }

    /// User edit of a row's margin. Allowed on locked rows.
    pub fn set_row_margin(&mut self, index: usize, margin: Percent) -> CoreResult<()> {
        let (basis, vat, mode) = (self.cost_basis, self.vat, self.rounding);
        self.row_mut(index)?.set_margin(margin, &basis, vat, mode)
    }

    /// User edit of a row's final price. Allowed on locked rows.
    pub fn set_row_final_price(&mut self, index: usize, final_price: Money) -> CoreResult<()> {
        let (basis, vat, mode) = (self.cost_basis, self.vat, self.rounding);
        self.row_mut(index)?.set_final_price(final_price, &basis, vat, mode)
    }

    pub fn lock_row(&mut self, index: usize) -> CoreResult<()> {
        self.row_mut(index)?.lock();
        Ok(())
    }

    /// Unlocks a row and brings it back in line with the current inputs.
    ///
    /// The lock is only cleared if the recalculation succeeds.
    pub fn unlock_and_resync(&mut self, index: usize) -> CoreResult<()> {
        let (basis, vat, mode) = (self.cost_basis, self.vat, self.rounding);
        let row = self.row_mut(index)?;
        force_recalc(row, &basis, vat, mode)?;
        row.unlock();
        Ok(())
    }

    fn row_mut(&mut self, index: usize) -> CoreResult<&mut PriceRow> {
        self.rows.get_mut(index).ok_or(CoreError::RowNotFound { index })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
