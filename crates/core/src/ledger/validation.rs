//! Structural rules for candidate lines.

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{CandidateLine, EntrySide, EntryTotals};

/// Checks that exactly one side of a line is set and returns it.
///
/// # Errors
///
/// `NegativeAmount` if either side is below zero, `AmountOutOfRange` if
/// either side has fractions of a cent or exceeds [`MAX_AMOUNT`],
/// `BothSides` if both are non-zero, `NoSide` if both are zero.
///
/// [`MAX_AMOUNT`]: super::types::MAX_AMOUNT
pub fn validate_line(line: &CandidateLine) -> Result<(EntrySide, Decimal), LedgerError> {
    let debit = line.debit.value();
    let credit = line.credit.value();

    if debit < Decimal::ZERO || credit < Decimal::ZERO {
        return Err(LedgerError::NegativeAmount(line.account_id));
    }
    if !line.debit.is_storable() || !line.credit.is_storable() {
        return Err(LedgerError::AmountOutOfRange(line.account_id));
    }

    match (debit.is_zero(), credit.is_zero()) {
        (false, true) => Ok((EntrySide::Debit, debit)),
        (true, false) => Ok((EntrySide::Credit, credit)),
        (false, false) => Err(LedgerError::BothSides(line.account_id)),
        (true, true) => Err(LedgerError::NoSide(line.account_id)),
    }
}

/// Sums debits and credits of `lines` as written, saturating at the
/// `Decimal` bounds.
#[must_use]
pub fn entry_totals(lines: &[CandidateLine]) -> EntryTotals {
    lines.iter().fold(
        EntryTotals {
            total_debit: Decimal::ZERO,
            total_credit: Decimal::ZERO,
        },
        |acc, l| EntryTotals {
            total_debit: acc.total_debit.saturating_add(l.debit.value()),
            total_credit: acc.total_credit.saturating_add(l.credit.value()),
        },
    )
}

/// Requires debits to equal credits.
///
/// # Errors
///
/// Returns `LedgerError::Unbalanced` with both totals otherwise.
pub fn ensure_balanced(totals: &EntryTotals) -> Result<(), LedgerError> {
    if totals.is_balanced() {
        Ok(())
    } else {
        Err(LedgerError::Unbalanced {
            debit: totals.total_debit,
            credit: totals.total_credit,
        })
    }
}
