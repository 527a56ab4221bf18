//! Accounting equation calculator.
//!
//! Derives Assets, Liabilities and Equity from a set of candidate lines and
//! checks `Assets = Liabilities + Equity`. Pure and infallible; callers
//! recompute it after every edit of a candidate entry. Sums saturate at the
//! `Decimal` bounds instead of overflowing.

use rust_decimal::Decimal;
use serde::Serialize;

use super::types::{AccountType, CandidateLine};

/// Tolerance under which the equation counts as balanced.
pub const BALANCE_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 3);

/// Totals of the accounting equation for a set of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Equation {
    /// Net change to assets.
    pub assets: Decimal,
    /// Net change to liabilities.
    pub liabilities: Decimal,
    /// Net change to equity, revenue and expenses included.
    pub equity: Decimal,
    /// Whether `|assets - (liabilities + equity)| < 0.001`.
    pub is_balanced: bool,
    /// `assets - (liabilities + equity)`, signed.
    pub unbalanced_difference: Decimal,
}

impl Default for Equation {
    fn default() -> Self {
        Self::from_totals(Decimal::ZERO, Decimal::ZERO, Decimal::ZERO)
    }
}

impl Equation {
    fn from_totals(assets: Decimal, liabilities: Decimal, equity: Decimal) -> Self {
        let unbalanced_difference = assets.saturating_sub(liabilities.saturating_add(equity));
        Self {
            assets,
            liabilities,
            equity,
            is_balanced: unbalanced_difference.abs() < BALANCE_EPSILON,
            unbalanced_difference,
        }
    }
}

/// Which equation bucket a line lands in, and its signed contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contribution {
    /// Adds to assets.
    Assets(Decimal),
    /// Adds to liabilities.
    Liabilities(Decimal),
    /// Adds to equity.
    Equity(Decimal),
}

/// Signed contribution of one line, or `None` if its type is unrecognised.
#[must_use]
pub fn contribution(line: &CandidateLine) -> Option<Contribution> {
    let debit = line.debit.value();
    let credit = line.credit.value();

    line.kind().map(|kind| match kind {
        AccountType::Asset => Contribution::Assets(debit.saturating_sub(credit)),
        AccountType::Liability => Contribution::Liabilities(credit.saturating_sub(debit)),
        AccountType::Equity | AccountType::Revenue => {
            Contribution::Equity(credit.saturating_sub(debit))
        }
        AccountType::Expense => Contribution::Equity(-(debit.saturating_sub(credit))),
    })
}

/// Computes the accounting equation over `lines`.
///
/// Lines with an unrecognised account type contribute nothing. Amounts
/// that could not be read are already zero by the time they get here.
#[must_use]
pub fn compute_equation(lines: &[CandidateLine]) -> Equation {
    let mut assets = Decimal::ZERO;
    let mut liabilities = Decimal::ZERO;
    let mut equity = Decimal::ZERO;

    for c in lines.iter().filter_map(contribution) {
        match c {
            Contribution::Assets(v) => assets = assets.saturating_add(v),
            Contribution::Liabilities(v) => liabilities = liabilities.saturating_add(v),
            Contribution::Equity(v) => equity = equity.saturating_add(v),
        }
    }

    Equation::from_totals(assets, liabilities, equity)
}
