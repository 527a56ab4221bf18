//! Edits a reviewer can apply to a candidate entry.
//!
//! Every edit recomputes the entry totals so `total_debit` and
//! `total_credit` always equal the sums of the lines.

use rust_decimal::Decimal;
use serde::Deserialize;

use super::equation::{Equation, compute_equation};
use super::types::{Amount, CandidateEntry, ChartAccount, EntrySide};
use super::validation::entry_totals;
use ringbook_shared::AppError;
use ringbook_shared::types::AccountId;

/// A single reviewer edit, addressed by line index.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CandidateEdit {
    /// Point a line at another account.
    ReassignAccount {
        /// Line index.
        line: usize,
        /// New account id.
        account_id: AccountId,
    },
    /// Replace the amount on a line, keeping its side.
    SetAmount {
        /// Line index.
        line: usize,
        /// New amount; unreadable input becomes zero.
        amount: Amount,
    },
    /// Move a line's amount to the other side.
    FlipSide {
        /// Line index.
        line: usize,
    },
    /// Remove a line.
    RemoveLine {
        /// Line index.
        line: usize,
    },
}

/// Errors from editing a candidate.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EditError {
    /// Line index out of range.
    #[error("line {0} does not exist")]
    NoSuchLine(usize),

    /// Target account is not in the chart.
    #[error("Account not found: {0}")]
    UnknownAccount(AccountId),
}

impl From<EditError> for AppError {
    fn from(err: EditError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl CandidateEntry {
    /// Sets `total_debit`/`total_credit` from the lines.
    pub fn recompute_totals(&mut self) {
        let totals = entry_totals(&self.entries);
        self.total_debit = Amount(totals.total_debit);
        self.total_credit = Amount(totals.total_credit);
    }

    /// Accounting equation over the current lines.
    #[must_use]
    pub fn equation(&self) -> Equation {
        compute_equation(&self.entries)
    }

    /// Applies one edit.
    ///
    /// # Errors
    ///
    /// `NoSuchLine` if the index is out of range, `UnknownAccount` when
    /// reassigning to an account missing from `chart`.
    pub fn apply(&mut self, edit: &CandidateEdit, chart: &[ChartAccount]) -> Result<(), EditError> {
        match edit {
            CandidateEdit::ReassignAccount { line, account_id } => {
                let account = chart
                    .iter()
                    .find(|a| a.account_id == *account_id)
                    .ok_or(EditError::UnknownAccount(*account_id))?;
                self.reassign_account(*line, account)
            }
            CandidateEdit::SetAmount { line, amount } => self.set_amount(*line, amount.value()),
            CandidateEdit::FlipSide { line } => self.flip_side(*line).map(|_| ()),
            CandidateEdit::RemoveLine { line } => self.remove_line(*line),
        }
    }

    /// Points line `index` at `account`, copying its name and type.
    pub fn reassign_account(&mut self, index: usize, account: &ChartAccount) -> Result<(), EditError> {
        let line = self.entries.get_mut(index).ok_or(EditError::NoSuchLine(index))?;
        line.account_id = account.account_id;
        line.account_name.clone_from(&account.name);
        line.account_type = account.account_type.as_str().to_string();
        Ok(())
    }

    /// Replaces the amount of line `index` on its current side.
    ///
    /// A line with neither side set is treated as a debit.
    pub fn set_amount(&mut self, index: usize, amount: Decimal) -> Result<(), EditError> {
        let line = self.entries.get_mut(index).ok_or(EditError::NoSuchLine(index))?;
        if line.credit.is_zero() {
            line.debit = Amount(amount);
        } else {
            line.credit = Amount(amount);
        }
        self.recompute_totals();
        Ok(())
    }

    /// Swaps the debit and credit amounts of line `index`.
    pub fn flip_side(&mut self, index: usize) -> Result<EntrySide, EditError> {
        let line = self.entries.get_mut(index).ok_or(EditError::NoSuchLine(index))?;
        std::mem::swap(&mut line.debit, &mut line.credit);
        let side = if line.credit.is_zero() {
            EntrySide::Debit
        } else {
            EntrySide::Credit
        };
        self.recompute_totals();
        Ok(side)
    }

    /// Removes line `index`.
    pub fn remove_line(&mut self, index: usize) -> Result<(), EditError> {
        if index >= self.entries.len() {
            return Err(EditError::NoSuchLine(index));
        }
        self.entries.remove(index);
        self.recompute_totals();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::{AccountType, CandidateLine, NormalBalance};
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn chart() -> Vec<ChartAccount> {
        vec![
            ChartAccount {
                account_id: AccountId(1),
                name: "HSBC".into(),
                account_type: AccountType::Asset,
                normal_balance: NormalBalance::Debit,
            },
            ChartAccount {
                account_id: AccountId(5),
                name: "Credit-Card".into(),
                account_type: AccountType::Liability,
                normal_balance: NormalBalance::Credit,
            },
            ChartAccount {
                account_id: AccountId(12),
                name: "Meal".into(),
                account_type: AccountType::Expense,
                normal_balance: NormalBalance::Debit,
            },
        ]
    }

    fn lunch() -> CandidateEntry {
        let mut entry = CandidateEntry {
            date: NaiveDate::from_ymd_opt(2026, 4, 2).unwrap(),
            description: "Team lunch".into(),
            entries: vec![
                CandidateLine::debit(AccountId(12), AccountType::Expense, dec!(60)).named("Meal"),
                CandidateLine::credit(AccountId(1), AccountType::Asset, dec!(60)).named("HSBC"),
            ],
            total_debit: Amount::ZERO,
            total_credit: Amount::ZERO,
        };
        entry.recompute_totals();
        entry
    }

    #[test]
    fn test_reassign_to_credit_card() {
        let mut entry = lunch();
        entry
            .apply(
                &CandidateEdit::ReassignAccount {
                    line: 1,
                    account_id: AccountId(5),
                },
                &chart(),
            )
            .unwrap();

        let line = &entry.entries[1];
        assert_eq!(line.account_id, AccountId(5));
        assert_eq!(line.account_name, "Credit-Card");
        assert_eq!(line.kind(), Some(AccountType::Liability));
        assert!(entry.equation().is_balanced);
        assert_eq!(entry.equation().liabilities, dec!(60));
    }

    #[test]
    fn test_reassign_unknown_account_rejected() {
        let mut entry = lunch();
        let err = entry
            .apply(
                &CandidateEdit::ReassignAccount {
                    line: 0,
                    account_id: AccountId(99),
                },
                &chart(),
            )
            .unwrap_err();
        assert_eq!(err, EditError::UnknownAccount(AccountId(99)));
        assert_eq!(entry, lunch());
    }

    #[test]
    fn test_set_amount_keeps_side_and_updates_totals() {
        let mut entry = lunch();
        entry.set_amount(1, dec!(45)).unwrap();

        assert_eq!(entry.entries[1].credit.value(), dec!(45));
        assert!(entry.entries[1].debit.is_zero());
        assert_eq!(entry.total_credit.value(), dec!(45));
        assert_eq!(entry.total_debit.value(), dec!(60));
        assert!(!entry.equation().is_balanced);
    }

    #[test]
    fn test_flip_side() {
        let mut entry = lunch();
        assert_eq!(entry.flip_side(0).unwrap(), EntrySide::Credit);
        assert_eq!(entry.entries[0].credit.value(), dec!(60));
        assert_eq!(entry.total_debit.value(), dec!(0));
        assert_eq!(entry.total_credit.value(), dec!(120));
    }

    #[test]
    fn test_out_of_range() {
        let mut entry = lunch();
        assert_eq!(entry.flip_side(7), Err(EditError::NoSuchLine(7)));
        assert_eq!(entry.remove_line(2), Err(EditError::NoSuchLine(2)));
        entry.remove_line(1).unwrap();
        assert_eq!(entry.entries.len(), 1);
        assert_eq!(entry.total_credit.value(), dec!(0));
    }

    #[test]
    fn test_edit_deserializes_from_json() {
        let edit: CandidateEdit =
            serde_json::from_str(r#"{"op": "set_amount", "line": 0, "amount": "12.30"}"#).unwrap();
        assert_eq!(
            edit,
            CandidateEdit::SetAmount {
                line: 0,
                amount: Amount(dec!(12.30)),
            }
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Totals always equal line sums after any edit sequence.
        #[test]
        fn prop_totals_track_lines(
            ops in prop::collection::vec((0usize..3, 0usize..3, 0i64..100_000), 0..15),
        ) {
            let mut entry = lunch();
            for (op, idx, cents) in ops {
                let _ = match op {
                    0 => entry.set_amount(idx, Decimal::new(cents, 2)).map(|_| ()),
                    1 => entry.flip_side(idx).map(|_| ()),
                    _ => entry.reassign_account(idx, &chart()[idx % 3]),
                };
                let totals = entry_totals(&entry.entries);
                prop_assert_eq!(entry.total_debit.value(), totals.total_debit);
                prop_assert_eq!(entry.total_credit.value(), totals.total_credit);
            }
        }
    }
}
