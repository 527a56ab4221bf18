//! Ledger service for posting validation.
//!
//! Turns a reviewed candidate entry into a [`PostingPlan`]: the journal
//! line rows to insert and the per-account balance adjustments. Pure; the
//! database layer supplies account lookups and executes the plan inside
//! one transaction.

use std::collections::BTreeMap;

use ringbook_shared::types::AccountId;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{
    AccountType, BalanceDelta, CandidateEntry, EntryTotals, NormalBalance, PostingPlan,
    ResolvedLine,
};
use super::validation::validate_line;

/// Information about an account needed for validation.
#[derive(Debug, Clone, Copy)]
pub struct AccountInfo {
    /// The account ID.
    pub id: AccountId,
    /// Account classification.
    pub account_type: AccountType,
    /// Side on which the stored balance increases.
    pub normal_balance: NormalBalance,
}

/// Ledger service for posting validation.
pub struct LedgerService;

impl LedgerService {
    /// Validates `entry` and builds its posting plan.
    ///
    /// Checks, in order, for every line:
    /// 1. The account exists (via `account_lookup`)
    /// 2. Amounts are non-negative and storable
    /// 3. Exactly one of debit/credit is set
    ///
    /// Balance of debits against credits is not checked here.
    ///
    /// # Errors
    ///
    /// Returns the first `LedgerError` validation variant encountered.
    pub fn plan_posting<A>(entry: &CandidateEntry, account_lookup: A) -> Result<PostingPlan, LedgerError>
    where
        A: Fn(AccountId) -> Option<AccountInfo>,
    {
        if entry.entries.is_empty() {
            return Err(LedgerError::EmptyEntry);
        }

        let mut lines = Vec::with_capacity(entry.entries.len());
        let mut deltas: BTreeMap<AccountId, Decimal> = BTreeMap::new();
        let mut totals = EntryTotals {
            total_debit: Decimal::ZERO,
            total_credit: Decimal::ZERO,
        };

        for line in &entry.entries {
            let account =
                account_lookup(line.account_id).ok_or(LedgerError::UnknownAccount(line.account_id))?;
            let (side, amount) = validate_line(line)?;
            let overflow = || LedgerError::AmountOutOfRange(line.account_id);

            let total = if side.is_credit() {
                &mut totals.total_credit
            } else {
                &mut totals.total_debit
            };
            *total = total.checked_add(amount).ok_or_else(overflow)?;

            let delta = deltas.entry(account.id).or_default();
            *delta = delta
                .checked_add(account.normal_balance.balance_delta(side, amount))
                .ok_or_else(overflow)?;

            lines.push(ResolvedLine {
                account_id: account.id,
                amount,
                is_credit: side.is_credit(),
            });
        }

        Ok(PostingPlan {
            lines,
            deltas: deltas
                .into_iter()
                .map(|(account_id, delta)| BalanceDelta { account_id, delta })
                .collect(),
            totals,
        })
    }
}
