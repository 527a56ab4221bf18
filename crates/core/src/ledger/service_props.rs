//! Property-based tests for LedgerService posting plans.
//!
//! - Every line is resolved exactly once, in order
//! - Per-account deltas follow the normal-balance rule
//! - Deltas are sorted and unique per account
//! - An unknown account anywhere rejects the whole entry

use chrono::NaiveDate;
use proptest::prelude::*;
use ringbook_shared::types::AccountId;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::service::{AccountInfo, LedgerService};
use super::types::{AccountType, Amount, CandidateEntry, CandidateLine, NormalBalance};

/// Chart used by every property: ids 1..=10, odd ids debit-normal.
fn lookup(id: AccountId) -> Option<AccountInfo> {
    if !(1..=10).contains(&id.0) {
        return None;
    }
    let (account_type, normal_balance) = if id.0 % 2 == 1 {
        (AccountType::Asset, NormalBalance::Debit)
    } else {
        (AccountType::Liability, NormalBalance::Credit)
    };
    Some(AccountInfo {
        id,
        account_type,
        normal_balance,
    })
}

/// Strategy to generate positive decimal amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for a valid line against the chart above.
fn valid_line() -> impl Strategy<Value = CandidateLine> {
    (1i32..=10, positive_amount(), any::<bool>()).prop_map(|(id, amount, credit)| {
        let account_type = lookup(AccountId(id)).map_or(AccountType::Asset, |a| a.account_type);
        if credit {
            CandidateLine::credit(AccountId(id), account_type, amount)
        } else {
            CandidateLine::debit(AccountId(id), account_type, amount)
        }
    })
}

fn make_entry(entries: Vec<CandidateLine>) -> CandidateEntry {
    CandidateEntry {
        date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
        description: "Property test".to_string(),
        entries,
        total_debit: Amount::ZERO,
        total_credit: Amount::ZERO,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_every_line_resolved_in_order(lines in prop::collection::vec(valid_line(), 1..15)) {
        let plan = LedgerService::plan_posting(&make_entry(lines.clone()), lookup).unwrap();

        prop_assert_eq!(plan.lines.len(), lines.len());
        for (resolved, line) in plan.lines.iter().zip(&lines) {
            prop_assert_eq!(resolved.account_id, line.account_id);
            prop_assert_eq!(resolved.is_credit, !line.credit.is_zero());
            prop_assert_eq!(resolved.amount, line.debit.value() + line.credit.value());
        }
    }

    #[test]
    fn prop_deltas_follow_normal_balance(lines in prop::collection::vec(valid_line(), 1..15)) {
        let plan = LedgerService::plan_posting(&make_entry(lines.clone()), lookup).unwrap();

        for delta in &plan.deltas {
            let normal = lookup(delta.account_id).unwrap().normal_balance;
            let on_account = lines.iter().filter(|l| l.account_id == delta.account_id);
            let (debit, credit) = on_account.fold((Decimal::ZERO, Decimal::ZERO), |(d, c), l| {
                (d + l.debit.value(), c + l.credit.value())
            });
            prop_assert_eq!(delta.delta, normal.calculate_balance_change(debit, credit));
        }
    }

    #[test]
    fn prop_deltas_sorted_and_unique(lines in prop::collection::vec(valid_line(), 1..15)) {
        let plan = LedgerService::plan_posting(&make_entry(lines.clone()), lookup).unwrap();

        for pair in plan.deltas.windows(2) {
            prop_assert!(pair[0].account_id < pair[1].account_id);
        }
        let mut touched: Vec<AccountId> = lines.iter().map(|l| l.account_id).collect();
        touched.sort();
        touched.dedup();
        prop_assert_eq!(plan.deltas.len(), touched.len());
    }

    #[test]
    fn prop_totals_match_lines(lines in prop::collection::vec(valid_line(), 1..15)) {
        let plan = LedgerService::plan_posting(&make_entry(lines.clone()), lookup).unwrap();

        let debit: Decimal = lines.iter().map(|l| l.debit.value()).sum();
        let credit: Decimal = lines.iter().map(|l| l.credit.value()).sum();
        prop_assert_eq!(plan.totals.total_debit, debit);
        prop_assert_eq!(plan.totals.total_credit, credit);
    }

    #[test]
    fn prop_unknown_account_rejects_entry(
        mut lines in prop::collection::vec(valid_line(), 1..10),
        position in any::<prop::sample::Index>(),
        bad_id in 11i32..1000,
    ) {
        let idx = position.index(lines.len());
        lines[idx].account_id = AccountId(bad_id);

        let result = LedgerService::plan_posting(&make_entry(lines), lookup);
        prop_assert!(matches!(result, Err(LedgerError::UnknownAccount(id)) if id == AccountId(bad_id)));
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_unknown_account_checked_before_amounts() {
        let mut line = CandidateLine::debit(AccountId(99), AccountType::Asset, dec!(10));
        line.credit = Amount(dec!(10));

        let result = LedgerService::plan_posting(&make_entry(vec![line]), lookup);
        assert!(matches!(result, Err(LedgerError::UnknownAccount(AccountId(99)))));
    }
}
