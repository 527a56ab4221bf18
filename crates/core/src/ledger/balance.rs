//! Running account balance rules.
//!
//! A line on the same side as the account's normal balance increases the
//! stored balance; a line on the opposite side decreases it.

use rust_decimal::Decimal;

use super::types::{EntrySide, NormalBalance};

impl NormalBalance {
    /// Signed change to the stored balance for a line of `amount` on `side`.
    #[must_use]
    pub fn balance_delta(self, side: EntrySide, amount: Decimal) -> Decimal {
        match (self, side) {
            (Self::Debit, EntrySide::Debit) | (Self::Credit, EntrySide::Credit) => amount,
            (Self::Debit, EntrySide::Credit) | (Self::Credit, EntrySide::Debit) => -amount,
        }
    }

    /// Net balance change for combined debit and credit totals.
    ///
    /// - Debit-normal: `debit - credit`
    /// - Credit-normal: `credit - debit`
    #[must_use]
    pub fn calculate_balance_change(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::Debit => debit - credit,
            Self::Credit => credit - debit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    fn side_strategy() -> impl Strategy<Value = EntrySide> {
        prop_oneof![Just(EntrySide::Debit), Just(EntrySide::Credit)]
    }

    fn normal_strategy() -> impl Strategy<Value = NormalBalance> {
        prop_oneof![Just(NormalBalance::Debit), Just(NormalBalance::Credit)]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Flipping a line's side negates its effect.
        #[test]
        fn prop_flip_negates_delta(
            normal in normal_strategy(),
            side in side_strategy(),
            amount in amount_strategy(),
        ) {
            prop_assert_eq!(
                normal.balance_delta(side, amount),
                -normal.balance_delta(side.flipped(), amount)
            );
        }

        /// Summing per-line deltas equals the net change of the totals.
        #[test]
        fn prop_line_deltas_sum_to_net_change(
            normal in normal_strategy(),
            lines in prop::collection::vec((side_strategy(), amount_strategy()), 0..20),
        ) {
            let per_line: Decimal = lines
                .iter()
                .map(|(side, amount)| normal.balance_delta(*side, *amount))
                .sum();
            let debit: Decimal = lines
                .iter()
                .filter(|(s, _)| *s == EntrySide::Debit)
                .map(|(_, a)| *a)
                .sum();
            let credit: Decimal = lines
                .iter()
                .filter(|(s, _)| *s == EntrySide::Credit)
                .map(|(_, a)| *a)
                .sum();

            prop_assert_eq!(per_line, normal.calculate_balance_change(debit, credit));
        }
    }

    #[test]
    fn test_debit_normal_balance_change() {
        let normal = NormalBalance::Debit;

        assert_eq!(normal.balance_delta(EntrySide::Debit, dec!(100)), dec!(100));
        assert_eq!(normal.balance_delta(EntrySide::Credit, dec!(50)), dec!(-50));
        assert_eq!(normal.calculate_balance_change(dec!(100), dec!(30)), dec!(70));
    }

    #[test]
    fn test_credit_normal_balance_change() {
        let normal = NormalBalance::Credit;

        assert_eq!(normal.balance_delta(EntrySide::Credit, dec!(100)), dec!(100));
        assert_eq!(normal.balance_delta(EntrySide::Debit, dec!(50)), dec!(-50));
        assert_eq!(normal.calculate_balance_change(dec!(30), dec!(100)), dec!(70));
    }
}
