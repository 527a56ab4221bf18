//! Ledger domain types.
//!
//! Candidate entries are the transient, model-generated or user-edited
//! journal entries that precede posting. Their JSON shape is camelCase and
//! deliberately lenient about amounts so that a sloppy model reply or a
//! half-typed form never fails to load.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use ringbook_shared::types::AccountId;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Decimal places kept for amounts, matching the `NUMERIC(12,2)` columns.
pub const AMOUNT_SCALE: u32 = 2;

/// Largest amount a journal line or account balance can hold.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, AMOUNT_SCALE);

/// The five account classifications of the chart of accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    /// Resources owned.
    Asset,
    /// Obligations owed.
    Liability,
    /// Owner's stake.
    Equity,
    /// Income earned.
    Revenue,
    /// Costs incurred.
    Expense,
}

impl AccountType {
    /// Canonical name as stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "Asset",
            Self::Liability => "Liability",
            Self::Equity => "Equity",
            Self::Revenue => "Revenue",
            Self::Expense => "Expense",
        }
    }

    /// Side on which accounts of this type normally increase.
    #[must_use]
    pub const fn default_normal_balance(self) -> NormalBalance {
        match self {
            Self::Asset | Self::Expense => NormalBalance::Debit,
            Self::Liability | Self::Equity | Self::Revenue => NormalBalance::Credit,
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the five account types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown account type: {0}")]
pub struct UnknownAccountType(pub String);

impl FromStr for AccountType {
    type Err = UnknownAccountType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asset" | "assets" => Ok(Self::Asset),
            "liability" | "liabilities" => Ok(Self::Liability),
            "equity" => Ok(Self::Equity),
            "revenue" | "income" => Ok(Self::Revenue),
            "expense" | "expenses" => Ok(Self::Expense),
            _ => Err(UnknownAccountType(s.to_string())),
        }
    }
}

/// Normal balance side of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalBalance {
    /// Debits increase the balance.
    Debit,
    /// Credits increase the balance.
    Credit,
}

impl NormalBalance {
    /// Database enum label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }
}

/// Side of a journal line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySide {
    /// Debit line.
    Debit,
    /// Credit line.
    Credit,
}

impl EntrySide {
    /// Returns the opposite side.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Debit => Self::Credit,
            Self::Credit => Self::Debit,
        }
    }

    /// Whether this is the credit side.
    #[must_use]
    pub const fn is_credit(self) -> bool {
        matches!(self, Self::Credit)
    }
}

/// A monetary amount that tolerates malformed input.
///
/// Deserializes from JSON numbers, numeric strings, `null`, or anything
/// else; whatever cannot be read as a number becomes zero. Parsed amounts
/// are rounded to cents, half away from zero. Serializes as a JSON number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(pub Decimal);

impl Amount {
    /// The zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Returns the inner decimal.
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }

    /// Whether the amount is exactly zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// Parses user or model text; non-numeric text yields zero.
    #[must_use]
    pub fn parse_lenient(text: &str) -> Self {
        let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
        Decimal::from_str(&cleaned)
            .or_else(|_| Decimal::from_scientific(&cleaned))
            .map_or(Self::ZERO, Self::to_cents)
    }

    /// Rounds `value` to cents.
    #[must_use]
    pub fn to_cents(value: Decimal) -> Self {
        Self(value.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Whether the amount fits the storage columns: at most two decimal
    /// places and no larger in magnitude than [`MAX_AMOUNT`].
    #[must_use]
    pub fn is_storable(self) -> bool {
        self.0.abs() <= MAX_AMOUNT && self.0.normalize().scale() <= AMOUNT_SCALE
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let text = self.0.normalize().to_string();
        match serde_json::Number::from_str(&text) {
            Ok(number) => number.serialize(serializer),
            Err(_) => serializer.serialize_str(&text),
        }
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match value {
            serde_json::Value::Number(n) => Self::parse_lenient(&n.to_string()),
            serde_json::Value::String(s) => Self::parse_lenient(&s),
            _ => Self::ZERO,
        })
    }
}

/// One line of a candidate entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateLine {
    /// Referenced account.
    pub account_id: AccountId,
    /// Account display name.
    #[serde(default)]
    pub account_name: String,
    /// Account type as text; unrecognised values are kept verbatim.
    #[serde(default)]
    pub account_type: String,
    /// Debit amount.
    #[serde(default)]
    pub debit: Amount,
    /// Credit amount.
    #[serde(default)]
    pub credit: Amount,
}

impl CandidateLine {
    /// Creates a debit line.
    #[must_use]
    pub fn debit(account_id: AccountId, account_type: AccountType, amount: Decimal) -> Self {
        Self {
            account_id,
            account_name: String::new(),
            account_type: account_type.as_str().to_string(),
            debit: Amount(amount),
            credit: Amount::ZERO,
        }
    }

    /// Creates a credit line.
    #[must_use]
    pub fn credit(account_id: AccountId, account_type: AccountType, amount: Decimal) -> Self {
        Self {
            account_id,
            account_name: String::new(),
            account_type: account_type.as_str().to_string(),
            debit: Amount::ZERO,
            credit: Amount(amount),
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.account_name = name.into();
        self
    }

    /// Parsed account type, if recognised.
    #[must_use]
    pub fn kind(&self) -> Option<AccountType> {
        self.account_type.parse().ok()
    }
}

/// A journal entry awaiting review and posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateEntry {
    /// Transaction date.
    pub date: NaiveDate,
    /// Transaction description.
    #[serde(default)]
    pub description: String,
    /// Journal lines in display order.
    #[serde(default)]
    pub entries: Vec<CandidateLine>,
    /// Sum of debit amounts.
    #[serde(default)]
    pub total_debit: Amount,
    /// Sum of credit amounts.
    #[serde(default)]
    pub total_credit: Amount,
}

/// A chart of accounts entry as seen by validation and the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartAccount {
    /// Account identifier.
    pub account_id: AccountId,
    /// Account name.
    pub name: String,
    /// Account type.
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// Normal balance side.
    pub normal_balance: NormalBalance,
}

/// A validated line ready to be written as a journal line row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLine {
    /// Referenced account.
    pub account_id: AccountId,
    /// Non-negative amount.
    pub amount: Decimal,
    /// Whether the line is on the credit side.
    pub is_credit: bool,
}

/// Net balance adjustment for one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceDelta {
    /// The account to adjust.
    pub account_id: AccountId,
    /// Signed amount to add to the stored balance.
    pub delta: Decimal,
}

/// Debit and credit totals of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryTotals {
    /// Sum of debits.
    pub total_debit: Decimal,
    /// Sum of credits.
    pub total_credit: Decimal,
}

impl EntryTotals {
    /// Whether debits equal credits.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.total_debit == self.total_credit
    }

    /// Debits minus credits.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.total_debit - self.total_credit
    }
}

/// Everything the writer needs to post a candidate.
///
/// `deltas` is sorted by account id and holds one entry per affected
/// account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostingPlan {
    /// Lines in candidate order.
    pub lines: Vec<ResolvedLine>,
    /// Per-account balance adjustments.
    pub deltas: Vec<BalanceDelta>,
    /// Entry totals.
    pub totals: EntryTotals,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case("Asset", Some(AccountType::Asset))]
    #[case(" revenue ", Some(AccountType::Revenue))]
    #[case("LIABILITY", Some(AccountType::Liability))]
    #[case("Income", Some(AccountType::Revenue))]
    #[case("Contra", None)]
    #[case("", None)]
    fn test_account_type_parse(#[case] input: &str, #[case] expected: Option<AccountType>) {
        assert_eq!(input.parse::<AccountType>().ok(), expected);
    }

    #[test]
    fn test_default_normal_balance() {
        assert_eq!(AccountType::Asset.default_normal_balance(), NormalBalance::Debit);
        assert_eq!(AccountType::Expense.default_normal_balance(), NormalBalance::Debit);
        assert_eq!(AccountType::Liability.default_normal_balance(), NormalBalance::Credit);
        assert_eq!(AccountType::Equity.default_normal_balance(), NormalBalance::Credit);
        assert_eq!(AccountType::Revenue.default_normal_balance(), NormalBalance::Credit);
    }

    #[rstest]
    #[case(r#"{"a": 100}"#, dec!(100))]
    #[case(r#"{"a": 12.5}"#, dec!(12.5))]
    #[case(r#"{"a": "1,250.75"}"#, dec!(1250.75))]
    #[case(r#"{"a": "abc"}"#, dec!(0))]
    #[case(r#"{"a": null}"#, dec!(0))]
    #[case(r#"{"a": true}"#, dec!(0))]
    #[case(r#"{"a": [1]}"#, dec!(0))]
    #[case(r#"{"a": 1e3}"#, dec!(1000))]
    #[case(r#"{"a": 0.005}"#, dec!(0.01))]
    #[case(r#"{"a": "12.344"}"#, dec!(12.34))]
    #[case(r#"{"a": "-0.005"}"#, dec!(-0.01))]
    fn test_amount_is_lenient(#[case] json: &str, #[case] expected: Decimal) {
        #[derive(Deserialize)]
        struct Wrapper {
            a: Amount,
        }
        let w: Wrapper = serde_json::from_str(json).unwrap();
        assert_eq!(w.a.value(), expected);
    }

    #[rstest]
    #[case(dec!(0.01), true)]
    #[case(dec!(12.50), true)]
    #[case(dec!(9999999999.99), true)]
    #[case(dec!(10000000000), false)]
    #[case(dec!(0.005), false)]
    #[case(Decimal::MAX, false)]
    fn test_amount_is_storable(#[case] value: Decimal, #[case] expected: bool) {
        assert_eq!(Amount(value).is_storable(), expected);
    }

    #[test]
    fn test_max_amount_matches_column() {
        assert_eq!(MAX_AMOUNT, dec!(9999999999.99));
    }

    #[test]
    fn test_huge_amount_is_kept_for_validation() {
        let amount: Amount = serde_json::from_str(r#""79228162514264337593543950335""#).unwrap();
        assert_eq!(amount.value(), Decimal::MAX);
        assert!(!amount.is_storable());
    }

    #[test]
    fn test_amount_serializes_as_number() {
        let json = serde_json::to_value(Amount(dec!(100.50))).unwrap();
        assert_eq!(json, serde_json::json!(100.5));
    }

    #[test]
    fn test_candidate_entry_camel_case() {
        let json = r#"{
            "date": "2026-03-01",
            "description": "Sold goods for cash",
            "entries": [
                {"accountId": 1, "accountName": "HSBC", "accountType": "Asset", "debit": 100, "credit": 0},
                {"accountId": 8, "accountName": "Sales", "accountType": "Revenue", "debit": 0, "credit": "100"}
            ],
            "totalDebit": 100,
            "totalCredit": 100
        }"#;

        let entry: CandidateEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.entries.len(), 2);
        assert_eq!(entry.entries[0].account_id, AccountId(1));
        assert_eq!(entry.entries[1].credit.value(), dec!(100));
        assert_eq!(entry.entries[1].kind(), Some(AccountType::Revenue));

        let back = serde_json::to_value(&entry).unwrap();
        assert_eq!(back["entries"][0]["accountName"], "HSBC");
        assert_eq!(back["totalCredit"], serde_json::json!(100));
    }

    #[test]
    fn test_missing_line_fields_default() {
        let line: CandidateLine = serde_json::from_str(r#"{"accountId": 3}"#).unwrap();
        assert!(line.debit.is_zero());
        assert!(line.credit.is_zero());
        assert_eq!(line.kind(), None);
    }
}
