//! Candidate entry generation with a single repair pass.

use std::time::Duration;

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use super::error::GenerationError;
use super::model::{ChatModel, ChatRequest};
use super::parser::parse_candidate;
use super::prompt::{repair_request, system_prompt, user_content};
use crate::attachment::PreparedAttachments;
use crate::ledger::{CandidateEntry, ChartAccount, validate_line};

/// Generates candidate entries with a chat model.
#[derive(Debug, Clone)]
pub struct EntryGenerator<M> {
    model: M,
    timeout: Duration,
}

impl<M: ChatModel> EntryGenerator<M> {
    /// Wraps `model`; each generation, repair included, is bounded by `timeout`.
    pub fn new(model: M, timeout: Duration) -> Self {
        Self { model, timeout }
    }

    /// Generates a candidate entry for `description`.
    ///
    /// The result references only accounts in `chart`, has exactly one side
    /// set per line and totals equal to its line sums. It may be unbalanced.
    ///
    /// # Errors
    ///
    /// Any [`GenerationError`]; no partial candidate is returned.
    pub async fn generate_entry(
        &self,
        chart: &[ChartAccount],
        description: &str,
        attachments: &PreparedAttachments,
    ) -> Result<CandidateEntry, GenerationError> {
        let today = Utc::now().date_naive();
        let entry = tokio::time::timeout(
            self.timeout,
            self.generate_unchecked(chart, description, attachments, today),
        )
        .await
        .map_err(|_| GenerationError::Timeout(self.timeout))??;

        let entry = normalize(entry, chart, description)?;
        info!(
            lines = entry.entries.len(),
            balanced = entry.equation().is_balanced,
            "Generated candidate entry"
        );
        Ok(entry)
    }

    async fn generate_unchecked(
        &self,
        chart: &[ChartAccount],
        description: &str,
        attachments: &PreparedAttachments,
        today: NaiveDate,
    ) -> Result<CandidateEntry, GenerationError> {
        let request = ChatRequest {
            system: system_prompt(chart, today),
            content: user_content(description, attachments),
        };
        let reply = self.model.complete(request).await?;

        match parse_candidate(&reply) {
            Ok(entry) => Ok(entry),
            Err(problem) => {
                warn!(problem = %problem, "Malformed model output, attempting repair");
                let repaired = self.model.complete(repair_request(&reply, &problem)).await?;
                parse_candidate(&repaired).map_err(GenerationError::InvalidOutput)
            }
        }
    }
}

/// Checks a parsed candidate against the chart and fills in derived fields.
///
/// Names and types come from the chart; totals are recomputed; an empty
/// description falls back to the one the user gave.
///
/// # Errors
///
/// `UnknownAccount` for an id outside the chart, `InvalidLine` when a line
/// does not have exactly one non-negative side set, `InvalidOutput` for an
/// entry without lines.
pub fn normalize(
    mut entry: CandidateEntry,
    chart: &[ChartAccount],
    description: &str,
) -> Result<CandidateEntry, GenerationError> {
    if entry.entries.is_empty() {
        return Err(GenerationError::InvalidOutput("entry has no lines".into()));
    }

    for line in &mut entry.entries {
        let account = chart
            .iter()
            .find(|a| a.account_id == line.account_id)
            .ok_or(GenerationError::UnknownAccount(line.account_id))?;
        validate_line(line).map_err(|e| GenerationError::InvalidLine(e.to_string()))?;
        line.account_name.clone_from(&account.name);
        line.account_type = account.account_type.as_str().to_string();
    }

    if entry.description.trim().is_empty() {
        entry.description = description.to_string();
    }
    entry.recompute_totals();
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::ledger::{AccountType, NormalBalance};
    use ringbook_shared::types::AccountId;
    use rust_decimal_macros::dec;

    /// Replies from a fixed script and counts calls.
    struct ScriptedModel {
        replies: Mutex<VecDeque<Result<String, GenerationError>>>,
        calls: AtomicUsize,
        delay: Duration,
    }

    impl ScriptedModel {
        fn new(replies: Vec<Result<&str, GenerationError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().map(|r| r.map(str::to_string)).collect()),
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ChatModel for &ScriptedModel {
        async fn complete(&self, _request: ChatRequest) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(GenerationError::Unreachable("script exhausted".into())))
        }
    }

    fn chart() -> Vec<ChartAccount> {
        vec![
            ChartAccount {
                account_id: AccountId(1),
                name: "HSBC".into(),
                account_type: AccountType::Asset,
                normal_balance: NormalBalance::Debit,
            },
            ChartAccount {
                account_id: AccountId(9),
                name: "Sales".into(),
                account_type: AccountType::Revenue,
                normal_balance: NormalBalance::Credit,
            },
        ]
    }

    const SALE: &str = r#"```json
{"date": "2026-04-02", "description": "Cash sale",
 "entries": [
   {"accountId": 1, "accountName": "Bank", "accountType": "asset", "debit": 100, "credit": 0},
   {"accountId": 9, "debit": 0, "credit": "100.00"}
 ],
 "totalDebit": 5, "totalCredit": 5}
```"#;

    async fn generate(model: &ScriptedModel) -> Result<CandidateEntry, GenerationError> {
        EntryGenerator::new(model, Duration::from_secs(5))
            .generate_entry(&chart(), "Sold goods for 100 cash", &PreparedAttachments::default())
            .await
    }

    #[tokio::test]
    async fn test_well_formed_reply() {
        let model = ScriptedModel::new(vec![Ok(SALE)]);
        let entry = generate(&model).await.unwrap();

        assert_eq!(model.calls(), 1);
        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2026, 4, 2).unwrap());
        assert_eq!(entry.entries[0].account_name, "HSBC");
        assert_eq!(entry.entries[0].account_type, "Asset");
        assert_eq!(entry.entries[1].account_name, "Sales");
        assert_eq!(entry.total_debit.value(), dec!(100));
        assert_eq!(entry.total_credit.value(), dec!(100));
        assert!(entry.equation().is_balanced);
    }

    #[tokio::test]
    async fn test_repair_succeeds() {
        let model = ScriptedModel::new(vec![Ok("I think the entry is: {\"date\": "), Ok(SALE)]);
        let entry = generate(&model).await.unwrap();

        assert_eq!(model.calls(), 2);
        assert_eq!(entry.entries.len(), 2);
    }

    #[tokio::test]
    async fn test_repair_attempted_exactly_once() {
        let model = ScriptedModel::new(vec![Ok("nope"), Ok("still nope"), Ok(SALE)]);
        let result = generate(&model).await;

        assert!(matches!(result, Err(GenerationError::InvalidOutput(_))));
        assert_eq!(model.calls(), 2);
    }

    #[tokio::test]
    async fn test_unknown_account_rejected() {
        let reply = r#"{"date": "2026-04-02", "entries": [
            {"accountId": 1, "debit": 10, "credit": 0},
            {"accountId": 42, "debit": 0, "credit": 10}]}"#;
        let model = ScriptedModel::new(vec![Ok(reply)]);

        assert!(matches!(
            generate(&model).await,
            Err(GenerationError::UnknownAccount(AccountId(42)))
        ));
    }

    #[tokio::test]
    async fn test_both_sides_rejected() {
        let reply = r#"{"date": "2026-04-02", "entries": [
            {"accountId": 1, "debit": 10, "credit": 10}]}"#;
        let model = ScriptedModel::new(vec![Ok(reply)]);

        assert!(matches!(generate(&model).await, Err(GenerationError::InvalidLine(_))));
    }

    #[tokio::test]
    async fn test_unbalanced_candidate_returned() {
        let reply = r#"{"date": "2026-04-02", "description": "", "entries": [
            {"accountId": 1, "debit": 100, "credit": 0},
            {"accountId": 9, "debit": 0, "credit": 80}]}"#;
        let model = ScriptedModel::new(vec![Ok(reply)]);
        let entry = generate(&model).await.unwrap();

        assert_eq!(entry.description, "Sold goods for 100 cash");
        assert_eq!(entry.equation().unbalanced_difference, dec!(20));
    }

    #[tokio::test]
    async fn test_endpoint_error_propagates() {
        let model = ScriptedModel::new(vec![Err(GenerationError::Endpoint {
            status: 529,
            message: "Overloaded".into(),
        })]);

        assert!(matches!(
            generate(&model).await,
            Err(GenerationError::Endpoint { status: 529, .. })
        ));
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_timeout() {
        let mut model = ScriptedModel::new(vec![Ok(SALE)]);
        model.delay = Duration::from_secs(30);

        let result = EntryGenerator::new(&model, Duration::from_millis(50))
            .generate_entry(&chart(), "late", &PreparedAttachments::default())
            .await;

        assert!(matches!(result, Err(GenerationError::Timeout(d)) if d == Duration::from_millis(50)));
    }
}
