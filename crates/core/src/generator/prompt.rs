//! Prompt construction.

use chrono::NaiveDate;

use super::model::{ChatRequest, ContentBlock};
use crate::attachment::PreparedAttachments;
use crate::ledger::ChartAccount;

/// Shape the model must reply with.
#[must_use]
pub fn format_instructions() -> &'static str {
    r#"Reply with a single JSON object of this shape and nothing else:
{
  "date": "YYYY-MM-DD",
  "description": "short description of the transaction",
  "entries": [
    {"accountId": 1, "accountName": "HSBC", "accountType": "Asset", "debit": 100.00, "credit": 0},
    {"accountId": 9, "accountName": "Sales", "accountType": "Revenue", "debit": 0, "credit": 100.00}
  ],
  "totalDebit": 100.00,
  "totalCredit": 100.00
}"#
}

/// System prompt carrying the chart of accounts.
#[must_use]
pub fn system_prompt(chart: &[ChartAccount], today: NaiveDate) -> String {
    let chart_json = serde_json::to_string(chart).unwrap_or_else(|_| "[]".to_string());
    format!(
        "You are a bookkeeping assistant. Turn the user's description of a business \
         transaction into one double-entry journal entry.\n\n\
         Chart of accounts (JSON):\n{chart_json}\n\n\
         Rules:\n\
         - Use only accountId values from the chart of accounts.\n\
         - Each line has either a debit or a credit amount; the other is 0.\n\
         - Total debits must equal total credits.\n\
         - Amounts are plain numbers with no currency symbols or thousands separators.\n\
         - If the description gives no date, use {today}.\n\
         - Attached documents and images are evidence for amounts and dates.\n\n\
         {}\n\nReturn only JSON.",
        format_instructions()
    )
}

/// User content: the description, then inline images, then one text block
/// per extracted PDF.
#[must_use]
pub fn user_content(description: &str, attachments: &PreparedAttachments) -> Vec<ContentBlock> {
    let mut content = vec![ContentBlock::text(format!("Transaction: {description}"))];
    content.extend(
        attachments
            .images
            .iter()
            .map(|img| ContentBlock::image(&img.media_type, &img.data)),
    );
    content.extend(
        attachments
            .pdf_texts
            .iter()
            .enumerate()
            .map(|(i, text)| ContentBlock::text(format!("Attached document {}:\n{text}", i + 1))),
    );
    content
}

/// Request asking the model to rewrite a malformed reply.
#[must_use]
pub fn repair_request(reply: &str, problem: &str) -> ChatRequest {
    ChatRequest {
        system: format!(
            "You fix malformed JSON. Keep every value the input intended and change \
             only what is needed to match the required shape.\n\n{}\n\nReturn only JSON.",
            format_instructions()
        ),
        content: vec![ContentBlock::text(format!(
            "Problem: {problem}\n\nMalformed output:\n{reply}"
        ))],
    }
}
