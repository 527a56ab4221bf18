//! Journal entry generation from free text.
//!
//! A chat model receives the chart of accounts, the transaction
//! description and any attachments, and replies with a candidate entry as
//! JSON. Malformed replies get exactly one repair pass. The result is
//! structurally checked against the chart but may still be unbalanced;
//! callers re-check it with [`crate::ledger::compute_equation`].

mod anthropic;
mod error;
mod model;
mod parser;
mod prompt;
mod service;
mod slot;

pub use anthropic::AnthropicClient;
pub use error::GenerationError;
pub use model::{ChatModel, ChatRequest, ContentBlock};
pub use parser::{extract_json, parse_candidate};
pub use prompt::{format_instructions, repair_request, system_prompt, user_content};
pub use service::{EntryGenerator, normalize};
pub use slot::{DraftSlots, Ticket};
