//! Double-entry bookkeeping logic.
//!
//! This module implements the core ledger functionality:
//! - Candidate entry types and reviewer edits
//! - The accounting equation calculator
//! - Normal-balance rules for running account balances
//! - Posting validation producing a plan for the ledger writer
//! - Error types for ledger operations

pub mod balance;
pub mod candidate;
pub mod equation;
pub mod error;
pub mod service;
pub mod types;
pub mod validation;

#[cfg(test)]
mod service_props;

pub use candidate::{CandidateEdit, EditError};
pub use equation::{BALANCE_EPSILON, Equation, compute_equation};
pub use error::LedgerError;
pub use service::{AccountInfo, LedgerService};
pub use types::{
    AccountType, Amount, BalanceDelta, CandidateEntry, CandidateLine, ChartAccount, EntrySide,
    EntryTotals, MAX_AMOUNT, NormalBalance, PostingPlan, ResolvedLine,
};
pub use validation::{ensure_balanced, entry_totals, validate_line};
