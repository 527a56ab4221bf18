//! Core business logic for Ringbook.
//!
//! Everything here is independent of the database. The ledger writer in
//! `ringbook-db` executes the posting plans built by [`ledger`].
//!
//! # Modules
//!
//! - `ledger` - Candidate entries, the accounting equation and posting rules
//! - `generator` - Candidate entry generation with a chat model
//! - `attachment` - Image and PDF intake for generation
//! - `storage` - Object storage for post attachments

pub mod attachment;
pub mod generator;
pub mod ledger;
pub mod storage;
