//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod account;
pub mod organization;
pub mod post;
pub mod profile;
pub mod transaction;

pub use account::{AccountRepository, CreateAccountInput};
pub use organization::OrganizationRepository;
pub use post::{CreatePostInput, PostDetail, PostRepository, PostWithProfile};
pub use profile::ProfileRepository;
pub use transaction::{LineWithAccount, TransactionRepository, TransactionWithLines};
