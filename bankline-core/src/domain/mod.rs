//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod account;
pub mod credential;
pub mod result;
pub mod transaction;
mod user;

pub use account::{Account, AccountId};
pub use credential::Argon2Params;
pub use transaction::{Posting, TransactionId, TransactionKind, TransactionRecord};
pub use user::{User, UserId};
