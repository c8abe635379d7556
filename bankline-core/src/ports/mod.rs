//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The core domain
//! depends only on these traits, not on concrete implementations.

mod credential_store;
mod ledger_store;

pub use credential_store::CredentialStore;
pub use ledger_store::{AccountDrift, LedgerStore};
