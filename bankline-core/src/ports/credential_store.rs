//! Credential store port

use crate::domain::result::Result;
use crate::domain::{User, UserId};

/// Registration and authentication of account owners
///
/// The ledger only ever needs the resolved `UserId`; how credentials are
/// verified is up to the implementation.
pub trait CredentialStore: Send + Sync {
    /// Register a new user. Fails with `DuplicateUsername` on conflict.
    fn register(&self, username: &str, password: &str) -> Result<User>;

    /// Resolve credentials to an owner ID. Fails with `InvalidCredentials`.
    fn authenticate(&self, username: &str, password: &str) -> Result<UserId>;
}
