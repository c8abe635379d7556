//! Ledger store port - persistence abstraction

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::result::Result;
use crate::domain::{Account, AccountId, Posting, TransactionRecord, User, UserId};

/// Durable storage for users, accounts and transaction history
///
/// This trait is the complete set of parameterized operations the core is
/// allowed to perform against storage. Implementations (adapters) provide
/// the actual database access logic and the atomicity guarantees.
pub trait LedgerStore: Send + Sync {
    // === Users ===

    /// Insert a user. Fails with `DuplicateUsername` if the name is taken.
    fn insert_user(&self, username: &str, password_hash: &str) -> Result<User>;

    /// Look up a user by exact username
    fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Get user by ID
    fn get_user(&self, id: UserId) -> Result<Option<User>>;

    // === Accounts ===

    /// Insert an account with a zero balance
    fn insert_account(&self, owner_id: UserId, account_type: &str) -> Result<Account>;

    /// Get account by ID
    fn get_account(&self, id: AccountId) -> Result<Option<Account>>;

    /// All accounts of an owner, in creation order
    fn list_accounts(&self, owner_id: UserId) -> Result<Vec<Account>>;

    // === Postings ===

    /// Apply a batch of postings as one atomic unit
    ///
    /// Postings are applied in order. For each one the account balance is
    /// updated and a history record appended. A withdrawal larger than the
    /// balance at that point fails the whole batch with `InsufficientFunds`;
    /// a missing account fails it with `NotFound`. On any failure nothing is
    /// committed. Returns the appended records in posting order.
    fn apply_postings(&self, postings: &[Posting]) -> Result<Vec<TransactionRecord>>;

    // === History ===

    /// History of one account, in insertion order
    fn list_transactions(&self, account_id: AccountId) -> Result<Vec<TransactionRecord>>;

    /// Number of history records across the given owner's accounts
    fn count_transactions(&self, owner_id: UserId) -> Result<i64>;

    // === Audit ===

    /// Accounts whose stored balance differs from the sum of their history
    fn find_balance_drift(&self) -> Result<Vec<AccountDrift>>;

    /// Accounts with a balance below zero
    fn find_negative_balances(&self) -> Result<Vec<AccountId>>;

    /// Records with an amount of zero or less, as "transaction_id:account_id"
    fn find_non_positive_amounts(&self) -> Result<Vec<String>>;

    /// Records referencing a missing account, as "transaction_id:account_id"
    fn find_orphaned_transactions(&self) -> Result<Vec<String>>;

    /// Accounts referencing a missing user, as "account_id:user_id"
    fn find_orphaned_accounts(&self) -> Result<Vec<String>>;
}

/// An account whose balance disagrees with its history
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountDrift {
    pub account_id: AccountId,
    pub balance: Decimal,
    pub history_total: Decimal,
}
