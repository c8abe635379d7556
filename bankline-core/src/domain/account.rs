//! Account domain model

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::UserId;

/// Opaque identifier of a bank account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub i64);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A bank account owned by a user
/// Note: account_type is a freeform label ("Checking", "Savings", ...).
/// The balance is never negative and only changes through postings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub owner_id: UserId,
    pub account_type: String,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Normalize an account type label: "savings " -> "Savings"
    pub fn normalize_type(account_type: &str) -> String {
        let trimmed = account_type.trim();
        let mut chars = trimmed.chars();
        match chars.next() {
            Some(first) => first
                .to_uppercase()
                .chain(chars.flat_map(char::to_lowercase))
                .collect(),
            None => String::new(),
        }
    }

    /// Validate an account type label
    pub fn validate_type(account_type: &str) -> Result<(), &'static str> {
        if account_type.trim().is_empty() {
            return Err("account type cannot be empty");
        }
        Ok(())
    }

    /// Whether this account belongs to the given owner
    pub fn is_owned_by(&self, owner_id: UserId) -> bool {
        self.owner_id == owner_id
    }
}
