//! User domain model

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque identifier of a registered user (the account owner)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered user
///
/// The password is only ever held as an Argon2 PHC string and is never
/// serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Normalize a username for storage and lookup
    pub fn normalize_username(username: &str) -> String {
        username.trim().to_string()
    }

    /// Validate registration input
    pub fn validate_credentials(username: &str, password: &str) -> Result<(), &'static str> {
        if username.trim().is_empty() {
            return Err("username cannot be empty");
        }
        if password.is_empty() {
            return Err("password cannot be empty");
        }
        Ok(())
    }
}
