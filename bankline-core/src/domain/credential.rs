//! Password hashing parameters

use serde::{Deserialize, Serialize};

/// Default Argon2id parameters (the argon2 crate's recommended defaults)
pub const DEFAULT_TIME_COST: u32 = 2;
pub const DEFAULT_MEMORY_COST: u32 = 19456; // 19 MiB
pub const DEFAULT_PARALLELISM: u32 = 1;
pub const DEFAULT_HASH_LEN: u32 = 32;

/// Length of the random salt generated per password
pub const SALT_LEN: usize = 16;

/// Argon2id parameters for password hashing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Argon2Params {
    pub time_cost: u32,
    pub memory_cost: u32,
    pub parallelism: u32,
    pub hash_len: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            time_cost: DEFAULT_TIME_COST,
            memory_cost: DEFAULT_MEMORY_COST,
            parallelism: DEFAULT_PARALLELISM,
            hash_len: DEFAULT_HASH_LEN,
        }
    }
}

impl Argon2Params {
    /// Cheapest parameters argon2 accepts; for tests only
    pub fn minimal() -> Self {
        Self {
            time_cost: 1,
            memory_cost: 8,
            parallelism: 1,
            hash_len: DEFAULT_HASH_LEN,
        }
    }
}
