//! Credential service - registration and login with Argon2id password hashes

use std::sync::Arc;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::Rng;

use crate::domain::credential::SALT_LEN;
use crate::domain::result::{Error, Result};
use crate::domain::{Argon2Params, User, UserId};
use crate::ports::{CredentialStore, LedgerStore};

/// Credential store backed by the ledger's users table
pub struct CredentialService {
    store: Arc<dyn LedgerStore>,
    params: Argon2Params,
}

impl CredentialService {
    pub fn new(store: Arc<dyn LedgerStore>, params: Argon2Params) -> Self {
        Self { store, params }
    }

    fn hasher(&self) -> Result<Argon2<'static>> {
        let params = Params::new(
            self.params.memory_cost,
            self.params.time_cost,
            self.params.parallelism,
            Some(self.params.hash_len as usize),
        )
        .map_err(|e| Error::Config(format!("Invalid password hashing parameters: {}", e)))?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    /// Hash a password into a PHC string with a fresh random salt
    fn hash_password(&self, password: &str) -> Result<String> {
        let salt_bytes: [u8; SALT_LEN] = rand::thread_rng().gen();
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| Error::storage(format!("Failed to encode salt: {}", e)))?;

        let hash = self
            .hasher()?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| Error::storage(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    fn verify_password(&self, password: &str, stored: &str) -> Result<bool> {
        let parsed = PasswordHash::new(stored)
            .map_err(|e| Error::storage(format!("Corrupt password hash: {}", e)))?;

        match self.hasher()?.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(Error::storage(format!("Failed to verify password: {}", e))),
        }
    }
}

impl CredentialStore for CredentialService {
    fn register(&self, username: &str, password: &str) -> Result<User> {
        User::validate_credentials(username, password).map_err(Error::validation)?;
        let username = User::normalize_username(username);

        if self.store.find_user_by_username(&username)?.is_some() {
            return Err(Error::DuplicateUsername(username));
        }

        let password_hash = self.hash_password(password)?;
        self.store.insert_user(&username, &password_hash)
    }

    fn authenticate(&self, username: &str, password: &str) -> Result<UserId> {
        let username = User::normalize_username(username);
        let user = self
            .store
            .find_user_by_username(&username)?
            .ok_or(Error::InvalidCredentials)?;

        if self.verify_password(password, &user.password_hash)? {
            Ok(user.id)
        } else {
            Err(Error::InvalidCredentials)
        }
    }
}
