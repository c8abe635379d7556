//! Account service - account creation, lookup and ownership scoping

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::domain::result::{Error, Result};
use crate::domain::{Account, AccountId, UserId};
use crate::ports::LedgerStore;

/// Account registry for users
pub struct AccountService {
    store: Arc<dyn LedgerStore>,
}

impl AccountService {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Open a new account with a zero balance
    pub fn create_account(&self, owner_id: UserId, account_type: &str) -> Result<Account> {
        Account::validate_type(account_type).map_err(Error::validation)?;

        if self.store.get_user(owner_id)?.is_none() {
            return Err(Error::not_found(format!("user {}", owner_id)));
        }

        self.store
            .insert_account(owner_id, &Account::normalize_type(account_type))
    }

    /// All accounts of an owner, oldest first
    pub fn list_accounts(&self, owner_id: UserId) -> Result<Vec<Account>> {
        self.store.list_accounts(owner_id)
    }

    /// Current balance of an account
    pub fn get_balance(&self, account_id: AccountId) -> Result<Decimal> {
        self.store
            .get_account(account_id)?
            .map(|a| a.balance)
            .ok_or_else(|| Error::not_found(format!("account {}", account_id)))
    }

    /// Look up an account on behalf of its owner
    ///
    /// Accounts owned by someone else are reported as missing.
    pub fn get_owned_account(&self, owner_id: UserId, account_id: AccountId) -> Result<Account> {
        match self.store.get_account(account_id)? {
            Some(account) if account.is_owned_by(owner_id) => Ok(account),
            _ => Err(Error::not_found(format!("account {}", account_id))),
        }
    }

    /// The owner's other accounts, i.e. valid destinations for a transfer
    pub fn transfer_targets(
        &self,
        owner_id: UserId,
        from_account_id: AccountId,
    ) -> Result<Vec<Account>> {
        self.get_owned_account(owner_id, from_account_id)?;
        Ok(self
            .store
            .list_accounts(owner_id)?
            .into_iter()
            .filter(|a| a.id != from_account_id)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::duckdb::DuckDbRepository;

    fn setup() -> (AccountService, UserId, UserId) {
        let repo = DuckDbRepository::open_in_memory().unwrap();
        repo.ensure_schema().unwrap();
        let alice = repo.insert_user("alice", "hash").unwrap().id;
        let bob = repo.insert_user("bob", "hash").unwrap().id;
        (AccountService::new(Arc::new(repo)), alice, bob)
    }

    #[test]
    fn test_create_account_normalizes_type() {
        let (service, alice, _) = setup();
        let account = service.create_account(alice, "  savings").unwrap();
        assert_eq!(account.account_type, "Savings");
        assert_eq!(account.balance, Decimal::ZERO);
        assert_eq!(account.owner_id, alice);
    }

    #[test]
    fn test_create_account_rejects_empty_type() {
        let (service, alice, _) = setup();
        let err = service.create_account(alice, "   ").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(service.list_accounts(alice).unwrap().is_empty());
    }

    #[test]
    fn test_create_account_for_unknown_owner() {
        let (service, _, _) = setup();
        let err = service.create_account(UserId(404), "Checking").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_get_balance_missing_account() {
        let (service, _, _) = setup();
        assert!(matches!(
            service.get_balance(AccountId(12345)),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_foreign_account_looks_missing() {
        let (service, alice, bob) = setup();
        let account = service.create_account(alice, "Checking").unwrap();

        assert!(service.get_owned_account(alice, account.id).is_ok());
        assert!(matches!(
            service.get_owned_account(bob, account.id),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_transfer_targets_exclude_source() {
        let (service, alice, bob) = setup();
        let checking = service.create_account(alice, "Checking").unwrap();
        let savings = service.create_account(alice, "Savings").unwrap();
        service.create_account(bob, "Checking").unwrap();

        let targets = service.transfer_targets(alice, checking.id).unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].id, savings.id);
    }
}
