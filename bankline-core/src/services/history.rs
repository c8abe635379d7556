//! History service - read-only view of an account's transaction log

use std::sync::Arc;

use crate::domain::result::{Error, Result};
use crate::domain::{AccountId, TransactionRecord, UserId};
use crate::ports::LedgerStore;

/// History query service
pub struct HistoryService {
    store: Arc<dyn LedgerStore>,
}

impl HistoryService {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Every record of an account in insertion order
    pub fn get_history(&self, account_id: AccountId) -> Result<Vec<TransactionRecord>> {
        if self.store.get_account(account_id)?.is_none() {
            return Err(Error::not_found(format!("account {}", account_id)));
        }
        self.store.list_transactions(account_id)
    }

    /// Same as `get_history`, but only for the owner's own accounts
    pub fn get_owned_history(
        &self,
        owner_id: UserId,
        account_id: AccountId,
    ) -> Result<Vec<TransactionRecord>> {
        match self.store.get_account(account_id)? {
            Some(account) if account.is_owned_by(owner_id) => {
                self.store.list_transactions(account_id)
            }
            _ => Err(Error::not_found(format!("account {}", account_id))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::duckdb::DuckDbRepository;
    use crate::domain::transaction::net_amount;
    use crate::domain::{Posting, TransactionKind};
    use rust_decimal::Decimal;

    #[test]
    fn test_history_in_insertion_order() {
        let repo = Arc::new(DuckDbRepository::open_in_memory().unwrap());
        repo.ensure_schema().unwrap();
        let owner = repo.insert_user("alice", "hash").unwrap().id;
        let account = repo.insert_account(owner, "Checking").unwrap().id;

        repo.apply_postings(&[Posting::deposit(account, Decimal::new(10000, 2))])
            .unwrap();
        repo.apply_postings(&[Posting::withdrawal(account, Decimal::new(2500, 2))])
            .unwrap();
        repo.apply_postings(&[Posting::deposit(account, Decimal::new(500, 2))])
            .unwrap();

        let service = HistoryService::new(repo.clone());
        let history = service.get_history(account).unwrap();
        let kinds: Vec<TransactionKind> = history.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TransactionKind::Deposit,
                TransactionKind::Withdrawal,
                TransactionKind::Deposit
            ]
        );
        assert!(history.windows(2).all(|w| w[0].id < w[1].id));
        assert_eq!(net_amount(&history), Decimal::new(8000, 2));
    }

    #[test]
    fn test_empty_and_missing_history() {
        let repo = Arc::new(DuckDbRepository::open_in_memory().unwrap());
        repo.ensure_schema().unwrap();
        let owner = repo.insert_user("alice", "hash").unwrap().id;
        let other = repo.insert_user("bob", "hash").unwrap().id;
        let account = repo.insert_account(owner, "Checking").unwrap().id;

        let service = HistoryService::new(repo.clone());
        assert!(service.get_history(account).unwrap().is_empty());
        assert!(matches!(
            service.get_history(AccountId(999)),
            Err(Error::NotFound(_))
        ));
        assert!(service.get_owned_history(owner, account).unwrap().is_empty());
        assert!(matches!(
            service.get_owned_history(other, account),
            Err(Error::NotFound(_))
        ));
    }
}
