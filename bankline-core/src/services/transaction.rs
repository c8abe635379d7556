//! Transaction service - deposits, withdrawals and transfers
//!
//! Every operation validates the amount and the caller's ownership first,
//! then hands a batch of postings to the ledger store, which applies the
//! balance check, balance update and history append as one atomic unit.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::result::{Error, Result};
use crate::domain::transaction::validate_amount;
use crate::domain::{AccountId, Posting, TransactionRecord, UserId};
use crate::ports::LedgerStore;

/// Records appended by a successful transfer
#[derive(Debug, Clone, Serialize)]
pub struct TransferReceipt {
    pub withdrawal: TransactionRecord,
    pub deposit: TransactionRecord,
}

/// Transaction engine
pub struct TransactionService {
    store: Arc<dyn LedgerStore>,
}

impl TransactionService {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Add funds to one of the owner's accounts
    pub fn deposit(
        &self,
        owner_id: UserId,
        account_id: AccountId,
        amount: Decimal,
    ) -> Result<TransactionRecord> {
        let amount = validate_amount(amount)?;
        self.ensure_owned(owner_id, account_id)?;
        self.apply_one(Posting::deposit(account_id, amount))
    }

    /// Remove funds from one of the owner's accounts
    ///
    /// Fails with `InsufficientFunds` and changes nothing when the amount
    /// exceeds the balance.
    pub fn withdraw(
        &self,
        owner_id: UserId,
        account_id: AccountId,
        amount: Decimal,
    ) -> Result<TransactionRecord> {
        let amount = validate_amount(amount)?;
        self.ensure_owned(owner_id, account_id)?;
        self.apply_one(Posting::withdrawal(account_id, amount))
    }

    /// Move funds between two of the owner's accounts
    ///
    /// The withdrawal and the deposit commit together or not at all.
    pub fn transfer(
        &self,
        owner_id: UserId,
        from: AccountId,
        to: AccountId,
        amount: Decimal,
    ) -> Result<TransferReceipt> {
        let amount = validate_amount(amount)?;
        self.ensure_owned(owner_id, from)?;
        self.ensure_owned(owner_id, to)?;

        let mut records = self
            .store
            .apply_postings(&[Posting::withdrawal(from, amount), Posting::deposit(to, amount)])?
            .into_iter();

        match (records.next(), records.next()) {
            (Some(withdrawal), Some(deposit)) => Ok(TransferReceipt { withdrawal, deposit }),
            _ => Err(Error::storage("transfer did not record both postings")),
        }
    }

    fn ensure_owned(&self, owner_id: UserId, account_id: AccountId) -> Result<()> {
        match self.store.get_account(account_id)? {
            Some(account) if account.is_owned_by(owner_id) => Ok(()),
            _ => Err(Error::not_found(format!("account {}", account_id))),
        }
    }

    fn apply_one(&self, posting: Posting) -> Result<TransactionRecord> {
        self.store
            .apply_postings(&[posting])?
            .pop()
            .ok_or_else(|| Error::storage("posting was not recorded"))
    }
}
