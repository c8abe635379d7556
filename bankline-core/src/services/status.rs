//! Status service - per-owner account and transaction summaries

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::result::Result;
use crate::domain::{AccountId, UserId};
use crate::ports::LedgerStore;

/// Status service for account summaries
pub struct StatusService {
    store: Arc<dyn LedgerStore>,
}

impl StatusService {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Get overall status summary for one owner
    pub fn get_status(&self, owner_id: UserId) -> Result<StatusSummary> {
        let accounts = self.store.list_accounts(owner_id)?;
        let total_transactions = self.store.count_transactions(owner_id)?;
        let total_balance: Decimal = accounts.iter().map(|a| a.balance).sum();

        Ok(StatusSummary {
            total_accounts: accounts.len() as i64,
            total_balance,
            total_transactions,
            accounts: accounts
                .into_iter()
                .map(|a| AccountSummary {
                    id: a.id,
                    account_type: a.account_type,
                    balance: a.balance,
                })
                .collect(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct StatusSummary {
    pub total_accounts: i64,
    pub total_balance: Decimal,
    pub total_transactions: i64,
    pub accounts: Vec<AccountSummary>,
}

#[derive(Debug, Serialize)]
pub struct AccountSummary {
    pub id: AccountId,
    pub account_type: String,
    pub balance: Decimal,
}
