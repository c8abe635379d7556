//! Doctor service - ledger health checks

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use crate::domain::result::Result;
use crate::ports::LedgerStore;

/// Doctor service for read-only ledger audits
pub struct DoctorService {
    store: Arc<dyn LedgerStore>,
}

impl DoctorService {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Run all health checks
    pub fn run_checks(&self) -> Result<DoctorResult> {
        let mut checks = HashMap::new();

        // Balance must equal deposits minus withdrawals
        let drift = self.store.find_balance_drift()?;
        let drift_details = drift
            .iter()
            .map(|d| {
                json!({
                    "account_id": d.account_id,
                    "balance": d.balance.to_string(),
                    "history_total": d.history_total.to_string()
                })
            })
            .collect();
        checks.insert(
            "balance_matches_history".to_string(),
            CheckResult::from_findings(
                drift.len(),
                "All balances match their transaction history",
                |n| format!("{} account(s) have a balance that disagrees with history", n),
                drift_details,
            ),
        );

        let negative = self.store.find_negative_balances()?;
        let negative_details = negative.iter().map(|id| json!({ "account_id": id })).collect();
        checks.insert(
            "negative_balances".to_string(),
            CheckResult::from_findings(
                negative.len(),
                "No negative balances found",
                |n| format!("{} account(s) have a negative balance", n),
                negative_details,
            ),
        );

        let non_positive = self.store.find_non_positive_amounts()?;
        checks.insert(
            "non_positive_amounts".to_string(),
            CheckResult::from_findings(
                non_positive.len(),
                "All transaction amounts are positive",
                |n| format!("{} transaction(s) have a zero or negative amount", n),
                pair_details(&non_positive, "transaction_id", "account_id"),
            ),
        );

        let orphaned_txs = self.store.find_orphaned_transactions()?;
        checks.insert(
            "orphaned_transactions".to_string(),
            CheckResult::from_findings(
                orphaned_txs.len(),
                "No orphaned transactions found",
                |n| format!("{} transaction(s) reference missing accounts", n),
                pair_details(&orphaned_txs, "transaction_id", "account_id"),
            ),
        );

        let orphaned_accounts = self.store.find_orphaned_accounts()?;
        checks.insert(
            "orphaned_accounts".to_string(),
            CheckResult::from_findings(
                orphaned_accounts.len(),
                "No orphaned accounts found",
                |n| format!("{} account(s) reference missing users", n),
                pair_details(&orphaned_accounts, "account_id", "user_id"),
            ),
        );

        // Calculate summary
        let passed = checks.values().filter(|c| c.status == "pass").count() as i64;
        let warnings = checks.values().filter(|c| c.status == "warning").count() as i64;
        let errors = checks.values().filter(|c| c.status == "error").count() as i64;

        Ok(DoctorResult {
            checks,
            summary: DoctorSummary { passed, warnings, errors },
        })
    }
}

/// Parse "first:second" audit rows into JSON objects
fn pair_details(rows: &[String], first: &str, second: &str) -> Vec<serde_json::Value> {
    rows.iter()
        .map(|s| {
            let mut obj = serde_json::Map::new();
            match s.split_once(':') {
                Some((a, b)) => {
                    obj.insert(first.to_string(), json!(a));
                    obj.insert(second.to_string(), json!(b));
                }
                None => {
                    obj.insert(first.to_string(), json!(s));
                }
            }
            serde_json::Value::Object(obj)
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct DoctorResult {
    pub checks: HashMap<String, CheckResult>,
    pub summary: DoctorSummary,
}

impl DoctorResult {
    /// True when no check reported an error
    pub fn is_healthy(&self) -> bool {
        self.summary.errors == 0
    }
}

#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<serde_json::Value>>,
}

impl CheckResult {
    fn from_findings(
        count: usize,
        pass_message: &str,
        error_message: impl FnOnce(usize) -> String,
        details: Vec<serde_json::Value>,
    ) -> Self {
        if count == 0 {
            Self {
                status: "pass".to_string(),
                message: pass_message.to_string(),
                details: None,
            }
        } else {
            Self {
                status: "error".to_string(),
                message: error_message(count),
                details: Some(details),
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DoctorSummary {
    pub passed: i64,
    pub warnings: i64,
    pub errors: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::duckdb::DuckDbRepository;
    use crate::domain::Posting;
    use rust_decimal::Decimal;

    fn seeded() -> Arc<DuckDbRepository> {
        let repo = Arc::new(DuckDbRepository::open_in_memory().unwrap());
        repo.ensure_schema().unwrap();
        let owner = repo.insert_user("alice", "hash").unwrap().id;
        let account = repo.insert_account(owner, "Checking").unwrap().id;
        repo.apply_postings(&[
            Posting::deposit(account, Decimal::new(10000, 2)),
            Posting::withdrawal(account, Decimal::new(2500, 2)),
        ])
        .unwrap();
        repo
    }

    #[test]
    fn test_healthy_ledger_passes() {
        let repo = seeded();
        let result = DoctorService::new(repo).run_checks().unwrap();
        assert!(result.is_healthy());
        assert_eq!(result.summary.passed, 5);
        assert!(result.checks.values().all(|c| c.details.is_none()));
    }

    #[test]
    fn test_tampered_balance_flagged() {
        let repo = seeded();
        repo.execute_unchecked("UPDATE accounts SET balance = 999.99").unwrap();

        let result = DoctorService::new(repo).run_checks().unwrap();
        assert!(!result.is_healthy());
        let check = &result.checks["balance_matches_history"];
        assert_eq!(check.status, "error");
        let details = check.details.as_ref().unwrap();
        assert_eq!(details[0]["balance"], "999.99");
        assert_eq!(details[0]["history_total"], "75.00");
    }

    #[test]
    fn test_orphans_and_bad_amounts_flagged() {
        let repo = seeded();
        repo.execute_unchecked(
            "INSERT INTO accounts VALUES (900, 42, 'Checking', 0, '2024-01-01 00:00:00');
             INSERT INTO transactions VALUES (901, 777, 'Deposit', -1, '2024-01-01 00:00:00');",
        )
        .unwrap();

        let result = DoctorService::new(repo).run_checks().unwrap();
        assert_eq!(result.checks["orphaned_accounts"].status, "error");
        assert_eq!(result.checks["orphaned_transactions"].status, "error");
        assert_eq!(result.checks["non_positive_amounts"].status, "error");
        let details = result.checks["orphaned_accounts"].details.as_ref().unwrap();
        assert_eq!(details[0]["account_id"], "900");
        assert_eq!(details[0]["user_id"], "42");
        assert_eq!(result.summary.errors, 3);
    }

    #[test]
    fn test_pair_details_without_separator() {
        let details = pair_details(&["17".to_string()], "transaction_id", "account_id");
        assert_eq!(details[0]["transaction_id"], "17");
    }
}
