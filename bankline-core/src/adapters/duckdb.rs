//! DuckDB ledger store implementation

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, SubsecRound, TimeZone, Utc};
use duckdb::{params, Connection, OptionalExt};
use rust_decimal::Decimal;

use crate::domain::result::{Error, Result};
use crate::domain::transaction::MAX_AMOUNT;
use crate::domain::{
    Account, AccountId, Posting, TransactionId, TransactionKind, TransactionRecord, User, UserId,
};
use crate::ports::{AccountDrift, LedgerStore};
use crate::services::{MigrationResult, MigrationService};

/// Maximum number of retries when database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400, 800ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

const NEXT_USER_ID: &str = "SELECT nextval('seq_user_id')";
const NEXT_ACCOUNT_ID: &str = "SELECT nextval('seq_account_id')";
const NEXT_TRANSACTION_ID: &str = "SELECT nextval('seq_transaction_id')";

impl From<duckdb::Error> for Error {
    fn from(e: duckdb::Error) -> Self {
        Error::Storage(e.to_string())
    }
}

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows error messages
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS error messages
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("could not set lock")
        || lower.contains("file is already open")
}

/// DuckDB ledger store
///
/// Owns a single connection behind a mutex. Every write runs inside a DuckDB
/// transaction while the mutex is held, which makes each posting batch one
/// atomic unit with respect to every other operation on this store.
pub struct DuckDbRepository {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl DuckDbRepository {
    /// Open (or create) the ledger database file
    ///
    /// Retries with exponential backoff when another process holds the file
    /// lock, e.g. a second CLI invocation that is still finishing.
    pub fn new(db_path: &Path) -> Result<Self> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    return Ok(Self {
                        conn: Mutex::new(conn),
                        db_path: Some(db_path.to_path_buf()),
                    });
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        eprintln!(
                            "[bankline] Database busy, retrying in {}ms (attempt {}/{}): {}",
                            delay.as_millis(),
                            attempt + 1,
                            MAX_RETRIES,
                            err_msg
                        );
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }

        Err(last_error.map(Error::from).unwrap_or_else(|| {
            Error::storage(format!("Failed to open database after {} retries", MAX_RETRIES))
        }))
    }

    /// Open a private in-memory ledger (tests and throwaway sessions)
    pub fn open_in_memory() -> Result<Self> {
        // Extension autoloading stays off everywhere; nothing here needs it
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        let conn = Connection::open_in_memory_with_flags(config)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: None,
        })
    }

    fn try_open_connection(db_path: &Path) -> duckdb::Result<Connection> {
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Connection::open_with_flags(db_path, config)
    }

    /// Path of the database file, `None` for in-memory stores
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::storage(format!("Lock poisoned: {}", e)))
    }

    /// Run database migrations using the MigrationService
    pub fn run_migrations(&self) -> Result<MigrationResult> {
        let conn = self.lock()?;
        MigrationService::new(&conn)
            .run_pending()
            .map_err(|e| Error::storage(format!("{:#}", e)))
    }

    /// Ensure database schema exists (runs pending migrations)
    pub fn ensure_schema(&self) -> Result<()> {
        self.run_migrations()?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn execute_unchecked(&self, sql: &str) -> Result<()> {
        self.lock()?.execute_batch(sql)?;
        Ok(())
    }

    fn read_balance(conn: &Connection, account_id: AccountId) -> Result<Option<Decimal>> {
        let balance: Option<String> = conn
            .query_row(
                "SELECT balance::VARCHAR FROM accounts WHERE account_id = ?",
                params![account_id.0],
                |row| row.get(0),
            )
            .optional()?;
        balance.map(|b| parse_decimal(&b)).transpose()
    }

    fn next_id(conn: &Connection, sequence_sql: &str) -> Result<i64> {
        let id: i64 = conn.query_row(sequence_sql, [], |row| row.get(0))?;
        Ok(id)
    }
}

impl LedgerStore for DuckDbRepository {
    // === Users ===

    fn insert_user(&self, username: &str, password_hash: &str) -> Result<User> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let taken: i64 = tx.query_row(
            "SELECT COUNT(*) FROM users WHERE username = ?",
            params![username],
            |row| row.get(0),
        )?;
        if taken > 0 {
            return Err(Error::DuplicateUsername(username.to_string()));
        }

        let id = Self::next_id(&tx, NEXT_USER_ID)?;
        let created_at = now();
        tx.execute(
            "INSERT INTO users (user_id, username, password_hash, created_at)
             VALUES (?, ?, ?, CAST(? AS TIMESTAMP))",
            params![id, username, password_hash, format_timestamp(&created_at)],
        )?;
        tx.commit()?;

        Ok(User {
            id: UserId(id),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at,
        })
    }

    fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT user_id, username, password_hash, created_at::VARCHAR
                 FROM users WHERE username = ?",
                params![username],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;
        row.map(row_to_user).transpose()
    }

    fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT user_id, username, password_hash, created_at::VARCHAR
                 FROM users WHERE user_id = ?",
                params![id.0],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;
        row.map(row_to_user).transpose()
    }

    // === Accounts ===

    fn insert_account(&self, owner_id: UserId, account_type: &str) -> Result<Account> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let id = Self::next_id(&tx, NEXT_ACCOUNT_ID)?;
        let created_at = now();
        tx.execute(
            "INSERT INTO accounts (account_id, user_id, account_type, balance, created_at)
             VALUES (?, ?, ?, 0, CAST(? AS TIMESTAMP))",
            params![id, owner_id.0, account_type, format_timestamp(&created_at)],
        )?;
        tx.commit()?;

        Ok(Account {
            id: AccountId(id),
            owner_id,
            account_type: account_type.to_string(),
            balance: Decimal::new(0, 2),
            created_at,
        })
    }

    fn get_account(&self, id: AccountId) -> Result<Option<Account>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT account_id, user_id, account_type, balance::VARCHAR, created_at::VARCHAR
                 FROM accounts WHERE account_id = ?",
                params![id.0],
                |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
                },
            )
            .optional()?;
        row.map(row_to_account).transpose()
    }

    fn list_accounts(&self, owner_id: UserId) -> Result<Vec<Account>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT account_id, user_id, account_type, balance::VARCHAR, created_at::VARCHAR
             FROM accounts WHERE user_id = ?
             ORDER BY account_id",
        )?;

        let rows = stmt.query_map(params![owner_id.0], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
        })?;

        let mut accounts = Vec::new();
        for row in rows {
            accounts.push(row_to_account(row?)?);
        }
        Ok(accounts)
    }

    // === Postings ===

    fn apply_postings(&self, postings: &[Posting]) -> Result<Vec<TransactionRecord>> {
        let mut conn = self.lock()?;
        // Dropping `tx` without commit rolls back every statement below
        let tx = conn.transaction()?;
        let mut records = Vec::with_capacity(postings.len());

        for posting in postings {
            let balance = Self::read_balance(&tx, posting.account_id)?.ok_or_else(|| {
                Error::not_found(format!("account {}", posting.account_id))
            })?;

            let new_balance = match posting.kind {
                TransactionKind::Deposit => balance
                    .checked_add(posting.amount)
                    .filter(|b| *b <= MAX_AMOUNT)
                    .ok_or_else(|| {
                        Error::invalid_amount(format!(
                            "deposit of {} would take account {} above the maximum balance of {}",
                            posting.amount, posting.account_id, MAX_AMOUNT
                        ))
                    })?,
                TransactionKind::Withdrawal => {
                    if posting.amount > balance {
                        return Err(Error::InsufficientFunds {
                            account_id: posting.account_id,
                            balance,
                            requested: posting.amount,
                        });
                    }
                    balance.checked_sub(posting.amount).ok_or_else(|| {
                        Error::invalid_amount(format!("withdrawal of {} out of range", posting.amount))
                    })?
                }
            };

            tx.execute(
                "UPDATE accounts SET balance = CAST(? AS DECIMAL(18, 2)) WHERE account_id = ?",
                params![new_balance.to_string(), posting.account_id.0],
            )?;

            let id = Self::next_id(&tx, NEXT_TRANSACTION_ID)?;
            let occurred_at = now();
            tx.execute(
                "INSERT INTO transactions (transaction_id, account_id, type, amount, occurred_at)
                 VALUES (?, ?, ?, CAST(? AS DECIMAL(18, 2)), CAST(? AS TIMESTAMP))",
                params![
                    id,
                    posting.account_id.0,
                    posting.kind.as_str(),
                    posting.amount.to_string(),
                    format_timestamp(&occurred_at),
                ],
            )?;

            records.push(TransactionRecord {
                id: TransactionId(id),
                account_id: posting.account_id,
                kind: posting.kind,
                amount: posting.amount,
                occurred_at,
            });
        }

        tx.commit()?;
        Ok(records)
    }

    // === History ===

    fn list_transactions(&self, account_id: AccountId) -> Result<Vec<TransactionRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT transaction_id, account_id, type, amount::VARCHAR, occurred_at::VARCHAR
             FROM transactions WHERE account_id = ?
             ORDER BY transaction_id",
        )?;

        let rows = stmt.query_map(params![account_id.0], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row_to_transaction(row?)?);
        }
        Ok(records)
    }

    fn count_transactions(&self, owner_id: UserId) -> Result<i64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM transactions t
             JOIN accounts a ON t.account_id = a.account_id
             WHERE a.user_id = ?",
            params![owner_id.0],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // === Audit ===

    fn find_balance_drift(&self) -> Result<Vec<AccountDrift>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT a.account_id, a.balance::VARCHAR,
                    COALESCE(SUM(CASE WHEN t.type = 'Deposit' THEN t.amount
                                      WHEN t.type = 'Withdrawal' THEN -t.amount
                                      ELSE 0 END), 0)::VARCHAR AS history_total
             FROM accounts a
             LEFT JOIN transactions t ON t.account_id = a.account_id
             GROUP BY a.account_id, a.balance
             ORDER BY a.account_id",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut drift = Vec::new();
        for row in rows {
            let (account_id, balance, history_total) = row?;
            let balance = parse_decimal(&balance)?;
            let history_total = parse_decimal(&history_total)?;
            if balance != history_total {
                drift.push(AccountDrift {
                    account_id: AccountId(account_id),
                    balance,
                    history_total,
                });
            }
        }
        Ok(drift)
    }

    fn find_negative_balances(&self) -> Result<Vec<AccountId>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT account_id FROM accounts WHERE balance < 0 ORDER BY account_id")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, i64>(0))?
            .map(|r| r.map(AccountId))
            .collect::<duckdb::Result<Vec<_>>>()?;
        Ok(ids)
    }

    fn find_non_positive_amounts(&self) -> Result<Vec<String>> {
        self.collect_pairs(
            "SELECT transaction_id, account_id FROM transactions
             WHERE amount <= 0 ORDER BY transaction_id",
        )
    }

    fn find_orphaned_transactions(&self) -> Result<Vec<String>> {
        self.collect_pairs(
            "SELECT t.transaction_id, t.account_id FROM transactions t
             LEFT JOIN accounts a ON t.account_id = a.account_id
             WHERE a.account_id IS NULL ORDER BY t.transaction_id",
        )
    }

    fn find_orphaned_accounts(&self) -> Result<Vec<String>> {
        self.collect_pairs(
            "SELECT a.account_id, a.user_id FROM accounts a
             LEFT JOIN users u ON a.user_id = u.user_id
             WHERE u.user_id IS NULL ORDER BY a.account_id",
        )
    }
}

impl DuckDbRepository {
    /// Run a two-column ID query and format each row as "first:second"
    fn collect_pairs(&self, sql: &str) -> Result<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let pairs = stmt
            .query_map([], |row| {
                let first: i64 = row.get(0)?;
                let second: i64 = row.get(1)?;
                Ok(format!("{}:{}", first, second))
            })?
            .collect::<duckdb::Result<Vec<_>>>()?;
        Ok(pairs)
    }
}

// Helper functions

/// Current time at the precision DuckDB TIMESTAMP columns keep
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.naive_utc().format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|e| Error::storage(format!("invalid timestamp '{}': {}", s, e)))
}

fn parse_decimal(s: &str) -> Result<Decimal> {
    Decimal::from_str_exact(s.trim())
        .map_err(|e| Error::storage(format!("invalid decimal '{}': {}", s, e)))
}

fn row_to_user((id, username, password_hash, created_at): (i64, String, String, String)) -> Result<User> {
    Ok(User {
        id: UserId(id),
        username,
        password_hash,
        created_at: parse_timestamp(&created_at)?,
    })
}

fn row_to_account(
    (id, owner_id, account_type, balance, created_at): (i64, i64, String, String, String),
) -> Result<Account> {
    Ok(Account {
        id: AccountId(id),
        owner_id: UserId(owner_id),
        account_type,
        balance: parse_decimal(&balance)?,
        created_at: parse_timestamp(&created_at)?,
    })
}

fn row_to_transaction(
    (id, account_id, kind, amount, occurred_at): (i64, i64, String, String, String),
) -> Result<TransactionRecord> {
    Ok(TransactionRecord {
        id: TransactionId(id),
        account_id: AccountId(account_id),
        kind: kind.parse()?,
        amount: parse_decimal(&amount)?,
        occurred_at: parse_timestamp(&occurred_at)?,
    })
}
