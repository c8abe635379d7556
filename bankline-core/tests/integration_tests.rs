//! Integration tests for bankline-core services
//!
//! These tests drive the ledger through `BanklineContext` against a real
//! on-disk DuckDB database in a temporary directory.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::str::FromStr;

use rust_decimal::Decimal;
use tempfile::TempDir;

use bankline_core::config::Config;
use bankline_core::domain::transaction::net_amount;
use bankline_core::{
    AccountId, Argon2Params, BanklineContext, CredentialStore, Error, TransactionKind,
    TransactionRecord, UserId,
};

// ============================================================================
// Test Helpers
// ============================================================================

/// Create a context with cheap password hashing in a fresh directory
fn create_test_context(temp_dir: &TempDir) -> BanklineContext {
    Config {
        password_hashing: Argon2Params::minimal(),
        ..Config::default()
    }
    .save(temp_dir.path())
    .expect("Failed to write settings");
    BanklineContext::new(temp_dir.path()).expect("Failed to open context")
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn register(ctx: &BanklineContext, username: &str) -> UserId {
    ctx.credential_service
        .register(username, "correct horse")
        .expect("Failed to register")
        .id
}

fn open_account(ctx: &BanklineContext, owner: UserId) -> AccountId {
    ctx.account_service
        .create_account(owner, "Checking")
        .expect("Failed to create account")
        .id
}

fn balance(ctx: &BanklineContext, account: AccountId) -> Decimal {
    ctx.account_service.get_balance(account).unwrap()
}

fn history(ctx: &BanklineContext, account: AccountId) -> Vec<TransactionRecord> {
    ctx.history_service.get_history(account).unwrap()
}

fn summary(records: &[TransactionRecord]) -> Vec<(TransactionKind, String)> {
    records
        .iter()
        .map(|r| (r.kind, r.amount.to_string()))
        .collect()
}

// ============================================================================
// Scenarios
// ============================================================================

/// New account starts empty; one deposit shows up in balance and history
#[test]
fn test_deposit_into_new_account() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_test_context(&temp_dir);
    let owner = register(&ctx, "alice");
    let account = open_account(&ctx, owner);

    assert_eq!(balance(&ctx, account).to_string(), "0.00");

    ctx.transaction_service
        .deposit(owner, account, dec("50.00"))
        .unwrap();

    assert_eq!(balance(&ctx, account).to_string(), "50.00");
    assert_eq!(
        summary(&history(&ctx, account)),
        vec![(TransactionKind::Deposit, "50.00".to_string())]
    );
}

/// Overdraft is rejected and leaves balance and history untouched
#[test]
fn test_overdraft_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_test_context(&temp_dir);
    let owner = register(&ctx, "alice");
    let account = open_account(&ctx, owner);
    ctx.transaction_service
        .deposit(owner, account, dec("50.00"))
        .unwrap();
    let before = history(&ctx, account);

    let err = ctx
        .transaction_service
        .withdraw(owner, account, dec("75.00"))
        .unwrap_err();

    assert!(matches!(err, Error::InsufficientFunds { .. }));
    assert_eq!(err.code(), "insufficient_funds");
    assert_eq!(balance(&ctx, account), dec("50.00"));
    assert_eq!(history(&ctx, account), before);
}

/// Transfer moves funds and appends one record on each side
#[test]
fn test_transfer_between_accounts() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_test_context(&temp_dir);
    let owner = register(&ctx, "alice");
    let a = open_account(&ctx, owner);
    let b = open_account(&ctx, owner);
    ctx.transaction_service.deposit(owner, a, dec("100.00")).unwrap();

    let receipt = ctx
        .transaction_service
        .transfer(owner, a, b, dec("40.00"))
        .unwrap();

    assert_eq!(balance(&ctx, a), dec("60.00"));
    assert_eq!(balance(&ctx, b), dec("40.00"));
    assert_eq!(history(&ctx, a).last(), Some(&receipt.withdrawal));
    assert_eq!(
        summary(&history(&ctx, b)),
        vec![(TransactionKind::Deposit, "40.00".to_string())]
    );
}

/// Negative deposit is rejected with no state change
#[test]
fn test_negative_deposit_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_test_context(&temp_dir);
    let owner = register(&ctx, "alice");
    let account = open_account(&ctx, owner);

    let err = ctx
        .transaction_service
        .deposit(owner, account, dec("-5.00"))
        .unwrap_err();

    assert!(matches!(err, Error::InvalidAmount(_)));
    assert_eq!(balance(&ctx, account), Decimal::ZERO);
    assert!(history(&ctx, account).is_empty());
}

/// Self-transfer is balance-neutral and records both legs
#[test]
fn test_self_transfer_is_noop_with_two_records() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_test_context(&temp_dir);
    let owner = register(&ctx, "alice");
    let account = open_account(&ctx, owner);
    ctx.transaction_service
        .deposit(owner, account, dec("10.00"))
        .unwrap();

    ctx.transaction_service
        .transfer(owner, account, account, dec("10.00"))
        .unwrap();

    assert_eq!(balance(&ctx, account), dec("10.00"));
    let records = history(&ctx, account);
    assert_eq!(
        summary(&records[1..]),
        vec![
            (TransactionKind::Withdrawal, "10.00".to_string()),
            (TransactionKind::Deposit, "10.00".to_string()),
        ]
    );
}

// ============================================================================
// Ledger Properties
// ============================================================================

/// Balance equals the history total after every step and never goes negative
#[test]
fn test_balance_always_matches_history() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_test_context(&temp_dir);
    let owner = register(&ctx, "alice");
    let account = open_account(&ctx, owner);

    let steps = [
        ("deposit", "120.00"),
        ("withdraw", "20.50"),
        ("withdraw", "200.00"),
        ("deposit", "0.01"),
        ("withdraw", "99.51"),
        ("withdraw", "0.01"),
        ("withdraw", "0.01"),
    ];

    for (op, amount) in steps {
        let _ = match op {
            "deposit" => ctx.transaction_service.deposit(owner, account, dec(amount)),
            _ => ctx.transaction_service.withdraw(owner, account, dec(amount)),
        };
        let current = balance(&ctx, account);
        assert!(current >= Decimal::ZERO);
        assert_eq!(current, net_amount(&history(&ctx, account)));
    }

    assert_eq!(balance(&ctx, account), Decimal::ZERO);
}

/// Failed transfer appends nothing anywhere
#[test]
fn test_failed_transfer_is_all_or_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_test_context(&temp_dir);
    let owner = register(&ctx, "alice");
    let a = open_account(&ctx, owner);
    let b = open_account(&ctx, owner);
    ctx.transaction_service.deposit(owner, a, dec("50.00")).unwrap();

    let err = ctx
        .transaction_service
        .transfer(owner, a, b, dec("80.00"))
        .unwrap_err();
    assert!(matches!(err, Error::InsufficientFunds { .. }));

    assert_eq!(balance(&ctx, a), dec("50.00"));
    assert_eq!(balance(&ctx, b), Decimal::ZERO);
    assert_eq!(history(&ctx, a).len(), 1);
    assert!(history(&ctx, b).is_empty());
}

/// History order follows creation order across interleaved operations
#[test]
fn test_history_order_with_interleaving() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_test_context(&temp_dir);
    let owner = register(&ctx, "alice");
    let a = open_account(&ctx, owner);
    let b = open_account(&ctx, owner);

    let tx = &ctx.transaction_service;
    tx.deposit(owner, a, dec("10.00")).unwrap();
    tx.deposit(owner, b, dec("20.00")).unwrap();
    tx.transfer(owner, b, a, dec("5.00")).unwrap();
    tx.withdraw(owner, a, dec("1.00")).unwrap();
    tx.deposit(owner, b, dec("2.00")).unwrap();

    assert_eq!(
        summary(&history(&ctx, a)),
        vec![
            (TransactionKind::Deposit, "10.00".to_string()),
            (TransactionKind::Deposit, "5.00".to_string()),
            (TransactionKind::Withdrawal, "1.00".to_string()),
        ]
    );
    assert_eq!(
        summary(&history(&ctx, b)),
        vec![
            (TransactionKind::Deposit, "20.00".to_string()),
            (TransactionKind::Withdrawal, "5.00".to_string()),
            (TransactionKind::Deposit, "2.00".to_string()),
        ]
    );
    assert!(history(&ctx, a).windows(2).all(|w| w[0].id < w[1].id));
}

/// Operating on another user's account is rejected without side effects
#[test]
fn test_foreign_account_operations_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_test_context(&temp_dir);
    let alice = register(&ctx, "alice");
    let mallory = register(&ctx, "mallory");
    let alices = open_account(&ctx, alice);
    let mallorys = open_account(&ctx, mallory);
    ctx.transaction_service
        .deposit(alice, alices, dec("100.00"))
        .unwrap();

    let tx = &ctx.transaction_service;
    assert!(matches!(
        tx.withdraw(mallory, alices, dec("10.00")),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        tx.transfer(mallory, alices, mallorys, dec("10.00")),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        ctx.history_service.get_owned_history(mallory, alices),
        Err(Error::NotFound(_))
    ));

    assert_eq!(balance(&ctx, alices), dec("100.00"));
    assert_eq!(balance(&ctx, mallorys), Decimal::ZERO);
    assert_eq!(history(&ctx, alices).len(), 1);
}

/// Registration and login through the credential store
#[test]
fn test_credentials() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_test_context(&temp_dir);
    let alice = register(&ctx, "alice");

    assert_eq!(
        ctx.credential_service
            .authenticate("alice", "correct horse")
            .unwrap(),
        alice
    );
    assert!(matches!(
        ctx.credential_service.authenticate("alice", "battery staple"),
        Err(Error::InvalidCredentials)
    ));
    assert!(matches!(
        ctx.credential_service.register("alice", "anything"),
        Err(Error::DuplicateUsername(_))
    ));
}

/// Data survives closing and reopening the context
#[test]
fn test_ledger_persists_across_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let (owner, account) = {
        let ctx = create_test_context(&temp_dir);
        let owner = register(&ctx, "alice");
        let account = open_account(&ctx, owner);
        ctx.transaction_service
            .deposit(owner, account, dec("12.34"))
            .unwrap();
        (owner, account)
    };

    let ctx = BanklineContext::new(temp_dir.path()).unwrap();
    assert_eq!(balance(&ctx, account), dec("12.34"));
    assert_eq!(
        ctx.credential_service
            .authenticate("alice", "correct horse")
            .unwrap(),
        owner
    );
    assert!(temp_dir.path().join("bankline.duckdb").exists());
}

/// Doctor passes on a ledger built only through services
#[test]
fn test_doctor_on_healthy_ledger() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_test_context(&temp_dir);
    let owner = register(&ctx, "alice");
    let a = open_account(&ctx, owner);
    let b = open_account(&ctx, owner);
    ctx.transaction_service.deposit(owner, a, dec("70.00")).unwrap();
    ctx.transaction_service.transfer(owner, a, b, dec("30.00")).unwrap();
    let _ = ctx.transaction_service.withdraw(owner, b, dec("31.00"));

    let result = ctx.doctor_service.run_checks().unwrap();
    assert!(result.is_healthy());
    assert_eq!(result.summary.errors, 0);
}

/// Status totals are scoped to the owner
#[test]
fn test_status_summary() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_test_context(&temp_dir);
    let alice = register(&ctx, "alice");
    let bob = register(&ctx, "bob");
    let a = open_account(&ctx, alice);
    let b = open_account(&ctx, alice);
    let c = open_account(&ctx, bob);
    ctx.transaction_service.deposit(alice, a, dec("10.00")).unwrap();
    ctx.transaction_service.deposit(alice, b, dec("5.50")).unwrap();
    ctx.transaction_service.deposit(bob, c, dec("1000.00")).unwrap();

    let status = ctx.status_service.get_status(alice).unwrap();
    assert_eq!(status.total_accounts, 2);
    assert_eq!(status.total_transactions, 2);
    assert_eq!(status.total_balance, dec("15.50"));
}
