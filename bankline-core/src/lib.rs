//! Bankline Core - ledger logic for users, accounts and money movement
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core business entities (User, Account, TransactionRecord)
//! - **ports**: Trait definitions for external dependencies (LedgerStore, CredentialStore)
//! - **services**: Business logic orchestration
//! - **adapters**: Concrete implementations (DuckDB)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use adapters::duckdb::DuckDbRepository;
use config::Config;
use ports::LedgerStore;
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult};
pub use domain::{
    Account, AccountId, Argon2Params, TransactionId, TransactionKind, TransactionRecord, User,
    UserId,
};
pub use ports::CredentialStore;
pub use services::{EntryPoint, LogEvent, LoggingService, TransferReceipt};

/// Main context for Bankline operations
///
/// The primary entry point for all business logic. Holds the store handle,
/// configuration, and all services. Dropping it closes the database.
pub struct BanklineContext {
    pub config: Config,
    pub db_path: PathBuf,
    pub repository: Arc<DuckDbRepository>,
    pub account_service: AccountService,
    pub transaction_service: TransactionService,
    pub history_service: HistoryService,
    pub credential_service: CredentialService,
    pub status_service: StatusService,
    pub doctor_service: DoctorService,
}

impl BanklineContext {
    /// Open (or create) the ledger in `data_dir`
    pub fn new(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create {}", data_dir.display()))?;
        let config = Config::load(data_dir)?;
        let db_path = config.database_path(data_dir);

        let repository = Arc::new(
            DuckDbRepository::new(&db_path)
                .with_context(|| format!("Failed to open {}", db_path.display()))?,
        );

        // Initialize schema
        repository.ensure_schema()?;

        let store: Arc<dyn LedgerStore> = repository.clone();
        let credential_service =
            CredentialService::new(Arc::clone(&store), config.password_hashing.clone());

        Ok(Self {
            account_service: AccountService::new(Arc::clone(&store)),
            transaction_service: TransactionService::new(Arc::clone(&store)),
            history_service: HistoryService::new(Arc::clone(&store)),
            status_service: StatusService::new(Arc::clone(&store)),
            doctor_service: DoctorService::new(store),
            credential_service,
            config,
            db_path,
            repository,
        })
    }
}
