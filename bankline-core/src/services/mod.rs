//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

mod account;
mod credential;
mod doctor;
mod history;
pub mod logging;
pub mod migration;
mod status;
mod transaction;

pub use account::AccountService;
pub use credential::CredentialService;
pub use doctor::{CheckResult, DoctorResult, DoctorService, DoctorSummary};
pub use history::HistoryService;
pub use logging::{EntryPoint, LogEntry, LogEvent, LoggingService};
pub use migration::{MigrationResult, MigrationService};
pub use status::{AccountSummary, StatusService, StatusSummary};
pub use transaction::{TransactionService, TransferReceipt};
