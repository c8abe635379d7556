//! CLI command implementations

pub mod account;
pub mod doctor;
pub mod history;
pub mod logs;
pub mod money;
pub mod register;
pub mod status;

use std::path::PathBuf;

use anyhow::{Context, Result};
use dialoguer::{Input, Password};
use serde::Serialize;

use crate::output;
use bankline_core::{BanklineContext, CredentialStore, EntryPoint, LoggingService, UserId};

/// Environment variable selecting the data directory
pub const DIR_ENV: &str = "BANKLINE_DIR";

/// Credentials given on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    /// Fill in whatever is missing by prompting
    pub fn resolve(&self) -> Result<(String, String)> {
        let username = match &self.username {
            Some(u) => u.clone(),
            None => Input::new().with_prompt("Username").interact_text()?,
        };
        let password = match &self.password {
            Some(p) => p.clone(),
            None => Password::new().with_prompt("Password").interact()?,
        };
        Ok((username, password))
    }
}

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let dir = get_bankline_dir().ok()?;
    std::fs::create_dir_all(&dir).ok()?;
    LoggingService::new(&dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log a command execution, ignoring any errors (logging should never break the app)
pub fn log_command(logger: &Option<LoggingService>, command: &str) {
    if let Some(l) = logger {
        let _ = l.log_command(command);
    }
}

/// Log a failed command
///
/// Ledger errors are recorded by code only, so no usernames or amounts
/// end up in the log.
pub fn log_failure(logger: &Option<LoggingService>, command: &str, error: &anyhow::Error) {
    let Some(l) = logger else { return };
    let _ = match error.downcast_ref::<bankline_core::Error>() {
        Some(core) => l.log_failure(command, core),
        None => {
            let details = (error.chain().count() > 1).then(|| format!("{:#}", error));
            l.log_error(command, &error.root_cause().to_string(), details.as_deref())
        }
    };
}

/// Get the data directory from environment or default
pub fn get_bankline_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    Ok(dirs::home_dir()
        .context("Could not find home directory")?
        .join(".bankline"))
}

/// Open the ledger
pub fn get_context() -> Result<BanklineContext> {
    let dir = get_bankline_dir()?;
    BanklineContext::new(&dir).context("Failed to initialize bankline context")
}

/// Open the ledger and log in
pub fn login(credentials: &Credentials) -> Result<(BanklineContext, UserId)> {
    let ctx = get_context()?;
    let (username, password) = credentials.resolve()?;
    let user_id = ctx.credential_service.authenticate(&username, &password)?;
    Ok((ctx, user_id))
}

/// Print a ledger result as JSON or through `render`, propagating failures
pub fn report<T: Serialize>(
    json: bool,
    result: bankline_core::domain::result::Result<T>,
    render: impl FnOnce(T),
) -> Result<()> {
    match result {
        Ok(data) if json => output::print_json(data),
        Ok(data) => {
            render(data);
            Ok(())
        }
        Err(e) => {
            if json {
                output::print_json_error(&e)?;
            }
            Err(e.into())
        }
    }
}
