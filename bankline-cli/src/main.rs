//! Bankline CLI - a small bank ledger in your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{account, doctor, history, logs, money, register, status, Credentials};

/// Bankline - users, accounts and money movement with a full audit trail
#[derive(Parser)]
#[command(name = "bank", version, about, long_about = None)]
struct Cli {
    /// Username to log in as
    #[arg(long, short, global = true, env = "BANKLINE_USERNAME")]
    username: Option<String>,

    /// Password (prompted for when omitted)
    #[arg(long, short, global = true, env = "BANKLINE_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new user
    Register {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Open or list accounts
    Account {
        #[command(subcommand)]
        command: account::AccountCommands,
    },

    /// Deposit money into an account
    Deposit {
        /// Account ID
        account_id: i64,
        /// Amount, e.g. 50 or 50.00
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Withdraw money from an account
    Withdraw {
        /// Account ID
        account_id: i64,
        /// Amount, e.g. 50 or 50.00
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Transfer money between two of your accounts
    Transfer {
        /// Source account ID
        from: i64,
        /// Amount, e.g. 50 or 50.00
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Destination account ID (choose interactively if omitted)
        #[arg(long)]
        to: Option<i64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show an account's transaction history
    History {
        /// Account ID
        account_id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show account status and summary
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run ledger health checks
    Doctor {
        /// Show verbose output
        #[arg(long, short)]
        verbose: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and manage application logs
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

impl Commands {
    /// Name recorded in the event log
    fn name(&self) -> &'static str {
        match self {
            Commands::Register { .. } => "register",
            Commands::Account { command } => match command {
                account::AccountCommands::New { .. } => "account new",
                account::AccountCommands::List { .. } => "account list",
            },
            Commands::Deposit { .. } => "deposit",
            Commands::Withdraw { .. } => "withdraw",
            Commands::Transfer { .. } => "transfer",
            Commands::History { .. } => "history",
            Commands::Status { .. } => "status",
            Commands::Doctor { .. } => "doctor",
            Commands::Logs { .. } => "logs",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let command = cli.command.name();

    let logger = commands::get_logger();
    commands::log_command(&logger, command);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            commands::log_failure(&logger, command, &e);
            output::error(&format!("Error: {:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let credentials = Credentials {
        username: cli.username,
        password: cli.password,
    };

    match cli.command {
        Commands::Register { json } => register::run(&credentials, json),
        Commands::Account { command } => account::run(command, &credentials),
        Commands::Deposit { account_id, amount, json } => {
            money::run_deposit(&credentials, account_id, &amount, json)
        }
        Commands::Withdraw { account_id, amount, json } => {
            money::run_withdraw(&credentials, account_id, &amount, json)
        }
        Commands::Transfer { from, amount, to, json } => {
            money::run_transfer(&credentials, from, to, &amount, json)
        }
        Commands::History { account_id, json } => history::run(&credentials, account_id, json),
        Commands::Status { json } => status::run(&credentials, json),
        Commands::Doctor { verbose, json } => doctor::run(verbose, json),
        Commands::Logs { command } => logs::run(command),
    }
}
