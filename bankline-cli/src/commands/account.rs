//! Account command - open and list bank accounts

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Input;

use super::{login, report, Credentials};
use crate::output;

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Open a new account with a zero balance
    New {
        /// Account type, e.g. Checking or Savings
        account_type: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List your accounts
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: AccountCommands, credentials: &Credentials) -> Result<()> {
    match command {
        AccountCommands::New { account_type, json } => run_new(credentials, account_type, json),
        AccountCommands::List { json } => run_list(credentials, json),
    }
}

fn run_new(credentials: &Credentials, account_type: Option<String>, json: bool) -> Result<()> {
    let (ctx, user_id) = login(credentials)?;

    let account_type = match account_type {
        Some(t) => t,
        None => Input::new()
            .with_prompt("Account type")
            .default("Checking".to_string())
            .interact_text()?,
    };

    let result = ctx.account_service.create_account(user_id, &account_type);
    report(json, result, |account| {
        output::success(&format!("{} account created", account.account_type));
        println!("  Account ID: {}", account.id);
    })
}

fn run_list(credentials: &Credentials, json: bool) -> Result<()> {
    let (ctx, user_id) = login(credentials)?;
    let result = ctx.account_service.list_accounts(user_id);

    report(json, result, |accounts| {
        if accounts.is_empty() {
            println!("No accounts yet. Create one with 'bank account new'.");
            return;
        }

        let mut table = output::create_table();
        table.set_header(vec!["ID", "Type", "Balance", "Opened"]);
        for account in &accounts {
            table.add_row(vec![
                account.id.to_string(),
                account.account_type.clone(),
                output::format_money(account.balance),
                output::format_time(&account.created_at),
            ]);
        }
        println!("{}", "Accounts".bold());
        println!("{}", table);
    })
}
