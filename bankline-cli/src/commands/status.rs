//! Status command - show account status and summary

use anyhow::Result;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use super::{login, report, Credentials};
use crate::output;

pub fn run(credentials: &Credentials, json: bool) -> Result<()> {
    let (ctx, user_id) = login(credentials)?;
    let result = ctx.status_service.get_status(user_id);

    report(json, result, |status| {
        println!("{}", "Ledger Status".bold());
        println!();

        // Vertical key-value summary
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.add_row(vec!["Accounts", &status.total_accounts.to_string()]);
        table.add_row(vec!["Transactions", &status.total_transactions.to_string()]);
        table.add_row(vec!["Total balance", &output::format_money(status.total_balance)]);
        println!("{}", table);

        if !status.accounts.is_empty() {
            println!();
            for account in &status.accounts {
                println!(
                    "  • {} Account #{}: {}",
                    account.account_type,
                    account.id,
                    output::format_money(account.balance)
                );
            }
        }
    })
}
