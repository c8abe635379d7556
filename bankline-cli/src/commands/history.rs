//! History command - show an account's transactions

use anyhow::Result;
use colored::Colorize;

use bankline_core::domain::transaction::net_amount;
use bankline_core::AccountId;

use super::{login, report, Credentials};
use crate::output;

pub fn run(credentials: &Credentials, account_id: i64, json: bool) -> Result<()> {
    let (ctx, user_id) = login(credentials)?;
    let account_id = AccountId(account_id);
    let result = ctx.history_service.get_owned_history(user_id, account_id);

    report(json, result, |records| {
        if records.is_empty() {
            println!("No transactions for account {}.", account_id);
            return;
        }

        let mut table = output::create_table();
        table.set_header(vec!["ID", "Date", "Type", "Amount"]);
        for record in &records {
            table.add_row(vec![
                record.id.to_string(),
                output::format_time(&record.occurred_at),
                record.kind.to_string(),
                output::format_signed(record.kind, record.amount),
            ]);
        }

        println!("{}", format!("Transaction History - Account {}", account_id).bold());
        println!("{}", table);
        println!("Balance: {}", output::format_money(net_amount(&records)));
    })
}
