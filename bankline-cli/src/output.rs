//! Output formatting utilities

use std::collections::HashMap;

use chrono::{DateTime, Local, Utc};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use rust_decimal::Decimal;
use serde::Serialize;

use bankline_core::{OperationResult, TransactionKind};

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Format a currency amount: 1234.5 -> "$1234.50"
pub fn format_money(amount: Decimal) -> String {
    if amount.is_sign_negative() && !amount.is_zero() {
        format!("-${:.2}", amount.abs())
    } else {
        format!("${:.2}", amount)
    }
}

/// Amount with the sign of its effect on the balance
pub fn format_signed(kind: TransactionKind, amount: Decimal) -> String {
    match kind {
        TransactionKind::Deposit => format!("+{}", format_money(amount)).green().to_string(),
        TransactionKind::Withdrawal => format!("-{}", format_money(amount)).red().to_string(),
    }
}

/// Format a UTC timestamp in local time
pub fn format_time(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Print a successful result as pretty JSON
pub fn print_json<T: Serialize>(data: T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&OperationResult::ok(data))?);
    Ok(())
}

/// Print a failed ledger operation as pretty JSON
pub fn print_json_error(e: &bankline_core::Error) -> anyhow::Result<()> {
    let mut context = HashMap::new();
    context.insert("code".to_string(), serde_json::Value::from(e.code()));
    let result: OperationResult<()> = OperationResult::fail_with_context(e.to_string(), context);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
