//! Deposit, withdraw and transfer commands

use std::str::FromStr;

use anyhow::{bail, Result};
use dialoguer::Select;
use rust_decimal::Decimal;

use bankline_core::{AccountId, Error};

use super::{login, report, Credentials};
use crate::output;

/// Parse a user-supplied amount such as "50", "50.00" or "$1,250.75"
pub fn parse_amount(input: &str) -> std::result::Result<Decimal, Error> {
    let cleaned: String = input
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    Decimal::from_str(&cleaned)
        .map_err(|_| Error::invalid_amount(format!("'{}' is not a number", input.trim())))
}

pub fn run_deposit(
    credentials: &Credentials,
    account_id: i64,
    amount: &str,
    json: bool,
) -> Result<()> {
    let (ctx, user_id) = login(credentials)?;
    let result = parse_amount(amount).and_then(|amount| {
        ctx.transaction_service
            .deposit(user_id, AccountId(account_id), amount)
    });

    report(json, result, |record| {
        output::success("Deposit successful");
        println!("  Amount: {}", output::format_money(record.amount));
        if let Ok(balance) = ctx.account_service.get_balance(record.account_id) {
            println!("  New balance: {}", output::format_money(balance));
        }
    })
}

pub fn run_withdraw(
    credentials: &Credentials,
    account_id: i64,
    amount: &str,
    json: bool,
) -> Result<()> {
    let (ctx, user_id) = login(credentials)?;
    let result = parse_amount(amount).and_then(|amount| {
        ctx.transaction_service
            .withdraw(user_id, AccountId(account_id), amount)
    });

    report(json, result, |record| {
        output::success("Withdrawal successful");
        println!("  Amount: {}", output::format_money(record.amount));
        if let Ok(balance) = ctx.account_service.get_balance(record.account_id) {
            println!("  New balance: {}", output::format_money(balance));
        }
    })
}

pub fn run_transfer(
    credentials: &Credentials,
    from: i64,
    to: Option<i64>,
    amount: &str,
    json: bool,
) -> Result<()> {
    let (ctx, user_id) = login(credentials)?;
    let from = AccountId(from);

    let to = match to {
        Some(id) => AccountId(id),
        None => {
            // Offer the owner's other accounts
            let targets = ctx.account_service.transfer_targets(user_id, from)?;
            if targets.is_empty() {
                bail!("No other accounts available for transfer");
            }
            let labels: Vec<String> = targets
                .iter()
                .map(|a| {
                    format!(
                        "{} - {} ({})",
                        a.id,
                        a.account_type,
                        output::format_money(a.balance)
                    )
                })
                .collect();
            let choice = Select::new()
                .with_prompt("Transfer to")
                .items(&labels)
                .default(0)
                .interact()?;
            targets[choice].id
        }
    };

    let result = parse_amount(amount)
        .and_then(|amount| ctx.transaction_service.transfer(user_id, from, to, amount));

    report(json, result, |receipt| {
        output::success("Transfer successful");
        println!(
            "  {} from account {} to account {}",
            output::format_money(receipt.withdrawal.amount),
            receipt.withdrawal.account_id,
            receipt.deposit.account_id
        );
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("50").unwrap(), Decimal::new(50, 0));
        assert_eq!(parse_amount(" $1,250.75 ").unwrap(), Decimal::new(125075, 2));
        assert_eq!(parse_amount("-5.00").unwrap(), Decimal::new(-500, 2));
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        let err = parse_amount("fifty").unwrap_err();
        assert_eq!(err.code(), "invalid_amount");
    }
}
