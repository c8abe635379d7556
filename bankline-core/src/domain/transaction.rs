//! Transaction record domain model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};
use super::AccountId;

/// Number of fractional digits a currency amount may carry
pub const AMOUNT_SCALE: u32 = 2;

/// Largest value a `DECIMAL(18, 2)` column holds: 9999999999999999.99
///
/// Bounds both single amounts and account balances.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA763_FFFF, 0x0DE0_B6B3, 0, false, AMOUNT_SCALE);

/// Opaque identifier of a transaction record; increases with insertion order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(pub i64);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Direction of a balance change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
}

impl TransactionKind {
    /// Name as stored in the `transactions.type` column
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "Deposit",
            TransactionKind::Withdrawal => "Withdrawal",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Deposit" => Ok(TransactionKind::Deposit),
            "Withdrawal" => Ok(TransactionKind::Withdrawal),
            other => Err(Error::storage(format!("unknown transaction type '{}'", other))),
        }
    }
}

/// An immutable, append-only history entry for one balance change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: TransactionId,
    pub account_id: AccountId,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub occurred_at: DateTime<Utc>,
}

impl TransactionRecord {
    /// Amount with the sign of its effect on the balance
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionKind::Deposit => self.amount,
            TransactionKind::Withdrawal => -self.amount,
        }
    }
}

/// Sum of the balance effects of a sequence of records
pub fn net_amount<'a>(records: impl IntoIterator<Item = &'a TransactionRecord>) -> Decimal {
    records.into_iter().map(TransactionRecord::signed_amount).sum()
}

/// One balance change requested of the ledger store
///
/// A batch of postings is applied as a single atomic unit: either every
/// balance change and history append commits, or none does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posting {
    pub account_id: AccountId,
    pub kind: TransactionKind,
    pub amount: Decimal,
}

impl Posting {
    pub fn deposit(account_id: AccountId, amount: Decimal) -> Self {
        Self { account_id, kind: TransactionKind::Deposit, amount }
    }

    pub fn withdrawal(account_id: AccountId, amount: Decimal) -> Self {
        Self { account_id, kind: TransactionKind::Withdrawal, amount }
    }
}

/// Validate a currency amount: strictly positive, at most two decimals,
/// no larger than [`MAX_AMOUNT`]
///
/// Returns the amount rescaled to two decimals.
pub fn validate_amount(amount: Decimal) -> Result<Decimal> {
    if amount <= Decimal::ZERO {
        return Err(Error::invalid_amount(format!(
            "amount must be greater than zero, got {}",
            amount
        )));
    }
    if amount > MAX_AMOUNT {
        return Err(Error::invalid_amount(format!(
            "amount {} exceeds the maximum of {}",
            amount, MAX_AMOUNT
        )));
    }
    if amount.normalize().scale() > AMOUNT_SCALE {
        return Err(Error::invalid_amount(format!(
            "amount {} has more than {} decimal places",
            amount, AMOUNT_SCALE
        )));
    }
    let mut rescaled = amount;
    rescaled.rescale(AMOUNT_SCALE);
    Ok(rescaled)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: TransactionKind, cents: i64) -> TransactionRecord {
        TransactionRecord {
            id: TransactionId(1),
            account_id: AccountId(1),
            kind,
            amount: Decimal::new(cents, 2),
            occurred_at: Utc::now(),
        }
    }

    #[test]
    fn test_validate_amount() {
        assert_eq!(validate_amount(Decimal::new(5000, 2)).unwrap(), Decimal::new(5000, 2));
        assert_eq!(validate_amount(Decimal::new(15, 1)).unwrap().to_string(), "1.50");
        assert_eq!(validate_amount(Decimal::new(1500, 3)).unwrap().to_string(), "1.50");
    }

    #[test]
    fn test_validate_amount_rejects_non_positive() {
        assert!(matches!(validate_amount(Decimal::ZERO), Err(Error::InvalidAmount(_))));
        assert!(matches!(
            validate_amount(Decimal::new(-500, 2)),
            Err(Error::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_validate_amount_rejects_sub_cent() {
        assert!(matches!(
            validate_amount(Decimal::new(1005, 3)),
            Err(Error::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_validate_amount_upper_bound() {
        assert_eq!(MAX_AMOUNT.to_string(), "9999999999999999.99");
        assert_eq!(validate_amount(MAX_AMOUNT).unwrap(), MAX_AMOUNT);
        assert!(matches!(
            validate_amount(MAX_AMOUNT + Decimal::new(1, 2)),
            Err(Error::InvalidAmount(_))
        ));
        assert!(matches!(
            validate_amount(Decimal::from(100_000_000_000_000_000u64)),
            Err(Error::InvalidAmount(_))
        ));
        assert!(matches!(validate_amount(Decimal::MAX), Err(Error::InvalidAmount(_))));
    }

    #[test]
    fn test_kind_round_trips_through_column_value() {
        for kind in [TransactionKind::Deposit, TransactionKind::Withdrawal] {
            assert_eq!(kind.as_str().parse::<TransactionKind>().unwrap(), kind);
        }
        assert!("Refund".parse::<TransactionKind>().is_err());
    }

    #[test]
    fn test_net_amount() {
        let records = vec![
            record(TransactionKind::Deposit, 10000),
            record(TransactionKind::Withdrawal, 4000),
            record(TransactionKind::Deposit, 250),
        ];
        assert_eq!(net_amount(&records), Decimal::new(6250, 2));
        assert_eq!(net_amount(Vec::<TransactionRecord>::new().iter()), Decimal::ZERO);
    }
}
