use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::LedgerError;

/// Largest magnitude accepted for amounts and starting balances.
pub const MAX_AMOUNT: i64 = 999_999_999;
pub const MAX_NAME_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// Description used when a transfer is recorded without a note.
pub const DEFAULT_TRANSFER_DESCRIPTION: &str = "Account transfer";
pub const TRANSFER_CATEGORY: &str = "Transfer";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKind {
    Cash,
    Bank,
    CreditCard,
    Savings,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Cash => "cash",
            AccountKind::Bank => "bank",
            AccountKind::CreditCard => "credit-card",
            AccountKind::Savings => "savings",
        }
    }

    /// Human-facing label for tables.
    pub fn label(&self) -> &'static str {
        match self {
            AccountKind::Cash => "Cash",
            AccountKind::Bank => "Bank Account",
            AccountKind::CreditCard => "Credit Card",
            AccountKind::Savings => "Savings",
        }
    }
}

impl FromStr for AccountKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(AccountKind::Cash),
            "bank" => Ok(AccountKind::Bank),
            "credit-card" => Ok(AccountKind::CreditCard),
            "savings" => Ok(AccountKind::Savings),
            other => Err(LedgerError::Validation(format!(
                "Unknown account kind: {other} (expected cash, bank, credit-card or savings)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxKind {
    Income,
    Expense,
    Transfer,
}

impl TxKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxKind::Income => "income",
            TxKind::Expense => "expense",
            TxKind::Transfer => "transfer",
        }
    }
}

impl FromStr for TxKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TxKind::Income),
            "expense" => Ok(TxKind::Expense),
            "transfer" => Ok(TxKind::Transfer),
            other => Err(LedgerError::Other(format!(
                "Unknown transaction kind in transactions table: {other}"
            ))),
        }
    }
}

/// Which side of a transfer pair a row represents. Stored on the row at
/// creation time; direction never depends on description text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferRole {
    Outgoing,
    Incoming,
}

impl TransferRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferRole::Outgoing => "out",
            TransferRole::Incoming => "in",
        }
    }
}

impl FromStr for TransferRole {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "out" => Ok(TransferRole::Outgoing),
            "in" => Ok(TransferRole::Incoming),
            other => Err(LedgerError::Other(format!(
                "Unknown transfer role in transactions table: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub kind: AccountKind,
    pub starting_balance: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub description: String,
    /// Always a positive magnitude; direction comes from `kind` and, for
    /// transfers, from `transfer_role`.
    pub amount: Decimal,
    pub kind: TxKind,
    pub account_id: i64,
    pub category: Option<String>,
    pub transfer_role: Option<TransferRole>,
    pub transfer_pair_id: Option<i64>,
}

pub fn validate_account_name(name: &str) -> Result<(), LedgerError> {
    if name.trim().is_empty() {
        return Err(LedgerError::Validation(
            "Account name is required".to_string(),
        ));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(LedgerError::Validation(format!(
            "Account name too long ({MAX_NAME_LEN} char max)"
        )));
    }
    Ok(())
}

pub fn validate_starting_balance(balance: Decimal) -> Result<(), LedgerError> {
    if balance.abs() > Decimal::from(MAX_AMOUNT) {
        return Err(LedgerError::Validation(format!(
            "Starting balance too large (max ±{MAX_AMOUNT})"
        )));
    }
    Ok(())
}

pub fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::Validation(
            "Amount must be greater than zero".to_string(),
        ));
    }
    if amount > Decimal::from(MAX_AMOUNT) {
        return Err(LedgerError::Validation(format!(
            "Amount too large (max {MAX_AMOUNT})"
        )));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), LedgerError> {
    if description.trim().is_empty() {
        return Err(LedgerError::Validation(
            "Description is required".to_string(),
        ));
    }
    validate_description_length(description)
}

/// Transfers allow an empty note (it defaults), so only the length is checked.
pub fn validate_description_length(description: &str) -> Result<(), LedgerError> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(LedgerError::Validation(format!(
            "Description too long ({MAX_DESCRIPTION_LEN} char max)"
        )));
    }
    Ok(())
}
