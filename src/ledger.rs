//! Balance and rollup computations over the flat transaction log.
//!
//! Everything here is a pure function of the rows handed in: repeated calls
//! with unchanged input yield identical output, and empty input yields the
//! zero-value result rather than an error.

use chrono::{DateTime, Duration, Local};
use rust_decimal::Decimal;

use crate::domain::{Account, Transaction, TransferRole, TxKind};

/// Days covered by the rolling spending window.
pub const WINDOW_DAYS: i64 = 7;

/// Contribution of a row to its own account's balance: positive for income
/// and incoming transfer legs, negative for expenses and outgoing legs.
pub fn signed_amount(t: &Transaction) -> Decimal {
    match t.kind {
        TxKind::Income => t.amount,
        TxKind::Expense => -t.amount,
        // A NULL role only exists in hand-edited data; fall back to incoming.
        TxKind::Transfer => match t.transfer_role {
            Some(TransferRole::Outgoing) => -t.amount,
            Some(TransferRole::Incoming) | None => t.amount,
        },
    }
}

/// Current balance of one account: starting balance plus every row that
/// references it. Intermediate sums are never rounded.
pub fn balance(account: &Account, transactions: &[Transaction]) -> Decimal {
    account.starting_balance
        + transactions
            .iter()
            .filter(|t| t.account_id == account.id)
            .map(signed_amount)
            .sum::<Decimal>()
}

pub fn total_balance(accounts: &[Account], transactions: &[Transaction]) -> Decimal {
    accounts.iter().map(|a| balance(a, transactions)).sum()
}

/// Resolves a transfer leg's counterpart row via its pair id. A dangling
/// reference (counterpart deleted out from under us) yields `None`; the
/// missing side simply contributes nothing and no error is surfaced.
pub fn transfer_counterpart<'a>(
    t: &Transaction,
    transactions: &'a [Transaction],
) -> Option<&'a Transaction> {
    let pair_id = t.transfer_pair_id?;
    transactions.iter().find(|other| other.id == pair_id)
}

/// Sum of expense amounts in the trailing week `[now - 7 days, now]`.
pub fn weekly_total(transactions: &[Transaction], now: DateTime<Local>) -> Decimal {
    let start = now - Duration::days(WINDOW_DAYS);
    transactions
        .iter()
        .filter(|t| t.kind == TxKind::Expense)
        .filter(|t| {
            let d = t.date.with_timezone(&Local);
            d >= start && d <= now
        })
        .map(|t| t.amount)
        .sum()
}

pub fn daily_average(transactions: &[Transaction], now: DateTime<Local>) -> Decimal {
    weekly_total(transactions, now) / Decimal::from(WINDOW_DAYS)
}

/// Expense totals for each of the 7 calendar days ending at `now`'s day,
/// oldest first. Always exactly 7 entries; days without expenses carry zero.
/// Day boundaries follow the local calendar day of the timestamp.
pub fn daily_series(transactions: &[Transaction], now: DateTime<Local>) -> Vec<(String, Decimal)> {
    let mut series = Vec::with_capacity(WINDOW_DAYS as usize);
    for offset in (0..WINDOW_DAYS).rev() {
        let day = now.date_naive() - Duration::days(offset);
        let total = transactions
            .iter()
            .filter(|t| t.kind == TxKind::Expense)
            .filter(|t| t.date.with_timezone(&Local).date_naive() == day)
            .map(|t| t.amount)
            .sum::<Decimal>();
        series.push((day.format("%m/%d").to_string(), total));
    }
    series
}

/// Per-category expense totals inside `[start, end]`, sorted descending by
/// amount. The sort is stable, so equal amounts keep the order their
/// categories were first encountered in. Uncategorized rows are excluded.
/// Callers truncate for top-N views; the full ranking is returned.
pub fn category_totals(
    transactions: &[Transaction],
    start: DateTime<Local>,
    end: DateTime<Local>,
) -> Vec<(String, Decimal)> {
    let mut totals: Vec<(String, Decimal)> = Vec::new();
    for t in transactions {
        if t.kind != TxKind::Expense {
            continue;
        }
        let d = t.date.with_timezone(&Local);
        if d < start || d > end {
            continue;
        }
        let Some(category) = t.category.as_deref() else {
            continue;
        };
        match totals.iter_mut().find(|(name, _)| name.as_str() == category) {
            Some((_, total)) => *total += t.amount,
            None => totals.push((category.to_string(), t.amount)),
        }
    }
    totals.sort_by(|a, b| b.1.cmp(&a.1));
    totals
}
