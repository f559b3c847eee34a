mod cli;
mod config;
mod db;
mod domain;
mod error;
mod ledger;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Duration, Local, Utc};
use clap::Parser;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::cli::{
    AccountCmd, AddTransactionArgs, Cli, Command, InsightsArgs, LedgerArgs, OutputFormat,
    TransferArgs,
};
use crate::config::{AppConfig, app_paths, load_or_init_config, now_utc, write_config};
use crate::db::Store;
use crate::domain::{Account, AccountKind, Transaction, TransferRole, TxKind};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let paths = app_paths(cli.home.clone())?;
    let (cfg, cfg_path) = load_or_init_config(&paths)?;

    match cli.command {
        Command::Target(args) => {
            let amount = parse_decimal(&args.amount, "target")?;
            if amount <= Decimal::ZERO {
                return Err(anyhow!("Weekly target must be > 0"));
            }
            let mut cfg = cfg;
            cfg.weekly_target = amount;
            write_config(&cfg_path, &cfg)?;
            println!("Weekly spending target set to {}.", money(amount));
            Ok(())
        }
        cmd => {
            let (mut store, _db_path) = Store::open(&paths)?;

            match cmd {
                Command::Account(args) => handle_account(&store, args.cmd)?,
                Command::Income(args) => handle_add(&store, TxKind::Income, args)?,
                Command::Expense(args) => handle_add(&store, TxKind::Expense, args)?,
                Command::Transfer(args) => handle_transfer(&mut store, args)?,
                Command::Balance(args) => print_balances(&store, args.format)?,
                Command::Ledger(args) => print_ledger(&store, &args)?,
                Command::Insights(args) => print_insights(&store, &cfg, &args)?,
                Command::Target(_) => unreachable!(),
            }

            Ok(())
        }
    }
}

fn handle_account(store: &Store, cmd: AccountCmd) -> Result<()> {
    match cmd {
        AccountCmd::Add {
            name,
            kind,
            balance,
        } => {
            let kind = kind.parse::<AccountKind>()?;
            let starting_balance = match balance {
                Some(raw) => parse_decimal(&raw, "starting balance")?,
                None => Decimal::ZERO,
            };

            let account = store.create_account(&name, kind, starting_balance)?;
            println!(
                "Created account '{}' ({}) with starting balance {}.",
                account.name,
                account.kind.label(),
                money(account.starting_balance)
            );
        }
        AccountCmd::List { format } => {
            let accounts = store.list_accounts()?;
            if accounts.is_empty() {
                println!("(no accounts)");
                return Ok(());
            }

            match format {
                OutputFormat::Tsv => {
                    for a in &accounts {
                        println!(
                            "{}\t{}\t{}",
                            a.name,
                            a.kind.as_str(),
                            a.created_at.with_timezone(&Local).format("%Y-%m-%d")
                        );
                    }
                }
                OutputFormat::Table => {
                    let rows: Vec<Vec<String>> = accounts
                        .iter()
                        .map(|a| {
                            vec![
                                a.name.clone(),
                                a.kind.label().to_string(),
                                a.created_at
                                    .with_timezone(&Local)
                                    .format("%Y-%m-%d")
                                    .to_string(),
                            ]
                        })
                        .collect();
                    print_table(&["NAME", "KIND", "CREATED"], &rows);
                }
            }
        }
    }
    Ok(())
}

fn handle_add(store: &Store, kind: TxKind, args: AddTransactionArgs) -> Result<()> {
    let account = find_account(store, &args.account)?;
    let amount = parse_decimal(&args.amount, "amount")?;
    let date = parse_rfc3339_or_now(args.date.as_deref())?;

    let t = store.create_transaction(
        kind,
        account.id,
        &args.description,
        amount,
        args.category.as_deref(),
        date,
    )?;

    println!(
        "Recorded {} of {} on '{}'.",
        t.kind.as_str(),
        money(t.amount),
        account.name
    );
    Ok(())
}

fn handle_transfer(store: &mut Store, args: TransferArgs) -> Result<()> {
    let from = find_account(store, &args.from)?;
    let to = find_account(store, &args.to)?;
    let amount = parse_decimal(&args.amount, "amount")?;
    let date = parse_rfc3339_or_now(args.date.as_deref())?;
    let description = args.description.unwrap_or_default();

    let (outgoing, _incoming) = store.create_transfer(from.id, to.id, amount, &description, date)?;

    println!(
        "Transferred {} from {} to {}.",
        money(outgoing.amount),
        from.name,
        to.name
    );
    Ok(())
}

fn print_balances(store: &Store, format: OutputFormat) -> Result<()> {
    let accounts = store.list_accounts()?;
    if accounts.is_empty() {
        println!("(no accounts)");
        return Ok(());
    }

    let transactions = store.list_transactions()?;
    let total = ledger::total_balance(&accounts, &transactions);

    match format {
        OutputFormat::Tsv => {
            for a in &accounts {
                println!(
                    "{}\t{}\t{}",
                    a.name,
                    a.kind.as_str(),
                    plain(ledger::balance(a, &transactions))
                );
            }
            println!("total\t\t{}", plain(total));
        }
        OutputFormat::Table => {
            let mut rows: Vec<Vec<String>> = accounts
                .iter()
                .map(|a| {
                    vec![
                        a.name.clone(),
                        a.kind.label().to_string(),
                        money(ledger::balance(a, &transactions)),
                    ]
                })
                .collect();
            rows.push(vec!["TOTAL".to_string(), String::new(), money(total)]);
            print_table(&["ACCOUNT", "KIND", "BALANCE"], &rows);
        }
    }
    Ok(())
}

fn print_ledger(store: &Store, args: &LedgerArgs) -> Result<()> {
    let accounts = store.list_accounts()?;
    let transactions = store.list_transactions()?;

    let account_filter = match &args.account {
        None => None,
        Some(name) => {
            let account = accounts
                .iter()
                .find(|a| a.name == *name)
                .ok_or_else(|| anyhow!("No such account: '{name}'"))?;
            Some(account.id)
        }
    };

    let mut rows: Vec<Vec<String>> = Vec::new();
    for t in transactions.iter().rev() {
        if let Some(id) = account_filter {
            if t.account_id != id {
                continue;
            }
        }
        if let Some(cat) = &args.category {
            if t.category.as_deref() != Some(cat.as_str()) {
                continue;
            }
        }

        let pair = match t.kind {
            TxKind::Transfer => ledger::transfer_counterpart(t, &transactions)
                .map(|c| account_name(&accounts, c.account_id).to_string())
                .unwrap_or_default(),
            _ => String::new(),
        };

        rows.push(vec![
            t.date.with_timezone(&Local).format("%m/%d").to_string(),
            t.description.clone(),
            signed_money(ledger::signed_amount(t)),
            tx_type_label(t).to_string(),
            t.category.clone().unwrap_or_else(|| "Uncategorized".to_string()),
            account_name(&accounts, t.account_id).to_string(),
            pair,
        ]);
    }

    if rows.is_empty() {
        println!("(no transactions)");
        return Ok(());
    }

    match args.format {
        OutputFormat::Tsv => {
            for row in &rows {
                println!("{}", row.join("\t"));
            }
        }
        OutputFormat::Table => {
            print_table(
                &["DATE", "DESCRIPTION", "AMOUNT", "TYPE", "CATEGORY", "ACCOUNT", "PAIR"],
                &rows,
            );
        }
    }
    Ok(())
}

fn print_insights(store: &Store, cfg: &AppConfig, args: &InsightsArgs) -> Result<()> {
    let now = parse_rfc3339_or_now(args.as_of.as_deref())?.with_timezone(&Local);
    let transactions = store.list_transactions()?;

    let weekly = ledger::weekly_total(&transactions, now);
    let average = ledger::daily_average(&transactions, now);
    let series = ledger::daily_series(&transactions, now);
    let window_start = now - Duration::days(ledger::WINDOW_DAYS);
    let categories = ledger::category_totals(&transactions, window_start, now);

    match args.format {
        OutputFormat::Tsv => {
            println!("weekly_total\t{}", plain(weekly));
            println!("daily_average\t{}", plain(average));
            println!("weekly_target\t{}", plain(cfg.weekly_target));
            for (label, amount) in &series {
                println!("day\t{label}\t{}", plain(*amount));
            }
            for (category, amount) in &categories {
                println!("category\t{category}\t{}", plain(*amount));
            }
        }
        OutputFormat::Table => {
            let percent = if cfg.weekly_target > Decimal::ZERO {
                ((weekly / cfg.weekly_target) * Decimal::from(100)).min(Decimal::from(100))
            } else {
                Decimal::ZERO
            };

            println!("Weekly total    {:>12}", money(weekly));
            println!("Daily average   {:>12}", money(average));
            println!("Weekly target   {:>12}", money(cfg.weekly_target));
            let percent_str = format!("{}%", percent.round_dp(1));
            println!(
                "Progress        {:>12} {}",
                percent_str,
                progress_bar(percent, 20)
            );

            println!();
            println!("Spending trend (last {} days)", ledger::WINDOW_DAYS);
            let max = series
                .iter()
                .map(|(_, amount)| *amount)
                .max()
                .unwrap_or(Decimal::ZERO);
            for (label, amount) in &series {
                println!("{label}  {:>12}  {}", money(*amount), trend_bar(*amount, max, 30));
            }

            println!();
            if categories.is_empty() {
                println!("(no categorized expenses)");
            } else {
                println!("Top categories this week");
                let total_categorized: Decimal = categories.iter().map(|(_, a)| *a).sum();
                for (category, amount) in categories.iter().take(10) {
                    let pct = if total_categorized > Decimal::ZERO {
                        (*amount / total_categorized) * Decimal::from(100)
                    } else {
                        Decimal::ZERO
                    };
                    let pct_str = format!("{}%", pct.round_dp(1));
                    println!(
                        "{:<22} {:>12} {:>7} {}",
                        category,
                        money(*amount),
                        pct_str,
                        progress_bar(pct, 15)
                    );
                }
            }
        }
    }
    Ok(())
}

fn find_account(store: &Store, name: &str) -> Result<Account> {
    store
        .get_account_by_name(name)?
        .ok_or_else(|| anyhow!("No such account: '{name}'"))
}

fn account_name(accounts: &[Account], id: i64) -> &str {
    accounts
        .iter()
        .find(|a| a.id == id)
        .map(|a| a.name.as_str())
        .unwrap_or("Unknown")
}

fn tx_type_label(t: &Transaction) -> &'static str {
    match t.kind {
        TxKind::Income => "Income",
        TxKind::Expense => "Expense",
        TxKind::Transfer => match t.transfer_role {
            Some(TransferRole::Outgoing) => "Transfer Out",
            Some(TransferRole::Incoming) | None => "Transfer In",
        },
    }
}

fn parse_decimal(raw: &str, field: &'static str) -> Result<Decimal> {
    raw.parse::<Decimal>()
        .with_context(|| format!("Invalid decimal for {field}: {raw}"))
}

fn parse_rfc3339_or_now(raw: Option<&str>) -> Result<DateTime<Utc>> {
    match raw {
        None => Ok(now_utc()),
        Some(s) => Ok(DateTime::parse_from_rfc3339(s)
            .with_context(|| format!("Invalid RFC3339 timestamp: {s}"))?
            .with_timezone(&Utc)),
    }
}

/// Two-decimal display rounding happens here, never inside the calculators.
fn money(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}

fn signed_money(amount: Decimal) -> String {
    if amount < Decimal::ZERO {
        format!("-${:.2}", (-amount).round_dp(2))
    } else {
        format!("+${:.2}", amount.round_dp(2))
    }
}

fn plain(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

fn progress_bar(percent: Decimal, width: usize) -> String {
    let pct = percent
        .round_dp(0)
        .to_i64()
        .unwrap_or(0)
        .clamp(0, 100) as usize;
    let filled = pct * width / 100;
    format!("[{}{}]", "=".repeat(filled), "-".repeat(width - filled))
}

fn trend_bar(amount: Decimal, max: Decimal, width: usize) -> String {
    if max <= Decimal::ZERO {
        return String::new();
    }
    let filled = ((amount / max) * Decimal::from(width as i64))
        .round()
        .to_i64()
        .unwrap_or(0)
        .clamp(0, width as i64) as usize;
    "=".repeat(filled)
}

fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    if headers.is_empty() {
        println!("(no columns)");
        return;
    }

    let cols = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();

    for row in rows {
        for (i, cell) in row.iter().take(cols).enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }

    fn print_row(cells: &[String], widths: &[usize]) {
        print!("|");
        for (i, w) in widths.iter().enumerate() {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            print!(" {:width$} |", cell, width = *w);
        }
        println!();
    }

    fn print_sep(widths: &[usize]) {
        print!("|");
        for w in widths {
            print!("{}|", "-".repeat(w + 2));
        }
        println!();
    }

    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    print_row(&header_cells, &widths);
    print_sep(&widths);
    for row in rows {
        print_row(row, &widths);
    }
}
