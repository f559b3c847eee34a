use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use std::fs;
use std::path::PathBuf;

use crate::config::{AppPaths, now_utc};
use crate::domain::{
    self, Account, AccountKind, DEFAULT_TRANSFER_DESCRIPTION, TRANSFER_CATEGORY, Transaction,
    TransferRole, TxKind,
};
use crate::error::{LedgerError, Result};

/// Handle to the on-disk ledger. One store is opened per logical operation
/// (in practice, per CLI invocation) and passed explicitly into every core
/// call; there is no global connection.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(paths: &AppPaths) -> Result<(Self, PathBuf)> {
        fs::create_dir_all(&paths.data_dir)?;

        let db_path = paths.data_dir.join("monedero.sqlite3");
        let conn = Connection::open(&db_path)?;

        let store = Self { conn };
        store.migrate()?;
        Ok((store, db_path))
    }

    fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS accounts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                kind TEXT NOT NULL,
                starting_balance TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                description TEXT NOT NULL,
                amount TEXT NOT NULL,
                kind TEXT NOT NULL,
                account_id INTEGER NOT NULL REFERENCES accounts(id),
                category TEXT,
                transfer_role TEXT,
                transfer_pair_id INTEGER
            );

            CREATE INDEX IF NOT EXISTS idx_transactions_account ON transactions(account_id);
            CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);
            "#,
        )?;
        Ok(())
    }

    pub fn create_account(
        &self,
        name: &str,
        kind: AccountKind,
        starting_balance: Decimal,
    ) -> Result<Account> {
        domain::validate_account_name(name)?;
        domain::validate_starting_balance(starting_balance)?;

        if self.get_account_by_name(name)?.is_some() {
            return Err(LedgerError::DuplicateName(name.to_string()));
        }

        let created_at = now_utc();
        self.conn.execute(
            "INSERT INTO accounts (name, kind, starting_balance, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                name,
                kind.as_str(),
                starting_balance.to_string(),
                created_at.to_rfc3339()
            ],
        )?;

        Ok(Account {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
            kind,
            starting_balance,
            created_at,
        })
    }

    pub fn list_accounts(&self) -> Result<Vec<Account>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, kind, starting_balance, created_at FROM accounts ORDER BY id ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (id, name, kind, starting_balance, created_at) = row?;
            out.push(parse_account(id, name, &kind, &starting_balance, &created_at)?);
        }
        Ok(out)
    }

    pub fn get_account(&self, id: i64) -> Result<Option<Account>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, kind, starting_balance, created_at FROM accounts WHERE id = ?1",
        )?;

        let mut rows = stmt.query(params![id])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };

        let account = parse_account(
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            &row.get::<_, String>(2)?,
            &row.get::<_, String>(3)?,
            &row.get::<_, String>(4)?,
        )?;
        Ok(Some(account))
    }

    pub fn get_account_by_name(&self, name: &str) -> Result<Option<Account>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, kind, starting_balance, created_at FROM accounts WHERE name = ?1",
        )?;

        let mut rows = stmt.query(params![name])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };

        let account = parse_account(
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            &row.get::<_, String>(2)?,
            &row.get::<_, String>(3)?,
            &row.get::<_, String>(4)?,
        )?;
        Ok(Some(account))
    }

    /// Records a plain income or expense row. Transfer rows are only ever
    /// created in pairs via [`Store::create_transfer`].
    pub fn create_transaction(
        &self,
        kind: TxKind,
        account_id: i64,
        description: &str,
        amount: Decimal,
        category: Option<&str>,
        date: DateTime<Utc>,
    ) -> Result<Transaction> {
        if kind == TxKind::Transfer {
            return Err(LedgerError::Validation(
                "Transfers are recorded with the transfer command".to_string(),
            ));
        }
        domain::validate_description(description)?;
        domain::validate_amount(amount)?;

        if self.get_account(account_id)?.is_none() {
            return Err(LedgerError::AccountNotFound(account_id));
        }

        self.conn.execute(
            "INSERT INTO transactions (date, description, amount, kind, account_id, category) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                date.to_rfc3339(),
                description,
                amount.to_string(),
                kind.as_str(),
                account_id,
                category
            ],
        )?;

        Ok(Transaction {
            id: self.conn.last_insert_rowid(),
            date,
            description: description.to_string(),
            amount,
            kind,
            account_id,
            category: category.map(str::to_string),
            transfer_role: None,
            transfer_pair_id: None,
        })
    }

    /// Moves funds between two accounts as a linked pair of transfer rows.
    ///
    /// Both legs and their mutual pair link are written inside a single
    /// SQLite transaction: a failure at any point rolls the whole unit back,
    /// so a half-created pair is never visible.
    pub fn create_transfer(
        &mut self,
        from_id: i64,
        to_id: i64,
        amount: Decimal,
        description: &str,
        date: DateTime<Utc>,
    ) -> Result<(Transaction, Transaction)> {
        if from_id == to_id {
            return Err(LedgerError::Validation(
                "Cannot transfer to the same account".to_string(),
            ));
        }
        domain::validate_amount(amount)?;
        domain::validate_description_length(description)?;

        let description = if description.trim().is_empty() {
            DEFAULT_TRANSFER_DESCRIPTION
        } else {
            description
        };

        let from = self
            .get_account(from_id)?
            .ok_or(LedgerError::AccountNotFound(from_id))?;
        let to = self
            .get_account(to_id)?
            .ok_or(LedgerError::AccountNotFound(to_id))?;

        let out_description = format!("Transfer to {}: {}", to.name, description);
        let in_description = format!("Transfer from {}: {}", from.name, description);

        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO transactions (date, description, amount, kind, account_id, category, transfer_role) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                date.to_rfc3339(),
                out_description,
                amount.to_string(),
                TxKind::Transfer.as_str(),
                from.id,
                TRANSFER_CATEGORY,
                TransferRole::Outgoing.as_str()
            ],
        )?;
        let out_id = tx.last_insert_rowid();

        tx.execute(
            "INSERT INTO transactions (date, description, amount, kind, account_id, category, transfer_role) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                date.to_rfc3339(),
                in_description,
                amount.to_string(),
                TxKind::Transfer.as_str(),
                to.id,
                TRANSFER_CATEGORY,
                TransferRole::Incoming.as_str()
            ],
        )?;
        let in_id = tx.last_insert_rowid();

        tx.execute(
            "UPDATE transactions SET transfer_pair_id = ?1 WHERE id = ?2",
            params![in_id, out_id],
        )?;
        tx.execute(
            "UPDATE transactions SET transfer_pair_id = ?1 WHERE id = ?2",
            params![out_id, in_id],
        )?;

        tx.commit()?;

        let outgoing = Transaction {
            id: out_id,
            date,
            description: out_description,
            amount,
            kind: TxKind::Transfer,
            account_id: from.id,
            category: Some(TRANSFER_CATEGORY.to_string()),
            transfer_role: Some(TransferRole::Outgoing),
            transfer_pair_id: Some(in_id),
        };
        let incoming = Transaction {
            id: in_id,
            date,
            description: in_description,
            amount,
            kind: TxKind::Transfer,
            account_id: to.id,
            category: Some(TRANSFER_CATEGORY.to_string()),
            transfer_role: Some(TransferRole::Incoming),
            transfer_pair_id: Some(out_id),
        };
        Ok((outgoing, incoming))
    }

    /// All transactions in insertion order (date, then id). The ledger view
    /// walks this newest-first; the aggregators rely on the stable order for
    /// tie-breaking.
    pub fn list_transactions(&self) -> Result<Vec<Transaction>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date, description, amount, kind, account_id, category, transfer_role, transfer_pair_id \
             FROM transactions ORDER BY date ASC, id ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, i64>(5)?,
                row.get::<_, Option<String>>(6)?,
                row.get::<_, Option<String>>(7)?,
                row.get::<_, Option<i64>>(8)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (id, date, description, amount, kind, account_id, category, role, pair_id) = row?;

            let transfer_role = match role {
                None => None,
                Some(raw) => Some(raw.parse::<TransferRole>()?),
            };

            out.push(Transaction {
                id,
                date: parse_stored_timestamp(&date, "date in transactions table")?,
                description,
                amount: parse_stored_decimal(&amount, "amount in transactions table")?,
                kind: kind.parse::<TxKind>()?,
                account_id,
                category,
                transfer_role,
                transfer_pair_id: pair_id,
            });
        }
        Ok(out)
    }
}

fn parse_account(
    id: i64,
    name: String,
    kind: &str,
    starting_balance: &str,
    created_at: &str,
) -> Result<Account> {
    Ok(Account {
        id,
        name,
        kind: kind.parse::<AccountKind>().map_err(|_| {
            LedgerError::Other(format!("Unknown account kind in accounts table: {kind}"))
        })?,
        starting_balance: parse_stored_decimal(starting_balance, "starting_balance in accounts table")?,
        created_at: parse_stored_timestamp(created_at, "created_at in accounts table")?,
    })
}

fn parse_stored_decimal(raw: &str, what: &str) -> Result<Decimal> {
    raw.parse::<Decimal>()
        .map_err(|_| LedgerError::Other(format!("Invalid decimal {what}: {raw}")))
}

fn parse_stored_timestamp(raw: &str, what: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|_| LedgerError::Other(format!("Invalid {what}: {raw}")))
}
