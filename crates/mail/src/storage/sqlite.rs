//! SQLite-based account storage

use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use rusqlite_migration::{M, Migrations};

use super::traits::AccountStore;
use crate::models::{Account, AccountId};

/// Database migrations
///
/// Each migration is applied in order. The user_version pragma tracks which
/// migrations have been applied.
fn migrations() -> Migrations<'static> {
    Migrations::new(vec![
        // Migration 1: Initial schema
        M::up(
            r#"
            CREATE TABLE accounts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE COLLATE NOCASE,
                display_name TEXT,
                is_default INTEGER NOT NULL DEFAULT 0,
                added_at TEXT NOT NULL
            );
            "#,
        ),
        // Migration 2: Fast lookup of the default account
        M::up(
            r#"
            CREATE INDEX idx_accounts_default ON accounts(is_default DESC, id ASC);
            "#,
        ),
    ])
}

const ACCOUNT_COLUMNS: &str = "id, email, display_name, is_default, added_at";

fn account_from_row(row: &Row<'_>) -> rusqlite::Result<Account> {
    let added_at: String = row.get(4)?;
    let added_at = DateTime::parse_from_rfc3339(&added_at)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now());

    Ok(Account {
        id: row.get(0)?,
        email: row.get(1)?,
        display_name: row.get(2)?,
        is_default: row.get(3)?,
        added_at,
    })
}

/// SQLite-based account storage
pub struct SqliteAccountStore {
    conn: Mutex<Connection>,
}

impl SqliteAccountStore {
    /// Open (or create) the account database at `db_path`
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(db_path.as_ref())
            .with_context(|| format!("Failed to open database at {:?}", db_path.as_ref()))?;

        // WAL lets the sync service write while the launch router reads.
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            "#,
        )?;

        Self::with_connection(conn)
    }

    /// Open a private in-memory database
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::with_connection(conn)
    }

    fn with_connection(mut conn: Connection) -> Result<Self> {
        migrations()
            .to_latest(&mut conn)
            .context("Failed to run database migrations")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl AccountStore for SqliteAccountStore {
    fn count_accounts(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM accounts", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn is_valid_account(&self, id: AccountId) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM accounts WHERE id = ?",
            [id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn default_account_id(&self) -> Result<Option<AccountId>> {
        let conn = self.conn.lock().unwrap();
        let id = conn
            .query_row(
                "SELECT id FROM accounts ORDER BY is_default DESC, id ASC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn list_accounts(&self) -> Result<Vec<Account>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM accounts ORDER BY id ASC",
            ACCOUNT_COLUMNS
        ))?;
        let accounts = stmt
            .query_map([], account_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(accounts)
    }

    fn get_account(&self, id: AccountId) -> Result<Option<Account>> {
        let conn = self.conn.lock().unwrap();
        let account = conn
            .query_row(
                &format!("SELECT {} FROM accounts WHERE id = ?", ACCOUNT_COLUMNS),
                [id],
                account_from_row,
            )
            .optional()?;
        Ok(account)
    }

    fn get_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let conn = self.conn.lock().unwrap();
        let account = conn
            .query_row(
                &format!("SELECT {} FROM accounts WHERE email = ?", ACCOUNT_COLUMNS),
                [email],
                account_from_row,
            )
            .optional()?;
        Ok(account)
    }

    fn register_account(&self, account: Account) -> Result<Account> {
        if let Some(existing) = self.get_account_by_email(&account.email)? {
            return Ok(existing);
        }

        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        if account.is_default {
            tx.execute("UPDATE accounts SET is_default = 0", [])?;
        }
        tx.execute(
            "INSERT INTO accounts (email, display_name, is_default, added_at) VALUES (?, ?, ?, ?)",
            params![
                account.email,
                account.display_name,
                account.is_default,
                account.added_at.to_rfc3339(),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Account { id, ..account })
    }

    fn delete_account(&self, id: AccountId) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let removed = conn.execute("DELETE FROM accounts WHERE id = ?", [id])?;
        Ok(removed > 0)
    }

    fn set_default_account(&self, id: AccountId) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        tx.execute("UPDATE accounts SET is_default = 0", [])?;
        let updated = tx.execute("UPDATE accounts SET is_default = 1 WHERE id = ?", [id])?;
        if updated == 0 {
            // Dropping the transaction rolls back the cleared flags
            bail!("Account {} not found", id);
        }
        tx.commit()?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch("DELETE FROM accounts; DELETE FROM sqlite_sequence WHERE name = 'accounts';")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn create_test_store() -> (SqliteAccountStore, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        // Use .test.sqlite extension to clearly distinguish from production databases
        let db_path = dir.path().join("accounts.test.sqlite");
        let store = SqliteAccountStore::new(&db_path).unwrap();
        (store, dir)
    }

    #[test]
    fn test_migrations_are_valid() {
        assert!(migrations().validate().is_ok());
    }

    #[test]
    fn test_account_crud() {
        let (store, _dir) = create_test_store();

        let account = store
            .register_account(Account::new("a@example.com").with_display_name("Personal"))
            .unwrap();
        assert_eq!(account.id, 1);

        let retrieved = store.get_account(account.id).unwrap().unwrap();
        assert_eq!(retrieved.email, "a@example.com");
        assert_eq!(retrieved.display_name.as_deref(), Some("Personal"));

        assert!(store.is_valid_account(account.id).unwrap());
        assert!(store.delete_account(account.id).unwrap());
        assert!(!store.delete_account(account.id).unwrap());
        assert!(!store.is_valid_account(account.id).unwrap());
        assert_eq!(store.count_accounts().unwrap(), 0);
    }

    #[test]
    fn test_register_duplicate_email() {
        let (store, _dir) = create_test_store();

        let first = store.register_account(Account::new("a@example.com")).unwrap();
        let again = store.register_account(Account::new("A@EXAMPLE.com")).unwrap();
        assert_eq!(first.id, again.id);
        assert_eq!(store.count_accounts().unwrap(), 1);
    }

    #[test]
    fn test_default_account() {
        let (store, _dir) = create_test_store();
        assert_eq!(store.default_account_id().unwrap(), None);

        store.register_account(Account::new("a@example.com")).unwrap();
        let b = store.register_account(Account::new("b@example.com")).unwrap();
        assert_eq!(store.default_account_id().unwrap(), Some(1));

        store.set_default_account(b.id).unwrap();
        assert_eq!(store.default_account_id().unwrap(), Some(b.id));

        // A failed update keeps the previous default
        assert!(store.set_default_account(99).is_err());
        assert_eq!(store.default_account_id().unwrap(), Some(b.id));
    }

    #[test]
    fn test_register_default_clears_previous() {
        let (store, _dir) = create_test_store();

        store
            .register_account(Account::new("a@example.com").with_default(true))
            .unwrap();
        let b = store
            .register_account(Account::new("b@example.com").with_default(true))
            .unwrap();

        let defaults: Vec<_> = store
            .list_accounts()
            .unwrap()
            .into_iter()
            .filter(|a| a.is_default)
            .collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].id, b.id);
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("accounts.test.sqlite");

        {
            let store = SqliteAccountStore::new(&db_path).unwrap();
            store.register_account(Account::new("a@example.com")).unwrap();
        }

        let store = SqliteAccountStore::new(&db_path).unwrap();
        assert_eq!(store.count_accounts().unwrap(), 1);
    }

    #[test]
    fn test_clear() {
        let store = SqliteAccountStore::in_memory().unwrap();
        store.register_account(Account::new("a@example.com")).unwrap();
        store.clear().unwrap();
        assert_eq!(store.count_accounts().unwrap(), 0);

        let account = store.register_account(Account::new("b@example.com")).unwrap();
        assert_eq!(account.id, 1);
    }
}
