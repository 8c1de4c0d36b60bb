//! Storage trait definitions

use crate::models::{Account, AccountId};
use anyhow::Result;

/// Trait for account storage operations
///
/// This trait abstracts over the storage backends (in-memory, SQLite) and
/// provides the account queries the launch router and the account
/// maintenance tasks need.
pub trait AccountStore: Send + Sync {
    /// Count configured accounts
    fn count_accounts(&self) -> Result<usize>;

    /// Check whether an account with this ID exists
    fn is_valid_account(&self, id: AccountId) -> Result<bool>;

    /// ID of the account to open when none was requested
    ///
    /// This is the account flagged as default, or the lowest ID when no
    /// account carries the flag. `None` only when there are no accounts.
    fn default_account_id(&self) -> Result<Option<AccountId>>;

    /// List all accounts ordered by ID
    fn list_accounts(&self) -> Result<Vec<Account>>;

    /// Get an account by ID
    fn get_account(&self, id: AccountId) -> Result<Option<Account>>;

    /// Get an account by email address (case-insensitive)
    fn get_account_by_email(&self, email: &str) -> Result<Option<Account>>;

    /// Register a new account, returning it with its assigned ID
    ///
    /// Registering an address that already exists returns the stored account.
    fn register_account(&self, account: Account) -> Result<Account>;

    /// Delete an account. Returns false if it did not exist.
    fn delete_account(&self, id: AccountId) -> Result<bool>;

    /// Flag an account as the default, clearing the flag on all others
    fn set_default_account(&self, id: AccountId) -> Result<()>;

    /// Clear all data (for testing)
    fn clear(&self) -> Result<()>;
}
