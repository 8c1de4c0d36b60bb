//! In-memory storage implementation
//!
//! Used by tests and as the store behind a freshly started process before
//! the SQLite database is opened.

use anyhow::{Result, bail};
use std::collections::BTreeMap;
use std::sync::RwLock;

use super::AccountStore;
use crate::models::{Account, AccountId};

/// In-memory implementation of AccountStore
///
/// Accounts live in a BTreeMap keyed by ID so listing order matches the
/// SQLite store.
pub struct InMemoryAccountStore {
    accounts: RwLock<BTreeMap<AccountId, Account>>,
    next_id: RwLock<AccountId>,
}

impl InMemoryAccountStore {
    /// Create a new empty in-memory store
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(BTreeMap::new()),
            next_id: RwLock::new(1),
        }
    }

    /// Create a store pre-populated with accounts for the given addresses
    pub fn with_accounts<I, S>(emails: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let store = Self::new();
        for email in emails {
            store.register_account(Account::new(email))?;
        }
        Ok(store)
    }
}

impl Default for InMemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountStore for InMemoryAccountStore {
    fn count_accounts(&self) -> Result<usize> {
        Ok(self.accounts.read().unwrap().len())
    }

    fn is_valid_account(&self, id: AccountId) -> Result<bool> {
        Ok(self.accounts.read().unwrap().contains_key(&id))
    }

    fn default_account_id(&self) -> Result<Option<AccountId>> {
        let accounts = self.accounts.read().unwrap();
        let flagged = accounts.values().find(|a| a.is_default).map(|a| a.id);
        Ok(flagged.or_else(|| accounts.keys().next().copied()))
    }

    fn list_accounts(&self) -> Result<Vec<Account>> {
        Ok(self.accounts.read().unwrap().values().cloned().collect())
    }

    fn get_account(&self, id: AccountId) -> Result<Option<Account>> {
        Ok(self.accounts.read().unwrap().get(&id).cloned())
    }

    fn get_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let accounts = self.accounts.read().unwrap();
        Ok(accounts.values().find(|a| a.matches_email(email)).cloned())
    }

    fn register_account(&self, mut account: Account) -> Result<Account> {
        if let Some(existing) = self.get_account_by_email(&account.email)? {
            return Ok(existing);
        }

        let mut next_id = self.next_id.write().unwrap();
        account.id = *next_id;
        *next_id += 1;

        let mut accounts = self.accounts.write().unwrap();
        if account.is_default {
            for other in accounts.values_mut() {
                other.is_default = false;
            }
        }
        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    fn delete_account(&self, id: AccountId) -> Result<bool> {
        Ok(self.accounts.write().unwrap().remove(&id).is_some())
    }

    fn set_default_account(&self, id: AccountId) -> Result<()> {
        let mut accounts = self.accounts.write().unwrap();
        if !accounts.contains_key(&id) {
            bail!("Account {} not found", id);
        }
        for account in accounts.values_mut() {
            account.is_default = account.id == id;
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.accounts.write().unwrap().clear();
        *self.next_id.write().unwrap() = 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_assigns_ids() {
        let store = InMemoryAccountStore::new();
        let a = store.register_account(Account::new("a@example.com")).unwrap();
        let b = store.register_account(Account::new("b@example.com")).unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(store.count_accounts().unwrap(), 2);
    }

    #[test]
    fn test_register_same_email_is_idempotent() {
        let store = InMemoryAccountStore::new();
        let first = store.register_account(Account::new("a@example.com")).unwrap();
        let again = store.register_account(Account::new("A@example.com")).unwrap();

        assert_eq!(first.id, again.id);
        assert_eq!(store.count_accounts().unwrap(), 1);
    }

    #[test]
    fn test_default_account_falls_back_to_lowest_id() {
        let store = InMemoryAccountStore::with_accounts(["a@example.com", "b@example.com"]).unwrap();
        assert_eq!(store.default_account_id().unwrap(), Some(1));

        store.set_default_account(2).unwrap();
        assert_eq!(store.default_account_id().unwrap(), Some(2));

        store.delete_account(2).unwrap();
        assert_eq!(store.default_account_id().unwrap(), Some(1));
    }

    #[test]
    fn test_default_account_empty_store() {
        let store = InMemoryAccountStore::new();
        assert_eq!(store.default_account_id().unwrap(), None);
    }

    #[test]
    fn test_validity() {
        let store = InMemoryAccountStore::with_accounts(["a@example.com"]).unwrap();
        assert!(store.is_valid_account(1).unwrap());
        assert!(!store.is_valid_account(99).unwrap());
        assert!(!store.is_valid_account(-1).unwrap());
    }

    #[test]
    fn test_set_default_unknown_account_fails() {
        let store = InMemoryAccountStore::new();
        assert!(store.set_default_account(5).is_err());
    }
}
