//! The external account registry
//!
//! The platform keeps its own list of mail accounts (the system account
//! manager). The app subscribes to changes of that list and reconciles
//! its local accounts against it.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use anyhow::Result;
use log::debug;

/// Receives notifications that the registry's account list changed
pub trait AccountsUpdateListener: Send + Sync {
    fn on_accounts_updated(&self);
}

/// Handle returned by [`AccountRegistry::add_listener`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

/// Access to the external account registry
pub trait AccountRegistry: Send + Sync {
    /// Subscribe to account list changes
    fn add_listener(&self, listener: Arc<dyn AccountsUpdateListener>) -> Subscription;

    /// Unsubscribe. Returns false if the subscription was not active.
    fn remove_listener(&self, subscription: Subscription) -> bool;

    /// Email addresses of the accounts the registry knows
    fn registered_accounts(&self) -> Result<Vec<String>>;

    /// Add an account. Returns false if it was already registered.
    fn add_account(&self, email: &str) -> Result<bool>;

    /// Remove an account. Returns false if it was not registered.
    fn remove_account(&self, email: &str) -> Result<bool>;
}

/// Process-local registry, used by tests and by hosts without a system
/// account manager
///
/// Addresses are compared case-insensitively. Listeners are called on the
/// thread that changed the registry, after its locks are released.
pub struct InMemoryAccountRegistry {
    accounts: RwLock<BTreeSet<String>>,
    listeners: RwLock<HashMap<u64, Arc<dyn AccountsUpdateListener>>>,
    next_subscription: AtomicU64,
}

impl InMemoryAccountRegistry {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(BTreeSet::new()),
            listeners: RwLock::new(HashMap::new()),
            next_subscription: AtomicU64::new(1),
        }
    }

    /// Registry pre-populated with the given addresses, without notifying
    pub fn with_accounts<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let registry = Self::new();
        {
            let mut accounts = registry.accounts.write().unwrap();
            for email in emails {
                accounts.insert(email.as_ref().to_ascii_lowercase());
            }
        }
        registry
    }

    /// Number of active subscriptions
    pub fn listener_count(&self) -> usize {
        self.listeners.read().unwrap().len()
    }

    fn notify(&self) {
        let listeners: Vec<_> = self.listeners.read().unwrap().values().cloned().collect();
        debug!("Account registry changed, notifying {} listener(s)", listeners.len());
        for listener in listeners {
            listener.on_accounts_updated();
        }
    }
}

impl Default for InMemoryAccountRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountRegistry for InMemoryAccountRegistry {
    fn add_listener(&self, listener: Arc<dyn AccountsUpdateListener>) -> Subscription {
        let id = self.next_subscription.fetch_add(1, Ordering::Relaxed);
        self.listeners.write().unwrap().insert(id, listener);
        Subscription(id)
    }

    fn remove_listener(&self, subscription: Subscription) -> bool {
        self.listeners
            .write()
            .unwrap()
            .remove(&subscription.0)
            .is_some()
    }

    fn registered_accounts(&self) -> Result<Vec<String>> {
        Ok(self.accounts.read().unwrap().iter().cloned().collect())
    }

    fn add_account(&self, email: &str) -> Result<bool> {
        let added = self
            .accounts
            .write()
            .unwrap()
            .insert(email.to_ascii_lowercase());
        if added {
            self.notify();
        }
        Ok(added)
    }

    fn remove_account(&self, email: &str) -> Result<bool> {
        let removed = self
            .accounts
            .write()
            .unwrap()
            .remove(&email.to_ascii_lowercase());
        if removed {
            self.notify();
        }
        Ok(removed)
    }
}
