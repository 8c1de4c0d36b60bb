//! Reconciliation of local accounts with the external account registry

use std::sync::Arc;

use anyhow::Result;
use log::{info, warn};

use super::registry::AccountRegistry;
use crate::state::AppState;
use crate::storage::AccountStore;

/// Statistics from a reconciliation pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileStats {
    /// Local accounts deleted because the registry no longer has them
    pub local_removed: usize,
    /// Registry entries removed because no local account backs them
    pub registry_removed: usize,
}

impl ReconcileStats {
    pub fn changed(&self) -> bool {
        self.local_removed > 0 || self.registry_removed > 0
    }
}

/// Bring local accounts in line with the account registry
pub trait Reconcile: Send + Sync {
    fn reconcile(&self) -> Result<ReconcileStats>;
}

/// Reconciles an [`AccountStore`] against an [`AccountRegistry`]
///
/// * A local account whose address is gone from the registry is deleted.
/// * A registry entry with no local account is removed from the registry.
///
/// When a local account was deleted the UI is told through
/// [`AppState::set_notify_ui_accounts_changed`].
pub struct AccountReconciler {
    store: Arc<dyn AccountStore>,
    registry: Arc<dyn AccountRegistry>,
    state: Arc<AppState>,
}

impl AccountReconciler {
    pub fn new(
        store: Arc<dyn AccountStore>,
        registry: Arc<dyn AccountRegistry>,
        state: Arc<AppState>,
    ) -> Self {
        Self {
            store,
            registry,
            state,
        }
    }
}

impl Reconcile for AccountReconciler {
    fn reconcile(&self) -> Result<ReconcileStats> {
        let mut stats = ReconcileStats::default();
        let registered = self.registry.registered_accounts()?;
        let local = self.store.list_accounts()?;

        for account in &local {
            let known = registered.iter().any(|email| account.matches_email(email));
            if !known {
                info!("Account {} removed from registry, deleting local copy", account.id);
                if self.store.delete_account(account.id)? {
                    stats.local_removed += 1;
                }
            }
        }

        for email in &registered {
            let backed = local.iter().any(|account| account.matches_email(email));
            if !backed {
                info!("Registry entry without local account, removing it");
                match self.registry.remove_account(email) {
                    Ok(true) => stats.registry_removed += 1,
                    Ok(false) => {}
                    Err(e) => warn!("Failed to remove registry entry: {}", e),
                }
            }
        }

        if stats.local_removed > 0 {
            self.state.set_notify_ui_accounts_changed(true);
        }
        Ok(stats)
    }
}
