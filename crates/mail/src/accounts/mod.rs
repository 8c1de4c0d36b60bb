//! Account maintenance around launch
//!
//! Backup/restore, bulk upgrade from older versions, and reconciliation
//! with the external account registry.

mod backup;
mod reconcile;
mod registry;
mod upgrade;

pub use backup::{AccountBackup, BACKUP_FILE, RestoreAccounts};
pub use reconcile::{AccountReconciler, Reconcile, ReconcileStats};
pub use registry::{AccountRegistry, AccountsUpdateListener, InMemoryAccountRegistry, Subscription};
pub use upgrade::{BulkUpgrade, LEGACY_ACCOUNTS_FILE, LegacyAccountUpgrade};
