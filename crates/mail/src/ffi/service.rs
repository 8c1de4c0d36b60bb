//! WelcomeService facade for UniFFI export
//!
//! Lets a Swift/Kotlin shell own the welcome screen while the account
//! bookkeeping and the routing decision stay in Rust.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use log::{error, info};

use crate::accounts::{
    AccountBackup, AccountReconciler, AccountRegistry, InMemoryAccountRegistry, LegacyAccountUpgrade,
    BACKUP_FILE, LEGACY_ACCOUNTS_FILE,
};
use crate::ffi::types::*;
use crate::launch::{
    self, Destination, InlineMainThread, InlineWorker, LaunchHost, LaunchRequest, LaunchRouter,
    LaunchServices, ScreenSize,
};
use crate::models::{Account, MailboxId};
use crate::state::AppState;
use crate::storage::{AccountStore, SqliteAccountStore};
use crate::sync::SyncService;

/// Main service object for the welcome screen
///
/// The backup snapshot and the legacy account export live next to the
/// database file.
#[derive(uniffi::Object)]
pub struct WelcomeService {
    store: Arc<SqliteAccountStore>,
    registry: Arc<InMemoryAccountRegistry>,
    state: Arc<AppState>,
    data_dir: PathBuf,
    screen: ScreenSize,
}

#[uniffi::export]
impl WelcomeService {
    /// Open the account database at `db_path`
    #[uniffi::constructor]
    pub fn new(db_path: String, screen_size: FfiScreenSize) -> Result<Arc<Self>, LaunchError> {
        let db_path = PathBuf::from(db_path);
        let data_dir = db_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        if !data_dir.as_os_str().is_empty() {
            std::fs::create_dir_all(&data_dir).map_err(|e| LaunchError::Database {
                message: format!("Failed to create database directory: {}", e),
            })?;
        }

        let store = SqliteAccountStore::new(&db_path).map_err(|e| LaunchError::Database {
            message: format!("Failed to open database: {:#}", e),
        })?;

        // Without a system account manager the registry mirrors the store
        let emails: Vec<String> = store.list_accounts()?.into_iter().map(|a| a.email).collect();
        let registry = InMemoryAccountRegistry::with_accounts(emails);

        Ok(Arc::new(Self {
            store: Arc::new(store),
            registry: Arc::new(registry),
            state: AppState::global(),
            data_dir,
            screen: screen_size.into(),
        }))
    }

    // ========================================================================
    // Account Management
    // ========================================================================

    pub fn list_accounts(&self) -> Result<Vec<FfiAccount>, LaunchError> {
        let accounts = self.store.list_accounts()?;
        Ok(accounts.into_iter().map(FfiAccount::from).collect())
    }

    /// Register an account, returning it with its assigned ID
    pub fn register_account(
        &self,
        email: String,
        display_name: Option<String>,
    ) -> Result<FfiAccount, LaunchError> {
        if !email.contains('@') {
            return Err(LaunchError::InvalidArgument {
                message: format!("Not an email address: {}", email),
            });
        }
        let mut account = Account::new(&email);
        if let Some(name) = display_name {
            account = account.with_display_name(name);
        }
        let account = self.store.register_account(account)?;
        self.registry.add_account(&account.email)?;
        Ok(FfiAccount::from(account))
    }

    /// Delete an account. Returns false if it did not exist.
    pub fn delete_account(&self, account_id: i64) -> Result<bool, LaunchError> {
        let Some(account) = self.store.get_account(account_id)? else {
            return Ok(false);
        };
        let deleted = self.store.delete_account(account_id)?;
        self.registry.remove_account(&account.email)?;
        Ok(deleted)
    }

    pub fn set_default_account(&self, account_id: i64) -> Result<(), LaunchError> {
        if !self.store.is_valid_account(account_id)? {
            return Err(LaunchError::NotFound {
                resource: format!("account {}", account_id),
            });
        }
        self.store.set_default_account(account_id)?;
        Ok(())
    }

    /// Write the backup snapshot restored after data loss
    pub fn backup_accounts(&self) -> Result<u32, LaunchError> {
        let written = self.backup().backup_accounts()?;
        Ok(written as u32)
    }

    /// Import accounts from the legacy export. Run when `launch` reported
    /// [`FfiActivation::Upgrading`].
    pub fn import_legacy_accounts(&self) -> Result<u32, LaunchError> {
        let imported = self.upgrade().import_accounts()?;
        for account in self.store.list_accounts()? {
            self.registry.add_account(&account.email)?;
        }
        Ok(imported as u32)
    }

    /// Whether accounts were removed behind the UI's back since the last launch
    pub fn accounts_changed(&self) -> bool {
        self.state.notify_ui_accounts_changed()
    }

    // ========================================================================
    // Routing
    // ========================================================================

    /// Decide the destination for `request` without opening anything
    pub fn decide_destination(&self, request: FfiLaunchRequest) -> Result<FfiDestination, LaunchError> {
        let request = LaunchRequest::from(request);
        let destination = launch::decide_destination(self.store.as_ref(), &request, self.screen)?;
        Ok(FfiDestination::from(&destination))
    }

    /// Run a full activation of the welcome screen
    ///
    /// Blocks until the destination was opened; call it off the UI thread.
    /// `callback` sees `open` (or `on_error`) and then `finish`, all on the
    /// calling thread.
    pub fn launch(
        &self,
        request: FfiLaunchRequest,
        callback: Box<dyn LaunchCallback>,
    ) -> Result<FfiActivation, LaunchError> {
        let store: Arc<dyn AccountStore> = self.store.clone();
        let registry: Arc<dyn AccountRegistry> = self.registry.clone();
        let backup = self.backup().with_registry(registry.clone());

        let services = LaunchServices {
            store: store.clone(),
            state: self.state.clone(),
            upgrade: Arc::new(self.upgrade()),
            restore: Arc::new(backup),
            sync: Arc::new(HostSync),
            registry: registry.clone(),
            reconciler: Arc::new(AccountReconciler::new(store, registry, self.state.clone())),
            worker: Arc::new(InlineWorker),
            main_thread: Arc::new(InlineMainThread),
        };
        let host = Arc::new(CallbackHost { callback });

        let router = LaunchRouter::new(services, host, self.screen);
        let activation = router.on_create(&LaunchRequest::from(request))?;
        router.on_destroy();
        Ok(activation.into())
    }
}

impl WelcomeService {
    fn backup(&self) -> AccountBackup {
        AccountBackup::new(self.data_dir.join(BACKUP_FILE), self.store.clone())
    }

    fn upgrade(&self) -> LegacyAccountUpgrade {
        LegacyAccountUpgrade::new(self.data_dir.join(LEGACY_ACCOUNTS_FILE), self.store.clone())
    }
}

/// Forwards screen transitions to the foreign callback
struct CallbackHost {
    callback: Box<dyn LaunchCallback>,
}

impl LaunchHost for CallbackHost {
    fn open(&self, destination: &Destination) -> Result<()> {
        self.callback.open(FfiDestination::from(destination));
        Ok(())
    }

    fn finish(&self) {
        self.callback.finish();
    }

    fn report_failure(&self, error: &anyhow::Error) {
        error!("Launch routing failed: {:#}", error);
        self.callback.on_error(format!("{:#}", error));
    }
}

/// The shell runs mail sync itself
struct HostSync;

impl SyncService for HostSync {
    fn ensure_started(&self) -> Result<()> {
        info!("Background sync is managed by the host app");
        Ok(())
    }
}

// ============================================================================
// Request Helpers
// ============================================================================

/// Request used by the app launcher icon
#[uniffi::export]
pub fn create_start_request() -> FfiLaunchRequest {
    FfiLaunchRequest::from(&LaunchRequest::start())
}

/// Request opening an account's inbox
#[uniffi::export]
pub fn create_open_account_inbox_request(account_id: i64) -> FfiLaunchRequest {
    FfiLaunchRequest::from(&LaunchRequest::open_account_inbox(account_id))
}

/// Request opening the combined inbox of all accounts
#[uniffi::export]
pub fn create_open_combined_inbox_request() -> FfiLaunchRequest {
    FfiLaunchRequest::from(&LaunchRequest::open_combined_inbox())
}

#[uniffi::export]
pub fn create_open_mailbox_request(mailbox_id: i64) -> FfiLaunchRequest {
    FfiLaunchRequest::from(&LaunchRequest::open_mailbox(MailboxId::new(mailbox_id)))
}

/// Parse a `cosmos://welcome?...` deep link
#[uniffi::export]
pub fn parse_launch_uri(uri: String) -> Result<FfiLaunchRequest, LaunchError> {
    let request = LaunchRequest::from_uri(&uri)?;
    Ok(FfiLaunchRequest::from(&request))
}
