//! Wiring of the launch router and its collaborators

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use mail::launch::{MainThread, Worker};
use mail::{
    Account, AccountBackup, AccountReconciler, AccountRegistry, AccountStore, Activation, AppState,
    BackgroundSync, InMemoryAccountRegistry, LaunchRequest, LaunchRouter, LaunchServices,
    LaunchSettings, LegacyAccountUpgrade, RayonWorker, SqliteAccountStore, SyncJob,
};

use crate::host::ConsoleHost;
use crate::runtime::{MainQueue, TokioWorker};

/// How long the main task waits for the router to finish
const LAUNCH_TIMEOUT: Duration = Duration::from_secs(30);

/// The console app has no mail transport; a pass only records which
/// accounts were due
struct LogOnlySyncJob;

impl SyncJob for LogOnlySyncJob {
    fn sync_account(&self, account: &Account) -> Result<()> {
        debug!("Sync due for {}", account.label());
        Ok(())
    }
}

pub struct WelcomeApp {
    settings: LaunchSettings,
    state: Arc<AppState>,
    store: Arc<SqliteAccountStore>,
    registry: Arc<InMemoryAccountRegistry>,
    backup: Arc<AccountBackup>,
    upgrade: Arc<LegacyAccountUpgrade>,
    sync: Arc<BackgroundSync>,
}

impl WelcomeApp {
    /// Open the account database and build the collaborators
    pub fn open(settings: LaunchSettings) -> Result<Self> {
        let db_path = settings.database_path()?;
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let store = Arc::new(SqliteAccountStore::new(&db_path)?);
        info!("Account database: {}", db_path.display());

        // No system account manager here: the registry starts as a mirror
        // of the local accounts
        let emails: Vec<String> = store.list_accounts()?.into_iter().map(|a| a.email).collect();
        let registry = Arc::new(InMemoryAccountRegistry::with_accounts(emails));

        let backup = AccountBackup::new(settings.backup_path()?, store.clone())
            .with_registry(registry.clone());
        let upgrade = LegacyAccountUpgrade::new(settings.legacy_accounts_path()?, store.clone());
        let sync = BackgroundSync::new(store.clone(), Arc::new(LogOnlySyncJob), settings.sync_options());

        Ok(Self {
            settings,
            state: AppState::global(),
            store,
            registry,
            backup: Arc::new(backup),
            upgrade: Arc::new(upgrade),
            sync: Arc::new(sync),
        })
    }

    fn worker(&self) -> Result<Arc<dyn Worker>> {
        Ok(match self.settings.worker_threads {
            0 => Arc::new(TokioWorker::current()),
            threads => Arc::new(RayonWorker::with_threads(threads)?),
        })
    }

    fn services(&self, worker: Arc<dyn Worker>, main_thread: Arc<dyn MainThread>) -> LaunchServices {
        let store: Arc<dyn AccountStore> = self.store.clone();
        let registry: Arc<dyn AccountRegistry> = self.registry.clone();
        LaunchServices {
            store: store.clone(),
            state: self.state.clone(),
            upgrade: self.upgrade.clone(),
            restore: self.backup.clone(),
            sync: self.sync.clone(),
            registry: registry.clone(),
            reconciler: Arc::new(AccountReconciler::new(store, registry, self.state.clone())),
            worker,
            main_thread,
        }
    }

    /// Run one activation of the welcome screen on the current task
    pub async fn launch<W>(&self, request: &LaunchRequest, host: Arc<ConsoleHost<W>>) -> Result<Activation>
    where
        W: Write + Send + 'static,
    {
        let mut queue = MainQueue::new();
        let services = self.services(self.worker()?, Arc::new(queue.handle()));
        let router = LaunchRouter::new(services, host, self.settings.screen_size);

        let activation = router.on_create(request)?;
        queue
            .run_until_finished(LAUNCH_TIMEOUT, || router.is_finished())
            .await?;
        router.on_destroy();
        Ok(activation)
    }

    /// Do the work of the upgrade screen: import the legacy accounts
    pub async fn complete_upgrade(&self) -> Result<usize> {
        let upgrade = self.upgrade.clone();
        let imported = tokio::task::spawn_blocking(move || upgrade.import_accounts())
            .await
            .context("Upgrade task panicked")??;

        for account in self.store.list_accounts()? {
            self.registry.add_account(&account.email)?;
        }
        Ok(imported)
    }

    /// Snapshot the accounts for the next restore and stop background work
    pub fn shutdown(&self) {
        match self.store.count_accounts() {
            Ok(0) => {}
            Ok(_) => match self.backup.backup_accounts() {
                Ok(written) => debug!("Backed up {} account(s)", written),
                Err(e) => warn!("Account backup failed: {:#}", e),
            },
            Err(e) => warn!("Could not count accounts for backup: {:#}", e),
        }
        self.sync.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mail::{Destination, MailboxId, ScreenSize};
    use tempfile::{TempDir, tempdir};

    fn settings(dir: &TempDir, screen_size: ScreenSize) -> LaunchSettings {
        LaunchSettings {
            screen_size,
            database_path: Some(dir.path().join("accounts.sqlite")),
            backup_path: Some(dir.path().join("backup.json")),
            legacy_accounts_path: Some(dir.path().join("legacy.json")),
            sync_interval_secs: 3600,
            ..Default::default()
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_launch_without_accounts_opens_setup() {
        let dir = tempdir().unwrap();
        let app = WelcomeApp::open(settings(&dir, ScreenSize::Normal)).unwrap();
        let host = Arc::new(ConsoleHost::new(Vec::new()));

        let activation = app.launch(&LaunchRequest::start(), host.clone()).await.unwrap();

        assert_eq!(activation, Activation::Routing);
        assert_eq!(host.opened(), Some(Destination::AccountSetup));
        app.shutdown();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_launch_on_extra_large_screen_opens_dual_pane() {
        let dir = tempdir().unwrap();
        let app = WelcomeApp::open(settings(&dir, ScreenSize::ExtraLarge)).unwrap();
        let account = app.store.register_account(Account::new("a@example.com")).unwrap();
        app.registry.add_account("a@example.com").unwrap();
        let host = Arc::new(ConsoleHost::new(Vec::new()));

        app.launch(&LaunchRequest::open_combined_inbox(), host.clone())
            .await
            .unwrap();

        assert_eq!(
            host.opened(),
            Some(Destination::DualPane {
                account_id: account.id,
                mailbox_id: Some(MailboxId::COMBINED_INBOX),
            })
        );
        app.shutdown();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_dedicated_worker_pool() {
        let dir = tempdir().unwrap();
        let mut settings = settings(&dir, ScreenSize::Normal);
        settings.worker_threads = 2;
        let app = WelcomeApp::open(settings).unwrap();
        let account = app.store.register_account(Account::new("a@example.com")).unwrap();
        app.registry.add_account("a@example.com").unwrap();
        let host = Arc::new(ConsoleHost::new(Vec::new()));

        app.launch(&LaunchRequest::start(), host.clone()).await.unwrap();

        assert_eq!(host.opened(), Some(Destination::account_inbox(account.id)));
        app.shutdown();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_upgrade_then_relaunch() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("legacy.json"),
            r#"{"accounts": [{"emailAddress": "old@example.com", "isDefault": true}]}"#,
        )
        .unwrap();
        let app = WelcomeApp::open(settings(&dir, ScreenSize::Normal)).unwrap();

        let host = Arc::new(ConsoleHost::new(Vec::new()));
        let activation = app.launch(&LaunchRequest::start(), host.clone()).await.unwrap();
        assert_eq!(activation, Activation::Upgrading);
        assert_eq!(host.opened(), Some(Destination::AccountUpgrade));

        assert_eq!(app.complete_upgrade().await.unwrap(), 1);

        let host = Arc::new(ConsoleHost::new(Vec::new()));
        let activation = app.launch(&LaunchRequest::start(), host.clone()).await.unwrap();
        assert_eq!(activation, Activation::Routing);
        assert!(matches!(host.opened(), Some(Destination::SinglePane(_))));
        app.shutdown();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_shutdown_writes_backup_that_restores() {
        let dir = tempdir().unwrap();
        {
            let app = WelcomeApp::open(settings(&dir, ScreenSize::Normal)).unwrap();
            app.store.register_account(Account::new("a@example.com")).unwrap();
            app.shutdown();
        }

        // Lose the database, keep the backup
        std::fs::remove_file(dir.path().join("accounts.sqlite")).unwrap();
        let _ = std::fs::remove_file(dir.path().join("accounts.sqlite-wal"));
        let _ = std::fs::remove_file(dir.path().join("accounts.sqlite-shm"));

        // The registry starts empty, as after a reinstall
        let app = WelcomeApp::open(settings(&dir, ScreenSize::Normal)).unwrap();
        assert!(app.registry.registered_accounts().unwrap().is_empty());
        let host = Arc::new(ConsoleHost::new(Vec::new()));
        app.launch(&LaunchRequest::start(), host.clone()).await.unwrap();

        assert!(matches!(host.opened(), Some(Destination::SinglePane(_))));
        assert_eq!(app.store.count_accounts().unwrap(), 1);
        assert_eq!(
            app.registry.registered_accounts().unwrap(),
            vec!["a@example.com".to_string()]
        );
        app.shutdown();
    }
}
