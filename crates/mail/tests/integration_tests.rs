//! Integration tests for the mail crate
//!
//! These tests drive complete activations of the launch router against a
//! SQLite store, a real worker pool and a channel main loop.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use mail::accounts::{AccountRegistry, BulkUpgrade};
use mail::launch::MainThread;
use mail::storage::AccountStore;
use mail::{
    Account, AccountBackup, AccountReconciler, Activation, AppState, BackgroundSync, DebugPaneMode,
    Destination, InMemoryAccountRegistry, LaunchHost, LaunchRequest, LaunchRouter, LaunchServices,
    LegacyAccountUpgrade, MailboxId, MainLoop, RayonWorker, ScreenSize, SinglePaneTarget,
    SqliteAccountStore, SyncJob, SyncOptions,
};
use tempfile::TempDir;

const WAIT: Duration = Duration::from_secs(5);

#[derive(Default)]
struct RecordingHost {
    opened: Mutex<Vec<Destination>>,
    finished: AtomicUsize,
    failures: AtomicUsize,
}

impl RecordingHost {
    fn opened(&self) -> Vec<Destination> {
        self.opened.lock().unwrap().clone()
    }
}

impl LaunchHost for RecordingHost {
    fn open(&self, destination: &Destination) -> Result<()> {
        self.opened.lock().unwrap().push(*destination);
        Ok(())
    }

    fn finish(&self) {
        self.finished.fetch_add(1, Ordering::SeqCst);
    }

    fn report_failure(&self, _error: &anyhow::Error) {
        self.failures.fetch_add(1, Ordering::SeqCst);
    }
}

struct NoopSyncJob;

impl SyncJob for NoopSyncJob {
    fn sync_account(&self, _account: &Account) -> Result<()> {
        Ok(())
    }
}

/// A launch environment rooted in a temporary directory
struct Harness {
    dir: TempDir,
    store: Arc<SqliteAccountStore>,
    registry: Arc<InMemoryAccountRegistry>,
    state: Arc<AppState>,
    main_loop: MainLoop,
}

impl Harness {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(SqliteAccountStore::new(dir.path().join("accounts.sqlite")).unwrap());
        Self {
            dir,
            store,
            registry: Arc::new(InMemoryAccountRegistry::new()),
            state: Arc::new(AppState::new()),
            main_loop: MainLoop::new(),
        }
    }

    /// Add an account to both the store and the registry
    fn add_account(&self, email: &str) -> Account {
        self.registry.add_account(email).unwrap();
        self.store.register_account(Account::new(email)).unwrap()
    }

    fn backup(&self) -> AccountBackup {
        AccountBackup::new(self.dir.path().join("backup.json"), self.store.clone())
            .with_registry(self.registry.clone())
    }

    fn upgrade(&self) -> LegacyAccountUpgrade {
        LegacyAccountUpgrade::new(self.dir.path().join("legacy.json"), self.store.clone())
    }

    fn router(&self, host: Arc<RecordingHost>, screen: ScreenSize) -> LaunchRouter {
        self.router_on_pool(host, screen, 1)
    }

    fn router_on_pool(&self, host: Arc<RecordingHost>, screen: ScreenSize, threads: usize) -> LaunchRouter {
        let store: Arc<dyn AccountStore> = self.store.clone();
        let registry: Arc<dyn AccountRegistry> = self.registry.clone();
        let sync = BackgroundSync::new(
            store.clone(),
            Arc::new(NoopSyncJob),
            SyncOptions {
                interval: Duration::from_secs(3600),
                cooldown_secs: 3600,
            },
        );
        let main_thread: Arc<dyn MainThread> = Arc::new(self.main_loop.handle());

        let services = LaunchServices {
            store: store.clone(),
            state: self.state.clone(),
            upgrade: Arc::new(self.upgrade()),
            restore: Arc::new(self.backup()),
            sync: Arc::new(sync),
            registry: registry.clone(),
            reconciler: Arc::new(AccountReconciler::new(store, registry, self.state.clone())),
            worker: Arc::new(RayonWorker::with_threads(threads).unwrap()),
            main_thread,
        };
        LaunchRouter::new(services, host, screen)
    }

    /// Run one activation to completion and return what it opened
    fn launch(&self, request: &LaunchRequest, screen: ScreenSize) -> (LaunchRouter, Arc<RecordingHost>) {
        let host = Arc::new(RecordingHost::default());
        let router = self.router(host.clone(), screen);
        assert_eq!(router.on_create(request).unwrap(), Activation::Routing);
        assert!(self.main_loop.run_until(WAIT, || router.is_finished()));
        (router, host)
    }
}

fn wait_for(condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + WAIT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    condition()
}

#[test]
fn test_first_launch_opens_account_setup() {
    let harness = Harness::new();

    let (_router, host) = harness.launch(&LaunchRequest::start(), ScreenSize::Normal);

    assert_eq!(host.opened(), vec![Destination::AccountSetup]);
    assert_eq!(host.finished.load(Ordering::SeqCst), 1);
}

#[test]
fn test_launcher_start_opens_default_account() {
    let harness = Harness::new();
    harness.add_account("a@example.com");
    let b = harness.add_account("b@example.com");
    harness.store.set_default_account(b.id).unwrap();

    let (_router, host) = harness.launch(&LaunchRequest::start(), ScreenSize::Large);

    assert_eq!(host.opened(), vec![Destination::account_inbox(b.id)]);
}

#[test]
fn test_unknown_account_falls_back_to_default() {
    let harness = Harness::new();
    let a = harness.add_account("a@example.com");

    let (_router, host) = harness.launch(&LaunchRequest::open_account_inbox(999), ScreenSize::Normal);

    assert_eq!(host.opened(), vec![Destination::account_inbox(a.id)]);
}

#[test]
fn test_combined_inbox_by_screen_size() {
    let harness = Harness::new();
    let a = harness.add_account("a@example.com");
    let request = LaunchRequest::open_combined_inbox();

    let (_router, host) = harness.launch(&request, ScreenSize::Normal);
    assert_eq!(
        host.opened(),
        vec![Destination::SinglePane(SinglePaneTarget::Mailbox {
            mailbox_id: MailboxId::COMBINED_INBOX,
        })]
    );

    let (_router, host) = harness.launch(&request, ScreenSize::ExtraLarge);
    assert_eq!(
        host.opened(),
        vec![Destination::DualPane {
            account_id: a.id,
            mailbox_id: Some(MailboxId::COMBINED_INBOX),
        }]
    );
}

#[test]
fn test_debug_pane_mode_overrides_screen() {
    let harness = Harness::new();
    let a = harness.add_account("a@example.com");

    let request = LaunchRequest::start().with_debug_pane_mode(DebugPaneMode::ForceDualPane);
    let (_router, host) = harness.launch(&request, ScreenSize::Small);
    assert_eq!(
        host.opened(),
        vec![Destination::DualPane {
            account_id: a.id,
            mailbox_id: None,
        }]
    );

    let request = LaunchRequest::start().with_debug_pane_mode(DebugPaneMode::ForceSinglePane);
    let (_router, host) = harness.launch(&request, ScreenSize::ExtraLarge);
    assert_eq!(host.opened(), vec![Destination::account_inbox(a.id)]);
}

#[test]
fn test_deep_link_launch() {
    let harness = Harness::new();
    harness.add_account("a@example.com");
    let b = harness.add_account("b@example.com");

    let uri = LaunchRequest::open_account_inbox(b.id).to_uri();
    let request = LaunchRequest::from_uri(&uri).unwrap();
    let (_router, host) = harness.launch(&request, ScreenSize::Normal);

    assert_eq!(host.opened(), vec![Destination::account_inbox(b.id)]);
}

#[test]
fn test_backup_is_restored_before_routing() {
    let harness = Harness::new();
    let original = harness.add_account("a@example.com");
    assert_eq!(harness.backup().backup_accounts().unwrap(), 1);

    // Local data is lost; the registry forgets the account too
    harness.store.clear().unwrap();
    harness.registry.remove_account("a@example.com").unwrap();

    let (_router, host) = harness.launch(&LaunchRequest::start(), ScreenSize::Normal);

    let restored = harness.store.get_account_by_email("a@example.com").unwrap().unwrap();
    assert_eq!(restored.email, original.email);
    assert_eq!(host.opened(), vec![Destination::account_inbox(restored.id)]);
    assert_eq!(
        harness.registry.registered_accounts().unwrap(),
        vec!["a@example.com".to_string()]
    );
}

#[test]
fn test_restore_survives_parallel_worker() {
    let harness = Harness::new();
    let emails: Vec<String> = (1..=5).map(|i| format!("user{}@example.com", i)).collect();
    for email in &emails {
        harness.add_account(email);
    }
    assert_eq!(harness.backup().backup_accounts().unwrap(), 5);

    for _ in 0..20 {
        harness.store.clear().unwrap();
        for email in &emails {
            harness.registry.remove_account(email).unwrap();
        }

        let host = Arc::new(RecordingHost::default());
        let router = harness.router_on_pool(host.clone(), ScreenSize::Normal, 4);
        assert_eq!(router.on_create(&LaunchRequest::start()).unwrap(), Activation::Routing);
        assert!(harness.main_loop.run_until(WAIT, || router.is_finished()));
        router.on_destroy();

        assert_eq!(harness.store.count_accounts().unwrap(), 5);
        assert_eq!(harness.registry.registered_accounts().unwrap().len(), 5);
        assert!(matches!(host.opened()[..], [Destination::SinglePane(_)]));
    }
}

#[test]
fn test_registry_removal_reconciles_while_active() {
    let harness = Harness::new();
    harness.add_account("a@example.com");
    harness.add_account("b@example.com");

    let (router, _host) = harness.launch(&LaunchRequest::start(), ScreenSize::Normal);
    assert!(router.is_watching_accounts());
    assert!(!harness.state.notify_ui_accounts_changed());

    harness.registry.remove_account("b@example.com").unwrap();

    assert!(wait_for(|| harness.store.count_accounts().unwrap() == 1));
    assert!(harness.store.get_account_by_email("b@example.com").unwrap().is_none());
    assert!(wait_for(|| harness.state.notify_ui_accounts_changed()));
}

#[test]
fn test_deactivation_stops_reconciliation() {
    let harness = Harness::new();
    harness.add_account("a@example.com");
    harness.add_account("b@example.com");

    let (router, _host) = harness.launch(&LaunchRequest::start(), ScreenSize::Normal);
    router.on_destroy();
    router.on_destroy();
    assert_eq!(harness.registry.listener_count(), 0);

    harness.registry.remove_account("b@example.com").unwrap();
    thread::sleep(Duration::from_millis(100));

    assert_eq!(harness.store.count_accounts().unwrap(), 2);
}

#[test]
fn test_legacy_export_takes_over_launch() {
    let harness = Harness::new();
    std::fs::write(
        harness.dir.path().join("legacy.json"),
        r#"{"accounts": [{"emailAddress": "old@example.com", "displayName": "Old"}]}"#,
    )
    .unwrap();

    let host = Arc::new(RecordingHost::default());
    let router = harness.router(host.clone(), ScreenSize::Normal);
    assert_eq!(
        router.on_create(&LaunchRequest::start()).unwrap(),
        Activation::Upgrading
    );
    assert_eq!(host.opened(), vec![Destination::AccountUpgrade]);
    assert_eq!(host.finished.load(Ordering::SeqCst), 1);
    assert!(!router.is_watching_accounts());

    // Nothing else reaches the main loop
    assert_eq!(harness.main_loop.run_pending(), 0);

    let upgrade = harness.upgrade();
    assert_eq!(upgrade.import_accounts().unwrap(), 1);
    assert!(!upgrade.upgrade_if_necessary(host.as_ref()).unwrap());
}

#[test]
fn test_activation_clears_accounts_changed_flag() {
    let harness = Harness::new();
    harness.add_account("a@example.com");
    harness.state.set_notify_ui_accounts_changed(true);

    let (_router, host) = harness.launch(&LaunchRequest::start(), ScreenSize::Normal);

    assert!(!harness.state.notify_ui_accounts_changed());
    assert_eq!(host.failures.load(Ordering::SeqCst), 0);
}
