//! Background mail sync service
//!
//! The launch router only needs to make sure the service runs; starting it
//! again is harmless. The actual per-account sync is supplied by the
//! caller as a [`SyncJob`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, error, info};

use super::timing::cooldown_elapsed;
use crate::models::{Account, AccountId};
use crate::storage::AccountStore;

/// Something that keeps mail in sync in the background
pub trait SyncService: Send + Sync {
    /// Start the service if it is not running yet
    fn ensure_started(&self) -> Result<()>;
}

/// Sync work for one account
pub trait SyncJob: Send + Sync {
    fn sync_account(&self, account: &Account) -> Result<()>;
}

/// Options for the background sync loop
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Pause between passes over all accounts
    pub interval: Duration,
    /// Minimum seconds between two syncs of the same account
    pub cooldown_secs: u64,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            cooldown_secs: 300,
        }
    }
}

/// Statistics from one pass over all accounts
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncStats {
    pub accounts_synced: usize,
    /// Accounts still in cooldown
    pub accounts_skipped: usize,
    pub errors: usize,
}

struct Shared {
    store: Arc<dyn AccountStore>,
    job: Arc<dyn SyncJob>,
    options: SyncOptions,
    last_sync: Mutex<HashMap<AccountId, DateTime<Utc>>>,
    stopping: AtomicBool,
}

impl Shared {
    fn run_pass(&self) -> Result<SyncStats> {
        let mut stats = SyncStats::default();
        let now = Utc::now();

        for account in self.store.list_accounts()? {
            let last = self.last_sync.lock().unwrap().get(&account.id).copied();
            if !cooldown_elapsed(last, self.options.cooldown_secs, now) {
                stats.accounts_skipped += 1;
                continue;
            }

            match self.job.sync_account(&account) {
                Ok(()) => {
                    self.last_sync.lock().unwrap().insert(account.id, Utc::now());
                    stats.accounts_synced += 1;
                }
                Err(e) => {
                    error!("Sync failed for account {}: {:#}", account.id, e);
                    stats.errors += 1;
                }
            }
        }
        Ok(stats)
    }
}

/// Sync service running passes on a dedicated thread
pub struct BackgroundSync {
    shared: Arc<Shared>,
    started: AtomicBool,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl BackgroundSync {
    pub fn new(store: Arc<dyn AccountStore>, job: Arc<dyn SyncJob>, options: SyncOptions) -> Self {
        Self {
            shared: Arc::new(Shared {
                store,
                job,
                options,
                last_sync: Mutex::new(HashMap::new()),
                stopping: AtomicBool::new(false),
            }),
            started: AtomicBool::new(false),
            handle: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.lock().unwrap().is_some()
    }

    /// Run one pass on the calling thread
    pub fn run_once(&self) -> Result<SyncStats> {
        self.shared.run_pass()
    }

    /// Stop the loop and wait for the current pass to end
    pub fn stop(&self) {
        let Some(handle) = self.handle.lock().unwrap().take() else {
            return;
        };
        self.shared.stopping.store(true, Ordering::SeqCst);
        handle.thread().unpark();
        if handle.join().is_err() {
            error!("Sync thread panicked");
        }
        self.shared.stopping.store(false, Ordering::SeqCst);
        self.started.store(false, Ordering::SeqCst);
        info!("Background sync stopped");
    }
}

impl SyncService for BackgroundSync {
    fn ensure_started(&self) -> Result<()> {
        if self.started.swap(true, Ordering::SeqCst) {
            debug!("Background sync already running");
            return Ok(());
        }

        let shared = self.shared.clone();
        let spawned = std::thread::Builder::new()
            .name("mail-sync".to_string())
            .spawn(move || {
                while !shared.stopping.load(Ordering::SeqCst) {
                    match shared.run_pass() {
                        Ok(stats) => debug!("Sync pass complete: {:?}", stats),
                        Err(e) => error!("Sync pass failed: {:#}", e),
                    }
                    std::thread::park_timeout(shared.options.interval);
                }
            });

        match spawned {
            Ok(handle) => {
                *self.handle.lock().unwrap() = Some(handle);
                info!("Background sync started");
                Ok(())
            }
            Err(e) => {
                self.started.store(false, Ordering::SeqCst);
                Err(e).context("Failed to spawn sync thread")
            }
        }
    }
}

impl Drop for BackgroundSync {
    fn drop(&mut self) {
        self.stop();
    }
}
