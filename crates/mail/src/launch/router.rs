//! The welcome screen: initializes the app and routes to the first screen
//!
//! One router instance serves one activation. [`LaunchRouter::on_create`]
//! runs on the interactive context and never touches storage itself. A
//! single worker job then restores lost accounts, subscribes to registry
//! changes, catches up on them and decides the destination, in that order.
//! Only the final screen transition comes back to the interactive context.
//! The router always finishes once the decision completed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use log::{debug, error, info};

use super::decision::decide_destination;
use super::executor::{MainThread, Worker};
use super::host::LaunchHost;
use super::listener::AccountsChangedListener;
use super::pane::ScreenSize;
use super::request::LaunchRequest;
use crate::accounts::{
    AccountRegistry, AccountsUpdateListener, BulkUpgrade, Reconcile, RestoreAccounts, Subscription,
};
use crate::state::AppState;
use crate::storage::AccountStore;
use crate::sync::SyncService;

/// Collaborators the router drives
#[derive(Clone)]
pub struct LaunchServices {
    pub store: Arc<dyn AccountStore>,
    pub state: Arc<AppState>,
    pub upgrade: Arc<dyn BulkUpgrade>,
    pub restore: Arc<dyn RestoreAccounts>,
    pub sync: Arc<dyn SyncService>,
    pub registry: Arc<dyn AccountRegistry>,
    pub reconciler: Arc<dyn Reconcile>,
    pub worker: Arc<dyn Worker>,
    pub main_thread: Arc<dyn MainThread>,
}

/// How an activation proceeded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// The decision task was started; the router finishes when it completes
    Routing,
    /// The bulk upgrade took over the launch and the router already finished
    Upgrading,
}

/// The registry subscription of the current activation
#[derive(Default)]
struct Watch {
    /// Bumped by every activation and teardown. A decision job subscribes
    /// only while its activation is still the current one.
    generation: u64,
    subscription: Option<Subscription>,
}

pub struct LaunchRouter {
    services: LaunchServices,
    host: Arc<dyn LaunchHost>,
    screen: ScreenSize,
    watch: Arc<Mutex<Watch>>,
    finished: Arc<AtomicBool>,
}

impl LaunchRouter {
    pub fn new(services: LaunchServices, host: Arc<dyn LaunchHost>, screen: ScreenSize) -> Self {
        Self {
            services,
            host,
            screen,
            watch: Arc::new(Mutex::new(Watch::default())),
            finished: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Activate the router for `request`
    ///
    /// Errors from the bulk upgrade check propagate; everything after it is
    /// either fire-and-forget or reported through the host.
    pub fn on_create(&self, request: &LaunchRequest) -> Result<Activation> {
        info!("Welcome activated: {:?}", request);

        // We're here now, so the "accounts changed" notice has been seen
        self.services.state.set_notify_ui_accounts_changed(false);

        if self.services.upgrade.upgrade_if_necessary(self.host.as_ref())? {
            info!("Bulk upgrade took over the launch");
            finish_once(self.host.as_ref(), &self.finished);
            return Ok(Activation::Upgrading);
        }

        // Starting an already running service is a no-op
        if let Err(e) = self.services.sync.ensure_started() {
            error!("Failed to start background sync: {:#}", e);
        }

        let generation = {
            let mut watch = self.watch.lock().unwrap();
            watch.generation += 1;
            watch.generation
        };
        self.start_decision(request.clone(), generation);
        Ok(Activation::Routing)
    }

    /// Tear down the activation. Safe to call repeatedly or without a
    /// prior [`on_create`](Self::on_create).
    pub fn on_destroy(&self) {
        let subscription = {
            let mut watch = self.watch.lock().unwrap();
            watch.generation += 1;
            watch.subscription.take()
        };
        if let Some(subscription) = subscription {
            self.services.registry.remove_listener(subscription);
            debug!("Account listener removed");
        }
    }

    /// Whether the router has finished
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    /// Whether an account listener is currently registered
    pub fn is_watching_accounts(&self) -> bool {
        self.watch.lock().unwrap().subscription.is_some()
    }

    fn start_decision(&self, request: LaunchRequest, generation: u64) {
        let services = self.services.clone();
        let watch = self.watch.clone();
        let host = self.host.clone();
        let finished = self.finished.clone();
        let screen = self.screen;

        self.services.worker.execute(Box::new(move || {
            // Restore before subscribing: reconciliation deletes local
            // accounts the registry does not list
            match services.restore.restore_accounts_if_needed() {
                Ok(0) => {}
                Ok(restored) => info!("Restored {} account(s) before routing", restored),
                Err(e) => error!("Account restore failed: {:#}", e),
            }

            watch_accounts(&services, &watch, generation);

            let outcome = decide_destination(services.store.as_ref(), &request, screen);

            services.main_thread.post(Box::new(move || {
                let opened = outcome.and_then(|destination| {
                    info!("Opening {:?}", destination);
                    host.open(&destination)
                });
                if let Err(e) = opened {
                    host.report_failure(&e);
                }
                finish_once(host.as_ref(), &finished);
            }));
        }));
    }
}

impl Drop for LaunchRouter {
    fn drop(&mut self) {
        self.on_destroy();
    }
}

/// Subscribe to registry changes for activation `generation`, then run the
/// catch-up reconciliation
fn watch_accounts(services: &LaunchServices, watch: &Mutex<Watch>, generation: u64) {
    {
        let mut watch = watch.lock().unwrap();
        if watch.generation != generation {
            debug!("Activation ended before the account listener was registered");
            return;
        }
        if let Some(previous) = watch.subscription.take() {
            services.registry.remove_listener(previous);
        }
        let listener: Arc<dyn AccountsUpdateListener> = Arc::new(AccountsChangedListener::new(
            services.reconciler.clone(),
            services.worker.clone(),
        ));
        watch.subscription = Some(services.registry.add_listener(listener));
    }

    // Catch up on changes made while the app was not running
    match services.reconciler.reconcile() {
        Ok(stats) => debug!("Catch-up reconciliation done: {:?}", stats),
        Err(e) => error!("Catch-up reconciliation failed: {:#}", e),
    }
}

fn finish_once(host: &dyn LaunchHost, finished: &AtomicBool) {
    if !finished.swap(true, Ordering::SeqCst) {
        host.finish();
    }
}
