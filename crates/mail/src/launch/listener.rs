//! Reconcile accounts when the registry's account list changes

use std::sync::Arc;

use log::{debug, error};

use super::executor::Worker;
use crate::accounts::{AccountsUpdateListener, Reconcile};

/// Schedules a reconciliation on the worker for every notification
///
/// Notifications are not coalesced: each one runs its own pass.
pub struct AccountsChangedListener {
    reconciler: Arc<dyn Reconcile>,
    worker: Arc<dyn Worker>,
}

impl AccountsChangedListener {
    pub fn new(reconciler: Arc<dyn Reconcile>, worker: Arc<dyn Worker>) -> Self {
        Self { reconciler, worker }
    }
}

impl AccountsUpdateListener for AccountsChangedListener {
    fn on_accounts_updated(&self) {
        let reconciler = self.reconciler.clone();
        self.worker.execute(Box::new(move || match reconciler.reconcile() {
            Ok(stats) => debug!("Account reconciliation done: {:?}", stats),
            Err(e) => error!("Account reconciliation failed: {:#}", e),
        }));
    }
}
