//! Process-wide UI notification flags

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

static GLOBAL: OnceLock<Arc<AppState>> = OnceLock::new();

/// Flags shared between background tasks and the screens of the process
///
/// Reconciliation raises `accounts_changed` when it removed accounts; the
/// launch router clears it when it takes over.
#[derive(Debug, Default)]
pub struct AppState {
    notify_ui_accounts_changed: AtomicBool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The state shared by everything in this process
    pub fn global() -> Arc<AppState> {
        GLOBAL.get_or_init(|| Arc::new(AppState::new())).clone()
    }

    pub fn set_notify_ui_accounts_changed(&self, value: bool) {
        self.notify_ui_accounts_changed.store(value, Ordering::SeqCst);
    }

    pub fn notify_ui_accounts_changed(&self) -> bool {
        self.notify_ui_accounts_changed.load(Ordering::SeqCst)
    }
}
