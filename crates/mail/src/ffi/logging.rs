//! `log` backend that hands records to the host app through a callback
//!
//! Installed instead of `env_logger` when the crate runs inside a mobile or
//! desktop shell, so launch routing shows up in the platform's own log.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, RwLock};

use log::{Level, Log, Metadata, Record, SetLoggerError};

use super::types::{FfiLogLevel, LogCallback};

static CALLBACK_LOGGER: OnceLock<CallbackLogger> = OnceLock::new();
static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Forwards records to the current callback; drops them while none is set
struct CallbackLogger {
    callback: RwLock<Option<Arc<dyn LogCallback>>>,
}

impl CallbackLogger {
    fn replace(&self, callback: Option<Arc<dyn LogCallback>>) {
        if let Ok(mut guard) = self.callback.write() {
            *guard = callback;
        }
    }

    fn current(&self) -> Option<Arc<dyn LogCallback>> {
        self.callback.read().ok().and_then(|guard| guard.clone())
    }
}

impl Log for CallbackLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        // Clone out of the lock so a callback that logs cannot deadlock
        let Some(callback) = self.current() else {
            return;
        };
        callback.on_log(
            FfiLogLevel::from(record.level()),
            record.target().to_string(),
            record.args().to_string(),
        );
    }

    fn flush(&self) {}
}

/// Install the callback logger as the process-wide `log` backend
///
/// Fails if another logger (e.g. `env_logger`) was installed first.
pub fn init_ffi_logger(max_level: Level) -> Result<(), SetLoggerError> {
    let logger = CALLBACK_LOGGER.get_or_init(|| CallbackLogger {
        callback: RwLock::new(None),
    });
    log::set_logger(logger)?;
    INSTALLED.store(true, Ordering::SeqCst);
    log::set_max_level(max_level.to_level_filter());
    Ok(())
}

/// Route records to `callback`, or drop them with `None`
pub fn set_log_callback(callback: Option<Arc<dyn LogCallback>>) {
    if let Some(logger) = CALLBACK_LOGGER.get() {
        logger.replace(callback);
    }
}

pub fn set_log_level(level: Level) {
    log::set_max_level(level.to_level_filter());
}

/// Set up logging for the host app
///
/// Safe to call more than once: later calls swap the callback and level.
/// Returns false when a different logger already owns the process.
#[uniffi::export]
pub fn initialize_logging(callback: Box<dyn LogCallback>, max_level: FfiLogLevel) -> bool {
    let level = Level::from(max_level);
    let installed = init_ffi_logger(level).is_ok() || INSTALLED.load(Ordering::SeqCst);
    if installed {
        set_log_callback(Some(Arc::from(callback)));
        set_log_level(level);
    }
    installed
}
