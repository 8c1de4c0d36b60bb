//! Background mail sync
//!
//! The launch router starts the service; the per-account work is plugged
//! in through [`SyncJob`].

mod service;
mod timing;

pub use service::{BackgroundSync, SyncJob, SyncOptions, SyncService, SyncStats};
pub use timing::cooldown_elapsed;
