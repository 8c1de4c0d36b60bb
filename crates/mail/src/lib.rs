//! Mail crate - launch routing for the Cosmos mail client
//!
//! This crate decides which screen the app opens with and runs the startup
//! work around that decision:
//! - Domain models (Account, MailboxId, MailboxType)
//! - Account storage traits with in-memory and SQLite backends
//! - Launch requests, the routing decision and the welcome router
//! - Account backup/restore, bulk upgrade and registry reconciliation
//! - Background sync service
//! - UniFFI bindings for the Swift/Kotlin shells
//!
//! The crate has no UI dependencies; screens are reached through
//! [`launch::LaunchHost`].

uniffi::setup_scaffolding!();

pub mod accounts;
pub mod config;
pub mod ffi;
pub mod launch;
pub mod models;
pub mod state;
pub mod storage;
pub mod sync;

pub use accounts::{
    AccountBackup, AccountReconciler, AccountRegistry, InMemoryAccountRegistry, LegacyAccountUpgrade,
};
pub use crate::config::LaunchSettings;
pub use launch::{
    Activation, DebugPaneMode, Destination, LaunchHost, LaunchRequest, LaunchRouter, LaunchServices,
    MainLoop, RayonWorker, ScreenSize, SinglePaneTarget, decide_destination,
};
pub use models::{Account, AccountId, MailboxId, MailboxType};
pub use state::AppState;
pub use storage::{AccountStore, InMemoryAccountStore, SqliteAccountStore};
pub use sync::{BackgroundSync, SyncJob, SyncOptions, SyncService, cooldown_elapsed};
