//! FFI-friendly type wrappers for UniFFI export
//!
//! These types convert internal Rust types to FFI-compatible versions:
//! - `DateTime<Utc>` → `i64` (Unix timestamp)
//! - `MailboxId` → `i64`
//! - Destination variants → a flat record with a kind tag

use crate::launch::{
    Activation, DebugPaneMode, Destination, LaunchRequest, RequestError, ScreenSize, SinglePaneTarget,
};
use crate::models::{Account, MailboxId, MailboxType};

// ============================================================================
// Error Types
// ============================================================================

/// FFI-friendly error type
#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum LaunchError {
    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Launch failed: {message}")]
    Launch { message: String },
}

impl From<anyhow::Error> for LaunchError {
    fn from(e: anyhow::Error) -> Self {
        let is_database = e.chain().any(|cause| cause.is::<rusqlite::Error>());
        if is_database {
            LaunchError::Database {
                message: format!("{:#}", e),
            }
        } else {
            LaunchError::Launch {
                message: format!("{:#}", e),
            }
        }
    }
}

impl From<RequestError> for LaunchError {
    fn from(e: RequestError) -> Self {
        LaunchError::InvalidArgument {
            message: e.to_string(),
        }
    }
}

// ============================================================================
// Account Types
// ============================================================================

/// FFI-friendly account representation
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAccount {
    pub id: i64,
    pub email: String,
    pub display_name: Option<String>,
    pub is_default: bool,
    /// Unix timestamp (seconds since epoch)
    pub added_at: i64,
}

impl From<Account> for FfiAccount {
    fn from(a: Account) -> Self {
        Self {
            id: a.id,
            email: a.email,
            display_name: a.display_name,
            is_default: a.is_default,
            added_at: a.added_at.timestamp(),
        }
    }
}

// ============================================================================
// Launch Request Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiPaneMode {
    Auto,
    SinglePane,
    DualPane,
}

impl From<DebugPaneMode> for FfiPaneMode {
    fn from(mode: DebugPaneMode) -> Self {
        match mode {
            DebugPaneMode::None => FfiPaneMode::Auto,
            DebugPaneMode::ForceSinglePane => FfiPaneMode::SinglePane,
            DebugPaneMode::ForceDualPane => FfiPaneMode::DualPane,
        }
    }
}

impl From<FfiPaneMode> for DebugPaneMode {
    fn from(mode: FfiPaneMode) -> Self {
        match mode {
            FfiPaneMode::Auto => DebugPaneMode::None,
            FfiPaneMode::SinglePane => DebugPaneMode::ForceSinglePane,
            FfiPaneMode::DualPane => DebugPaneMode::ForceDualPane,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiScreenSize {
    Small,
    Normal,
    Large,
    ExtraLarge,
}

impl From<FfiScreenSize> for ScreenSize {
    fn from(size: FfiScreenSize) -> Self {
        match size {
            FfiScreenSize::Small => ScreenSize::Small,
            FfiScreenSize::Normal => ScreenSize::Normal,
            FfiScreenSize::Large => ScreenSize::Large,
            FfiScreenSize::ExtraLarge => ScreenSize::ExtraLarge,
        }
    }
}

/// FFI-friendly launch request
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiLaunchRequest {
    pub account_id: Option<i64>,
    pub mailbox_id: Option<i64>,
    pub pane_mode: FfiPaneMode,
    pub clear_top: bool,
    /// Deep link form of the request
    pub uri: String,
}

impl From<&LaunchRequest> for FfiLaunchRequest {
    fn from(r: &LaunchRequest) -> Self {
        Self {
            account_id: r.account_id(),
            mailbox_id: r.mailbox_id().map(|id| id.as_i64()),
            pane_mode: r.debug_pane_mode().into(),
            clear_top: r.clear_top(),
            uri: r.to_uri(),
        }
    }
}

impl From<FfiLaunchRequest> for LaunchRequest {
    fn from(r: FfiLaunchRequest) -> Self {
        let mut request = if r.clear_top {
            LaunchRequest::start()
        } else {
            LaunchRequest::new()
        };
        if let Some(mailbox_id) = r.mailbox_id.and_then(MailboxId::from_raw) {
            request = request.with_mailbox(mailbox_id);
        }
        if let Some(account_id) = r.account_id {
            request = request.with_account(account_id);
        }
        request.with_debug_pane_mode(r.pane_mode.into())
    }
}

// ============================================================================
// Destination Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiDestinationKind {
    AccountSetup,
    AccountUpgrade,
    SinglePane,
    DualPane,
}

/// FFI-friendly destination
///
/// `account_id` is set for account-based targets, `mailbox_id` when a
/// mailbox was requested, `mailbox_type` for single-pane account targets.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct FfiDestination {
    pub kind: FfiDestinationKind,
    pub account_id: Option<i64>,
    pub mailbox_id: Option<i64>,
    pub mailbox_type: Option<i32>,
}

impl From<&Destination> for FfiDestination {
    fn from(d: &Destination) -> Self {
        let (kind, account_id, mailbox_id, mailbox_type): (_, _, Option<MailboxId>, Option<MailboxType>) =
            match *d {
                Destination::AccountSetup => (FfiDestinationKind::AccountSetup, None, None, None),
                Destination::AccountUpgrade => (FfiDestinationKind::AccountUpgrade, None, None, None),
                Destination::SinglePane(SinglePaneTarget::Account {
                    account_id,
                    mailbox_type,
                }) => (FfiDestinationKind::SinglePane, Some(account_id), None, Some(mailbox_type)),
                Destination::SinglePane(SinglePaneTarget::Mailbox { mailbox_id }) => {
                    (FfiDestinationKind::SinglePane, None, Some(mailbox_id), None)
                }
                Destination::DualPane {
                    account_id,
                    mailbox_id,
                } => (FfiDestinationKind::DualPane, Some(account_id), mailbox_id, None),
            };

        Self {
            kind,
            account_id,
            mailbox_id: mailbox_id.map(|id| id.as_i64()),
            mailbox_type: mailbox_type.map(|t| t.code()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiActivation {
    /// A destination was decided and opened
    Routing,
    /// The bulk upgrade screen was opened instead
    Upgrading,
}

impl From<Activation> for FfiActivation {
    fn from(activation: Activation) -> Self {
        match activation {
            Activation::Routing => FfiActivation::Routing,
            Activation::Upgrading => FfiActivation::Upgrading,
        }
    }
}

// ============================================================================
// Callback Interfaces
// ============================================================================

/// Screen host implemented by the app shell
#[uniffi::export(callback_interface)]
pub trait LaunchCallback: Send + Sync {
    /// Start the destination screen. Called on the thread that invoked `launch`.
    fn open(&self, destination: FfiDestination);
    /// Close the welcome screen
    fn finish(&self);
    /// Routing failed; `finish` follows
    fn on_error(&self, message: String);
}

/// Log level for FFI logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<log::Level> for FfiLogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => FfiLogLevel::Error,
            log::Level::Warn => FfiLogLevel::Warn,
            log::Level::Info => FfiLogLevel::Info,
            log::Level::Debug => FfiLogLevel::Debug,
            log::Level::Trace => FfiLogLevel::Trace,
        }
    }
}

impl From<FfiLogLevel> for log::Level {
    fn from(level: FfiLogLevel) -> Self {
        match level {
            FfiLogLevel::Error => log::Level::Error,
            FfiLogLevel::Warn => log::Level::Warn,
            FfiLogLevel::Info => log::Level::Info,
            FfiLogLevel::Debug => log::Level::Debug,
            FfiLogLevel::Trace => log::Level::Trace,
        }
    }
}

/// Callback interface for receiving log messages from Rust
#[uniffi::export(callback_interface)]
pub trait LogCallback: Send + Sync {
    /// Called when a log message is emitted
    ///
    /// # Arguments
    /// * `level` - The log level
    /// * `target` - The logging target (module path, e.g., "mail::launch")
    /// * `message` - The log message
    fn on_log(&self, level: FfiLogLevel, target: String, message: String);
}
