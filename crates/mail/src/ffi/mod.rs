//! FFI bindings for UniFFI export
//!
//! Swift/Kotlin shells use these to run the welcome screen's routing.
//!
//! ## Usage from Swift
//!
//! ```swift
//! import MailFFI
//!
//! initializeLogging(callback: logger, maxLevel: .info)
//!
//! let service = try WelcomeService(dbPath: dbPath, screenSize: .normal)
//! let request = try parseLaunchUri(uri: url.absoluteString)
//!
//! // Off the main thread; the callback hops back to it
//! let activation = try service.launch(request: request, callback: welcomeScreen)
//! if activation == .upgrading {
//!     _ = try service.importLegacyAccounts()
//! }
//! ```

mod logging;
mod service;
mod types;

pub use logging::{init_ffi_logger, initialize_logging, set_log_callback, set_log_level};
pub use service::*;
pub use types::*;
