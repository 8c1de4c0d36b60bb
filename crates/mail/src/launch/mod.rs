//! Launch routing
//!
//! Decides which screen the app opens with (account setup, single-pane
//! message list or dual-pane list/detail) from the configured accounts,
//! the launch request and the screen size, and drives the startup work
//! that surrounds that decision.

mod decision;
mod executor;
mod host;
mod listener;
mod pane;
mod request;
mod router;

pub use decision::decide_destination;
pub use executor::{InlineMainThread, InlineWorker, Job, MainLoop, MainLoopHandle, MainThread, RayonWorker, Worker};
pub use host::{Destination, LaunchHost, SinglePaneTarget};
pub use listener::AccountsChangedListener;
pub use pane::{DebugPaneMode, ScreenSize, use_two_pane};
pub use request::{
    EXTRA_ACCOUNT_ID, EXTRA_DEBUG_PANE_MODE, EXTRA_MAILBOX_ID, LaunchRequest, RequestError,
};
pub use router::{Activation, LaunchRouter, LaunchServices};
