//! Destinations the router can open, and the host that opens them

use anyhow::Result;
use log::error;
use serde::{Deserialize, Serialize};

use crate::models::{AccountId, MailboxId, MailboxType};

/// What the single-pane message list shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SinglePaneTarget {
    /// A mailbox of a given type within an account
    Account {
        account_id: AccountId,
        mailbox_type: MailboxType,
    },
    /// A specific mailbox (possibly the combined inbox)
    Mailbox { mailbox_id: MailboxId },
}

/// The screen a launch ends on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Destination {
    /// "Add account" flow, shown when no account is configured
    AccountSetup,
    /// Account upgrade screen, opened by the bulk upgrade check
    AccountUpgrade,
    /// Message list on small and normal screens
    SinglePane(SinglePaneTarget),
    /// Combined mailbox list / message list on extra-large screens
    DualPane {
        account_id: AccountId,
        mailbox_id: Option<MailboxId>,
    },
}

impl Destination {
    /// Single-pane list of an account's inbox
    pub fn account_inbox(account_id: AccountId) -> Self {
        Destination::SinglePane(SinglePaneTarget::Account {
            account_id,
            mailbox_type: MailboxType::Inbox,
        })
    }

    /// Single-pane list of a mailbox
    pub fn mailbox(mailbox_id: MailboxId) -> Self {
        Destination::SinglePane(SinglePaneTarget::Mailbox { mailbox_id })
    }

    pub fn is_dual_pane(&self) -> bool {
        matches!(self, Destination::DualPane { .. })
    }
}

/// The screen hosting the router
///
/// `open` and `finish` are always called on the interactive context.
pub trait LaunchHost: Send + Sync {
    /// Start the destination screen
    fn open(&self, destination: &Destination) -> Result<()>;

    /// Close the router; called exactly once per activation
    fn finish(&self);

    /// The decision task failed; the router finishes right after this
    fn report_failure(&self, error: &anyhow::Error) {
        error!("Launch routing failed: {:#}", error);
    }
}
