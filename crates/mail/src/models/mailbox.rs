//! Mailbox identifiers and well-known mailbox types

use serde::{Deserialize, Serialize};

/// Identifier of a mailbox, or of a synthetic mailbox query
///
/// Negative values are reserved for queries spanning accounts; the message
/// list screens interpret them, routing code treats them like any other id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MailboxId(pub i64);

impl MailboxId {
    /// Wire sentinel for "no mailbox selected"
    pub const NONE: MailboxId = MailboxId(-1);
    /// Inboxes of all accounts combined
    pub const COMBINED_INBOX: MailboxId = MailboxId(-2);

    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }

    /// Convert a raw wire value, mapping the -1 sentinel to `None`
    pub fn from_raw(id: i64) -> Option<Self> {
        (id != Self::NONE.0).then_some(Self(id))
    }

    /// Whether this is the synthetic combined inbox
    pub fn is_combined_inbox(&self) -> bool {
        *self == Self::COMBINED_INBOX
    }
}

impl From<i64> for MailboxId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Role of a mailbox within an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MailboxType {
    Inbox,
    Drafts,
    Outbox,
    Sent,
    Trash,
}

impl MailboxType {
    /// Numeric type code stored with mailboxes
    pub fn code(&self) -> i32 {
        match self {
            MailboxType::Inbox => 0,
            MailboxType::Drafts => 3,
            MailboxType::Outbox => 4,
            MailboxType::Sent => 5,
            MailboxType::Trash => 6,
        }
    }
}
