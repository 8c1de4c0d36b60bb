//! Domain models for accounts and mailboxes

mod account;
mod mailbox;

pub use account::{Account, AccountId, NO_ACCOUNT};
pub use mailbox::{MailboxId, MailboxType};
