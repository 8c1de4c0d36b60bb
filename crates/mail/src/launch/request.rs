//! Launch requests for the welcome router
//!
//! Every screen that wants to "open an account" or "open the combined
//! inbox" builds a [`LaunchRequest`] and hands it to the router, which
//! picks the screen appropriate for the device and account state.
//!
//! Requests travel as string extras (`ACCOUNT_ID`, `MAILBOX_ID`,
//! `DEBUG_PANE_MODE`) or as deep links:
//!
//! ```text
//! cosmos://welcome?DEBUG_PANE_MODE=2&ACCOUNT_ID=2
//! cosmos://welcome?DEBUG_PANE_MODE=2&MAILBOX_ID=-2
//! ```

use log::warn;
use serde::{Deserialize, Serialize};
use url::Url;

use super::pane::DebugPaneMode;
use crate::models::{AccountId, MailboxId, NO_ACCOUNT};

pub const EXTRA_ACCOUNT_ID: &str = "ACCOUNT_ID";
pub const EXTRA_MAILBOX_ID: &str = "MAILBOX_ID";
/// Set "1" to force single-pane, "2" to force dual-pane
pub const EXTRA_DEBUG_PANE_MODE: &str = "DEBUG_PANE_MODE";

pub const URI_SCHEME: &str = "cosmos";
pub const URI_HOST: &str = "welcome";

/// Errors from parsing a launch deep link
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("Invalid launch URI: {0}")]
    Malformed(String),

    #[error("Unsupported URI scheme '{0}', expected 'cosmos'")]
    WrongScheme(String),

    #[error("Unsupported URI target '{0}', expected 'welcome'")]
    WrongTarget(String),
}

/// Parameters of one launch of the router
///
/// Immutable once built; the constructors mirror the ways other screens
/// reopen the router.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchRequest {
    account_id: Option<AccountId>,
    mailbox_id: Option<MailboxId>,
    debug_pane_mode: DebugPaneMode,
    clear_top: bool,
}

impl LaunchRequest {
    /// Request with no parameters: open the default account
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the UI: reopen the router, dropping screens stacked above it
    pub fn start() -> Self {
        Self {
            clear_top: true,
            ..Self::default()
        }
    }

    /// Open an account's inbox. [`NO_ACCOUNT`] opens the default account.
    pub fn open_account_inbox(account_id: AccountId) -> Self {
        Self {
            account_id: (account_id != NO_ACCOUNT).then_some(account_id),
            ..Self::default()
        }
    }

    /// Open the inboxes of all accounts combined
    pub fn open_combined_inbox() -> Self {
        Self::open_mailbox(MailboxId::COMBINED_INBOX)
    }

    /// Open a specific mailbox. [`MailboxId::NONE`] opens the account inbox.
    pub fn open_mailbox(mailbox_id: MailboxId) -> Self {
        Self::default().with_mailbox(mailbox_id)
    }

    /// Copy of this request with a debug pane override
    pub fn with_debug_pane_mode(mut self, mode: DebugPaneMode) -> Self {
        self.debug_pane_mode = mode;
        self
    }

    /// Copy of this request with an explicit mailbox
    pub fn with_mailbox(mut self, mailbox_id: MailboxId) -> Self {
        self.mailbox_id = MailboxId::from_raw(mailbox_id.as_i64());
        self
    }

    /// Copy of this request with an explicit account
    pub fn with_account(mut self, account_id: AccountId) -> Self {
        self.account_id = (account_id != NO_ACCOUNT).then_some(account_id);
        self
    }

    pub fn account_id(&self) -> Option<AccountId> {
        self.account_id
    }

    pub fn mailbox_id(&self) -> Option<MailboxId> {
        self.mailbox_id
    }

    pub fn debug_pane_mode(&self) -> DebugPaneMode {
        self.debug_pane_mode
    }

    /// Whether screens above the router should be dropped
    pub fn clear_top(&self) -> bool {
        self.clear_top
    }

    /// Build a request from string extras
    ///
    /// Unknown keys are ignored. An id that is not a number is treated as
    /// absent, as is the -1 sentinel.
    pub fn from_extras<I, K, V>(extras: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut request = Self::default();
        for (key, value) in extras {
            let value = value.as_ref();
            match key.as_ref() {
                EXTRA_ACCOUNT_ID => {
                    request.account_id = parse_id(EXTRA_ACCOUNT_ID, value)
                        .filter(|id| *id != NO_ACCOUNT);
                }
                EXTRA_MAILBOX_ID => {
                    request.mailbox_id =
                        parse_id(EXTRA_MAILBOX_ID, value).and_then(MailboxId::from_raw);
                }
                EXTRA_DEBUG_PANE_MODE => {
                    request.debug_pane_mode = DebugPaneMode::parse(Some(value));
                }
                _ => {}
            }
        }
        request
    }

    /// Extras carrying this request; unset parameters are omitted
    pub fn to_extras(&self) -> Vec<(&'static str, String)> {
        let mut extras = Vec::new();
        if let Some(id) = self.account_id {
            extras.push((EXTRA_ACCOUNT_ID, id.to_string()));
        }
        if let Some(id) = self.mailbox_id {
            extras.push((EXTRA_MAILBOX_ID, id.as_i64().to_string()));
        }
        if let Some(mode) = self.debug_pane_mode.as_extra() {
            extras.push((EXTRA_DEBUG_PANE_MODE, mode.to_string()));
        }
        extras
    }

    /// Parse a `cosmos://welcome?...` deep link
    pub fn from_uri(uri: &str) -> Result<Self, RequestError> {
        let url = Url::parse(uri).map_err(|e| RequestError::Malformed(e.to_string()))?;
        if url.scheme() != URI_SCHEME {
            return Err(RequestError::WrongScheme(url.scheme().to_string()));
        }
        let host = url.host_str().unwrap_or_default();
        if host != URI_HOST {
            return Err(RequestError::WrongTarget(host.to_string()));
        }
        Ok(Self::from_extras(url.query_pairs()))
    }

    /// Deep link that reopens the router with this request
    pub fn to_uri(&self) -> String {
        let base = format!("{}://{}", URI_SCHEME, URI_HOST);
        let extras = self.to_extras();
        if extras.is_empty() {
            return base;
        }
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(extras)
            .finish();
        format!("{}?{}", base, query)
    }
}

fn parse_id(key: &str, value: &str) -> Option<i64> {
    match value.trim().parse::<i64>() {
        Ok(id) => Some(id),
        Err(_) => {
            warn!("Ignoring non-numeric {} extra: {:?}", key, value);
            None
        }
    }
}
