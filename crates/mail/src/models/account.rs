//! Account model representing a configured mail account

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Database identifier of an account
pub type AccountId = i64;

/// Wire sentinel for "no account selected"
pub const NO_ACCOUNT: AccountId = -1;

/// A configured mail account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Unique integer identifier (database primary key)
    pub id: AccountId,
    /// Email address (unique)
    pub email: String,
    /// Display name (can be customized by user)
    pub display_name: Option<String>,
    /// Whether this is the default account opened on launch
    #[serde(default)]
    pub is_default: bool,
    /// When the account was added
    pub added_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account (id will be assigned by the store)
    pub fn new(email: impl Into<String>) -> Self {
        Self::with_id(0, email)
    }

    /// Create an account with a known ID (loaded from storage)
    pub fn with_id(id: AccountId, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            display_name: None,
            is_default: false,
            added_at: Utc::now(),
        }
    }

    /// Set as default account
    pub fn with_default(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }

    /// Set display name
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Name shown in account pickers: the display name, else the address
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }

    /// Whether two addresses refer to the same account (case-insensitive)
    pub fn matches_email(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email)
    }
}
