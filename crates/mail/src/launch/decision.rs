//! Routing decision: which screen a launch ends on
//!
//! Pure function of the stored accounts, the request and the screen size,
//! so it can be tested without any scheduling.

use anyhow::Result;
use log::debug;

use super::host::Destination;
use super::pane::{ScreenSize, use_two_pane};
use super::request::LaunchRequest;
use crate::models::AccountId;
use crate::storage::AccountStore;

/// Decide the destination for a launch
///
/// * No accounts: the setup flow, whatever was requested.
/// * A missing or stale account id falls back to the default account.
/// * A requested mailbox (including the combined inbox) is always passed on.
///
/// Storage errors propagate to the caller.
pub fn decide_destination(
    store: &dyn AccountStore,
    request: &LaunchRequest,
    screen: ScreenSize,
) -> Result<Destination> {
    let count = store.count_accounts()?;
    if count == 0 {
        debug!("No accounts configured, opening account setup");
        return Ok(Destination::AccountSetup);
    }

    let Some(account_id) = resolve_account(store, request.account_id())? else {
        // Every account vanished between the count and the lookup
        debug!("Accounts removed while routing, opening account setup");
        return Ok(Destination::AccountSetup);
    };

    let two_pane = use_two_pane(request.debug_pane_mode(), screen);
    debug!(
        "Routing: {} account(s), account {}, mailbox {:?}, two_pane={}",
        count,
        account_id,
        request.mailbox_id(),
        two_pane
    );

    let destination = match (two_pane, request.mailbox_id()) {
        (true, mailbox_id) => Destination::DualPane {
            account_id,
            mailbox_id,
        },
        (false, Some(mailbox_id)) => Destination::mailbox(mailbox_id),
        (false, None) => Destination::account_inbox(account_id),
    };
    Ok(destination)
}

/// The requested account when it still exists, else the default account
fn resolve_account(
    store: &dyn AccountStore,
    requested: Option<AccountId>,
) -> Result<Option<AccountId>> {
    if let Some(id) = requested {
        if store.is_valid_account(id)? {
            return Ok(Some(id));
        }
        debug!("Requested account {} is not valid, using default", id);
    }
    store.default_account_id()
}
