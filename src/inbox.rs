//! Public mailbox operations
//!
//! Each operation builds the Gmail transport from credentials and an
//! injected token store, then delegates to the transport-generic cores
//! in [`poll`](crate::poll) and [`reply`](crate::reply).

use anyhow::Result;
use log::warn;

use crate::config::GmailCredentials;
use crate::gmail::{GmailAuth, GmailClient, TokenStore};
use crate::models::{Email, FilterOptions};
use crate::poll::{poll_messages, search_messages};
use crate::reply::reply_to_latest;
use crate::transport::SendResult;

/// Poll the mailbox until a message matches `options` or the wait
/// budget runs out
///
/// Returns `Ok(None)` on timeout. Transport and authorization errors
/// propagate immediately.
pub fn check_inbox(
    credentials: GmailCredentials,
    tokens: &dyn TokenStore,
    options: &FilterOptions,
) -> Result<Option<Vec<Email>>> {
    let auth = GmailAuth::new(credentials, tokens);
    let client = GmailClient::new(auth);
    poll_messages(&client, options)
}

/// Single search pass over the mailbox
///
/// Leniency contract: failures are logged and yield an empty vec
/// instead of propagating, for non-critical call sites. The other
/// operations surface their errors.
pub fn get_messages(
    credentials: GmailCredentials,
    tokens: &dyn TokenStore,
    options: &FilterOptions,
) -> Vec<Email> {
    let auth = GmailAuth::new(credentials, tokens);
    let client = GmailClient::new(auth);

    match search_messages(&client, options) {
        Ok(emails) => emails,
        Err(e) => {
            warn!("get_messages failed, returning no results: {e:#}");
            Vec::new()
        }
    }
}

/// Force a refresh of the stored access token and persist it through
/// the token store
pub fn refresh_access_token(
    credentials: GmailCredentials,
    tokens: &dyn TokenStore,
) -> Result<()> {
    GmailAuth::new(credentials, tokens).refresh_stored_token()
}

/// Reply to the most recent message matching `criteria`, threading the
/// reply into its conversation
pub fn reply_to_email(
    credentials: GmailCredentials,
    tokens: &dyn TokenStore,
    body: &str,
    criteria: &FilterOptions,
) -> Result<SendResult> {
    let auth = GmailAuth::new(credentials, tokens);
    let client = GmailClient::new(auth);
    reply_to_latest(&client, criteria, body)
}
