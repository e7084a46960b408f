//! Mailbox polling
//!
//! Repeatedly searches the mailbox until a matching message arrives or
//! the wait budget is exhausted. Fixed-interval polling, not backoff:
//! mailbox delivery latency is externally bounded and operators tune
//! the interval directly.

use std::time::Duration;

use anyhow::Result;
use log::debug;

use crate::gmail::{build_query, normalize_email};
use crate::models::{Email, FilterOptions};
use crate::transport::MailTransport;

/// One search-and-decode pass over the mailbox
///
/// Returns every matching message, normalized, in service order.
pub fn search_messages(
    transport: &dyn MailTransport,
    options: &FilterOptions,
) -> Result<Vec<Email>> {
    let query = build_query(options);
    let raw_messages = transport.search(&query, options.label())?;

    raw_messages
        .iter()
        .map(|raw| normalize_email(raw, options, transport))
        .collect()
}

/// Poll the mailbox until a matching message arrives
///
/// Returns `Ok(Some(..))` with the first non-empty batch, or `Ok(None)`
/// once cumulative sleep time reaches `max_wait_secs`. The budget bounds
/// sleep time only; total elapsed time can exceed it by the duration of
/// the last search call. Transport errors abort the loop immediately:
/// only the absence of a result is retried, never an error.
pub fn poll_messages(
    transport: &dyn MailTransport,
    options: &FilterOptions,
) -> Result<Option<Vec<Email>>> {
    let mut elapsed = 0.0_f64;

    loop {
        let results = search_messages(transport, options)?;
        if !results.is_empty() {
            debug!("poll matched {} message(s)", results.len());
            return Ok(Some(results));
        }

        if elapsed >= options.max_wait_secs {
            debug!("poll timed out after {elapsed}s of waiting");
            return Ok(None);
        }

        debug!(
            "no match yet, sleeping {}s ({elapsed}s of {}s used)",
            options.wait_interval_secs, options.max_wait_secs
        );
        std::thread::sleep(Duration::from_secs_f64(options.wait_interval_secs));
        elapsed += options.wait_interval_secs;
    }
}
