//! Threaded reply composition
//!
//! Finds the latest message matching the criteria and sends an RFC
//! 2822-style reply into its conversation.

use anyhow::Result;
use base64::prelude::*;

use crate::error::{MalformedEmailError, NotFoundError};
use crate::models::{Email, FilterOptions};
use crate::poll::search_messages;
use crate::transport::{MailTransport, SendResult};

/// Reply to the most recent message matching the criteria
///
/// A deliberate one-shot lookup: no polling loop, a mailbox with no
/// match fails with [`NotFoundError`] rather than waiting. The first
/// result in service order is the reply target (typically the most
/// recent); it must carry `from`, `subject` and `thread_id` or the
/// reply fails with [`MalformedEmailError`].
pub fn reply_to_latest(
    transport: &dyn MailTransport,
    criteria: &FilterOptions,
    body: &str,
) -> Result<SendResult> {
    let mut results = search_messages(transport, criteria)?;
    if results.is_empty() {
        return Err(NotFoundError.into());
    }
    let target = results.remove(0);
    validate_reply_target(&target)?;

    let raw = compose_reply(&target, body);
    transport.send(&encode_raw(&raw), &target.thread_id)
}

fn validate_reply_target(email: &Email) -> Result<()> {
    if email.from.is_empty() {
        return Err(MalformedEmailError::new("from").into());
    }
    if email.subject.is_empty() {
        return Err(MalformedEmailError::new("subject").into());
    }
    if email.thread_id.is_empty() {
        return Err(MalformedEmailError::new("thread_id").into());
    }
    Ok(())
}

/// Build the raw reply document: headers, blank line, body, with `\n`
/// line separators
fn compose_reply(target: &Email, body: &str) -> String {
    let mut lines = vec![
        "From: me".to_string(),
        format!("To: {}", target.from),
        format!("Subject: {}", reply_subject(&target.subject)),
    ];

    // Explicit threading headers when the service exposed a message ID.
    // Their absence is non-fatal: the thread ID alone still groups the
    // reply on the service side.
    if let Some(message_id) = &target.message_id {
        lines.push(format!("In-Reply-To: {}", message_id));
        lines.push(format!("References: {}", message_id));
    }

    lines.push(String::new());
    lines.push(body.to_string());
    lines.join("\n")
}

/// Prefix the subject with "Re: " unless it already has one
fn reply_subject(subject: &str) -> String {
    if matches!(subject.get(..3), Some(prefix) if prefix.eq_ignore_ascii_case("re:")) {
        subject.to_string()
    } else {
        format!("Re: {}", subject)
    }
}

/// URL-safe base64 without padding, as the send endpoint expects
fn encode_raw(raw: &str) -> String {
    BASE64_URL_SAFE_NO_PAD.encode(raw.as_bytes())
}
