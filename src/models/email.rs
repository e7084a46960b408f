//! Normalized email entity produced from a raw Gmail message

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A mailbox message normalized from the Gmail API representation
///
/// Immutable once returned. `thread_id` (plus the `from`/`subject` pair)
/// is the identity used for reply threading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Email {
    /// Raw `From` header value (e.g. "Jo Doe <jo@example.com>")
    pub from: String,
    /// Raw `Subject` header value
    pub subject: String,
    /// Raw `To` header value
    pub receiver: String,
    /// Server receipt time, derived from Gmail's internal timestamp
    /// rather than the spoofable `Date` header
    pub date: DateTime<Utc>,
    /// Gmail thread ID
    pub thread_id: String,
    /// RFC 2822 message ID, when the service exposed one
    pub message_id: Option<String>,
    /// Decoded body, present only when requested via
    /// [`FilterOptions::include_body`](super::FilterOptions)
    pub body: Option<EmailBody>,
    /// Downloaded attachments, present only when requested via
    /// [`FilterOptions::include_attachments`](super::FilterOptions)
    pub attachments: Option<Vec<Attachment>>,
}

/// Decoded message body in both negotiated representations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailBody {
    pub text: String,
    pub html: String,
}

/// A downloaded attachment, owned by the email that produced it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}
