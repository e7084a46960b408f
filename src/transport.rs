//! Capability interface over the remote mail service
//!
//! The polling and reply cores are written against this trait so they can
//! run over an in-memory double in tests; [`GmailClient`](crate::gmail::GmailClient)
//! is the production implementation.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::gmail::api::RawMessage;
use crate::models::Attachment;

/// What the core requires from the mail transport
pub trait MailTransport {
    /// Search the mailbox under `label` and return full raw messages.
    /// Ordering is service-defined (typically reverse chronological).
    fn search(&self, query: &str, label: &str) -> Result<Vec<RawMessage>>;

    /// Download every attachment carried by `message`, in the order the
    /// service lists them.
    fn fetch_attachments(&self, message: &RawMessage) -> Result<Vec<Attachment>>;

    /// Send a base64url-encoded RFC 2822 document, grouped into the
    /// given thread.
    fn send(&self, raw_base64: &str, thread_id: &str) -> Result<SendResult>;
}

/// Service acknowledgement for a sent message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResult {
    pub id: String,
    pub thread_id: String,
    pub label_ids: Option<Vec<String>>,
}
