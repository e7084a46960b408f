//! Gmail API HTTP client
//!
//! Implements the [`MailTransport`] capability over the Gmail REST API.
//! Uses synchronous HTTP (ureq) to be executor-agnostic.

use std::collections::VecDeque;

use anyhow::{Context, Result};

use super::api::{AttachmentResponse, ListMessagesResponse, MessagePart, RawMessage};
use super::normalize::decode_base64_bytes;
use super::GmailAuth;
use crate::error::TransportError;
use crate::models::Attachment;
use crate::transport::{MailTransport, SendResult};

/// Gmail API client
pub struct GmailClient<'a> {
    auth: GmailAuth<'a>,
    base_url: String,
}

impl<'a> GmailClient<'a> {
    /// Gmail API base URL
    const BASE_URL: &'static str = "https://gmail.googleapis.com/gmail/v1";

    /// Create a new Gmail client
    pub fn new(auth: GmailAuth<'a>) -> Self {
        Self {
            auth,
            base_url: Self::BASE_URL.to_string(),
        }
    }

    /// Create a client against an alternate base URL (tests)
    pub fn with_base_url(auth: GmailAuth<'a>, base_url: impl Into<String>) -> Self {
        Self {
            auth,
            base_url: base_url.into(),
        }
    }

    /// List message IDs matching a query under a label
    fn list_messages(&self, query: &str, label: &str) -> Result<ListMessagesResponse> {
        let access_token = self.auth.get_access_token()?;

        let mut url = format!(
            "{}/users/me/messages?labelIds={}",
            self.base_url,
            urlencoding::encode(label)
        );
        if !query.is_empty() {
            url.push_str(&format!("&q={}", urlencoding::encode(query)));
        }

        let mut response = ureq::get(&url)
            .header("Authorization", &format!("Bearer {}", access_token))
            .call()
            .map_err(|e| TransportError::new(format!("list messages request failed: {e}")))?;

        let list: ListMessagesResponse = response
            .body_mut()
            .read_json()
            .context("Failed to parse list messages response")?;

        Ok(list)
    }

    /// Get full message details by ID
    fn get_message(&self, id: &str) -> Result<RawMessage> {
        let access_token = self.auth.get_access_token()?;

        let url = format!("{}/users/me/messages/{}?format=full", self.base_url, id);

        let mut response = ureq::get(&url)
            .header("Authorization", &format!("Bearer {}", access_token))
            .call()
            .map_err(|e| TransportError::new(format!("get message request failed: {e}")))?;

        let message: RawMessage = response
            .body_mut()
            .read_json()
            .context("Failed to parse message response")?;

        Ok(message)
    }

    /// Download one attachment body
    fn get_attachment(&self, message_id: &str, attachment_id: &str) -> Result<Vec<u8>> {
        let access_token = self.auth.get_access_token()?;

        let url = format!(
            "{}/users/me/messages/{}/attachments/{}",
            self.base_url, message_id, attachment_id
        );

        let mut response = ureq::get(&url)
            .header("Authorization", &format!("Bearer {}", access_token))
            .call()
            .map_err(|e| TransportError::new(format!("attachment request failed: {e}")))?;

        let attachment: AttachmentResponse = response
            .body_mut()
            .read_json()
            .context("Failed to parse attachment response")?;

        let data = attachment
            .data
            .context("attachment response missing data")?;
        decode_base64_bytes(&data).context("Failed to decode attachment data")
    }
}

impl MailTransport for GmailClient<'_> {
    fn search(&self, query: &str, label: &str) -> Result<Vec<RawMessage>> {
        let refs = self.list_messages(query, label)?.messages.unwrap_or_default();

        let mut messages = Vec::with_capacity(refs.len());
        for msg_ref in &refs {
            messages.push(self.get_message(&msg_ref.id)?);
        }
        Ok(messages)
    }

    fn fetch_attachments(&self, message: &RawMessage) -> Result<Vec<Attachment>> {
        let mut attachments = Vec::new();

        let mut queue: VecDeque<&MessagePart> = VecDeque::new();
        if let Some(payload) = &message.payload {
            queue.push_back(payload);
        }

        while let Some(part) = queue.pop_front() {
            if let Some(nested) = &part.parts {
                queue.extend(nested.iter());
            }

            let filename = part.filename.as_deref().unwrap_or_default();
            let attachment_id = part.body.as_ref().and_then(|b| b.attachment_id.as_deref());

            if let Some(attachment_id) = attachment_id
                && !filename.is_empty()
            {
                let data = self.get_attachment(&message.id, attachment_id)?;
                attachments.push(Attachment {
                    filename: filename.to_string(),
                    mime_type: part
                        .mime_type
                        .clone()
                        .unwrap_or_else(|| "application/octet-stream".to_string()),
                    data,
                });
            }
        }

        Ok(attachments)
    }

    fn send(&self, raw_base64: &str, thread_id: &str) -> Result<SendResult> {
        let access_token = self.auth.get_access_token()?;

        let url = format!("{}/users/me/messages/send", self.base_url);

        let mut response = ureq::post(&url)
            .header("Authorization", &format!("Bearer {}", access_token))
            .send_json(serde_json::json!({
                "raw": raw_base64,
                "threadId": thread_id,
            }))
            .map_err(|e| TransportError::new(format!("send request failed: {e}")))?;

        let result: SendResult = response
            .body_mut()
            .read_json()
            .context("Failed to parse send response")?;

        Ok(result)
    }
}
