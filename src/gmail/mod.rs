//! Gmail API integration
//!
//! This module provides:
//! - OAuth2 token management (refresh against an injected token store)
//! - Gmail API client implementing the [`MailTransport`](crate::transport::MailTransport) capability
//! - Search-query construction from filter criteria
//! - Response normalization to domain models

mod auth;
mod client;
mod normalize;
mod query;

pub use auth::{FileTokenStore, GmailAuth, MemoryTokenStore, StoredToken, TokenStore};
pub use client::GmailClient;
pub use normalize::normalize_email;
pub use query::build_query;

/// Gmail API response types
pub mod api {
    use serde::{Deserialize, Serialize};

    /// Response from listing messages
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ListMessagesResponse {
        pub messages: Option<Vec<MessageRef>>,
        pub next_page_token: Option<String>,
        pub result_size_estimate: Option<u32>,
    }

    /// Reference to a message (just ID and thread ID)
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MessageRef {
        pub id: String,
        pub thread_id: String,
    }

    /// Full message from the Gmail API
    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RawMessage {
        pub id: String,
        pub thread_id: String,
        pub label_ids: Option<Vec<String>>,
        #[serde(default)]
        pub snippet: String,
        /// Milliseconds since epoch, transmitted as a string
        pub internal_date: String,
        pub payload: Option<MessagePart>,
    }

    /// One node of the MIME tree: the top-level payload or a nested part
    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MessagePart {
        pub part_id: Option<String>,
        pub mime_type: Option<String>,
        pub filename: Option<String>,
        pub headers: Option<Vec<Header>>,
        pub body: Option<MessageBody>,
        pub parts: Option<Vec<MessagePart>>,
    }

    /// Email header (name-value pair)
    #[derive(Debug, Clone, Deserialize, Serialize)]
    pub struct Header {
        pub name: String,
        pub value: String,
    }

    /// Message body (base64url encoded when inline)
    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MessageBody {
        pub size: Option<u32>,
        pub data: Option<String>,
        /// Present instead of `data` when the body is an attachment
        pub attachment_id: Option<String>,
    }

    /// Response from the attachments endpoint
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AttachmentResponse {
        pub size: Option<u32>,
        pub data: Option<String>,
    }
}
