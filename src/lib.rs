//! mailwatch - poll a Gmail mailbox and reply in-thread
//!
//! This crate provides:
//! - Search-query construction from filter criteria
//! - Fixed-interval polling until a matching message arrives
//! - Normalization of raw Gmail messages (headers, MIME body, attachments)
//! - Threaded reply composition and sending
//!
//! The mail service and the token store are injected capabilities
//! ([`MailTransport`], [`TokenStore`]), so every core piece runs against
//! in-memory doubles in tests. The crate is fully synchronous and has no
//! UI or executor dependencies.

pub mod config;
pub mod error;
pub mod gmail;
pub mod inbox;
pub mod models;
pub mod poll;
pub mod reply;
pub mod transport;

pub use config::GmailCredentials;
pub use error::{AuthorizationError, MalformedEmailError, NotFoundError, TransportError};
pub use gmail::{
    FileTokenStore, GmailAuth, GmailClient, MemoryTokenStore, StoredToken, TokenStore,
    build_query, normalize_email,
};
pub use inbox::{check_inbox, get_messages, refresh_access_token, reply_to_email};
pub use models::{Attachment, Email, EmailBody, FilterOptions};
pub use poll::{poll_messages, search_messages};
pub use reply::reply_to_latest;
pub use transport::{MailTransport, SendResult};
