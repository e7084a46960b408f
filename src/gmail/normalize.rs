//! Gmail API response normalization
//!
//! Converts a raw Gmail message into the [`Email`] domain entity:
//! header extraction, MIME body decoding, and attachment download.

use std::collections::VecDeque;

use anyhow::{Context, Result};
use base64::prelude::*;
use chrono::{TimeZone, Utc};

use super::api::{MessagePart, RawMessage};
use crate::models::{Email, EmailBody, FilterOptions};
use crate::transport::MailTransport;

/// Recognized leaf MIME types for body extraction
///
/// Unrecognized types fall back to the plain-text slot, matching the
/// service's behavior for single-part messages of exotic types.
enum BodyKind {
    Plain,
    Html,
}

impl BodyKind {
    fn of(mime_type: Option<&str>) -> Self {
        match mime_type {
            Some(m) if m.starts_with("text/html") => Self::Html,
            _ => Self::Plain,
        }
    }
}

/// Normalize a raw Gmail message into an [`Email`]
///
/// Body and attachments are populated only when the corresponding
/// [`FilterOptions`] flag is set; attachment download is delegated to
/// the transport and may fail.
pub fn normalize_email(
    raw: &RawMessage,
    options: &FilterOptions,
    transport: &dyn MailTransport,
) -> Result<Email> {
    let payload = raw.payload.as_ref().context("message has no payload")?;

    let from = extract_header(payload, "From").unwrap_or_default();
    let subject = extract_header(payload, "Subject").unwrap_or_default();
    let receiver = extract_header(payload, "To").unwrap_or_default();

    // The service is inconsistent about the casing of this header
    // across messages, and header lookup is case-sensitive.
    let message_id =
        extract_header(payload, "Message-ID").or_else(|| extract_header(payload, "Message-Id"));

    // Server receipt time (milliseconds since epoch). The Date header
    // is client-supplied and spoofable; internalDate is monotonic with
    // server receipt order.
    let internal_date: i64 = raw.internal_date.parse().unwrap_or(0);
    let date = Utc
        .timestamp_millis_opt(internal_date)
        .single()
        .unwrap_or_else(Utc::now);

    let body = options.include_body.then(|| extract_body(payload));

    let attachments = if options.include_attachments {
        Some(transport.fetch_attachments(raw)?)
    } else {
        None
    };

    Ok(Email {
        from,
        subject,
        receiver,
        date,
        thread_id: raw.thread_id.clone(),
        message_id,
        body,
        attachments,
    })
}

/// Extract a header value by name. Case-sensitive, first match wins.
fn extract_header(payload: &MessagePart, name: &str) -> Option<String> {
    payload
        .headers
        .as_ref()?
        .iter()
        .find_map(|h| (h.name == name).then(|| h.value.clone()))
}

/// Extract both body representations from the MIME tree
///
/// A non-empty top-level inline body means a single-part message and is
/// decoded directly. Otherwise the part tree is walked with an explicit
/// worklist (arbitrarily nested multipart/alternative or multipart/mixed
/// without unbounded recursion); the last matching part of each type
/// wins, which matches the usual single-text/single-html alternative
/// structure.
fn extract_body(payload: &MessagePart) -> EmailBody {
    let mut body = EmailBody::default();

    let inline = payload
        .body
        .as_ref()
        .filter(|b| b.size.unwrap_or(0) > 0)
        .and_then(|b| b.data.as_deref());

    if let Some(data) = inline {
        let decoded = decode_base64_text(data).unwrap_or_default();
        match BodyKind::of(payload.mime_type.as_deref()) {
            BodyKind::Html => body.html = decoded,
            BodyKind::Plain => body.text = decoded,
        }
        return body;
    }

    let mut queue: VecDeque<&MessagePart> = VecDeque::new();
    if let Some(parts) = &payload.parts {
        queue.extend(parts.iter());
    }

    while let Some(part) = queue.pop_front() {
        if let Some(nested) = &part.parts {
            queue.extend(nested.iter());
            continue;
        }

        let Some(data) = part.body.as_ref().and_then(|b| b.data.as_deref()) else {
            continue;
        };

        match part.mime_type.as_deref() {
            Some("text/plain") => {
                body.text = decode_base64_text(data).unwrap_or_default();
            }
            Some("text/html") => {
                body.html = decode_base64_text(data).unwrap_or_default();
            }
            _ => {}
        }
    }

    body
}

/// Decode base64-encoded body data to UTF-8 text
///
/// Gmail uses URL-safe base64 but padding can vary, so several engines
/// are tried in order.
pub(crate) fn decode_base64_text(data: &str) -> Option<String> {
    decode_base64_bytes(data).and_then(|bytes| String::from_utf8(bytes).ok())
}

/// Decode base64-encoded data to raw bytes
pub(crate) fn decode_base64_bytes(data: &str) -> Option<Vec<u8>> {
    use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE};

    let engines: &[&base64::engine::GeneralPurpose] =
        &[&BASE64_URL_SAFE_NO_PAD, &URL_SAFE, &STANDARD, &STANDARD_NO_PAD];

    engines.iter().find_map(|engine| engine.decode(data).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gmail::api::{Header, MessageBody};
    use crate::models::Attachment;
    use crate::transport::SendResult;

    /// Transport double that only serves canned attachments
    struct StubTransport {
        attachments: Vec<Attachment>,
    }

    impl MailTransport for StubTransport {
        fn search(&self, _query: &str, _label: &str) -> Result<Vec<RawMessage>> {
            Ok(Vec::new())
        }

        fn fetch_attachments(&self, _message: &RawMessage) -> Result<Vec<Attachment>> {
            Ok(self.attachments.clone())
        }

        fn send(&self, _raw_base64: &str, _thread_id: &str) -> Result<SendResult> {
            unreachable!("normalization never sends")
        }
    }

    fn no_attachments() -> StubTransport {
        StubTransport {
            attachments: Vec::new(),
        }
    }

    fn headers(pairs: &[(&str, &str)]) -> Vec<Header> {
        pairs
            .iter()
            .map(|(n, v)| Header {
                name: n.to_string(),
                value: v.to_string(),
            })
            .collect()
    }

    fn leaf_part(mime_type: &str, data: &str) -> MessagePart {
        MessagePart {
            mime_type: Some(mime_type.to_string()),
            body: Some(MessageBody {
                size: Some(data.len() as u32),
                data: Some(data.to_string()),
                attachment_id: None,
            }),
            ..Default::default()
        }
    }

    fn raw_message(payload: MessagePart) -> RawMessage {
        RawMessage {
            id: "m1".to_string(),
            thread_id: "t1".to_string(),
            label_ids: None,
            snippet: String::new(),
            internal_date: "1731401723000".to_string(),
            payload: Some(payload),
        }
    }

    #[test]
    fn test_header_extraction() {
        let payload = MessagePart {
            headers: Some(headers(&[
                ("From", "alice@example.com"),
                ("To", "bob@example.com"),
                ("Subject", "Hi"),
            ])),
            ..Default::default()
        };
        let raw = raw_message(payload);

        let email =
            normalize_email(&raw, &FilterOptions::default(), &no_attachments()).unwrap();
        assert_eq!(email.from, "alice@example.com");
        assert_eq!(email.receiver, "bob@example.com");
        assert_eq!(email.subject, "Hi");
        assert_eq!(email.thread_id, "t1");
        assert!(email.body.is_none());
        assert!(email.attachments.is_none());
    }

    #[test]
    fn test_header_lookup_is_case_sensitive_first_match_wins() {
        let payload = MessagePart {
            headers: Some(headers(&[
                ("FROM", "shouty@example.com"),
                ("From", "first@example.com"),
                ("From", "second@example.com"),
            ])),
            ..Default::default()
        };
        assert_eq!(
            extract_header(&payload, "From"),
            Some("first@example.com".to_string())
        );
    }

    #[test]
    fn test_message_id_falls_back_to_alternate_casing() {
        let payload = MessagePart {
            headers: Some(headers(&[("Message-Id", "<abc@mail.example.com>")])),
            ..Default::default()
        };
        let raw = raw_message(payload);

        let email =
            normalize_email(&raw, &FilterOptions::default(), &no_attachments()).unwrap();
        assert_eq!(email.message_id, Some("<abc@mail.example.com>".to_string()));
    }

    #[test]
    fn test_date_comes_from_internal_timestamp() {
        let payload = MessagePart {
            headers: Some(headers(&[("Date", "Mon, 1 Jan 1990 00:00:00 +0000")])),
            ..Default::default()
        };
        let raw = raw_message(payload);

        let email =
            normalize_email(&raw, &FilterOptions::default(), &no_attachments()).unwrap();
        assert_eq!(email.date.timestamp_millis(), 1_731_401_723_000);
    }

    #[test]
    fn test_single_part_plain_body() {
        let raw = raw_message(leaf_part("text/plain", "aGVsbG8="));
        let options = FilterOptions {
            include_body: true,
            ..Default::default()
        };

        let email = normalize_email(&raw, &options, &no_attachments()).unwrap();
        let body = email.body.unwrap();
        assert_eq!(body.text, "hello");
        assert_eq!(body.html, "");
    }

    #[test]
    fn test_single_part_html_body() {
        // "<p>hi</p>"
        let raw = raw_message(leaf_part("text/html", "PHA-aGk8L3A-"));
        let options = FilterOptions {
            include_body: true,
            ..Default::default()
        };

        let email = normalize_email(&raw, &options, &no_attachments()).unwrap();
        let body = email.body.unwrap();
        assert_eq!(body.html, "<p>hi</p>");
        assert_eq!(body.text, "");
    }

    #[test]
    fn test_unrecognized_single_part_type_lands_in_text() {
        let raw = raw_message(leaf_part("application/json", "e30="));
        let options = FilterOptions {
            include_body: true,
            ..Default::default()
        };

        let email = normalize_email(&raw, &options, &no_attachments()).unwrap();
        assert_eq!(email.body.unwrap().text, "{}");
    }

    #[test]
    fn test_nested_multipart_decodes_both_bodies() {
        // multipart/mixed containing a multipart/alternative with one
        // text/plain and one text/html leaf
        let alternative = MessagePart {
            mime_type: Some("multipart/alternative".to_string()),
            parts: Some(vec![
                leaf_part("text/plain", "aGVsbG8="),
                leaf_part("text/html", "PHA-aGk8L3A-"),
            ]),
            ..Default::default()
        };
        let mixed = MessagePart {
            mime_type: Some("multipart/mixed".to_string()),
            body: Some(MessageBody {
                size: Some(0),
                data: None,
                attachment_id: None,
            }),
            parts: Some(vec![alternative]),
            ..Default::default()
        };
        let raw = raw_message(mixed);
        let options = FilterOptions {
            include_body: true,
            ..Default::default()
        };

        let email = normalize_email(&raw, &options, &no_attachments()).unwrap();
        let body = email.body.unwrap();
        assert_eq!(body.text, "hello");
        assert_eq!(body.html, "<p>hi</p>");
    }

    #[test]
    fn test_last_matching_part_wins() {
        let payload = MessagePart {
            mime_type: Some("multipart/mixed".to_string()),
            parts: Some(vec![
                leaf_part("text/plain", "Zmlyc3Q="),  // "first"
                leaf_part("text/plain", "c2Vjb25k"), // "second"
            ]),
            ..Default::default()
        };
        let raw = raw_message(payload);
        let options = FilterOptions {
            include_body: true,
            ..Default::default()
        };

        let email = normalize_email(&raw, &options, &no_attachments()).unwrap();
        assert_eq!(email.body.unwrap().text, "second");
    }

    #[test]
    fn test_deeply_nested_parts_do_not_recurse() {
        // 200 levels of nesting with the leaf at the bottom
        let mut part = leaf_part("text/plain", "ZGVlcA=="); // "deep"
        for _ in 0..200 {
            part = MessagePart {
                mime_type: Some("multipart/mixed".to_string()),
                parts: Some(vec![part]),
                ..Default::default()
            };
        }
        let raw = raw_message(part);
        let options = FilterOptions {
            include_body: true,
            ..Default::default()
        };

        let email = normalize_email(&raw, &options, &no_attachments()).unwrap();
        assert_eq!(email.body.unwrap().text, "deep");
    }

    #[test]
    fn test_attachments_delegated_to_transport() {
        let transport = StubTransport {
            attachments: vec![Attachment {
                filename: "report.pdf".to_string(),
                mime_type: "application/pdf".to_string(),
                data: vec![0x25, 0x50, 0x44, 0x46],
            }],
        };
        let raw = raw_message(MessagePart::default());
        let options = FilterOptions {
            include_attachments: true,
            ..Default::default()
        };

        let email = normalize_email(&raw, &options, &transport).unwrap();
        let attachments = email.attachments.unwrap();
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].filename, "report.pdf");
    }

    #[test]
    fn test_decode_base64_variants() {
        // URL-safe without padding
        assert_eq!(
            decode_base64_text("SGVsbG8sIFdvcmxkIQ"),
            Some("Hello, World!".to_string())
        );
        // Standard with padding
        assert_eq!(decode_base64_text("aGVsbG8="), Some("hello".to_string()));
    }
}
