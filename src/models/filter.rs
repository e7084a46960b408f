//! Search and polling criteria

use chrono::{DateTime, Utc};

/// Filter criteria for a mailbox search, plus polling knobs
///
/// Immutable input to a search; unset fields contribute nothing to the
/// generated query. Quote characters in `to`/`from` are not escaped.
#[derive(Debug, Clone)]
pub struct FilterOptions {
    /// Match the `To` address
    pub to: Option<String>,
    /// Match the `From` address
    pub from: Option<String>,
    /// Match the subject. Emitted unquoted so operator-bearing
    /// substrings keep their meaning.
    pub subject: Option<String>,
    /// Only messages received before this instant
    pub before: Option<DateTime<Utc>>,
    /// Only messages received after this instant
    pub after: Option<DateTime<Utc>>,
    /// Gmail label to search under; `None` means `"INBOX"`
    pub label: Option<String>,
    /// Decode the message body into the returned [`Email`](super::Email)
    pub include_body: bool,
    /// Download attachments into the returned [`Email`](super::Email)
    pub include_attachments: bool,
    /// Seconds to sleep between poll attempts. A zero interval
    /// busy-polls; no minimum is enforced.
    pub wait_interval_secs: f64,
    /// Cumulative sleep budget in seconds before giving up
    pub max_wait_secs: f64,
}

impl FilterOptions {
    pub const DEFAULT_LABEL: &'static str = "INBOX";

    const DEFAULT_WAIT_INTERVAL_SECS: f64 = 30.0;
    const DEFAULT_MAX_WAIT_SECS: f64 = 30.0;

    /// The label to search under, defaulting to the inbox
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(Self::DEFAULT_LABEL)
    }
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            to: None,
            from: None,
            subject: None,
            before: None,
            after: None,
            label: None,
            include_body: false,
            include_attachments: false,
            wait_interval_secs: Self::DEFAULT_WAIT_INTERVAL_SECS,
            max_wait_secs: Self::DEFAULT_MAX_WAIT_SECS,
        }
    }
}
