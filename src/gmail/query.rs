//! Gmail search-query construction
//!
//! Translates [`FilterOptions`] into the Gmail search syntax. Pure
//! function; the clause order is fixed so queries are reproducible.

use chrono::{DateTime, Utc};

use crate::models::FilterOptions;

/// Build a Gmail search query from filter criteria
///
/// Clauses are emitted in the order `to, from, subject, after, before`,
/// space-joined. Unset fields contribute nothing; empty options yield
/// the empty string (matches everything under the label). Quote
/// characters inside `to`/`from` are the caller's responsibility.
pub fn build_query(options: &FilterOptions) -> String {
    let mut clauses: Vec<String> = Vec::new();

    if let Some(to) = &options.to {
        clauses.push(format!("to:\"{}\"", to));
    }
    if let Some(from) = &options.from {
        clauses.push(format!("from:\"{}\"", from));
    }
    if let Some(subject) = &options.subject {
        // Parenthesised but unquoted so operator-bearing substrings
        // keep their meaning.
        clauses.push(format!("subject:({})", subject));
    }
    if let Some(after) = &options.after {
        clauses.push(format!("after:{}", epoch_seconds(after)));
    }
    if let Some(before) = &options.before {
        clauses.push(format!("before:{}", epoch_seconds(before)));
    }

    clauses.join(" ").trim().to_string()
}

/// Unix epoch seconds, rounded to the nearest second
fn epoch_seconds(dt: &DateTime<Utc>) -> i64 {
    (dt.timestamp_millis() as f64 / 1000.0).round() as i64
}
