//! Domain models for mail entities

mod email;
mod filter;

pub use email::{Attachment, Email, EmailBody};
pub use filter::FilterOptions;
