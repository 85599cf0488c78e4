//! # Gala Mail
//!
//! Registrant email: `{{variable}}` templates rendered once for both preview
//! and send, per-line recipient lists, bulk delivery over a pluggable sender
//! and a log of every attempt.

#![warn(clippy::all)]

pub mod bulk;
pub mod recipients;
pub mod sent;
pub mod template;

pub use bulk::{
    BulkEmailRequest, BulkEmailResult, BulkMailer, DeliveryError, EmailSender, Envelope, LogSender, OutgoingEmail,
    RecipientResult,
};
pub use recipients::{PredefinedRecipient, RecipientEntry, RecipientError, RecipientFields, RecipientList, RecipientSet};
pub use sent::{DeliveryStatus, InMemorySentEmailStore, SentEmail, SentEmailStore, SentEmailSummary};
pub use template::{cta_html, escape_html, link_html, render_email, substitute, EmailDraft, RenderedEmail};
