//! Bulk mail composition and delivery
//!
//! For each selected registration: expand the recipient roles, build that
//! registrant's variables, render through [`render_email`], hand the message
//! to the delivery port and log the attempt. Registrations are processed
//! sequentially within one request.

use async_trait::async_trait;
use chrono::Utc;
use gala_common::codec::{build_variables, RegistrantLinks, VariableOptions};
use gala_common::repository::RepoResult;
use gala_common::{EmailAddress, Registration, RegistrationRepository};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use crate::recipients::{PredefinedRecipient, RecipientFields, RecipientSet};
use crate::sent::{DeliveryStatus, SentEmail, SentEmailStore};
use crate::template::{render_email, EmailDraft, RenderedEmail};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkEmailRequest {
    pub registration_ids: Vec<String>,
    #[serde(default)]
    pub heading: Option<String>,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub header_image_url: Option<String>,
    #[serde(default)]
    pub recipient_fields: RecipientFields,
}

impl BulkEmailRequest {
    pub fn draft(&self) -> EmailDraft {
        EmailDraft {
            heading: self.heading.clone(),
            subject: self.subject.clone(),
            body: self.body.clone(),
            header_image_url: self.header_image_url.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientResult {
    pub email: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkEmailResult {
    pub total: usize,
    pub success_count: usize,
    pub skipped_count: usize,
    pub fail_count: usize,
    pub results: Vec<RecipientResult>,
}

impl BulkEmailResult {
    fn push(&mut self, result: RecipientResult) {
        if result.skipped == Some(true) {
            self.skipped_count += 1;
        } else if result.success {
            self.success_count += 1;
        } else {
            self.fail_count += 1;
        }
        self.results.push(result);
    }
}

/// Concrete addresses for one message
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Envelope {
    pub to: Vec<EmailAddress>,
    pub cc: Vec<EmailAddress>,
    pub bcc: Vec<EmailAddress>,
}

impl Envelope {
    /// Expand roles against `registration`. An address appears once across
    /// the whole envelope, in the first line that names it.
    pub fn expand(fields: &RecipientFields, registration: &Registration) -> Self {
        let mut seen: Vec<EmailAddress> = Vec::new();
        let mut line = |set: &RecipientSet| -> Vec<EmailAddress> {
            resolve(set, registration)
                .into_iter()
                .filter(|a| {
                    if seen.contains(a) {
                        false
                    } else {
                        seen.push(a.clone());
                        true
                    }
                })
                .collect()
        };
        let to = line(&fields.to);
        let cc = line(&fields.cc);
        let bcc = line(&fields.bcc);
        Self { to, cc, bcc }
    }

    fn strings(addresses: &[EmailAddress]) -> Vec<String> {
        addresses.iter().map(|a| a.as_str().to_string()).collect()
    }
}

fn resolve(set: &RecipientSet, registration: &Registration) -> Vec<EmailAddress> {
    let roles = set.predefined.iter().filter_map(|p| match p {
        PredefinedRecipient::Registrant => Some(registration.email.as_str()),
        PredefinedRecipient::Assistant => registration.assistant_email.as_deref(),
        PredefinedRecipient::Guest => registration.guest_email.as_deref(),
    });
    roles
        .chain(set.custom.iter().map(String::as_str))
        .filter_map(|raw| match EmailAddress::parse(raw) {
            Ok(address) => Some(address),
            Err(err) => {
                if !raw.trim().is_empty() {
                    tracing::warn!(error = %err, "dropping unusable recipient");
                }
                None
            }
        })
        .collect()
}

/// A rendered message ready for delivery
#[derive(Clone, Debug, PartialEq)]
pub struct OutgoingEmail {
    pub envelope: Envelope,
    pub content: RenderedEmail,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("delivery rejected: {0}")]
    Rejected(String),
    #[error("mail provider unavailable: {0}")]
    Unavailable(String),
}

/// Outbound mail provider
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), DeliveryError>;
}

/// Logs instead of delivering; the development default
#[derive(Clone, Debug, Default)]
pub struct LogSender;

#[async_trait]
impl EmailSender for LogSender {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), DeliveryError> {
        tracing::info!(
            to = ?Envelope::strings(&email.envelope.to),
            cc = email.envelope.cc.len(),
            bcc = email.envelope.bcc.len(),
            subject = %email.content.subject,
            "email delivered to log"
        );
        Ok(())
    }
}

pub struct BulkMailer {
    registrations: Arc<dyn RegistrationRepository>,
    sender: Arc<dyn EmailSender>,
    log: Arc<dyn SentEmailStore>,
    links: RegistrantLinks,
}

impl BulkMailer {
    pub fn new(
        registrations: Arc<dyn RegistrationRepository>,
        sender: Arc<dyn EmailSender>,
        log: Arc<dyn SentEmailStore>,
        links: RegistrantLinks,
    ) -> Self {
        Self { registrations, sender, log, links }
    }

    /// Render the message one registrant would receive
    pub fn compose(&self, registration: &Registration, draft: &EmailDraft, fields: &RecipientFields) -> OutgoingEmail {
        let options = VariableOptions {
            assistant_fallback_to_registrant: fields.mentions(PredefinedRecipient::Assistant)
                && registration.assistant().is_none(),
        };
        let vars = build_variables(registration, &self.links, options);
        OutgoingEmail {
            envelope: Envelope::expand(fields, registration),
            content: render_email(draft, &vars),
        }
    }

    pub async fn preview(&self, registration_id: Uuid, draft: &EmailDraft, fields: &RecipientFields) -> RepoResult<RenderedEmail> {
        let registration = self.registrations.get(registration_id).await?;
        Ok(self.compose(&registration, draft, fields).content)
    }

    pub async fn send_bulk(&self, request: &BulkEmailRequest) -> BulkEmailResult {
        let draft = request.draft();
        let mut result = BulkEmailResult { total: request.registration_ids.len(), ..Default::default() };

        for raw_id in &request.registration_ids {
            let registration = match Uuid::from_str(raw_id) {
                Ok(id) => self.registrations.get(id).await.map_err(|e| e.to_string()),
                Err(_) => Err(format!("invalid registration id: {raw_id}")),
            };
            let registration = match registration {
                Ok(r) => r,
                Err(error) => {
                    result.push(RecipientResult { email: raw_id.clone(), success: false, error: Some(error), skipped: None });
                    continue;
                }
            };
            result.push(self.deliver(&registration, &draft, &request.recipient_fields).await);
        }

        tracing::info!(
            total = result.total,
            sent = result.success_count,
            skipped = result.skipped_count,
            failed = result.fail_count,
            "bulk email finished"
        );
        result
    }

    async fn deliver(&self, registration: &Registration, draft: &EmailDraft, fields: &RecipientFields) -> RecipientResult {
        let email = self.compose(registration, draft, fields);
        if email.envelope.to.is_empty() {
            return RecipientResult {
                email: registration.email.clone(),
                success: false,
                error: Some("no recipient address".into()),
                skipped: Some(true),
            };
        }
        let to = Envelope::strings(&email.envelope.to);
        let outcome = self.sender.send(&email).await;

        let entry = SentEmail {
            id: Uuid::new_v4(),
            registration_id: Some(registration.id),
            to: to.clone(),
            cc: Envelope::strings(&email.envelope.cc),
            bcc: Envelope::strings(&email.envelope.bcc),
            subject: email.content.subject.clone(),
            heading: draft.heading.clone(),
            html: email.content.html.clone(),
            text: email.content.text.clone(),
            status: if outcome.is_ok() { DeliveryStatus::Sent } else { DeliveryStatus::Failed },
            error: outcome.as_ref().err().map(ToString::to_string),
            sent_at: Utc::now(),
        };
        if let Err(err) = self.log.record(entry).await {
            tracing::warn!(error = %err, "failed to log sent email");
        }

        let email = to.join(", ");
        match outcome {
            Ok(()) => RecipientResult { email, success: true, error: None, skipped: None },
            Err(err) => {
                tracing::warn!(registration = %registration.id, error = %err, "delivery failed");
                RecipientResult { email, success: false, error: Some(err.to_string()), skipped: None }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sent::InMemorySentEmailStore;
    use gala_common::InMemoryRegistrationRepository;
    use parking_lot::Mutex;
    use serde_json::json;

    #[derive(Default)]
    struct Outbox {
        sent: Mutex<Vec<OutgoingEmail>>,
        fail_for: Option<String>,
    }

    #[async_trait]
    impl EmailSender for Outbox {
        async fn send(&self, email: &OutgoingEmail) -> Result<(), DeliveryError> {
            if let Some(bad) = &self.fail_for {
                if email.envelope.to.iter().any(|a| a.as_str() == bad) {
                    return Err(DeliveryError::Rejected("mailbox full".into()));
                }
            }
            self.sent.lock().push(email.clone());
            Ok(())
        }
    }

    fn registrant(email: &str, first: &str, last: &str) -> Registration {
        Registration::new(email, first, last)
    }

    fn fields(doc: serde_json::Value) -> RecipientFields {
        serde_json::from_value(doc).unwrap()
    }

    fn mailer(regs: Vec<Registration>, outbox: Arc<Outbox>) -> (BulkMailer, Arc<InMemorySentEmailStore>) {
        let log = Arc::new(InMemorySentEmailStore::new());
        let mailer = BulkMailer::new(
            Arc::new(InMemoryRegistrationRepository::with_registrations(regs)),
            outbox,
            log.clone(),
            RegistrantLinks::new("https://gala.test"),
        );
        (mailer, log)
    }

    fn request(ids: Vec<String>, recipient_fields: RecipientFields) -> BulkEmailRequest {
        BulkEmailRequest {
            registration_ids: ids,
            subject: "Hello {{firstName}}".into(),
            body: "<p>Hi {{assistantFirstName}}, edit here: {{editLink}}</p>".into(),
            recipient_fields,
            ..Default::default()
        }
    }

    #[test]
    fn test_envelope_dedups_across_lines() {
        let mut reg = registrant("ceo@acme.test", "Ada", "Lovelace");
        reg.assistant_email = Some("pa@acme.test".into());
        let envelope = Envelope::expand(
            &fields(json!({
                "to": {"predefined": ["registrant"], "custom": ["CEO@acme.test"]},
                "cc": {"predefined": ["assistant", "guest"], "custom": ["events@gala.test"]},
                "bcc": {"custom": ["PA@acme.test", "not-an-email"]}
            })),
            &reg,
        );
        assert_eq!(Envelope::strings(&envelope.to), vec!["ceo@acme.test"]);
        assert_eq!(Envelope::strings(&envelope.cc), vec!["pa@acme.test", "events@gala.test"]);
        assert!(envelope.bcc.is_empty());
    }

    #[tokio::test]
    async fn test_bulk_send_counts_and_log() {
        let with_assistant = Registration {
            assistant_name: Some("Grace Brewster Hopper".into()),
            assistant_email: Some("grace@acme.test".into()),
            ..registrant("ada@acme.test", "Ada", "Lovelace")
        };
        let without_assistant = registrant("alan@acme.test", "Alan", "Turing");
        let ids = vec![with_assistant.id.to_string(), without_assistant.id.to_string(), Uuid::new_v4().to_string()];
        let outbox = Arc::new(Outbox::default());
        let (mailer, log) = mailer(vec![with_assistant.clone(), without_assistant], outbox.clone());

        let result = mailer
            .send_bulk(&request(ids, fields(json!({"to": {"predefined": ["assistant"]}}))))
            .await;

        assert_eq!(result.total, 3);
        assert_eq!(result.success_count, 1);
        assert_eq!(result.skipped_count, 1);
        assert_eq!(result.fail_count, 1);
        assert_eq!(result.results[0].email, "grace@acme.test");
        assert_eq!(result.results[1].skipped, Some(true));
        assert_eq!(result.results[2].error.as_deref(), Some(format!("not found: {}", result.results[2].email).as_str()));

        let sent = outbox.sent.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].content.subject, "Hello Ada");
        assert!(sent[0].content.text.starts_with("Hi Grace, edit here: https://gala.test/register/edit?token="));
        assert_eq!(log.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_assistant_fallback_when_addressed() {
        let reg = Registration { assistant_email: Some("desk@acme.test".into()), ..registrant("alan@acme.test", "Alan", "Turing") };
        let outbox = Arc::new(Outbox::default());
        let (mailer, _) = mailer(vec![reg.clone()], outbox.clone());

        let preview = mailer
            .preview(reg.id, &request(vec![], RecipientFields::default()).draft(), &fields(json!({"to": {"predefined": ["assistant"]}})))
            .await
            .unwrap();
        assert!(preview.text.starts_with("Hi Alan,"));

        let registrant_only = mailer
            .preview(reg.id, &request(vec![], RecipientFields::default()).draft(), &fields(json!({"to": {"predefined": ["registrant"]}})))
            .await
            .unwrap();
        assert!(registrant_only.text.starts_with("Hi ,"));
    }

    #[tokio::test]
    async fn test_delivery_failure_is_reported_and_logged() {
        let reg = registrant("bounce@acme.test", "Bo", "Unce");
        let outbox = Arc::new(Outbox { fail_for: Some("bounce@acme.test".into()), ..Default::default() });
        let (mailer, log) = mailer(vec![reg.clone()], outbox);

        let result = mailer
            .send_bulk(&request(vec![reg.id.to_string(), "garbage".into()], fields(json!({"to": {"predefined": ["registrant"]}}))))
            .await;

        assert_eq!(result.fail_count, 2);
        assert_eq!(result.results[0].error.as_deref(), Some("delivery rejected: mailbox full"));
        assert_eq!(result.results[1].error.as_deref(), Some("invalid registration id: garbage"));
        let logged = log.list().await.unwrap();
        assert_eq!(logged[0].status, DeliveryStatus::Failed);
    }

    #[tokio::test]
    async fn test_preview_matches_sent_content() {
        let reg = registrant("ada@acme.test", "Ada", "Lovelace");
        let outbox = Arc::new(Outbox::default());
        let (mailer, _) = mailer(vec![reg.clone()], outbox.clone());
        let req = request(vec![reg.id.to_string()], fields(json!({"to": {"predefined": ["registrant"]}})));

        let preview = mailer.preview(reg.id, &req.draft(), &req.recipient_fields).await.unwrap();
        mailer.send_bulk(&req).await;
        assert_eq!(outbox.sent.lock()[0].content, preview);
    }
}
