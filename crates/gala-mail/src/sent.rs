//! Sent-mail log
//!
//! Every delivery attempt from the bulk path is recorded, successful or not.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gala_common::repository::RepoResult;
use gala_common::RepositoryError;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Failed,
}

/// Full record, including the rendered bodies
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentEmail {
    pub id: Uuid,
    pub registration_id: Option<Uuid>,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub subject: String,
    pub heading: Option<String>,
    pub html: String,
    pub text: String,
    pub status: DeliveryStatus,
    pub error: Option<String>,
    pub sent_at: DateTime<Utc>,
}

/// Listing row
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentEmailSummary {
    pub id: Uuid,
    pub registration_id: Option<Uuid>,
    pub to: Vec<String>,
    pub subject: String,
    pub status: DeliveryStatus,
    pub sent_at: DateTime<Utc>,
}

impl SentEmail {
    pub fn summary(&self) -> SentEmailSummary {
        SentEmailSummary {
            id: self.id,
            registration_id: self.registration_id,
            to: self.to.clone(),
            subject: self.subject.clone(),
            status: self.status,
            sent_at: self.sent_at,
        }
    }
}

#[async_trait]
pub trait SentEmailStore: Send + Sync {
    async fn record(&self, email: SentEmail) -> RepoResult<()>;

    /// Newest first
    async fn list(&self) -> RepoResult<Vec<SentEmailSummary>>;

    async fn get(&self, id: Uuid) -> RepoResult<SentEmail>;
}

#[derive(Default)]
pub struct InMemorySentEmailStore {
    emails: RwLock<Vec<SentEmail>>,
}

impl InMemorySentEmailStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SentEmailStore for InMemorySentEmailStore {
    async fn record(&self, email: SentEmail) -> RepoResult<()> {
        self.emails.write().push(email);
        Ok(())
    }

    async fn list(&self) -> RepoResult<Vec<SentEmailSummary>> {
        let mut summaries: Vec<_> = self.emails.read().iter().map(SentEmail::summary).collect();
        // equal timestamps: later inserts first
        summaries.reverse();
        summaries.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
        Ok(summaries)
    }

    async fn get(&self, id: Uuid) -> RepoResult<SentEmail> {
        self.emails
            .read()
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("sent email {id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sent(subject: &str, at: DateTime<Utc>) -> SentEmail {
        SentEmail {
            id: Uuid::new_v4(),
            registration_id: None,
            to: vec!["a@b.com".into()],
            cc: vec![],
            bcc: vec![],
            subject: subject.into(),
            heading: None,
            html: "<p>hi</p>".into(),
            text: "hi".into(),
            status: DeliveryStatus::Sent,
            error: None,
            sent_at: at,
        }
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = InMemorySentEmailStore::new();
        let now = Utc::now();
        store.record(sent("older", now - Duration::minutes(5))).await.unwrap();
        store.record(sent("newer", now)).await.unwrap();
        let subjects: Vec<_> = store.list().await.unwrap().into_iter().map(|s| s.subject).collect();
        assert_eq!(subjects, vec!["newer", "older"]);
    }

    #[tokio::test]
    async fn test_get_detail() {
        let store = InMemorySentEmailStore::new();
        let email = sent("Welcome", Utc::now());
        let id = email.id;
        store.record(email.clone()).await.unwrap();
        assert_eq!(store.get(id).await.unwrap(), email);
        assert!(matches!(store.get(Uuid::new_v4()).await, Err(RepositoryError::NotFound(_))));
    }

    #[test]
    fn test_summary_wire_shape() {
        let value = serde_json::to_value(sent("Hi", Utc::now()).summary()).unwrap();
        assert_eq!(value["status"], "sent");
        assert!(value.get("sentAt").is_some());
        assert!(value.get("html").is_none());
    }
}
