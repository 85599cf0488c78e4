//! Registration repository port
//!
//! The database of record is an external collaborator. The in-memory
//! implementation backs the development server and tests.

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::registration::Registration;

/// Repository result type
pub type RepoResult<T> = Result<T, RepositoryError>;

/// Repository errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum RepositoryError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> RepoResult<Registration>;

    async fn find_by_token(&self, token: &str) -> RepoResult<Registration>;

    /// Insert or replace by id
    async fn save(&self, registration: &Registration) -> RepoResult<()>;

    /// All registrations in insertion order
    async fn list(&self) -> RepoResult<Vec<Registration>>;
}

/// In-memory registration repository (for testing and development)
#[derive(Default)]
pub struct InMemoryRegistrationRepository {
    registrations: RwLock<Vec<Registration>>,
}

impl InMemoryRegistrationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registrations(registrations: Vec<Registration>) -> Self {
        Self { registrations: RwLock::new(registrations) }
    }
}

#[async_trait]
impl RegistrationRepository for InMemoryRegistrationRepository {
    async fn get(&self, id: Uuid) -> RepoResult<Registration> {
        self.registrations
            .read()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn find_by_token(&self, token: &str) -> RepoResult<Registration> {
        self.registrations
            .read()
            .iter()
            .find(|r| !token.is_empty() && r.edit_token == token)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound("registration for token".into()))
    }

    async fn save(&self, registration: &Registration) -> RepoResult<()> {
        let mut registrations = self.registrations.write();
        match registrations.iter_mut().find(|r| r.id == registration.id) {
            Some(existing) => *existing = registration.clone(),
            None => registrations.push(registration.clone()),
        }
        Ok(())
    }

    async fn list(&self) -> RepoResult<Vec<Registration>> {
        Ok(self.registrations.read().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_lookup() {
        let repo = InMemoryRegistrationRepository::new();
        let r = Registration::new("a@b.com", "A", "B");
        repo.save(&r).await.unwrap();

        assert_eq!(repo.get(r.id).await.unwrap(), r);
        assert_eq!(repo.find_by_token(&r.edit_token).await.unwrap().id, r.id);
        assert!(matches!(repo.find_by_token("").await, Err(RepositoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_save_replaces_in_place() {
        let repo = InMemoryRegistrationRepository::new();
        let mut first = Registration::new("a@b.com", "A", "B");
        let second = Registration::new("c@d.com", "C", "D");
        repo.save(&first).await.unwrap();
        repo.save(&second).await.unwrap();

        first.company = Some("Acme".into());
        repo.save(&first).await.unwrap();

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].company.as_deref(), Some("Acme"));
        assert_eq!(all[1].id, second.id);
    }
}
