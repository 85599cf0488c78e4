//! Shared handler state

use gala_common::codec::RegistrantLinks;
use gala_common::{InMemoryRegistrationRepository, RegistrationRepository};
use gala_forms::{
    registration_form, ContentSource, FileContent, FormConfig, SchemaError, StaticContent, SubmitScope,
};
use gala_mail::{BulkMailer, EmailSender, InMemorySentEmailStore, LogSender, SentEmailStore};
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::uploads::{LocalUploadStore, UploadStore};

/// API state
pub struct ApiState {
    /// Static form; the overlay is merged onto a copy per request
    pub form: FormConfig,
    pub content: Arc<dyn ContentSource>,
    pub registrations: Arc<dyn RegistrationRepository>,
    pub uploads: Arc<dyn UploadStore>,
    pub sent: Arc<dyn SentEmailStore>,
    pub mailer: BulkMailer,
    pub links: RegistrantLinks,
    pub submit_scope: SubmitScope,
}

/// Collaborators the state is wired from
pub struct Ports {
    pub content: Arc<dyn ContentSource>,
    pub registrations: Arc<dyn RegistrationRepository>,
    pub uploads: Arc<dyn UploadStore>,
    pub sender: Arc<dyn EmailSender>,
    pub sent: Arc<dyn SentEmailStore>,
}

impl ApiState {
    pub fn new(ports: Ports, public_origin: &str, submit_scope: SubmitScope) -> Result<Self, SchemaError> {
        let links = RegistrantLinks::new(public_origin);
        let mailer = BulkMailer::new(
            ports.registrations.clone(),
            ports.sender,
            ports.sent.clone(),
            links.clone(),
        );
        Ok(Self {
            form: registration_form()?,
            content: ports.content,
            registrations: ports.registrations,
            uploads: ports.uploads,
            sent: ports.sent,
            mailer,
            links,
            submit_scope,
        })
    }

    /// Development wiring: file-backed content and uploads, in-memory records,
    /// mail written to the log
    pub fn from_config(config: &ServerConfig) -> Result<Self, SchemaError> {
        let content: Arc<dyn ContentSource> = match &config.content_path {
            Some(path) => Arc::new(FileContent::new(path)),
            None => Arc::new(StaticContent::default()),
        };
        let ports = Ports {
            content,
            registrations: Arc::new(InMemoryRegistrationRepository::new()),
            uploads: Arc::new(LocalUploadStore::new(&config.upload_dir, &config.upload_base_url)),
            sender: Arc::new(LogSender),
            sent: Arc::new(InMemorySentEmailStore::new()),
        };
        Self::new(ports, &config.public_origin, config.submit_scope)
    }
}
