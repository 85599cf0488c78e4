//! Request and response bodies

use gala_common::Registration;
use gala_forms::FormConfig;
use gala_mail::{
    BulkEmailRequest, BulkEmailResult, EmailDraft, RecipientFields, RecipientResult, RenderedEmail, SentEmail,
    SentEmailSummary,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FormConfigResponse {
    /// Static form structure with CMS copy applied
    #[schema(value_type = Object)]
    pub data: FormConfig,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegistrationResponse {
    #[schema(value_type = Object)]
    pub data: Registration,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegistrationListResponse {
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<Registration>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub url: String,
}

/// Composer content plus recipient lines
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmailPreviewRequest {
    pub registration_id: Uuid,
    #[serde(default)]
    pub heading: Option<String>,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub header_image_url: Option<String>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub recipient_fields: RecipientFields,
}

impl EmailPreviewRequest {
    pub fn draft(&self) -> EmailDraft {
        EmailDraft {
            heading: self.heading.clone(),
            subject: self.subject.clone(),
            body: self.body.clone(),
            header_image_url: self.header_image_url.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EmailPreviewResponse {
    pub subject: String,
    pub html: String,
    pub text: String,
}

impl From<RenderedEmail> for EmailPreviewResponse {
    fn from(email: RenderedEmail) -> Self {
        Self { subject: email.subject, html: email.html, text: email.text }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendBulkEmailRequest {
    pub registration_ids: Vec<String>,
    #[serde(default)]
    pub heading: Option<String>,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub header_image_url: Option<String>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub recipient_fields: RecipientFields,
}

impl From<SendBulkEmailRequest> for BulkEmailRequest {
    fn from(req: SendBulkEmailRequest) -> Self {
        Self {
            registration_ids: req.registration_ids,
            heading: req.heading,
            subject: req.subject,
            body: req.body,
            header_image_url: req.header_image_url,
            recipient_fields: req.recipient_fields,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkEmailResponse {
    pub total: usize,
    pub success_count: usize,
    pub skipped_count: usize,
    pub fail_count: usize,
    #[schema(value_type = Vec<Object>)]
    pub results: Vec<RecipientResult>,
}

impl From<BulkEmailResult> for BulkEmailResponse {
    fn from(result: BulkEmailResult) -> Self {
        Self {
            total: result.total,
            success_count: result.success_count,
            skipped_count: result.skipped_count,
            fail_count: result.fail_count,
            results: result.results,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SentEmailListResponse {
    pub success: bool,
    #[schema(value_type = Vec<Object>)]
    pub emails: Vec<SentEmailSummary>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SentEmailDetailResponse {
    pub success: bool,
    #[schema(value_type = Object)]
    pub email: SentEmail,
}
