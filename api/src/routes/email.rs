//! Email composer endpoints: preview, bulk send and the sent-mail log

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use gala_mail::BulkEmailRequest;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    BulkEmailResponse, EmailPreviewRequest, EmailPreviewResponse, ErrorBody, SendBulkEmailRequest,
    SentEmailDetailResponse, SentEmailListResponse,
};
use crate::ApiState;

pub fn router() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/email-preview", post(email_preview))
        .route("/send-bulk-email", post(send_bulk_email))
        .route("/sent-emails", get(list_sent_emails))
        .route("/sent-emails/:id", get(get_sent_email))
}

/// Render the email one registrant would receive
#[utoipa::path(
    post,
    path = "/api/email-preview",
    request_body = EmailPreviewRequest,
    responses(
        (status = 200, description = "Rendered email", body = EmailPreviewResponse),
        (status = 404, description = "Unknown registration", body = ErrorBody)
    ),
    tag = "email"
)]
pub async fn email_preview(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<EmailPreviewRequest>,
) -> ApiResult<Json<EmailPreviewResponse>> {
    let rendered = state.mailer.preview(req.registration_id, &req.draft(), &req.recipient_fields).await?;
    Ok(Json(rendered.into()))
}

/// Send one templated email per selected registration
#[utoipa::path(
    post,
    path = "/api/send-bulk-email",
    request_body = SendBulkEmailRequest,
    responses(
        (status = 200, description = "Per-recipient outcome", body = BulkEmailResponse),
        (status = 400, description = "Nothing to send", body = ErrorBody)
    ),
    tag = "email"
)]
pub async fn send_bulk_email(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<SendBulkEmailRequest>,
) -> ApiResult<Json<BulkEmailResponse>> {
    if req.registration_ids.is_empty() {
        return Err(ApiError::BadRequest("No registrations selected".into()));
    }
    if req.subject.trim().is_empty() {
        return Err(ApiError::BadRequest("Subject is required".into()));
    }
    let request = BulkEmailRequest::from(req);
    let result = state.mailer.send_bulk(&request).await;
    Ok(Json(result.into()))
}

/// Sent-mail log, newest first
#[utoipa::path(
    get,
    path = "/api/sent-emails",
    responses(
        (status = 200, description = "Sent emails", body = SentEmailListResponse)
    ),
    tag = "email"
)]
pub async fn list_sent_emails(State(state): State<Arc<ApiState>>) -> ApiResult<Json<SentEmailListResponse>> {
    let emails = state.sent.list().await?;
    Ok(Json(SentEmailListResponse { success: true, emails }))
}

/// One sent email with its rendered bodies
#[utoipa::path(
    get,
    path = "/api/sent-emails/{id}",
    params(("id" = Uuid, Path, description = "Sent email ID")),
    responses(
        (status = 200, description = "Sent email", body = SentEmailDetailResponse),
        (status = 404, description = "Unknown email", body = ErrorBody)
    ),
    tag = "email"
)]
pub async fn get_sent_email(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SentEmailDetailResponse>> {
    let email = state.sent.get(id).await?;
    Ok(Json(SentEmailDetailResponse { success: true, email }))
}
