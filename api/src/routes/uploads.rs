//! Image upload endpoint

use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::models::{ErrorBody, UploadResponse};
use crate::uploads::{check_upload, UploadError, MAX_UPLOAD_BYTES};
use crate::ApiState;

/// Room for the multipart framing around a maximum-size image
const BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 64 * 1024;

pub fn router() -> Router<Arc<ApiState>> {
    Router::new().route("/upload", post(upload_image).layer(DefaultBodyLimit::max(BODY_LIMIT)))
}

/// A body over the limit surfaces as a multipart read error
fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::warn!(limit = BODY_LIMIT, "upload body over limit");
        UploadError::TooLarge.into()
    } else {
        ApiError::BadRequest(err.body_text())
    }
}

/// Upload an email header image
///
/// Multipart form with a single `file` part; `image/*` only, at most 5 MB.
#[utoipa::path(
    post,
    path = "/api/upload",
    responses(
        (status = 200, description = "Stored", body = UploadResponse),
        (status = 400, description = "Not an image or no file", body = ErrorBody),
        (status = 413, description = "Too large", body = ErrorBody)
    ),
    tag = "uploads"
)]
pub async fn upload_image(
    State(state): State<Arc<ApiState>>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?;

        if let Err(err) = check_upload(content_type.as_deref(), bytes.len()) {
            tracing::warn!(file = %file_name, content_type = ?content_type, size = bytes.len(), error = %err, "upload rejected");
            return Err(err.into());
        }
        let url = state.uploads.store(&file_name, &bytes).await?;
        return Ok(Json(UploadResponse { url }));
    }
    Err(UploadError::MissingFile.into())
}
