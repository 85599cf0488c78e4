//! Registration endpoints: public submission, registrant self-edit and the
//! admin listing/export.

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use gala_common::codec::{export_csv, export_filename, EditView};
use gala_common::{search, Registration};
use gala_forms::{resolve, scoped, validate_all, DataBag};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{ErrorBody, RegistrationListResponse, RegistrationResponse};
use crate::ApiState;

pub fn router() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/registration", post(submit_registration))
        .route("/registration/by-token/:token", get(get_by_token))
        .route("/registration/:id", patch(update_registration))
        .route("/registrations", get(list_registrations))
        .route("/registrations/export", get(export_registrations))
}

#[derive(Debug, Deserialize)]
pub struct EditParams {
    #[serde(default)]
    pub view: EditView,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
}

/// Submit a registration
///
/// Body is the form's data bag keyed by field name. The same rules the form
/// enforces are checked again here.
#[utoipa::path(
    post,
    path = "/api/registration",
    responses(
        (status = 201, description = "Registration stored", body = RegistrationResponse),
        (status = 400, description = "Validation failed", body = ErrorBody)
    ),
    tag = "registrations"
)]
pub async fn submit_registration(
    State(state): State<Arc<ApiState>>,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<RegistrationResponse>)> {
    if !body.is_object() {
        return Err(ApiError::BadRequest("Expected a JSON object".into()));
    }
    let form = resolve(&state.form, state.content.as_ref()).await;
    let bag = DataBag::from_json(&body);

    let issues = validate_all(&form, &bag);
    if !issues.is_empty() {
        return Err(ApiError::Validation(issues));
    }

    let bag = scoped(&form, &bag, state.submit_scope);
    let registration = Registration::from_submission(bag.as_map())?;
    state.registrations.save(&registration).await?;
    tracing::info!(id = %registration.id, "registration received");

    Ok((StatusCode::CREATED, Json(RegistrationResponse { data: registration })))
}

/// Look up a registration by its self-service token
#[utoipa::path(
    get,
    path = "/api/registration/by-token/{token}",
    params(("token" = String, Path, description = "Edit token from the registrant's link")),
    responses(
        (status = 200, description = "Registration", body = RegistrationResponse),
        (status = 404, description = "Unknown token", body = ErrorBody)
    ),
    tag = "registrations"
)]
pub async fn get_by_token(
    State(state): State<Arc<ApiState>>,
    Path(token): Path<String>,
) -> ApiResult<Json<RegistrationResponse>> {
    let data = state
        .registrations
        .find_by_token(&token)
        .await
        .map_err(|_| ApiError::NotFound("Registration not found".into()))?;
    Ok(Json(RegistrationResponse { data }))
}

/// Replace a registration
///
/// Body is the full registration. Identity fields are kept; `admin_notes`
/// is only written with `?view=admin`. Last write wins.
#[utoipa::path(
    patch,
    path = "/api/registration/{id}",
    params(
        ("id" = Uuid, Path, description = "Registration ID"),
        ("view" = Option<String>, Query, description = "`admin` to include admin-only fields")
    ),
    responses(
        (status = 200, description = "Updated registration", body = RegistrationResponse),
        (status = 400, description = "Invalid body", body = ErrorBody),
        (status = 404, description = "Unknown registration", body = ErrorBody)
    ),
    tag = "registrations"
)]
pub async fn update_registration(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    Query(params): Query<EditParams>,
    Json(body): Json<Value>,
) -> ApiResult<Json<RegistrationResponse>> {
    let Value::Object(wire) = body else {
        return Err(ApiError::BadRequest("Expected a JSON object".into()));
    };
    let mut registration = state.registrations.get(id).await?;
    let incoming = Registration::from_wire(wire)?;
    incoming.check_required()?;

    registration.apply_update(incoming, params.view == EditView::Admin);
    state.registrations.save(&registration).await?;
    tracing::info!(id = %id, view = ?params.view, "registration updated");

    Ok(Json(RegistrationResponse { data: registration }))
}

/// List registrations, optionally filtered by a search string
#[utoipa::path(
    get,
    path = "/api/registrations",
    params(("search" = Option<String>, Query, description = "Case-insensitive name, email or company filter")),
    responses(
        (status = 200, description = "Registrations in submission order", body = RegistrationListResponse)
    ),
    tag = "registrations"
)]
pub async fn list_registrations(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<RegistrationListResponse>> {
    let all = state.registrations.list().await?;
    let data = match params.search.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        Some(query) => search::filter(&all, query).into_iter().cloned().collect(),
        None => all,
    };
    Ok(Json(RegistrationListResponse { data }))
}

/// Download every registration as CSV
///
/// Always the full set; search filters never apply to the export.
#[utoipa::path(
    get,
    path = "/api/registrations/export",
    responses(
        (status = 200, description = "CSV attachment", content_type = "text/csv", body = String)
    ),
    tag = "registrations"
)]
pub async fn export_registrations(State(state): State<Arc<ApiState>>) -> ApiResult<impl IntoResponse> {
    let all = state.registrations.list().await?;
    let csv = export_csv(&all, &state.links);
    let filename = export_filename(chrono::Utc::now().date_naive());
    tracing::info!(rows = all.len(), file = %filename, "exported registrations");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
        ],
        csv,
    ))
}
