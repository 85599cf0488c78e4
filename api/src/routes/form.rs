//! Form configuration endpoint

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use gala_forms::resolve;
use std::sync::Arc;

use crate::models::FormConfigResponse;
use crate::ApiState;

pub fn router() -> Router<Arc<ApiState>> {
    Router::new().route("/form-config", get(get_form_config))
}

/// Resolved registration form
///
/// Static structure with the current CMS copy merged on. Content that cannot
/// be fetched leaves the built-in copy in place.
#[utoipa::path(
    get,
    path = "/api/form-config",
    responses(
        (status = 200, description = "Resolved form", body = FormConfigResponse)
    ),
    tag = "form"
)]
pub async fn get_form_config(State(state): State<Arc<ApiState>>) -> Json<FormConfigResponse> {
    let data = resolve(&state.form, state.content.as_ref()).await;
    Json(FormConfigResponse { data })
}
