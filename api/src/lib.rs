//! Gala registration API
//!
//! HTTP surface for the invitation-only event registration app.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        GALA API                              │
//! │                                                              │
//! │  /api/form-config      static form + CMS copy overlay        │
//! │  /api/registration     submit, self-edit by token, admin     │
//! │  /api/registrations    listing, search, CSV export           │
//! │  /api/upload           email header images                   │
//! │  /api/*email*          preview, bulk send, sent-mail log     │
//! │                                                              │
//! │  ┌──────────────┐  ┌──────────────┐  ┌────────────────────┐  │
//! │  │ gala-common  │  │  gala-forms  │  │     gala-mail      │  │
//! │  │ record/codec │  │ schema/engine│  │ templates/recipients│ │
//! │  └──────────────┘  └──────────────┘  └────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod uploads;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use models::*;
pub use state::{ApiState, Ports};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Gala Registration API",
        version = "0.1.0",
        description = "Invitation-only event registration: form, records and registrant email"
    ),
    paths(
        routes::health::health_check,
        routes::form::get_form_config,
        routes::registrations::submit_registration,
        routes::registrations::get_by_token,
        routes::registrations::update_registration,
        routes::registrations::list_registrations,
        routes::registrations::export_registrations,
        routes::uploads::upload_image,
        routes::email::email_preview,
        routes::email::send_bulk_email,
        routes::email::list_sent_emails,
        routes::email::get_sent_email,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            ErrorBody, FormConfigResponse,
            RegistrationResponse, RegistrationListResponse,
            UploadResponse,
            EmailPreviewRequest, EmailPreviewResponse,
            SendBulkEmailRequest, BulkEmailResponse,
            SentEmailListResponse, SentEmailDetailResponse
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "form", description = "Registration form configuration"),
        (name = "registrations", description = "Registration records"),
        (name = "uploads", description = "Email header images"),
        (name = "email", description = "Registrant email composer")
    )
)]
pub struct ApiDoc;

/// Build the API router
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(routes::health::health_check))
        .nest("/api", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(Arc::new(state))
}

fn api_routes() -> Router<Arc<ApiState>> {
    Router::new()
        .merge(routes::form::router())
        .merge(routes::registrations::router())
        .merge(routes::uploads::router())
        .merge(routes::email::router())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use gala_common::{InMemoryRegistrationRepository, Registration};
    use gala_forms::{ContentOverlay, StaticContent, SubmitScope};
    use gala_mail::{InMemorySentEmailStore, LogSender};
    use serde_json::{json, Value};
    use uploads::InMemoryUploadStore;

    fn registrant() -> Registration {
        let mut r = Registration::new("ada@example.com", "Ada", "Lovelace");
        r.company = Some("Analytical Engines".into());
        r.assistant_email = Some("charles@example.com".into());
        r.admin_notes = Some("VIP".into());
        r
    }

    fn server_with(registrations: Vec<Registration>, overlay: Option<ContentOverlay>) -> TestServer {
        let ports = Ports {
            content: Arc::new(StaticContent::new(overlay)),
            registrations: Arc::new(InMemoryRegistrationRepository::with_registrations(registrations)),
            uploads: Arc::new(InMemoryUploadStore::new()),
            sender: Arc::new(LogSender),
            sent: Arc::new(InMemorySentEmailStore::new()),
        };
        let state = ApiState::new(ports, "https://gala.example.com", SubmitScope::Everything).unwrap();
        TestServer::new(build_router(state)).unwrap()
    }

    fn server() -> TestServer {
        server_with(Vec::new(), None)
    }

    #[tokio::test]
    async fn test_health() {
        let resp = server().get("/health").await;
        assert_eq!(resp.status_code(), StatusCode::OK);
        let body: Value = resp.json();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["storage"], true);
    }

    #[tokio::test]
    async fn test_form_config_merges_overlay() {
        let overlay = ContentOverlay::from_value(json!({
            "title": "Summit 2026",
            "sections": { "personalDetails": { "fields": { "company": { "label": "Organisation" } } } }
        }));
        let resp = server_with(Vec::new(), Some(overlay)).get("/api/form-config").await;
        assert_eq!(resp.status_code(), StatusCode::OK);

        let body: Value = resp.json();
        assert_eq!(body["data"]["chrome"]["title"], "Summit 2026");
        assert_eq!(body["data"]["steps"].as_array().map(Vec::len), Some(3));
        assert!(body.to_string().contains("Organisation"));
    }

    #[tokio::test]
    async fn test_form_config_without_content_uses_fallback_copy() {
        let body: Value = server().get("/api/form-config").await.json();
        assert!(!body["data"]["chrome"]["submitButtonText"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_registration() {
        let server = server();
        let resp = server
            .post("/api/registration")
            .json(&json!({
                "email": "grace@example.com",
                "first_name": "Grace",
                "last_name": "Hopper",
                "photo_consent": true
            }))
            .await;
        assert_eq!(resp.status_code(), StatusCode::CREATED);

        let body: Value = resp.json();
        assert_eq!(body["data"]["first_name"], "Grace");
        assert!(!body["data"]["edit_token"].as_str().unwrap().is_empty());

        let listed: Value = server.get("/api/registrations").await.json();
        assert_eq!(listed["data"].as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn test_submit_rejects_missing_required() {
        let resp = server().post("/api/registration").json(&json!({ "email": "" })).await;
        assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);

        let body: Value = resp.json();
        let error = body["error"].as_str().unwrap();
        assert!(error.contains("First Name is required"));
        assert!(error.contains("Last Name is required"));
    }

    #[tokio::test]
    async fn test_submit_rejects_guest_name_without_email() {
        let resp = server()
            .post("/api/registration")
            .json(&json!({
                "email": "grace@example.com",
                "first_name": "Grace",
                "last_name": "Hopper",
                "guest_name": "Vincent"
            }))
            .await;
        assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = resp.json();
        assert_eq!(body["error"], "Guest Email is required when Guest Name is provided");
    }

    #[tokio::test]
    async fn test_get_by_token() {
        let r = registrant();
        let server = server_with(vec![r.clone()], None);

        let resp = server.get(&format!("/api/registration/by-token/{}", r.edit_token)).await;
        assert_eq!(resp.status_code(), StatusCode::OK);
        let body: Value = resp.json();
        assert_eq!(body["data"]["id"], r.id.to_string());

        let missing = server.get("/api/registration/by-token/nope").await;
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
        let body: Value = missing.json();
        assert_eq!(body["error"], "Registration not found");
    }

    #[tokio::test]
    async fn test_registrant_update_cannot_touch_admin_notes() {
        let r = registrant();
        let server = server_with(vec![r.clone()], None);

        let mut body = serde_json::to_value(&r).unwrap();
        body["company"] = json!("Difference Engines");
        body["admin_notes"] = json!("self-promoted");

        let resp = server.patch(&format!("/api/registration/{}", r.id)).json(&body).await;
        assert_eq!(resp.status_code(), StatusCode::OK);
        let updated: Value = resp.json();
        assert_eq!(updated["data"]["company"], "Difference Engines");
        assert_eq!(updated["data"]["admin_notes"], "VIP");
        assert_eq!(updated["data"]["edit_token"], r.edit_token);
    }

    #[tokio::test]
    async fn test_admin_update_writes_admin_notes() {
        let r = registrant();
        let server = server_with(vec![r.clone()], None);

        let mut body = serde_json::to_value(&r).unwrap();
        body["admin_notes"] = json!("Seat at table 1");

        let resp = server
            .patch(&format!("/api/registration/{}", r.id))
            .add_query_param("view", "admin")
            .json(&body)
            .await;
        assert_eq!(resp.status_code(), StatusCode::OK);
        let updated: Value = resp.json();
        assert_eq!(updated["data"]["admin_notes"], "Seat at table 1");
    }

    #[tokio::test]
    async fn test_update_rejects_blank_required_and_unknown_id() {
        let r = registrant();
        let server = server_with(vec![r.clone()], None);

        let mut body = serde_json::to_value(&r).unwrap();
        body["first_name"] = json!("  ");
        let resp = server.patch(&format!("/api/registration/{}", r.id)).json(&body).await;
        assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);

        let resp = server
            .patch(&format!("/api/registration/{}", uuid::Uuid::new_v4()))
            .json(&serde_json::to_value(&r).unwrap())
            .await;
        assert_eq!(resp.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_with_search() {
        let ada = registrant();
        let grace = Registration::new("grace@navy.mil", "Grace", "Hopper");
        let server = server_with(vec![ada, grace], None);

        let all: Value = server.get("/api/registrations").await.json();
        assert_eq!(all["data"].as_array().map(Vec::len), Some(2));

        let found: Value = server.get("/api/registrations").add_query_param("search", "ANALYTICAL").await.json();
        let data = found["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["first_name"], "Ada");

        let blank: Value = server.get("/api/registrations").add_query_param("search", "  ").await.json();
        assert_eq!(blank["data"].as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn test_export_csv() {
        let r = registrant();
        let server = server_with(vec![r.clone()], None);

        let resp = server.get("/api/registrations/export").await;
        assert_eq!(resp.status_code(), StatusCode::OK);
        assert_eq!(resp.header("content-type"), "text/csv; charset=utf-8");
        let disposition = resp.header("content-disposition");
        let disposition = disposition.to_str().unwrap();
        assert!(disposition.starts_with("attachment; filename=\"registrations_"));
        assert!(disposition.ends_with(".csv\""));

        let text = resp.text();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("\"Registration ID\",\"Submitted At\""));
        let row = lines.next().unwrap();
        assert!(row.starts_with(&format!("\"{}\"", r.id)));
        assert!(row.contains(&format!("https://gala.example.com/register/edit?token={}", r.edit_token)));
        assert!(lines.next().is_none());
    }

    #[tokio::test]
    async fn test_email_preview() {
        let r = registrant();
        let server = server_with(vec![r.clone()], None);

        let resp = server
            .post("/api/email-preview")
            .json(&json!({
                "registrationId": r.id,
                "heading": "Welcome {{firstName}}",
                "subject": "See you soon, {{firstName}}",
                "body": "<p>Hello {{firstName}} {{lastName}}</p>",
                "recipientFields": { "to": { "predefined": ["registrant"] } }
            }))
            .await;
        assert_eq!(resp.status_code(), StatusCode::OK);

        let body: Value = resp.json();
        assert_eq!(body["subject"], "See you soon, Ada");
        assert!(body["html"].as_str().unwrap().contains("Welcome Ada"));
        assert!(body["text"].as_str().unwrap().contains("Hello Ada Lovelace"));
    }

    #[tokio::test]
    async fn test_email_preview_unknown_registration() {
        let resp = server()
            .post("/api/email-preview")
            .json(&json!({ "registrationId": uuid::Uuid::new_v4(), "subject": "Hi", "body": "x" }))
            .await;
        assert_eq!(resp.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_send_bulk_email_and_sent_log() {
        let r = registrant();
        let server = server_with(vec![r.clone()], None);

        let resp = server
            .post("/api/send-bulk-email")
            .json(&json!({
                "registrationIds": [r.id.to_string(), "not-a-uuid"],
                "subject": "Agenda for {{firstName}}",
                "body": "<p>Details inside</p>",
                "recipientFields": {
                    "to": { "predefined": ["registrant"] },
                    "cc": { "predefined": ["assistant"] }
                }
            }))
            .await;
        assert_eq!(resp.status_code(), StatusCode::OK);

        let result: Value = resp.json();
        assert_eq!(result["total"], 2);
        assert_eq!(result["successCount"], 1);
        assert_eq!(result["failCount"], 1);
        assert_eq!(result["results"][0]["email"], "ada@example.com");
        assert_eq!(result["results"][1]["error"], "invalid registration id: not-a-uuid");

        let sent: Value = server.get("/api/sent-emails").await.json();
        assert_eq!(sent["success"], true);
        let emails = sent["emails"].as_array().unwrap();
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0]["subject"], "Agenda for Ada");

        let id = emails[0]["id"].as_str().unwrap();
        let detail: Value = server.get(&format!("/api/sent-emails/{id}")).await.json();
        assert_eq!(detail["email"]["cc"], json!(["charles@example.com"]));
        assert!(detail["email"]["html"].as_str().unwrap().contains("Details inside"));
    }

    #[tokio::test]
    async fn test_send_bulk_email_requires_selection_and_subject() {
        let server = server();
        let resp = server
            .post("/api/send-bulk-email")
            .json(&json!({ "registrationIds": [], "subject": "Hi", "body": "x" }))
            .await;
        assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = resp.json();
        assert_eq!(body["error"], "No registrations selected");

        let resp = server
            .post("/api/send-bulk-email")
            .json(&json!({ "registrationIds": ["x"], "subject": " ", "body": "x" }))
            .await;
        assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_sent_email() {
        let resp = server().get(&format!("/api/sent-emails/{}", uuid::Uuid::new_v4())).await;
        assert_eq!(resp.status_code(), StatusCode::NOT_FOUND);
    }

    fn image_part(bytes: Vec<u8>, mime: &str) -> MultipartForm {
        MultipartForm::new().add_part("file", Part::bytes(bytes).file_name("header.png").mime_type(mime))
    }

    #[tokio::test]
    async fn test_upload_image() {
        let resp = server().post("/api/upload").multipart(image_part(b"\x89PNG fake".to_vec(), "image/png")).await;
        assert_eq!(resp.status_code(), StatusCode::OK);
        let body: Value = resp.json();
        let url = body["url"].as_str().unwrap();
        assert!(url.starts_with("memory://uploads/") && url.ends_with(".png"));
    }

    #[tokio::test]
    async fn test_upload_rejects_non_image() {
        let resp = server().post("/api/upload").multipart(image_part(b"%PDF-1.7".to_vec(), "application/pdf")).await;
        assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = resp.json();
        assert_eq!(body["error"], "Only image files can be uploaded");
    }

    #[tokio::test]
    async fn test_upload_over_limit_is_413() {
        let server = server();
        let just_over = image_part(vec![0u8; uploads::MAX_UPLOAD_BYTES + 1], "image/png");
        let resp = server.post("/api/upload").multipart(just_over).await;
        assert_eq!(resp.status_code(), StatusCode::PAYLOAD_TOO_LARGE);

        let past_body_limit = image_part(vec![0u8; 6 * 1024 * 1024], "image/png");
        let resp = server.post("/api/upload").multipart(past_body_limit).await;
        assert_eq!(resp.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        let body: Value = resp.json();
        assert_eq!(body["error"], "Image must be 5 MB or smaller");
    }

    #[tokio::test]
    async fn test_upload_without_file_part() {
        let form = MultipartForm::new().add_text("caption", "banner");
        let resp = server().post("/api/upload").multipart(form).await;
        assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = resp.json();
        assert_eq!(body["error"], "No file provided");
    }

    #[tokio::test]
    async fn test_openapi_lists_routes() {
        let doc: Value = server().get("/api-docs/openapi.json").await.json();
        assert!(doc["paths"]["/api/registration/{id}"].is_object());
        assert!(doc["paths"]["/api/send-bulk-email"].is_object());
    }
}
