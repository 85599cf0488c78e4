//! # Gala Forms
//!
//! The registration form as data: a static schema of steps, groups and
//! fields, a CMS content overlay merged onto a fresh copy per request, and a
//! generic multi-step engine that renders, validates and submits any
//! [`FormConfig`].
//!
//! ```rust,ignore
//! use gala_forms::{merge, registration_form, FormEngine};
//!
//! let form = merge(&registration_form()?, overlay.as_ref());
//! let mut engine = FormEngine::new(form);
//! engine.set_field("email", "guest@example.com");
//! engine.next()?;
//! ```

#![warn(clippy::all)]

pub mod bag;
pub mod engine;
pub mod overlay;
pub mod registration_form;
pub mod render;
pub mod schema;
pub mod transport;
pub mod validation;

pub use bag::DataBag;
pub use engine::{scoped, EngineOptions, FormEngine, FormError, Phase, SubmitScope};
pub use overlay::{merge, resolve, ContentError, ContentOverlay, ContentSource, FileContent, StaticContent};
pub use registration_form::registration_form;
pub use render::{render_step, RenderedField, RenderedGroup, RenderedOption, RenderedStep};
pub use schema::{
    FieldGroup, FieldKind, FieldOption, FormChrome, FormConfig, FormField, FormStep, GroupKey, SchemaError,
};
pub use transport::{HttpTransport, SubmissionTransport, TransportError, TransportResponse};
pub use validation::{validate_all, validate_step, Rule, ValidationIssue};
