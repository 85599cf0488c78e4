//! Gala Common - Shared registration types
//!
//! This crate holds everything the form engine, the mail composer and the HTTP
//! service agree on:
//! - The persisted [`Registration`] record (snake_case wire shape)
//! - Option catalogs backing select/checkbox-group/radio fields
//! - The ordered field-metadata table and the snake/camel key adapter
//! - The field codec (admin form state, CSV export, email variables)
//! - The registration repository port
//!
//! # Data flow
//!
//! ```text
//! data bag ──► Registration ──► codec ──┬──► admin form state
//!                                       ├──► CSV rows
//!                                       └──► email variables
//! ```

#![warn(clippy::all)]

pub mod catalog;
pub mod codec;
pub mod email;
pub mod error;
pub mod fields;
pub mod keys;
pub mod registration;
pub mod repository;
pub mod search;
pub mod value;

pub use catalog::{Catalog, CatalogEntry};
pub use email::{EmailAddress, EmailError};
pub use error::*;
pub use fields::{FieldOrigin, FieldSpec, ValueKind, REGISTRATION_FIELDS};
pub use registration::Registration;
pub use repository::{InMemoryRegistrationRepository, RegistrationRepository, RepositoryError};
pub use value::FieldValue;
