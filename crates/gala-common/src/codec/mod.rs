//! Field codec
//!
//! Read-side projections of a stored [`Registration`](crate::Registration):
//! - [`admin_form`]: flat camelCase editable state, and back
//! - [`csv`]: export rows under the metadata-derived header
//! - [`variables`]: the email template variable map

pub mod admin_form;
pub mod csv;
pub mod variables;

pub use admin_form::{AdminFormState, EditView};
pub use csv::{export_csv, export_filename, header_row};
pub use variables::{build_variables, RegistrantLinks, VariableOptions, Variables};
