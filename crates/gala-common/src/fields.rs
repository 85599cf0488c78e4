//! Registration field metadata
//!
//! The ordered list of logical registration fields. Export column order,
//! email variable names and the admin form state all derive from this one
//! table, keyed by the snake_case wire key.

use serde_json::Value;

use crate::catalog::Catalog;

/// How a stored value is read back for display
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    /// Free text
    Text,
    /// Boolean checkbox
    Flag,
    /// Single option code (select/radio)
    Code(Catalog),
    /// Option code list (checkbox group)
    List(Catalog),
}

/// Who may write a field
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldOrigin {
    /// Collected by the registration form
    Form,
    /// Only editable from the admin view
    Admin,
}

/// One logical registration field
#[derive(Clone, Copy, Debug)]
pub struct FieldSpec {
    pub key: &'static str,
    pub header: &'static str,
    pub kind: ValueKind,
    pub origin: FieldOrigin,
}

const fn text(key: &'static str, header: &'static str) -> FieldSpec {
    FieldSpec { key, header, kind: ValueKind::Text, origin: FieldOrigin::Form }
}

const fn with(key: &'static str, header: &'static str, kind: ValueKind) -> FieldSpec {
    FieldSpec { key, header, kind, origin: FieldOrigin::Form }
}

pub const REGISTRATION_FIELDS: &[FieldSpec] = &[
    text("email", "Email"),
    text("first_name", "First Name"),
    text("last_name", "Last Name"),
    text("title", "Title"),
    text("company", "Company"),
    text("phone", "Phone"),
    text("mobile_phone", "Mobile Phone"),
    text("address_line1", "Address Line 1"),
    text("address_line2", "Address Line 2"),
    text("city", "City"),
    text("state", "State"),
    text("postal_code", "Postal Code"),
    text("country", "Country"),
    text("assistant_name", "Assistant Name"),
    text("assistant_email", "Assistant Email"),
    text("assistant_phone", "Assistant Phone"),
    text("emergency_contact_name", "Emergency Contact Name"),
    text("emergency_contact_phone", "Emergency Contact Phone"),
    text("emergency_contact_relationship", "Emergency Contact Relationship"),
    text("arrival_date", "Arrival Date"),
    text("departure_date", "Departure Date"),
    with("airport_transfer", "Airport Transfer", ValueKind::Code(Catalog::AirportTransfer)),
    with("accommodations", "Accommodations", ValueKind::List(Catalog::Accommodations)),
    with("dinner_attendance", "Dinner Attendance", ValueKind::List(Catalog::DinnerAttendance)),
    text("dietary_restrictions", "Dietary Restrictions"),
    with("activities", "Activities", ValueKind::List(Catalog::Activities)),
    with("tshirt_size", "T-Shirt Size", ValueKind::Code(Catalog::TshirtSize)),
    with("photo_consent", "Photo Consent", ValueKind::Flag),
    text("special_requests", "Special Requests"),
    text("guest_name", "Guest Name"),
    text("guest_email", "Guest Email"),
    text("guest_dietary_restrictions", "Guest Dietary Restrictions"),
    with("guest_dinner_attendance", "Guest Dinner Attendance", ValueKind::List(Catalog::DinnerAttendance)),
    with("guest_activities", "Guest Activities", ValueKind::List(Catalog::Activities)),
    FieldSpec {
        key: "admin_notes",
        header: "Admin Notes",
        kind: ValueKind::Text,
        origin: FieldOrigin::Admin,
    },
];

/// Look up a field by its snake_case key
pub fn field_spec(key: &str) -> Option<&'static FieldSpec> {
    REGISTRATION_FIELDS.iter().find(|f| f.key == key)
}

impl FieldSpec {
    /// Render a stored wire value for humans.
    ///
    /// `null`/absent is the empty string; codes and lists resolve through the
    /// option catalog; flags read `Yes`/`No`.
    pub fn display(&self, value: Option<&Value>) -> String {
        let value = match value {
            None | Some(Value::Null) => return String::new(),
            Some(v) => v,
        };
        match self.kind {
            ValueKind::Text => match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
            ValueKind::Flag => {
                if value.as_bool().unwrap_or(false) { "Yes".into() } else { "No".into() }
            }
            ValueKind::Code(catalog) => value
                .as_str()
                .map(|code| catalog.display(code).to_string())
                .unwrap_or_default(),
            ValueKind::List(catalog) => {
                let codes: Vec<String> = value
                    .as_array()
                    .map(|items| items.iter().filter_map(|v| v.as_str().map(String::from)).collect())
                    .unwrap_or_default();
                catalog.display_list(&codes)
            }
        }
    }
}
