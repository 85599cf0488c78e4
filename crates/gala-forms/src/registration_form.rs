//! The event registration form
//!
//! Code-defined structure, independent of CMS content. Copy here is the
//! offline default; the overlay replaces it at request time.

use gala_common::Catalog;

use crate::schema::{
    FieldGroup, FormChrome, FormConfig, FormField, FormStep, GroupKey, SchemaError,
    DEFAULT_SUBMIT_ENDPOINT,
};
use crate::validation::Rule;

pub fn registration_form() -> Result<FormConfig, SchemaError> {
    FormConfig::new(
        vec![your_information(), event_details(), guest_information()],
        FormChrome::fallback(),
        DEFAULT_SUBMIT_ENDPOINT,
        vec![Rule::RequiredWith {
            field: "guest_email".into(),
            when: vec!["guest_name".into()],
        }],
    )
}

fn your_information() -> FormStep {
    FormStep::new(
        "Your Information",
        vec![
            FieldGroup::new(
                GroupKey::PersonalDetails,
                vec![
                    FormField::email("email", "Email Address").required().placeholder("you@company.com"),
                    FormField::text("first_name", "First Name").required(),
                    FormField::text("last_name", "Last Name").required(),
                    FormField::text("title", "Job Title"),
                    FormField::text("company", "Company"),
                    FormField::tel("phone", "Office Phone"),
                    FormField::tel("mobile_phone", "Mobile Phone")
                        .helper("Used only for day-of logistics."),
                ],
            )
            .titled("Personal Details"),
            FieldGroup::new(
                GroupKey::Address,
                vec![
                    FormField::text("address_line1", "Address Line 1"),
                    FormField::text("address_line2", "Address Line 2"),
                    FormField::text("city", "City"),
                    FormField::text("state", "State / Province"),
                    FormField::text("postal_code", "Postal Code"),
                    FormField::text("country", "Country"),
                ],
            )
            .titled("Mailing Address"),
            FieldGroup::new(
                GroupKey::Assistant,
                vec![
                    FormField::text("assistant_name", "Assistant Name"),
                    FormField::email("assistant_email", "Assistant Email"),
                    FormField::tel("assistant_phone", "Assistant Phone"),
                ],
            )
            .titled("Executive Assistant")
            .described("If an assistant manages your schedule, we will copy them on logistics emails."),
            FieldGroup::new(
                GroupKey::EmergencyContact,
                vec![
                    FormField::text("emergency_contact_name", "Name"),
                    FormField::tel("emergency_contact_phone", "Phone"),
                    FormField::text("emergency_contact_relationship", "Relationship"),
                ],
            )
            .titled("Emergency Contact"),
        ],
    )
}

fn event_details() -> FormStep {
    FormStep::new(
        "Event Details",
        vec![
            FieldGroup::new(
                GroupKey::Travel,
                vec![
                    FormField::text("arrival_date", "Arrival Date").placeholder("YYYY-MM-DD"),
                    FormField::text("departure_date", "Departure Date").placeholder("YYYY-MM-DD"),
                    FormField::radio("airport_transfer", "Airport Transfer", Catalog::AirportTransfer),
                ],
            )
            .titled("Travel"),
            FieldGroup::new(
                GroupKey::Accommodations,
                vec![FormField::checkbox_group("accommodations", "Hotel Nights", Catalog::Accommodations)
                    .helper("Select every night you need a room.")],
            )
            .titled("Accommodations"),
            FieldGroup::new(
                GroupKey::Dining,
                vec![
                    FormField::checkbox_group("dinner_attendance", "Dinners", Catalog::DinnerAttendance),
                    FormField::textarea("dietary_restrictions", "Dietary Restrictions"),
                ],
            )
            .titled("Dining"),
            FieldGroup::new(
                GroupKey::Activities,
                vec![
                    FormField::checkbox_group("activities", "Activities", Catalog::Activities),
                    FormField::select("tshirt_size", "T-Shirt Size", Catalog::TshirtSize),
                ],
            )
            .titled("Activities"),
            FieldGroup::new(
                GroupKey::Preferences,
                vec![
                    FormField::checkbox("photo_consent", "I agree to be photographed during the event"),
                    FormField::textarea("special_requests", "Special Requests"),
                ],
            )
            .titled("Preferences"),
        ],
    )
}

fn guest_information() -> FormStep {
    FormStep::new(
        "Guest",
        vec![
            FieldGroup::new(
                GroupKey::GuestInformation,
                vec![
                    FormField::text("guest_name", "Guest Name"),
                    FormField::email("guest_email", "Guest Email"),
                    FormField::textarea("guest_dietary_restrictions", "Guest Dietary Restrictions"),
                ],
            )
            .titled("Bringing a Guest?")
            .described("Leave blank if you are attending alone."),
            FieldGroup::new(
                GroupKey::GuestEventDetails,
                vec![
                    FormField::checkbox_group("guest_dinner_attendance", "Guest Dinners", Catalog::DinnerAttendance),
                    FormField::checkbox_group("guest_activities", "Guest Activities", Catalog::Activities),
                ],
            )
            .titled("Guest Event Details")
            .show_if_any(&["guest_name", "guest_email"]),
        ],
    )
}
